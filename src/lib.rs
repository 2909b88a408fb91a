//! scroll-rs: a compositor-style scrolling and zooming presenter.
//!
//! The crate pairs a view-change engine, which queues requests and
//! reconciles their completion against an interaction tracker, with the clip
//! and transform math needed to project scrolled content to the visual root.

pub mod core;
pub mod error;
pub mod presenter;
pub mod snap;
pub mod telemetry;
pub mod tracker;

pub use error::{ScrollError, ScrollResult};
pub use presenter::{PresenterConfig, ScrollingPresenter};

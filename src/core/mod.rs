pub mod clip;
pub mod matrix;
pub mod transform_stack;
pub mod transform_to_root;
pub mod types;

pub use clip::HwClip;
pub use matrix::{Matrix2D, Matrix4x4};
pub use transform_stack::{TransformAndClipFrame, TransformAndClipStack};
pub use transform_to_root::TransformToRoot;
pub use types::{Point, Rect, Size, Vector2D, Viewport};

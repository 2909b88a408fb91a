use std::cell::RefCell;
use std::rc::Rc;

use scroll_rs::core::types::{Point, Size, Vector2D, Viewport};
use scroll_rs::presenter::{
    AnimationMode, PresenterConfig, ScrollOptions, ScrollingPresenter, ViewChangeId,
    ViewChangeResult, ZoomOptions,
};
use scroll_rs::tracker::{SimTracker, TrackerEvent};
use scroll_rs::ScrollError;

type Presenter = ScrollingPresenter<SimTracker>;
type Completions = Rc<RefCell<Vec<(i64, ViewChangeResult)>>>;

fn presenter() -> Presenter {
    let config = PresenterConfig::new(Viewport::new(100, 100), Size::new(500.0, 500.0));
    ScrollingPresenter::new(SimTracker::new(), config).expect("presenter init")
}

fn capture_scroll_completions(presenter: &mut Presenter) -> Completions {
    let seen: Completions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    presenter.subscribe_scroll_completed(move |event| {
        sink.borrow_mut()
            .push((event.correlation_id.raw(), event.result));
    });
    seen
}

fn capture_zoom_completions(presenter: &mut Presenter) -> Completions {
    let seen: Completions = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    presenter.subscribe_zoom_completed(move |event| {
        sink.borrow_mut()
            .push((event.correlation_id.raw(), event.result));
    });
    seen
}

/// One compositor frame: dispatch the queue, advance the tracker, and feed
/// its events back into the presenter.
fn pump(presenter: &mut Presenter, frames: usize) {
    for _ in 0..frames {
        presenter.on_compositor_tick();
        let events = presenter.tracker_mut().step(0.016);
        for event in events {
            presenter.on_tracker_event(event);
        }
    }
}

#[test]
fn scroll_to_completes_at_target() {
    let mut presenter = presenter();
    let completions = capture_scroll_completions(&mut presenter);

    let id = presenter
        .scroll_to(120.0, 80.0, ScrollOptions::default())
        .expect("scroll_to");
    assert!(!id.is_noop());

    pump(&mut presenter, 60);

    assert_eq!(
        *completions.borrow(),
        vec![(id.raw(), ViewChangeResult::Completed)]
    );
    assert!((presenter.horizontal_offset() - 120.0).abs() <= 1e-9);
    assert!((presenter.vertical_offset() - 80.0).abs() <= 1e-9);
}

#[test]
fn newer_scroll_interrupts_the_one_in_flight() {
    let mut presenter = presenter();
    let completions = capture_scroll_completions(&mut presenter);

    let first = presenter
        .scroll_to(200.0, 0.0, ScrollOptions::default())
        .expect("first scroll");
    pump(&mut presenter, 2);

    let second = presenter
        .scroll_to(50.0, 0.0, ScrollOptions::default())
        .expect("second scroll");
    pump(&mut presenter, 60);

    assert_eq!(
        *completions.borrow(),
        vec![
            (first.raw(), ViewChangeResult::Interrupted),
            (second.raw(), ViewChangeResult::Completed),
        ]
    );
    assert!((presenter.horizontal_offset() - 50.0).abs() <= 1e-9);
}

#[test]
fn offsets_are_clamped_to_the_scrollable_range() {
    let mut presenter = presenter();
    let completions = capture_scroll_completions(&mut presenter);

    // 500x500 content in a 100x100 viewport at zoom 1 scrolls to 400 max.
    let id = presenter
        .scroll_to(10_000.0, -10_000.0, ScrollOptions::default())
        .expect("scroll_to");
    pump(&mut presenter, 60);

    assert_eq!(
        *completions.borrow(),
        vec![(id.raw(), ViewChangeResult::Completed)]
    );
    assert!((presenter.horizontal_offset() - 400.0).abs() <= 1e-9);
    assert!((presenter.vertical_offset() - 0.0).abs() <= 1e-9);
}

#[test]
fn request_for_the_current_view_completes_without_the_tracker() {
    let mut presenter = presenter();
    let completions = capture_scroll_completions(&mut presenter);

    let id = presenter
        .scroll_to(0.0, 0.0, ScrollOptions::default())
        .expect("scroll_to");

    assert_eq!(
        *completions.borrow(),
        vec![(id.raw(), ViewChangeResult::Completed)]
    );
    assert!(presenter.tracker().submitted_commands().is_empty());
    assert_eq!(presenter.outstanding_operation_count(), 0);
}

#[test]
fn disabled_animation_jumps_in_one_frame() {
    let mut presenter = presenter();
    let completions = capture_scroll_completions(&mut presenter);

    let id = presenter
        .scroll_to(
            120.0,
            0.0,
            ScrollOptions::new(AnimationMode::Disabled),
        )
        .expect("scroll_to");
    pump(&mut presenter, 1);

    assert_eq!(
        *completions.borrow(),
        vec![(id.raw(), ViewChangeResult::Completed)]
    );
    assert!((presenter.horizontal_offset() - 120.0).abs() <= 1e-9);
}

#[test]
fn requests_before_layout_return_the_noop_sentinel() {
    let mut presenter = Presenter::detached(SimTracker::new());
    let completions = capture_scroll_completions(&mut presenter);

    let id = presenter
        .scroll_to(100.0, 0.0, ScrollOptions::default())
        .expect("scroll_to");
    assert_eq!(id, ViewChangeId::NOOP);

    pump(&mut presenter, 10);
    assert!(completions.borrow().is_empty());
    assert!(presenter.tracker().submitted_commands().is_empty());
}

#[test]
fn zoom_to_completes_and_rescales_the_range() {
    let mut presenter = presenter();
    let completions = capture_zoom_completions(&mut presenter);

    let id = presenter
        .zoom_to(2.0, Some(Point::ZERO), ZoomOptions::default())
        .expect("zoom_to");
    pump(&mut presenter, 60);

    assert_eq!(
        *completions.borrow(),
        vec![(id.raw(), ViewChangeResult::Completed)]
    );
    assert!((presenter.zoom_factor() - 2.0).abs() <= 1e-6);
    // 500 * 2 - 100 viewport.
    let snapshot = presenter.view_snapshot();
    assert!((snapshot.max_position.x - 900.0).abs() <= 1e-6);
}

#[test]
fn out_of_bounds_zoom_factor_is_rejected_synchronously() {
    let mut presenter = presenter();
    let result = presenter.zoom_to(20.0, None, ZoomOptions::default());
    assert!(matches!(result, Err(ScrollError::InvalidArgument(_))));
    assert_eq!(presenter.outstanding_operation_count(), 0);
}

#[test]
fn zoom_by_clamps_at_dispatch() {
    let mut presenter = presenter();
    let completions = capture_zoom_completions(&mut presenter);

    // 1.0 + 15.0 exceeds the max of 10.0; relative zoom clamps instead of
    // failing.
    let id = presenter
        .zoom_by(15.0, None, ZoomOptions::default())
        .expect("zoom_by");
    pump(&mut presenter, 80);

    assert_eq!(
        *completions.borrow(),
        vec![(id.raw(), ViewChangeResult::Completed)]
    );
    assert!((presenter.zoom_factor() - 10.0).abs() <= 1e-6);
}

#[test]
fn weak_impulses_are_rejected() {
    let mut presenter = presenter();
    let result = presenter.scroll_from(Vector2D::new(1.0, 0.0), None);
    assert!(matches!(result, Err(ScrollError::InvalidArgument(_))));
}

#[test]
fn non_finite_arguments_are_rejected() {
    let mut presenter = presenter();
    assert!(presenter
        .scroll_to(f64::NAN, 0.0, ScrollOptions::default())
        .is_err());
    assert!(presenter
        .scroll_by(f64::INFINITY, 0.0, ScrollOptions::default())
        .is_err());
    assert!(presenter
        .zoom_to(f32::NAN, None, ZoomOptions::default())
        .is_err());
}

#[test]
fn scroll_from_travels_and_settles_within_bounds() {
    let mut presenter = presenter();
    let completions = capture_scroll_completions(&mut presenter);

    let id = presenter
        .scroll_from(Vector2D::new(300.0, 0.0), None)
        .expect("scroll_from");
    pump(&mut presenter, 400);

    assert_eq!(
        *completions.borrow(),
        vec![(id.raw(), ViewChangeResult::Completed)]
    );
    assert!(presenter.horizontal_offset() > 0.0);
    assert!(presenter.horizontal_offset() <= 400.0);
}

#[test]
fn request_during_direct_manipulation_completes_as_ignored() {
    let mut presenter = presenter();
    let completions = capture_scroll_completions(&mut presenter);

    presenter.tracker_mut().begin_interaction();
    pump(&mut presenter, 1);

    let id = presenter
        .scroll_to(120.0, 0.0, ScrollOptions::default())
        .expect("scroll_to");
    pump(&mut presenter, 1);

    assert_eq!(
        *completions.borrow(),
        vec![(id.raw(), ViewChangeResult::Ignored)]
    );
}

#[test]
fn interaction_interrupts_in_flight_animations() {
    let mut presenter = presenter();
    let completions = capture_scroll_completions(&mut presenter);

    let id = presenter
        .scroll_to(300.0, 0.0, ScrollOptions::default())
        .expect("scroll_to");
    pump(&mut presenter, 2);

    presenter.tracker_mut().begin_interaction();
    pump(&mut presenter, 1);

    assert_eq!(
        *completions.borrow(),
        vec![(id.raw(), ViewChangeResult::Interrupted)]
    );
}

#[test]
fn executed_jump_survives_an_interaction_arriving_before_its_idle_event() {
    let mut presenter = presenter();
    let completions = capture_scroll_completions(&mut presenter);

    let id = presenter
        .scroll_to(50.0, 0.0, ScrollOptions::new(AnimationMode::Disabled))
        .expect("scroll_to");
    presenter.on_compositor_tick();

    // The host may deliver the interaction notification ahead of the jump's
    // own idle event; the jump already executed atomically.
    presenter.on_tracker_event(TrackerEvent::InteractingStateEntered);
    let events = presenter.tracker_mut().step(0.016);
    for event in events {
        presenter.on_tracker_event(event);
    }

    assert_eq!(
        *completions.borrow(),
        vec![(id.raw(), ViewChangeResult::Completed)]
    );
    assert!((presenter.horizontal_offset() - 50.0).abs() <= 1e-9);
}

#[test]
fn animated_request_leaves_an_executed_jump_untouched() {
    let mut presenter = presenter();
    let completions = capture_scroll_completions(&mut presenter);

    let jump = presenter
        .scroll_to(50.0, 0.0, ScrollOptions::new(AnimationMode::Disabled))
        .expect("jump");
    let animated = presenter
        .scroll_to(200.0, 0.0, ScrollOptions::default())
        .expect("animated scroll");
    pump(&mut presenter, 80);

    assert_eq!(
        *completions.borrow(),
        vec![
            (jump.raw(), ViewChangeResult::Completed),
            (animated.raw(), ViewChangeResult::Completed),
        ]
    );
    assert!((presenter.horizontal_offset() - 200.0).abs() <= 1e-9);
}

#[test]
fn cancel_all_interrupts_in_enqueue_order() {
    let mut presenter = presenter();
    let scrolls = capture_scroll_completions(&mut presenter);
    let zooms = capture_zoom_completions(&mut presenter);

    let first = presenter
        .scroll_to(200.0, 0.0, ScrollOptions::default())
        .expect("scroll");
    let second = presenter
        .zoom_to(2.0, None, ZoomOptions::default())
        .expect("zoom");
    presenter.cancel_all_operations();

    assert_eq!(
        *scrolls.borrow(),
        vec![(first.raw(), ViewChangeResult::Interrupted)]
    );
    assert_eq!(
        *zooms.borrow(),
        vec![(second.raw(), ViewChangeResult::Interrupted)]
    );
    assert_eq!(presenter.outstanding_operation_count(), 0);
}

#[test]
fn drag_updates_the_authoritative_view() {
    let mut presenter = presenter();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    presenter.subscribe_view_changed(move |event| {
        sink.borrow_mut()
            .push((event.horizontal_offset, event.vertical_offset));
    });

    presenter.tracker_mut().begin_interaction();
    presenter.tracker_mut().drag_to(Vector2D::new(30.0, 40.0));
    pump(&mut presenter, 1);

    assert_eq!(*seen.borrow(), vec![(30.0, 40.0)]);
    assert!((presenter.horizontal_offset() - 30.0).abs() <= 1e-9);
    assert!((presenter.vertical_offset() - 40.0).abs() <= 1e-9);
}

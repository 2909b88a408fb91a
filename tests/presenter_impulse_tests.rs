use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use scroll_rs::core::types::{Size, Vector2D, Viewport};
use scroll_rs::presenter::{PresenterConfig, ScrollingPresenter, ViewChangeResult};
use scroll_rs::snap::SnapPoint;
use scroll_rs::tracker::{SimTracker, TrackerCommand};

type Presenter = ScrollingPresenter<SimTracker>;

fn presenter() -> Presenter {
    let config = PresenterConfig::new(Viewport::new(100, 100), Size::new(500.0, 500.0));
    ScrollingPresenter::new(SimTracker::new(), config).expect("presenter init")
}

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
fn wheel_deltas_coalesce_while_settling() {
    let mut presenter = presenter();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    presenter.subscribe_scroll_completed(move |event| {
        sink.borrow_mut()
            .push((event.correlation_id.raw(), event.result));
    });

    let first = presenter.on_pointer_wheel(1.0, false).expect("wheel");
    let second = presenter.on_pointer_wheel(1.0, false).expect("wheel");
    assert_ne!(first, second);

    // The first impulse never reaches the tracker; its velocity folds into
    // the second.
    assert_eq!(
        *seen.borrow(),
        vec![(first.raw(), ViewChangeResult::Interrupted)]
    );

    pump(&mut presenter, 4);
    let commands = presenter.tracker().submitted_commands();
    assert_eq!(commands.len(), 1);
    match commands[0] {
        TrackerCommand::AddOffsetsVelocity { velocity, .. } => {
            // Two wheel lines at 220 px/s each; the natural resting position
            // stays inside the scrollable range, so shaping keeps the
            // velocity intact.
            assert_relative_eq!(velocity.y, 440.0, epsilon = 1e-6);
            assert_relative_eq!(velocity.x, 0.0, epsilon = 1e-12);
        }
        other => panic!("expected offsets velocity, got {other:?}"),
    }

    pump(&mut presenter, 400);
    assert_eq!(
        seen.borrow().last(),
        Some(&(second.raw(), ViewChangeResult::Completed))
    );
    assert!(presenter.vertical_offset() > 0.0);
}

#[test]
fn wheel_with_zoom_modifier_drives_zoom_inertia() {
    let mut presenter = presenter();

    let id = presenter.on_pointer_wheel(1.0, true).expect("zoom wheel");
    assert!(!id.is_noop());

    pump(&mut presenter, 4);
    let commands = presenter.tracker().submitted_commands();
    assert_eq!(commands.len(), 1);
    match commands[0] {
        TrackerCommand::AddZoomVelocity { velocity, .. } => {
            assert_relative_eq!(velocity, 0.4, epsilon = 1e-6);
        }
        other => panic!("expected zoom velocity, got {other:?}"),
    }

    pump(&mut presenter, 400);
    assert!(presenter.zoom_factor() > 1.0);
}

#[test]
fn zero_wheel_delta_is_a_noop() {
    let mut presenter = presenter();
    let id = presenter.on_pointer_wheel(0.0, false).expect("wheel");
    assert!(id.is_noop());
    assert_eq!(presenter.outstanding_operation_count(), 0);
}

#[test]
fn inertia_velocity_is_shaped_toward_the_snap_point() {
    let mut presenter = presenter();
    presenter
        .add_horizontal_snap_point(SnapPoint::Irregular {
            value: 200.0,
            applicable_range: None,
        })
        .expect("snap point");

    presenter
        .scroll_from(Vector2D::new(300.0, 0.0), None)
        .expect("scroll_from");
    pump(&mut presenter, 1);

    let commands = presenter.tracker().submitted_commands();
    assert_eq!(commands.len(), 1);
    match commands[0] {
        TrackerCommand::AddOffsetsVelocity {
            velocity,
            inertia_decay_per_second,
            ..
        } => {
            // The natural resting position resolves to the snap value 200;
            // the shaped velocity is the one whose decay travels exactly
            // that far: 200 * -ln(0.15).
            assert_relative_eq!(velocity.x, 200.0 * -(0.15f64).ln(), epsilon = 1e-9);
            assert_relative_eq!(inertia_decay_per_second.x, 0.15, epsilon = 1e-12);
        }
        other => panic!("expected offsets velocity, got {other:?}"),
    }
}

#[test]
fn inertia_resting_position_is_clamped_to_bounds() {
    let mut presenter = presenter();

    // Strong fling whose natural resting position overshoots the 400 px
    // range; shaping reins the velocity in so inertia rests at the edge.
    presenter
        .scroll_from(Vector2D::new(5_000.0, 0.0), None)
        .expect("scroll_from");
    pump(&mut presenter, 1);

    match presenter.tracker().submitted_commands()[0] {
        TrackerCommand::AddOffsetsVelocity { velocity, .. } => {
            assert_relative_eq!(velocity.x, 400.0 * -(0.15f64).ln(), epsilon = 1e-9);
        }
        ref other => panic!("expected offsets velocity, got {other:?}"),
    }
}

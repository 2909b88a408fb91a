use scroll_rs::core::types::{Size, Viewport};
use scroll_rs::presenter::{
    PresenterConfig, ScrollOptions, ScrollingPresenter, SnapPointsMode,
};
use scroll_rs::snap::SnapPoint;
use scroll_rs::tracker::SimTracker;

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

fn irregular(value: f64) -> SnapPoint {
    SnapPoint::Irregular {
        value,
        applicable_range: None,
    }
}

#[test]
fn animated_scroll_rests_on_the_snap_point() {
    let mut presenter = presenter();
    presenter
        .add_horizontal_snap_point(irregular(100.0))
        .expect("snap point");
    presenter
        .add_horizontal_snap_point(irregular(300.0))
        .expect("snap point");

    presenter
        .scroll_to(120.0, 0.0, ScrollOptions::default())
        .expect("scroll_to");
    pump(&mut presenter, 60);

    assert!((presenter.horizontal_offset() - 100.0).abs() <= 1e-9);
}

#[test]
fn ignore_mode_bypasses_snap_points() {
    let mut presenter = presenter();
    presenter
        .add_horizontal_snap_point(irregular(100.0))
        .expect("snap point");

    presenter
        .scroll_to(
            120.0,
            0.0,
            ScrollOptions::default().with_snap_points(SnapPointsMode::Ignore),
        )
        .expect("scroll_to");
    pump(&mut presenter, 60);

    assert!((presenter.horizontal_offset() - 120.0).abs() <= 1e-9);
}

#[test]
fn repeated_snap_points_pick_the_nearest_repetition() {
    let mut presenter = presenter();
    presenter
        .add_vertical_snap_point(SnapPoint::Repeated {
            offset: 0.0,
            interval: 50.0,
            start: 0.0,
            end: 400.0,
        })
        .expect("snap point");

    presenter
        .scroll_to(0.0, 130.0, ScrollOptions::default())
        .expect("scroll_to");
    pump(&mut presenter, 60);

    assert!((presenter.vertical_offset() - 150.0).abs() <= 1e-9);
}

#[test]
fn zoom_snap_points_steer_animated_zoom() {
    let mut presenter = presenter();
    presenter
        .add_zoom_snap_point(irregular(2.0))
        .expect("snap point");

    presenter
        .zoom_to(1.8, None, scroll_rs::presenter::ZoomOptions::default())
        .expect("zoom_to");
    pump(&mut presenter, 80);

    assert!((presenter.zoom_factor() - 2.0).abs() <= 1e-6);
}

#[test]
fn removed_snap_points_stop_applying() {
    let mut presenter = presenter();
    presenter
        .add_horizontal_snap_point(irregular(100.0))
        .expect("snap point");
    assert!(presenter.remove_horizontal_snap_point(&irregular(100.0)));

    presenter
        .scroll_to(120.0, 0.0, ScrollOptions::default())
        .expect("scroll_to");
    pump(&mut presenter, 60);

    assert!((presenter.horizontal_offset() - 120.0).abs() <= 1e-9);
}

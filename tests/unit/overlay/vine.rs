use super::*;
use crate::{
    env::capability::PerformanceTier,
    foundation::core::Rect,
    stage::document::{RegionAttrs, RegionKind},
    theme::controller::ThemeController,
};

fn vine(beats: usize) -> Vine {
    Vine::new(VineConfig::default(), beats, &ThemeController::default().current())
}

#[test]
fn path_has_a_knot_and_branch_per_beat() {
    let path = vine_path(3, 150.0);
    // Two quadratic segments per beat: trunk and branch.
    assert_eq!(path.segments().count(), 6);
    let bb = kurbo::Shape::bounding_box(&path);
    assert!(bb.x0 >= 0.0 && bb.x1 <= VINE_VIEW_WIDTH);
    assert!(bb.y1 <= 3.0 * 150.0);
}

#[test]
fn length_grows_with_beats() {
    let short = path_length(&vine_path(2, 150.0));
    let long = path_length(&vine_path(4, 150.0));
    assert!(short > 0.0);
    assert!(long > short * 1.9);
}

#[test]
fn empty_story_falls_back_to_default_beat_count() {
    let v = vine(0);
    assert_eq!(v.view_box(), Rect::new(0.0, 0.0, 100.0, 900.0));
}

#[test]
fn drawn_fraction_tracks_progress_both_ways() {
    let mut doc = Document::new();
    let container = doc.insert(
        RegionKind::TimelineContainer,
        Rect::new(0.0, 1000.0, 1200.0, 3000.0),
        None,
        RegionAttrs::default(),
    );
    let mut triggers = TriggerRegistry::new(1000.0);
    let mut v = vine(6);
    assert!(v.init(
        Some(container),
        InitConfig::new(PerformanceTier::High, false),
        &doc,
        &mut triggers
    ));
    assert_eq!(v.dash_offset(), v.length());

    // Span runs from scroll 500 (top at center) to 2500 (bottom at center).
    let mut seen = Vec::new();
    for y in [600.0, 1500.0, 2400.0, 1000.0, 0.0] {
        for e in triggers.update(y) {
            v.handle_event(&e);
        }
        seen.push(v.drawn_fraction());
    }
    assert!((seen[1] - 0.5).abs() < 1e-9);
    assert!(seen[2] > seen[1] && seen[3] < seen[2]);
    assert_eq!(seen[4], 0.0);
    assert!((v.drawn_length() + v.dash_offset() - v.length()).abs() < 1e-9);

    v.teardown(&mut triggers);
    assert_eq!(triggers.count_for(ComponentId::Vine), 0);
}

#[test]
fn reduced_motion_shows_the_whole_vine_without_a_trigger() {
    let doc = Document::new();
    let mut triggers = TriggerRegistry::new(1000.0);
    let mut v = vine(4);
    v.init(None, InitConfig::new(PerformanceTier::Low, true), &doc, &mut triggers);
    assert_eq!(v.drawn_fraction(), 1.0);
    assert_eq!(v.dash_offset(), 0.0);
    assert!(triggers.is_empty());
}

#[test]
fn missing_container_leaves_vine_untracked() {
    let doc = Document::new();
    let mut triggers = TriggerRegistry::new(1000.0);
    let mut v = vine(4);
    assert!(!v.init(None, InitConfig::new(PerformanceTier::Low, false), &doc, &mut triggers));
    assert!(triggers.is_empty());
}

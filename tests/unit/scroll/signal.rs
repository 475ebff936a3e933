use super::*;
use crate::env::capability::PerformanceTier;

fn smooth() -> ScrollSignal {
    ScrollSignal::new(
        &ScrollConfig::default(),
        InitConfig::new(PerformanceTier::High, false),
    )
}

#[test]
fn glide_ease_is_monotonic_and_saturates() {
    assert!(glide_ease(0.0).abs() < 0.01);
    let mut prev = glide_ease(0.0);
    for i in 1..=20 {
        let v = glide_ease(f64::from(i) / 20.0);
        assert!(v >= prev);
        prev = v;
    }
    assert_eq!(glide_ease(1.0), 1.0);
    assert_eq!(glide_ease(3.0), 1.0);
}

#[test]
fn smoothing_glides_toward_target_then_releases_the_clock() {
    let mut clock = FrameClock::new();
    let mut scroll = smooth();
    assert!(scroll.set_target(&mut clock, 1000.0, 0.0).is_none());
    assert_eq!(scroll.raw(), 1000.0);
    assert_eq!(scroll.position(), 0.0);
    assert_eq!(clock.active_for(ComponentId::Scroll), 1);

    let tick = clock.tick(0.3).unwrap();
    let mid = scroll.advance(&mut clock, &tick).unwrap();
    assert!(mid > 0.0 && mid < 1000.0);

    let tick = clock.tick(1.2).unwrap();
    assert_eq!(scroll.advance(&mut clock, &tick), Some(1000.0));
    assert!(!scroll.is_animating());
    assert_eq!(clock.active_count(), 0);
}

#[test]
fn retargeting_mid_glide_starts_from_current_position() {
    let mut clock = FrameClock::new();
    let mut scroll = smooth();
    scroll.set_target(&mut clock, 1000.0, 0.0);
    let tick = clock.tick(0.2).unwrap();
    let mid = scroll.advance(&mut clock, &tick).unwrap();

    scroll.set_target(&mut clock, 0.0, 0.2);
    assert_eq!(clock.active_for(ComponentId::Scroll), 1);
    let tick = clock.tick(0.25).unwrap();
    let back = scroll.advance(&mut clock, &tick).unwrap();
    assert!(back < mid);
}

#[test]
fn reduced_motion_moves_immediately_without_frames() {
    let mut clock = FrameClock::new();
    let mut scroll = ScrollSignal::new(
        &ScrollConfig::default(),
        InitConfig::new(PerformanceTier::High, true),
    );
    assert!(!scroll.is_smoothing());
    assert_eq!(scroll.set_target(&mut clock, 640.0, 0.0), Some(640.0));
    assert_eq!(scroll.position(), 640.0);
    assert_eq!(clock.active_count(), 0);
    assert!(scroll.set_target(&mut clock, 640.0, 0.1).is_none());
}

#[test]
fn negative_targets_clamp_to_top() {
    let mut clock = FrameClock::new();
    let mut scroll = ScrollSignal::new(
        &ScrollConfig {
            smooth: false,
            ..ScrollConfig::default()
        },
        InitConfig::new(PerformanceTier::Low, false),
    );
    scroll.set_target(&mut clock, 300.0, 0.0);
    assert_eq!(scroll.set_target(&mut clock, -50.0, 0.0), Some(0.0));
}

#[test]
fn teardown_twice_leaves_no_subscription() {
    let mut clock = FrameClock::new();
    let mut scroll = smooth();
    scroll.set_target(&mut clock, 500.0, 0.0);
    scroll.teardown(&mut clock);
    scroll.teardown(&mut clock);
    assert_eq!(clock.active_for(ComponentId::Scroll), 0);
    assert!(!scroll.is_animating());
}

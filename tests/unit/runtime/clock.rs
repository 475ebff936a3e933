use super::*;

#[test]
fn idle_clock_produces_no_ticks() {
    let mut clock = FrameClock::new();
    assert!(clock.tick(0.0).is_none());
    assert_eq!(clock.active_count(), 0);
}

#[test]
fn ticks_share_timestamp_and_track_dt() {
    let mut clock = FrameClock::new();
    let a = clock.subscribe(ComponentId::Field);
    let _b = clock.subscribe(ComponentId::Timeline);

    let t0 = clock.tick(1.0).unwrap();
    assert_eq!(t0.frame, 0);
    assert_eq!(t0.dt_s, 0.0);
    let t1 = clock.tick(1.25).unwrap();
    assert_eq!(t1.frame, 1);
    assert_eq!(t1.dt_s, 0.25);

    assert!(clock.cancel(a));
    assert!(!clock.cancel(a));
    assert!(!clock.is_active(a));
    assert_eq!(clock.active_count(), 1);
}

#[test]
fn cancel_owner_drops_only_that_owner() {
    let mut clock = FrameClock::new();
    clock.subscribe(ComponentId::Field);
    clock.subscribe(ComponentId::Field);
    clock.subscribe(ComponentId::Ending);
    assert_eq!(clock.active_for(ComponentId::Field), 2);
    assert_eq!(clock.cancel_owner(ComponentId::Field), 2);
    assert_eq!(clock.cancel_owner(ComponentId::Field), 0);
    assert_eq!(clock.active_count(), 1);
}

#[test]
fn dt_restarts_after_idle_period() {
    let mut clock = FrameClock::new();
    let s = clock.subscribe(ComponentId::Scroll);
    clock.tick(1.0);
    clock.cancel(s);
    assert!(clock.tick(2.0).is_none());
    clock.subscribe(ComponentId::Scroll);
    assert_eq!(clock.tick(5.0).unwrap().dt_s, 0.0);
}

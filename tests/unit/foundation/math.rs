use super::*;

#[test]
fn fnv_seeded_hash_is_stable() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"beat-1");
    let mut b = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    b.write_bytes(b"beat-");
    b.write_bytes(b"1");
    assert_eq!(a.finish(), b.finish());
    assert_eq!(seed_from_str("beat-1"), a.finish());
    assert_ne!(seed_from_str("beat-1"), seed_from_str("beat-2"));
}

#[test]
fn rng_is_deterministic_and_in_range() {
    let mut a = Rng64::new(7);
    let mut b = Rng64::new(7);
    for _ in 0..256 {
        let x = a.next_f64_01();
        assert_eq!(x, b.next_f64_01());
        assert!((0.0..1.0).contains(&x));
        let r = a.range(-3.0, 5.0);
        b.range(-3.0, 5.0);
        assert!((-3.0..5.0).contains(&r));
    }
}

#[test]
fn inverse_lerp_handles_empty_span() {
    assert_eq!(inverse_lerp(2.0, 2.0, 5.0), 0.0);
    assert_eq!(inverse_lerp(0.0, 10.0, 5.0), 0.5);
    assert_eq!(inverse_lerp(0.0, 10.0, -5.0), -0.5);
    assert_eq!(lerp(10.0, 20.0, 0.25), 12.5);
}

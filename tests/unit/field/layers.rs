use super::*;
use crate::env::capability::PerformanceTier;

#[test]
fn generation_is_deterministic_per_seed() {
    let cfg = FieldConfig::default();
    let a = StarLayer::generate(LayerKind::Mid, 50, &cfg, &mut Rng64::new(7));
    let b = StarLayer::generate(LayerKind::Mid, 50, &cfg, &mut Rng64::new(7));
    let c = StarLayer::generate(LayerKind::Mid, 50, &cfg, &mut Rng64::new(8));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn stars_stay_inside_their_depth_band() {
    let cfg = FieldConfig::default();
    let mut rng = Rng64::new(1);
    for kind in LayerKind::ALL {
        let layer = StarLayer::generate(kind, 200, &cfg, &mut rng);
        let m = kind.motion(&cfg);
        assert_eq!(layer.len(), 200);
        assert!(
            layer
                .stars()
                .iter()
                .all(|s| s.z >= m.depth_min && s.z <= m.depth_max)
        );
        assert!(layer.stars().iter().all(|s| {
            s.frequency_hz >= cfg.twinkle_hz_min && s.frequency_hz <= cfg.twinkle_hz_max
        }));
    }
}

#[test]
fn motion_coefficients_increase_toward_the_viewer_for_every_tier() {
    let cfg = FieldConfig::default();
    for tier in PerformanceTier::ALL {
        let counts = cfg.counts(tier);
        let motions: Vec<_> = LayerKind::ALL.iter().map(|k| k.motion(&cfg)).collect();
        assert!(motions[0].drift < motions[1].drift && motions[1].drift < motions[2].drift);
        assert!(
            motions[0].parallax < motions[1].parallax && motions[1].parallax < motions[2].parallax
        );
        assert!(LayerKind::ALL.iter().all(|k| k.count(counts) > 0));
    }
}

#[test]
fn twinkle_is_bounded_and_phase_shifted() {
    let a = twinkle_opacity(1.0, 1.0, 0.0, 0.25);
    let b = twinkle_opacity(1.0, 1.0, std::f64::consts::PI, 0.25);
    assert!((a - 1.0).abs() < 1e-9);
    assert!((b - 0.2).abs() < 1e-9);
    for i in 0..100 {
        let v = twinkle_opacity(0.8, f64::from(i) * 0.37, 1.3, 0.5);
        assert!((0.8 * 0.2 - 1e-9..=0.8 + 1e-9).contains(&v));
    }
}

#[test]
fn animate_drifts_and_twinkles() {
    let cfg = FieldConfig::default();
    let mut layer = StarLayer::generate(LayerKind::Near, 20, &cfg, &mut Rng64::new(3));
    let before: Vec<f64> = layer.stars().iter().map(|s| s.opacity).collect();
    layer.animate(10.0);
    assert_eq!(layer.rotation_rad(), 10.0 * cfg.near.drift);
    let after: Vec<f64> = layer.stars().iter().map(|s| s.opacity).collect();
    assert_ne!(before, after);
}

#[test]
fn near_layers_parallax_further_than_far_layers() {
    let cfg = FieldConfig::default();
    let mut rng = Rng64::new(2);
    let mut far = StarLayer::generate(LayerKind::Far, 1, &cfg, &mut rng);
    let mut near = StarLayer::generate(LayerKind::Near, 1, &cfg, &mut rng);
    far.apply_parallax(1000.0, Vec2::new(0.5, 0.0));
    near.apply_parallax(1000.0, Vec2::new(0.5, 0.0));
    assert!(near.parallax().y > far.parallax().y);
    assert!(near.parallax().x > far.parallax().x);
}

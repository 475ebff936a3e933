use super::*;

#[test]
fn viewport_rejects_degenerate_sizes() {
    assert!(Viewport::new(0.0, 10.0).is_err());
    assert!(Viewport::new(10.0, f64::NAN).is_err());
    let vp = Viewport::new(800.0, 400.0).unwrap();
    assert_eq!(vp.aspect(), 2.0);
    assert_eq!(vp.center_y(100.0), 300.0);
}

#[test]
fn alpha_and_scale_helpers_clamp() {
    let c = Rgba8::rgb(200, 100, 0);
    assert_eq!(c.with_alpha(2.0).a, 255);
    assert_eq!(c.with_alpha(0.0).a, 0);
    let brighter = c.scale_rgb(2.0);
    assert_eq!((brighter.r, brighter.g, brighter.b), (255, 200, 0));
}

use super::*;

const ALL: [Ease; 9] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::InOutSine,
    Ease::OutBack,
];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert!(ease.apply(0.0).abs() < 1e-12, "{ease:?}");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease:?}");
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in ALL.into_iter().filter(|e| *e != Ease::OutBack) {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b, "{ease:?}");
        assert!(b < c, "{ease:?}");
    }
}

#[test]
fn out_back_overshoots_before_settling() {
    let peak = (1..100)
        .map(|i| Ease::OutBack.apply(f64::from(i) / 100.0))
        .fold(0.0f64, f64::max);
    assert!(peak > 1.0);
}

#[test]
fn inputs_outside_unit_range_clamp() {
    for ease in ALL {
        assert_eq!(ease.apply(-3.0), ease.apply(0.0));
        assert_eq!(ease.apply(7.0), ease.apply(1.0));
    }
}

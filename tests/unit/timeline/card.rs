use super::*;
use crate::{
    foundation::core::Rect,
    runtime::ComponentId,
    stage::document::{Document, RegionKind},
    trigger::registry::{TriggerRegistry, TriggerSpec},
};

fn beat(ordinal: usize) -> Beat {
    Beat {
        id: format!("beat-{ordinal}"),
        ordinal,
        photo: None,
        sticker_left: Some("/l.png".to_string()),
        sticker_right: None,
        time_label: None,
        title: Some("t".to_string()),
        caption: None,
        theme: ThemeName::Christmas,
        secondary: None,
    }
}

fn card(reduced_motion: bool) -> Card {
    let cfg = CardConfig::default();
    let mut doc = Document::new();
    let region = doc.insert(
        RegionKind::Card,
        Rect::new(0.0, 0.0, 10.0, 10.0),
        None,
        Default::default(),
    );
    let mut reg = TriggerRegistry::new(800.0);
    let trigger = reg.register(
        &doc,
        region,
        TriggerSpec::new(ComponentId::Timeline, cfg.start, cfg.end),
    );
    Card::new(&beat(0), region, None, trigger, &cfg, reduced_motion)
}

fn tick(now_s: f64, dt_s: f64) -> FrameTick {
    FrameTick {
        frame: 0,
        now_s,
        dt_s,
    }
}

#[test]
fn sides_alternate_by_ordinal() {
    assert_eq!(Side::for_ordinal(0), Side::Left);
    assert_eq!(Side::for_ordinal(1), Side::Right);
    assert_eq!(Side::for_ordinal(4), Side::Left);
    assert_eq!(Side::for_ordinal(7), Side::Right);
}

#[test]
fn float_loop_holds_offset_while_paused() {
    let mut f = FloatLoop::new(10.0, 4.0);
    f.advance(1.0);
    assert_eq!(f.offset_px(), 0.0);
    f.resume();
    f.advance(1.0);
    assert!((f.offset_px() + 10.0).abs() < 1e-9);
    f.pause();
    f.advance(1.0);
    assert!((f.offset_px() + 10.0).abs() < 1e-9);
}

#[test]
fn entry_reveals_then_starts_floating() {
    let cfg = CardConfig::default();
    let mut c = card(false);
    let hidden = c.visual();
    assert_eq!(hidden.opacity, 0.0);
    assert_eq!(hidden.entry_offset_px, cfg.entry_offset_px);
    assert_eq!(hidden.blur_px, cfg.entry_blur_px);

    c.begin_entry(10.0, &cfg);
    assert_eq!(c.phase(), CardPhase::Entering);
    assert!(c.is_animating());

    c.advance(&tick(10.2, 0.2));
    let mid = c.visual();
    assert!(mid.opacity > 0.0 && mid.opacity < 1.0);
    // Stickers trail the main content on the way in.
    assert!(mid.sticker_opacity < mid.opacity);
    assert!(!c.float_loop().unwrap().is_running());

    c.advance(&tick(11.05, 0.85));
    assert_eq!(c.phase(), CardPhase::Active);
    let shown = c.visual();
    assert_eq!(shown.opacity, 1.0);
    assert_eq!(shown.entry_offset_px, 0.0);
    assert_eq!(shown.blur_px, 0.0);
    assert_eq!(shown.sticker_opacity, 1.0);
    assert!(c.float_loop().unwrap().is_running());
}

#[test]
fn exit_pauses_float_and_stickers_leave_first() {
    let cfg = CardConfig::default();
    let mut c = card(false);
    c.begin_entry(0.0, &cfg);
    c.advance(&tick(1.05, 1.05));
    c.advance(&tick(1.55, 0.5));
    let float_before = c.visual().float_offset_px;

    c.begin_exit(2.0, CardPhase::After, &cfg);
    assert_eq!(c.phase(), CardPhase::Exiting);
    assert!(!c.float_loop().unwrap().is_running());

    c.advance(&tick(2.4, 0.4));
    let v = c.visual();
    assert_eq!(v.sticker_opacity, 0.0);
    assert!(v.opacity > 0.0);
    assert_eq!(v.float_offset_px, float_before);

    c.advance(&tick(2.7, 0.3));
    assert_eq!(c.phase(), CardPhase::After);
    assert_eq!(c.visual().opacity, 0.0);
    assert!(!c.is_animating());
}

#[test]
fn reentry_mid_exit_continues_from_current_reveal() {
    let cfg = CardConfig::default();
    let mut c = card(false);
    c.begin_entry(0.0, &cfg);
    c.advance(&tick(1.05, 1.05));
    c.begin_exit(2.0, CardPhase::Before, &cfg);
    c.advance(&tick(2.3, 0.3));
    let partial = c.visual().opacity;

    c.begin_entry(2.3, &cfg);
    c.advance(&tick(2.3, 0.0));
    assert!((c.visual().opacity - partial).abs() < 1e-9);
}

#[test]
fn reduced_motion_is_a_single_transition_without_float() {
    let cfg = CardConfig::default();
    let mut c = card(true);
    assert!(!c.has_float_loop());
    c.begin_entry(0.0, &cfg);
    assert_eq!(c.phase(), CardPhase::Active);
    assert!(!c.is_animating());
    let v = c.visual();
    assert_eq!(v.opacity, 1.0);
    assert_eq!(v.offset_px(), 0.0);
    assert_eq!(v.transition_s, cfg.reduced_motion_fade_s);

    c.begin_exit(1.0, CardPhase::After, &cfg);
    assert_eq!(c.phase(), CardPhase::After);
    assert_eq!(c.visual().opacity, 1.0);
}

use super::*;
use crate::{content::story::SecondaryEffect, env::capability::PerformanceTier};

fn beats(n: usize) -> Vec<Beat> {
    (0..n)
        .map(|i| Beat {
            id: format!("b{i}"),
            ordinal: i,
            photo: None,
            sticker_left: None,
            sticker_right: None,
            time_label: None,
            title: None,
            caption: None,
            theme: if i % 2 == 1 {
                ThemeName::Christmas
            } else {
                ThemeName::Galaxy
            },
            secondary: (i == 2).then_some(SecondaryEffect::Sparkle),
        })
        .collect()
}

fn viewport() -> Viewport {
    Viewport::new(1280.0, 800.0).unwrap()
}

fn built(n: usize, reduced_motion: bool) -> (Timeline, Document, TriggerRegistry) {
    let mut doc = Document::new();
    let mut triggers = TriggerRegistry::new(800.0);
    let mut timeline = Timeline::new(
        CardConfig::default(),
        InitConfig::new(PerformanceTier::High, reduced_motion),
    );
    timeline
        .build(&beats(n), viewport(), 800.0, &mut doc, &mut triggers)
        .unwrap();
    (timeline, doc, triggers)
}

#[test]
fn build_lays_cards_out_in_alternating_columns() {
    let (timeline, doc, triggers) = built(4, false);
    assert_eq!(timeline.len(), 4);
    let cards: Vec<&Card> = timeline.cards().collect();
    for (i, card) in cards.iter().enumerate() {
        assert_eq!(card.ordinal, i);
        assert_eq!(card.side, Side::for_ordinal(i));
        let rect = doc.rect(card.region).unwrap();
        if card.side == Side::Left {
            assert!(rect.center().x < 640.0);
        } else {
            assert!(rect.center().x > 640.0);
        }
        let attrs = &doc.region(card.region).unwrap().attrs;
        assert_eq!(attrs.card_id.as_deref(), Some(card.id.as_str()));
        assert_eq!(attrs.ordinal, Some(i));
        assert_eq!(attrs.theme, Some(card.theme));
    }
    assert_eq!(triggers.count_for(ComponentId::Timeline), 4);
    assert_eq!(triggers.count_for(ComponentId::Theme), 4);
    assert_eq!(timeline.float_loop_count(), 4);

    let container = doc.rect(timeline.container().unwrap()).unwrap();
    let last = doc.rect(cards[3].region).unwrap();
    assert_eq!(container.y0, 800.0);
    assert_eq!(container.y1, last.y1);
}

#[test]
fn only_beats_with_a_secondary_effect_get_a_slot() {
    let (timeline, doc, _) = built(4, false);
    let slots: Vec<_> = doc.regions_of(RegionKind::EffectSlot).collect();
    assert_eq!(slots.len(), 1);
    let card = timeline.card("b2").unwrap();
    assert_eq!(card.effect_slot, Some(slots[0].id));
    assert_eq!(slots[0].parent, Some(card.region));
}

#[test]
fn rebuilding_requires_teardown() {
    let (mut timeline, mut doc, mut triggers) = built(2, false);
    let err = timeline
        .build(&beats(2), viewport(), 800.0, &mut doc, &mut triggers)
        .unwrap_err();
    assert!(err.to_string().starts_with("validation error:"));

    let mut clock = FrameClock::new();
    timeline.teardown(&mut doc, &mut triggers, &mut clock);
    assert!(doc.regions_of(RegionKind::Card).next().is_none());
    assert_eq!(
        timeline
            .build(&beats(3), viewport(), 800.0, &mut doc, &mut triggers)
            .unwrap(),
        3
    );
}

#[test]
fn entry_events_drive_cards() {
    let (mut timeline, mut doc, mut triggers) = built(2, false);
    let mut clock = FrameClock::new();
    let card = timeline.card("b1").unwrap();
    let rect = doc.rect(card.region).unwrap();
    let start = timeline.config.start.scroll_offset(rect, 800.0);

    for e in triggers.update(start + 1.0) {
        timeline.handle_event(&e, 0.0);
        // Entering at the bottom of the viewport does not claim the theme.
        assert_eq!(timeline.theme_binding(&e), None);
    }
    assert_eq!(timeline.card("b1").unwrap().phase(), CardPhase::Entering);

    timeline.sync_frames(&mut clock);
    assert_eq!(clock.active_for(ComponentId::Timeline), 1);

    let tick = clock.tick(1.1).unwrap();
    timeline.advance(&tick);
    assert_eq!(timeline.card("b1").unwrap().phase(), CardPhase::Active);
    // Floating keeps the subscription alive.
    timeline.sync_frames(&mut clock);
    assert_eq!(clock.active_for(ComponentId::Timeline), 1);

    timeline.teardown(&mut doc, &mut triggers, &mut clock);
    assert_eq!(clock.active_count(), 0);
}

#[test]
fn theme_binding_follows_the_viewport_center_line() {
    let (timeline, _doc, mut triggers) = built(3, true);
    // b1 spans 1380..1800; the center line sits at scroll + 400.
    let bindings = |triggers: &mut TriggerRegistry, y: f64| -> Vec<ThemeBinding> {
        triggers
            .update(y)
            .iter()
            .filter_map(|e| timeline.theme_binding(e))
            .collect()
    };

    assert_eq!(
        bindings(&mut triggers, 600.0),
        vec![ThemeBinding::Bind(ThemeName::Galaxy)]
    );
    assert_eq!(
        bindings(&mut triggers, 1000.0),
        vec![ThemeBinding::Release, ThemeBinding::Bind(ThemeName::Christmas)]
    );
    assert!(bindings(&mut triggers, 1300.0).is_empty());
    assert_eq!(bindings(&mut triggers, 1450.0), vec![ThemeBinding::Release]);
    assert_eq!(
        bindings(&mut triggers, 1200.0),
        vec![ThemeBinding::Bind(ThemeName::Christmas)]
    );
}

#[test]
fn reduced_motion_never_subscribes_to_frames() {
    let (mut timeline, _doc, mut triggers) = built(3, true);
    let mut clock = FrameClock::new();
    assert_eq!(timeline.float_loop_count(), 0);
    for y in [0.0, 2000.0, 4000.0, 0.0] {
        for e in triggers.update(y) {
            timeline.handle_event(&e, 0.0);
        }
        timeline.sync_frames(&mut clock);
        assert_eq!(clock.active_count(), 0);
    }
    assert!(timeline.cards().all(|c| c.visual().opacity == 1.0));
}

#[test]
fn theme_candidates_follow_card_boxes() {
    let (timeline, doc, _) = built(3, false);
    let candidates = timeline.theme_candidates(&doc);
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[1].theme, ThemeName::Christmas);
    assert_eq!(candidates[1].rect, doc.rect(timeline.card("b1").unwrap().region).unwrap());
}

#[test]
fn teardown_is_idempotent() {
    let (mut timeline, mut doc, mut triggers) = built(3, false);
    let mut clock = FrameClock::new();
    timeline.teardown(&mut doc, &mut triggers, &mut clock);
    timeline.teardown(&mut doc, &mut triggers, &mut clock);
    assert!(timeline.is_empty());
    assert!(!timeline.is_built());
    assert_eq!(triggers.count_for(ComponentId::Timeline), 0);
    assert_eq!(triggers.count_for(ComponentId::Theme), 0);
    assert_eq!(clock.active_for(ComponentId::Timeline), 0);
    assert_eq!(doc.listener_count_for(ComponentId::Timeline), 0);
}

use super::*;
use crate::{
    env::capability::PerformanceTier,
    stage::document::{RegionAttrs, RegionKind},
    theme::controller::ThemeController,
};

const VH: f64 = 1000.0;

struct Rig {
    doc: Document,
    triggers: TriggerRegistry,
    clock: FrameClock,
    ending: EndingEffects,
}

fn rig(tier: PerformanceTier, reduced_motion: bool, message: &str) -> Rig {
    let mut doc = Document::new();
    let region = doc.insert(
        RegionKind::Ending,
        Rect::new(0.0, 5000.0, 1200.0, 6000.0),
        None,
        RegionAttrs::default(),
    );
    let text = doc.insert(
        RegionKind::EndingText,
        Rect::new(400.0, 5400.0, 800.0, 5600.0),
        Some(region),
        RegionAttrs::default(),
    );
    let mut triggers = TriggerRegistry::new(VH);
    let mut clock = FrameClock::new();
    let mut ending = EndingEffects::new(
        EndingConfig::default(),
        InitConfig::new(tier, reduced_motion),
        Some(message.to_string()),
        &ThemeController::default().current(),
    );
    ending.init(region, Some(text), 9, 0.0, &doc, &mut triggers, &mut clock);
    Rig {
        doc,
        triggers,
        clock,
        ending,
    }
}

impl Rig {
    fn scroll(&mut self, y: f64, now_s: f64) {
        for e in self.triggers.update(y) {
            self.ending.handle_event(&e, now_s, &mut self.clock);
        }
    }

    fn tick(&mut self, now_s: f64) {
        let tick = self.clock.tick(now_s).unwrap();
        self.ending.advance(&tick, &self.doc, &mut self.clock);
    }
}

#[test]
fn burst_particles_fan_out_evenly_and_fade() {
    let burst = ParticleBurst::spawn(
        Point::new(10.0, 10.0),
        4,
        200.0,
        -50.0,
        1.8,
        Rgba8::rgb(1, 2, 3),
        0.0,
    );
    assert_eq!(burst.len(), 4);
    let t = burst.particles()[1].target;
    assert!(t.x.abs() < 1e-9 && (t.y - 150.0).abs() < 1e-9);

    let start = burst.sample(0.0);
    assert!(start.iter().all(|s| s.position == Point::new(10.0, 10.0) && s.opacity == 1.0));
    let end = burst.sample(1.8);
    assert!(end.iter().all(|s| s.opacity == 0.0));
    assert_eq!(end[0].position, Point::new(210.0, -40.0));
    assert!(burst.is_finished(1.8));
}

#[test]
fn floating_stars_rise_fade_and_rest() {
    let star = FloatingStar {
        x_frac: 0.5,
        y_frac: 0.5,
        duration_s: 4.0,
        delay_s: 1.0,
    };
    assert_eq!(star.sample(0.5), (0.0, 0.0));
    let (peak, rise) = star.sample(3.0);
    assert!((peak - 0.6).abs() < 1e-9);
    assert!((rise + 15.0).abs() < 1e-9);
    // Resting between loops.
    assert_eq!(star.sample(5.5), (0.0, 0.0));
    assert_eq!(star.sample(8.0), star.sample(3.0));
}

#[test]
fn typewriter_reveals_then_bursts_once() {
    let mut r = rig(PerformanceTier::Medium, false, "Hi!");
    assert_eq!(r.clock.active_for(ComponentId::Ending), 1);
    assert_eq!(r.ending.floating_stars().len(), 5);

    // Ending top meets the viewport center at scroll 4500.
    r.scroll(4600.0, 10.0);
    assert_eq!(r.ending.phase(), EndingPhase::Waiting);
    assert_eq!(r.triggers.count_for(ComponentId::Ending), 0);

    r.tick(10.2);
    assert_eq!(r.ending.visible_text(), "");
    r.tick(10.5);
    assert_eq!(r.ending.visible_text(), "H");
    r.tick(10.545);
    assert_eq!(r.ending.visible_text(), "Hi");
    r.tick(10.59);
    assert_eq!(r.ending.visible_text(), "Hi!");
    assert_eq!(r.ending.phase(), EndingPhase::Bursting);

    let burst = r.ending.burst().unwrap();
    assert_eq!(burst.len(), 20);
    assert_eq!(burst.origin, Point::new(600.0, 5500.0));

    r.tick(12.5);
    assert_eq!(r.ending.phase(), EndingPhase::Done);
    assert!(r.ending.burst().is_none());
    assert_eq!(r.ending.bursts_spawned(), 1);

    // Scrolling away and back does not replay it.
    r.scroll(0.0, 13.0);
    r.scroll(4600.0, 14.0);
    assert_eq!(r.ending.phase(), EndingPhase::Done);
}

#[test]
fn reduced_motion_shows_text_at_once_without_burst_or_frames() {
    let mut r = rig(PerformanceTier::High, true, "Merry Christmas");
    assert_eq!(r.clock.active_count(), 0);
    assert!(r.ending.floating_stars().is_empty());
    r.scroll(4600.0, 1.0);
    assert_eq!(r.ending.visible_text(), "Merry Christmas");
    assert_eq!(r.ending.phase(), EndingPhase::Done);
    assert!(r.ending.burst().is_none());
    assert_eq!(r.ending.text_transition_s(), 0.5);
    assert_eq!(r.clock.active_count(), 0);
}

#[test]
fn teardown_twice_clears_everything() {
    let mut r = rig(PerformanceTier::Low, false, "x");
    r.scroll(4600.0, 0.0);
    r.ending.teardown(&mut r.triggers, &mut r.clock);
    r.ending.teardown(&mut r.triggers, &mut r.clock);
    assert_eq!(r.clock.active_for(ComponentId::Ending), 0);
    assert_eq!(r.triggers.count_for(ComponentId::Ending), 0);
    assert!(r.ending.floating_star_states().is_empty());
}

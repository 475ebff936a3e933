use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use super::*;
use crate::{env::capability::PerformanceTier, foundation::error::StarcardError};

#[derive(Debug, Default)]
struct SinkLog {
    plays: usize,
    pauses: usize,
    configured: Option<(f64, bool)>,
}

struct ScriptedSink {
    outcomes: VecDeque<bool>,
    log: Rc<RefCell<SinkLog>>,
}

impl AudioSink for ScriptedSink {
    fn play(&mut self) -> StarcardResult<()> {
        self.log.borrow_mut().plays += 1;
        if self.outcomes.pop_front().unwrap_or(true) {
            Ok(())
        } else {
            Err(StarcardError::playback("autoplay blocked"))
        }
    }

    fn pause(&mut self) {
        self.log.borrow_mut().pauses += 1;
    }

    fn configure(&mut self, volume: f64, looped: bool) {
        self.log.borrow_mut().configured = Some((volume, looped));
    }
}

fn toggle_with(outcomes: &[bool]) -> (AudioToggle, Document, Rc<RefCell<SinkLog>>) {
    let log = Rc::new(RefCell::new(SinkLog::default()));
    let sink = ScriptedSink {
        outcomes: outcomes.iter().copied().collect(),
        log: Rc::clone(&log),
    };
    let mut doc = Document::new();
    let mut audio = AudioToggle::new(AudioConfig::default());
    audio.init(
        Some("/assets/music/track.mp3"),
        Some(Box::new(sink)),
        InitConfig::new(PerformanceTier::High, false),
        &mut doc,
    );
    (audio, doc, log)
}

#[test]
fn init_configures_sink_and_listens_for_clicks() {
    let (audio, doc, log) = toggle_with(&[]);
    assert_eq!(log.borrow().configured, Some((0.5, true)));
    assert!(doc.is_listening(
        ComponentId::Audio,
        HostEventKind::Click(Control::MusicButton)
    ));
    assert_eq!(audio.affordance(), Affordance::Play);
}

#[test]
fn toggling_alternates_between_playing_and_paused() {
    let (mut audio, _doc, log) = toggle_with(&[true]);
    let mut timers = Timers::new();
    assert_eq!(audio.toggle(&mut timers, 0.0), PlaybackState::Playing);
    assert_eq!(audio.affordance(), Affordance::Pause);
    assert_eq!(audio.toggle(&mut timers, 1.0), PlaybackState::Paused);
    let log = log.borrow();
    assert_eq!((log.plays, log.pauses), (1, 1));
}

#[test]
fn refused_playback_stays_paused_and_offers_retry() {
    let (mut audio, _doc, _log) = toggle_with(&[false, true]);
    let mut timers = Timers::new();
    assert_eq!(audio.toggle(&mut timers, 0.0), PlaybackState::Paused);
    assert_eq!(audio.affordance(), Affordance::Retry);
    assert_eq!(audio.toggle(&mut timers, 1.0), PlaybackState::Playing);
    assert_eq!(audio.affordance(), Affordance::Pause);
}

#[test]
fn missing_source_disables_the_control() {
    let mut doc = Document::new();
    let mut audio = AudioToggle::new(AudioConfig::default());
    let log = Rc::new(RefCell::new(SinkLog::default()));
    let sink = ScriptedSink {
        outcomes: VecDeque::new(),
        log: Rc::clone(&log),
    };
    let affordance = audio.init(
        None,
        Some(Box::new(sink)),
        InitConfig::new(PerformanceTier::High, false),
        &mut doc,
    );
    assert_eq!(affordance, Affordance::Disabled);
    let mut timers = Timers::new();
    assert_eq!(audio.toggle(&mut timers, 0.0), PlaybackState::Paused);
    assert_eq!(log.borrow().plays, 0);
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn rapid_clicks_share_one_feedback_pulse() {
    let (mut audio, _doc, _log) = toggle_with(&[]);
    let mut timers = Timers::new();
    audio.toggle(&mut timers, 0.0);
    audio.toggle(&mut timers, 0.1);
    audio.toggle(&mut timers, 0.2);
    assert_eq!(timers.pending_for(ComponentId::Audio), 1);

    let fired = timers.take_due(1.0);
    assert_eq!(fired.len(), 1);
    assert!(audio.on_timer(fired[0].0, 1.0));
    assert_eq!(audio.feedback_intensity(1.0), 1.0);
    assert!(audio.feedback_intensity(1.3) > 0.0);
    assert_eq!(audio.feedback_intensity(2.0), 0.0);
}

#[test]
fn teardown_pauses_and_releases_everything() {
    let (mut audio, mut doc, log) = toggle_with(&[]);
    let mut timers = Timers::new();
    audio.toggle(&mut timers, 0.0);
    audio.teardown(&mut timers, &mut doc);
    audio.teardown(&mut timers, &mut doc);
    assert_eq!(audio.state(), PlaybackState::Paused);
    assert_eq!(log.borrow().pauses, 1);
    assert_eq!(timers.pending_for(ComponentId::Audio), 0);
    assert_eq!(doc.listener_count_for(ComponentId::Audio), 0);
}

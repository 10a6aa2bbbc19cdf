//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the host is responsible for calling `frame()` at its
//! refresh cadence while `is_scheduled()` reports an active loop.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running
//!   ^        |                    |
//!   +--------+---- reset ---------+
//! ```
//!
//! A countdown that reaches zero drops back to Idle on its own. A stopwatch
//! that reaches [`MAX_DURATION_MS`] pauses itself.
//!
//! ## Drift
//!
//! Progress is measured as the real time between applied updates, never as
//! a fixed step per frame. Frames closer together than
//! [`UPDATE_INTERVAL_MS`] are coalesced into the next one, so scheduler
//! jitter changes how often ticks are emitted but not how much time passes.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new();
//! engine.set_target_time(5 * 60 * 1000)?;
//! engine.start();
//! // In the host loop:
//! while engine.is_scheduled() {
//!     engine.frame(); // Emits Tick, and Complete when the countdown ends
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use crate::error::ValidationError;
use crate::events::{EventKind, ListenerId, Listeners, TimerEvent};
use crate::format;

/// Longest time either mode can hold: 24 hours.
pub const MAX_DURATION_MS: u64 = 24 * 60 * 60 * 1000;

/// Minimum real time between two applied updates.
pub const UPDATE_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    #[default]
    Countdown,
    Stopwatch,
}

impl TimerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Countdown => "countdown",
            TimerMode::Stopwatch => "stopwatch",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "countdown" => Ok(TimerMode::Countdown),
            "stopwatch" => Ok(TimerMode::Stopwatch),
            _ => Err(ValidationError::InvalidMode(s.to_string())),
        }
    }
}

/// Coarse lifecycle phase derived from the running/paused flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Idle,
    Running,
    Paused,
}

/// Value snapshot of the engine. Mutating a copy never affects the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: TimerMode,
    pub is_running: bool,
    pub is_paused: bool,
    /// Remaining time (countdown) or elapsed time (stopwatch), in ms.
    pub current_time: u64,
    /// Countdown duration in ms. Unused in stopwatch mode.
    pub target_time: u64,
    /// Clock reading of the most recent start or resume.
    pub start_time: Option<u64>,
}

impl TimerState {
    pub fn phase(&self) -> RunPhase {
        if self.is_running {
            RunPhase::Running
        } else if self.is_paused {
            RunPhase::Paused
        } else {
            RunPhase::Idle
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            mode: TimerMode::Countdown,
            is_running: false,
            is_paused: false,
            current_time: 0,
            target_time: 0,
            start_time: None,
        }
    }
}

/// Core timer engine.
///
/// Every command returns the events it emitted, in emission order, after
/// they have been delivered to registered listeners.
pub struct TimerEngine {
    clock: Arc<dyn Clock>,
    state: TimerState,
    /// Clock reading of the last applied update.
    last_update_ms: u64,
    /// Whether the host should keep calling `frame()`.
    scheduled: bool,
    destroyed: bool,
    listeners: HashMap<EventKind, Listeners<TimerEvent>>,
}

impl TimerEngine {
    /// Create an idle countdown engine on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::new()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: TimerState::default(),
            last_update_ms: 0,
            scheduled: false,
            destroyed: false,
            listeners: HashMap::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn current_time(&self) -> u64 {
        self.state.current_time
    }

    pub fn target_time(&self) -> u64 {
        self.state.target_time
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused
    }

    /// Whether the progression loop is active.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// 0.0 .. 1.0 completion. Countdown measures consumed target time,
    /// stopwatch measures elapsed time against the 24h cap.
    pub fn progress(&self) -> f64 {
        match self.state.mode {
            TimerMode::Countdown => {
                let target = self.state.target_time;
                if target == 0 {
                    return 0.0;
                }
                let consumed = target.saturating_sub(self.state.current_time);
                (consumed as f64 / target as f64).clamp(0.0, 1.0)
            }
            TimerMode::Stopwatch => {
                (self.state.current_time as f64 / MAX_DURATION_MS as f64).clamp(0.0, 1.0)
            }
        }
    }

    pub fn format_time(ms: i64) -> String {
        format::format_time(ms)
    }

    pub fn parse_time(input: &str) -> Result<u64, ValidationError> {
        format::parse_time(input)
    }

    // ── Listeners ────────────────────────────────────────────────────

    pub fn add_event_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&TimerEvent) + Send + 'static,
    {
        self.listeners
            .entry(kind)
            .or_insert_with(|| Listeners::new(kind.as_str()))
            .add(callback)
    }

    /// Returns `false` if no such listener was registered for `kind`.
    pub fn remove_event_listener(&mut self, kind: EventKind, id: ListenerId) -> bool {
        self.listeners
            .get_mut(&kind)
            .map(|l| l.remove(id))
            .unwrap_or(false)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Switch mode. A running timer is paused first; the new mode always
    /// starts from its rest value.
    ///
    /// Emits `pause` (if it was running), `modeChanged`, then `reset`.
    pub fn set_mode(&mut self, mode: TimerMode) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.destroyed {
            return events;
        }

        let was_running = self.state.is_running;
        if was_running {
            self.pause_into(&mut events);
        }

        let previous_mode = self.state.mode;
        self.state.mode = mode;
        self.state.current_time = self.rest_time();
        self.state.is_running = false;
        self.state.is_paused = false;
        debug!(from = %previous_mode, to = %mode, "timer mode changed");
        self.emit(
            TimerEvent::ModeChanged {
                mode,
                previous_mode,
            },
            &mut events,
        );

        self.reset_into(was_running, &mut events);
        events
    }

    /// Set the countdown duration. In countdown mode this also rewinds the
    /// remaining time to the new target.
    pub fn set_target_time(&mut self, ms: i64) -> Result<Vec<TimerEvent>, ValidationError> {
        if ms < 0 {
            return Err(ValidationError::invalid(
                "target_time",
                format!("must not be negative (got {ms})"),
            ));
        }
        let ms = ms as u64;
        if ms > MAX_DURATION_MS {
            return Err(ValidationError::invalid(
                "target_time",
                format!("must not exceed {MAX_DURATION_MS} ms (got {ms})"),
            ));
        }

        let mut events = Vec::new();
        if self.destroyed {
            return Ok(events);
        }

        self.state.target_time = ms;
        if self.state.mode == TimerMode::Countdown {
            self.state.current_time = ms;
        }
        self.emit(TimerEvent::TargetTimeChanged { target_time: ms }, &mut events);
        Ok(events)
    }

    /// Start the timer. A countdown with no remaining time, or a stopwatch
    /// at its cap, emits `error` and stays where it is.
    pub fn start(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.destroyed || self.state.is_running {
            return events;
        }

        if let Some(message) = self.exhausted() {
            debug!(mode = %self.state.mode, "refusing to start exhausted timer");
            self.emit(TimerEvent::Error { message: message.to_string() }, &mut events);
            return events;
        }

        let now = self.clock.now_ms();
        self.state.is_running = true;
        self.state.is_paused = false;
        self.state.start_time = Some(now);
        self.last_update_ms = now;
        self.scheduled = true;
        debug!(mode = %self.state.mode, current_time = self.state.current_time, "timer started");
        self.emit(
            TimerEvent::Start {
                mode: self.state.mode,
                current_time: self.state.current_time,
            },
            &mut events,
        );
        events
    }

    /// Stop progression, keeping the current time exactly as displayed.
    pub fn pause(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.destroyed || !self.state.is_running || self.state.is_paused {
            return events;
        }
        self.pause_into(&mut events);
        events
    }

    /// Continue from a pause. Time spent paused is never counted.
    pub fn resume(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.destroyed || !self.state.is_paused {
            return events;
        }
        if let Some(message) = self.exhausted() {
            debug!(mode = %self.state.mode, "refusing to resume exhausted timer");
            self.emit(TimerEvent::Error { message: message.to_string() }, &mut events);
            return events;
        }

        let now = self.clock.now_ms();
        self.state.is_running = true;
        self.state.is_paused = false;
        self.state.start_time = Some(now);
        self.last_update_ms = now;
        self.scheduled = true;
        debug!(current_time = self.state.current_time, "timer resumed");
        self.emit(
            TimerEvent::Resume {
                mode: self.state.mode,
                current_time: self.state.current_time,
            },
            &mut events,
        );
        events
    }

    /// Return to idle with the mode's rest value (target or zero).
    pub fn reset(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.destroyed {
            return events;
        }
        let was_running = self.state.is_running;
        self.reset_into(was_running, &mut events);
        events
    }

    /// Scheduler callback. Applies the real time elapsed since the last
    /// applied update once at least [`UPDATE_INTERVAL_MS`] has passed.
    pub fn frame(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if self.destroyed || !self.scheduled || !self.state.is_running {
            return events;
        }

        let now = self.clock.now_ms();
        let delta = now.saturating_sub(self.last_update_ms);
        if delta < UPDATE_INTERVAL_MS {
            return events;
        }
        self.last_update_ms = now;

        self.state.current_time = match self.state.mode {
            TimerMode::Countdown => self.state.current_time.saturating_sub(delta),
            TimerMode::Stopwatch => self
                .state
                .current_time
                .saturating_add(delta)
                .min(MAX_DURATION_MS),
        };

        self.emit(
            TimerEvent::Tick {
                mode: self.state.mode,
                current_time: self.state.current_time,
                target_time: self.state.target_time,
                is_running: self.state.is_running,
                progress: self.progress(),
            },
            &mut events,
        );

        match self.state.mode {
            TimerMode::Countdown if self.state.current_time == 0 => {
                self.scheduled = false;
                self.state.is_running = false;
                self.state.is_paused = false;
                self.state.start_time = None;
                info!(target_time = self.state.target_time, "countdown complete");
                self.emit(
                    TimerEvent::Complete {
                        mode: TimerMode::Countdown,
                        final_time: 0,
                    },
                    &mut events,
                );
            }
            TimerMode::Stopwatch if self.state.current_time >= MAX_DURATION_MS => {
                self.pause_into(&mut events);
                info!("stopwatch reached maximum duration");
                self.emit(
                    TimerEvent::MaxDurationReached {
                        current_time: self.state.current_time,
                    },
                    &mut events,
                );
            }
            _ => {}
        }

        events
    }

    /// Stop the loop and drop every listener. Safe to call repeatedly; all
    /// later commands are no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.scheduled = false;
        self.state.is_running = false;
        self.state.is_paused = false;
        self.listeners.clear();
        self.destroyed = true;
        debug!("timer engine destroyed");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn rest_time(&self) -> u64 {
        match self.state.mode {
            TimerMode::Countdown => self.state.target_time,
            TimerMode::Stopwatch => 0,
        }
    }

    /// Why the timer cannot run any further from its current reading.
    fn exhausted(&self) -> Option<&'static str> {
        match self.state.mode {
            TimerMode::Countdown if self.state.current_time == 0 => {
                Some("Cannot start countdown: no time remaining. Set a duration first.")
            }
            TimerMode::Stopwatch if self.state.current_time >= MAX_DURATION_MS => {
                Some("Stopwatch reached its maximum duration. Reset it first.")
            }
            _ => None,
        }
    }

    fn pause_into(&mut self, events: &mut Vec<TimerEvent>) {
        self.scheduled = false;
        self.state.is_running = false;
        self.state.is_paused = true;
        debug!(current_time = self.state.current_time, "timer paused");
        self.emit(
            TimerEvent::Pause {
                mode: self.state.mode,
                current_time: self.state.current_time,
            },
            events,
        );
    }

    fn reset_into(&mut self, was_running: bool, events: &mut Vec<TimerEvent>) {
        self.scheduled = false;
        self.state.is_running = false;
        self.state.is_paused = false;
        self.state.start_time = None;
        self.state.current_time = self.rest_time();
        debug!(mode = %self.state.mode, was_running, "timer reset");
        self.emit(
            TimerEvent::Reset {
                mode: self.state.mode,
                current_time: self.state.current_time,
                was_running,
            },
            events,
        );
    }

    fn emit(&mut self, event: TimerEvent, events: &mut Vec<TimerEvent>) {
        if let Some(listeners) = self.listeners.get_mut(&event.kind()) {
            listeners.emit(&event);
        }
        events.push(event);
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("last_update_ms", &self.last_update_ms)
            .field("scheduled", &self.scheduled)
            .field("destroyed", &self.destroyed)
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::clock::ManualClock;
    use std::sync::Mutex;

    fn engine() -> (TimerEngine, ManualClock) {
        let clock = ManualClock::starting_at(10_000);
        (TimerEngine::with_clock(Arc::new(clock.clone())), clock)
    }

    fn kinds(events: &[TimerEvent]) -> Vec<EventKind> {
        events.iter().map(TimerEvent::kind).collect()
    }

    #[test]
    fn start_pause_resume() {
        let (mut engine, _clock) = engine();
        engine.set_target_time(60_000).unwrap();
        assert_eq!(engine.state().phase(), RunPhase::Idle);

        assert_eq!(kinds(&engine.start()), vec![EventKind::Start]);
        assert_eq!(engine.state().phase(), RunPhase::Running);
        assert!(engine.is_scheduled());

        assert_eq!(kinds(&engine.pause()), vec![EventKind::Pause]);
        assert_eq!(engine.state().phase(), RunPhase::Paused);
        assert!(!engine.is_scheduled());

        assert_eq!(kinds(&engine.resume()), vec![EventKind::Resume]);
        assert_eq!(engine.state().phase(), RunPhase::Running);
    }

    #[test]
    fn repeated_commands_are_no_ops() {
        let (mut engine, _clock) = engine();
        engine.set_target_time(60_000).unwrap();
        assert!(engine.pause().is_empty());
        assert!(engine.resume().is_empty());
        engine.start();
        assert!(engine.start().is_empty());
        assert!(engine.resume().is_empty());
        engine.pause();
        assert!(engine.pause().is_empty());
    }

    #[test]
    fn starting_empty_countdown_emits_error() {
        let (mut engine, _clock) = engine();
        let events = engine.start();
        assert!(matches!(events.as_slice(), [TimerEvent::Error { .. }]));
        assert!(!engine.is_running());
        assert!(!engine.is_scheduled());
    }

    #[test]
    fn frames_closer_than_interval_are_coalesced() {
        let (mut engine, clock) = engine();
        engine.set_target_time(10_000).unwrap();
        engine.start();

        clock.advance(60);
        assert!(engine.frame().is_empty());
        assert_eq!(engine.current_time(), 10_000);

        clock.advance(60);
        let events = engine.frame();
        assert_eq!(kinds(&events), vec![EventKind::Tick]);
        assert_eq!(engine.current_time(), 9_880);
    }

    #[test]
    fn jittery_frames_do_not_drift() {
        let (mut engine, clock) = engine();
        engine.set_mode(TimerMode::Stopwatch);
        engine.start();
        for step in [16, 17, 33, 250, 16, 101, 7, 560] {
            clock.advance(step);
            engine.frame();
        }
        assert_eq!(engine.current_time(), 16 + 17 + 33 + 250 + 16 + 101 + 7 + 560);
    }

    #[test]
    fn paused_interval_is_not_charged() {
        let (mut engine, clock) = engine();
        engine.set_target_time(30_000).unwrap();
        engine.start();
        clock.advance(1_000);
        engine.frame();
        assert_eq!(engine.current_time(), 29_000);

        clock.advance(50);
        engine.pause();
        assert_eq!(engine.current_time(), 29_000);

        clock.advance(60_000);
        assert!(engine.frame().is_empty());
        engine.resume();
        assert_eq!(engine.current_time(), 29_000);

        clock.advance(500);
        engine.frame();
        assert_eq!(engine.current_time(), 28_500);
    }

    #[test]
    fn countdown_completes_once() {
        let (mut engine, clock) = engine();
        engine.set_target_time(250).unwrap();
        engine.start();

        clock.advance(300);
        let events = engine.frame();
        assert_eq!(kinds(&events), vec![EventKind::Tick, EventKind::Complete]);
        assert_eq!(engine.current_time(), 0);
        assert!(!engine.is_running());
        assert!(!engine.is_scheduled());

        clock.advance(300);
        assert!(engine.frame().is_empty());
    }

    #[test]
    fn stopwatch_caps_at_max_duration_and_pauses() {
        let (mut engine, clock) = engine();
        engine.set_mode(TimerMode::Stopwatch);
        engine.start();

        clock.advance(MAX_DURATION_MS + 5_000);
        let events = engine.frame();
        assert_eq!(
            kinds(&events),
            vec![EventKind::Tick, EventKind::Pause, EventKind::MaxDurationReached]
        );
        assert_eq!(engine.current_time(), MAX_DURATION_MS);
        assert!(engine.is_paused());
        assert!((engine.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stopwatch_at_cap_cannot_run_again() {
        let (mut engine, clock) = engine();
        let capped = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&capped);
        engine.add_event_listener(EventKind::MaxDurationReached, move |_| {
            *counter.lock().unwrap() += 1;
        });
        engine.set_mode(TimerMode::Stopwatch);
        engine.start();
        clock.advance(MAX_DURATION_MS + 5_000);
        engine.frame();

        for _ in 0..3 {
            let events = engine.resume();
            assert!(matches!(events.as_slice(), [TimerEvent::Error { .. }]));
            assert!(engine.is_paused() && !engine.is_scheduled());
            clock.advance(1_000);
            assert!(engine.frame().is_empty());
        }
        assert_eq!(kinds(&engine.start()), vec![EventKind::Error]);
        assert_eq!(*capped.lock().unwrap(), 1);
        assert_eq!(engine.current_time(), MAX_DURATION_MS);

        // Reset clears the cap.
        engine.reset();
        assert_eq!(kinds(&engine.start()), vec![EventKind::Start]);
    }

    #[test]
    fn mode_switch_event_order() {
        let (mut engine, _clock) = engine();
        engine.set_target_time(5_000).unwrap();
        engine.start();

        let events = engine.set_mode(TimerMode::Stopwatch);
        assert_eq!(
            kinds(&events),
            vec![EventKind::Pause, EventKind::ModeChanged, EventKind::Reset]
        );
        assert_eq!(engine.current_time(), 0);
        assert!(!engine.is_running() && !engine.is_paused());

        let events = engine.set_mode(TimerMode::Countdown);
        assert_eq!(kinds(&events), vec![EventKind::ModeChanged, EventKind::Reset]);
        assert_eq!(engine.current_time(), 5_000);
    }

    #[test]
    fn target_time_validation() {
        let (mut engine, _clock) = engine();
        assert!(engine.set_target_time(-1).is_err());
        assert!(engine.set_target_time(MAX_DURATION_MS as i64 + 1).is_err());
        assert!(engine.set_target_time(MAX_DURATION_MS as i64).is_ok());

        engine.set_mode(TimerMode::Stopwatch);
        engine.set_target_time(1_000).unwrap();
        assert_eq!(engine.current_time(), 0);
        assert_eq!(engine.target_time(), 1_000);
    }

    #[test]
    fn reset_reports_previous_running_flag() {
        let (mut engine, _clock) = engine();
        engine.set_target_time(5_000).unwrap();
        engine.start();
        match engine.reset().as_slice() {
            [TimerEvent::Reset {
                was_running,
                current_time,
                ..
            }] => {
                assert!(*was_running);
                assert_eq!(*current_time, 5_000);
            }
            other => panic!("Expected Reset, got {other:?}"),
        }
        match engine.reset().as_slice() {
            [TimerEvent::Reset { was_running, .. }] => assert!(!*was_running),
            other => panic!("Expected Reset, got {other:?}"),
        }
    }

    #[test]
    fn progress_by_mode() {
        let (mut engine, clock) = engine();
        assert_eq!(engine.progress(), 0.0);
        engine.set_target_time(1_000).unwrap();
        engine.start();
        clock.advance(250);
        engine.frame();
        assert!((engine.progress() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn listeners_receive_events_and_survive_panics() {
        let (mut engine, clock) = engine();
        let seen = Arc::new(Mutex::new(Vec::new()));
        engine.add_event_listener(EventKind::Tick, |_| panic!("bad display adapter"));
        let sink = Arc::clone(&seen);
        let id = engine.add_event_listener(EventKind::Tick, move |e| {
            if let TimerEvent::Tick { current_time, .. } = e {
                sink.lock().unwrap().push(*current_time);
            }
        });

        engine.set_target_time(1_000).unwrap();
        engine.start();
        clock.advance(100);
        engine.frame();
        assert!(engine.is_running());

        assert!(engine.remove_event_listener(EventKind::Tick, id));
        assert!(!engine.remove_event_listener(EventKind::Start, id));
        clock.advance(100);
        engine.frame();

        assert_eq!(*seen.lock().unwrap(), vec![900]);
        assert_eq!(engine.current_time(), 800);
    }

    #[test]
    fn destroy_is_idempotent_and_inert() {
        let (mut engine, clock) = engine();
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        engine.add_event_listener(EventKind::Tick, move |_| *counter.lock().unwrap() += 1);

        engine.set_target_time(5_000).unwrap();
        engine.start();
        engine.destroy();
        engine.destroy();

        clock.advance(1_000);
        assert!(engine.frame().is_empty());
        assert!(engine.start().is_empty());
        assert!(engine.reset().is_empty());
        assert!(!engine.is_scheduled());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn state_is_a_copy() {
        let (mut engine, _clock) = engine();
        engine.set_target_time(5_000).unwrap();
        let mut snapshot = engine.state();
        snapshot.current_time = 1;
        snapshot.is_running = true;
        assert_eq!(engine.current_time(), 5_000);
        assert!(!engine.is_running());
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("Stopwatch".parse::<TimerMode>().unwrap(), TimerMode::Stopwatch);
        assert!(matches!(
            "pomodoro".parse::<TimerMode>(),
            Err(ValidationError::InvalidMode(_))
        ));
    }
}

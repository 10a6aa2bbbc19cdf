//! Countdown policy on top of [`TimerEngine`].
//!
//! Adds duration validation, remaining-time warnings, minute milestones and
//! completion callbacks. The wrapped engine is only driven through its
//! public commands; every command's events are observed here so the
//! derived warning/milestone state resets in lockstep with the engine.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{TimerEngine, TimerMode, TimerState, MAX_DURATION_MS};
use super::milestone::{Milestone, MilestoneKind, MilestoneTracker};
use crate::error::ValidationError;
use crate::events::{EventKind, ListenerId, Listeners, TimerEvent};

/// Remaining-time warnings, checked in this order.
pub const WARNING_THRESHOLDS_MS: [u64; 6] = [60_000, 30_000, 10_000, 5_000, 3_000, 1_000];

/// Warnings at or below this remaining time are urgent.
pub const URGENT_THRESHOLD_MS: u64 = 10_000;

/// Remaining-minute marks with a milestone callback.
pub const COUNTDOWN_MILESTONE_MINUTES: [u64; 8] = [1, 2, 5, 10, 15, 30, 45, 60];

/// Largest `minutes` value accepted by [`CountdownTimer::set_duration`].
pub const MAX_DURATION_MINUTES: i64 = 1440;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub threshold: u64,
    pub remaining_time: u64,
    pub is_urgent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub mode: TimerMode,
    pub final_time: u64,
    pub original_duration: u64,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of [`CountdownTimer::validate_duration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub total_milliseconds: u64,
}

pub struct CountdownTimer {
    engine: TimerEngine,
    fired_warnings: HashSet<u64>,
    milestones: MilestoneTracker,
    completion_listeners: Listeners<Completion>,
    warning_listeners: Listeners<Warning>,
    milestone_listeners: Listeners<Milestone>,
}

impl CountdownTimer {
    /// Wrap `engine`, switching it to countdown mode.
    pub fn new(engine: TimerEngine) -> Self {
        let mut timer = Self {
            engine,
            fired_warnings: HashSet::new(),
            milestones: MilestoneTracker::new(&COUNTDOWN_MILESTONE_MINUTES),
            completion_listeners: Listeners::new("completion"),
            warning_listeners: Listeners::new("warning"),
            milestone_listeners: Listeners::new("milestone"),
        };
        if timer.engine.mode() != TimerMode::Countdown {
            let events = timer.engine.set_mode(TimerMode::Countdown);
            timer.observe(&events);
        }
        timer
    }

    // ── Duration ─────────────────────────────────────────────────────

    /// Check a minutes/seconds pair without touching any timer.
    pub fn validate_duration(minutes: i64, seconds: i64) -> DurationValidation {
        let errors = duration_errors(minutes, seconds);
        let total_milliseconds = if errors.is_empty() {
            total_ms(minutes, seconds)
        } else {
            0
        };
        DurationValidation {
            is_valid: errors.is_empty(),
            errors: errors.iter().map(ToString::to_string).collect(),
            total_milliseconds,
        }
    }

    /// Set the countdown length. Returns the duration in milliseconds.
    pub fn set_duration(&mut self, minutes: i64, seconds: i64) -> Result<u64, ValidationError> {
        if let Some(err) = duration_errors(minutes, seconds).into_iter().next() {
            return Err(err);
        }
        let ms = total_ms(minutes, seconds);
        self.apply_duration(ms)?;
        Ok(ms)
    }

    pub fn set_duration_from_milliseconds(&mut self, ms: i64) -> Result<u64, ValidationError> {
        if ms == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        if ms < 0 || ms as u64 > MAX_DURATION_MS {
            return Err(ValidationError::invalid(
                "duration",
                format!("must be between 1 and {MAX_DURATION_MS} ms (got {ms})"),
            ));
        }
        let ms = ms as u64;
        self.apply_duration(ms)?;
        Ok(ms)
    }

    fn apply_duration(&mut self, ms: u64) -> Result<(), ValidationError> {
        let events = self.engine.set_mode(TimerMode::Countdown);
        self.observe(&events);
        let events = self.engine.set_target_time(ms as i64)?;
        self.observe(&events);
        self.fired_warnings.clear();
        debug!(duration_ms = ms, "countdown duration set");
        Ok(())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start counting down. Fails when there is no time left to count.
    pub fn start(&mut self) -> Result<Vec<TimerEvent>, ValidationError> {
        if self.engine.current_time() == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        let events = self.engine.start();
        self.observe(&events);
        Ok(events)
    }

    pub fn pause(&mut self) -> Vec<TimerEvent> {
        let events = self.engine.pause();
        self.observe(&events);
        events
    }

    pub fn resume(&mut self) -> Vec<TimerEvent> {
        let events = self.engine.resume();
        self.observe(&events);
        events
    }

    pub fn reset(&mut self) -> Vec<TimerEvent> {
        let events = self.engine.reset();
        self.observe(&events);
        events
    }

    pub fn frame(&mut self) -> Vec<TimerEvent> {
        let events = self.engine.frame();
        self.observe(&events);
        events
    }

    pub fn destroy(&mut self) {
        self.engine.destroy();
        self.completion_listeners.clear();
        self.warning_listeners.clear();
        self.milestone_listeners.clear();
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    /// 0.0 .. 100.0 of the target consumed so far.
    pub fn progress_percentage(&self) -> f64 {
        let state = self.engine.state();
        if state.target_time == 0 {
            return 0.0;
        }
        let consumed = state.target_time as f64 - state.current_time as f64;
        (consumed / state.target_time as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn fired_warnings(&self) -> Vec<u64> {
        let mut fired: Vec<u64> = self.fired_warnings.iter().copied().collect();
        fired.sort_unstable_by(|a, b| b.cmp(a));
        fired
    }

    // ── Listeners ────────────────────────────────────────────────────

    pub fn add_event_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&TimerEvent) + Send + 'static,
    {
        self.engine.add_event_listener(kind, callback)
    }

    pub fn remove_event_listener(&mut self, kind: EventKind, id: ListenerId) -> bool {
        self.engine.remove_event_listener(kind, id)
    }

    pub fn on_completion<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&Completion) + Send + 'static,
    {
        self.completion_listeners.add(callback)
    }

    pub fn remove_completion_listener(&mut self, id: ListenerId) -> bool {
        self.completion_listeners.remove(id)
    }

    pub fn on_warning<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&Warning) + Send + 'static,
    {
        self.warning_listeners.add(callback)
    }

    pub fn remove_warning_listener(&mut self, id: ListenerId) -> bool {
        self.warning_listeners.remove(id)
    }

    pub fn on_milestone<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&Milestone) + Send + 'static,
    {
        self.milestone_listeners.add(callback)
    }

    pub fn remove_milestone_listener(&mut self, id: ListenerId) -> bool {
        self.milestone_listeners.remove(id)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn observe(&mut self, events: &[TimerEvent]) {
        for event in events {
            match event {
                TimerEvent::Tick { current_time, .. } => {
                    self.check_warnings(*current_time);
                    self.check_milestones(*current_time);
                }
                TimerEvent::Complete { final_time, .. } => {
                    let completion = Completion {
                        mode: TimerMode::Countdown,
                        final_time: *final_time,
                        original_duration: self.engine.target_time(),
                        completed_at: Utc::now(),
                    };
                    self.completion_listeners.emit(&completion);
                }
                TimerEvent::Reset { .. } => {
                    self.fired_warnings.clear();
                    self.milestones.clear();
                }
                _ => {}
            }
        }
    }

    /// At most one warning per tick: the first unfired threshold that the
    /// remaining time has reached.
    fn check_warnings(&mut self, current_time: u64) {
        let Some(threshold) = WARNING_THRESHOLDS_MS
            .iter()
            .copied()
            .find(|t| current_time <= *t && !self.fired_warnings.contains(t))
        else {
            return;
        };
        self.fired_warnings.insert(threshold);
        let warning = Warning {
            threshold,
            remaining_time: current_time,
            is_urgent: threshold <= URGENT_THRESHOLD_MS,
        };
        debug!(threshold, current_time, "countdown warning");
        self.warning_listeners.emit(&warning);
    }

    fn check_milestones(&mut self, current_time: u64) {
        if let Some(minutes) = self.milestones.check_minute(current_time) {
            let milestone = Milestone {
                kind: MilestoneKind::Minute,
                mode: TimerMode::Countdown,
                minutes,
                current_time,
            };
            self.milestone_listeners.emit(&milestone);
        }
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(TimerEngine::new())
    }
}

impl std::fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownTimer")
            .field("engine", &self.engine)
            .field("fired_warnings", &self.fired_warnings)
            .field("milestones", &self.milestones)
            .finish_non_exhaustive()
    }
}

pub(crate) fn duration_errors(minutes: i64, seconds: i64) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if minutes < 0 {
        errors.push(ValidationError::invalid("minutes", "must not be negative"));
    }
    if seconds < 0 {
        errors.push(ValidationError::invalid("seconds", "must not be negative"));
    }
    if minutes > MAX_DURATION_MINUTES {
        errors.push(ValidationError::invalid(
            "minutes",
            format!("must not exceed {MAX_DURATION_MINUTES}"),
        ));
    }
    if seconds >= 60 {
        errors.push(ValidationError::invalid("seconds", "must be less than 60"));
    }
    if errors.is_empty() && minutes == 0 && seconds == 0 {
        errors.push(ValidationError::ZeroDuration);
    }
    errors
}

fn total_ms(minutes: i64, seconds: i64) -> u64 {
    (minutes as u64 * 60 + seconds as u64) * 1000
}

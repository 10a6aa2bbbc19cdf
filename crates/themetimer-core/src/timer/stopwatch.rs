//! Stopwatch policy on top of [`TimerEngine`]: laps, elapsed-time
//! milestones and lap export.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{TimerEngine, TimerMode, TimerState};
use super::milestone::{Milestone, MilestoneKind, MilestoneTracker};
use crate::error::{Result, ValidationError};
use crate::events::{EventKind, ListenerId, Listeners, TimerEvent};
use crate::format::{format_time_with, FormatOptions};

/// Elapsed minutes that fire a milestone when crossed.
pub const ELAPSED_MILESTONE_MINUTES: [u64; 10] = [1, 5, 10, 15, 30, 60, 120, 240, 480, 720];

/// Session-length minutes that fire when the elapsed minute matches exactly.
pub const SESSION_MILESTONE_MINUTES: [u64; 4] = [25, 45, 50, 90];

const LAP_FORMAT: FormatOptions = FormatOptions {
    show_milliseconds: true,
    force_hours: false,
    compact: false,
    show_leading_zero: true,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapRecord {
    pub lap_number: u32,
    /// Time since the previous lap (or since start for the first lap).
    pub lap_time: u64,
    /// Stopwatch reading when the lap was recorded.
    pub total_time: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapSummary {
    pub lap_number: u32,
    pub lap_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapStatistics {
    pub count: usize,
    pub fastest: Option<LapSummary>,
    pub slowest: Option<LapSummary>,
    pub average_lap_time: u64,
    pub total_time: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ValidationError::UnsupportedExportFormat(s.to_string())),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LapExport<'a> {
    laps: &'a [LapRecord],
    statistics: LapStatistics,
}

pub struct Stopwatch {
    engine: TimerEngine,
    laps: Vec<LapRecord>,
    elapsed_milestones: MilestoneTracker,
    session_milestones: MilestoneTracker,
    lap_listeners: Listeners<LapRecord>,
    milestone_listeners: Listeners<Milestone>,
}

impl Stopwatch {
    /// Wrap `engine`, switching it to stopwatch mode.
    pub fn new(engine: TimerEngine) -> Self {
        let mut stopwatch = Self {
            engine,
            laps: Vec::new(),
            elapsed_milestones: MilestoneTracker::new(&ELAPSED_MILESTONE_MINUTES),
            session_milestones: MilestoneTracker::new(&SESSION_MILESTONE_MINUTES),
            lap_listeners: Listeners::new("lap"),
            milestone_listeners: Listeners::new("milestone"),
        };
        if stopwatch.engine.mode() != TimerMode::Stopwatch {
            let events = stopwatch.engine.set_mode(TimerMode::Stopwatch);
            stopwatch.observe(&events);
        }
        stopwatch
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Vec<TimerEvent> {
        let events = self.engine.start();
        self.observe(&events);
        events
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
        self.lap_listeners.clear();
        self.milestone_listeners.clear();
    }

    /// Record a lap at the current reading.
    pub fn record_lap(&mut self) -> std::result::Result<LapRecord, ValidationError> {
        let total_time = self.engine.current_time();
        if total_time == 0 {
            return Err(ValidationError::NothingElapsed);
        }
        if !self.engine.is_running() {
            return Err(ValidationError::NotRunning);
        }

        let previous_total = self.laps.last().map(|l| l.total_time).unwrap_or(0);
        let lap = LapRecord {
            lap_number: self.laps.len() as u32 + 1,
            lap_time: total_time.saturating_sub(previous_total),
            total_time,
            timestamp: Utc::now(),
        };
        debug!(lap = lap.lap_number, lap_time = lap.lap_time, "lap recorded");
        self.laps.push(lap.clone());
        self.lap_listeners.emit(&lap);
        Ok(lap)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    pub fn lap_statistics(&self) -> LapStatistics {
        let total_time = self.engine.current_time();
        if self.laps.is_empty() {
            return LapStatistics {
                count: 0,
                fastest: None,
                slowest: None,
                average_lap_time: 0,
                total_time,
            };
        }

        let summary = |l: &LapRecord| LapSummary {
            lap_number: l.lap_number,
            lap_time: l.lap_time,
        };
        // min_by_key/max_by_key keep the first/last of equal keys; ties
        // resolve to the earliest lap for both.
        let fastest = self.laps.iter().min_by_key(|l| l.lap_time).map(summary);
        let slowest = self
            .laps
            .iter()
            .rev()
            .max_by_key(|l| l.lap_time)
            .map(summary);
        let sum: u64 = self.laps.iter().map(|l| l.lap_time).sum();

        LapStatistics {
            count: self.laps.len(),
            fastest,
            slowest,
            average_lap_time: sum / self.laps.len() as u64,
            total_time,
        }
    }

    /// Serialize the lap list as `json`, `csv` or `text`.
    pub fn export_lap_times(&self, format: &str) -> Result<String> {
        let format: ExportFormat = format.parse()?;
        self.export(format)
    }

    pub fn export(&self, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Json => Ok(serde_json::to_string_pretty(&LapExport {
                laps: &self.laps,
                statistics: self.lap_statistics(),
            })?),
            ExportFormat::Csv => Ok(self.export_csv()),
            ExportFormat::Text => Ok(self.export_text()),
        }
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

    pub fn on_lap<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&LapRecord) + Send + 'static,
    {
        self.lap_listeners.add(callback)
    }

    pub fn remove_lap_listener(&mut self, id: ListenerId) -> bool {
        self.lap_listeners.remove(id)
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
                TimerEvent::Tick { current_time, .. } => self.check_milestones(*current_time),
                TimerEvent::Reset { .. } => {
                    self.laps.clear();
                    self.elapsed_milestones.clear();
                    self.session_milestones.clear();
                }
                _ => {}
            }
        }
    }

    fn check_milestones(&mut self, current_time: u64) {
        for minutes in self.elapsed_milestones.check_crossings(current_time) {
            self.emit_milestone(MilestoneKind::Elapsed, minutes, current_time);
        }
        if let Some(minutes) = self.session_milestones.check_minute(current_time) {
            self.emit_milestone(MilestoneKind::Minute, minutes, current_time);
        }
    }

    fn emit_milestone(&mut self, kind: MilestoneKind, minutes: u64, current_time: u64) {
        let milestone = Milestone {
            kind,
            mode: TimerMode::Stopwatch,
            minutes,
            current_time,
        };
        self.milestone_listeners.emit(&milestone);
    }

    fn export_csv(&self) -> String {
        let mut out = String::from("Lap,Lap Time,Total Time,Timestamp\n");
        for lap in &self.laps {
            let _ = writeln!(
                out,
                "{},{},{},{}",
                lap.lap_number,
                format_time_with(lap.lap_time as i64, LAP_FORMAT),
                format_time_with(lap.total_time as i64, LAP_FORMAT),
                lap.timestamp.to_rfc3339()
            );
        }
        out
    }

    fn export_text(&self) -> String {
        if self.laps.is_empty() {
            return "No laps recorded\n".to_string();
        }

        let fmt = |ms: u64| format_time_with(ms as i64, LAP_FORMAT);
        let mut out = String::from("Lap Times\n=========\n");
        for lap in &self.laps {
            let _ = writeln!(
                out,
                "Lap {:>2}: {}  (total {})",
                lap.lap_number,
                fmt(lap.lap_time),
                fmt(lap.total_time)
            );
        }

        let stats = self.lap_statistics();
        out.push('\n');
        if let Some(fastest) = stats.fastest {
            let _ = writeln!(out, "Fastest: Lap {} ({})", fastest.lap_number, fmt(fastest.lap_time));
        }
        if let Some(slowest) = stats.slowest {
            let _ = writeln!(out, "Slowest: Lap {} ({})", slowest.lap_number, fmt(slowest.lap_time));
        }
        let _ = writeln!(out, "Average: {}", fmt(stats.average_lap_time));
        out
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new(TimerEngine::new())
    }
}

impl std::fmt::Debug for Stopwatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stopwatch")
            .field("engine", &self.engine)
            .field("laps", &self.laps.len())
            .finish_non_exhaustive()
    }
}

//! Minute-mark milestone detection shared by the countdown and stopwatch.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::engine::TimerMode;

const MS_PER_MINUTE: u64 = 60_000;

/// How a milestone was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneKind {
    /// The whole-minute value of the current time equals a mark.
    Minute,
    /// Elapsed time crossed a mark (stopwatch only).
    Elapsed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub kind: MilestoneKind,
    pub mode: TimerMode,
    pub minutes: u64,
    pub current_time: u64,
}

/// Remembers which marks already fired during the current run.
#[derive(Debug, Clone)]
pub struct MilestoneTracker {
    marks: &'static [u64],
    fired: HashSet<u64>,
}

impl MilestoneTracker {
    /// `marks` are minute values in ascending order.
    pub fn new(marks: &'static [u64]) -> Self {
        Self {
            marks,
            fired: HashSet::new(),
        }
    }

    pub fn marks(&self) -> &'static [u64] {
        self.marks
    }

    /// Mark matching `floor(current_time / 1 min)`, if it has not fired yet.
    pub fn check_minute(&mut self, current_time: u64) -> Option<u64> {
        let minute = current_time / MS_PER_MINUTE;
        if self.marks.contains(&minute) && self.fired.insert(minute) {
            Some(minute)
        } else {
            None
        }
    }

    /// Every unfired mark at or below `current_time`, ascending.
    pub fn check_crossings(&mut self, current_time: u64) -> Vec<u64> {
        let mut crossed = Vec::new();
        for &mark in self.marks {
            if mark * MS_PER_MINUTE > current_time {
                break;
            }
            if self.fired.insert(mark) {
                crossed.push(mark);
            }
        }
        crossed
    }

    pub fn clear(&mut self) {
        self.fired.clear();
    }

    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_fires_once_per_run() {
        let mut tracker = MilestoneTracker::new(&[1, 5]);
        assert_eq!(tracker.check_minute(300_500), Some(5));
        assert_eq!(tracker.check_minute(300_100), None);
        assert_eq!(tracker.check_minute(240_000), None);
        tracker.clear();
        assert_eq!(tracker.check_minute(300_000), Some(5));
    }

    #[test]
    fn crossings_report_every_skipped_mark() {
        let mut tracker = MilestoneTracker::new(&[1, 5, 10]);
        assert!(tracker.check_crossings(59_999).is_empty());
        assert_eq!(tracker.check_crossings(360_000), vec![1, 5]);
        assert!(tracker.check_crossings(361_000).is_empty());
        assert_eq!(tracker.check_crossings(600_000), vec![10]);
        assert_eq!(tracker.fired_count(), 3);
    }
}

mod clock;
mod countdown;
pub mod driver;
mod engine;
mod milestone;
mod stopwatch;

pub use clock::{Clock, ManualClock, SystemClock};
pub(crate) use countdown::duration_errors;
pub use countdown::{
    Completion, CountdownTimer, DurationValidation, Warning, COUNTDOWN_MILESTONE_MINUTES,
    MAX_DURATION_MINUTES, URGENT_THRESHOLD_MS, WARNING_THRESHOLDS_MS,
};
pub use driver::{spawn, FrameDriven, TimerHandle, DEFAULT_FRAME_INTERVAL};
pub use engine::{
    RunPhase, TimerEngine, TimerMode, TimerState, MAX_DURATION_MS, UPDATE_INTERVAL_MS,
};
pub use milestone::{Milestone, MilestoneKind, MilestoneTracker};
pub use stopwatch::{
    ExportFormat, LapRecord, LapStatistics, LapSummary, Stopwatch, ELAPSED_MILESTONE_MINUTES,
    SESSION_MILESTONE_MINUTES,
};

//! # Themetimer Core Library
//!
//! This library provides the timer logic behind the Themetimer countdown and
//! stopwatch widget. Display, theming and sound live in the front ends; they
//! subscribe to the events emitted here and read value snapshots of the
//! timer state.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine with countdown and
//!   stopwatch modes. The host calls `frame()` at its refresh cadence; the
//!   engine coalesces frames into ticks at most every 100 ms
//! - **Countdown / Stopwatch**: Policy layers over one engine adding
//!   warnings, milestones, completion callbacks and laps
//! - **Driver**: A tokio task that owns a timer and serializes every command
//! - **Formatting**: `MM:SS` / `HH:MM:SS` rendering and parsing
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`CountdownTimer`]: Countdown with warnings and completion callbacks
//! - [`Stopwatch`]: Stopwatch with laps and lap export
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod format;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, ValidationError};
pub use events::{EventKind, ListenerId, Listeners, TimerEvent};
pub use format::{format_time, format_time_lossy, format_time_with, parse_time, FormatOptions};
pub use storage::Config;
pub use timer::{
    CountdownTimer, LapRecord, LapStatistics, Stopwatch, TimerEngine, TimerMode, TimerState,
    MAX_DURATION_MS,
};

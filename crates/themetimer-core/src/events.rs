use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::timer::TimerMode;

/// Every state change of a [`TimerEngine`](crate::TimerEngine) produces an Event.
/// Display and notification adapters subscribe to them; the countdown and
/// stopwatch variants derive their own callbacks from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TimerEvent {
    /// One applied progression update.
    Tick {
        mode: TimerMode,
        current_time: u64,
        target_time: u64,
        is_running: bool,
        progress: f64,
    },
    /// Countdown reached zero.
    Complete { mode: TimerMode, final_time: u64 },
    Start { mode: TimerMode, current_time: u64 },
    Pause { mode: TimerMode, current_time: u64 },
    Resume { mode: TimerMode, current_time: u64 },
    Reset {
        mode: TimerMode,
        current_time: u64,
        /// Whether the timer was running when reset was requested.
        was_running: bool,
    },
    ModeChanged {
        mode: TimerMode,
        previous_mode: TimerMode,
    },
    TargetTimeChanged { target_time: u64 },
    /// Recoverable condition, e.g. starting a countdown with no time left.
    Error { message: String },
    /// Stopwatch hit the maximum duration and paused itself.
    MaxDurationReached { current_time: u64 },
}

/// Discriminant of [`TimerEvent`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Tick,
    Complete,
    Start,
    Pause,
    Resume,
    Reset,
    ModeChanged,
    TargetTimeChanged,
    Error,
    MaxDurationReached,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::Tick,
        EventKind::Complete,
        EventKind::Start,
        EventKind::Pause,
        EventKind::Resume,
        EventKind::Reset,
        EventKind::ModeChanged,
        EventKind::TargetTimeChanged,
        EventKind::Error,
        EventKind::MaxDurationReached,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Tick => "tick",
            EventKind::Complete => "complete",
            EventKind::Start => "start",
            EventKind::Pause => "pause",
            EventKind::Resume => "resume",
            EventKind::Reset => "reset",
            EventKind::ModeChanged => "modeChanged",
            EventKind::TargetTimeChanged => "targetTimeChanged",
            EventKind::Error => "error",
            EventKind::MaxDurationReached => "maxDurationReached",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TimerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TimerEvent::Tick { .. } => EventKind::Tick,
            TimerEvent::Complete { .. } => EventKind::Complete,
            TimerEvent::Start { .. } => EventKind::Start,
            TimerEvent::Pause { .. } => EventKind::Pause,
            TimerEvent::Resume { .. } => EventKind::Resume,
            TimerEvent::Reset { .. } => EventKind::Reset,
            TimerEvent::ModeChanged { .. } => EventKind::ModeChanged,
            TimerEvent::TargetTimeChanged { .. } => EventKind::TargetTimeChanged,
            TimerEvent::Error { .. } => EventKind::Error,
            TimerEvent::MaxDurationReached { .. } => EventKind::MaxDurationReached,
        }
    }
}

/// Handle returned by every listener registration; pass it back to remove
/// the listener. Ids are unique across all registries in the process.
/// Only registration creates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

impl ListenerId {
    fn next() -> Self {
        ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Callback<T> = Box<dyn FnMut(&T) + Send>;

/// An ordered set of callbacks for one payload type.
///
/// Callbacks run synchronously in registration order. A callback that
/// panics is logged and skipped; the remaining callbacks still run.
pub struct Listeners<T> {
    channel: &'static str,
    entries: Vec<(ListenerId, Callback<T>)>,
}

impl<T> Listeners<T> {
    pub fn new(channel: &'static str) -> Self {
        Self {
            channel,
            entries: Vec::new(),
        }
    }

    pub fn add<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&T) + Send + 'static,
    {
        let id = ListenerId::next();
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not registered here.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn emit(&mut self, payload: &T) {
        let channel = self.channel;
        for (id, callback) in self.entries.iter_mut() {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(payload))) {
                warn!(
                    channel,
                    listener = id.0,
                    "listener panicked: {}",
                    panic_message(panic.as_ref())
                );
            }
        }
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("channel", &self.channel)
            .field("len", &self.entries.len())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

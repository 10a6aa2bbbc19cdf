//! Tokio host for a timer.
//!
//! [`spawn`] moves the timer into a task that owns it exclusively. All
//! commands reach it through a mailbox, so concurrent callers can never
//! interleave inside a state transition. The same task supplies the frame
//! cadence, polling the frame interval only while the timer has an active
//! progression loop.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::countdown::CountdownTimer;
use super::engine::TimerEngine;
use super::stopwatch::Stopwatch;
use crate::error::{CoreError, Result};

/// Roughly one display refresh.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

const MAILBOX_CAPACITY: usize = 64;

/// Something the driver can advance frame by frame.
pub trait FrameDriven: Send + 'static {
    fn on_frame(&mut self);
    fn loop_active(&self) -> bool;
    fn shutdown(&mut self);
}

impl FrameDriven for TimerEngine {
    fn on_frame(&mut self) {
        self.frame();
    }

    fn loop_active(&self) -> bool {
        self.is_scheduled()
    }

    fn shutdown(&mut self) {
        self.destroy();
    }
}

impl FrameDriven for CountdownTimer {
    fn on_frame(&mut self) {
        self.frame();
    }

    fn loop_active(&self) -> bool {
        self.engine().is_scheduled()
    }

    fn shutdown(&mut self) {
        self.destroy();
    }
}

impl FrameDriven for Stopwatch {
    fn on_frame(&mut self) {
        self.frame();
    }

    fn loop_active(&self) -> bool {
        self.engine().is_scheduled()
    }

    fn shutdown(&mut self) {
        self.destroy();
    }
}

type Job<T> = Box<dyn FnOnce(&mut T) + Send>;

enum Command<T> {
    Run(Job<T>),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable mailbox address of a driven timer.
pub struct TimerHandle<T> {
    tx: mpsc::Sender<Command<T>>,
}

impl<T> Clone for TimerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T: FrameDriven> TimerHandle<T> {
    /// Run `f` against the owned timer and return its result.
    pub async fn with<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job<T> = Box::new(move |timer| {
            let outcome = catch_unwind(AssertUnwindSafe(|| f(timer)));
            if outcome.is_err() {
                warn!("timer command panicked; timer state kept");
            }
            let _ = reply_tx.send(outcome.map_err(|_| ()));
        });
        self.tx
            .send(Command::Run(job))
            .await
            .map_err(|_| CoreError::DriverStopped)?;
        match reply_rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(())) => Err(CoreError::CommandPanicked),
            Err(_) => Err(CoreError::DriverStopped),
        }
    }

    /// Destroy the timer and stop the task.
    pub async fn shutdown(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Shutdown(ack_tx))
            .await
            .map_err(|_| CoreError::DriverStopped)?;
        ack_rx.await.map_err(|_| CoreError::DriverStopped)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Move `timer` into a new task on the current tokio runtime.
///
/// The task ends after [`TimerHandle::shutdown`] or once every handle is
/// dropped; either way the timer is destroyed first.
pub fn spawn<T: FrameDriven>(timer: T, frame_interval: Duration) -> (TimerHandle<T>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
    let task = tokio::spawn(run(timer, rx, frame_interval));
    (TimerHandle { tx }, task)
}

async fn run<T: FrameDriven>(mut timer: T, mut rx: mpsc::Receiver<Command<T>>, frame_interval: Duration) {
    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    debug!(?frame_interval, "timer driver started");

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Run(job)) => job(&mut timer),
                Some(Command::Shutdown(ack)) => {
                    timer.shutdown();
                    let _ = ack.send(());
                    break;
                }
                None => {
                    timer.shutdown();
                    break;
                }
            },
            _ = frames.tick(), if timer.loop_active() => timer.on_frame(),
        }
    }

    debug!("timer driver stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::clock::ManualClock;
    use crate::timer::TimerMode;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn drives_countdown_to_completion() {
        let clock = ManualClock::new();
        let mut countdown = CountdownTimer::new(TimerEngine::with_clock(Arc::new(clock.clone())));
        countdown.set_duration(0, 1).unwrap();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        countdown.on_completion(move |c| {
            let _ = done_tx.send(c.original_duration);
        });

        let (handle, task) = spawn(countdown, DEFAULT_FRAME_INTERVAL);
        handle.with(|t| t.start()).await.unwrap().unwrap();
        clock.advance(1_500);

        assert_eq!(done_rx.recv().await, Some(1_000));
        let state = handle.with(|t| t.state()).await.unwrap();
        assert_eq!(state.current_time, 0);
        assert!(!state.is_running);

        handle.shutdown().await.unwrap();
        task.await.unwrap();
        assert!(handle.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn paused_timer_is_not_advanced() {
        let clock = ManualClock::new();
        let mut engine = TimerEngine::with_clock(Arc::new(clock.clone()));
        engine.set_mode(TimerMode::Stopwatch);

        let (handle, _task) = spawn(engine, DEFAULT_FRAME_INTERVAL);
        handle.with(|e| e.start()).await.unwrap();
        clock.advance(400);
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.with(|e| e.pause()).await.unwrap();
        assert_eq!(handle.with(|e| e.current_time()).await.unwrap(), 400);

        clock.advance(10_000);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(handle.with(|e| e.current_time()).await.unwrap(), 400);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_command_keeps_driver_alive() {
        let (handle, _task) = spawn(Stopwatch::new(TimerEngine::new()), DEFAULT_FRAME_INTERVAL);
        let err = handle.with(|_: &mut Stopwatch| panic!("bad command")).await;
        assert!(matches!(err, Err(CoreError::CommandPanicked)));
        assert!(!handle.is_closed());
        assert!(handle.with(|s| s.laps().len()).await.is_ok());

        handle.shutdown().await.unwrap();
        assert!(matches!(
            handle.with(|s| s.laps().len()).await,
            Err(CoreError::DriverStopped)
        ));
    }

    #[tokio::test]
    async fn dropping_handles_stops_the_task() {
        let (handle, task) = spawn(TimerEngine::new(), DEFAULT_FRAME_INTERVAL);
        drop(handle);
        task.await.unwrap();
    }
}

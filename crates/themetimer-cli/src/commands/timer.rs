use std::time::Duration;

use clap::Args;
use serde::Serialize;
use themetimer_core::timer::driver::{self, TimerHandle};
use themetimer_core::timer::{
    Completion, CountdownTimer, ExportFormat, Milestone, Stopwatch, TimerEngine, Warning,
};
use themetimer_core::{format_time, format_time_with, Config, EventKind, FormatOptions, TimerEvent};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Args)]
pub struct CountdownArgs {
    /// Minutes (defaults to timer.default_minutes)
    #[arg(long)]
    pub minutes: Option<i64>,
    /// Seconds (defaults to timer.default_seconds when --minutes is absent)
    #[arg(long)]
    pub seconds: Option<i64>,
    /// Print one JSON object per line instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct StopwatchArgs {
    /// How long to run, in seconds
    #[arg(long, default_value = "5")]
    pub duration_secs: f64,
    /// Record a lap every N seconds
    #[arg(long)]
    pub lap_every: Option<f64>,
    /// Lap export format: json, csv or text (defaults to stopwatch.export_format)
    #[arg(long)]
    pub export: Option<String>,
}

/// Everything the countdown listeners forward to the printer.
#[derive(Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
enum Output {
    Event(TimerEvent),
    Warning(Warning),
    Milestone(Milestone),
    Completion(Completion),
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?)
}

fn frame_interval(config: &Config) -> Duration {
    Duration::from_millis(config.timer.frame_interval_ms)
}

fn seconds_arg(name: &str, value: f64) -> CliResult<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| format!("--{name} must be a non-negative number of seconds").into())
}

pub fn run_countdown(args: CountdownArgs) -> CliResult {
    let config = Config::load_or_default();
    let minutes = args
        .minutes
        .unwrap_or(config.timer.default_minutes as i64);
    let seconds = match (args.minutes, args.seconds) {
        (_, Some(s)) => s,
        (Some(_), None) => 0,
        (None, None) => config.timer.default_seconds as i64,
    };

    let mut timer = CountdownTimer::new(TimerEngine::new());
    timer.set_duration(minutes, seconds)?;
    runtime()?.block_on(countdown(timer, &config, args.json))
}

async fn countdown(mut timer: CountdownTimer, config: &Config, json: bool) -> CliResult {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notify = config.notifications.enabled;

    let events = tx.clone();
    timer.add_event_listener(EventKind::Tick, move |e| {
        let _ = events.send(Output::Event(e.clone()));
    });
    if notify && config.notifications.warnings {
        let warnings = tx.clone();
        timer.on_warning(move |w| {
            let _ = warnings.send(Output::Warning(w.clone()));
        });
    }
    if notify && config.notifications.milestones {
        let milestones = tx.clone();
        timer.on_milestone(move |m| {
            let _ = milestones.send(Output::Milestone(m.clone()));
        });
    }
    timer.on_completion(move |c| {
        let _ = tx.send(Output::Completion(c.clone()));
    });

    let opts = config.display.format_options();
    let (handle, task) = driver::spawn(timer, frame_interval(config));
    handle.with(|t| t.start()).await??;

    let mut last_second = None;
    while let Some(output) = rx.recv().await {
        if let Output::Event(TimerEvent::Tick { current_time, .. }) = &output {
            // One line per displayed second.
            let second = current_time.div_ceil(1000);
            if last_second == Some(second) {
                continue;
            }
            last_second = Some(second);
        }

        let done = matches!(output, Output::Completion(_));
        if json {
            println!("{}", serde_json::to_string(&output)?);
        } else {
            println!("{}", describe(&output, opts));
        }
        if done {
            break;
        }
    }

    stop(handle, task).await
}

fn describe(output: &Output, opts: FormatOptions) -> String {
    match output {
        Output::Event(TimerEvent::Tick { current_time, .. }) => {
            format_time_with(current_time.div_ceil(1000) as i64 * 1000, opts)
        }
        Output::Event(other) => other.kind().to_string(),
        Output::Warning(w) => {
            let tag = if w.is_urgent { "urgent" } else { "warning" };
            format!("{tag}: {} left", format_time_with(w.threshold as i64, opts))
        }
        Output::Milestone(m) => format!("milestone: {} min", m.minutes),
        Output::Completion(c) => format!(
            "complete: {} at {}",
            format_time_with(c.original_duration as i64, opts),
            c.completed_at.format("%H:%M:%S")
        ),
    }
}

pub fn run_stopwatch(args: StopwatchArgs) -> CliResult {
    let config = Config::load_or_default();
    let total = seconds_arg("duration-secs", args.duration_secs)?;
    let lap_every = args
        .lap_every
        .map(|s| seconds_arg("lap-every", s))
        .transpose()?;
    if lap_every.is_some_and(|d| d.is_zero()) {
        return Err("--lap-every must be greater than zero".into());
    }
    // Resolve the format before running so a typo fails fast.
    let format = args
        .export
        .unwrap_or_else(|| config.stopwatch.export_format.clone());
    let format: ExportFormat = format.parse()?;

    let stopwatch = Stopwatch::new(TimerEngine::new());
    runtime()?.block_on(stopwatch_run(stopwatch, &config, total, lap_every, format))
}

async fn stopwatch_run(
    stopwatch: Stopwatch,
    config: &Config,
    total: Duration,
    lap_every: Option<Duration>,
    format: ExportFormat,
) -> CliResult {
    let (handle, task) = driver::spawn(stopwatch, frame_interval(config));
    handle.with(|s| s.start()).await?;

    let deadline = Instant::now() + total;
    if let Some(every) = lap_every {
        let mut laps = tokio::time::interval_at(Instant::now() + every, every);
        loop {
            if laps.tick().await > deadline {
                break;
            }
            match handle.with(|s| s.record_lap()).await? {
                Ok(lap) => eprintln!("lap {}: {}", lap.lap_number, format_time(lap.lap_time as i64)),
                Err(e) => warn!(error = %e, "lap skipped"),
            }
        }
    }
    tokio::time::sleep_until(deadline).await;

    let export = handle
        .with(move |s| {
            s.frame();
            s.pause();
            s.export(format)
        })
        .await??;
    println!("{export}");

    stop(handle, task).await
}

async fn stop<T: driver::FrameDriven>(
    handle: TimerHandle<T>,
    task: tokio::task::JoinHandle<()>,
) -> CliResult {
    handle.shutdown().await?;
    task.await?;
    debug!("driver joined");
    Ok(())
}

//! Integration tests for the countdown timer driven frame by frame.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use themetimer_core::events::{EventKind, TimerEvent};
use themetimer_core::timer::{CountdownTimer, ManualClock, TimerEngine, TimerMode};

fn countdown() -> (CountdownTimer, ManualClock) {
    let clock = ManualClock::new();
    let engine = TimerEngine::with_clock(Arc::new(clock.clone()));
    (CountdownTimer::new(engine), clock)
}

fn step(timer: &mut CountdownTimer, clock: &ManualClock, ms: u64) {
    clock.advance(ms);
    timer.frame();
}

#[test]
fn five_minute_countdown_runs_to_completion() {
    let (mut timer, clock) = countdown();
    let completions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&completions);
    timer.on_completion(move |c| sink.lock().unwrap().push(c.clone()));

    assert_eq!(timer.set_duration(5, 0).unwrap(), 300_000);
    timer.start().unwrap();

    for _ in 0..1_500 {
        step(&mut timer, &clock, 100);
    }
    assert_eq!(timer.state().current_time, 150_000);
    assert!(timer.state().is_running);
    assert!((timer.progress_percentage() - 50.0).abs() < 1e-9);

    for _ in 0..1_500 {
        step(&mut timer, &clock, 100);
    }
    let state = timer.state();
    assert_eq!(state.current_time, 0);
    assert!(!state.is_running);
    assert!(!state.is_paused);

    // Extra frames after completion change nothing.
    for _ in 0..10 {
        step(&mut timer, &clock, 100);
    }

    let completions = completions.lock().unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].original_duration, 300_000);
    assert_eq!(completions[0].final_time, 0);
}

#[test]
fn engine_listeners_see_every_tick_in_order() {
    let (mut timer, clock) = countdown();
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&ticks);
    timer.add_event_listener(EventKind::Tick, move |e| {
        if let TimerEvent::Tick {
            current_time,
            progress,
            mode,
            ..
        } = e
        {
            assert_eq!(*mode, TimerMode::Countdown);
            sink.lock().unwrap().push((*current_time, *progress));
        }
    });

    timer.set_duration(0, 1).unwrap();
    timer.start().unwrap();
    for _ in 0..12 {
        step(&mut timer, &clock, 100);
    }

    let ticks = ticks.lock().unwrap();
    assert_eq!(ticks.len(), 10);
    assert_eq!(ticks.first().unwrap().0, 900);
    assert_eq!(ticks.last().unwrap().0, 0);
    assert!(ticks.windows(2).all(|w| w[1].0 < w[0].0 && w[1].1 > w[0].1));
}

#[test]
fn reset_mid_run_allows_warnings_again() {
    let (mut timer, clock) = countdown();
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&warnings);
    timer.on_warning(move |w| sink.lock().unwrap().push(w.threshold));

    timer.set_duration(0, 6).unwrap();
    timer.start().unwrap();
    for _ in 0..15 {
        step(&mut timer, &clock, 100);
    }
    timer.reset();
    timer.start().unwrap();
    for _ in 0..5 {
        step(&mut timer, &clock, 100);
    }

    // One warning per tick, largest threshold first; 5s only fires once
    // the remaining time actually reaches it.
    assert_eq!(
        *warnings.lock().unwrap(),
        vec![60_000, 30_000, 10_000, 5_000, 60_000, 30_000, 10_000]
    );
}

#[test]
fn pause_resume_round_trip_keeps_time() {
    let (mut timer, clock) = countdown();
    timer.set_duration(1, 0).unwrap();
    timer.start().unwrap();
    step(&mut timer, &clock, 2_500);
    let before = timer.state().current_time;

    timer.pause();
    timer.resume();
    assert_eq!(timer.state().current_time, before);

    timer.pause();
    clock.advance(30_000);
    timer.resume();
    step(&mut timer, &clock, 0);
    assert_eq!(timer.state().current_time, before);
}

#[test]
fn start_on_finished_countdown_fails() {
    let (mut timer, clock) = countdown();
    timer.set_duration(0, 1).unwrap();
    timer.start().unwrap();
    step(&mut timer, &clock, 1_000);
    assert_eq!(timer.state().current_time, 0);
    assert!(timer.start().is_err());

    timer.reset();
    assert_eq!(timer.state().current_time, 1_000);
    assert!(timer.start().is_ok());
}

proptest! {
    #[test]
    fn countdown_is_monotonic_and_lands_on_zero(
        duration_s in 1i64..600,
        steps in proptest::collection::vec(1u64..400, 1..200),
    ) {
        let (mut timer, clock) = countdown();
        timer.set_duration_from_milliseconds(duration_s * 1000).unwrap();
        timer.start().unwrap();

        let mut last = timer.state().current_time;
        for ms in steps {
            step(&mut timer, &clock, ms);
            let now = timer.state().current_time;
            prop_assert!(now <= last);
            last = now;
        }
        // Drain whatever is left.
        step(&mut timer, &clock, duration_s as u64 * 1000);
        let state = timer.state();
        prop_assert_eq!(state.current_time, 0);
        prop_assert!(!state.is_running);
        prop_assert!(!(state.is_running && state.is_paused));
    }

    #[test]
    fn warnings_never_repeat_within_a_run(
        duration_s in 1i64..90,
        steps in proptest::collection::vec(50u64..3_000, 1..300),
    ) {
        let (mut timer, clock) = countdown();
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        timer.on_warning(move |w| sink.lock().unwrap().push(w.threshold));

        timer.set_duration_from_milliseconds(duration_s * 1000).unwrap();
        timer.start().unwrap();
        for ms in steps {
            let before = fired.lock().unwrap().len();
            step(&mut timer, &clock, ms);
            prop_assert!(fired.lock().unwrap().len() - before <= 1);
        }

        let mut fired = fired.lock().unwrap().clone();
        let total = fired.len();
        fired.sort_unstable();
        fired.dedup();
        prop_assert_eq!(fired.len(), total);
    }
}

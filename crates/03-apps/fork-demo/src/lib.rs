//! Scenarios exercising the reactive primitives end to end.
//!
//! Each scenario drives its timers to completion and returns the transcript
//! it produced, one line per observable step, so the binary can print it and
//! tests can compare it.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use base::{join_future, keyed, max_delay, select_indexed, timeout, Emit, Keyed, Timers};
use clap::ValueEnum;
use runner::{SchedResult, Scheduler, SchedulerConfig};
use tracing::info;

/// Demo to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Race two timeouts; the loser is cancelled.
    Race,
    /// Wait for two timeouts and pair their values.
    Join,
    /// Bound a slow operation with a deadline.
    Deadline,
    /// Two forks interleaving events through one scheduler.
    Fork,
}

/// How timers are driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Clock {
    /// Jump straight from deadline to deadline.
    #[default]
    Virtual,
    /// Sleep on the wall clock until each deadline.
    Realtime,
}

/// Durations shared by all scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
    pub fast: Duration,
    pub slow: Duration,
    pub deadline: Duration,
    /// Events emitted by each fork in the `fork` scenario.
    pub ticks: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            fast: Duration::from_millis(50),
            slow: Duration::from_millis(80),
            deadline: Duration::from_millis(60),
            ticks: 3,
        }
    }
}

type Transcript = Rc<RefCell<Vec<String>>>;

fn stamp(timers: &Timers) -> u128 {
    timers.now().as_millis()
}

fn drive(timers: &Timers, clock: Clock) {
    match clock {
        Clock::Virtual => timers.run_until_idle(),
        Clock::Realtime => timers.run_realtime(),
    }
}

/// Runs `scenario` and returns its transcript.
pub fn run_scenario(
    scenario: Scenario,
    params: &Params,
    config: &SchedulerConfig,
    clock: Clock,
) -> SchedResult<Vec<String>> {
    info!(?scenario, ?clock, "running scenario");
    let timers = Timers::new();
    let transcript = Transcript::default();
    match scenario {
        Scenario::Race => race(&timers, params, &transcript),
        Scenario::Join => join(&timers, params, &transcript),
        Scenario::Deadline => deadline(&timers, params, &transcript),
        Scenario::Fork => fork(&timers, params, config, clock, &transcript)?,
    }
    drive(&timers, clock);
    transcript
        .borrow_mut()
        .push(format!("done at {}ms, {} timers pending", stamp(&timers), timers.pending()));
    Ok(transcript.take())
}

fn race(timers: &Timers, params: &Params, transcript: &Transcript) {
    let contest = select_indexed(vec![
        timeout(timers, params.fast, "fast"),
        timeout(timers, params.slow, "slow"),
    ]);
    let out = Rc::clone(transcript);
    let clock = timers.clone();
    let _cancel = contest.subscribe(move |(index, label)| {
        out.borrow_mut()
            .push(format!("race: #{index} `{label}` won at {}ms", stamp(&clock)));
    });
}

fn join(timers: &Timers, params: &Params, transcript: &Transcript) {
    let both = join_future(
        timeout(timers, params.fast, "fast"),
        timeout(timers, params.slow, "slow"),
    );
    let out = Rc::clone(transcript);
    let clock = timers.clone();
    let _cancel = both.subscribe(move |(a, b)| {
        out.borrow_mut()
            .push(format!("join: ({a}, {b}) at {}ms", stamp(&clock)));
    });
}

fn deadline(timers: &Timers, params: &Params, transcript: &Transcript) {
    let bounded = max_delay(timers, params.deadline, timeout(timers, params.slow, "slow op"));
    let out = Rc::clone(transcript);
    let clock = timers.clone();
    let _cancel = bounded.subscribe(move |result| {
        let line = match result {
            Ok(value) => format!("deadline: `{value}` finished at {}ms", stamp(&clock)),
            Err(elapsed) => format!("deadline: {elapsed} at {}ms", stamp(&clock)),
        };
        out.borrow_mut().push(line);
    });
}

fn fork(
    timers: &Timers,
    params: &Params,
    config: &SchedulerConfig,
    clock: Clock,
    transcript: &Transcript,
) -> SchedResult<()> {
    let out = Rc::clone(transcript);
    let now = timers.clone();
    let finished = Rc::clone(transcript);
    let at = timers.clone();
    let sched = Scheduler::with_config(
        config.clone(),
        move |event: Keyed<&'static str, u64>| {
            out.borrow_mut().push(format!(
                "fork: {}#{} at {}ms",
                event.key,
                event.value,
                stamp(&now)
            ));
        },
        move || {
            finished
                .borrow_mut()
                .push(format!("fork: complete at {}ms", stamp(&at)));
        },
    );

    let forker = sched.forker();
    for (key, period) in [("a", params.fast), ("b", params.slow)] {
        let stream =
            Emit::interval(timers, period, params.ticks).map_emit(move |tick| keyed(key, tick));
        forker.spawn_emit(&stream)?;
    }
    sched.run()?;
    drive(timers, clock);

    let stats = sched.stats();
    transcript.borrow_mut().push(format!(
        "fork: {} events from {} forks, peak queue {}",
        stats.delivered, stats.forks_spawned, stats.peak_queue
    ));
    Ok(())
}

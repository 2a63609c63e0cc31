//! Simulation drivers.
//!
//! [`Pcolony::simulate`] and [`Pswarm::simulate`] loop over
//! [`run_step`](Pcolony::run_step) until the system halts, a fault occurs,
//! or a configured step/time limit is hit. The loop is single-threaded and
//! step-synchronous; limits are checked between steps, never mid-step.

use log::{info, warn};
use rand::rngs::StdRng;
use std::io::{self, BufRead, Write as _};
use std::time::{Duration, Instant};
use pcolsim_base::Interner;

use crate::colony::Pcolony;
use crate::swarm::Pswarm;

/// Result of a single simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// The step executed at least one program.
    Finished,
    /// No agent had an applicable program; nothing was mutated.
    NoMoreExecutables,
    /// An execution fault occurred; the simulation must stop.
    Error,
}

/// Driver configuration.
#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    /// Wait for ENTER between steps.
    pub step_by_step: bool,
    /// Print the full state tree after every step.
    pub print_each_state: bool,
    /// Hard step bound; `None` means unlimited.
    pub max_steps: Option<u64>,
    /// Hard wall-clock bound; `None` means unlimited.
    pub max_time: Option<Duration>,
}

/// How a driven simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationOutcome {
    /// The system ran out of executable programs: a regular halt.
    Halted { steps: u64 },
    /// The step limit was reached before the system halted.
    StepLimit,
    /// The time limit was reached before the system halted.
    TimeLimit,
    /// An execution fault stopped the run.
    Fault,
}

impl SimulationOutcome {
    /// Only a regular halt counts as a completed run.
    pub fn is_success(&self) -> bool {
        matches!(self, SimulationOutcome::Halted { .. })
    }
}

fn wait_for_confirmation() {
    print!("Press ENTER to continue");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

fn report_halt(steps: u64, start: Instant) {
    info!(
        "simulation finished after {} steps and {:.3} seconds; end state below:",
        steps,
        start.elapsed().as_secs_f64()
    );
}

/// Checks the configured bounds; `Some` means the run must stop.
fn limit_exceeded(opts: &SimulationOptions, steps: u64, start: Instant) -> Option<SimulationOutcome> {
    if let Some(limit) = opts.max_time {
        if start.elapsed() >= limit {
            warn!("maximum time limit exceeded; simulation stopped");
            return Some(SimulationOutcome::TimeLimit);
        }
    }
    if let Some(limit) = opts.max_steps {
        if steps >= limit {
            warn!("maximum number of simulation steps exceeded; simulation stopped");
            return Some(SimulationOutcome::StepLimit);
        }
    }
    None
}

impl Pcolony {
    /// Simulates the colony until it halts or a limit is reached.
    pub fn simulate(
        &mut self,
        opts: &SimulationOptions,
        interner: &Interner,
        rng: &mut StdRng,
    ) -> SimulationOutcome {
        let start = Instant::now();
        let mut steps: u64 = 0;

        loop {
            steps += 1;
            info!("starting simulation step {}", steps);

            match self.run_step(None, interner, rng) {
                StepResult::NoMoreExecutables => {
                    report_halt(steps - 1, start);
                    println!("{}", self.render("Pcolony", 0, false, interner));
                    return SimulationOutcome::Halted { steps: steps - 1 };
                }
                StepResult::Error => return SimulationOutcome::Fault,
                StepResult::Finished => {}
            }

            if opts.print_each_state {
                println!("{}", self.render("Pcolony", 0, false, interner));
            }
            if opts.step_by_step {
                wait_for_confirmation();
            }
            if let Some(outcome) = limit_exceeded(opts, steps, start) {
                return outcome;
            }
        }
    }
}

impl Pswarm {
    /// Simulates the swarm until every colony halts or a limit is reached.
    pub fn simulate(
        &mut self,
        opts: &SimulationOptions,
        interner: &Interner,
        rng: &mut StdRng,
    ) -> SimulationOutcome {
        self.results.clear();
        let start = Instant::now();
        let mut steps: u64 = 0;

        loop {
            steps += 1;
            info!("starting simulation step {}", steps);

            match self.run_step(interner, rng) {
                StepResult::NoMoreExecutables => {
                    report_halt(steps - 1, start);
                    println!("{}", self.render(false, interner));
                    return SimulationOutcome::Halted { steps: steps - 1 };
                }
                StepResult::Error => return SimulationOutcome::Fault,
                StepResult::Finished => {}
            }

            if opts.print_each_state {
                println!("{}", self.render(false, interner));
            }
            if opts.step_by_step {
                wait_for_confirmation();
            }
            if let Some(outcome) = limit_exceeded(opts, steps, start) {
                return outcome;
            }
        }
    }
}

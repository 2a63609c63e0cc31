//! Command-line interface.
//!
//! ```bash
//! # Run a colony description to completion
//! pcolsim demos/countdown.pcol
//!
//! # Step through interactively with verbose tracing
//! pcolsim --step -v --print-states demos/countdown.pcol
//!
//! # Reproducible run
//! pcolsim --seed 42 --max-steps 1000 demos/token_pass.pcol
//!
//! # Emit the C rule taxonomy and exit
//! pcolsim --ruleheader rules
//! ```

use clap::Parser as ClapParser;
use log::{info, warn, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use pcolsim_base::Interner;
use pcolsim_engine::{SimulationOptions, SimulationOutcome};
use pcolsim_language::{parse_source, ParsedSystem};

use crate::ruleheader;

/// P colony / P swarm simulator.
#[derive(ClapParser)]
#[command(name = "pcolsim")]
#[command(about = "Simulates P colonies and P swarms described in a small textual language")]
#[command(version)]
pub struct Cli {
    /// Path to the colony/swarm description file.
    #[arg(required_unless_present = "ruleheader")]
    pub input: Option<PathBuf>,

    /// Wait for ENTER between simulation steps.
    #[arg(long)]
    pub step: bool,

    /// Verbose tracing of selection and execution.
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log errors only.
    #[arg(long, alias = "v0", conflicts_with = "debug")]
    pub error: bool,

    /// Print the full state tree after every step.
    #[arg(long)]
    pub print_states: bool,

    /// Stop (and fail) after this many steps.
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u64>,

    /// Stop (and fail) after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub max_time: Option<u64>,

    /// Seed for the program-selection RNG; runs with the same input and
    /// seed are reproducible.
    #[arg(long, value_name = "U64")]
    pub seed: Option<u64>,

    /// Write PATH.h and PATH.c enumerating the rule taxonomy, then exit.
    #[arg(long, value_name = "PATH")]
    pub ruleheader: Option<PathBuf>,
}

/// Parses arguments, runs the requested action and maps failures into a
/// boxed error for the binary to report.
pub fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout with exit code 0; genuine
            // usage errors exit with 1.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let level = if cli.debug {
        LevelFilter::Debug
    } else if cli.error {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Some(path) = &cli.ruleheader {
        ruleheader::write_rules_header(path)?;
        info!("exiting after header generation");
        return Ok(());
    }

    let input = cli.input.as_ref().ok_or("expected an input file path")?;
    let source = fs::read_to_string(input)
        .map_err(|e| format!("cannot read {}: {}", input.display(), e))?;

    let mut interner = Interner::new();
    let system = parse_source(&source, &mut interner)
        .map_err(|e| e.display_with_source(&source))?;

    let opts = SimulationOptions {
        step_by_step: cli.step,
        print_each_state: cli.print_states,
        max_steps: cli.max_steps,
        max_time: cli.max_time.map(Duration::from_secs),
    };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let outcome = match system {
        ParsedSystem::Colony(mut colony) => {
            for warning in colony.validate(false, &interner)? {
                warn!("{}", warning);
            }
            println!("{}\n", colony.render("Pcolony", 0, true, &interner));
            colony.simulate(&opts, &interner, &mut rng)
        }
        ParsedSystem::Swarm(mut swarm) => {
            for warning in swarm.validate(&interner)? {
                warn!("{}", warning);
            }
            println!("{}\n", swarm.render(true, &interner));
            swarm.simulate(&opts, &interner, &mut rng)
        }
    };

    match outcome {
        SimulationOutcome::Halted { .. } => Ok(()),
        SimulationOutcome::StepLimit => Err("simulation stopped at the step limit".into()),
        SimulationOutcome::TimeLimit => Err("simulation stopped at the time limit".into()),
        SimulationOutcome::Fault => Err("simulation stopped after an execution fault".into()),
    }
}

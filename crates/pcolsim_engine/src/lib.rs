//! # pcolsim-engine
//!
//! Data model and simulation engine for P colonies and P swarms.
//!
//! A **P colony** is a finite set of agents, each holding a fixed-capacity
//! multiset of symbolic objects, evolving in lockstep by applying programs
//! (ordered rule tuples) that rewrite agent contents and exchange objects
//! with a shared environment. A **P swarm** is a set of P colonies that
//! additionally share three global environments.
//!
//! ## Pipeline position
//!
//! ```text
//! source text ──▶ pcolsim-language ──▶ Pcolony / Pswarm ──▶ simulate()
//!                 (lexer, parser,        (this crate)
//!                  wildcard expander)
//! ```
//!
//! ## Stepping model
//!
//! One step per colony is a pure *selection* phase over the pre-step state
//! followed by a *commit* phase that mutates agents and environments in
//! agent declaration order. Program choice among several applicable
//! programs is uniform random; the drivers take a seedable
//! [`rand::rngs::StdRng`] so runs are reproducible.
//!
//! The engine does not own a parent/child object graph: swarm environments
//! are passed into colony steps as explicit parameters, and agents receive
//! the environments they touch as arguments.

pub mod agent;
pub mod colony;
pub mod multiset;
pub mod program;
pub mod rule;
pub mod sim;
pub mod swarm;

pub use agent::{Agent, ChosenProgram, ExecChoice, ExecutionFault};
pub use colony::{ModelError, Pcolony};
pub use multiset::Multiset;
pub use program::Program;
pub use rule::{Rule, RuleBranch, RuleKind};
pub use sim::{SimulationOptions, SimulationOutcome, StepResult};
pub use swarm::{Pswarm, SwarmEnvs};

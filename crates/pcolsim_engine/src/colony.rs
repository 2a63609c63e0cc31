//! P colonies: agents around a shared environment.

use log::{debug, info};
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::fmt::Write as _;
use pcolsim_base::{Interner, Symbol};

use crate::agent::Agent;
use crate::multiset::Multiset;
use crate::rule::Rule;
use crate::sim::StepResult;
use crate::swarm::SwarmEnvs;

/// Structural validation failure for a parsed or expanded system.
#[derive(Debug, Clone)]
pub enum ModelError {
    /// A program's rule count does not match the colony capacity.
    CapacityViolation {
        agent: String,
        program: usize,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::CapacityViolation {
                agent,
                program,
                expected,
                found,
            } => write!(
                f,
                "program P{} of agent {} has {} rules, expected {} (the colony capacity)",
                program, agent, found, expected
            ),
        }
    }
}

impl std::error::Error for ModelError {}

/// A P colony: an alphabet, a capacity, an environment multiset and a set
/// of named agents advancing in lockstep.
///
/// The colony holds no reference to a parent swarm; when it belongs to one,
/// the swarm's environments are passed into [`run_step`](Self::run_step)
/// explicitly.
#[derive(Debug, Clone)]
pub struct Pcolony {
    /// Declared objects. Objects seen elsewhere but not declared here are
    /// reported as warnings by [`validate`](Self::validate).
    pub alphabet: Vec<Symbol>,
    /// The elementary object, inexhaustible in environments.
    pub e: Symbol,
    /// The final object, reserved by the model; no runtime semantics.
    pub f: Symbol,
    /// Number of objects each agent holds; also the rule count of every
    /// well-formed program.
    pub capacity: usize,
    pub env: Multiset,
    /// Agent names in declaration order; commit order between agents.
    pub agent_names: Vec<Symbol>,
    pub agents: FxHashMap<Symbol, Agent>,
}

impl Pcolony {
    pub fn new(e: Symbol, f: Symbol) -> Self {
        Self {
            alphabet: Vec::new(),
            e,
            f,
            capacity: 0,
            env: Multiset::new(),
            agent_names: Vec::new(),
            agents: FxHashMap::default(),
        }
    }

    /// Runs one synchronous step: selection for every agent against the
    /// pre-step state, then sequential commit in declaration order.
    ///
    /// Commit order is part of the model: an earlier agent may take an
    /// environment object a later agent counted on, which surfaces as an
    /// execution fault and a [`StepResult::Error`].
    pub fn run_step(
        &mut self,
        mut swarm: Option<&mut SwarmEnvs>,
        interner: &Interner,
        rng: &mut StdRng,
    ) -> StepResult {
        let mut runnable: Vec<Symbol> = Vec::new();

        for &name in &self.agent_names {
            debug!("checking agent {}", interner.resolve(name));
            if let Some(agent) = self.agents.get_mut(&name) {
                if agent.select_program(&self.env, swarm.as_deref(), self.e, rng) {
                    info!("agent {} is runnable", interner.resolve(name));
                    runnable.push(name);
                }
            }
        }

        info!("{} runnable agents", runnable.len());
        if runnable.is_empty() {
            return StepResult::NoMoreExecutables;
        }

        for name in runnable {
            if let Some(agent) = self.agents.get_mut(&name) {
                if let Some(description) = agent.describe_chosen(interner) {
                    info!("running agent {}: {}", interner.resolve(name), description);
                }
                if let Err(fault) = agent.execute_program(&mut self.env, swarm.as_deref_mut(), self.e, interner)
                {
                    log::error!(
                        "execution failed for agent {}, stopping simulation: {}",
                        interner.resolve(name),
                        fault
                    );
                    return StepResult::Error;
                }
            }
        }

        info!("simulation step finished");
        StepResult::Finished
    }

    /// Checks structural invariants after parsing or wildcard expansion.
    ///
    /// Returns warnings for non-fatal findings (objects outside the
    /// alphabet, initial agent contents that do not fill the capacity,
    /// swarm-targeted rules in a standalone colony); capacity-violating
    /// programs are a hard error.
    pub fn validate(&self, in_swarm: bool, interner: &Interner) -> Result<Vec<String>, ModelError> {
        let mut warnings = Vec::new();

        let check_declared = |obj: Symbol, place: String, warnings: &mut Vec<String>| {
            if !self.alphabet.contains(&obj) {
                warnings.push(format!(
                    "object {} in {} is not declared in the alphabet",
                    interner.resolve(obj),
                    place
                ));
            }
        };

        for (obj, _) in self.env.iter() {
            check_declared(obj, String::from("the environment"), &mut warnings);
        }

        for &name in &self.agent_names {
            let Some(agent) = self.agents.get(&name) else {
                warnings.push(format!(
                    "agent {} is declared in B but never defined",
                    interner.resolve(name)
                ));
                continue;
            };

            if agent.obj.total() as usize != self.capacity {
                warnings.push(format!(
                    "agent {} starts with {} objects, capacity is {}",
                    interner.resolve(name),
                    agent.obj.total(),
                    self.capacity
                ));
            }
            for (obj, _) in agent.obj.iter() {
                check_declared(obj, format!("agent {}", interner.resolve(name)), &mut warnings);
            }

            for (index, program) in agent.programs.iter().enumerate() {
                if program.len() != self.capacity {
                    return Err(ModelError::CapacityViolation {
                        agent: interner.resolve(name).to_string(),
                        program: index,
                        expected: self.capacity,
                        found: program.len(),
                    });
                }
                for rule in program.rules() {
                    let branches = match rule {
                        Rule::Simple(branch) => vec![branch],
                        Rule::Conditional { first, second } => vec![first, second],
                    };
                    for branch in branches {
                        let place = format!("a program of agent {}", interner.resolve(name));
                        check_declared(branch.lhs, place.clone(), &mut warnings);
                        check_declared(branch.rhs, place.clone(), &mut warnings);
                        if !in_swarm && branch.kind.targets_swarm() {
                            warnings.push(format!(
                                "rule {} of agent {} targets a swarm environment but the colony is standalone",
                                branch.render(interner),
                                interner.resolve(name)
                            ));
                        }
                    }
                }
            }
        }

        Ok(warnings)
    }

    /// Renders the colony as an indented tree for state inspection.
    ///
    /// With `details` set, also prints the alphabet, the distinguished
    /// objects, the capacity and every program.
    pub fn render(&self, name: &str, indent: usize, details: bool, interner: &Interner) -> String {
        let pad = " ".repeat(indent);
        let mut out = String::new();
        let _ = writeln!(out, "{}{} = {{", pad, name);
        if details {
            let alphabet: Vec<&str> = self.alphabet.iter().map(|&o| interner.resolve(o)).collect();
            let _ = writeln!(out, "{}    A = ({})", pad, alphabet.join(", "));
            let _ = writeln!(out, "{}    e = {}", pad, interner.resolve(self.e));
            let _ = writeln!(out, "{}    f = {}", pad, interner.resolve(self.f));
            let _ = writeln!(out, "{}    n = {}", pad, self.capacity);
        }
        let _ = writeln!(out, "{}    env = {}", pad, self.env.render(interner));
        for &agent_name in &self.agent_names {
            let Some(agent) = self.agents.get(&agent_name) else {
                continue;
            };
            let _ = writeln!(out, "{}        {} = (", pad, interner.resolve(agent_name));
            let _ = writeln!(out, "{}            obj = {}", pad, agent.obj.render(interner));
            if details {
                let _ = writeln!(out, "{}            programs = (", pad);
                for (i, program) in agent.programs.iter().enumerate() {
                    let _ = writeln!(out, "{}                P{} = {}", pad, i, program.render(interner));
                }
                let _ = writeln!(out, "{}            )", pad);
            }
            let _ = writeln!(out, "{}        )", pad);
        }
        let _ = write!(out, "{}}}", pad);
        out
    }
}

//! P swarms: colonies around shared global environments.

use log::{info, warn};
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::fmt::Write as _;
use pcolsim_base::{Interner, Symbol};

use crate::colony::{ModelError, Pcolony};
use crate::multiset::Multiset;
use crate::sim::StepResult;

/// The three swarm-level environments, passed as one value into colony
/// steps so exteroceptive rules can reach them without back-references.
#[derive(Debug, Clone, Default)]
pub struct SwarmEnvs {
    pub global_env: Multiset,
    pub in_global_env: Multiset,
    pub out_global_env: Multiset,
}

/// A P swarm: named colonies advancing synchronously and exchanging
/// objects through the shared [`SwarmEnvs`].
#[derive(Debug, Clone)]
pub struct Pswarm {
    pub envs: SwarmEnvs,
    /// Colony names in declaration order; step order within a swarm step.
    pub colony_names: Vec<Symbol>,
    pub colonies: FxHashMap<Symbol, Pcolony>,
    /// Last step result per colony; colonies that ran out of executable
    /// programs are skipped by subsequent steps.
    pub results: FxHashMap<Symbol, StepResult>,
}

impl Pswarm {
    pub fn new() -> Self {
        Self {
            envs: SwarmEnvs::default(),
            colony_names: Vec::new(),
            colonies: FxHashMap::default(),
            results: FxHashMap::default(),
        }
    }

    /// Runs one swarm step: every colony that has not yet halted advances
    /// by one colony step, in declaration order.
    ///
    /// Colonies sharing the global environments observe each other's
    /// effects in that order within the same swarm step.
    pub fn run_step(&mut self, interner: &Interner, rng: &mut StdRng) -> StepResult {
        let mut finished = true;

        for &name in &self.colony_names {
            if self.results.get(&name) == Some(&StepResult::NoMoreExecutables) {
                continue;
            }
            let Some(colony) = self.colonies.get_mut(&name) else {
                continue;
            };

            info!("running simulation step of colony {}", interner.resolve(name));
            let result = colony.run_step(Some(&mut self.envs), interner, rng);
            self.results.insert(name, result);

            match result {
                StepResult::NoMoreExecutables => {
                    warn!("colony {} finished", interner.resolve(name));
                }
                StepResult::Error => return StepResult::Error,
                StepResult::Finished => finished = false,
            }
        }

        if finished {
            StepResult::NoMoreExecutables
        } else {
            StepResult::Finished
        }
    }

    /// Validates every colony; warnings come back prefixed with the colony
    /// name.
    pub fn validate(&self, interner: &Interner) -> Result<Vec<String>, ModelError> {
        let mut warnings = Vec::new();
        for &name in &self.colony_names {
            let Some(colony) = self.colonies.get(&name) else {
                warnings.push(format!(
                    "colony {} is declared in C but never defined",
                    interner.resolve(name)
                ));
                continue;
            };
            for warning in colony.validate(true, interner)? {
                warnings.push(format!("{}: {}", interner.resolve(name), warning));
            }
        }
        Ok(warnings)
    }

    /// Renders the swarm and all colonies as an indented tree.
    pub fn render(&self, details: bool, interner: &Interner) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Pswarm = {{");
        let _ = writeln!(out, "    global_env = {}", self.envs.global_env.render(interner));
        let _ = writeln!(out, "    in_global_env = {}", self.envs.in_global_env.render(interner));
        let _ = writeln!(out, "    out_global_env = {}", self.envs.out_global_env.render(interner));
        let names: Vec<&str> = self.colony_names.iter().map(|&n| interner.resolve(n)).collect();
        let _ = writeln!(out, "    C = ({})", names.join(", "));
        for &name in &self.colony_names {
            if let Some(colony) = self.colonies.get(&name) {
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", colony.render(interner.resolve(name), 8, details, interner));
            }
        }
        let _ = write!(out, "}}");
        out
    }
}

impl Default for Pswarm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::program::Program;
    use crate::rule::{Rule, RuleBranch, RuleKind};
    use rand::SeedableRng;

    /// One colony whose agent swaps `a` for `g` in the global environment.
    fn swarm_fixture(interner: &mut Interner) -> Pswarm {
        let e = interner.intern("e");
        let f = interner.intern("f");
        let a = interner.intern("a");
        let g = interner.intern("g");
        let c1 = interner.intern("c1");
        let runner = interner.intern("runner");

        let mut colony = Pcolony::new(e, f);
        colony.alphabet = vec![a, g, e, f];
        colony.capacity = 1;
        colony.env.insert(e);
        colony.agent_names.push(runner);
        let mut agent = Agent::new(Multiset::from_symbols([a]));
        agent.programs.push(Program::new(vec![Rule::Simple(RuleBranch::new(
            RuleKind::Exteroceptive,
            a,
            g,
        ))]));
        colony.agents.insert(runner, agent);

        let mut swarm = Pswarm::new();
        swarm.envs.global_env = Multiset::from_symbols([g, e]);
        swarm.colony_names.push(c1);
        swarm.colonies.insert(c1, colony);
        swarm
    }

    #[test]
    fn swarm_step_moves_objects_through_global_env() {
        let mut interner = Interner::new();
        let mut swarm = swarm_fixture(&mut interner);
        let a = interner.intern("a");
        let g = interner.intern("g");
        let c1 = interner.intern("c1");
        let runner = interner.intern("runner");
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(swarm.run_step(&interner, &mut rng), StepResult::Finished);
        assert!(swarm.colonies[&c1].agents[&runner].obj.contains(g));
        assert!(swarm.envs.global_env.contains(a));
        assert!(!swarm.envs.global_env.contains(g));

        // The colony halts, and so does the swarm.
        assert_eq!(swarm.run_step(&interner, &mut rng), StepResult::NoMoreExecutables);
        assert_eq!(swarm.results[&c1], StepResult::NoMoreExecutables);
    }

    #[test]
    fn halted_colonies_are_skipped() {
        let mut interner = Interner::new();
        let mut swarm = swarm_fixture(&mut interner);
        let c1 = interner.intern("c1");
        swarm.results.insert(c1, StepResult::NoMoreExecutables);
        let mut rng = StdRng::seed_from_u64(0);

        let before = swarm.envs.global_env.clone();
        assert_eq!(swarm.run_step(&interner, &mut rng), StepResult::NoMoreExecutables);
        assert_eq!(swarm.envs.global_env, before);
    }
}

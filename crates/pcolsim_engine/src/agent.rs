//! Agents: program selection and execution.
//!
//! Each simulation step runs in two phases per agent:
//!
//! 1. **Selection** ([`Agent::select_program`]) — a pure analysis of the
//!    pre-step state that finds every applicable program and picks one,
//!    uniformly at random when several apply.
//! 2. **Execution** ([`Agent::execute_program`]) — commits the chosen
//!    program, mutating the agent's objects and the environments.
//!
//! A program is applicable when every rule is individually applicable *and*
//! the program as a whole can be satisfied: the per-rule checks establish
//! membership, the aggregate check sums the demanded counts per multiset and
//! compares them against what is actually available. `< a -> b, a -> c >`
//! needs two `a`s even though each rule alone only needs one.
//!
//! Because agents commit sequentially against shared environments, an
//! earlier agent may consume an object a later agent's selection counted on.
//! Execution therefore rechecks every precondition and reports an
//! [`ExecutionFault`] on a shortfall instead of corrupting the state.

use log::{debug, error};
use rand::rngs::StdRng;
use rand::Rng;
use pcolsim_base::{Interner, Symbol};

use crate::multiset::Multiset;
use crate::program::Program;
use crate::rule::{Rule, RuleBranch, RuleKind};
use crate::swarm::SwarmEnvs;

/// Which branch of a rule was picked at selection time.
///
/// Non-conditional rules always record `First`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecChoice {
    First,
    Second,
}

/// Transient per-step selection state: the chosen program and, rule by
/// rule, which branch to commit.
#[derive(Debug, Clone)]
pub struct ChosenProgram {
    pub index: usize,
    choices: Vec<ExecChoice>,
}

/// Raised when execution finds a precondition that selection had
/// established is no longer true.
#[derive(Debug, Clone)]
pub enum ExecutionFault {
    /// `execute_program` was called without a prior successful selection.
    NoProgramChosen,
    /// An object counted on at selection time is gone at commit time.
    MissingObject {
        /// Rendered rule that could not be committed.
        rule: String,
        /// Object that was missing.
        object: String,
        /// Where it was missing from.
        location: &'static str,
    },
}

impl std::fmt::Display for ExecutionFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionFault::NoProgramChosen => {
                write!(f, "no program was chosen for execution")
            }
            ExecutionFault::MissingObject {
                rule,
                object,
                location,
            } => write!(
                f,
                "object {} was required in {} by rule {} but was not found",
                object, location, rule
            ),
        }
    }
}

impl std::error::Error for ExecutionFault {}

/// Aggregate demand of one program, bucketed by target multiset.
#[derive(Default)]
struct Demand {
    obj: Multiset,
    env: Multiset,
    global_env: Multiset,
    in_global_env: Multiset,
    out_global_env: Multiset,
}

impl Demand {
    fn add(&mut self, branch: &RuleBranch) {
        self.obj.insert(branch.lhs);
        match branch.kind {
            RuleKind::Evolution => {}
            RuleKind::Communication => self.env.insert(branch.rhs),
            RuleKind::Exteroceptive => self.global_env.insert(branch.rhs),
            RuleKind::InExteroceptive => self.in_global_env.insert(branch.rhs),
            RuleKind::OutExteroceptive => self.out_global_env.insert(branch.rhs),
        }
    }

    /// Environment buckets ignore the elementary object: environments are
    /// assumed to hold inexhaustibly many `e`.
    fn env_satisfied(need: &Multiset, have: &Multiset, e: Symbol) -> bool {
        need.iter().all(|(obj, n)| obj == e || have.count(obj) >= n)
    }

    fn satisfied(&self, obj: &Multiset, env: &Multiset, swarm: Option<&SwarmEnvs>, e: Symbol) -> bool {
        if !self.obj.iter().all(|(o, n)| obj.count(o) >= n) {
            debug!("aggregate agent-object check failed");
            return false;
        }
        if !Self::env_satisfied(&self.env, env, e) {
            debug!("aggregate environment check failed");
            return false;
        }
        match swarm {
            Some(envs) => {
                Self::env_satisfied(&self.global_env, &envs.global_env, e)
                    && Self::env_satisfied(&self.in_global_env, &envs.in_global_env, e)
                    && Self::env_satisfied(&self.out_global_env, &envs.out_global_env, e)
            }
            None => {
                self.global_env.is_empty()
                    && self.in_global_env.is_empty()
                    && self.out_global_env.is_empty()
            }
        }
    }
}

/// A P colony agent: a capacity-bounded multiset of objects plus the
/// programs that may rewrite it.
#[derive(Debug, Clone)]
pub struct Agent {
    pub obj: Multiset,
    pub programs: Vec<Program>,
    chosen: Option<ChosenProgram>,
}

impl Agent {
    pub fn new(obj: Multiset) -> Self {
        Self {
            obj,
            programs: Vec::new(),
            chosen: None,
        }
    }

    /// The selection made by the last [`select_program`](Self::select_program)
    /// call, if any.
    pub fn chosen(&self) -> Option<&ChosenProgram> {
        self.chosen.as_ref()
    }

    /// Renders the chosen program showing only the branch that will commit
    /// for each rule.
    pub fn describe_chosen(&self, interner: &Interner) -> Option<String> {
        let chosen = self.chosen.as_ref()?;
        let program = self.programs.get(chosen.index)?;
        let parts: Vec<String> = program
            .rules()
            .iter()
            .zip(&chosen.choices)
            .map(|(rule, choice)| chosen_branch(rule, *choice).render(interner))
            .collect();
        Some(format!("P{} = < {} >", chosen.index, parts.join(", ")))
    }

    /// Checks whether one branch's environment condition holds.
    fn branch_available(&self, branch: &RuleBranch, env: &Multiset, swarm: Option<&SwarmEnvs>) -> bool {
        match branch.kind {
            RuleKind::Evolution => true,
            RuleKind::Communication => env.contains(branch.rhs),
            RuleKind::Exteroceptive => swarm.is_some_and(|s| s.global_env.contains(branch.rhs)),
            RuleKind::InExteroceptive => swarm.is_some_and(|s| s.in_global_env.contains(branch.rhs)),
            RuleKind::OutExteroceptive => swarm.is_some_and(|s| s.out_global_env.contains(branch.rhs)),
        }
    }

    /// Returns the branch choices for `program` if it is applicable in the
    /// current state, or `None` otherwise.
    fn try_program(
        &self,
        program: &Program,
        env: &Multiset,
        swarm: Option<&SwarmEnvs>,
        e: Symbol,
    ) -> Option<Vec<ExecChoice>> {
        let mut choices = Vec::with_capacity(program.len());
        let mut demand = Demand::default();

        for rule in program.rules() {
            match rule {
                Rule::Simple(branch) => {
                    if !self.obj.contains(branch.lhs) || !self.branch_available(branch, env, swarm) {
                        return None;
                    }
                    demand.add(branch);
                    choices.push(ExecChoice::First);
                }
                // Priority pair: each branch is judged on its own left hand
                // side and its own environment condition.
                Rule::Conditional { first, second } => {
                    if self.obj.contains(first.lhs) && self.branch_available(first, env, swarm) {
                        demand.add(first);
                        choices.push(ExecChoice::First);
                    } else if self.obj.contains(second.lhs)
                        && self.branch_available(second, env, swarm)
                    {
                        demand.add(second);
                        choices.push(ExecChoice::Second);
                    } else {
                        return None;
                    }
                }
            }
        }

        demand.satisfied(&self.obj, env, swarm, e).then_some(choices)
    }

    /// Selection phase: finds every applicable program and records one,
    /// drawing uniformly when more than one applies (the only source of
    /// nondeterminism in the engine).
    ///
    /// Pure with respect to the simulated state; only the transient
    /// selection record on the agent changes. Returns `true` when a program
    /// was chosen.
    pub fn select_program(
        &mut self,
        env: &Multiset,
        swarm: Option<&SwarmEnvs>,
        e: Symbol,
        rng: &mut StdRng,
    ) -> bool {
        self.chosen = None;

        let mut applicable: Vec<ChosenProgram> = Vec::new();
        for (index, program) in self.programs.iter().enumerate() {
            debug!("checking program {} of {}", index, self.programs.len());
            if let Some(choices) = self.try_program(program, env, swarm, e) {
                applicable.push(ChosenProgram { index, choices });
            }
        }

        match applicable.len() {
            0 => {
                debug!("no executable program");
                false
            }
            1 => {
                debug!("chosen program {}", applicable[0].index);
                self.chosen = applicable.pop();
                true
            }
            n => {
                let pick = rng.gen_range(0..n);
                debug!("stochastically chosen program {}", applicable[pick].index);
                self.chosen = Some(applicable.swap_remove(pick));
                true
            }
        }
    }

    /// Commit phase: applies each rule of the chosen program in order,
    /// using the branch recorded at selection time.
    ///
    /// Every precondition is rechecked against the *current* state; a
    /// shortfall (another agent got there first, or a selection bug) is an
    /// [`ExecutionFault`].
    pub fn execute_program(
        &mut self,
        env: &mut Multiset,
        mut swarm: Option<&mut SwarmEnvs>,
        e: Symbol,
        interner: &Interner,
    ) -> Result<(), ExecutionFault> {
        let chosen = match self.chosen.take() {
            Some(chosen) => chosen,
            None => return Err(ExecutionFault::NoProgramChosen),
        };
        let program = &self.programs[chosen.index];

        for (rule, choice) in program.rules().iter().zip(&chosen.choices) {
            let branch = chosen_branch(rule, *choice);

            if !self.obj.remove(branch.lhs) {
                return Err(fault(branch, branch.lhs, "the agent", interner));
            }

            match branch.kind {
                RuleKind::Evolution => {
                    self.obj.insert(branch.rhs);
                }
                kind => {
                    let (target, location) = match (kind, swarm.as_deref_mut()) {
                        (RuleKind::Communication, _) => (&mut *env, "the environment"),
                        (RuleKind::Exteroceptive, Some(envs)) => {
                            (&mut envs.global_env, "the global swarm environment")
                        }
                        (RuleKind::InExteroceptive, Some(envs)) => {
                            (&mut envs.in_global_env, "the input global swarm environment")
                        }
                        (RuleKind::OutExteroceptive, Some(envs)) => {
                            (&mut envs.out_global_env, "the output global swarm environment")
                        }
                        // Swarm-targeted rule in a standalone colony;
                        // selection never chooses one.
                        _ => {
                            return Err(fault(branch, branch.rhs, "the swarm", interner));
                        }
                    };

                    // The elementary object is sticky: never drained from an
                    // environment, never pushed back into one.
                    if branch.rhs != e && !target.remove(branch.rhs) {
                        return Err(fault(branch, branch.rhs, location, interner));
                    }
                    if branch.lhs != e {
                        target.insert(branch.lhs);
                    }
                    self.obj.insert(branch.rhs);
                }
            }
        }

        Ok(())
    }
}

fn chosen_branch(rule: &Rule, choice: ExecChoice) -> &RuleBranch {
    match (rule, choice) {
        (Rule::Simple(branch), _) => branch,
        (Rule::Conditional { first, .. }, ExecChoice::First) => first,
        (Rule::Conditional { second, .. }, ExecChoice::Second) => second,
    }
}

fn fault(branch: &RuleBranch, object: Symbol, location: &'static str, interner: &Interner) -> ExecutionFault {
    let fault = ExecutionFault::MissingObject {
        rule: branch.render(interner),
        object: interner.resolve(object).to_string(),
        location,
    };
    error!("{}", fault);
    fault
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    struct Fixture {
        interner: Interner,
        rng: StdRng,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                interner: Interner::new(),
                rng: StdRng::seed_from_u64(7),
            }
        }

        fn sym(&mut self, s: &str) -> Symbol {
            self.interner.intern(s)
        }
    }

    fn evolution(lhs: Symbol, rhs: Symbol) -> Rule {
        Rule::Simple(RuleBranch::new(RuleKind::Evolution, lhs, rhs))
    }

    fn communication(lhs: Symbol, rhs: Symbol) -> Rule {
        Rule::Simple(RuleBranch::new(RuleKind::Communication, lhs, rhs))
    }

    #[test]
    fn aggregate_check_rejects_overlapping_demand() {
        let mut fx = Fixture::new();
        let a = fx.sym("a");
        let b = fx.sym("b");
        let c = fx.sym("c");
        let e = fx.sym("e");

        // Two rules both consume `a`, but the agent holds only one.
        let mut agent = Agent::new(Multiset::from_symbols([a, b]));
        agent.programs.push(Program::new(vec![evolution(a, b), evolution(a, c)]));
        let env = Multiset::from_symbols([e]);

        assert!(!agent.select_program(&env, None, e, &mut fx.rng));
    }

    #[test]
    fn aggregate_check_ignores_elementary_in_environments() {
        let mut fx = Fixture::new();
        let a = fx.sym("a");
        let b = fx.sym("b");
        let e = fx.sym("e");

        // Both rules pull `e` from the environment, which holds a single
        // one; `e` is inexhaustible so the program still applies.
        let mut agent = Agent::new(Multiset::from_symbols([a, b]));
        agent
            .programs
            .push(Program::new(vec![communication(a, e), communication(b, e)]));
        let env = Multiset::from_symbols([e]);

        assert!(agent.select_program(&env, None, e, &mut fx.rng));
    }

    #[test]
    fn conditional_branches_are_judged_independently() {
        let mut fx = Fixture::new();
        let a = fx.sym("a");
        let b = fx.sym("b");
        let c = fx.sym("c");
        let e = fx.sym("e");

        // First branch wants `b` from an environment that has none, so the
        // alternative fires.
        let rule = Rule::Conditional {
            first: RuleBranch::new(RuleKind::Communication, a, b),
            second: RuleBranch::new(RuleKind::Evolution, a, c),
        };
        let mut agent = Agent::new(Multiset::from_symbols([a]));
        agent.programs.push(Program::new(vec![rule]));
        let mut env = Multiset::from_symbols([e]);

        assert!(agent.select_program(&env, None, e, &mut fx.rng));
        agent
            .execute_program(&mut env, None, e, &fx.interner)
            .unwrap();
        assert!(agent.obj.contains(c));
        assert!(!agent.obj.contains(a));
    }

    #[test]
    fn swarm_rules_are_inapplicable_without_a_swarm() {
        let mut fx = Fixture::new();
        let a = fx.sym("a");
        let g = fx.sym("g");
        let e = fx.sym("e");

        let mut agent = Agent::new(Multiset::from_symbols([a]));
        agent.programs.push(Program::new(vec![Rule::Simple(RuleBranch::new(
            RuleKind::Exteroceptive,
            a,
            g,
        ))]));
        let env = Multiset::from_symbols([e]);

        assert!(!agent.select_program(&env, None, e, &mut fx.rng));
    }

    #[test]
    fn execution_faults_when_the_environment_ran_dry() {
        let mut fx = Fixture::new();
        let a = fx.sym("a");
        let b = fx.sym("b");
        let e = fx.sym("e");

        let mut agent = Agent::new(Multiset::from_symbols([a]));
        agent.programs.push(Program::new(vec![communication(a, b)]));
        let mut env = Multiset::from_symbols([b, e]);

        assert!(agent.select_program(&env, None, e, &mut fx.rng));
        // Another agent drains the `b` between selection and commit.
        assert!(env.remove(b));
        let fault = agent
            .execute_program(&mut env, None, e, &fx.interner)
            .unwrap_err();
        assert!(fault.to_string().contains("a <-> b"));
    }

    #[test]
    fn selection_with_several_candidates_is_seed_stable() {
        let mut fx = Fixture::new();
        let a = fx.sym("a");
        let b = fx.sym("b");
        let c = fx.sym("c");
        let e = fx.sym("e");

        let mut agent = Agent::new(Multiset::from_symbols([a]));
        agent.programs.push(Program::new(vec![evolution(a, b)]));
        agent.programs.push(Program::new(vec![evolution(a, c)]));
        let env = Multiset::from_symbols([e]);

        let mut first_run = Vec::new();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..16 {
            assert!(agent.select_program(&env, None, e, &mut rng));
            first_run.push(agent.chosen().map(|c| c.index));
        }

        let mut rng = StdRng::seed_from_u64(99);
        for expected in first_run {
            assert!(agent.select_program(&env, None, e, &mut rng));
            assert_eq!(agent.chosen().map(|c| c.index), expected);
        }
    }
}

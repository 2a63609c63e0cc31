//! End-to-end engine scenarios.
//!
//! Small colonies and swarms built by hand, stepped through the public
//! API, with the resulting agent and environment contents checked object
//! by object.

use rand::rngs::StdRng;
use rand::SeedableRng;
use pcolsim_base::{Interner, Symbol};
use pcolsim_engine::{
    Agent, Multiset, Pcolony, Program, Pswarm, Rule, RuleBranch, RuleKind, StepResult,
};

fn evolution(lhs: Symbol, rhs: Symbol) -> Rule {
    Rule::Simple(RuleBranch::new(RuleKind::Evolution, lhs, rhs))
}

fn communication(lhs: Symbol, rhs: Symbol) -> Rule {
    Rule::Simple(RuleBranch::new(RuleKind::Communication, lhs, rhs))
}

fn colony(interner: &mut Interner, capacity: usize, env: &[&str]) -> Pcolony {
    let e = interner.intern("e");
    let f = interner.intern("f");
    let mut colony = Pcolony::new(e, f);
    colony.capacity = capacity;
    colony.env = Multiset::from_symbols(env.iter().map(|s| interner.intern(s)));
    colony
}

fn add_agent(colony: &mut Pcolony, interner: &mut Interner, name: &str, obj: &[&str], programs: Vec<Program>) {
    let name = interner.intern(name);
    let mut agent = Agent::new(Multiset::from_symbols(obj.iter().map(|s| interner.intern(s))));
    agent.programs = programs;
    colony.agent_names.push(name);
    colony.agents.insert(name, agent);
}

fn obj_of<'c>(colony: &'c Pcolony, interner: &mut Interner, name: &str) -> &'c Multiset {
    &colony.agents[&interner.intern(name)].obj
}

#[test]
fn single_evolution_step_then_halt() {
    let mut interner = Interner::new();
    let mut rng = StdRng::seed_from_u64(0);
    let mut col = colony(&mut interner, 1, &["e"]);
    let a = interner.intern("a");
    let b = interner.intern("b");
    add_agent(&mut col, &mut interner, "ag", &["a"], vec![Program::new(vec![evolution(a, b)])]);

    let env_before = col.env.clone();
    assert_eq!(col.run_step(None, &interner, &mut rng), StepResult::Finished);
    let obj = obj_of(&col, &mut interner, "ag");
    assert_eq!(obj.count(b), 1);
    assert!(!obj.contains(a));
    assert_eq!(col.env, env_before);

    assert_eq!(col.run_step(None, &interner, &mut rng), StepResult::NoMoreExecutables);
}

#[test]
fn communication_consumes_from_the_environment() {
    let mut interner = Interner::new();
    let mut rng = StdRng::seed_from_u64(0);
    let mut col = colony(&mut interner, 1, &["b", "b", "e"]);
    let a = interner.intern("a");
    let b = interner.intern("b");
    let e = interner.intern("e");
    add_agent(&mut col, &mut interner, "ag", &["a"], vec![Program::new(vec![communication(a, b)])]);

    assert_eq!(col.run_step(None, &interner, &mut rng), StepResult::Finished);
    let obj = obj_of(&col, &mut interner, "ag");
    assert_eq!(obj.count(b), 1);
    assert_eq!(col.env.count(b), 1);
    assert_eq!(col.env.count(a), 1);
    assert_eq!(col.env.count(e), 1);
}

#[test]
fn conditional_rule_falls_through_to_the_alternative() {
    let mut interner = Interner::new();
    let mut rng = StdRng::seed_from_u64(0);
    let mut col = colony(&mut interner, 2, &["e"]);
    let a = interner.intern("a");
    let b = interner.intern("b");
    let c = interner.intern("c");
    let conditional = Rule::Conditional {
        first: RuleBranch::new(RuleKind::Communication, a, b),
        second: RuleBranch::new(RuleKind::Evolution, a, c),
    };
    add_agent(
        &mut col,
        &mut interner,
        "ag",
        &["a", "a"],
        vec![Program::new(vec![conditional, evolution(a, a)])],
    );

    assert_eq!(col.run_step(None, &interner, &mut rng), StepResult::Finished);
    let obj = obj_of(&col, &mut interner, "ag");
    assert_eq!(obj.count(a), 1);
    assert_eq!(obj.count(c), 1);
    assert_eq!(obj.total(), 2);
}

#[test]
fn capacity_is_conserved_under_communication() {
    let mut interner = Interner::new();
    let mut rng = StdRng::seed_from_u64(0);
    let mut col = colony(&mut interner, 3, &["x", "e"]);
    let x = interner.intern("x");
    let y = interner.intern("y");
    let e = interner.intern("e");
    add_agent(
        &mut col,
        &mut interner,
        "ag",
        &["y", "y", "y"],
        vec![Program::new(vec![communication(y, x), evolution(y, y), evolution(y, y)])],
    );

    assert_eq!(col.run_step(None, &interner, &mut rng), StepResult::Finished);
    let obj = obj_of(&col, &mut interner, "ag");
    assert_eq!(obj.total() as usize, col.capacity);
    assert_eq!(obj.count(x), 1);
    assert_eq!(obj.count(y), 2);
    assert_eq!(col.env.count(y), 1);
    assert_eq!(col.env.count(e), 1);
    assert!(!col.env.contains(x));
}

#[test]
fn exteroceptive_rule_swaps_with_the_global_environment() {
    let mut interner = Interner::new();
    let mut rng = StdRng::seed_from_u64(0);
    let a = interner.intern("a");
    let g = interner.intern("g");
    let e = interner.intern("e");
    let c1 = interner.intern("c1");

    let mut col = colony(&mut interner, 1, &["e"]);
    add_agent(
        &mut col,
        &mut interner,
        "ag",
        &["a"],
        vec![Program::new(vec![Rule::Simple(RuleBranch::new(RuleKind::Exteroceptive, a, g))])],
    );

    let mut swarm = Pswarm::new();
    swarm.envs.global_env = Multiset::from_symbols([g, e]);
    swarm.colony_names.push(c1);
    swarm.colonies.insert(c1, col);

    assert_eq!(swarm.run_step(&interner, &mut rng), StepResult::Finished);
    let obj = &swarm.colonies[&c1].agents[&interner.intern("ag")].obj;
    assert_eq!(obj.count(g), 1);
    assert_eq!(swarm.envs.global_env.count(a), 1);
    assert_eq!(swarm.envs.global_env.count(e), 1);
    assert!(!swarm.envs.global_env.contains(g));
}

#[test]
fn capacity_and_elementary_object_hold_over_a_long_run() {
    // A two-agent colony competing for environment objects; after every
    // step each agent still holds exactly `capacity` objects and the
    // environment still holds its elementary object.
    let mut interner = Interner::new();
    let mut rng = StdRng::seed_from_u64(17);
    let mut col = colony(&mut interner, 2, &["b", "b", "b", "e"]);
    let a = interner.intern("a");
    let b = interner.intern("b");
    let e = interner.intern("e");
    for name in ["first", "second"] {
        add_agent(
            &mut col,
            &mut interner,
            name,
            &["a", "a"],
            vec![
                Program::new(vec![communication(a, b), evolution(a, a)]),
                Program::new(vec![communication(b, e), evolution(a, a)]),
            ],
        );
    }

    for _ in 0..32 {
        let result = col.run_step(None, &interner, &mut rng);
        assert_ne!(result, StepResult::Error);
        assert!(col.env.count(e) >= 1);
        for agent in col.agents.values() {
            assert_eq!(agent.obj.total() as usize, col.capacity);
        }
        if result == StepResult::NoMoreExecutables {
            break;
        }
    }
}

#[test]
fn vacuous_step_mutates_nothing() {
    let mut interner = Interner::new();
    let mut rng = StdRng::seed_from_u64(0);
    let mut col = colony(&mut interner, 1, &["e"]);
    let b = interner.intern("b");
    let c = interner.intern("c");
    // The agent holds `a` but its only program needs `b`.
    add_agent(&mut col, &mut interner, "ag", &["a"], vec![Program::new(vec![evolution(b, c)])]);

    let before = col.clone();
    assert_eq!(col.run_step(None, &interner, &mut rng), StepResult::NoMoreExecutables);
    assert_eq!(col.env, before.env);
    let name = interner.intern("ag");
    assert_eq!(col.agents[&name].obj, before.agents[&name].obj);
}

#[test]
fn identical_seeds_give_identical_trajectories() {
    // Nondeterministic colony: every step both programs apply.
    fn build(interner: &mut Interner) -> Pcolony {
        let a = interner.intern("a");
        let b = interner.intern("b");
        let mut col = colony(interner, 1, &["e"]);
        add_agent(
            &mut col,
            interner,
            "ag",
            &["a"],
            vec![
                Program::new(vec![evolution(a, b)]),
                Program::new(vec![evolution(a, a)]),
                Program::new(vec![evolution(b, a)]),
                Program::new(vec![evolution(b, b)]),
            ],
        );
        col
    }

    let mut interner = Interner::new();
    let name = interner.intern("ag");

    let mut trajectories = Vec::new();
    for _ in 0..2 {
        let mut col = build(&mut interner);
        let mut rng = StdRng::seed_from_u64(2024);
        let mut trace = Vec::new();
        for _ in 0..64 {
            assert_eq!(col.run_step(None, &interner, &mut rng), StepResult::Finished);
            trace.push(col.agents[&name].obj.clone());
        }
        trajectories.push(trace);
    }

    assert_eq!(trajectories[0], trajectories[1]);
}

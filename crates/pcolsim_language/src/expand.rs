//! Wildcard expansion.
//!
//! Colony descriptions may use two wildcard markers inside object
//! identifiers:
//!
//! - `%id` — replaced by the colony's identity string;
//! - `*` — replaced by every entry of a caller-supplied suffix list,
//!   multiplying the construct it appears in.
//!
//! `%id` is substituted first, then `*`. In object lists and multisets a
//! `*` item becomes one item per suffix (counts preserved). A program
//! containing `*` is cloned once per suffix, the wildcard substituted in
//! every side of every rule of each clone, and the original removed; the
//! clones are appended after the surviving programs, so
//! `< e -> e, e -> d_* >` with suffixes `["0", "1"]` becomes
//! `< e -> e, e -> d_0 >` and `< e -> e, e -> d_1 >`.
//!
//! Expansion covers the alphabet, the colony environment, and every
//! agent's objects and programs.

use log::debug;
use pcolsim_base::{Interner, Symbol};
use pcolsim_engine::{Agent, Multiset, Pcolony, Program, Rule, RuleBranch};

/// Substitutes `tag` in one identifier, interning the result. Identifiers
/// without the tag come back unchanged.
fn replace_symbol(sym: Symbol, tag: &str, replacement: &str, interner: &mut Interner) -> Symbol {
    let replaced = {
        let name = interner.resolve(sym);
        if !name.contains(tag) {
            return sym;
        }
        name.replace(tag, replacement)
    };
    interner.intern(&replaced)
}

fn replace_in_branch(
    branch: &RuleBranch,
    tag: &str,
    replacement: &str,
    interner: &mut Interner,
) -> RuleBranch {
    RuleBranch::new(
        branch.kind,
        replace_symbol(branch.lhs, tag, replacement, interner),
        replace_symbol(branch.rhs, tag, replacement, interner),
    )
}

fn replace_in_rule(rule: &Rule, tag: &str, replacement: &str, interner: &mut Interner) -> Rule {
    match rule {
        Rule::Simple(branch) => Rule::Simple(replace_in_branch(branch, tag, replacement, interner)),
        Rule::Conditional { first, second } => Rule::Conditional {
            first: replace_in_branch(first, tag, replacement, interner),
            second: replace_in_branch(second, tag, replacement, interner),
        },
    }
}

fn replace_in_program(program: &Program, tag: &str, replacement: &str, interner: &mut Interner) -> Program {
    Program::new(
        program
            .rules()
            .iter()
            .map(|rule| replace_in_rule(rule, tag, replacement, interner))
            .collect(),
    )
}

/// Expands an object list: `[a, d_*, e_%id]` with suffixes `["0", "1"]`
/// and id `"7"` becomes `[a, d_0, d_1, e_7]`.
fn expand_symbol_list(list: &mut Vec<Symbol>, suffixes: &[&str], id: &str, interner: &mut Interner) {
    let mut expanded = Vec::with_capacity(list.len());
    for &item in list.iter() {
        let item = replace_symbol(item, "%id", id, interner);
        if interner.resolve(item).contains('*') {
            for suffix in suffixes {
                expanded.push(replace_symbol(item, "*", suffix, interner));
            }
        } else {
            expanded.push(item);
        }
    }
    *list = expanded;
}

/// Expands a multiset the same way, preserving each item's count.
fn expand_multiset(set: &mut Multiset, suffixes: &[&str], id: &str, interner: &mut Interner) {
    let mut expanded = Multiset::new();
    for (item, count) in set.iter() {
        let item = replace_symbol(item, "%id", id, interner);
        if interner.resolve(item).contains('*') {
            for suffix in suffixes {
                expanded.insert_n(replace_symbol(item, "*", suffix, interner), count);
            }
        } else {
            expanded.insert_n(item, count);
        }
    }
    *set = expanded;
}

fn expand_agent(agent: &mut Agent, suffixes: &[&str], id: &str, interner: &mut Interner) {
    expand_multiset(&mut agent.obj, suffixes, id, interner);

    // Identity substitution rewrites programs in place.
    for program in agent.programs.iter_mut() {
        if program.has_wildcard("%id", interner) {
            *program = replace_in_program(program, "%id", id, interner);
        }
    }

    // Suffix substitution multiplies programs: the wildcarded originals are
    // dropped and one clone per suffix is appended.
    let (starred, mut programs): (Vec<Program>, Vec<Program>) = agent
        .programs
        .drain(..)
        .partition(|p| p.has_wildcard("*", interner));
    for program in &starred {
        debug!("expanding wildcarded program {}", program.render(interner));
        for suffix in suffixes {
            programs.push(replace_in_program(program, "*", suffix, interner));
        }
    }
    agent.programs = programs;
}

/// Expands every wildcard in the colony: the alphabet, the environment and
/// all agents, with `id` standing in for `%id`.
pub fn expand_colony(colony: &mut Pcolony, suffixes: &[&str], id: &str, interner: &mut Interner) {
    expand_symbol_list(&mut colony.alphabet, suffixes, id, interner);
    expand_multiset(&mut colony.env, suffixes, id, interner);
    for &name in &colony.agent_names {
        if let Some(agent) = colony.agents.get_mut(&name) {
            expand_agent(agent, suffixes, id, interner);
        }
    }
}

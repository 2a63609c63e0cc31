//! Programs: ordered rule tuples.

use crate::rule::Rule;
use pcolsim_base::Interner;

/// An ordered sequence of rules, applied in lockstep.
///
/// A well-formed program of a colony with capacity `n` holds exactly `n`
/// rules; [`crate::Pcolony::validate`] enforces that after parsing and
/// wildcard expansion. Programs are immutable once built — per-step branch
/// choices live on the agent, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    rules: Vec<Rule>,
}

impl Program {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True iff any contained rule carries the wildcard `tag`.
    pub fn has_wildcard(&self, tag: &str, interner: &Interner) -> bool {
        self.rules.iter().any(|r| r.has_wildcard(tag, interner))
    }

    /// Surface form: `< a -> b, a <-> c >`.
    pub fn render(&self, interner: &Interner) -> String {
        let parts: Vec<String> = self.rules.iter().map(|r| r.render(interner)).collect();
        format!("< {} >", parts.join(", "))
    }
}

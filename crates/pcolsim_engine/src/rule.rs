//! Rewrite rules.
//!
//! A rule is either a single rewrite or a priority pair of two rewrites.
//! The five non-conditional kinds differ only in which multiset the right
//! hand side is exchanged with:
//!
//! | Kind | Syntax | Exchanges with |
//! |------|--------|----------------|
//! | Evolution | `a -> b` | nothing (internal rewrite) |
//! | Communication | `a <-> b` | the colony environment |
//! | Exteroceptive | `a <=> b` | the swarm `global_env` |
//! | InExteroceptive | `a <I=> b` | the swarm `in_global_env` |
//! | OutExteroceptive | `a <=O> b` | the swarm `out_global_env` |
//!
//! A conditional rule `(r1) / (r2)` tries `r1` first and falls back to `r2`
//! when `r1` is not applicable.

use pcolsim_base::{Interner, Symbol};

/// Kind of a non-conditional rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Evolution,
    Communication,
    Exteroceptive,
    InExteroceptive,
    OutExteroceptive,
}

impl RuleKind {
    /// All kinds, in declaration order. Drives the rule-header generator.
    pub const ALL: [RuleKind; 5] = [
        RuleKind::Evolution,
        RuleKind::Communication,
        RuleKind::Exteroceptive,
        RuleKind::InExteroceptive,
        RuleKind::OutExteroceptive,
    ];

    /// Surface operator, as written in the input language.
    pub fn operator(&self) -> &'static str {
        match self {
            RuleKind::Evolution => "->",
            RuleKind::Communication => "<->",
            RuleKind::Exteroceptive => "<=>",
            RuleKind::InExteroceptive => "<I=>",
            RuleKind::OutExteroceptive => "<=O>",
        }
    }

    /// Upper-case name used for generated C enumerators.
    pub fn enumerator(&self) -> &'static str {
        match self {
            RuleKind::Evolution => "EVOLUTION",
            RuleKind::Communication => "COMMUNICATION",
            RuleKind::Exteroceptive => "EXTEROCEPTIVE",
            RuleKind::InExteroceptive => "IN_EXTEROCEPTIVE",
            RuleKind::OutExteroceptive => "OUT_EXTEROCEPTIVE",
        }
    }

    /// True for the kinds that exchange with a swarm environment.
    pub fn targets_swarm(&self) -> bool {
        matches!(
            self,
            RuleKind::Exteroceptive | RuleKind::InExteroceptive | RuleKind::OutExteroceptive
        )
    }
}

/// One rewrite: consume `lhs` from the agent, produce `rhs` according to
/// the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleBranch {
    pub kind: RuleKind,
    pub lhs: Symbol,
    pub rhs: Symbol,
}

impl RuleBranch {
    pub fn new(kind: RuleKind, lhs: Symbol, rhs: Symbol) -> Self {
        Self { kind, lhs, rhs }
    }

    pub fn render(&self, interner: &Interner) -> String {
        format!(
            "{} {} {}",
            interner.resolve(self.lhs),
            self.kind.operator(),
            interner.resolve(self.rhs)
        )
    }

    fn has_wildcard(&self, tag: &str, interner: &Interner) -> bool {
        interner.resolve(self.lhs).contains(tag) || interner.resolve(self.rhs).contains(tag)
    }
}

/// A rule of a program: a single rewrite or a priority pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Simple(RuleBranch),
    Conditional { first: RuleBranch, second: RuleBranch },
}

impl Rule {
    /// True iff any side of any branch contains the literal `tag`
    /// (the wildcard markers `*` and `%id`).
    pub fn has_wildcard(&self, tag: &str, interner: &Interner) -> bool {
        match self {
            Rule::Simple(branch) => branch.has_wildcard(tag, interner),
            Rule::Conditional { first, second } => {
                first.has_wildcard(tag, interner) || second.has_wildcard(tag, interner)
            }
        }
    }

    /// Surface form: `a -> b` or `(a <-> b) / (a -> c)`.
    pub fn render(&self, interner: &Interner) -> String {
        match self {
            Rule::Simple(branch) => branch.render(interner),
            Rule::Conditional { first, second } => {
                format!("({}) / ({})", first.render(interner), second.render(interner))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_rule_renders_surface_syntax() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let rule = Rule::Simple(RuleBranch::new(RuleKind::Evolution, a, b));
        assert_eq!(rule.render(&interner), "a -> b");
    }

    #[test]
    fn conditional_rule_renders_both_branches() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let c = interner.intern("c");
        let rule = Rule::Conditional {
            first: RuleBranch::new(RuleKind::Communication, a, b),
            second: RuleBranch::new(RuleKind::Evolution, a, c),
        };
        assert_eq!(rule.render(&interner), "(a <-> b) / (a -> c)");
    }

    #[test]
    fn wildcard_detection_covers_all_sides() {
        let mut interner = Interner::new();
        let e = interner.intern("e");
        let d = interner.intern("d_*");
        let plain = Rule::Simple(RuleBranch::new(RuleKind::Evolution, e, e));
        assert!(!plain.has_wildcard("*", &interner));

        let starred = Rule::Conditional {
            first: RuleBranch::new(RuleKind::Evolution, e, e),
            second: RuleBranch::new(RuleKind::Communication, e, d),
        };
        assert!(starred.has_wildcard("*", &interner));
        assert!(!starred.has_wildcard("%id", &interner));
    }

    #[test]
    fn operators_match_the_lexer_vocabulary() {
        assert_eq!(RuleKind::Evolution.operator(), "->");
        assert_eq!(RuleKind::Communication.operator(), "<->");
        assert_eq!(RuleKind::Exteroceptive.operator(), "<=>");
        assert_eq!(RuleKind::InExteroceptive.operator(), "<I=>");
        assert_eq!(RuleKind::OutExteroceptive.operator(), "<=O>");
    }
}

//! Multisets of symbolic objects.
//!
//! Agents and environments hold unordered collections of objects with
//! multiplicities. The selection logic distinguishes "object absent" from
//! "object present with count 0" nowhere — a count of zero *is* absence, so
//! zero-count entries are pruned eagerly and `contains` observes exactly the
//! pruned state. That pruning is a semantic invariant of the type, not a
//! storage optimization.

use pcolsim_base::{Interner, Symbol};
use rustc_hash::FxHashMap;

/// A finite mapping from object to positive count.
///
/// Stored counts are always ≥ 1; an absent key means count 0. Equality
/// compares the full key/count mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multiset {
    counts: FxHashMap<Symbol, u32>,
}

impl Multiset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a multiset from a sequence of objects, accumulating
    /// duplicates: `[b, b, e]` yields `b:2, e:1`.
    pub fn from_symbols<I: IntoIterator<Item = Symbol>>(objects: I) -> Self {
        let mut set = Multiset::new();
        for obj in objects {
            set.insert(obj);
        }
        set
    }

    /// Adds one instance of `obj`.
    pub fn insert(&mut self, obj: Symbol) {
        self.insert_n(obj, 1);
    }

    /// Adds `n` instances of `obj`.
    pub fn insert_n(&mut self, obj: Symbol, n: u32) {
        if n > 0 {
            *self.counts.entry(obj).or_insert(0) += n;
        }
    }

    /// Removes one instance of `obj`. Returns `false` (leaving the multiset
    /// untouched) if none is present.
    pub fn remove(&mut self, obj: Symbol) -> bool {
        self.remove_n(obj, 1)
    }

    /// Removes `n` instances of `obj`, pruning the entry when it reaches
    /// zero. Returns `false` (leaving the multiset untouched) if fewer than
    /// `n` are present.
    pub fn remove_n(&mut self, obj: Symbol, n: u32) -> bool {
        let current = self.count(obj);
        if current < n {
            return false;
        }
        if current == n {
            self.counts.remove(&obj);
        } else if n > 0 {
            self.counts.insert(obj, current - n);
        }
        true
    }

    pub fn contains(&self, obj: Symbol) -> bool {
        self.counts.contains_key(&obj)
    }

    pub fn count(&self, obj: Symbol) -> u32 {
        self.counts.get(&obj).copied().unwrap_or(0)
    }

    /// Total number of object instances (the cardinality `|M|`).
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over `(object, count)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u32)> + '_ {
        self.counts.iter().map(|(&obj, &count)| (obj, count))
    }

    /// Renders as `[a:2, e:1]`, sorted by object name for stable output.
    pub fn render(&self, interner: &Interner) -> String {
        let mut entries: Vec<(&str, u32)> = self
            .counts
            .iter()
            .map(|(&obj, &count)| (interner.resolve(obj), count))
            .collect();
        entries.sort();
        let parts: Vec<String> = entries
            .iter()
            .map(|(name, count)| format!("{}:{}", name, count))
            .collect();
        format!("[{}]", parts.join(", "))
    }
}

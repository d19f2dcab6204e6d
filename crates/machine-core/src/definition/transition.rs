use std::collections::HashMap;

use crate::{Direction, StateId, Symbol};

/// Lookup key of the transition relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TransitionKey {
    /// Current control state.
    pub state: StateId,
    /// Current register value.
    pub register: Symbol,
    /// Symbol under the head.
    pub read: Symbol,
}

impl TransitionKey {
    /// Creates a key from its three components.
    #[must_use]
    pub const fn new(state: StateId, register: Symbol, read: Symbol) -> Self {
        Self {
            state,
            register,
            read,
        }
    }
}

/// Effect applied when a [`TransitionKey`] matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TransitionEffect {
    /// Control state after the step.
    pub next_state: StateId,
    /// Register value after the step.
    pub next_register: Symbol,
    /// Symbol written at the head position.
    pub write: Symbol,
    /// Head displacement after the write.
    pub direction: Direction,
}

/// Deterministic partial mapping from keys to effects.
///
/// Built once alongside the machine definition and never mutated by an
/// engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    entries: HashMap<TransitionKey, TransitionEffect>,
}

impl TransitionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    ///
    /// # Errors
    ///
    /// Returns the already-registered effect when `key` is taken; the table
    /// is left unchanged in that case.
    pub fn insert(
        &mut self,
        key: TransitionKey,
        effect: TransitionEffect,
    ) -> Result<(), TransitionEffect> {
        if let Some(existing) = self.entries.get(&key) {
            return Err(*existing);
        }
        self.entries.insert(key, effect);
        Ok(())
    }

    /// Returns the effect registered for `key`, if any.
    #[must_use]
    pub fn lookup(&self, key: &TransitionKey) -> Option<TransitionEffect> {
        self.entries.get(key).copied()
    }

    /// Number of rules in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the table holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all rules in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&TransitionKey, &TransitionEffect)> {
        self.entries.iter()
    }

    /// Returns all rules sorted by key, for stable rendering.
    #[must_use]
    pub fn sorted(&self) -> Vec<(TransitionKey, TransitionEffect)> {
        let mut rules: Vec<_> = self.entries.iter().map(|(k, e)| (*k, *e)).collect();
        rules.sort_by_key(|(key, _)| *key);
        rules
    }
}

//! Immutable machine definition and its builder.
//!
//! A [`MachineDefinition`] is validated once by [`MachineBuilder::build`] and
//! afterwards only read. Engines share it through an `Arc`.

/// Transition relation types and the lookup table.
pub mod transition;

use std::collections::{BTreeSet, HashMap};

pub use transition::{TransitionEffect, TransitionKey, TransitionTable};

use crate::{DefinitionError, Direction, InputError, Symbol, DEFAULT_BLANK_GLYPH};

/// Interned control-state identifier, valid for the definition that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StateId(usize);

impl StateId {
    /// Wraps a raw state index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the index of this state in declaration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One transition rule expressed with state names, as supplied by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Source state name.
    pub state: String,
    /// Register value required to fire.
    pub register: Symbol,
    /// Tape symbol required under the head.
    pub read: Symbol,
    /// Target state name.
    pub next_state: String,
    /// Register value after firing.
    pub next_register: Symbol,
    /// Symbol written at the head position.
    pub write: Symbol,
    /// Head displacement after the write.
    pub direction: Direction,
}

impl Rule {
    /// Creates a rule `(state, register, read) -> (next_state, next_register, write, direction)`.
    #[must_use]
    pub fn new(
        state: impl Into<String>,
        register: impl Into<Symbol>,
        read: impl Into<Symbol>,
        next_state: impl Into<String>,
        next_register: impl Into<Symbol>,
        write: impl Into<Symbol>,
        direction: Direction,
    ) -> Self {
        Self {
            state: state.into(),
            register: register.into(),
            read: read.into(),
            next_state: next_state.into(),
            next_register: next_register.into(),
            write: write.into(),
            direction,
        }
    }
}

/// Collects the parts of a machine and validates them into a [`MachineDefinition`].
#[derive(Debug, Clone)]
pub struct MachineBuilder {
    states: Vec<String>,
    input_alphabet: Vec<char>,
    tape_alphabet: Vec<char>,
    blank_glyph: char,
    initial_state: String,
    final_states: Vec<String>,
    rules: Vec<Rule>,
}

impl MachineBuilder {
    /// Starts a builder for a machine that boots in `initial_state`.
    #[must_use]
    pub fn new(initial_state: impl Into<String>) -> Self {
        Self {
            states: Vec::new(),
            input_alphabet: Vec::new(),
            tape_alphabet: Vec::new(),
            blank_glyph: DEFAULT_BLANK_GLYPH,
            initial_state: initial_state.into(),
            final_states: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Declares the state set in order.
    #[must_use]
    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Declares the input alphabet.
    #[must_use]
    pub fn input_alphabet(mut self, symbols: impl IntoIterator<Item = char>) -> Self {
        self.input_alphabet.extend(symbols);
        self
    }

    /// Declares the tape alphabet, excluding blank.
    #[must_use]
    pub fn tape_alphabet(mut self, symbols: impl IntoIterator<Item = char>) -> Self {
        self.tape_alphabet.extend(symbols);
        self
    }

    /// Overrides the glyph used to render blank cells.
    #[must_use]
    pub const fn blank_glyph(mut self, glyph: char) -> Self {
        self.blank_glyph = glyph;
        self
    }

    /// Declares the accepting states.
    #[must_use]
    pub fn final_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.final_states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Adds one transition rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several transition rules in order.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Validates every structural invariant and produces the definition.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] found: missing or duplicate
    /// states, undeclared state references, symbols outside the tape
    /// alphabet, a blank glyph that doubles as a mark, or two rules sharing a
    /// key.
    pub fn build(self) -> Result<MachineDefinition, DefinitionError> {
        if self.states.is_empty() {
            return Err(DefinitionError::NoStates);
        }

        let mut ids = HashMap::with_capacity(self.states.len());
        for (index, name) in self.states.iter().enumerate() {
            if ids.insert(name.as_str(), StateId::new(index)).is_some() {
                return Err(DefinitionError::DuplicateState(name.clone()));
            }
        }
        let resolve = |name: &str| {
            ids.get(name)
                .copied()
                .ok_or_else(|| DefinitionError::UndeclaredState(name.to_string()))
        };

        let tape_alphabet: BTreeSet<char> = self.tape_alphabet.iter().copied().collect();
        let input_alphabet: BTreeSet<char> = self.input_alphabet.iter().copied().collect();
        if tape_alphabet.contains(&self.blank_glyph) || input_alphabet.contains(&self.blank_glyph)
        {
            return Err(DefinitionError::BlankGlyphInAlphabet(self.blank_glyph));
        }
        if let Some(missing) = input_alphabet.difference(&tape_alphabet).next() {
            return Err(DefinitionError::InputNotInTapeAlphabet(*missing));
        }
        let check_symbol = |symbol: Symbol| match symbol {
            Symbol::Mark(c) if !tape_alphabet.contains(&c) => {
                Err(DefinitionError::SymbolNotInTapeAlphabet(c))
            }
            _ => Ok(symbol),
        };

        let initial_state = resolve(&self.initial_state)?;
        let final_states = self
            .final_states
            .iter()
            .map(|name| resolve(name))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let mut transitions = TransitionTable::new();
        for rule in &self.rules {
            let key = TransitionKey::new(
                resolve(&rule.state)?,
                check_symbol(rule.register)?,
                check_symbol(rule.read)?,
            );
            let effect = TransitionEffect {
                next_state: resolve(&rule.next_state)?,
                next_register: check_symbol(rule.next_register)?,
                write: check_symbol(rule.write)?,
                direction: rule.direction,
            };
            if transitions.insert(key, effect).is_err() {
                return Err(DefinitionError::DuplicateTransition {
                    state: rule.state.clone(),
                    register: rule.register,
                    read: rule.read,
                });
            }
        }

        Ok(MachineDefinition {
            states: self.states,
            input_alphabet,
            tape_alphabet,
            blank_glyph: self.blank_glyph,
            initial_state,
            final_states,
            transitions,
        })
    }
}

/// Validated, immutable description of a cache-register Turing machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineDefinition {
    states: Vec<String>,
    input_alphabet: BTreeSet<char>,
    tape_alphabet: BTreeSet<char>,
    blank_glyph: char,
    initial_state: StateId,
    final_states: BTreeSet<StateId>,
    transitions: TransitionTable,
}

impl MachineDefinition {
    /// State names in declaration order; a [`StateId`] indexes this slice.
    #[must_use]
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Iterates over every state id in declaration order.
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len()).map(StateId::new)
    }

    /// Returns the name of `id`, or `None` if it was issued by another definition.
    #[must_use]
    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.states.get(id.index()).map(String::as_str)
    }

    /// Looks up a state id by name.
    #[must_use]
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|state| state == name)
            .map(StateId::new)
    }

    /// Input alphabet.
    #[must_use]
    pub const fn input_alphabet(&self) -> &BTreeSet<char> {
        &self.input_alphabet
    }

    /// Tape alphabet, excluding blank.
    #[must_use]
    pub const fn tape_alphabet(&self) -> &BTreeSet<char> {
        &self.tape_alphabet
    }

    /// Glyph used to render blank cells.
    #[must_use]
    pub const fn blank_glyph(&self) -> char {
        self.blank_glyph
    }

    /// Boot state.
    #[must_use]
    pub const fn initial_state(&self) -> StateId {
        self.initial_state
    }

    /// Accepting states.
    #[must_use]
    pub const fn final_states(&self) -> &BTreeSet<StateId> {
        &self.final_states
    }

    /// Returns `true` when `state` is accepting.
    #[must_use]
    pub fn is_final(&self, state: StateId) -> bool {
        self.final_states.contains(&state)
    }

    /// Transition relation.
    #[must_use]
    pub const fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Returns the effect for `key`; `None` means the machine halts.
    #[must_use]
    pub fn transition(&self, key: &TransitionKey) -> Option<TransitionEffect> {
        self.transitions.lookup(key)
    }

    /// Converts a raw input string into tape symbols.
    ///
    /// Engines never validate their input; drivers call this first.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidSymbols`] listing every character outside
    /// the input alphabet, in order of appearance.
    pub fn parse_input(&self, input: &str) -> Result<Vec<Symbol>, InputError> {
        let invalid: Vec<char> = input
            .chars()
            .filter(|c| !self.input_alphabet.contains(c))
            .collect();
        if !invalid.is_empty() {
            return Err(InputError::InvalidSymbols(invalid));
        }
        Ok(input.chars().map(Symbol::Mark).collect())
    }

    /// Renders a symbol sequence with this definition's blank glyph.
    #[must_use]
    pub fn render_symbols(&self, symbols: &[Symbol]) -> String {
        symbols.iter().map(|s| s.glyph(self.blank_glyph)).collect()
    }
}

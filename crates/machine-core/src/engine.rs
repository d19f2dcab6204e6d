//! Execution engine: tape loading, single-step transitions and the bounded
//! run loop.
//!
//! A step follows a fixed sequence:
//! 1. Read the scanned symbol (blank past the materialized end)
//! 2. Build the `(state, register, read)` key
//! 3. Halt without side effects when the key has no effect
//! 4. Write, then update state and register
//! 5. Move the head, growing the tape by at most one cell

use std::sync::Arc;

use crate::{
    Configuration, EngineConfig, InputError, MachineDefinition, Outcome, RunReport, RunState,
    StateId, Symbol, Tape, TraceSink, TransitionKey,
};

/// Mutable run state for one machine, sharing an immutable definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    definition: Arc<MachineDefinition>,
    tape: Tape,
    state: StateId,
    register: Symbol,
    steps: u64,
    run_state: RunState,
}

impl Engine {
    /// Creates an engine that has not loaded a tape yet.
    #[must_use]
    pub fn new(definition: Arc<MachineDefinition>) -> Self {
        let state = definition.initial_state();
        Self {
            definition,
            tape: Tape::default(),
            state,
            register: Symbol::Blank,
            steps: 0,
            run_state: RunState::Uninitialized,
        }
    }

    /// Resets the execution state onto `input`.
    ///
    /// The symbols are trusted; use [`Engine::load_str`] or
    /// [`MachineDefinition::parse_input`] to validate raw text first.
    pub fn load(&mut self, input: impl IntoIterator<Item = Symbol>) {
        self.tape = Tape::from_symbols(input);
        self.state = self.definition.initial_state();
        self.register = Symbol::Blank;
        self.steps = 0;
        self.run_state = RunState::Ready;
    }

    /// Validates `input` against the input alphabet and loads it.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidSymbols`] and leaves the engine untouched
    /// when `input` contains characters outside the input alphabet.
    pub fn load_str(&mut self, input: &str) -> Result<(), InputError> {
        let symbols = self.definition.parse_input(input)?;
        self.load(symbols);
        Ok(())
    }

    /// Key the next step will look up.
    #[must_use]
    pub fn current_key(&self) -> TransitionKey {
        TransitionKey::new(self.state, self.register, self.tape.read())
    }

    /// Applies one transition.
    ///
    /// Returns `false` without touching the tape, head, state or register
    /// when no transition matches, or when no tape has been loaded.
    pub fn step(&mut self) -> bool {
        if !self.run_state.is_loaded() {
            return false;
        }

        let Some(effect) = self.definition.transition(&self.current_key()) else {
            self.run_state = RunState::Halted;
            return false;
        };

        self.tape.write(effect.write);
        self.state = effect.next_state;
        self.register = effect.next_register;
        self.tape.shift(effect.direction);
        self.steps += 1;
        self.run_state = RunState::Ready;
        true
    }

    /// Steps until the machine halts or `max_steps` steps have been applied.
    ///
    /// `sink` receives the configuration before every step attempt, including
    /// the final one that discovers the halt.
    pub fn run(&mut self, max_steps: u64, sink: &mut dyn TraceSink) -> RunReport {
        if !self.run_state.is_loaded() {
            return self.report(Outcome::Indeterminate, 0);
        }

        sink.on_run_start();
        let mut executed = 0;
        let mut halted = false;
        while executed < max_steps {
            sink.on_configuration(&self.describe_configuration());
            if !self.step() {
                halted = true;
                break;
            }
            executed += 1;
        }

        let outcome = if !halted {
            Outcome::Indeterminate
        } else if self.definition.is_final(self.state) {
            Outcome::Accepted
        } else {
            Outcome::Rejected
        };
        let report = self.report(outcome, executed);
        sink.on_run_end(&report);
        report
    }

    /// Runs with the bound taken from `config`.
    pub fn run_with_config(
        &mut self,
        config: &EngineConfig,
        sink: &mut dyn TraceSink,
    ) -> RunReport {
        self.run(config.max_steps, sink)
    }

    /// Snapshot of the current configuration.
    #[must_use]
    pub fn describe_configuration(&self) -> Configuration {
        let (left, right) = self.tape.split_at_head();
        Configuration {
            step: self.steps,
            head: self.tape.head(),
            state: self.state,
            state_name: self
                .definition
                .state_name(self.state)
                .unwrap_or_default()
                .to_string(),
            register: self.register,
            left,
            right,
            blank_glyph: self.definition.blank_glyph(),
        }
    }

    fn report(&self, outcome: Outcome, steps: u64) -> RunReport {
        RunReport {
            outcome,
            steps,
            final_state: self.state,
            final_head: self.tape.head(),
            final_tape: self.tape.symbols(),
        }
    }

    /// Shared machine definition.
    #[must_use]
    pub const fn definition(&self) -> &Arc<MachineDefinition> {
        &self.definition
    }

    /// Current tape.
    #[must_use]
    pub const fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Current head index.
    #[must_use]
    pub const fn head(&self) -> usize {
        self.tape.head()
    }

    /// Current control state.
    #[must_use]
    pub const fn state(&self) -> StateId {
        self.state
    }

    /// Current register value.
    #[must_use]
    pub const fn register(&self) -> Symbol {
        self.register
    }

    /// Transitions applied since the last load.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Renders the current tape with the definition's blank glyph.
    #[must_use]
    pub fn render_tape(&self) -> String {
        self.definition.render_symbols(&self.tape.symbols())
    }
}

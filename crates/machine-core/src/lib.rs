//! Core crate for the cache-register Turing machine simulator.
//!
//! The machine extends a single-tape Turing machine with a one-cell register
//! that takes part in every transition lookup.

/// Tape symbols and head displacements.
pub mod symbol;
pub use symbol::{Direction, Symbol, BLANK_REGISTER_GLYPH, DEFAULT_BLANK_GLYPH};

/// Definition and input error taxonomy.
pub mod error;
pub use error::{DefinitionError, InputError};

/// Immutable machine definition, builder and transition table.
pub mod definition;
pub use definition::{
    MachineBuilder, MachineDefinition, Rule, StateId, TransitionEffect, TransitionKey,
    TransitionTable,
};

/// Mutable execution state primitives.
pub mod state;
pub use state::{RunState, Tape};

/// Public host-facing API contract and run types.
pub mod api;
pub use api::{
    Configuration, EngineConfig, NullSink, Outcome, RunReport, TraceSink, DEFAULT_MAX_STEPS,
};

/// Step and run execution.
pub mod engine;
pub use engine::Engine;

#[cfg(test)]
use proptest as _;

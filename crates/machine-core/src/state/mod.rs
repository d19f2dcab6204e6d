//! Mutable execution state owned by one engine.

/// Engine lifecycle states.
pub mod run_state;
/// Lazily materialized two-way tape.
pub mod tape;

pub use run_state::RunState;
pub use tape::Tape;

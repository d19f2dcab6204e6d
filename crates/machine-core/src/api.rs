//! Host-facing value types: run configuration, outcomes, configuration
//! snapshots and the trace sink contract.

use std::fmt;

use crate::{StateId, Symbol, BLANK_REGISTER_GLYPH};

/// Step bound used when a host does not pick one.
pub const DEFAULT_MAX_STEPS: u64 = 10_000;

/// Top-level run configuration for an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct EngineConfig {
    /// Maximum number of `step` calls a single `run` may make.
    pub max_steps: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Terminal classification of a bounded run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Outcome {
    /// Halted in an accepting state.
    Accepted,
    /// Halted in a non-accepting state.
    Rejected,
    /// The step bound was reached first; the computation may not terminate.
    Indeterminate,
}

impl Outcome {
    /// Upper-case label used in run summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Indeterminate => "INDETERMINATE",
        }
    }

    /// Returns `true` when the machine stopped on its own.
    #[must_use]
    pub const fn halted(self) -> bool {
        !matches!(self, Self::Indeterminate)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregated result of [`crate::Engine::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RunReport {
    /// How the run ended.
    pub outcome: Outcome,
    /// Number of transitions applied during this run.
    pub steps: u64,
    /// Control state when the run ended.
    pub final_state: StateId,
    /// Head index when the run ended.
    pub final_head: usize,
    /// Materialized tape when the run ended.
    pub final_tape: Vec<Symbol>,
}

/// Immutable snapshot of an engine, sufficient to render one trace line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Configuration {
    /// Transitions applied since the last `load`.
    pub step: u64,
    /// Head index into the materialized tape.
    pub head: usize,
    /// Control state.
    pub state: StateId,
    /// Name of the control state.
    pub state_name: String,
    /// Register value.
    pub register: Symbol,
    /// Cells left of the head.
    pub left: Vec<Symbol>,
    /// Cells from the head to the right end; empty when the head is past it.
    pub right: Vec<Symbol>,
    /// Glyph used for blank tape cells.
    pub blank_glyph: char,
}

impl Configuration {
    /// Register value as shown in traces (`B` when blank).
    #[must_use]
    pub const fn register_glyph(&self) -> char {
        self.register.glyph(BLANK_REGISTER_GLYPH)
    }

    /// Full trace line, prefixed with the zero-padded step index.
    #[must_use]
    pub fn trace_line(&self) -> String {
        format!("Step {:03}: {self}", self.step)
    }

    fn render(&self, cells: &[Symbol]) -> String {
        cells.iter().map(|s| s.glyph(self.blank_glyph)).collect()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let register = self.register_glyph();
        write!(
            f,
            "Head: {:3} | State: {} | Cache: {} | Tape: {}[{}, {}]{}",
            self.head,
            self.state_name,
            register,
            self.render(&self.left),
            self.state_name,
            register,
            self.render(&self.right),
        )
    }
}

/// Observer for run progress.
///
/// The engine calls [`TraceSink::on_configuration`] once per loop iteration,
/// before that iteration's step, so the first recorded configuration is the
/// freshly loaded one. The start/end hooks let hosts measure elapsed time
/// without the engine reading a clock.
pub trait TraceSink {
    /// Records the configuration about to be stepped.
    fn on_configuration(&mut self, configuration: &Configuration);

    /// Called once before the first configuration of a run.
    fn on_run_start(&mut self) {}

    /// Called once with the final report of a run.
    fn on_run_end(&mut self, _report: &RunReport) {}
}

impl TraceSink for Vec<Configuration> {
    fn on_configuration(&mut self, configuration: &Configuration) {
        self.push(configuration.clone());
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn on_configuration(&mut self, _configuration: &Configuration) {}
}

//! Error types for description loading and simulation sessions.
//!
//! Errors print in the usual CLI style, `error: <message>`, with the file or
//! rule they refer to spelled out in the message itself.

use std::io;
use std::path::PathBuf;

use machine_core::{DefinitionError, InputError};
use thiserror::Error;

/// Failure while turning a machine description into a definition.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The description file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The JSON document is malformed or does not match the schema.
    #[error("invalid machine description: {0}")]
    Json(#[from] serde_json::Error),
    /// The YAML document is malformed or does not match the schema.
    #[error("invalid machine description: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A symbol field holds something other than one character.
    #[error("{context}: `{value}` is not a single-character symbol")]
    InvalidSymbol {
        /// Field the value came from.
        context: String,
        /// Offending value.
        value: String,
    },
    /// A rule uses a displacement token other than `L`, `R` or `S`.
    #[error("rule {rule}: unknown displacement `{token}` (expected L, R or S)")]
    InvalidDisplacement {
        /// 1-indexed rule position in `delta`.
        rule: usize,
        /// Offending token.
        token: String,
    },
    /// The description is well formed but violates a machine invariant.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Failure while rasterizing a DOT graph with Graphviz.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The Graphviz executable is not installed or not on `PATH`.
    #[error("Graphviz `{program}` is not installed or not on PATH")]
    ToolMissing {
        /// Executable that was looked up.
        program: String,
    },
    /// Graphviz ran but reported a failure.
    #[error("Graphviz failed: {stderr}")]
    Failed {
        /// Trimmed standard error of the Graphviz process.
        stderr: String,
    },
    /// Spawning or feeding the Graphviz process failed.
    #[error("failed to run Graphviz: {0}")]
    Io(#[from] io::Error),
}

/// Failure while simulating one input in a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The input string uses symbols outside the input alphabet.
    #[error(transparent)]
    Input(#[from] InputError),
    /// Writing the trace, export or console output failed.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use machine_core::{DefinitionError, InputError};

    use super::{LoadError, RenderError, SessionError};

    #[test]
    fn io_error_names_the_path() {
        let error = LoadError::Io {
            path: PathBuf::from("machines/missing.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            error.to_string(),
            "failed to read machines/missing.json: not found"
        );
    }

    #[test]
    fn definition_errors_pass_through_unchanged() {
        let error = LoadError::from(DefinitionError::UndeclaredState("q9".into()));
        assert_eq!(error.to_string(), "state `q9` is not declared");
    }

    #[test]
    fn session_input_errors_pass_through_unchanged() {
        let error = SessionError::from(InputError::InvalidSymbols(vec!['x']));
        assert_eq!(error.to_string(), "symbols not in the input alphabet: `x`");
    }

    #[test]
    fn render_errors_name_the_tool() {
        let error = RenderError::ToolMissing {
            program: "dot".into(),
        };
        assert_eq!(
            error.to_string(),
            "Graphviz `dot` is not installed or not on PATH"
        );
    }
}

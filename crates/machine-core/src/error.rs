use thiserror::Error;

use crate::Symbol;

/// Structural defects found while building a machine definition.
///
/// These are configuration errors: they are reported before any run starts
/// and never surface from [`crate::Engine::step`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The state set is empty.
    #[error("machine declares no states")]
    NoStates,
    /// A state name was declared more than once.
    #[error("state `{0}` is declared more than once")]
    DuplicateState(String),
    /// A state was referenced but never declared.
    #[error("state `{0}` is not declared")]
    UndeclaredState(String),
    /// A symbol used by the machine is outside the tape alphabet.
    #[error("symbol `{0}` is not in the tape alphabet")]
    SymbolNotInTapeAlphabet(char),
    /// An input symbol is missing from the tape alphabet.
    #[error("input symbol `{0}` is not in the tape alphabet")]
    InputNotInTapeAlphabet(char),
    /// The blank glyph collides with a declared alphabet mark.
    #[error("blank glyph `{0}` is also declared as an alphabet symbol")]
    BlankGlyphInAlphabet(char),
    /// Two rules share the same `(state, register, read)` key.
    #[error("transition for ({state}, {register:?}, {read:?}) is defined more than once")]
    DuplicateTransition {
        /// Source state name of the conflicting rules.
        state: String,
        /// Register value of the conflicting rules.
        register: Symbol,
        /// Scanned symbol of the conflicting rules.
        read: Symbol,
    },
}

/// Input string rejected at the boundary before it reaches an engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// One or more characters are not part of the input alphabet.
    #[error("symbols not in the input alphabet: {}", render_chars(.0))]
    InvalidSymbols(Vec<char>),
}

fn render_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{DefinitionError, InputError};
    use crate::Symbol;

    #[test]
    fn invalid_symbols_message_lists_every_offender() {
        let error = InputError::InvalidSymbols(vec!['x', '2']);
        assert_eq!(
            error.to_string(),
            "symbols not in the input alphabet: `x`, `2`"
        );
    }

    #[test]
    fn duplicate_transition_message_names_the_key() {
        let error = DefinitionError::DuplicateTransition {
            state: "q0".to_string(),
            register: Symbol::Blank,
            read: Symbol::Mark('1'),
        };
        assert_eq!(
            error.to_string(),
            "transition for (q0, Blank, Mark('1')) is defined more than once"
        );
    }
}

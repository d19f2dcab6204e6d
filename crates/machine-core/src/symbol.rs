/// Glyph used to render the blank symbol when a description does not name one.
pub const DEFAULT_BLANK_GLYPH: char = '_';

/// Glyph used for a blank register in configuration traces.
pub const BLANK_REGISTER_GLYPH: char = 'B';

/// A tape or register symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Symbol {
    /// The distinguished blank value.
    #[default]
    Blank,
    /// A single-character alphabet mark.
    Mark(char),
}

impl Symbol {
    /// Returns `true` for the blank symbol.
    #[must_use]
    pub const fn is_blank(self) -> bool {
        matches!(self, Self::Blank)
    }

    /// Returns the character used to render this symbol, substituting `blank`
    /// for the blank symbol.
    #[must_use]
    pub const fn glyph(self, blank: char) -> char {
        match self {
            Self::Blank => blank,
            Self::Mark(c) => c,
        }
    }
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        Self::Mark(c)
    }
}

/// Head displacement applied after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Direction {
    /// Move one cell towards the start of the tape.
    Left,
    /// Move one cell towards the end of the tape.
    Right,
    /// Keep the head on the written cell.
    Stay,
}

impl Direction {
    /// Parses the literal displacement token used in machine descriptions.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "L" => Some(Self::Left),
            "R" => Some(Self::Right),
            "S" => Some(Self::Stay),
            _ => None,
        }
    }

    /// Returns the literal displacement token for this direction.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
            Self::Stay => "S",
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Direction, Symbol, DEFAULT_BLANK_GLYPH};

    #[rstest]
    #[case("L", Some(Direction::Left))]
    #[case("R", Some(Direction::Right))]
    #[case("S", Some(Direction::Stay))]
    #[case("l", None)]
    #[case("", None)]
    #[case("LR", None)]
    fn direction_tokens_parse_exactly(#[case] token: &str, #[case] expected: Option<Direction>) {
        assert_eq!(Direction::from_token(token), expected);
        if let Some(direction) = expected {
            assert_eq!(direction.token(), token);
        }
    }

    #[test]
    fn blank_renders_with_supplied_glyph() {
        assert_eq!(Symbol::Blank.glyph(DEFAULT_BLANK_GLYPH), '_');
        assert_eq!(Symbol::Blank.glyph('#'), '#');
        assert_eq!(Symbol::Mark('1').glyph('#'), '1');
    }

    #[test]
    fn marks_never_equal_blank() {
        assert!(Symbol::Blank.is_blank());
        assert!(!Symbol::from('_').is_blank());
        assert_ne!(Symbol::from('_'), Symbol::Blank);
    }
}

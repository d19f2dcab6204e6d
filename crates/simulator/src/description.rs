//! Machine description documents.
//!
//! A description is a YAML or JSON mapping with the states, both alphabets,
//! the blank, the initial and final states, the `delta` rule list and an
//! optional list of preset inputs. Symbol fields accept a one-character
//! string, a single digit, or `null` for blank:
//!
//! ```yaml
//! states: [q0, qf]
//! input_alphabet: ["1"]
//! tape_alphabet: ["1", null]
//! blank: null
//! initial_state: q0
//! final_states: [qf]
//! delta:
//!   - params: { initial_state: q0, mem_cache_value: null, tape_input: "1" }
//!     output: { final_state: qf, mem_cache_value: null, tape_output: "1", tape_displacement: S }
//! simulation_strings: ["1"]
//! ```
//!
//! The same document in JSON:
//!
//! ```json
//! {
//!   "states": ["q0", "qf"],
//!   "input_alphabet": ["1"],
//!   "tape_alphabet": ["1", null],
//!   "blank": null,
//!   "initial_state": "q0",
//!   "final_states": ["qf"],
//!   "delta": [
//!     {
//!       "params": { "initial_state": "q0", "mem_cache_value": null, "tape_input": "1" },
//!       "output": {
//!         "final_state": "qf", "mem_cache_value": null,
//!         "tape_output": "1", "tape_displacement": "S"
//!       }
//!     }
//!   ],
//!   "simulation_strings": ["1"]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use machine_core::{
    Direction, MachineBuilder, MachineDefinition, Rule, Symbol, DEFAULT_BLANK_GLYPH,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::LoadError;

/// A symbol as written in a description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawSymbol {
    /// Quoted text, expected to hold exactly one character.
    Text(String),
    /// Bare number, expected to be a single digit.
    Number(u64),
}

impl RawSymbol {
    fn single_char(&self) -> Option<char> {
        match self {
            Self::Text(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            Self::Number(n) => u32::try_from(*n).ok().and_then(|n| char::from_digit(n, 10)),
        }
    }

    fn display_value(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Left-hand side of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleParams {
    /// Source state.
    pub initial_state: String,
    /// Register value to match; `null` is blank.
    pub mem_cache_value: Option<RawSymbol>,
    /// Scanned symbol to match; `null` is blank.
    pub tape_input: Option<RawSymbol>,
}

/// Right-hand side of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleOutput {
    /// Target state.
    pub final_state: String,
    /// Register value after firing; `null` is blank.
    pub mem_cache_value: Option<RawSymbol>,
    /// Symbol to write; `null` is blank.
    pub tape_output: Option<RawSymbol>,
    /// `L`, `R` or `S`.
    pub tape_displacement: String,
}

/// One entry of `delta`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleDescription {
    /// Matched key.
    pub params: RuleParams,
    /// Applied effect.
    pub output: RuleOutput,
}

/// Parsed but not yet validated machine description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MachineDescription {
    /// Declared states.
    pub states: Vec<String>,
    /// Symbols accepted as user input.
    pub input_alphabet: Vec<RawSymbol>,
    /// Symbols allowed on the tape; `null` entries and the blank glyph are ignored.
    pub tape_alphabet: Vec<Option<RawSymbol>>,
    /// Blank glyph, `null` for the default.
    #[serde(default)]
    pub blank: Option<RawSymbol>,
    /// Boot state.
    pub initial_state: String,
    /// Accepting states.
    #[serde(default)]
    pub final_states: Vec<String>,
    /// Transition rules.
    #[serde(default)]
    pub delta: Vec<RuleDescription>,
    /// Preset inputs simulated before interactive mode.
    #[serde(default, deserialize_with = "preset_strings")]
    pub simulation_strings: Vec<String>,
}

/// Accepts presets written as strings or as bare digit runs.
fn preset_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Vec::<RawSymbol>::deserialize(deserializer)?;
    Ok(raw.iter().map(RawSymbol::display_value).collect())
}

/// Serialization format of a description document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionFormat {
    /// `.json` files and anything without a YAML extension.
    Json,
    /// `.yaml` and `.yml` files.
    Yaml,
}

impl DescriptionFormat {
    /// Picks the format from the file extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

impl MachineDescription {
    /// Parses a JSON description.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Json`] for malformed documents.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses a YAML description.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Yaml`] for malformed documents.
    pub fn from_yaml(text: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a description in the given format.
    ///
    /// # Errors
    ///
    /// Returns the parse error of the selected format.
    pub fn parse(text: &str, format: DescriptionFormat) -> Result<Self, LoadError> {
        match format {
            DescriptionFormat::Json => Self::from_json(text),
            DescriptionFormat::Yaml => Self::from_yaml(text),
        }
    }

    /// Glyph standing for blank in this description.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidSymbol`] when `blank` is not one character.
    pub fn blank_glyph(&self) -> Result<char, LoadError> {
        self.blank.as_ref().map_or(Ok(DEFAULT_BLANK_GLYPH), |raw| {
            raw.single_char().ok_or_else(|| LoadError::InvalidSymbol {
                context: "blank".to_string(),
                value: raw.display_value(),
            })
        })
    }

    /// Validates the description into a machine definition.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] for malformed symbols or displacement tokens, and
    /// wraps any [`machine_core::DefinitionError`] raised by the builder.
    pub fn to_definition(&self) -> Result<MachineDefinition, LoadError> {
        let glyph = self.blank_glyph()?;
        let resolve = |raw: Option<&RawSymbol>, context: &dyn Fn() -> String| {
            resolve_symbol(raw, glyph, context)
        };

        let input_alphabet = self
            .input_alphabet
            .iter()
            .map(|raw| raw_char(raw, || "input_alphabet".to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tape_alphabet = Vec::with_capacity(self.tape_alphabet.len());
        for raw in &self.tape_alphabet {
            if let Symbol::Mark(c) = resolve(raw.as_ref(), &|| "tape_alphabet".to_string())? {
                tape_alphabet.push(c);
            }
        }

        let mut rules = Vec::with_capacity(self.delta.len());
        for (index, rule) in self.delta.iter().enumerate() {
            let number = index + 1;
            let field = |name: &'static str| move || format!("rule {number} {name}");
            let direction = Direction::from_token(&rule.output.tape_displacement).ok_or_else(
                || LoadError::InvalidDisplacement {
                    rule: number,
                    token: rule.output.tape_displacement.clone(),
                },
            )?;
            let params = &rule.params;
            let output = &rule.output;
            rules.push(Rule {
                state: params.initial_state.clone(),
                register: resolve(
                    params.mem_cache_value.as_ref(),
                    &field("params.mem_cache_value"),
                )?,
                read: resolve(params.tape_input.as_ref(), &field("params.tape_input"))?,
                next_state: output.final_state.clone(),
                next_register: resolve(
                    output.mem_cache_value.as_ref(),
                    &field("output.mem_cache_value"),
                )?,
                write: resolve(output.tape_output.as_ref(), &field("output.tape_output"))?,
                direction,
            });
        }

        Ok(MachineBuilder::new(self.initial_state.clone())
            .states(self.states.iter().cloned())
            .input_alphabet(input_alphabet)
            .tape_alphabet(tape_alphabet)
            .blank_glyph(glyph)
            .final_states(self.final_states.iter().cloned())
            .rules(rules)
            .build()?)
    }
}

fn raw_char(raw: &RawSymbol, context: impl FnOnce() -> String) -> Result<char, LoadError> {
    raw.single_char().ok_or_else(|| LoadError::InvalidSymbol {
        context: context(),
        value: raw.display_value(),
    })
}

fn resolve_symbol(
    raw: Option<&RawSymbol>,
    blank_glyph: char,
    context: &dyn Fn() -> String,
) -> Result<Symbol, LoadError> {
    let Some(raw) = raw else {
        return Ok(Symbol::Blank);
    };
    let c = raw_char(raw, context)?;
    Ok(if c == blank_glyph {
        Symbol::Blank
    } else {
        Symbol::Mark(c)
    })
}

/// A validated machine together with its preset inputs.
#[derive(Debug, Clone)]
pub struct LoadedMachine {
    /// Shared definition for engines.
    pub definition: Arc<MachineDefinition>,
    /// Inputs to simulate before interactive mode.
    pub simulation_strings: Vec<String>,
}

impl LoadedMachine {
    /// Parses and validates a JSON description held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] for syntax, schema or invariant violations.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Self::parse(text, DescriptionFormat::Json)
    }

    /// Parses and validates a YAML description held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] for syntax, schema or invariant violations.
    pub fn from_yaml(text: &str) -> Result<Self, LoadError> {
        Self::parse(text, DescriptionFormat::Yaml)
    }

    /// Parses and validates a description in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] for syntax, schema or invariant violations.
    pub fn parse(text: &str, format: DescriptionFormat) -> Result<Self, LoadError> {
        let description = MachineDescription::parse(text, format)?;
        let definition = description.to_definition()?;
        Ok(Self {
            definition: Arc::new(definition),
            simulation_strings: description.simulation_strings,
        })
    }
}

/// Reads, parses and validates a description file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when the file cannot be read, otherwise the
/// errors of [`LoadedMachine::parse`] for the format implied by the extension.
pub fn load_machine(path: &Path) -> Result<LoadedMachine, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    LoadedMachine::parse(&text, DescriptionFormat::from_path(path))
}

//! Batch and interactive simulation driver.
//!
//! A session owns one engine and three output streams: the trace report, the
//! CSV export and the console. Every simulated input appends a trace block
//! and one CSV row; the console gets the header and summary, plus the step
//! lines when echo is enabled.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use machine_core::{Engine, EngineConfig, MachineDefinition};

use crate::errors::SessionError;
use crate::report::{SimulationRecord, TraceWriter, CSV_HEADER, RULE_HEAVY, RULE_LIGHT};

/// Interactive entries that end the session (compared case-insensitively).
pub const QUIT_TOKENS: [&str; 3] = ["quit", "exit", "salir"];

/// Driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Engine bound applied to every run.
    pub engine: EngineConfig,
    /// Echo per-step trace lines to the console.
    pub echo_steps: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            echo_steps: true,
        }
    }
}

/// Simulation session writing to a trace report, a CSV export and a console.
pub struct Session<T: Write, C: Write, O: Write> {
    engine: Engine,
    options: SessionOptions,
    trace: T,
    csv: C,
    console: O,
    records: Vec<SimulationRecord>,
}

impl<T: Write, C: Write, O: Write> Session<T, C, O> {
    /// Creates a session and writes the CSV header.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while writing the header.
    pub fn new(
        definition: Arc<MachineDefinition>,
        options: SessionOptions,
        trace: T,
        mut csv: C,
        console: O,
    ) -> io::Result<Self> {
        writeln!(csv, "{CSV_HEADER}")?;
        Ok(Self {
            engine: Engine::new(definition),
            options,
            trace,
            csv,
            console,
            records: Vec::new(),
        })
    }

    /// Writes the report title naming the machine source.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the trace stream.
    pub fn write_banner(&mut self, source: &str) -> io::Result<()> {
        writeln!(self.trace, "Turing machine simulation: {source}")?;
        writeln!(self.trace, "{RULE_HEAVY}\n")
    }

    fn write_section(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.console, "\n{RULE_HEAVY}\n{title}\n{RULE_HEAVY}")?;
        writeln!(self.trace, "{title}\n{RULE_HEAVY}\n")
    }

    /// Validates, loads and runs one input.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Input`] without touching any output when the
    /// input uses foreign symbols, or [`SessionError::Io`] when an output
    /// stream fails.
    pub fn simulate(&mut self, input: &str) -> Result<SimulationRecord, SessionError> {
        let symbols = self.engine.definition().parse_input(input)?;
        let input_length = symbols.len();

        writeln!(self.console, "Simulating input: {input:?}")?;
        writeln!(self.trace, "Simulating input: {input}\n{RULE_LIGHT}")?;

        self.engine.load(symbols);
        let echo: Option<&mut dyn Write> = if self.options.echo_steps {
            Some(&mut self.console)
        } else {
            None
        };
        let mut writer = TraceWriter::new(&mut self.trace, echo);
        let report = self
            .engine
            .run_with_config(&self.options.engine, &mut writer);
        let elapsed = writer.finish()?;

        let record = SimulationRecord {
            input: input.to_string(),
            input_length,
            steps: report.steps,
            elapsed,
            outcome: report.outcome,
            final_tape: self.engine.definition().render_symbols(&report.final_tape),
        };

        writeln!(self.console, "\n{record}")?;
        writeln!(self.trace, "\n{record}\n{RULE_HEAVY}\n")?;
        writeln!(self.csv, "{}", record.csv_row())?;
        self.records.push(record.clone());
        Ok(record)
    }

    /// Simulates preset inputs in order; invalid presets are reported and skipped.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from any output stream.
    pub fn run_presets(&mut self, inputs: &[String]) -> io::Result<()> {
        if inputs.is_empty() {
            return Ok(());
        }
        self.write_section("PRESET INPUTS")?;
        for input in inputs {
            match self.simulate(input) {
                Ok(_) => {}
                Err(SessionError::Input(error)) => {
                    writeln!(self.console, "warning: skipping preset {input:?}: {error}")?;
                }
                Err(SessionError::Io(error)) => return Err(error),
            }
        }
        Ok(())
    }

    /// Reads inputs line by line until EOF, an empty line or a quit token.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from `input` or any output stream.
    pub fn interactive(&mut self, mut input: impl BufRead) -> io::Result<()> {
        let allowed: String = self
            .engine
            .definition()
            .input_alphabet()
            .iter()
            .collect();

        self.write_section("INTERACTIVE MODE")?;
        writeln!(self.console, "Input alphabet: {allowed}")?;
        writeln!(self.console, "Type a string and press Enter to simulate it.")?;
        writeln!(
            self.console,
            "Type 'quit' or press Enter on an empty line to finish."
        )?;

        let mut line = String::new();
        loop {
            write!(self.console, "\nInput string: ")?;
            self.console.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(self.console)?;
                break;
            }
            let entry = line.trim();
            if entry.is_empty() || QUIT_TOKENS.iter().any(|t| entry.eq_ignore_ascii_case(t)) {
                break;
            }

            match self.simulate(entry) {
                Ok(_) => {}
                Err(SessionError::Input(error)) => {
                    writeln!(self.console, "  {error} (allowed: {allowed})")?;
                }
                Err(SessionError::Io(error)) => return Err(error),
            }
        }

        writeln!(self.console, "Leaving interactive mode.")
    }

    /// Every record produced so far, in simulation order.
    #[must_use]
    pub fn records(&self) -> &[SimulationRecord] {
        &self.records
    }

    /// Flushes all streams and hands them back.
    ///
    /// # Errors
    ///
    /// Returns the first flush failure.
    pub fn finish(mut self) -> io::Result<(T, C, O)> {
        self.trace.flush()?;
        self.csv.flush()?;
        self.console.flush()?;
        Ok((self.trace, self.csv, self.console))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use machine_core::{
        Direction, EngineConfig, MachineBuilder, MachineDefinition, Outcome, Rule, Symbol,
    };

    use super::{Session, SessionOptions};
    use crate::report::CSV_HEADER;

    type Buffers = Session<Vec<u8>, Vec<u8>, Vec<u8>>;

    const B: Symbol = Symbol::Blank;

    /// Appends one `1` to a unary number.
    fn successor() -> Arc<MachineDefinition> {
        Arc::new(
            MachineBuilder::new("scan")
                .states(["scan", "done"])
                .input_alphabet(['1'])
                .tape_alphabet(['1'])
                .final_states(["done"])
                .rule(Rule::new("scan", B, '1', "scan", B, '1', Direction::Right))
                .rule(Rule::new("scan", B, B, "done", B, '1', Direction::Stay))
                .build()
                .expect("valid machine"),
        )
    }

    fn session(options: SessionOptions) -> Buffers {
        Session::new(successor(), options, Vec::new(), Vec::new(), Vec::new())
            .expect("in-memory writes succeed")
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).expect("utf-8 output")
    }

    #[test]
    fn simulate_writes_trace_block_and_csv_row() {
        let mut session = session(SessionOptions::default());

        let record = session.simulate("11").expect("valid input");

        assert_eq!(record.outcome, Outcome::Accepted);
        assert_eq!(record.steps, 3);
        assert_eq!(record.input_length, 2);
        assert_eq!(record.final_tape, "111");

        let (trace, csv, console) = session.finish().expect("flush succeeds");
        let trace = text(trace);
        assert!(trace.starts_with("Simulating input: 11\n"));
        assert!(
            trace.contains("Step 000: Head:   0 | State: scan | Cache: B | Tape: [scan, B]11\n")
        );
        assert!(
            trace.contains("Step 003: Head:   2 | State: done | Cache: B | Tape: 11[done, B]1\n")
        );
        assert!(trace.contains("Result: ACCEPTED\nTotal steps: 3\n"));
        assert!(trace.contains("Final tape: 111\n"));

        let csv = text(csv);
        let rows: Vec<_> = csv.lines().collect();
        assert_eq!(rows[0], CSV_HEADER);
        assert!(rows[1].starts_with("11,2,3,"));

        let console = text(console);
        assert!(console.contains("Simulating input: \"11\""));
        assert!(console.contains("Step 001:"));
    }

    #[test]
    fn quiet_session_keeps_steps_out_of_the_console() {
        let mut session = session(SessionOptions {
            echo_steps: false,
            ..SessionOptions::default()
        });

        session.simulate("1").expect("valid input");

        let (trace, _, console) = session.finish().expect("flush succeeds");
        assert!(text(trace).contains("Step 000:"));
        let console = text(console);
        assert!(!console.contains("Step 000:"));
        assert!(console.contains("Result: ACCEPTED"));
    }

    #[test]
    fn step_bound_yields_indeterminate_record() {
        let mut session = session(SessionOptions {
            engine: EngineConfig { max_steps: 2 },
            echo_steps: false,
        });

        let record = session.simulate("1111").expect("valid input");

        assert_eq!(record.outcome, Outcome::Indeterminate);
        assert_eq!(record.steps, 2);
        let (trace, _, _) = session.finish().expect("flush succeeds");
        assert!(text(trace).contains("Simulation stopped: step limit reached"));
    }

    #[test]
    fn invalid_input_produces_no_output() {
        let mut session = session(SessionOptions::default());

        assert!(session.simulate("12").is_err());

        assert!(session.records().is_empty());
        let (trace, csv, console) = session.finish().expect("flush succeeds");
        assert!(trace.is_empty());
        assert_eq!(text(csv), format!("{CSV_HEADER}\n"));
        assert!(console.is_empty());
    }

    #[test]
    fn presets_skip_invalid_entries() {
        let mut session = session(SessionOptions::default());

        session
            .run_presets(&["1".to_string(), "x".to_string(), String::new()])
            .expect("in-memory writes succeed");

        let inputs: Vec<_> = session.records().iter().map(|r| r.input.as_str()).collect();
        assert_eq!(inputs, vec!["1", ""]);
        let (_, _, console) = session.finish().expect("flush succeeds");
        assert!(text(console).contains("warning: skipping preset \"x\""));
    }

    #[test]
    fn interactive_stops_at_quit_token() {
        let mut session = session(SessionOptions::default());

        session
            .interactive(Cursor::new("1\n  11  \nabc\nQUIT\n111\n"))
            .expect("in-memory writes succeed");

        let inputs: Vec<_> = session.records().iter().map(|r| r.input.as_str()).collect();
        assert_eq!(inputs, vec!["1", "11"]);
        let (_, _, console) = session.finish().expect("flush succeeds");
        let console = text(console);
        assert!(console.contains("symbols not in the input alphabet: `a`, `b`, `c` (allowed: 1)"));
        assert!(console.ends_with("Leaving interactive mode.\n"));
    }

    #[test]
    fn interactive_stops_at_empty_line_or_eof() {
        let mut session = session(SessionOptions::default());
        session
            .interactive(Cursor::new("1\n\n11\n"))
            .expect("in-memory writes succeed");
        assert_eq!(session.records().len(), 1);

        let mut session = self::session(SessionOptions::default());
        session
            .interactive(Cursor::new("1\n11"))
            .expect("in-memory writes succeed");
        assert_eq!(session.records().len(), 2);
    }
}

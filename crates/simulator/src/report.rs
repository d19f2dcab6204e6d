//! Trace report and tabular export formats.

use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use machine_core::{Configuration, Outcome, RunReport, TraceSink};

/// Header row of the tabular export.
pub const CSV_HEADER: &str = "input,input_length,steps,elapsed_ns";

/// Separator under a simulation header.
pub const RULE_LIGHT: &str =
    "----------------------------------------------------------------------";

/// Separator closing a section or a simulation.
pub const RULE_HEAVY: &str =
    "======================================================================";

/// Result of simulating one input, as exported for downstream analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationRecord {
    /// Raw input string.
    pub input: String,
    /// Number of input symbols.
    pub input_length: usize,
    /// Transitions applied.
    pub steps: u64,
    /// Wall time spent in the run loop, trace output included.
    pub elapsed: Duration,
    /// Terminal classification.
    pub outcome: Outcome,
    /// Final tape rendered with the blank glyph.
    pub final_tape: String,
}

impl SimulationRecord {
    /// One CSV row without a trailing newline.
    #[must_use]
    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{}",
            csv_field(&self.input),
            self.input_length,
            self.steps,
            self.elapsed.as_nanos()
        )
    }
}

impl fmt::Display for SimulationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.outcome == Outcome::Indeterminate {
            writeln!(
                f,
                "Simulation stopped: step limit reached (possible infinite loop)"
            )?;
        }
        writeln!(f, "Result: {}", self.outcome)?;
        writeln!(f, "Total steps: {}", self.steps)?;
        writeln!(f, "Elapsed time: {} ns", self.elapsed.as_nanos())?;
        write!(f, "Final tape: {}", self.final_tape)
    }
}

/// Quotes a CSV field when it contains a separator, quote or line break.
#[must_use]
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Trace sink that writes one line per configuration and times the run.
///
/// Write failures are held back until [`TraceWriter::finish`], since sink
/// callbacks cannot fail.
pub struct TraceWriter<'a> {
    trace: &'a mut dyn Write,
    echo: Option<&'a mut dyn Write>,
    started: Option<Instant>,
    elapsed: Duration,
    error: Option<io::Error>,
}

impl<'a> TraceWriter<'a> {
    /// Writes trace lines to `trace`, and also to `echo` when present.
    #[must_use]
    pub fn new(trace: &'a mut dyn Write, echo: Option<&'a mut dyn Write>) -> Self {
        Self {
            trace,
            echo,
            started: None,
            elapsed: Duration::ZERO,
            error: None,
        }
    }

    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.trace, "{line}")?;
        if let Some(echo) = self.echo.as_mut() {
            writeln!(echo, "{line}")?;
        }
        Ok(())
    }

    /// Returns the measured run time, or the first write error.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error raised while writing trace lines.
    pub fn finish(self) -> io::Result<Duration> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.elapsed),
        }
    }
}

impl TraceSink for TraceWriter<'_> {
    fn on_configuration(&mut self, configuration: &Configuration) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.write_line(&configuration.trace_line()) {
            self.error = Some(error);
        }
    }

    fn on_run_start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn on_run_end(&mut self, _report: &RunReport) {
        if let Some(started) = self.started.take() {
            self.elapsed = started.elapsed();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::time::Duration;

    use machine_core::{Configuration, Outcome, RunReport, StateId, Symbol, TraceSink};
    use rstest::rstest;

    use super::{csv_field, SimulationRecord, TraceWriter};

    fn record(outcome: Outcome) -> SimulationRecord {
        SimulationRecord {
            input: "11".to_string(),
            input_length: 2,
            steps: 3,
            elapsed: Duration::from_nanos(1500),
            outcome,
            final_tape: "111".to_string(),
        }
    }

    fn configuration() -> Configuration {
        Configuration {
            step: 0,
            head: 0,
            state: StateId::new(0),
            state_name: "q0".to_string(),
            register: Symbol::Blank,
            left: Vec::new(),
            right: vec![Symbol::Mark('1')],
            blank_glyph: '_',
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[rstest]
    #[case("11", "11")]
    #[case("", "")]
    #[case("a,b", "\"a,b\"")]
    #[case("say \"hi\"", "\"say \"\"hi\"\"\"")]
    fn csv_fields_are_quoted_only_when_needed(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(csv_field(raw), expected);
    }

    #[test]
    fn csv_row_matches_header_columns() {
        assert_eq!(record(Outcome::Accepted).csv_row(), "11,2,3,1500");
    }

    #[test]
    fn summary_lists_outcome_steps_time_and_tape() {
        assert_eq!(
            record(Outcome::Accepted).to_string(),
            "Result: ACCEPTED\nTotal steps: 3\nElapsed time: 1500 ns\nFinal tape: 111"
        );
        assert!(record(Outcome::Indeterminate)
            .to_string()
            .starts_with("Simulation stopped: step limit reached"));
    }

    #[test]
    fn trace_writer_tees_lines_and_times_the_run() {
        let mut trace: Vec<u8> = Vec::new();
        let mut echo: Vec<u8> = Vec::new();
        let mut writer = TraceWriter::new(&mut trace, Some(&mut echo));

        writer.on_run_start();
        writer.on_configuration(&configuration());
        writer.on_run_end(&RunReport {
            outcome: Outcome::Rejected,
            steps: 0,
            final_state: StateId::new(0),
            final_head: 0,
            final_tape: vec![Symbol::Mark('1')],
        });
        writer.finish().expect("in-memory writes succeed");

        let expected = "Step 000: Head:   0 | State: q0 | Cache: B | Tape: [q0, B]1\n";
        assert_eq!(String::from_utf8(trace).expect("utf-8"), expected);
        assert_eq!(String::from_utf8(echo).expect("utf-8"), expected);
    }

    #[test]
    fn trace_writer_reports_first_write_error() {
        let mut failing = FailingWriter;
        let mut writer = TraceWriter::new(&mut failing, None);

        writer.on_configuration(&configuration());
        writer.on_configuration(&configuration());

        let error = writer.finish().expect_err("writes fail");
        assert_eq!(error.to_string(), "disk full");
    }
}

//! CLI entry point for the `cachetm` simulator binary.

use std::env;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use machine_core::{EngineConfig, DEFAULT_MAX_STEPS};
use serde as _;
use serde_json as _;
use serde_yaml as _;
use simulator::description::load_machine;
use simulator::diagram::{render_dot, render_png, structure_summary};
use simulator::errors::RenderError;
use simulator::session::{Session, SessionOptions};
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: cachetm <machine.yaml|machine.json> [options]

Simulates a Turing machine with a one-cell cache register. Preset inputs from
the description run first, then inputs are read interactively from stdin.
Files ending in .yaml or .yml are read as YAML, anything else as JSON.

Options:
  -n, --max-steps <N>   Step bound per run (default 10000)
  -o, --out-dir <dir>   Directory for trace and CSV reports (default results)
      --dot <file>      Also write the state graph in Graphviz DOT format
      --png <file>      Also render the state graph to PNG with Graphviz `dot`
  -q, --quiet           Do not echo per-step trace lines to stdout
  -h, --help            Show this help message

Examples:
  cachetm machines/register_parity.yaml
  cachetm machines/copy_first_symbol.json --max-steps 500 --dot graph.dot
";

const DEFAULT_OUT_DIR: &str = "results";

#[derive(Debug, PartialEq, Eq)]
struct SimulatorOptions {
    machine: PathBuf,
    max_steps: u64,
    out_dir: PathBuf,
    dot: Option<PathBuf>,
    png: Option<PathBuf>,
    quiet: bool,
}

#[derive(Debug)]
enum ParseResult {
    Run(SimulatorOptions),
    Help,
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut machine: Option<PathBuf> = None;
    let mut max_steps = DEFAULT_MAX_STEPS;
    let mut out_dir = PathBuf::from(DEFAULT_OUT_DIR);
    let mut dot: Option<PathBuf> = None;
    let mut png: Option<PathBuf> = None;
    let mut quiet = false;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(ParseResult::Help);
        }

        if arg == "--quiet" || arg == "-q" {
            quiet = true;
            continue;
        }

        if arg == "--max-steps" || arg == "-n" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --max-steps".to_string())?;
            let text = value.to_string_lossy();
            max_steps = text
                .parse()
                .map_err(|_| format!("invalid step bound: {text}"))?;
            continue;
        }

        if arg == "--out-dir" || arg == "-o" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --out-dir".to_string())?;
            out_dir = PathBuf::from(value);
            continue;
        }

        if arg == "--dot" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --dot".to_string())?;
            dot = Some(PathBuf::from(value));
            continue;
        }

        if arg == "--png" {
            let value = args
                .next()
                .ok_or_else(|| "missing value for --png".to_string())?;
            png = Some(PathBuf::from(value));
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if machine.is_some() {
            return Err("multiple machine files provided".to_string());
        }
        machine = Some(PathBuf::from(arg));
    }

    let machine = machine.ok_or_else(|| "missing machine file".to_string())?;
    Ok(ParseResult::Run(SimulatorOptions {
        machine,
        max_steps,
        out_dir,
        dot,
        png,
        quiet,
    }))
}

fn report_paths(machine: &Path, out_dir: &Path) -> (PathBuf, PathBuf) {
    let stem = machine
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("machine");
    (
        out_dir.join(format!("{stem}_trace.txt")),
        out_dir.join(format!("{stem}_runs.csv")),
    )
}

fn create_report(path: &Path) -> Result<BufWriter<File>, i32> {
    File::create(path).map(BufWriter::new).map_err(|e| {
        eprintln!("error: failed to create {}: {e}", path.display());
        1
    })
}

/// Rendering problems are warnings: the simulation still runs.
fn write_png(dot: &str, png_path: &Path, dot_path: Option<&Path>) {
    match render_png(dot, png_path) {
        Ok(()) => println!("State graph rendered to {}", png_path.display()),
        Err(e @ RenderError::ToolMissing { .. }) => {
            eprintln!("warning: {e}");
            match dot_path {
                Some(path) => eprintln!(
                    "warning: render it by hand with `dot -Tpng {} -o {}`",
                    path.display(),
                    png_path.display()
                ),
                None => eprintln!("warning: use --dot <file> to keep the graph source"),
            }
        }
        Err(e) => eprintln!("warning: {e}"),
    }
}

fn run(options: &SimulatorOptions) -> Result<(), i32> {
    let loaded = load_machine(&options.machine).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    println!("Loaded machine from {}", options.machine.display());
    println!("{}", structure_summary(&loaded.definition));

    let dot = render_dot(&loaded.definition);
    if let Some(dot_path) = &options.dot {
        if let Err(e) = fs::write(dot_path, &dot) {
            eprintln!("error: failed to write {}: {e}", dot_path.display());
            return Err(1);
        }
        println!("State graph written to {}", dot_path.display());
    }
    if let Some(png_path) = &options.png {
        write_png(&dot, png_path, options.dot.as_deref());
    }

    if let Err(e) = fs::create_dir_all(&options.out_dir) {
        eprintln!("error: failed to create {}: {e}", options.out_dir.display());
        return Err(1);
    }
    let (trace_path, csv_path) = report_paths(&options.machine, &options.out_dir);
    let trace = create_report(&trace_path)?;
    let csv = create_report(&csv_path)?;

    let session_options = SessionOptions {
        engine: EngineConfig {
            max_steps: options.max_steps,
        },
        echo_steps: !options.quiet,
    };
    let report_error = |e: io::Error| {
        eprintln!("error: failed to write report: {e}");
        1
    };

    let mut session = Session::new(
        loaded.definition,
        session_options,
        trace,
        csv,
        io::stdout().lock(),
    )
    .map_err(report_error)?;
    session
        .write_banner(&options.machine.display().to_string())
        .map_err(report_error)?;
    session
        .run_presets(&loaded.simulation_strings)
        .map_err(report_error)?;
    session
        .interactive(io::stdin().lock())
        .map_err(report_error)?;
    let simulated = session.records().len();
    session.finish().map_err(report_error)?;

    println!("Simulated {simulated} input(s)");
    println!("Trace written to {}", trace_path.display());
    println!("Run data written to {}", csv_path.display());
    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(options)) => match run(&options) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}

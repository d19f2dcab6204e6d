//! Graphviz export of a machine's state graph and a plain-text structure
//! summary.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use machine_core::{MachineDefinition, StateId, Symbol};

use crate::errors::RenderError;

/// Graphviz executable used by [`render_png`].
pub const GRAPHVIZ_DOT: &str = "dot";

fn symbol_label(symbol: Symbol) -> String {
    match symbol {
        Symbol::Blank => "blank".to_string(),
        Symbol::Mark(c) => c.to_string(),
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn node_name(definition: &MachineDefinition, id: StateId) -> String {
    definition.state_name(id).unwrap_or_default().to_string()
}

/// Renders the state graph as a DOT `digraph`.
///
/// Rules sharing a source and target state are merged into one edge whose
/// label lists each `(register, read) -> (register', write, direction)`.
/// Output is deterministic for a given definition.
#[must_use]
pub fn render_dot(definition: &MachineDefinition) -> String {
    let mut edges: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for (key, effect) in definition.transitions().sorted() {
        let label = format!(
            "({}, {}) -> ({}, {}, {})",
            symbol_label(key.register),
            symbol_label(key.read),
            symbol_label(effect.next_register),
            symbol_label(effect.write),
            effect.direction.token(),
        );
        edges
            .entry((
                node_name(definition, key.state),
                node_name(definition, effect.next_state),
            ))
            .or_default()
            .push(label);
    }

    let initial = definition.initial_state();
    let mut lines = vec![
        "digraph machine {".to_string(),
        "    rankdir=LR;".to_string(),
        "    node [shape=circle, style=filled, fillcolor=lightyellow, fontsize=10];".to_string(),
        "    edge [fontsize=8];".to_string(),
        String::new(),
    ];

    for id in definition.state_ids() {
        let name = escape(&node_name(definition, id));
        let attributes = if definition.is_final(id) {
            "shape=doublecircle, fillcolor=lightgreen"
        } else if id == initial {
            "fillcolor=lightblue"
        } else {
            ""
        };
        if attributes.is_empty() {
            lines.push(format!("    \"{name}\";"));
        } else {
            lines.push(format!("    \"{name}\" [{attributes}];"));
        }
    }

    lines.push(String::new());
    lines.push("    __start__ [shape=point];".to_string());
    lines.push(format!(
        "    __start__ -> \"{}\";",
        escape(&node_name(definition, initial))
    ));
    lines.push(String::new());

    for ((source, target), labels) in &edges {
        let label = labels
            .iter()
            .map(|l| escape(l))
            .collect::<Vec<_>>()
            .join("\\n");
        lines.push(format!(
            "    \"{}\" -> \"{}\" [label=\"{label}\"];",
            escape(source),
            escape(target)
        ));
    }

    lines.push("}".to_string());
    lines.join("\n") + "\n"
}

/// Rasterizes `dot` source to a PNG file with the Graphviz `dot` tool.
///
/// # Errors
///
/// Returns [`RenderError::ToolMissing`] when Graphviz is not installed,
/// [`RenderError::Failed`] when it rejects the graph, and
/// [`RenderError::Io`] for any other process failure.
pub fn render_png(dot: &str, output: &Path) -> Result<(), RenderError> {
    render_with(GRAPHVIZ_DOT, dot, output)
}

/// Like [`render_png`], with an explicit Graphviz executable.
///
/// # Errors
///
/// Same as [`render_png`].
pub fn render_with(program: &str, dot: &str, output: &Path) -> Result<(), RenderError> {
    let mut child = Command::new(program)
        .arg("-Tpng")
        .arg("-o")
        .arg(output)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RenderError::ToolMissing {
                program: program.to_string(),
            },
            _ => RenderError::Io(e),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(dot.as_bytes())?;
    }
    let result = child.wait_with_output()?;
    if result.status.success() {
        Ok(())
    } else {
        Err(RenderError::Failed {
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        })
    }
}

/// Multi-line overview: initial and final states, alphabets and every rule
/// in key order.
#[must_use]
pub fn structure_summary(definition: &MachineDefinition) -> String {
    let name = |id| node_name(definition, id);
    let finals: Vec<_> = definition.final_states().iter().map(|&id| name(id)).collect();
    let mut out = String::new();

    let _ = writeln!(out, "Machine structure");
    let _ = writeln!(out, "  initial state:  {}", name(definition.initial_state()));
    let _ = writeln!(out, "  final states:   {}", finals.join(", "));
    let _ = writeln!(out, "  states:         {}", definition.states().len());
    let _ = writeln!(
        out,
        "  input alphabet: {}",
        definition.input_alphabet().iter().collect::<String>()
    );
    let _ = writeln!(
        out,
        "  tape alphabet:  {}",
        definition.tape_alphabet().iter().collect::<String>()
    );
    let _ = writeln!(out, "  transitions:    {}", definition.transitions().len());
    for (key, effect) in definition.transitions().sorted() {
        let _ = writeln!(
            out,
            "    ({}, {}, {}) -> ({}, {}, {}, {})",
            name(key.state),
            symbol_label(key.register),
            symbol_label(key.read),
            name(effect.next_state),
            symbol_label(effect.next_register),
            symbol_label(effect.write),
            effect.direction.token(),
        );
    }
    out
}

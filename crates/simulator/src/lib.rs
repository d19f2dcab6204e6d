//! Cache-register Turing machine simulator library.

/// JSON machine descriptions and their conversion to definitions.
pub mod description;
/// Graphviz export of the state graph.
pub mod diagram;
/// Structured load and session error types.
pub mod errors;
/// Trace lines, run summaries and CSV rows.
pub mod report;
/// Preset and interactive simulation driver.
pub mod session;

//! themecheck core library.
//!
//! This crate checks Ghost themes for compatibility and renders the findings
//! as a severity-grouped report with a deterministic exit code.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Check configuration, config-file discovery and precedence.
//! - `models`: Findings, severity buckets and the rule catalog schema.
//! - `checker`: Checker seam, built-in scanner and the invoker.
//! - `checks`: Evaluation of individual catalog checks.
//! - `format`: Post-processing bridge and the built-in formatter.
//! - `output`: Palette, summary and finding renderers, JSON output.
//! - `report`: Orchestrates a full report and picks the exit code.
//! - `utils`: Supporting helpers.
pub mod checker;
pub mod checks;
pub mod cli;
pub mod config;
pub mod format;
pub mod models;
pub mod output;
pub mod report;
pub mod utils;

//! CLI command handlers

pub mod commands;

pub use commands::{build_selection, columns, export, export_path, report};

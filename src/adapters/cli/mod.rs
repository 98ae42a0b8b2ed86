//! CLI Adapter
//!
//! Command-line interface for the trendswap service.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{CliApp, Command, HistoryCmd, OutputFormat, QuoteCmd, ServeCmd, StatusCmd};

//! CLI module
//!
//! The `apimate` binary: one request per invocation, raw body on stdout.
//! A profile supplies the base URL and client defaults; flags add per-call
//! options on top.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::Runner;

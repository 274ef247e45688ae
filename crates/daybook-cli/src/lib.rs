//! Command-line interface for daybook records
//!
//! This crate provides the `daybook` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

pub use cli::Cli;
pub use config::DaybookConfig;
pub use error::{CliError, CliResult};

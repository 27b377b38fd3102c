//! Command line interface
//!
//! - Argument parsing with clap
//! - Merging command line overrides over file/environment configuration
//! - Dispatching the `serve` and `migrate` commands

pub mod config_merger;
pub mod executor;
pub mod parser;
pub mod validation;

pub use config_merger::load_and_merge_config;
pub use executor::execute_command;
pub use parser::{Cli, Commands};

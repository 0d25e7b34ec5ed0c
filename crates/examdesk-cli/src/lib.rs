//! examdesk command-line tools
//!
//! Library half of the `examdesk` binary: argument definitions, the config
//! file, logging setup and the subcommands.

#![warn(unreachable_pub)]
#![warn(missing_docs)]

mod cli;
mod commands;
mod config;
mod logging;

// Re-exports
pub use cli::{Cli, Command};
pub use commands::{load_registry, read_document, render, run, scaffold, types, upload, validate};
pub use config::{CliConfig, LogConfig};
pub use logging::{env_filter, init as init_logging, DEFAULT_FILTER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

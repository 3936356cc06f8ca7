//! Application layer modules
//!
//! CLI interface, configuration layering, interactive prompts and command dispatch.

pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod loader;
pub mod session;
#[cfg(any(test, feature = "test-utils"))]
pub mod session_mocks;

pub use cli::{Cli, CliConfig, Commands};
pub use commands::execute_command;
pub use config::AppConfig;

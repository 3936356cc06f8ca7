use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::config::AppConfig;

/// modlock CLI - reproducible Minecraft mod sets
#[derive(Debug, Clone, Parser)]
#[command(name = "modlock")]
#[command(about = "Build a Minecraft mods folder from a manifest and lock what resolved")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global configuration options
    #[command(flatten)]
    pub config: AppConfig,

    /// modlock commands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Configuration loaded from CLI
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub app_config: AppConfig,
    pub command: Option<Commands>,
}

/// Available modlock commands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Build the mods folder from a manifest (or its lock file, when present)
    Build {
        /// Manifest file, e.g. survival.mods
        #[arg(help = "Path to the modpack manifest")]
        manifest: PathBuf,
    },

    /// Look up one mod and print what a build would fetch
    Info {
        /// CurseForge project id or Modrinth slug
        #[arg(help = "Mod identifier (numeric: CurseForge, otherwise Modrinth)")]
        mod_id: String,

        /// Exact file or version id to look up
        #[arg(long, help = "Pin to this file id (CurseForge) or version id (Modrinth)")]
        pin: Option<String>,
    },

    /// Search both registries for mods matching a keyword
    Search {
        #[arg(help = "Search keyword")]
        keyword: String,
    },

    /// Print the lock file path that belongs to a manifest
    LockPath {
        #[arg(help = "Path to the modpack manifest")]
        manifest: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    include!("cli.test.rs");
}

//! Application configuration management
//!
//! Handles config loading, validation, and environment variable processing
//! following the precedence: defaults -> config file -> .env -> env vars -> CLI args.

use crate::modpack::{Environment, InstallTarget, ModLoader};
use crate::networking::{NetworkingConfig, RetryPolicy};
use crate::primitives::*;
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration values
pub mod defaults {
    pub const LOG_LEVEL: &str = "warn";
    pub const LOG_FORMAT: &str = "text";
    pub const LOG_OUTPUT: &str = "stderr";
    pub const COLOR: &str = "auto";
    pub const NET_TIMEOUT: u64 = 30;
    pub const RETRIES: u32 = 3;
    pub const CONFIG_FILE: &str = "modlock.toml";
}

mod default_fns {
    use super::*;

    pub fn log_level() -> LogLevel {
        LogLevel::Warning
    }

    pub fn log_format() -> LogFormat {
        LogFormat::Text
    }

    pub fn log_output() -> LogOutput {
        LogOutput::Stderr
    }

    pub fn color() -> ColorIntent {
        ColorIntent::Auto
    }

    pub fn net_timeout() -> u64 {
        defaults::NET_TIMEOUT
    }

    pub fn retries() -> u32 {
        defaults::RETRIES
    }
}

/// Application configuration structure
#[derive(Debug, Clone, Parser, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Mods directory the build writes into (its parent is the game directory)
    #[arg(short, long, global = true, env = "MODLOCK_MODS_DIR")]
    #[serde(default)]
    pub mods_dir: Option<PathBuf>,

    /// Minecraft version to build for, e.g. 1.20.1
    #[arg(short, long, global = true, env = "MODLOCK_GAME_VERSION")]
    #[serde(default)]
    pub game_version: Option<String>,

    /// Mod loader to build for
    #[arg(short, long, global = true, value_enum, env = "MODLOCK_LOADER")]
    #[serde(default)]
    pub loader: Option<ModLoader>,

    /// CurseForge API key, required for numeric mod ids
    #[arg(long, global = true, env = "MODLOCK_CURSEFORGE_API_KEY", hide_env_values = true)]
    #[serde(default)]
    pub curseforge_api_key: Option<String>,

    /// Maximum number of parallel network jobs (defaults to the CPU count)
    #[arg(short = 'j', long, global = true, env = "MODLOCK_CPU_JOBS")]
    #[serde(default)]
    pub cpu_jobs: Option<u32>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, env = "MODLOCK_NET_TIMEOUT", default_value_t = defaults::NET_TIMEOUT)]
    #[serde(default = "default_fns::net_timeout")]
    pub net_timeout: u64,

    /// Attempts per network operation
    #[arg(long, global = true, env = "MODLOCK_RETRIES", default_value_t = defaults::RETRIES)]
    #[serde(default = "default_fns::retries")]
    pub retries: u32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_enum, env = "MODLOCK_LOG_LEVEL", default_value = defaults::LOG_LEVEL)]
    #[serde(default = "default_fns::log_level")]
    pub log_level: LogLevel,

    /// Raise the log level; repeat for more detail
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    #[serde(skip)]
    pub verbose: u8,

    /// Log format (text, json, pretty)
    #[arg(long, global = true, value_enum, env = "MODLOCK_LOG_FORMAT", default_value = defaults::LOG_FORMAT)]
    #[serde(default = "default_fns::log_format")]
    pub log_format: LogFormat,

    /// Log output stream (stderr, stdout)
    #[arg(long, global = true, value_enum, env = "MODLOCK_LOG_OUTPUT", default_value = defaults::LOG_OUTPUT)]
    #[serde(default = "default_fns::log_output")]
    pub log_output: LogOutput,

    /// Color output control (auto, always, never)
    #[arg(long, global = true, value_enum, env = "MODLOCK_COLOR", default_value = defaults::COLOR)]
    #[serde(default = "default_fns::color")]
    pub color: ColorIntent,

    /// Answer yes to the confirmation prompt
    #[arg(short, long, global = true, env = "MODLOCK_YES")]
    #[serde(default)]
    pub yes: bool,

    /// Configuration file (defaults to modlock.toml in the user config directory)
    #[arg(long, global = true, env = "MODLOCK_CONFIG")]
    #[serde(skip)]
    pub config: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mods_dir: None,
            game_version: None,
            loader: None,
            curseforge_api_key: None,
            cpu_jobs: None,
            net_timeout: default_fns::net_timeout(),
            retries: default_fns::retries(),
            log_level: default_fns::log_level(),
            verbose: 0,
            log_format: default_fns::log_format(),
            log_output: default_fns::log_output(),
            color: default_fns::color(),
            yes: false,
            config: None,
        }
    }
}

impl AppConfig {
    /// `modlock.toml` in the platform config directory
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "modlock")
            .map(|dirs| dirs.config_dir().join(defaults::CONFIG_FILE))
    }

    /// Parse a TOML config file; keys are the long flag names in snake_case
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::FileParseError {
            path: path.display().to_string(),
            source: Box::new(e),
        })
    }

    /// Merge this config with another, taking non-default values from other
    pub fn merge_with(mut self, other: Self) -> Self {
        if other.mods_dir.is_some() {
            self.mods_dir = other.mods_dir;
        }
        if other.game_version.is_some() {
            self.game_version = other.game_version;
        }
        if other.loader.is_some() {
            self.loader = other.loader;
        }
        if other.curseforge_api_key.is_some() {
            self.curseforge_api_key = other.curseforge_api_key;
        }
        if other.cpu_jobs.is_some() {
            self.cpu_jobs = other.cpu_jobs;
        }
        if other.config.is_some() {
            self.config = other.config;
        }

        if other.net_timeout != default_fns::net_timeout() {
            self.net_timeout = other.net_timeout;
        }
        if other.retries != default_fns::retries() {
            self.retries = other.retries;
        }
        if other.verbose > 0 {
            self.verbose = other.verbose;
        }
        self.yes |= other.yes;

        if other.log_level != default_fns::log_level() {
            self.log_level = other.log_level;
        }
        if !matches!(other.log_format, LogFormat::Text) {
            self.log_format = other.log_format;
        }
        if !matches!(other.log_output, LogOutput::Stderr) {
            self.log_output = other.log_output;
        }
        if !matches!(other.color, ColorIntent::Auto) {
            self.color = other.color;
        }

        self
    }

    /// Game version and loader are present
    pub fn environment(&self) -> Result<Environment, ConfigError> {
        let game_version = self
            .game_version
            .as_deref()
            .map(str::trim)
            .filter(|version| !version.is_empty())
            .ok_or_else(|| ConfigError::ValidationFailed {
                reason: "no game version configured (--game-version or MODLOCK_GAME_VERSION)"
                    .to_string(),
            })?;
        let loader = self.loader.ok_or_else(|| ConfigError::ValidationFailed {
            reason: "no mod loader configured (--loader or MODLOCK_LOADER)".to_string(),
        })?;
        Ok(Environment::new(game_version, loader))
    }

    /// Everything a build needs: environment plus an existing mods directory
    pub fn validate(&self) -> Result<InstallTarget, ConfigError> {
        let environment = self.environment()?;
        let mods_dir = self
            .mods_dir
            .as_ref()
            .ok_or_else(|| ConfigError::ValidationFailed {
                reason: "no mods directory configured (--mods-dir or MODLOCK_MODS_DIR)"
                    .to_string(),
            })?;
        if !mods_dir.is_dir() {
            return Err(ConfigError::ValidationFailed {
                reason: format!("mods directory {} does not exist", mods_dir.display()),
            });
        }
        Ok(InstallTarget::new(environment, mods_dir))
    }

    pub fn effective_log_level(&self) -> LogLevel {
        self.log_level.max(LogLevel::from_verbosity(self.verbose))
    }

    pub fn to_logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            level: self.effective_log_level(),
            format: self.log_format,
            output: self.log_output,
            color: self.color.resolve(),
        }
    }

    pub fn networking_config(&self) -> NetworkingConfig {
        NetworkingConfig {
            max_jobs: self.cpu_jobs,
            timeout_seconds: self.net_timeout,
            trace_requests: self.effective_log_level() >= LogLevel::Trace,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, crate::networking::retry::DEFAULT_UNIT)
    }

    /// Where settings came from, for diagnostics
    pub fn describe_source(&self) -> String {
        match &self.config {
            Some(path) if path.is_file() => path.display().to_string(),
            _ => "command line and environment".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    include!("config.test.rs");
}

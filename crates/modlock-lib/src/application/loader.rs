//! Configuration loading
//!
//! Layers configuration sources: defaults -> config file -> .env -> env vars -> CLI args.
//! clap reads `MODLOCK_*` variables while parsing, so .env files are loaded first.

use crate::primitives::ConfigError;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use super::{
    cli::{Cli, CliConfig},
    config::AppConfig,
    env::EnvironmentConfig,
};

const ENV_FILES: [&str; 2] = [".env.local", ".env"];

impl CliConfig {
    /// Load configuration from the process arguments and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(std::env::args_os())
    }

    /// Load configuration from explicit arguments (first item is the binary name)
    pub fn load_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        load_env_files()?;

        let cli = Cli::parse_from(args);
        let env_config = EnvironmentConfig::load()?;

        Self::layer(cli, &env_config)
    }

    /// Combine parsed arguments with the config file and the color variables
    pub(crate) fn layer(cli: Cli, env_config: &EnvironmentConfig) -> Result<Self, ConfigError> {
        let mut base = match config_file_path(&cli.config) {
            Some((path, explicit)) => {
                if explicit || path.is_file() {
                    let mut file_config = AppConfig::from_file(&path)?;
                    file_config.config = Some(path);
                    file_config
                } else {
                    AppConfig::default()
                }
            }
            None => AppConfig::default(),
        };

        base.color = env_config.apply_color_config(base.color);

        // An explicit --color still beats the environment
        let app_config = base.merge_with(cli.config);

        tracing::debug!(source = %app_config.describe_source(), "configuration loaded");

        Ok(Self {
            app_config,
            command: cli.command,
        })
    }
}

/// The config file to read, and whether the user named it
fn config_file_path(cli: &AppConfig) -> Option<(PathBuf, bool)> {
    match &cli.config {
        Some(path) => Some((path.clone(), true)),
        None => AppConfig::default_config_path().map(|path| (path, false)),
    }
}

fn load_env_files() -> Result<(), ConfigError> {
    for env_file in ENV_FILES {
        match dotenvy::from_filename(env_file) {
            Ok(_) => {}
            Err(error) if error.not_found() => {}
            Err(source) => {
                return Err(ConfigError::EnvFileError {
                    file: env_file.to_string(),
                    source,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("loader.test.rs");
}

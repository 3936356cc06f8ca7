//! Environment variable handling for application configuration
//!
//! Standard color and CI variables, read with `envy`.

use crate::primitives::{ColorIntent, ConfigError};
use serde::Deserialize;

/// Environment variables that affect application behavior
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentConfig {
    /// NO_COLOR (any non-empty value disables color)
    pub no_color: Option<String>,
    /// FORCE_COLOR (0/false disables, 1/2/3/true enables)
    pub force_color: Option<String>,
    /// CLICOLOR (0 disables color)
    pub clicolor: Option<String>,
    /// CI (any value means CI mode)
    pub ci: Option<String>,
}

impl EnvironmentConfig {
    /// Load environment configuration from current environment
    pub fn load() -> Result<Self, ConfigError> {
        Ok(envy::from_env()?)
    }

    /// Adjust the configured color intent.
    ///
    /// Precedence: CI < CLICOLOR < NO_COLOR < FORCE_COLOR
    pub fn apply_color_config(&self, mut color: ColorIntent) -> ColorIntent {
        if self.ci.is_some() {
            color = ColorIntent::Never;
        }

        if self.clicolor.as_deref() == Some("0") {
            color = ColorIntent::Never;
        }

        if self.no_color.as_deref().is_some_and(|v| !v.is_empty()) {
            color = ColorIntent::Never;
        }

        if let Some(force_color) = &self.force_color {
            match force_color.as_str() {
                "0" | "false" => color = ColorIntent::Never,
                "1" | "2" | "3" | "true" => color = ColorIntent::Always,
                _ => {}
            }
        }

        color
    }

    pub fn is_ci(&self) -> bool {
        self.ci.is_some()
    }
}

#[cfg(test)]
mod tests {
    include!("env.test.rs");
}

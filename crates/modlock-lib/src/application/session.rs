//! Interactive providers
//!
//! The build asks for confirmation before it wipes the mods folder. Commands
//! receive the provider as a trait object so tests can answer for the user.

use crate::Result;
use anyhow::Context;

/// Provider trait for interactive user input operations
pub trait InteractiveProvider: Send + Sync {
    /// Yes/no question. An interrupted prompt (Ctrl+C) is an error.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// dialoguer-backed prompts. `--yes` accepts everything; other
/// non-interactive runs take the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveInteractiveProvider {
    yes_mode: bool,
}

impl LiveInteractiveProvider {
    pub fn new(yes_mode: bool) -> Self {
        Self { yes_mode }
    }

    /// Check if we're in a TTY environment suitable for interactive prompts
    fn is_tty() -> bool {
        use std::io::IsTerminal;
        std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
    }
}

impl InteractiveProvider for LiveInteractiveProvider {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.yes_mode {
            return Ok(true);
        }
        if !Self::is_tty() {
            return Ok(default);
        }

        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .context("Failed to read confirmation")
    }
}

#[cfg(test)]
mod tests {
    include!("session.test.rs");
}

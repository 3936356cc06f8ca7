//! Scripted interactive provider for tests

use std::sync::Mutex;

use crate::Result;
use crate::application::session::InteractiveProvider;

/// Answers prompts from a script and records every question asked
#[derive(Debug, Default)]
pub struct MockInteractiveProvider {
    confirm_response: Option<bool>,
    interrupt: bool,
    confirm_calls: Mutex<Vec<(String, bool)>>,
}

impl MockInteractiveProvider {
    /// Takes the default answer for every prompt
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confirm(mut self, response: bool) -> Self {
        self.confirm_response = Some(response);
        self
    }

    /// Behave like a prompt cancelled with Ctrl+C
    pub fn interrupted() -> Self {
        Self {
            interrupt: true,
            ..Self::default()
        }
    }

    pub fn get_confirm_calls(&self) -> Vec<(String, bool)> {
        self.confirm_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl InteractiveProvider for MockInteractiveProvider {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if let Ok(mut calls) = self.confirm_calls.lock() {
            calls.push((prompt.to_string(), default));
        }

        if self.interrupt {
            anyhow::bail!("prompt interrupted");
        }
        Ok(self.confirm_response.unwrap_or(default))
    }
}

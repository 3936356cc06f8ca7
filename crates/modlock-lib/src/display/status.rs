//! Status display for user feedback
//!
//! Build phases report to the user through these lines; diagnostics go
//! through `tracing` instead.

use super::styling::StyleManager;

/// Status display manager for semantic user feedback
pub struct StatusDisplay<'a> {
    styling: &'a StyleManager,
}

impl<'a> StatusDisplay<'a> {
    pub(crate) fn new(styling: &'a StyleManager) -> Self {
        Self { styling }
    }

    /// `✓ item: details`, or `✓ item` when details are empty
    pub fn success(&self, item: &str, details: &str) {
        println!("{}", self.styling.format_success(&join(item, details)));
    }

    /// `✗ item: details`
    pub fn error(&self, item: &str, details: &str) {
        println!("{}", self.styling.format_error(&join(item, details)));
    }

    pub fn warning(&self, message: &str) {
        println!("{}", self.styling.format_warning(message));
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.styling.format_info(message));
    }

    pub fn message(&self, text: &str) {
        println!("{text}");
    }

    pub fn emphasis(&self, text: &str) {
        println!("{}", self.styling.style_emphasis(text));
    }

    pub fn subtle(&self, text: &str) {
        println!("{}", self.styling.style_subtle(text));
    }

    /// Bulleted list, indented two spaces
    pub fn list<S: AsRef<str>>(&self, items: &[S]) {
        for item in items {
            println!("  {} {}", self.styling.bullet(), item.as_ref());
        }
    }

    /// Blank line plus an emphasized title
    pub fn section(&self, title: &str) {
        println!();
        println!("{}", self.styling.style_emphasis(title));
    }

    /// `label: value` pair used by lookups; empty values are skipped
    pub fn field(&self, label: &str, value: &str) {
        if !value.is_empty() {
            println!("  {} {}", self.styling.style_subtle(&format!("{label}:")), value);
        }
    }
}

fn join(item: &str, details: &str) -> String {
    if details.is_empty() {
        item.to_string()
    } else {
        format!("{item}: {details}")
    }
}

#[cfg(test)]
mod tests {
    include!("status.test.rs");
}

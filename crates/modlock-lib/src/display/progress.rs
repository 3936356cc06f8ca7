//! Per-phase progress with ok/failed tallies
//!
//! A [`PhaseProgress`] is cloned into every worker of a batch. The bar length
//! is the batch size; each worker ticks it once through [`PhaseProgress::ok`]
//! or [`PhaseProgress::failed`].

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::styling::StyleManager;

const BAR_TEMPLATE: &str = "{spinner:.green} {prefix} [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

#[derive(Clone)]
pub struct PhaseProgress {
    bar: ProgressBar,
    label: Arc<str>,
    ok: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

impl PhaseProgress {
    /// Visible bar drawn to stderr (indicatif hides it when stderr is not a terminal)
    pub fn new(label: &str, total: u64) -> Self {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
            .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self::from_bar(bar, label)
    }

    /// Counts without drawing anything
    pub fn hidden() -> Self {
        Self::from_bar(ProgressBar::hidden(), "")
    }

    fn from_bar(bar: ProgressBar, label: &str) -> Self {
        let progress = Self {
            bar,
            label: Arc::from(label),
            ok: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
        };
        progress.refresh();
        progress
    }

    pub fn ok(&self) {
        self.ok.fetch_add(1, Ordering::Relaxed);
        self.bar.inc(1);
        self.refresh();
    }

    pub fn failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.bar.inc(1);
        self.refresh();
    }

    pub fn ok_count(&self) -> u64 {
        self.ok.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// `"<label>: N ok, M failed"`
    pub fn summary(&self) -> String {
        format!(
            "{}: {} ok, {} failed",
            self.label,
            self.ok_count(),
            self.failed_count()
        )
    }

    /// Stop ticking and leave the tally on screen
    pub fn finish(&self, styling: &StyleManager) {
        let summary = self.summary();
        if self.failed_count() == 0 {
            self.bar.finish_with_message(styling.format_success(&summary));
        } else {
            self.bar.abandon_with_message(styling.format_error(&summary));
        }
    }

    fn refresh(&self) {
        self.bar.set_message(format!(
            "({} ok, {} failed)",
            self.ok_count(),
            self.failed_count()
        ));
    }
}

impl std::fmt::Debug for PhaseProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseProgress")
            .field("label", &self.label)
            .field("ok", &self.ok_count())
            .field("failed", &self.failed_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    include!("progress.test.rs");
}

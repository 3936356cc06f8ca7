//! Terminal display system
//!
//! User-facing output (status lines and phase progress). Diagnostics stay on
//! `tracing`; this module is what a user reads while a build runs.

use std::sync::OnceLock;

pub mod progress;
pub mod status;
pub mod styling;

pub use progress::PhaseProgress;
pub use status::StatusDisplay;
pub use styling::StyleManager;

static GLOBAL_DISPLAY: OnceLock<Display> = OnceLock::new();

/// Display manager shared by every command
#[derive(Debug)]
pub struct Display {
    styling: StyleManager,
}

impl Display {
    /// Initialize the global display; the first call decides colors
    pub fn init(color: bool) -> &'static Self {
        GLOBAL_DISPLAY.get_or_init(|| Display {
            styling: StyleManager::new(color),
        })
    }

    /// Global display, plain styling when [`Display::init`] was never called
    pub fn global() -> &'static Self {
        GLOBAL_DISPLAY.get_or_init(|| Display {
            styling: StyleManager::plain(),
        })
    }

    pub fn status() -> StatusDisplay<'static> {
        StatusDisplay::new(&Self::global().styling)
    }

    pub fn styling() -> &'static StyleManager {
        &Self::global().styling
    }

    /// Progress for one pipeline phase over `total` items
    pub fn progress(label: &str, total: u64) -> PhaseProgress {
        PhaseProgress::new(label, total)
    }
}

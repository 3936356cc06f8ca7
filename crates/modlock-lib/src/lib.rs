//! # modlock Library
//!
//! Reproducible mod-set builds from a declarative manifest.
//!
//! ## Core Modules
//!
//! - [`primitives`] - Foundation types, errors, and shared coordination
//! - [`logger`] - Structured logging with progress tracking
//! - [`networking`] - Async HTTP client with concurrency management and retry
//! - [`platform`] - System resource detection for job parallelism
//! - [`api`] - CurseForge and Modrinth registry clients
//! - [`modpack`] - Manifest, statements, dependency expansion, downloads, lock file
//! - [`display`] - Status lines and per-phase progress bars
//! - [`application`] - CLI interface and configuration management
//!
//! ## Known limitations
//!
//! Dependency expansion covers exactly one level: the dependencies of a
//! dependency are never fetched. Download filenames come from the last URL
//! path segment, so two downloadables sharing that segment overwrite each
//! other (a warning is logged).
//!
//! ## Quick Start
//!
//! ```
//! use std::path::Path;
//!
//! let lock = modlock_lib::modpack::lock_file_path(Path::new("packs/survival.mods"));
//! assert_eq!(lock, Path::new("packs/survival.resolved-mods"));
//! ```

pub mod api;
pub mod application;
pub mod display;
pub mod logger;
pub mod modpack;
pub mod networking;
pub mod platform;
pub mod primitives;

// Re-export commonly used types for convenience
pub use application::{AppConfig, Cli, Commands, execute_command};
pub use logger::Logger;
pub use networking::{NetworkingConfig, NetworkingManager, RetryPolicy};
pub use platform::SystemResources;
pub use primitives::{ColorIntent, ConfigError, LogFormat, LogLevel, LogOutput, LoggerError};

pub type Result<T> = anyhow::Result<T>;

use application::CliConfig;

pub async fn main() -> Result<()> {
    let config = CliConfig::load()?;

    execute_command(config).await
}

//! # Modpack Module
//!
//! Everything between a manifest on disk and a populated mods directory.
//!
//! ## Pipeline
//!
//! 1. [`manifest`] parses statements, mod references and raw URLs
//! 2. [`resolver`] adds one level of required dependencies
//! 3. [`statements`] checks the environment and applies config overlays
//! 4. [`download`] fetches every downloadable on a bounded pool
//! 5. [`lockfile`] records what resolved so the next build can replay it
//!
//! [`build`] runs the stages in order.

pub mod build;
pub mod download;
pub mod lockfile;
pub mod manifest;
pub mod model;
pub mod resolver;
pub mod statements;

pub use build::{BuildError, BuildOutcome, BuildPipeline, BuildReport};
pub use download::{DownloadOrchestrator, file_name_from_url};
pub use lockfile::{LockFile, LockFileError, lock_file_path};
pub use manifest::{ManifestError, Modpack};
pub use model::{
    DownloadError, DownloadResult, Downloadable, Environment, InstallTarget, Mod, ModId, ModLoader,
    ModState, Registry, StatementRunError, StatementRunResult, Url,
};
pub use resolver::{DependencyError, DependencyResolution, resolve_dependencies};
pub use statements::{Statement, StatementError, run_statements};

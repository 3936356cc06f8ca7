//! Build pipeline
//!
//! Lock file detection, dependency expansion, confirmation, mods-folder wipe,
//! statements, downloads and finally the lock file. A lock file next to the
//! manifest is replayed instead of the manifest and skips dependency
//! expansion; such a build does not rewrite it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::download::DownloadOrchestrator;
use super::lockfile::{LockFile, LockFileError, lock_file_path};
use super::manifest::{ManifestError, Modpack};
use super::model::{DownloadResult, InstallTarget, StatementRunResult};
use super::resolver::{DependencyError, resolve_dependencies};
use super::statements::run_statements;
use crate::api::Registries;
use crate::application::session::InteractiveProvider;
use crate::display::{Display, PhaseProgress};
use crate::networking::{NetworkingError, NetworkingManager, RetryPolicy};

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(
        "Build failed: {source}. Review the modpack file {} and the configuration ({config})",
        manifest.display()
    )]
    Dependencies {
        manifest: PathBuf,
        config: String,
        #[source]
        source: DependencyError,
    },

    #[error(transparent)]
    Networking(#[from] NetworkingError),

    #[error(transparent)]
    LockFile(#[from] LockFileError),

    #[error("Failed to clear {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// What a finished build did
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// File the build read: the manifest, or its lock file when replaying
    pub source: PathBuf,
    pub lock_path: PathBuf,
    pub replayed: bool,
    pub lock_written: bool,
    pub lock: LockFile,
}

#[derive(Debug, Clone)]
pub enum BuildOutcome {
    Completed(BuildReport),
    /// Declined at the confirmation prompt; nothing was touched
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct BuildPipeline {
    networking: Arc<NetworkingManager>,
    registries: Registries,
    target: InstallTarget,
    retry: RetryPolicy,
    config_source: String,
    show_progress: bool,
}

impl BuildPipeline {
    pub fn new(
        networking: Arc<NetworkingManager>,
        registries: Registries,
        target: InstallTarget,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            networking,
            registries,
            target,
            retry,
            config_source: "defaults".to_string(),
            show_progress: true,
        }
    }

    /// Description of the active configuration, quoted on a failed build
    pub fn with_config_source(mut self, config_source: impl Into<String>) -> Self {
        self.config_source = config_source.into();
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn target(&self) -> &InstallTarget {
        &self.target
    }

    fn progress(&self, label: &str, total: usize) -> PhaseProgress {
        if self.show_progress {
            Display::progress(label, total as u64)
        } else {
            PhaseProgress::hidden()
        }
    }

    fn finish(&self, progress: &PhaseProgress) {
        if self.show_progress {
            progress.finish(Display::styling());
        }
    }

    pub async fn run(
        &self,
        manifest: &Path,
        interactive: &dyn InteractiveProvider,
    ) -> Result<BuildOutcome, BuildError> {
        let status = Display::status();
        let environment = &self.target.environment;
        let lock_path = lock_file_path(manifest);

        let (source, modpack, replayed) = match self.load_lock_file(&lock_path) {
            Some(modpack) => {
                status.info("Using existing resolution file:");
                status.message(&lock_path.display().to_string());
                status.subtle("Delete it to build from scratch.");
                (lock_path.clone(), modpack, true)
            }
            None => {
                status.info("No resolution file found. Building from scratch.");
                (manifest.to_path_buf(), Modpack::from_file(manifest)?, false)
            }
        };

        let initial = modpack.downloadables();
        let downloads = if replayed {
            initial
        } else {
            let progress = self.progress("Resolving", modpack.mods.len());
            let resolution = resolve_dependencies(
                &self.networking,
                &self.registries,
                environment,
                &modpack.mods,
                &initial,
                &progress,
            )
            .await;
            self.finish(&progress);

            match resolution {
                Ok(resolution) => resolution.downloadables(&initial),
                Err(error) => {
                    debug!("Dependency resolution failed: {error}");
                    status.error(
                        &format!(
                            "Build FAILED for {} {}",
                            environment.game_version, environment.loader
                        ),
                        "",
                    );
                    status.message("Review your configuration and modpack files and try again.");
                    status.list(&[
                        format!("Config: {}", self.config_source),
                        format!("Modpack file: {}", manifest.display()),
                    ]);
                    return Err(BuildError::Dependencies {
                        manifest: manifest.to_path_buf(),
                        config: self.config_source.clone(),
                        source: error,
                    });
                }
            }
        };

        status.section("Ready to build");
        status.message(&format!("{} over Minecraft {environment}.", source.display()));
        status.warning("This will erase your mods folder!");
        match interactive.confirm("Continue?", false) {
            Ok(true) => {}
            Ok(false) => {
                status.message("Build cancelled.");
                return Ok(BuildOutcome::Cancelled);
            }
            Err(e) => {
                debug!("Confirmation aborted: {e}");
                status.message("Build cancelled.");
                return Ok(BuildOutcome::Cancelled);
            }
        }

        clear_mods_dir(&self.target.mods_dir)?;

        let statement_results = run_statements(&modpack.statements, &self.target);
        let failed_statements: Vec<String> = statement_results
            .iter()
            .filter_map(|result| match result {
                StatementRunResult::Rejected(error) => {
                    Some(format!("{} ({})", error.statement, error.reason))
                }
                StatementRunResult::Applied(_) => None,
            })
            .collect();
        if !failed_statements.is_empty() {
            status.warning("The following statements failed:");
            status.list(&failed_statements);
        }

        let orchestrator = DownloadOrchestrator::new(
            self.networking.clone(),
            self.registries.clone(),
            environment.clone(),
            &self.target.mods_dir,
            self.retry,
        );
        let progress = self.progress("Downloading", downloads.len());
        let download_results = orchestrator.download_all(downloads, &progress).await?;
        self.finish(&progress);

        let failed_downloads: Vec<String> = download_results
            .iter()
            .filter_map(|result| match result {
                DownloadResult::Failed(error) => Some(format!("{} ({})", error.name, error.reason)),
                DownloadResult::Downloaded(_) => None,
            })
            .collect();
        if !failed_downloads.is_empty() {
            status.warning("The following downloads failed:");
            status.list(&failed_downloads);
        }

        let lock = LockFile::from_results(&statement_results, &download_results);
        let lock_written = !replayed;
        if lock_written {
            lock.to_disk(&lock_path)?;
            status.success("Resolved versions saved to resolution file", "");
            status.message(&lock_path.display().to_string());
        }

        info!(
            statements = statement_results.len(),
            downloads = download_results.len(),
            replayed,
            "Build finished"
        );
        status.message("Build finished.");

        Ok(BuildOutcome::Completed(BuildReport {
            source,
            lock_path,
            replayed,
            lock_written,
            lock,
        }))
    }

    /// Parsed lock file, or `None` when there is none or it cannot be used
    fn load_lock_file(&self, lock_path: &Path) -> Option<Modpack> {
        if !lock_path.is_file() {
            return None;
        }
        match LockFile::replay(lock_path) {
            Ok(modpack) => Some(modpack),
            Err(e) => {
                warn!("Ignoring resolution file: {e}");
                None
            }
        }
    }
}

/// Delete the regular files directly inside `dir`; subdirectories are kept
fn clear_mods_dir(dir: &Path) -> Result<(), BuildError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| BuildError::Io { path, source }
    };

    let mut removed = 0usize;
    for entry in std::fs::read_dir(dir).map_err(io_error(dir))? {
        let path = entry.map_err(io_error(dir))?.path();
        if path.is_file() {
            std::fs::remove_file(&path).map_err(io_error(&path))?;
            removed += 1;
        }
    }

    debug!(dir = %dir.display(), removed, "Cleared mods directory");
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("build.test.rs");
}

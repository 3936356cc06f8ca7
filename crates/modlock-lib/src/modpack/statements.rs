//! Environment statements: `game`, `loader` and `config` lines.
//!
//! Each statement is a single check (or overlay) against the install target.
//! A rejected statement is recorded and the batch keeps going.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::model::{InstallTarget, StatementRunError, StatementRunResult};

#[derive(Debug, Error)]
pub enum StatementError {
    #[error("{reason}")]
    Malformed { reason: String },

    #[error("pinned game version {pinned} does not match configured {configured}")]
    GameVersionMismatch { pinned: String, configured: String },

    #[error("loader {declared} does not match configured {configured}")]
    LoaderMismatch { declared: String, configured: String },

    #[error("installation root {} is not a directory", path.display())]
    InvalidInstallRoot { path: PathBuf },

    #[error("{} must contain a top-level folder named '{expected}'", archive.display())]
    MissingOverlayFolder { archive: PathBuf, expected: String },

    #[error("failed to read archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A parsed environment statement with its raw body
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    /// `game <version>` or `game <version>==<exact>`
    GameVersion { body: String, pin: Option<String> },
    /// `loader <name>` or `loader <name>==<version>`; `loader_type` is lower-cased
    Loader {
        body: String,
        loader_type: String,
        version: Option<String>,
    },
    /// `config <archive>`; `archive` is resolved against the manifest directory
    ConfigOverlay { body: String, archive: PathBuf },
}

impl Statement {
    pub const KEYWORDS: [&'static str; 3] = ["game", "loader", "config"];

    /// Parse the body following `keyword`. `keyword` must be one of [`Self::KEYWORDS`].
    pub fn parse(keyword: &str, body: &str, manifest_dir: &Path) -> Result<Self, StatementError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(StatementError::Malformed {
                reason: format!("'{keyword}' needs a value"),
            });
        }

        match keyword {
            "game" => {
                let pin = match body.split_once("==") {
                    Some((_, pin)) => Some(non_empty(pin, "game version pin")?),
                    None => None,
                };
                Ok(Statement::GameVersion {
                    body: body.to_string(),
                    pin,
                })
            }
            "loader" => {
                let (loader_type, version) = match body.split_once("==") {
                    Some((loader, version)) => (
                        non_empty(loader, "loader name")?,
                        Some(non_empty(version, "loader version")?),
                    ),
                    None => (body.to_string(), None),
                };
                Ok(Statement::Loader {
                    body: body.to_string(),
                    loader_type: loader_type.to_lowercase(),
                    version,
                })
            }
            "config" => Ok(Statement::ConfigOverlay {
                body: body.to_string(),
                archive: manifest_dir.join(body),
            }),
            other => Err(StatementError::Malformed {
                reason: format!("unknown statement '{other}'"),
            }),
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Statement::GameVersion { .. } => "game",
            Statement::Loader { .. } => "loader",
            Statement::ConfigOverlay { .. } => "config",
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Statement::GameVersion { body, .. }
            | Statement::Loader { body, .. }
            | Statement::ConfigOverlay { body, .. } => body,
        }
    }

    /// Check (or apply, for overlays) this statement against `target`
    pub fn run(&self, target: &InstallTarget) -> Result<(), StatementError> {
        match self {
            Statement::GameVersion { pin: None, .. } => Ok(()),
            Statement::GameVersion { pin: Some(pin), .. } => {
                if pin == &target.environment.game_version {
                    Ok(())
                } else {
                    Err(StatementError::GameVersionMismatch {
                        pinned: pin.clone(),
                        configured: target.environment.game_version.clone(),
                    })
                }
            }
            Statement::Loader { loader_type, .. } => {
                let configured = target.environment.loader.as_str();
                if loader_type.eq_ignore_ascii_case(configured) {
                    Ok(())
                } else {
                    Err(StatementError::LoaderMismatch {
                        declared: loader_type.clone(),
                        configured: configured.to_string(),
                    })
                }
            }
            Statement::ConfigOverlay { archive, .. } => apply_overlay(archive, target),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.keyword(), self.body())
    }
}

fn non_empty(value: &str, what: &str) -> Result<String, StatementError> {
    let value = value.trim();
    if value.is_empty() {
        Err(StatementError::Malformed {
            reason: format!("empty {what}"),
        })
    } else {
        Ok(value.to_string())
    }
}

/// Extract `archive` to a scratch dir and merge its `<stem>/` folder over the install root
fn apply_overlay(archive: &Path, target: &InstallTarget) -> Result<(), StatementError> {
    let root = target
        .install_root()
        .filter(|root| root.is_dir())
        .ok_or_else(|| StatementError::InvalidInstallRoot {
            path: target
                .mods_dir
                .parent()
                .unwrap_or(&target.mods_dir)
                .to_path_buf(),
        })?;

    let expected = archive
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StatementError::Io { path, source }
    };
    let archive_error = |source| StatementError::Archive {
        path: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(io_error(archive))?;
    let mut zip = zip::ZipArchive::new(file).map_err(archive_error)?;

    let scratch = tempfile::tempdir().map_err(io_error(&std::env::temp_dir()))?;
    zip.extract(scratch.path()).map_err(archive_error)?;

    let folder = scratch.path().join(&expected);
    if expected.is_empty() || !folder.is_dir() {
        return Err(StatementError::MissingOverlayFolder {
            archive: archive.to_path_buf(),
            expected,
        });
    }

    debug!(archive = %archive.display(), root = %root.display(), "Applying config overlay");
    copy_dir_contents(&folder, root)
}

/// Recursive copy of `src`'s contents into `dst`, overwriting existing files
pub fn copy_dir_contents(src: &Path, dst: &Path) -> Result<(), StatementError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StatementError::Io { path, source }
    };

    std::fs::create_dir_all(dst).map_err(io_error(dst))?;

    for entry in std::fs::read_dir(src).map_err(io_error(src))? {
        let entry = entry.map_err(io_error(src))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_contents(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path).map_err(io_error(&dst_path))?;
        }
    }

    Ok(())
}

/// Run every statement in order; one result per statement
pub fn run_statements(statements: &[Statement], target: &InstallTarget) -> Vec<StatementRunResult> {
    statements
        .iter()
        .map(|statement| match statement.run(target) {
            Ok(()) => {
                debug!(%statement, "Statement applied");
                StatementRunResult::Applied(statement.clone())
            }
            Err(e) => {
                warn!(%statement, "Statement rejected: {e}");
                StatementRunResult::Rejected(StatementRunError {
                    statement: statement.to_string(),
                    reason: e.to_string(),
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    include!("statements.test.rs");
}

//! Lock file ("resolution file") codec
//!
//! The lock file is itself a valid manifest: resolved statements, one
//! `mod <id> <name> == <version>` line per downloaded mod and one `download`
//! line per downloaded URL, followed by commented failure lists. Building from
//! it fetches exactly the same files again.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::manifest::{ManifestError, Modpack};
use super::model::{
    DownloadError, DownloadResult, Downloadable, Mod, StatementRunError, StatementRunResult, Url,
};
use super::statements::Statement;

pub const LOCK_FILE_EXTENSION: &str = "resolved-mods";

#[derive(Debug, Error)]
pub enum LockFileError {
    #[error("Failed to access lock file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Lock file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },
}

/// Sibling lock file of `manifest`: same stem, `resolved-mods` extension
pub fn lock_file_path(manifest: &Path) -> PathBuf {
    manifest.with_extension(LOCK_FILE_EXTENSION)
}

/// The five buckets of a finished build
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockFile {
    pub resolved_statements: Vec<Statement>,
    pub failed_statements: Vec<StatementRunError>,
    pub resolved_mods: Vec<Mod>,
    pub resolved_urls: Vec<Url>,
    pub failed_downloads: Vec<DownloadError>,
}

impl LockFile {
    /// Partition results. A failed download whose identifier also resolved is
    /// left out, so no identifier is both resolved and failed.
    pub fn from_results(
        statement_results: &[StatementRunResult],
        download_results: &[DownloadResult],
    ) -> Self {
        let mut lock = LockFile::default();

        for result in statement_results {
            match result {
                StatementRunResult::Applied(statement) => {
                    lock.resolved_statements.push(statement.clone())
                }
                StatementRunResult::Rejected(error) => lock.failed_statements.push(error.clone()),
            }
        }

        let mut resolved_ids = HashSet::new();
        for result in download_results {
            if let DownloadResult::Downloaded(item) = result {
                resolved_ids.insert(item.identifier());
                match item {
                    Downloadable::Mod(m) => lock.resolved_mods.push(m.clone()),
                    Downloadable::Url(url) => lock.resolved_urls.push(url.clone()),
                }
            }
        }

        lock.failed_downloads = download_results
            .iter()
            .filter_map(|result| match result {
                DownloadResult::Failed(error) if !resolved_ids.contains(&error.identifier) => {
                    Some(error.clone())
                }
                _ => None,
            })
            .collect();

        lock.resolved_mods.sort();
        lock.resolved_mods.dedup();
        lock.resolved_urls.sort();
        lock.resolved_urls.dedup();
        lock.failed_downloads.sort_by(|a, b| a.name.cmp(&b.name));

        lock
    }

    pub fn render(&self) -> String {
        let mut blocks: Vec<String> = Vec::new();

        if !self.resolved_statements.is_empty() {
            blocks.push(lines(self.resolved_statements.iter().map(ToString::to_string)));
        }
        if !self.resolved_mods.is_empty() {
            blocks.push(lines(self.resolved_mods.iter().map(mod_line)));
        }
        if !self.resolved_urls.is_empty() {
            blocks.push(lines(
                self.resolved_urls.iter().map(|url| format!("download {url}")),
            ));
        }
        if !self.failed_statements.is_empty() {
            blocks.push(failure_block(
                "Failed statements",
                self.failed_statements.iter().map(|e| e.statement.as_str()),
            ));
        }
        if !self.failed_downloads.is_empty() {
            blocks.push(failure_block(
                "Failed downloads",
                self.failed_downloads.iter().map(|e| e.name.as_str()),
            ));
        }

        blocks.join("\n")
    }

    pub fn to_disk(&self, path: &Path) -> Result<(), LockFileError> {
        debug!(path = %path.display(), "Writing lock file");
        std::fs::write(path, self.render()).map_err(|source| LockFileError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a lock file back into a manifest for replay
    pub fn replay(path: &Path) -> Result<Modpack, LockFileError> {
        Modpack::from_file(path).map_err(|source| match source {
            ManifestError::Io { path, source } => LockFileError::Io { path, source },
            other => LockFileError::Corrupt {
                path: path.to_path_buf(),
                source: other,
            },
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failed_statements.is_empty() && self.failed_downloads.is_empty()
    }
}

fn lines(items: impl Iterator<Item = String>) -> String {
    items.fold(String::new(), |mut out, line| {
        let _ = writeln!(out, "{line}");
        out
    })
}

fn failure_block<'a>(title: &str, items: impl Iterator<Item = &'a str>) -> String {
    let mut block = format!("# {title}:\n");
    for item in items {
        let _ = writeln!(block, "# - {}", single_line(item));
    }
    block
}

fn mod_line(m: &Mod) -> String {
    let name = sanitize_name(m.display_name());
    match m.version_id() {
        Some(version) => format!("mod {} {} == {}", m.id(), name, version),
        None => format!("mod {} {}", m.id(), name),
    }
}

/// Keep a display name from breaking the `mod` line grammar
fn sanitize_name(name: &str) -> String {
    let mut name = single_line(name);
    while name.contains("==") {
        name = name.replace("==", "=");
    }
    name
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    include!("lockfile.test.rs");
}

//! Manifest parsing
//!
//! One statement per line, keyed by its first word. Blank lines, comments and
//! unknown keywords are skipped, so a lock file parses as a manifest.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::model::{Downloadable, Mod, ModId, Url};
use super::statements::Statement;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("line {line}: invalid statement '{content}': {reason}")]
    Parse {
        line: usize,
        content: String,
        reason: String,
    },

    #[error("line {line}: '{content}' is missing its identifier")]
    InvalidFormat { line: usize, content: String },

    #[error("failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Parsed manifest: environment statements, mod references and raw URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modpack {
    pub statements: Vec<Statement>,
    pub mods: BTreeSet<Mod>,
    pub urls: BTreeSet<Url>,
}

impl Modpack {
    /// Parse manifest text; `config` paths are resolved against `manifest_dir`
    pub fn parse(text: &str, manifest_dir: &Path) -> Result<Self, ManifestError> {
        let mut modpack = Modpack::default();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let Some(keyword) = line.split_whitespace().next() else {
                continue;
            };
            let body = line[keyword.len()..].trim();

            match keyword {
                keyword if Statement::KEYWORDS.contains(&keyword) => {
                    let statement = Statement::parse(keyword, body, manifest_dir).map_err(|e| {
                        ManifestError::Parse {
                            line: index + 1,
                            content: line.to_string(),
                            reason: e.to_string(),
                        }
                    })?;
                    if !modpack.statements.contains(&statement) {
                        modpack.statements.push(statement);
                    }
                }
                "mod" => {
                    let parsed = parse_mod(body).ok_or_else(|| ManifestError::InvalidFormat {
                        line: index + 1,
                        content: line.to_string(),
                    })?;
                    modpack.mods.insert(parsed);
                }
                "download" => {
                    let parsed = parse_url(body).ok_or_else(|| ManifestError::InvalidFormat {
                        line: index + 1,
                        content: line.to_string(),
                    })?;
                    modpack.urls.insert(parsed);
                }
                _ => {}
            }
        }

        Ok(modpack)
    }

    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, dir)
    }

    /// Mods and URLs as one deduplicated set
    pub fn downloadables(&self) -> BTreeSet<Downloadable> {
        self.mods
            .iter()
            .cloned()
            .map(Downloadable::Mod)
            .chain(self.urls.iter().cloned().map(Downloadable::Url))
            .collect()
    }
}

/// `<id>` or `<id> <label> == <version>`
fn parse_mod(body: &str) -> Option<Mod> {
    let id = body.split_whitespace().next()?.split("==").next()?;
    if id.is_empty() {
        return None;
    }

    let version_hint = body
        .split_once("==")
        .map(|(_, hint)| hint.trim())
        .filter(|hint| !hint.is_empty())
        .map(str::to_string);

    Some(Mod::new(ModId::parse(id), version_hint))
}

/// `<url>` or `<url> for mod <id>`
fn parse_url(body: &str) -> Option<Url> {
    let url = body.split_whitespace().next()?;
    let owner = body
        .split_once(" for mod ")
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .map(str::to_string);

    Some(Url::new(url, owner))
}

#[cfg(test)]
mod tests {
    include!("manifest.test.rs");
}

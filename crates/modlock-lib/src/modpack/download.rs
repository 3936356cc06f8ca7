//! Download stage
//!
//! One worker per downloadable on the networking pool. A worker resolves the
//! URL (registry lookup for mods, the URL itself otherwise), streams it into
//! the target directory under the URL's last path segment and reports a
//! [`DownloadResult`]. Failures never escape a worker.

use percent_encoding::percent_decode_str;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::model::{DownloadError, DownloadResult, Downloadable, Environment};
use crate::api::{Registries, RegistryError};
use crate::display::PhaseProgress;
use crate::networking::{NetworkingError, NetworkingManager, RetryPolicy};

/// Fans downloads out over the networking pool
#[derive(Debug, Clone)]
pub struct DownloadOrchestrator {
    networking: Arc<NetworkingManager>,
    registries: Registries,
    environment: Environment,
    target_dir: PathBuf,
    retry: RetryPolicy,
}

impl DownloadOrchestrator {
    pub fn new(
        networking: Arc<NetworkingManager>,
        registries: Registries,
        environment: Environment,
        target_dir: impl Into<PathBuf>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            networking,
            registries,
            environment,
            target_dir: target_dir.into(),
            retry,
        }
    }

    /// Download everything in `items`. Every item yields exactly one result;
    /// failures whose identifier also succeeded (e.g. a mod and a URL declared
    /// for it) are dropped afterwards.
    pub async fn download_all(
        &self,
        items: BTreeSet<Downloadable>,
        progress: &PhaseProgress,
    ) -> Result<Vec<DownloadResult>, NetworkingError> {
        info!(items = items.len(), target = %self.target_dir.display(), "Downloading");

        let worker = {
            let this = self.clone();
            let progress = progress.clone();
            move |item: Downloadable| {
                let this = this.clone();
                let progress = progress.clone();
                async move { this.download_one(item, &progress).await }
            }
        };

        let outcomes = self
            .networking
            .run_batch(items.into_iter().collect(), worker)
            .await?;

        warn_on_collisions(&outcomes);

        let results = reconcile(outcomes.into_iter().map(|(result, _)| result).collect());
        info!(results = results.len(), "Downloads finished");
        Ok(results)
    }

    async fn download_one(
        &self,
        mut item: Downloadable,
        progress: &PhaseProgress,
    ) -> (DownloadResult, Option<PathBuf>) {
        match self.fetch(&mut item).await {
            Ok(path) => {
                debug!(item = %item.identifier(), path = %path.display(), "Downloaded");
                progress.ok();
                (DownloadResult::Downloaded(item), Some(path))
            }
            Err(e) => {
                warn!("Download of {} failed: {e}", item.display_name());
                progress.failed();
                let error = DownloadError {
                    identifier: item.identifier(),
                    name: item.display_name(),
                    reason: e.to_string(),
                };
                (DownloadResult::Failed(error), None)
            }
        }
    }

    async fn fetch(&self, item: &mut Downloadable) -> Result<PathBuf, RegistryError> {
        let (url, sha1) = match item {
            Downloadable::Mod(m) => {
                let client = self.registries.client(m.registry()).clone();
                let sha1 = m
                    .resolve_file(client.as_ref(), &self.environment)
                    .await?
                    .sha1
                    .clone();
                if let Err(e) = m.resolve_metadata(client.as_ref()).await {
                    debug!(mod_id = %m.id(), "Metadata unavailable: {e}");
                }
                (m.download_url()?.to_string(), sha1)
            }
            Downloadable::Url(url) => (url.as_str().to_string(), None),
        };

        let file_name = file_name_from_url(&url).ok_or_else(|| RegistryError::DownloadFailed {
            url: url.clone(),
            attempts: 0,
            reason: "URL has no file name".to_string(),
        })?;
        let destination = self.target_dir.join(file_name);

        self.retry
            .run(&url, |_| {
                self.networking
                    .download_to_file(&url, &destination, sha1.as_deref())
            })
            .await
            .map_err(|exhausted| RegistryError::DownloadFailed {
                url: url.clone(),
                attempts: exhausted.attempts,
                reason: exhausted.last_error.to_string(),
            })?;

        Ok(destination)
    }
}

/// Last path segment of `url`, percent-decoded, without query or fragment
pub fn file_name_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    let (_, segment) = path.rsplit_once('/')?;
    let name = percent_decode_str(segment).decode_utf8_lossy().into_owned();

    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        None
    } else {
        Some(name)
    }
}

/// Drop failures whose identifier has a successful counterpart
fn reconcile(results: Vec<DownloadResult>) -> Vec<DownloadResult> {
    let succeeded: HashSet<String> = results
        .iter()
        .filter(|r| matches!(r, DownloadResult::Downloaded(_)))
        .map(DownloadResult::identifier)
        .collect();

    results
        .into_iter()
        .filter(|r| match r {
            DownloadResult::Failed(error) => !succeeded.contains(&error.identifier),
            DownloadResult::Downloaded(_) => true,
        })
        .collect()
}

/// Two downloads writing the same file: the later one wins, silently on disk
fn warn_on_collisions(outcomes: &[(DownloadResult, Option<PathBuf>)]) {
    let mut writers: HashMap<&Path, Vec<String>> = HashMap::new();
    for (result, path) in outcomes {
        if let (DownloadResult::Downloaded(item), Some(path)) = (result, path) {
            writers
                .entry(path.as_path())
                .or_default()
                .push(item.display_name());
        }
    }

    for (path, names) in writers {
        if names.len() > 1 {
            warn!(
                path = %path.display(),
                "Downloads overwrote each other: {}",
                names.join(", ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    include!("download.test.rs");
}

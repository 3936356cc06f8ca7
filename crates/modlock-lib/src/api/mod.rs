//! # API Module
//!
//! Registry clients that turn a mod identifier plus an [`Environment`] into
//! metadata and a concrete downloadable file.
//!
//! ## Modules
//!
//! - [`curseforge`] - numeric ids, API key header, paginated file scan, mod search
//! - [`modrinth`] - slugs, static User-Agent, version listing, faceted search
//! - `mock` - canned responses for tests (`test-utils` feature)

pub mod curseforge;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod modrinth;

pub use curseforge::LiveCurseForgeClient;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockRegistryClient;
pub use modrinth::LiveModrinthClient;

use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

use crate::modpack::{Environment, Registry};
use crate::networking::{NetworkingError, NetworkingManager, RetryExhausted, RetryPolicy};

/// Registry lookup errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Request to {url} failed after {attempts} attempt(s): {reason}")]
    RequestFailed {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Download of {url} failed after {attempts} attempt(s): {reason}")]
    DownloadFailed {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("No file of mod {mod_id} supports {environment}")]
    NotFound {
        mod_id: String,
        environment: String,
    },

    #[error("Version {version} of mod {mod_id} does not support {environment}")]
    Incompatible {
        mod_id: String,
        version: String,
        environment: String,
    },

    #[error("Mod {mod_id} has no download URL")]
    Unavailable { mod_id: String },

    #[error("Mod {mod_id} has not been resolved against a registry yet")]
    Unresolved { mod_id: String },

    #[error("CurseForge API key is not configured")]
    MissingApiKey,

    #[error("Unexpected response from {url}: {reason}")]
    Json { url: String, reason: String },
}

impl RegistryError {
    /// Collapse an exhausted request retry into a registry error
    pub(crate) fn from_exhausted(url: &str, exhausted: RetryExhausted<NetworkingError>) -> Self {
        match exhausted.last_error {
            NetworkingError::Decode { source, .. } => RegistryError::Json {
                url: url.to_string(),
                reason: source.to_string(),
            },
            other => RegistryError::RequestFailed {
                url: url.to_string(),
                attempts: exhausted.attempts,
                reason: other.to_string(),
            },
        }
    }
}

/// Descriptive fields of a mod; everything but the name is best-effort
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModMetadata {
    pub name: String,
    pub downloads: Option<u64>,
    pub last_updated: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
}

/// The one file (CurseForge) or version (Modrinth) picked for an environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFile {
    /// File id or version id; replaying it as a version hint fetches this exact file
    pub version_id: String,
    pub display_name: String,
    pub download_url: Option<String>,
    /// Identifiers of required dependencies, in the same registry
    pub dependencies: Vec<String>,
    pub sha1: Option<String>,
}

/// One entry of a keyword search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHit {
    /// Identifier usable in a manifest `mod` line
    pub mod_id: String,
    pub name: String,
    pub downloads: Option<u64>,
    pub last_updated: Option<String>,
}

pub type RegistryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RegistryError>> + Send + 'a>>;

/// Capability set shared by both registries
pub trait RegistryClient: Send + Sync {
    fn registry(&self) -> Registry;

    fn metadata<'a>(&'a self, mod_id: &'a str) -> RegistryFuture<'a, ModMetadata>;

    /// Newest file supporting `environment`, or exactly `version_hint` when given
    fn latest_compatible_file<'a>(
        &'a self,
        mod_id: &'a str,
        environment: &'a Environment,
        version_hint: Option<&'a str>,
    ) -> RegistryFuture<'a, ResolvedFile>;

    /// Keyword search, narrowed to `environment` when one is given
    fn search<'a>(
        &'a self,
        keyword: &'a str,
        environment: Option<&'a Environment>,
    ) -> RegistryFuture<'a, Vec<SearchHit>>;
}

/// One client per registry, routed by [`Registry`]
#[derive(Clone)]
pub struct Registries {
    curseforge: Arc<dyn RegistryClient>,
    modrinth: Arc<dyn RegistryClient>,
}

impl Registries {
    pub fn new(curseforge: Arc<dyn RegistryClient>, modrinth: Arc<dyn RegistryClient>) -> Self {
        Self {
            curseforge,
            modrinth,
        }
    }

    /// Production clients against the public APIs
    pub fn live(
        networking: Arc<NetworkingManager>,
        curseforge_api_key: Option<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self::new(
            Arc::new(LiveCurseForgeClient::new(
                networking.clone(),
                curseforge_api_key,
                retry,
            )),
            Arc::new(LiveModrinthClient::new(networking, retry)),
        )
    }

    /// CurseForge first, then Modrinth
    pub fn all(&self) -> [&Arc<dyn RegistryClient>; 2] {
        [&self.curseforge, &self.modrinth]
    }

    pub fn client(&self, registry: Registry) -> &Arc<dyn RegistryClient> {
        match registry {
            Registry::CurseForge => &self.curseforge,
            Registry::Modrinth => &self.modrinth,
        }
    }
}

impl std::fmt::Debug for Registries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registries")
            .field("curseforge", &self.curseforge.registry())
            .field("modrinth", &self.modrinth.registry())
            .finish()
    }
}

/// GET + decode with the retry policy applied
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    networking: &NetworkingManager,
    retry: &RetryPolicy,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<T, RegistryError> {
    retry
        .run(url, |_| networking.get_json::<T>(url, headers))
        .await
        .map_err(|exhausted| RegistryError::from_exhausted(url, exhausted))
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}

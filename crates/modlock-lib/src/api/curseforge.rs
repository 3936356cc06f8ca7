//! CurseForge API client
//!
//! Mods are addressed by numeric id. Every request carries the `x-api-key`
//! header and every response is wrapped in `{"data": ...}`.

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, trace};

use super::{
    ModMetadata, RegistryClient, RegistryError, RegistryFuture, ResolvedFile, SearchHit, fetch_json,
};
use crate::modpack::{Environment, Registry};
use crate::networking::{NetworkingManager, RetryPolicy};

pub const DEFAULT_BASE_URL: &str = "https://api.curseforge.com";

/// CurseForge's game id for Minecraft
pub const MINECRAFT_GAME_ID: u32 = 432;

/// Files are listed newest first in pages of this size
pub const PAGE_SIZE: usize = 50;

/// Files beyond this index are never inspected
pub const SCAN_WINDOW: usize = 5000;

/// `relationType` of a required dependency
const RELATION_REQUIRED: u64 = 3;

/// `algo` of a SHA-1 entry in `hashes`
const HASH_ALGO_SHA1: u8 = 1;

/// CDN URLs are served with raw spaces in the file name
const URL_SPACE: &AsciiSet = &CONTROLS.add(b' ');

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModResponse {
    name: String,
    #[serde(default)]
    download_count: Option<f64>,
    #[serde(default)]
    date_modified: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    links: Option<ModLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    id: u64,
    name: String,
    #[serde(default)]
    download_count: Option<f64>,
    #[serde(default)]
    date_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModLinks {
    #[serde(default)]
    website_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResponse {
    id: u64,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    game_versions: Vec<String>,
    /// Decoded loosely so one malformed entry doesn't sink the file
    #[serde(default)]
    dependencies: Vec<serde_json::Value>,
    #[serde(default)]
    hashes: Vec<FileHash>,
}

#[derive(Debug, Deserialize)]
struct FileHash {
    value: String,
    algo: u8,
}

impl FileResponse {
    /// `gameVersions` must contain both the game version and the loader
    fn supports(&self, environment: &Environment) -> bool {
        let loader = environment.loader.curseforge_name();
        self.game_versions
            .iter()
            .any(|v| v == &environment.game_version)
            && self
                .game_versions
                .iter()
                .any(|v| v.eq_ignore_ascii_case(loader))
    }

    fn into_resolved(self) -> ResolvedFile {
        let dependencies = self
            .dependencies
            .iter()
            .filter(|dep| {
                dep.get("relationType").and_then(|v| v.as_u64()) == Some(RELATION_REQUIRED)
            })
            .filter_map(|dep| dep.get("modId").and_then(|v| v.as_u64()))
            .map(|id| id.to_string())
            .collect();

        let sha1 = self
            .hashes
            .iter()
            .find(|hash| hash.algo == HASH_ALGO_SHA1)
            .map(|hash| hash.value.clone());

        ResolvedFile {
            version_id: self.id.to_string(),
            display_name: self.display_name,
            download_url: self.download_url.map(|url| encode_download_url(&url)),
            dependencies,
            sha1,
        }
    }
}

/// Encode spaces (and control characters) in a CDN download URL
pub fn encode_download_url(url: &str) -> String {
    utf8_percent_encode(url, URL_SPACE).to_string()
}

/// Live CurseForge API client (production)
pub struct LiveCurseForgeClient {
    networking: Arc<NetworkingManager>,
    base_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl LiveCurseForgeClient {
    pub fn new(
        networking: Arc<NetworkingManager>,
        api_key: Option<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self::with_base_url(networking, api_key, retry, DEFAULT_BASE_URL.to_string())
    }

    /// Create client with custom base URL (for staging/testing)
    pub fn with_base_url(
        networking: Arc<NetworkingManager>,
        api_key: Option<String>,
        retry: RetryPolicy,
        base_url: String,
    ) -> Self {
        Self {
            networking,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            retry,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, RegistryError> {
        let api_key = self.api_key.as_deref().ok_or(RegistryError::MissingApiKey)?;
        let url = format!("{}{}", self.base_url, path);
        let headers = [("x-api-key", api_key), ("Accept", "application/json")];

        let envelope: Envelope<T> =
            fetch_json(&self.networking, &self.retry, &url, &headers).await?;
        Ok(envelope.data)
    }

    pub async fn get_metadata(&self, mod_id: &str) -> Result<ModMetadata, RegistryError> {
        let response: ModResponse = self.get(&format!("/v1/mods/{mod_id}")).await?;

        Ok(ModMetadata {
            name: response.name,
            downloads: response.download_count.map(|count| count as u64),
            last_updated: response.date_modified,
            website: response.links.and_then(|links| links.website_url),
            summary: response.summary,
        })
    }

    pub async fn get_compatible_file(
        &self,
        mod_id: &str,
        environment: &Environment,
        version_hint: Option<&str>,
    ) -> Result<ResolvedFile, RegistryError> {
        if let Some(file_id) = version_hint {
            let file: FileResponse = self
                .get(&format!("/v1/mods/{mod_id}/files/{file_id}"))
                .await?;

            if !file.supports(environment) {
                return Err(RegistryError::Incompatible {
                    mod_id: mod_id.to_string(),
                    version: file_id.to_string(),
                    environment: environment.to_string(),
                });
            }
            return Ok(file.into_resolved());
        }

        for index in (0..SCAN_WINDOW).step_by(PAGE_SIZE) {
            trace!(mod_id, index, "Scanning CurseForge files");

            let page: Vec<FileResponse> = self
                .get(&format!(
                    "/v1/mods/{mod_id}/files?index={index}&pageSize={PAGE_SIZE}"
                ))
                .await?;

            if page.is_empty() {
                break;
            }

            if let Some(file) = page.into_iter().find(|file| file.supports(environment)) {
                debug!(mod_id, file_id = file.id, "Picked CurseForge file");
                return Ok(file.into_resolved());
            }
        }

        Err(RegistryError::NotFound {
            mod_id: mod_id.to_string(),
            environment: environment.to_string(),
        })
    }

    pub async fn search_mods(
        &self,
        keyword: &str,
        environment: Option<&Environment>,
    ) -> Result<Vec<SearchHit>, RegistryError> {
        let mut path = format!(
            "/v1/mods/search?gameId={MINECRAFT_GAME_ID}&searchFilter={}",
            utf8_percent_encode(keyword, NON_ALPHANUMERIC)
        );
        if let Some(environment) = environment {
            path.push_str(&format!(
                "&gameVersion={}&modLoaderType={}",
                utf8_percent_encode(&environment.game_version, NON_ALPHANUMERIC),
                environment.loader.curseforge_type()
            ));
        }

        let results: Vec<SearchResult> = self.get(&path).await?;
        debug!(keyword, hits = results.len(), "CurseForge search");

        Ok(results
            .into_iter()
            .map(|result| SearchHit {
                mod_id: result.id.to_string(),
                name: result.name,
                downloads: result.download_count.map(|count| count as u64),
                last_updated: result.date_modified,
            })
            .collect())
    }
}

impl RegistryClient for LiveCurseForgeClient {
    fn registry(&self) -> Registry {
        Registry::CurseForge
    }

    fn metadata<'a>(&'a self, mod_id: &'a str) -> RegistryFuture<'a, ModMetadata> {
        Box::pin(self.get_metadata(mod_id))
    }

    fn latest_compatible_file<'a>(
        &'a self,
        mod_id: &'a str,
        environment: &'a Environment,
        version_hint: Option<&'a str>,
    ) -> RegistryFuture<'a, ResolvedFile> {
        Box::pin(self.get_compatible_file(mod_id, environment, version_hint))
    }

    fn search<'a>(
        &'a self,
        keyword: &'a str,
        environment: Option<&'a Environment>,
    ) -> RegistryFuture<'a, Vec<SearchHit>> {
        Box::pin(self.search_mods(keyword, environment))
    }
}

#[cfg(test)]
mod tests {
    include!("curseforge.test.rs");
}

//! Modrinth API client
//!
//! Projects are addressed by slug or project id. No key is needed, but
//! Modrinth asks clients to identify themselves with a User-Agent.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::{
    ModMetadata, RegistryClient, RegistryError, RegistryFuture, ResolvedFile, SearchHit, fetch_json,
};
use crate::modpack::{Environment, Registry};
use crate::networking::{NetworkingManager, RetryPolicy};

pub const DEFAULT_BASE_URL: &str = "https://api.modrinth.com";

pub const USER_AGENT: &str = concat!("modlock/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    slug: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    downloads: Option<u64>,
    #[serde(default)]
    updated: Option<String>,
    #[serde(default)]
    project_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    project_id: String,
    #[serde(default)]
    slug: Option<String>,
    title: String,
    #[serde(default)]
    downloads: Option<u64>,
    #[serde(default)]
    date_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    game_versions: Vec<String>,
    #[serde(default)]
    loaders: Vec<String>,
    #[serde(default)]
    files: Vec<VersionFile>,
    #[serde(default)]
    dependencies: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct VersionFile {
    url: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    hashes: FileHashes,
}

#[derive(Debug, Default, Deserialize)]
struct FileHashes {
    #[serde(default)]
    sha1: Option<String>,
}

impl VersionResponse {
    fn supports(&self, environment: &Environment) -> bool {
        let loader = environment.loader.as_str();
        self.game_versions
            .iter()
            .any(|v| v == &environment.game_version)
            && self.loaders.iter().any(|l| l.eq_ignore_ascii_case(loader))
    }

    fn into_resolved(self) -> ResolvedFile {
        let dependencies = self
            .dependencies
            .iter()
            .filter(|dep| {
                dep.get("dependency_type").and_then(|v| v.as_str()) == Some("required")
            })
            .filter_map(|dep| dep.get("project_id").and_then(|v| v.as_str()))
            .map(str::to_string)
            .collect();

        let primary = self
            .files
            .iter()
            .find(|file| file.primary)
            .or_else(|| self.files.first());

        ResolvedFile {
            version_id: self.id.clone(),
            display_name: self.name.clone(),
            download_url: primary.map(|file| file.url.clone()),
            sha1: primary.and_then(|file| file.hashes.sha1.clone()),
            dependencies,
        }
    }
}

/// Live Modrinth API client (production)
pub struct LiveModrinthClient {
    networking: Arc<NetworkingManager>,
    base_url: String,
    retry: RetryPolicy,
}

impl LiveModrinthClient {
    pub fn new(networking: Arc<NetworkingManager>, retry: RetryPolicy) -> Self {
        Self::with_base_url(networking, retry, DEFAULT_BASE_URL.to_string())
    }

    /// Create client with custom base URL (for staging/testing)
    pub fn with_base_url(
        networking: Arc<NetworkingManager>,
        retry: RetryPolicy,
        base_url: String,
    ) -> Self {
        Self {
            networking,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, RegistryError> {
        let url = format!("{}{}", self.base_url, path);
        fetch_json(
            &self.networking,
            &self.retry,
            &url,
            &[("User-Agent", USER_AGENT)],
        )
        .await
    }

    pub async fn get_metadata(&self, mod_id: &str) -> Result<ModMetadata, RegistryError> {
        let project: ProjectResponse = self.get(&format!("/v2/project/{mod_id}")).await?;
        let kind = project.project_type.as_deref().unwrap_or("mod");

        Ok(ModMetadata {
            website: Some(format!("https://modrinth.com/{kind}/{}", project.slug)),
            name: project.title,
            downloads: project.downloads,
            last_updated: project.updated,
            summary: project.description,
        })
    }

    pub async fn get_compatible_file(
        &self,
        mod_id: &str,
        environment: &Environment,
        version_hint: Option<&str>,
    ) -> Result<ResolvedFile, RegistryError> {
        if let Some(version_id) = version_hint {
            let version: VersionResponse = self.get(&format!("/v2/version/{version_id}")).await?;

            if !version.supports(environment) {
                return Err(RegistryError::Incompatible {
                    mod_id: mod_id.to_string(),
                    version: version_id.to_string(),
                    environment: environment.to_string(),
                });
            }
            return Ok(version.into_resolved());
        }

        let versions: Vec<VersionResponse> = self
            .get(&format!("/v2/project/{mod_id}/version"))
            .await?;

        let version = versions
            .into_iter()
            .find(|version| version.supports(environment))
            .ok_or_else(|| RegistryError::NotFound {
                mod_id: mod_id.to_string(),
                environment: environment.to_string(),
            })?;

        debug!(mod_id, version_id = %version.id, "Picked Modrinth version");
        Ok(version.into_resolved())
    }

    pub async fn search_projects(
        &self,
        keyword: &str,
        environment: Option<&Environment>,
    ) -> Result<Vec<SearchHit>, RegistryError> {
        let mut path = format!(
            "/v2/search?query={}",
            utf8_percent_encode(keyword, NON_ALPHANUMERIC)
        );
        if let Some(environment) = environment {
            let facets = serde_json::json!([
                [format!("versions:{}", environment.game_version)],
                [format!("categories:{}", environment.loader.as_str())],
            ]);
            path.push_str(&format!(
                "&facets={}",
                utf8_percent_encode(&facets.to_string(), NON_ALPHANUMERIC)
            ));
        }

        let response: SearchResponse = self.get(&path).await?;
        debug!(keyword, hits = response.hits.len(), "Modrinth search");

        Ok(response
            .hits
            .into_iter()
            .map(|hit| SearchHit {
                mod_id: hit.slug.unwrap_or(hit.project_id),
                name: hit.title,
                downloads: hit.downloads,
                last_updated: hit.date_modified,
            })
            .collect())
    }
}

impl RegistryClient for LiveModrinthClient {
    fn registry(&self) -> Registry {
        Registry::Modrinth
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
        Box::pin(self.search_projects(keyword, environment))
    }
}

#[cfg(test)]
mod tests {
    include!("modrinth.test.rs");
}

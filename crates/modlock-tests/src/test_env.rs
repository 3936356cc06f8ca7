//! Hermetic test environment for end-to-end builds
//!
//! A temporary game directory plus one mockito server standing in for both
//! registry APIs and the file CDN. The live registry clients talk to it over
//! real HTTP.

use anyhow::Result;
use mockito::{Mock, Server, ServerGuard};
use modlock_lib::api::Registries;
use modlock_lib::api::curseforge::LiveCurseForgeClient;
use modlock_lib::api::modrinth::LiveModrinthClient;
use modlock_lib::modpack::{BuildPipeline, Environment, InstallTarget, ModLoader};
use modlock_lib::networking::{NetworkingConfig, NetworkingManager, RetryPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Waits between retries are kept tiny so failing paths stay fast
pub const TEST_RETRY_UNIT: Duration = Duration::from_millis(5);

pub struct TestEnvironment {
    /// Keeps the directory alive for the test's duration
    pub temp_dir: TempDir,
    /// Game directory; config overlays land here
    pub game_dir: PathBuf,
    pub mods_dir: PathBuf,
    pub server: ServerGuard,
    pub environment: Environment,
    networking: Arc<NetworkingManager>,
    /// Registered mocks live as long as the environment
    mocks: Vec<Mock>,
}

impl TestEnvironment {
    /// Fabric 1.20.1 with an empty mods folder
    pub async fn new() -> Result<Self> {
        Self::with_environment(Environment::new("1.20.1", ModLoader::Fabric)).await
    }

    pub async fn with_environment(environment: Environment) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let game_dir = temp_dir.path().join("game");
        let mods_dir = game_dir.join("mods");
        fs::create_dir_all(&mods_dir)?;

        let networking = NetworkingManager::new(NetworkingConfig {
            max_jobs: Some(4),
            timeout_seconds: 5,
            trace_requests: false,
        })
        .await?;

        Ok(Self {
            temp_dir,
            game_dir,
            mods_dir,
            server: Server::new_async().await,
            environment,
            networking: Arc::new(networking),
            mocks: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute URL on the mock server
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.url(), path)
    }

    /// Write a manifest next to the game directory and return its path
    pub fn write_manifest(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Serve `body` at `path` as a file download
    pub async fn serve_file(&mut self, path: &str, body: &str) {
        let mock = self
            .server
            .mock("GET", path)
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;
        self.mocks.push(mock);
    }

    /// Serve a JSON body at `path`, whatever the query string
    pub async fn serve_json(&mut self, path: &str, body: String) {
        let mock = self
            .server
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        self.mocks.push(mock);
    }

    /// Live clients for both registries, pointed at the mock server
    pub fn registries(&self, retry: RetryPolicy) -> Registries {
        Registries::new(
            Arc::new(LiveCurseForgeClient::with_base_url(
                self.networking.clone(),
                Some("test-key".to_string()),
                retry,
                self.server.url(),
            )),
            Arc::new(LiveModrinthClient::with_base_url(
                self.networking.clone(),
                retry,
                self.server.url(),
            )),
        )
    }

    /// Build pipeline over the live clients, without progress bars
    pub fn pipeline(&self, attempts: u32) -> BuildPipeline {
        let retry = RetryPolicy::new(attempts, TEST_RETRY_UNIT);
        BuildPipeline::new(
            self.networking.clone(),
            self.registries(retry),
            InstallTarget::new(self.environment.clone(), &self.mods_dir),
            retry,
        )
        .with_config_source("test environment")
        .with_progress(false)
    }

    /// Sorted file names in the mods folder
    pub fn installed_mods(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.mods_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

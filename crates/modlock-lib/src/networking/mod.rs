pub mod retry;

pub use retry::{RetryExhausted, RetryPolicy};

use reqwest::Client;
use serde::de::DeserializeOwned;
use sha1::{Digest, Sha1};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

use crate::platform::system_resources;

/// Networking errors for registry requests, downloads and batch execution
#[derive(Debug, Error)]
pub enum NetworkingError {
    #[error("HTTP request failed: {source}")]
    RequestFailed {
        #[from]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Task join error: {source}")]
    TaskJoinError {
        #[from]
        source: tokio::task::JoinError,
    },

    #[error("Semaphore acquire error: {source}")]
    SemaphoreError {
        #[from]
        source: tokio::sync::AcquireError,
    },

    #[error("Invalid job count: {count} (must be > 0)")]
    InvalidJobCount { count: u32 },
}

/// Resource-aware networking configuration
#[derive(Debug, Clone)]
pub struct NetworkingConfig {
    /// Maximum number of concurrent jobs (from CLI --cpu-jobs)
    pub max_jobs: Option<u32>,
    /// HTTP client timeout in seconds
    pub timeout_seconds: u64,
    /// Emit a trace event per request and per batch task
    pub trace_requests: bool,
}

impl Default for NetworkingConfig {
    fn default() -> Self {
        Self {
            max_jobs: None,
            timeout_seconds: 30,
            trace_requests: false,
        }
    }
}

/// Shared HTTP client plus the worker pool every batch runs on
#[derive(Debug)]
pub struct NetworkingManager {
    client: Client,
    config: NetworkingConfig,
    semaphore: Arc<Semaphore>,
}

impl NetworkingManager {
    /// Create networking manager with job calculation
    pub async fn new(config: NetworkingConfig) -> Result<Self, NetworkingError> {
        trace!("Initializing networking manager");

        let optimal_jobs = system_resources().calculate_optimal_jobs(config.max_jobs);
        if optimal_jobs == 0 {
            return Err(NetworkingError::InvalidJobCount {
                count: optimal_jobs,
            });
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;

        let semaphore = Arc::new(Semaphore::new(optimal_jobs as usize));

        debug!(jobs = optimal_jobs, "Networking manager ready");

        Ok(Self {
            client,
            config,
            semaphore,
        })
    }

    /// Single GET decoded as JSON. Non-success statuses are errors.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<T, NetworkingError> {
        if self.config.trace_requests {
            trace!(url, "GET");
        }

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkingError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| NetworkingError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Stream `url` into `destination`, overwriting it. The body goes to a
    /// temporary file beside the destination and only replaces it once the
    /// status and the optional SHA-1 check pass, so a failed download never
    /// touches an existing file. Returns the number of bytes written.
    pub async fn download_to_file(
        &self,
        url: &str,
        destination: &Path,
        expected_sha1: Option<&str>,
    ) -> Result<u64, NetworkingError> {
        if self.config.trace_requests {
            trace!(url, destination = %destination.display(), "Downloading");
        }

        let mut response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkingError::Status {
                url: url.to_string(),
                status,
            });
        }

        let io_error = |source| NetworkingError::Io {
            path: destination.to_path_buf(),
            source,
        };

        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Removed on drop unless persisted
        let staging = NamedTempFile::new_in(parent).map_err(io_error)?;
        let mut file = tokio::fs::File::from_std(staging.reopen().map_err(io_error)?);
        let mut hasher = Sha1::new();
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await? {
            hasher.update(&chunk);
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_error)?;
        drop(file);

        if let Some(expected) = expected_sha1 {
            let actual = to_hex(&hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(NetworkingError::ChecksumMismatch {
                    url: url.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        staging
            .persist(destination)
            .map_err(|e| io_error(e.error))?;
        Ok(written)
    }

    /// Run `worker` once per item on the bounded pool and wait for all of them.
    /// Results come back in input order.
    pub async fn run_batch<T, R, F, Fut>(
        &self,
        items: Vec<T>,
        worker: F,
    ) -> Result<Vec<R>, NetworkingError>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        trace!(items = items.len(), "Starting batch");

        let worker = Arc::new(worker);
        let mut tasks = Vec::with_capacity(items.len());

        for item in items {
            let semaphore = self.semaphore.clone();
            let worker = worker.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                Ok::<R, NetworkingError>(worker(item).await)
            }));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for task in tasks {
            results.push(task.await??);
        }

        trace!(results = results.len(), "Batch complete");
        Ok(results)
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}

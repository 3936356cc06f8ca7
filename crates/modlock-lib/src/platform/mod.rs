use std::sync::OnceLock;
use thiserror::Error;

/// System resource detection errors
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Failed to detect CPU cores: {reason}")]
    CpuDetectionFailed { reason: String },
}

/// System resource information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemResources {
    /// Number of logical CPU cores available to this process
    pub cpu_cores: u32,
}

impl SystemResources {
    /// Detect current system resources
    pub fn detect() -> Result<Self, PlatformError> {
        let cpu_cores = std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .map_err(|e| PlatformError::CpuDetectionFailed {
                reason: e.to_string(),
            })?;

        Ok(Self { cpu_cores })
    }

    /// Worker count for a batch: one per core, capped by the user's `--cpu-jobs`.
    /// Never returns zero.
    pub fn calculate_optimal_jobs(&self, max_jobs: Option<u32>) -> u32 {
        let jobs = match max_jobs {
            Some(max) => self.cpu_cores.min(max),
            None => self.cpu_cores,
        };

        tracing::trace!(
            cpu_cores = self.cpu_cores,
            ?max_jobs,
            jobs = jobs.max(1),
            "Calculated worker count"
        );

        jobs.max(1)
    }
}

static SYSTEM_RESOURCES: OnceLock<SystemResources> = OnceLock::new();

/// Cached system resources; falls back to a single core if detection fails
pub fn system_resources() -> &'static SystemResources {
    SYSTEM_RESOURCES.get_or_init(|| {
        SystemResources::detect().unwrap_or_else(|e| {
            tracing::warn!("{e}; assuming a single core");
            SystemResources { cpu_cores: 1 }
        })
    })
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}

//! Dependency expansion
//!
//! Every mod of the manifest is resolved concurrently and its required
//! dependencies collected. Only one level is expanded: dependencies of
//! dependencies are not looked up.

use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info};

use super::model::{Downloadable, Environment, Mod};
use crate::api::{Registries, RegistryError};
use crate::display::PhaseProgress;
use crate::networking::{NetworkingError, NetworkingManager};

#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("Failed to resolve dependencies of mod {mod_id}: {source}")]
    ResolutionFailed {
        mod_id: String,
        #[source]
        source: RegistryError,
    },

    #[error(transparent)]
    Networking(#[from] NetworkingError),
}

/// Outcome of one expansion pass
#[derive(Debug, Clone, Default)]
pub struct DependencyResolution {
    /// Input mods with their file lookups cached
    pub mods: BTreeSet<Mod>,
    /// Required dependencies not already in the initial downloadable set
    pub added: BTreeSet<Mod>,
}

impl DependencyResolution {
    /// `initial` with resolved mods swapped in, plus every added dependency
    pub fn downloadables(&self, initial: &BTreeSet<Downloadable>) -> BTreeSet<Downloadable> {
        let mut all = initial.clone();
        for m in &self.mods {
            all.replace(Downloadable::Mod(m.clone()));
        }
        all.extend(self.added.iter().cloned().map(Downloadable::Mod));
        all
    }
}

/// Resolve `mods` against their registries and collect required dependencies
/// that are not part of `initial`. The first failure (in mod order) aborts.
pub async fn resolve_dependencies(
    networking: &NetworkingManager,
    registries: &Registries,
    environment: &Environment,
    mods: &BTreeSet<Mod>,
    initial: &BTreeSet<Downloadable>,
    progress: &PhaseProgress,
) -> Result<DependencyResolution, DependencyError> {
    info!(mods = mods.len(), "Resolving dependencies");

    let worker = {
        let registries = registries.clone();
        let environment = environment.clone();
        let progress = progress.clone();
        move |mut m: Mod| {
            let registries = registries.clone();
            let environment = environment.clone();
            let progress = progress.clone();
            async move {
                let client = registries.client(m.registry()).clone();
                let result = m
                    .resolve_file(client.as_ref(), &environment)
                    .await
                    .map(|_| ())
                    .and_then(|()| m.dependencies());

                match result {
                    Ok(dependencies) => {
                        debug!(mod_id = %m.id(), count = dependencies.len(), "Dependencies read");
                        progress.ok();
                        Ok((m, dependencies))
                    }
                    Err(source) => {
                        progress.failed();
                        Err(DependencyError::ResolutionFailed {
                            mod_id: m.id().to_string(),
                            source,
                        })
                    }
                }
            }
        }
    };

    let results = networking
        .run_batch(mods.iter().cloned().collect(), worker)
        .await?;

    let mut resolution = DependencyResolution::default();
    for result in results {
        let (m, dependencies) = result?;
        resolution.mods.insert(m);
        resolution.added.extend(
            dependencies
                .into_iter()
                .filter(|dep| !initial.contains(&Downloadable::Mod(dep.clone()))),
        );
    }

    info!(added = resolution.added.len(), "Dependencies resolved");
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    include!("resolver.test.rs");
}

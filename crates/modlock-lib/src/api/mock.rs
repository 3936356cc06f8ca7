//! Canned registry for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ModMetadata, RegistryClient, RegistryError, RegistryFuture, ResolvedFile, SearchHit};
use crate::modpack::{Environment, Registry};

/// Registry client answering from fixed maps. Unknown ids are `NotFound`.
#[derive(Debug)]
pub struct MockRegistryClient {
    registry: Registry,
    metadata: HashMap<String, Result<ModMetadata, RegistryError>>,
    files: HashMap<String, Result<ResolvedFile, RegistryError>>,
    searches: HashMap<String, Result<Vec<SearchHit>, RegistryError>>,
    metadata_calls: AtomicUsize,
    file_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

impl MockRegistryClient {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            metadata: HashMap::new(),
            files: HashMap::new(),
            searches: HashMap::new(),
            metadata_calls: AtomicUsize::new(0),
            file_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_metadata(mut self, mod_id: &str, metadata: ModMetadata) -> Self {
        self.metadata.insert(mod_id.to_string(), Ok(metadata));
        self
    }

    pub fn with_metadata_failure(mut self, mod_id: &str, error: RegistryError) -> Self {
        self.metadata.insert(mod_id.to_string(), Err(error));
        self
    }

    /// Answer every file lookup for `mod_id` with `file`, whatever the hint
    pub fn with_file(mut self, mod_id: &str, file: ResolvedFile) -> Self {
        self.files.insert(mod_id.to_string(), Ok(file));
        self
    }

    pub fn with_file_failure(mut self, mod_id: &str, error: RegistryError) -> Self {
        self.files.insert(mod_id.to_string(), Err(error));
        self
    }

    /// Unknown keywords find nothing
    pub fn with_search(mut self, keyword: &str, hits: Vec<SearchHit>) -> Self {
        self.searches.insert(keyword.to_string(), Ok(hits));
        self
    }

    pub fn with_search_failure(mut self, keyword: &str, error: RegistryError) -> Self {
        self.searches.insert(keyword.to_string(), Err(error));
        self
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn file_calls(&self) -> usize {
        self.file_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

impl RegistryClient for MockRegistryClient {
    fn registry(&self) -> Registry {
        self.registry
    }

    fn metadata<'a>(&'a self, mod_id: &'a str) -> RegistryFuture<'a, ModMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        let answer = self.metadata.get(mod_id).cloned().unwrap_or_else(|| {
            Err(RegistryError::NotFound {
                mod_id: mod_id.to_string(),
                environment: "any".to_string(),
            })
        });
        Box::pin(async move { answer })
    }

    fn latest_compatible_file<'a>(
        &'a self,
        mod_id: &'a str,
        environment: &'a Environment,
        _version_hint: Option<&'a str>,
    ) -> RegistryFuture<'a, ResolvedFile> {
        self.file_calls.fetch_add(1, Ordering::SeqCst);
        let answer = self.files.get(mod_id).cloned().unwrap_or_else(|| {
            Err(RegistryError::NotFound {
                mod_id: mod_id.to_string(),
                environment: environment.to_string(),
            })
        });
        Box::pin(async move { answer })
    }

    fn search<'a>(
        &'a self,
        keyword: &'a str,
        _environment: Option<&'a Environment>,
    ) -> RegistryFuture<'a, Vec<SearchHit>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .searches
            .get(keyword)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { answer })
    }
}

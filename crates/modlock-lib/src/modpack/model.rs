//! Build data model: identities, per-mod resolution state and the result
//! types the pipeline stages hand to each other.

use clap::ValueEnum;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::{ModMetadata, RegistryClient, RegistryError, ResolvedFile};
use crate::modpack::Statement;

/// Remote registry a mod is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Registry {
    CurseForge,
    Modrinth,
}

impl Registry {
    /// Integer tokens are CurseForge ids, anything else is a Modrinth slug
    pub fn route(token: &str) -> Self {
        if token.parse::<i64>().is_ok() {
            Registry::CurseForge
        } else {
            Registry::Modrinth
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Registry::CurseForge => "curseforge",
            Registry::Modrinth => "modrinth",
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mod loader an installation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModLoader {
    Fabric,
    Forge,
    Quilt,
    #[value(name = "neoforge", alias = "neo-forge")]
    NeoForge,
}

impl ModLoader {
    /// Lower-case name as Modrinth lists it under `loaders`
    pub fn as_str(&self) -> &'static str {
        match self {
            ModLoader::Fabric => "fabric",
            ModLoader::Forge => "forge",
            ModLoader::Quilt => "quilt",
            ModLoader::NeoForge => "neoforge",
        }
    }

    /// Name as CurseForge lists it among a file's `gameVersions`
    pub fn curseforge_name(&self) -> &'static str {
        match self {
            ModLoader::Fabric => "Fabric",
            ModLoader::Forge => "Forge",
            ModLoader::Quilt => "Quilt",
            ModLoader::NeoForge => "NeoForge",
        }
    }

    /// `modLoaderType` filter value of the CurseForge search endpoint
    pub fn curseforge_type(&self) -> u8 {
        match self {
            ModLoader::Forge => 1,
            ModLoader::Fabric => 4,
            ModLoader::Quilt => 5,
            ModLoader::NeoForge => 6,
        }
    }
}

impl fmt::Display for ModLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.curseforge_name())
    }
}

crate::impl_fromstr_for_value_enum!(ModLoader, "unknown mod loader");

/// Target game version and loader of a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub game_version: String,
    pub loader: ModLoader,
}

impl Environment {
    pub fn new(game_version: impl Into<String>, loader: ModLoader) -> Self {
        Self {
            game_version: game_version.into(),
            loader,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.game_version, self.loader)
    }
}

/// Environment plus the mods directory a build writes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    pub environment: Environment,
    pub mods_dir: PathBuf,
}

impl InstallTarget {
    pub fn new(environment: Environment, mods_dir: impl Into<PathBuf>) -> Self {
        Self {
            environment,
            mods_dir: mods_dir.into(),
        }
    }

    /// Game installation root, the parent of the mods directory
    pub fn install_root(&self) -> Option<&Path> {
        self.mods_dir
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }
}

/// Registry plus identifier; the identity of a [`Mod`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModId {
    pub registry: Registry,
    pub id: String,
}

impl ModId {
    pub fn new(registry: Registry, id: impl Into<String>) -> Self {
        Self {
            registry,
            id: id.into(),
        }
    }

    /// Route a manifest token to its registry
    pub fn parse(token: &str) -> Self {
        Self::new(Registry::route(token), token)
    }
}

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// What has been fetched for a mod so far; `None` means not fetched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModState {
    pub metadata: Option<ModMetadata>,
    pub file: Option<ResolvedFile>,
}

/// A mod reference. Equality, hashing and ordering only look at [`ModId`].
#[derive(Debug, Clone)]
pub struct Mod {
    id: ModId,
    version_hint: Option<String>,
    state: ModState,
}

impl Mod {
    pub fn new(id: ModId, version_hint: Option<String>) -> Self {
        Self {
            id,
            version_hint,
            state: ModState::default(),
        }
    }

    /// Mod with its state already filled, e.g. from a previous lookup
    pub fn with_state(id: ModId, version_hint: Option<String>, state: ModState) -> Self {
        Self {
            id,
            version_hint,
            state,
        }
    }

    pub fn id(&self) -> &ModId {
        &self.id
    }

    pub fn registry(&self) -> Registry {
        self.id.registry
    }

    pub fn version_hint(&self) -> Option<&str> {
        self.version_hint.as_deref()
    }

    pub fn state(&self) -> &ModState {
        &self.state
    }

    /// Fetch metadata unless already present
    pub async fn resolve_metadata(
        &mut self,
        client: &dyn RegistryClient,
    ) -> Result<&ModMetadata, RegistryError> {
        let metadata = match self.state.metadata.take() {
            Some(metadata) => metadata,
            None => client.metadata(&self.id.id).await?,
        };
        Ok(self.state.metadata.insert(metadata))
    }

    /// Pick the file for `environment` unless already picked
    pub async fn resolve_file(
        &mut self,
        client: &dyn RegistryClient,
        environment: &Environment,
    ) -> Result<&ResolvedFile, RegistryError> {
        let file = match self.state.file.take() {
            Some(file) => file,
            None => {
                client
                    .latest_compatible_file(&self.id.id, environment, self.version_hint.as_deref())
                    .await?
            }
        };
        Ok(self.state.file.insert(file))
    }

    fn resolved_file(&self) -> Result<&ResolvedFile, RegistryError> {
        self.state
            .file
            .as_ref()
            .ok_or_else(|| RegistryError::Unresolved {
                mod_id: self.id.to_string(),
            })
    }

    /// Required dependencies of the resolved file, in this mod's registry
    pub fn dependencies(&self) -> Result<BTreeSet<Mod>, RegistryError> {
        Ok(self
            .resolved_file()?
            .dependencies
            .iter()
            .map(|dep| Mod::new(ModId::new(self.id.registry, dep.as_str()), None))
            .collect())
    }

    pub fn download_url(&self) -> Result<&str, RegistryError> {
        self.resolved_file()?
            .download_url
            .as_deref()
            .ok_or_else(|| RegistryError::Unavailable {
                mod_id: self.id.to_string(),
            })
    }

    /// File id or version id of the resolved file
    pub fn version_id(&self) -> Option<&str> {
        self.state.file.as_ref().map(|file| file.version_id.as_str())
    }

    /// Best name known so far: registry name, then file name, then the id
    pub fn display_name(&self) -> &str {
        self.state
            .metadata
            .as_ref()
            .map(|metadata| metadata.name.as_str())
            .or_else(|| {
                self.state
                    .file
                    .as_ref()
                    .map(|file| file.display_name.as_str())
            })
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.id.id)
    }
}

impl PartialEq for Mod {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Mod {}

impl Hash for Mod {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Mod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Mod {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Mod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Raw download reference. Identity is the URL string alone.
#[derive(Debug, Clone)]
pub struct Url {
    url: String,
    owner: Option<String>,
}

impl Url {
    pub fn new(url: impl Into<String>, owner: Option<String>) -> Self {
        Self {
            url: url.into(),
            owner,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Mod this URL was declared for, if any
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

impl PartialEq for Url {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Url {}

impl Hash for Url {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl PartialOrd for Url {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Url {
    fn cmp(&self, other: &Self) -> Ordering {
        self.url.cmp(&other.url)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{} for mod {}", self.url, owner),
            None => f.write_str(&self.url),
        }
    }
}

/// Anything the download stage can fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Downloadable {
    Mod(Mod),
    Url(Url),
}

impl Downloadable {
    /// Key used to match failures against successes: the mod id, or for a raw
    /// URL its owning mod id when declared and the URL otherwise
    pub fn identifier(&self) -> String {
        match self {
            Downloadable::Mod(m) => m.id().to_string(),
            Downloadable::Url(url) => url
                .owner()
                .map(str::to_string)
                .unwrap_or_else(|| url.as_str().to_string()),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Downloadable::Mod(m) => m.display_name().to_string(),
            Downloadable::Url(url) => url.to_string(),
        }
    }
}

impl From<Mod> for Downloadable {
    fn from(value: Mod) -> Self {
        Downloadable::Mod(value)
    }
}

impl From<Url> for Downloadable {
    fn from(value: Url) -> Self {
        Downloadable::Url(value)
    }
}

/// A download that exhausted its attempts, or could not even find its URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadError {
    pub identifier: String,
    pub name: String,
    pub reason: String,
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    Downloaded(Downloadable),
    Failed(DownloadError),
}

impl DownloadResult {
    pub fn identifier(&self) -> String {
        match self {
            DownloadResult::Downloaded(item) => item.identifier(),
            DownloadResult::Failed(error) => error.identifier.clone(),
        }
    }
}

/// A statement whose check did not pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRunError {
    /// `"<keyword> <body>"` of the rejected statement
    pub statement: String,
    pub reason: String,
}

impl fmt::Display for StatementRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.statement)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementRunResult {
    Applied(Statement),
    Rejected(StatementRunError),
}

#[cfg(test)]
mod tests {
    include!("model.test.rs");
}

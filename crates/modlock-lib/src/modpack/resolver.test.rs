use super::*;
use crate::api::{MockRegistryClient, ResolvedFile};
use crate::modpack::{ModId, ModLoader, Registry, Url};
use crate::networking::NetworkingConfig;
use std::sync::Arc;

fn file(version_id: &str, dependencies: &[&str]) -> ResolvedFile {
    ResolvedFile {
        version_id: version_id.to_string(),
        display_name: format!("{version_id}.jar"),
        download_url: Some(format!("https://cdn.example/{version_id}.jar")),
        dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        sha1: None,
    }
}

fn modrinth(id: &str) -> Mod {
    Mod::new(ModId::new(Registry::Modrinth, id), None)
}

async fn networking() -> NetworkingManager {
    NetworkingManager::new(NetworkingConfig {
        max_jobs: Some(2),
        ..Default::default()
    })
    .await
    .unwrap()
}

fn registries(modrinth: MockRegistryClient) -> (Registries, Arc<MockRegistryClient>) {
    let modrinth = Arc::new(modrinth);
    let registries = Registries::new(
        Arc::new(MockRegistryClient::new(Registry::CurseForge)),
        modrinth.clone(),
    );
    (registries, modrinth)
}

fn environment() -> Environment {
    Environment::new("1.20.1", ModLoader::Fabric)
}

#[tokio::test]
async fn test_added_excludes_mods_already_requested() {
    let (registries, _) = registries(
        MockRegistryClient::new(Registry::Modrinth)
            .with_file("sodium-extra", file("se1", &["sodium", "fabric-api"]))
            .with_file("sodium", file("s1", &[])),
    );
    let mods: BTreeSet<Mod> = [modrinth("sodium-extra"), modrinth("sodium")].into();
    let initial: BTreeSet<Downloadable> = mods.iter().cloned().map(Downloadable::Mod).collect();

    let resolution = resolve_dependencies(
        &networking().await,
        &registries,
        &environment(),
        &mods,
        &initial,
        &PhaseProgress::hidden(),
    )
    .await
    .unwrap();

    let added: Vec<_> = resolution.added.iter().map(|m| m.id().id.clone()).collect();
    assert_eq!(added, vec!["fabric-api"]);
    assert!(resolution.mods.iter().all(|m| m.version_id().is_some()));
}

#[tokio::test]
async fn test_only_one_level_is_expanded() {
    let (registries, client) = registries(
        MockRegistryClient::new(Registry::Modrinth)
            .with_file("a", file("a1", &["b"]))
            .with_file("b", file("b1", &["c"])),
    );
    let mods: BTreeSet<Mod> = [modrinth("a")].into();
    let initial: BTreeSet<Downloadable> = mods.iter().cloned().map(Downloadable::Mod).collect();

    let resolution = resolve_dependencies(
        &networking().await,
        &registries,
        &environment(),
        &mods,
        &initial,
        &PhaseProgress::hidden(),
    )
    .await
    .unwrap();

    assert_eq!(resolution.added, BTreeSet::from([modrinth("b")]));
    assert_eq!(client.file_calls(), 1);
}

#[tokio::test]
async fn test_any_failure_aborts_with_mod_name() {
    let (registries, _) = registries(
        MockRegistryClient::new(Registry::Modrinth).with_file("sodium", file("s1", &[])),
    );
    let mods: BTreeSet<Mod> = [modrinth("sodium"), modrinth("missing")].into();
    let initial: BTreeSet<Downloadable> = mods.iter().cloned().map(Downloadable::Mod).collect();
    let progress = PhaseProgress::hidden();

    let error = resolve_dependencies(
        &networking().await,
        &registries,
        &environment(),
        &mods,
        &initial,
        &progress,
    )
    .await
    .unwrap_err();

    match error {
        DependencyError::ResolutionFailed { mod_id, source } => {
            assert_eq!(mod_id, "missing");
            assert!(matches!(source, RegistryError::NotFound { .. }));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(progress.ok_count(), 1);
    assert_eq!(progress.failed_count(), 1);
}

#[tokio::test]
async fn test_resolving_resolved_mods_is_idempotent_without_io() {
    let (registries, client) = registries(
        MockRegistryClient::new(Registry::Modrinth)
            .with_file("iris", file("i1", &["sodium"])),
    );
    let networking = networking().await;
    let mods: BTreeSet<Mod> = [modrinth("iris")].into();
    let initial: BTreeSet<Downloadable> = mods.iter().cloned().map(Downloadable::Mod).collect();

    let first = resolve_dependencies(
        &networking,
        &registries,
        &environment(),
        &mods,
        &initial,
        &PhaseProgress::hidden(),
    )
    .await
    .unwrap();
    let second = resolve_dependencies(
        &networking,
        &registries,
        &environment(),
        &first.mods,
        &initial,
        &PhaseProgress::hidden(),
    )
    .await
    .unwrap();

    assert_eq!(first.added, second.added);
    assert_eq!(client.file_calls(), 1);
}

#[tokio::test]
async fn test_dependency_owned_by_url_is_still_added() {
    let (registries, _) = registries(
        MockRegistryClient::new(Registry::Modrinth).with_file("iris", file("i1", &["sodium"])),
    );
    let mods: BTreeSet<Mod> = [modrinth("iris")].into();
    let mut initial: BTreeSet<Downloadable> =
        mods.iter().cloned().map(Downloadable::Mod).collect();
    initial.insert(Downloadable::Url(Url::new(
        "https://cdn.example/sodium.jar",
        Some("sodium".to_string()),
    )));

    let resolution = resolve_dependencies(
        &networking().await,
        &registries,
        &environment(),
        &mods,
        &initial,
        &PhaseProgress::hidden(),
    )
    .await
    .unwrap();

    assert_eq!(resolution.added, BTreeSet::from([modrinth("sodium")]));
}

#[test]
fn test_downloadables_swap_in_resolved_mods() {
    let resolved = Mod::with_state(
        ModId::new(Registry::Modrinth, "iris"),
        None,
        crate::modpack::ModState {
            metadata: None,
            file: Some(file("i1", &[])),
        },
    );
    let initial: BTreeSet<Downloadable> = [Downloadable::Mod(modrinth("iris"))].into();
    let resolution = DependencyResolution {
        mods: [resolved].into(),
        added: [modrinth("sodium")].into(),
    };

    let all = resolution.downloadables(&initial);

    assert_eq!(all.len(), 2);
    let iris = all
        .iter()
        .find_map(|d| match d {
            Downloadable::Mod(m) if m.id().id == "iris" => Some(m),
            _ => None,
        })
        .unwrap();
    assert_eq!(iris.version_id(), Some("i1"));
}

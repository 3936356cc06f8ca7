use super::*;
use crate::api::mock::MockRegistryClient;
use crate::api::{ModMetadata, RegistryError, ResolvedFile, SearchHit};
use crate::application::session_mocks::MockInteractiveProvider;
use crate::modpack::{InstallTarget, ModLoader, Registry};
use crate::networking::{NetworkingConfig, RetryPolicy};
use std::time::Duration;

fn registries(curseforge: MockRegistryClient, modrinth: MockRegistryClient) -> Registries {
    Registries::new(Arc::new(curseforge), Arc::new(modrinth))
}

fn environment() -> Environment {
    Environment::new("1.20.1", ModLoader::Fabric)
}

#[tokio::test]
async fn test_info_routes_slugs_to_modrinth() {
    let modrinth = Arc::new(
        MockRegistryClient::new(Registry::Modrinth)
            .with_metadata(
                "sodium",
                ModMetadata {
                    name: "Sodium".to_string(),
                    downloads: Some(42),
                    ..Default::default()
                },
            )
            .with_file(
                "sodium",
                ResolvedFile {
                    version_id: "abc".to_string(),
                    download_url: Some("https://cdn.example/sodium.jar".to_string()),
                    dependencies: vec!["fabric-api".to_string()],
                    ..Default::default()
                },
            ),
    );
    let curseforge = Arc::new(MockRegistryClient::new(Registry::CurseForge));
    let registries = Registries::new(curseforge.clone(), modrinth.clone());

    handle_info(&registries, Some(&environment()), "sodium", None)
        .await
        .unwrap();

    assert_eq!(modrinth.metadata_calls(), 1);
    assert_eq!(modrinth.file_calls(), 1);
    assert_eq!(curseforge.metadata_calls(), 0);
}

#[tokio::test]
async fn test_info_failures_are_reported_not_returned() {
    let curseforge = MockRegistryClient::new(Registry::CurseForge)
        .with_metadata_failure(
            "238222",
            RegistryError::RequestFailed {
                url: "https://api.curseforge.com/v1/mods/238222".to_string(),
                attempts: 3,
                reason: "HTTP 503".to_string(),
            },
        )
        .with_file_failure(
            "238222",
            RegistryError::RequestFailed {
                url: "https://api.curseforge.com/v1/mods/238222".to_string(),
                attempts: 3,
                reason: "HTTP 503".to_string(),
            },
        );
    let registries = registries(curseforge, MockRegistryClient::new(Registry::Modrinth));

    assert!(
        handle_info(&registries, Some(&environment()), "238222", Some("4567".to_string()))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_info_without_environment_skips_file_lookup() {
    let modrinth = Arc::new(MockRegistryClient::new(Registry::Modrinth));
    let registries = Registries::new(
        Arc::new(MockRegistryClient::new(Registry::CurseForge)),
        modrinth.clone(),
    );

    handle_info(&registries, None, "lithium", None).await.unwrap();

    assert_eq!(modrinth.metadata_calls(), 1);
    assert_eq!(modrinth.file_calls(), 0);
}

#[tokio::test]
async fn test_cancelled_build_is_not_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let mods_dir = tmp.path().join("mods");
    std::fs::create_dir_all(&mods_dir).unwrap();
    std::fs::write(mods_dir.join("old.jar"), "old").unwrap();
    let manifest = tmp.path().join("pack.mods");
    std::fs::write(&manifest, "game 1.20.1\n").unwrap();

    let networking = NetworkingManager::new(NetworkingConfig::default())
        .await
        .unwrap();
    let pipeline = BuildPipeline::new(
        Arc::new(networking),
        registries(
            MockRegistryClient::new(Registry::CurseForge),
            MockRegistryClient::new(Registry::Modrinth),
        ),
        InstallTarget::new(environment(), &mods_dir),
        RetryPolicy::new(1, Duration::from_millis(1)),
    )
    .with_progress(false);
    let declined = MockInteractiveProvider::new().with_confirm(false);

    handle_build(&pipeline, &manifest, &declined).await.unwrap();

    assert_eq!(declined.get_confirm_calls().len(), 1);
    assert!(mods_dir.join("old.jar").exists());
    assert!(!lock_file_path(&manifest).exists());
}

#[tokio::test]
async fn test_build_errors_propagate() {
    let tmp = tempfile::tempdir().unwrap();
    let networking = NetworkingManager::new(NetworkingConfig::default())
        .await
        .unwrap();
    let pipeline = BuildPipeline::new(
        Arc::new(networking),
        registries(
            MockRegistryClient::new(Registry::CurseForge),
            MockRegistryClient::new(Registry::Modrinth),
        ),
        InstallTarget::new(environment(), tmp.path()),
        RetryPolicy::new(1, Duration::from_millis(1)),
    )
    .with_progress(false);

    let result = handle_build(
        &pipeline,
        &tmp.path().join("absent.mods"),
        &MockInteractiveProvider::new(),
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_search_covers_both_registries_despite_failures() {
    let curseforge = Arc::new(MockRegistryClient::new(Registry::CurseForge).with_search_failure(
        "sodium",
        RegistryError::MissingApiKey,
    ));
    let modrinth = Arc::new(MockRegistryClient::new(Registry::Modrinth).with_search(
        "sodium",
        vec![SearchHit {
            mod_id: "sodium".to_string(),
            name: "Sodium".to_string(),
            downloads: Some(42),
            last_updated: Some("2024-03-01T10:00:00Z".to_string()),
        }],
    ));
    let registries = Registries::new(curseforge.clone(), modrinth.clone());

    handle_search(&registries, Some(&environment()), "sodium")
        .await
        .unwrap();

    assert_eq!(curseforge.search_calls(), 1);
    assert_eq!(modrinth.search_calls(), 1);
}

#[test]
fn test_search_line_trims_timestamp() {
    let hit = SearchHit {
        mod_id: "394468".to_string(),
        name: "Sodium".to_string(),
        downloads: Some(1234),
        last_updated: Some("2024-03-01T10:00:00Z".to_string()),
    };
    assert_eq!(
        search_line(&hit),
        "Sodium (394468), 1234 downloads, updated 2024-03-01"
    );

    let bare = SearchHit {
        mod_id: "x".to_string(),
        name: "X".to_string(),
        ..Default::default()
    };
    assert_eq!(search_line(&bare), "X (x)");
}

use super::*;
use crate::api::{MockRegistryClient, ModMetadata, ResolvedFile};
use crate::modpack::{Mod, ModId, ModLoader, Registry, Url};
use crate::networking::NetworkingConfig;
use mockito::Server;
use std::time::Duration;
use tempfile::TempDir;

fn jar(version_id: &str, download_url: Option<String>, sha1: Option<&str>) -> ResolvedFile {
    ResolvedFile {
        version_id: version_id.to_string(),
        display_name: format!("{version_id}.jar"),
        download_url,
        dependencies: Vec::new(),
        sha1: sha1.map(str::to_string),
    }
}

fn modrinth(id: &str) -> Downloadable {
    Downloadable::Mod(Mod::new(ModId::new(Registry::Modrinth, id), None))
}

fn url(url: String, owner: Option<&str>) -> Downloadable {
    Downloadable::Url(Url::new(url, owner.map(str::to_string)))
}

async fn orchestrator(modrinth: MockRegistryClient, dir: &TempDir) -> DownloadOrchestrator {
    let networking = NetworkingManager::new(NetworkingConfig {
        max_jobs: Some(4),
        timeout_seconds: 5,
        trace_requests: false,
    })
    .await
    .unwrap();
    let registries = Registries::new(
        Arc::new(MockRegistryClient::new(Registry::CurseForge)),
        Arc::new(modrinth),
    );

    DownloadOrchestrator::new(
        Arc::new(networking),
        registries,
        Environment::new("1.20.1", ModLoader::Fabric),
        dir.path(),
        RetryPolicy::new(2, Duration::from_millis(5)),
    )
}

fn failures(results: &[DownloadResult]) -> Vec<&DownloadError> {
    results
        .iter()
        .filter_map(|r| match r {
            DownloadResult::Failed(e) => Some(e),
            DownloadResult::Downloaded(_) => None,
        })
        .collect()
}

#[tokio::test]
async fn test_mods_and_urls_land_in_target_dir() {
    let mut server = Server::new_async().await;
    let _mock1 = server
        .mock("GET", "/data/sodium-0.5.3.jar")
        .with_body("sodium")
        .create_async()
        .await;
    let _mock2 = server
        .mock("GET", "/files/extra%20lib.jar")
        .with_body("lib")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = MockRegistryClient::new(Registry::Modrinth)
        .with_file(
            "sodium",
            jar("s1", Some(format!("{}/data/sodium-0.5.3.jar", server.url())), None),
        )
        .with_metadata(
            "sodium",
            ModMetadata {
                name: "Sodium".to_string(),
                ..Default::default()
            },
        );
    let orchestrator = orchestrator(client, &dir).await;

    let items = BTreeSet::from([
        modrinth("sodium"),
        url(format!("{}/files/extra%20lib.jar?token=1", server.url()), None),
    ]);
    let progress = PhaseProgress::hidden();
    let results = orchestrator.download_all(items, &progress).await.unwrap();

    assert_eq!(results.len(), 2);
    assert!(failures(&results).is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("sodium-0.5.3.jar")).unwrap(),
        "sodium"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("extra lib.jar")).unwrap(),
        "lib"
    );
    assert_eq!(progress.ok_count(), 2);

    let sodium = results
        .iter()
        .find_map(|r| match r {
            DownloadResult::Downloaded(Downloadable::Mod(m)) => Some(m),
            _ => None,
        })
        .unwrap();
    assert_eq!(sodium.display_name(), "Sodium");
    assert_eq!(sodium.version_id(), Some("s1"));
}

#[tokio::test]
async fn test_every_item_yields_exactly_one_result() {
    let mut server = Server::new_async().await;
    let _mock3 = server
        .mock("GET", "/ok.jar")
        .with_body("x")
        .create_async()
        .await;
    let _mock4 = server
        .mock("GET", "/gone.jar")
        .with_status(404)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = MockRegistryClient::new(Registry::Modrinth)
        .with_file("nourl", jar("n1", None, None))
        .with_file("fine", jar("f1", Some(format!("{}/ok.jar", server.url())), None));
    let orchestrator = orchestrator(client, &dir).await;

    let items = BTreeSet::from([
        modrinth("fine"),
        modrinth("nourl"),
        modrinth("unknown"),
        url(format!("{}/gone.jar", server.url()), None),
    ]);
    let results = orchestrator
        .download_all(items, &PhaseProgress::hidden())
        .await
        .unwrap();

    assert_eq!(results.len(), 4);
    let mut failed: Vec<_> = failures(&results)
        .into_iter()
        .map(|e| e.identifier.clone())
        .collect();
    failed.sort();
    assert_eq!(
        failed,
        vec![format!("{}/gone.jar", server.url()), "nourl".to_string(), "unknown".to_string()]
    );
}

#[tokio::test]
async fn test_failed_download_is_retried_then_reported() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/flaky.jar")
        .with_status(503)
        .expect(2)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator(MockRegistryClient::new(Registry::Modrinth), &dir).await;

    let items = BTreeSet::from([url(format!("{}/flaky.jar", server.url()), Some("lib"))]);
    let results = orchestrator
        .download_all(items, &PhaseProgress::hidden())
        .await
        .unwrap();

    mock.assert_async().await;
    let errors = failures(&results);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].identifier, "lib");
    assert!(errors[0].name.ends_with("flaky.jar for mod lib"));
    assert!(errors[0].reason.contains("2 attempt"));
    assert!(!dir.path().join("flaky.jar").exists());
}

#[tokio::test]
async fn test_checksum_mismatch_fails_the_mod() {
    let mut server = Server::new_async().await;
    let _mock5 = server
        .mock("GET", "/iris.jar")
        .with_body("abc")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = MockRegistryClient::new(Registry::Modrinth).with_file(
        "iris",
        jar(
            "i1",
            Some(format!("{}/iris.jar", server.url())),
            Some("0000000000000000000000000000000000000000"),
        ),
    );
    let orchestrator = orchestrator(client, &dir).await;

    let results = orchestrator
        .download_all(BTreeSet::from([modrinth("iris")]), &PhaseProgress::hidden())
        .await
        .unwrap();

    assert_eq!(failures(&results).len(), 1);
    assert!(!dir.path().join("iris.jar").exists());
}

#[tokio::test]
async fn test_failure_shadowed_by_success_is_dropped() {
    let mut server = Server::new_async().await;
    let _mock6 = server
        .mock("GET", "/lithium.jar")
        .with_body("ok")
        .create_async()
        .await;
    let _mock7 = server
        .mock("GET", "/lithium-mirror.jar")
        .with_status(500)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = MockRegistryClient::new(Registry::Modrinth).with_file(
        "lithium",
        jar("l1", Some(format!("{}/lithium.jar", server.url())), None),
    );
    let orchestrator = orchestrator(client, &dir).await;

    let items = BTreeSet::from([
        modrinth("lithium"),
        url(format!("{}/lithium-mirror.jar", server.url()), Some("lithium")),
    ]);
    let results = orchestrator
        .download_all(items, &PhaseProgress::hidden())
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(failures(&results).is_empty());
}

#[tokio::test]
async fn test_failed_mirror_keeps_the_mod_file_sharing_its_name() {
    let mut server = Server::new_async().await;
    let _jar = server
        .mock("GET", "/a/lithium.jar")
        .with_body("lithium")
        .create_async()
        .await;
    let _mirror = server
        .mock("GET", "/b/lithium.jar")
        .with_status(404)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = MockRegistryClient::new(Registry::Modrinth).with_file(
        "lithium",
        jar("l1", Some(format!("{}/a/lithium.jar", server.url())), None),
    );
    let orchestrator = orchestrator(client, &dir).await;

    let items = BTreeSet::from([
        modrinth("lithium"),
        url(format!("{}/b/lithium.jar", server.url()), Some("lithium")),
    ]);
    let results = orchestrator
        .download_all(items, &PhaseProgress::hidden())
        .await
        .unwrap();

    assert!(failures(&results).is_empty());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("lithium.jar")).unwrap(),
        "lithium"
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_reconcile_keeps_unrelated_failures() {
    let results = vec![
        DownloadResult::Downloaded(modrinth("a")),
        DownloadResult::Failed(DownloadError {
            identifier: "a".to_string(),
            name: "A".to_string(),
            reason: "x".to_string(),
        }),
        DownloadResult::Failed(DownloadError {
            identifier: "b".to_string(),
            name: "B".to_string(),
            reason: "x".to_string(),
        }),
    ];

    let kept = reconcile(results);
    assert_eq!(kept.len(), 2);
    assert_eq!(failures(&kept)[0].identifier, "b");
}

#[test]
fn test_file_name_from_url() {
    assert_eq!(
        file_name_from_url("https://cdn.modrinth.com/data/AANobbMI/versions/x/sodium-fabric-0.5.3.jar"),
        Some("sodium-fabric-0.5.3.jar".to_string())
    );
    assert_eq!(
        file_name_from_url("https://edge.forgecdn.net/files/1/2/Mod%20Name%201.0.jar?x=1#frag"),
        Some("Mod Name 1.0.jar".to_string())
    );
    assert_eq!(file_name_from_url("https://example.com/"), None);
    assert_eq!(file_name_from_url("https://example.com"), None);
    assert_eq!(file_name_from_url("https://example.com/a/.."), None);
    assert_eq!(file_name_from_url("https://example.com/a%2Fb.jar"), None);
}

use super::*;
use crate::api::{MockRegistryClient, ModMetadata, RegistryError, ResolvedFile};
use crate::application::session_mocks::MockInteractiveProvider;
use crate::modpack::{Environment, ModLoader, Registry};
use crate::networking::NetworkingConfig;
use mockito::{Mock, Server, ServerGuard};
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    manifest: PathBuf,
    mods_dir: PathBuf,
}

impl Fixture {
    fn new(manifest: &str) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let mods_dir = tmp.path().join("game").join("mods");
        std::fs::create_dir_all(mods_dir.join("keep")).unwrap();
        std::fs::write(mods_dir.join("stale.jar"), "old").unwrap();

        let manifest_path = tmp.path().join("survival.mods");
        std::fs::write(&manifest_path, manifest).unwrap();

        Self {
            _tmp: tmp,
            manifest: manifest_path,
            mods_dir,
        }
    }

    fn lock_path(&self) -> PathBuf {
        lock_file_path(&self.manifest)
    }
}

fn jar(server: &ServerGuard, version_id: &str, dependencies: &[&str]) -> ResolvedFile {
    ResolvedFile {
        version_id: version_id.to_string(),
        display_name: format!("{version_id}.jar"),
        download_url: Some(format!("{}/files/{version_id}.jar", server.url())),
        dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
        sha1: None,
    }
}

fn metadata(name: &str) -> ModMetadata {
    ModMetadata {
        name: name.to_string(),
        ..Default::default()
    }
}

async fn pipeline(
    fixture: &Fixture,
    curseforge: MockRegistryClient,
    modrinth: MockRegistryClient,
) -> BuildPipeline {
    let networking = NetworkingManager::new(NetworkingConfig {
        max_jobs: Some(4),
        timeout_seconds: 5,
        trace_requests: false,
    })
    .await
    .unwrap();

    BuildPipeline::new(
        Arc::new(networking),
        Registries::new(Arc::new(curseforge), Arc::new(modrinth)),
        InstallTarget::new(
            Environment::new("1.20.1", ModLoader::Fabric),
            &fixture.mods_dir,
        ),
        RetryPolicy::new(2, Duration::from_millis(5)),
    )
    .with_config_source("test config")
    .with_progress(false)
}

async fn serve_jars(server: &mut ServerGuard, names: &[&str]) -> Vec<Mock> {
    let mut mocks = Vec::new();
    for name in names {
        let mock = server
            .mock("GET", format!("/files/{name}").as_str())
            .with_body(*name)
            .create_async()
            .await;
        mocks.push(mock);
    }
    mocks
}

fn completed(outcome: BuildOutcome) -> BuildReport {
    match outcome {
        BuildOutcome::Completed(report) => report,
        BuildOutcome::Cancelled => panic!("build was cancelled"),
    }
}

#[tokio::test]
async fn test_scenario_build_writes_mods_and_lock_file() {
    let mut server = Server::new_async().await;
    let _jars = serve_jars(&mut server, &["4567.jar", "x.jar"]).await;

    let fixture = Fixture::new(&format!(
        "game 1.20.1\nloader fabric\nmod 123456\ndownload {}/files/x.jar\n",
        server.url()
    ));
    let curseforge = MockRegistryClient::new(Registry::CurseForge)
        .with_file("123456", jar(&server, "4567", &[]))
        .with_metadata("123456", metadata("Example Mod"));
    let pipeline = pipeline(&fixture, curseforge, MockRegistryClient::new(Registry::Modrinth)).await;

    let report = completed(
        pipeline
            .run(&fixture.manifest, &MockInteractiveProvider::new().with_confirm(true))
            .await
            .unwrap(),
    );

    assert!(!report.replayed);
    assert!(report.lock_written);
    assert!(report.lock.is_clean());
    assert!(!fixture.mods_dir.join("stale.jar").exists());
    assert!(fixture.mods_dir.join("keep").is_dir());
    assert!(fixture.mods_dir.join("4567.jar").is_file());
    assert!(fixture.mods_dir.join("x.jar").is_file());
    assert_eq!(
        std::fs::read_to_string(fixture.lock_path()).unwrap(),
        format!(
            "game 1.20.1\nloader fabric\n\nmod 123456 Example Mod == 4567\n\ndownload {}/files/x.jar\n",
            server.url()
        )
    );
}

#[tokio::test]
async fn test_dependencies_are_downloaded_once() {
    let mut server = Server::new_async().await;
    let _jars = serve_jars(&mut server, &["iris1.jar", "sodium1.jar"]).await;

    let fixture = Fixture::new("mod iris\nmod sodium\nmod sodium\n");
    let modrinth = MockRegistryClient::new(Registry::Modrinth)
        .with_file("iris", jar(&server, "iris1", &["sodium"]))
        .with_file("sodium", jar(&server, "sodium1", &[]));
    let pipeline = pipeline(&fixture, MockRegistryClient::new(Registry::CurseForge), modrinth).await;

    let report = completed(
        pipeline
            .run(&fixture.manifest, &MockInteractiveProvider::new().with_confirm(true))
            .await
            .unwrap(),
    );

    let ids: Vec<_> = report
        .lock
        .resolved_mods
        .iter()
        .map(|m| m.id().id.as_str())
        .collect();
    assert_eq!(ids, vec!["iris", "sodium"]);
}

#[tokio::test]
async fn test_existing_lock_file_is_replayed_and_kept() {
    let mut server = Server::new_async().await;
    let _jars = serve_jars(&mut server, &["s1.jar"]).await;

    let fixture = Fixture::new("mod this-line-is-ignored\n");
    let lock_text = "mod sodium Sodium == s1\n";
    std::fs::write(fixture.lock_path(), lock_text).unwrap();

    let modrinth = Arc::new(
        MockRegistryClient::new(Registry::Modrinth).with_file("sodium", jar(&server, "s1", &["lithium"])),
    );
    let networking = NetworkingManager::new(NetworkingConfig::default())
        .await
        .unwrap();
    let pipeline = BuildPipeline::new(
        Arc::new(networking),
        Registries::new(
            Arc::new(MockRegistryClient::new(Registry::CurseForge)),
            modrinth.clone(),
        ),
        InstallTarget::new(Environment::new("1.20.1", ModLoader::Fabric), &fixture.mods_dir),
        RetryPolicy::new(1, Duration::ZERO),
    )
    .with_progress(false);

    let report = completed(
        pipeline
            .run(&fixture.manifest, &MockInteractiveProvider::new().with_confirm(true))
            .await
            .unwrap(),
    );

    assert!(report.replayed);
    assert!(!report.lock_written);
    assert_eq!(report.source, fixture.lock_path());
    // no dependency expansion on replay: only the download lookup happened
    assert_eq!(modrinth.file_calls(), 1);
    assert_eq!(report.lock.resolved_mods.len(), 1);
    assert_eq!(std::fs::read_to_string(fixture.lock_path()).unwrap(), lock_text);
    assert!(fixture.mods_dir.join("s1.jar").is_file());
}

#[tokio::test]
async fn test_dependency_failure_aborts_before_touching_anything() {
    let fixture = Fixture::new("mod sodium\nmod missing\n");
    let server = Server::new_async().await;
    let modrinth = MockRegistryClient::new(Registry::Modrinth)
        .with_file("sodium", jar(&server, "s1", &[]))
        .with_file_failure(
            "missing",
            RegistryError::RequestFailed {
                url: "https://api.modrinth.com/v2/project/missing/version".to_string(),
                attempts: 3,
                reason: "HTTP 500".to_string(),
            },
        );
    let pipeline = pipeline(&fixture, MockRegistryClient::new(Registry::CurseForge), modrinth).await;
    let interactive = MockInteractiveProvider::new();

    let error = pipeline.run(&fixture.manifest, &interactive).await.unwrap_err();

    match &error {
        BuildError::Dependencies { manifest, config, .. } => {
            assert_eq!(manifest, &fixture.manifest);
            assert_eq!(config, "test config");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(error.to_string().contains("survival.mods"));
    assert!(interactive.get_confirm_calls().is_empty());
    assert!(fixture.mods_dir.join("stale.jar").exists());
    assert!(!fixture.lock_path().exists());
}

#[tokio::test]
async fn test_declined_or_interrupted_confirmation_cancels() {
    for interactive in [
        MockInteractiveProvider::new().with_confirm(false),
        MockInteractiveProvider::interrupted(),
    ] {
        let fixture = Fixture::new("game 1.20.1\n");
        let pipeline = pipeline(
            &fixture,
            MockRegistryClient::new(Registry::CurseForge),
            MockRegistryClient::new(Registry::Modrinth),
        )
        .await;

        let outcome = pipeline.run(&fixture.manifest, &interactive).await.unwrap();

        assert!(matches!(outcome, BuildOutcome::Cancelled));
        assert_eq!(interactive.get_confirm_calls().len(), 1);
        assert!(fixture.mods_dir.join("stale.jar").exists());
        assert!(!fixture.lock_path().exists());
    }
}

#[tokio::test]
async fn test_unanswered_confirmation_keeps_mods_folder() {
    let fixture = Fixture::new("game 1.20.1\n");
    let pipeline = pipeline(
        &fixture,
        MockRegistryClient::new(Registry::CurseForge),
        MockRegistryClient::new(Registry::Modrinth),
    )
    .await;
    let interactive = MockInteractiveProvider::new();

    let outcome = pipeline.run(&fixture.manifest, &interactive).await.unwrap();

    assert!(matches!(outcome, BuildOutcome::Cancelled));
    assert_eq!(
        interactive.get_confirm_calls(),
        vec![("Continue?".to_string(), false)]
    );
    assert!(fixture.mods_dir.join("stale.jar").exists());
    assert!(!fixture.lock_path().exists());
}

#[tokio::test]
async fn test_failed_statements_and_downloads_go_to_lock_file() {
    let mut server = Server::new_async().await;
    let _mock1 = server
        .mock("GET", "/files/gone.jar")
        .with_status(404)
        .create_async()
        .await;

    let fixture = Fixture::new(&format!(
        "game 1.20==1.19.4\nloader fabric\ndownload {}/files/gone.jar\n",
        server.url()
    ));
    let pipeline = pipeline(
        &fixture,
        MockRegistryClient::new(Registry::CurseForge),
        MockRegistryClient::new(Registry::Modrinth),
    )
    .await;

    let report = completed(
        pipeline
            .run(&fixture.manifest, &MockInteractiveProvider::new().with_confirm(true))
            .await
            .unwrap(),
    );

    assert_eq!(report.lock.failed_statements.len(), 1);
    assert_eq!(report.lock.failed_downloads.len(), 1);
    let lock = std::fs::read_to_string(fixture.lock_path()).unwrap();
    assert!(lock.starts_with("loader fabric\n\n# Failed statements:\n# - game 1.20==1.19.4\n"));
    assert!(lock.contains("# Failed downloads:\n# - "));
}

#[tokio::test]
async fn test_corrupt_lock_file_falls_back_to_manifest() {
    let fixture = Fixture::new("loader fabric\n");
    std::fs::write(fixture.lock_path(), "loader\n").unwrap();
    let pipeline = pipeline(
        &fixture,
        MockRegistryClient::new(Registry::CurseForge),
        MockRegistryClient::new(Registry::Modrinth),
    )
    .await;

    let report = completed(
        pipeline
            .run(&fixture.manifest, &MockInteractiveProvider::new().with_confirm(true))
            .await
            .unwrap(),
    );

    assert!(!report.replayed);
    assert!(report.lock_written);
    assert_eq!(
        std::fs::read_to_string(fixture.lock_path()).unwrap(),
        "loader fabric\n"
    );
}

#[tokio::test]
async fn test_malformed_manifest_fails_fast() {
    let fixture = Fixture::new("mod sodium\ngame\n");
    let pipeline = pipeline(
        &fixture,
        MockRegistryClient::new(Registry::CurseForge),
        MockRegistryClient::new(Registry::Modrinth),
    )
    .await;

    let error = pipeline
        .run(&fixture.manifest, &MockInteractiveProvider::new())
        .await
        .unwrap_err();

    assert!(matches!(error, BuildError::Manifest(ManifestError::Parse { line: 2, .. })));
    assert!(fixture.mods_dir.join("stale.jar").exists());
}

#[test]
fn test_clear_mods_dir_keeps_subdirectories() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir(tmp.path().join("sub")).unwrap();
    std::fs::write(tmp.path().join("sub").join("inner.jar"), "x").unwrap();
    std::fs::write(tmp.path().join("a.jar"), "x").unwrap();
    std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();

    clear_mods_dir(tmp.path()).unwrap();

    assert!(!tmp.path().join("a.jar").exists());
    assert!(!tmp.path().join("notes.txt").exists());
    assert!(tmp.path().join("sub").join("inner.jar").exists());

    assert!(matches!(
        clear_mods_dir(&tmp.path().join("absent")),
        Err(BuildError::Io { .. })
    ));
}

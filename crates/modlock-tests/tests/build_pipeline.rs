//! End-to-end builds against the live registry clients
//!
//! Every request goes over HTTP to a mockito server speaking the
//! CurseForge and Modrinth response formats.

use anyhow::Result;
use modlock_lib::application::session_mocks::MockInteractiveProvider;
use modlock_lib::modpack::{BuildOutcome, BuildReport, lock_file_path};
use modlock_tests::TestEnvironment;
use modlock_tests::fixtures::{
    curseforge_file, curseforge_files, curseforge_mod, modrinth_project, modrinth_version,
    modrinth_versions, write_zip,
};

fn completed(outcome: BuildOutcome) -> BuildReport {
    match outcome {
        BuildOutcome::Completed(report) => report,
        BuildOutcome::Cancelled => panic!("build was cancelled"),
    }
}

/// CurseForge 123456 requires 777; Modrinth sodium requires P7dR8mSH
async fn serve_registries(env: &mut TestEnvironment) {
    let example = curseforge_file(
        4567,
        &env.url("/cdn/example-4567.jar"),
        &["1.20.1", "Fabric"],
        &[777],
    );
    let library = curseforge_file(888, &env.url("/cdn/library-888.jar"), &["1.20.1", "Fabric"], &[]);
    let sodium = modrinth_version(
        "abc",
        &env.url("/cdn/sodium-abc.jar"),
        &["1.20.1"],
        &["fabric"],
        &["P7dR8mSH"],
    );
    let fabric_api = modrinth_version(
        "def",
        &env.url("/cdn/fabric-api-def.jar"),
        &["1.20.1"],
        &["fabric"],
        &[],
    );

    env.serve_json("/v1/mods/123456", curseforge_mod("Example Mod")).await;
    env.serve_json("/v1/mods/123456/files", curseforge_files(&[example]))
        .await;
    env.serve_json("/v1/mods/777", curseforge_mod("Library")).await;
    env.serve_json("/v1/mods/777/files", curseforge_files(&[library]))
        .await;
    env.serve_json("/v2/project/sodium", modrinth_project("sodium", "Sodium"))
        .await;
    env.serve_json("/v2/project/sodium/version", modrinth_versions(&[sodium]))
        .await;
    env.serve_json(
        "/v2/project/P7dR8mSH",
        modrinth_project("fabric-api", "Fabric API"),
    )
    .await;
    env.serve_json(
        "/v2/project/P7dR8mSH/version",
        modrinth_versions(&[fabric_api]),
    )
    .await;

    for jar in [
        "example-4567.jar",
        "library-888.jar",
        "sodium-abc.jar",
        "fabric-api-def.jar",
        "extra.jar",
    ] {
        env.serve_file(&format!("/cdn/{jar}"), jar).await;
    }
}

#[tokio::test]
async fn it_builds_the_mods_folder_and_writes_the_lock_file() -> Result<()> {
    let mut env = TestEnvironment::new().await?;
    serve_registries(&mut env).await;
    std::fs::write(env.mods_dir.join("outdated.jar"), "old")?;

    let manifest = env.write_manifest(
        "survival.mods",
        &format!(
            "# survival pack\ngame 1.20.1\nloader fabric\nmod 123456\nmod sodium\ndownload {}\n",
            env.url("/cdn/extra.jar")
        ),
    )?;

    let report = completed(
        env.pipeline(2)
            .run(&manifest, &MockInteractiveProvider::new().with_confirm(true))
            .await?,
    );

    assert!(report.lock_written);
    assert!(report.lock.is_clean());
    assert_eq!(
        env.installed_mods()?,
        vec![
            "example-4567.jar",
            "extra.jar",
            "fabric-api-def.jar",
            "library-888.jar",
            "sodium-abc.jar",
        ]
    );
    assert_eq!(
        std::fs::read_to_string(lock_file_path(&manifest))?,
        format!(
            "game 1.20.1\nloader fabric\n\n\
             mod 123456 Example Mod == 4567\n\
             mod 777 Library == 888\n\
             mod P7dR8mSH Fabric API == def\n\
             mod sodium Sodium == abc\n\n\
             download {}\n",
            env.url("/cdn/extra.jar")
        )
    );
    Ok(())
}

#[tokio::test]
async fn it_replays_the_lock_file_with_pinned_versions() -> Result<()> {
    let mut env = TestEnvironment::new().await?;
    let manifest = env.write_manifest("survival.mods", "mod 123456\nmod sodium\n")?;
    let lock_text = "game 1.20.1\n\nmod 123456 Example Mod == 4567\nmod sodium Sodium == abc\n";
    std::fs::write(lock_file_path(&manifest), lock_text)?;

    let pinned_file = curseforge_file(
        4567,
        &env.url("/cdn/example-4567.jar"),
        &["1.20.1", "Fabric"],
        &[777],
    );
    let pinned_version = modrinth_version(
        "abc",
        &env.url("/cdn/sodium-abc.jar"),
        &["1.20.1"],
        &["fabric"],
        &["P7dR8mSH"],
    );
    env.serve_json("/v1/mods/123456", curseforge_mod("Example Mod")).await;
    env.serve_json(
        "/v1/mods/123456/files/4567",
        serde_json::json!({ "data": pinned_file }).to_string(),
    )
    .await;
    env.serve_json("/v2/project/sodium", modrinth_project("sodium", "Sodium"))
        .await;
    env.serve_json("/v2/version/abc", pinned_version.to_string())
        .await;
    env.serve_file("/cdn/example-4567.jar", "example").await;
    env.serve_file("/cdn/sodium-abc.jar", "sodium").await;
    let newest_listing = env
        .server
        .mock("GET", "/v2/project/sodium/version")
        .expect(0)
        .create_async()
        .await;
    let dependency = env
        .server
        .mock("GET", "/v1/mods/777/files")
        .expect(0)
        .create_async()
        .await;

    let report = completed(
        env.pipeline(2)
            .run(&manifest, &MockInteractiveProvider::new().with_confirm(true))
            .await?,
    );

    assert!(report.replayed);
    assert!(!report.lock_written);
    assert_eq!(
        env.installed_mods()?,
        vec!["example-4567.jar", "sodium-abc.jar"]
    );
    assert_eq!(std::fs::read_to_string(lock_file_path(&manifest))?, lock_text);
    newest_listing.assert_async().await;
    dependency.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn it_retries_flaky_downloads_and_records_exhausted_ones() -> Result<()> {
    let mut env = TestEnvironment::new().await?;
    let flaky = env
        .server
        .mock("GET", "/cdn/flaky.jar")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;
    env.serve_file("/cdn/fine.jar", "fine").await;

    let manifest = env.write_manifest(
        "pack.mods",
        &format!(
            "download {}\ndownload {} for mod sodium\n",
            env.url("/cdn/fine.jar"),
            env.url("/cdn/flaky.jar")
        ),
    )?;

    let report = completed(
        env.pipeline(3)
            .run(&manifest, &MockInteractiveProvider::new().with_confirm(true))
            .await?,
    );

    flaky.assert_async().await;
    assert_eq!(env.installed_mods()?, vec!["fine.jar"]);
    assert_eq!(report.lock.failed_downloads.len(), 1);
    let lock = std::fs::read_to_string(lock_file_path(&manifest))?;
    assert!(lock.contains(&format!("download {}\n", env.url("/cdn/fine.jar"))));
    assert!(lock.contains("# Failed downloads:\n# - "));
    assert!(!lock.contains(&format!("download {}", env.url("/cdn/flaky.jar"))));
    Ok(())
}

#[tokio::test]
async fn it_treats_repeated_references_as_one_mod() -> Result<()> {
    let mut env = TestEnvironment::new().await?;
    let version = modrinth_version("v1", &env.url("/cdn/lithium.jar"), &["1.20.1"], &["fabric"], &[]);
    env.serve_json("/v2/project/lithium", modrinth_project("lithium", "Lithium"))
        .await;
    let listing = env
        .server
        .mock("GET", "/v2/project/lithium/version")
        .with_body(modrinth_versions(&[version]))
        .expect(1)
        .create_async()
        .await;
    let jar = env
        .server
        .mock("GET", "/cdn/lithium.jar")
        .with_body("lithium")
        .expect(1)
        .create_async()
        .await;

    let manifest = env.write_manifest("pack.mods", "mod lithium\nmod lithium\n\nmod lithium\n")?;

    let report = completed(
        env.pipeline(1)
            .run(&manifest, &MockInteractiveProvider::new().with_confirm(true))
            .await?,
    );

    listing.assert_async().await;
    jar.assert_async().await;
    assert_eq!(report.lock.resolved_mods.len(), 1);
    assert_eq!(env.installed_mods()?, vec!["lithium.jar"]);
    Ok(())
}

#[tokio::test]
async fn it_applies_config_overlays_to_the_game_directory() -> Result<()> {
    let env = TestEnvironment::new().await?;
    write_zip(
        env.root(),
        "options.zip",
        &[
            ("options/config/sodium.json", "{\"quality\": \"fancy\"}"),
            ("options/options.txt", "fov:90"),
        ],
    )?;
    let manifest = env.write_manifest("pack.mods", "config options.zip\nloader forge\n")?;

    let report = completed(
        env.pipeline(1)
            .run(&manifest, &MockInteractiveProvider::new().with_confirm(true))
            .await?,
    );

    assert_eq!(
        std::fs::read_to_string(env.game_dir.join("config").join("sodium.json"))?,
        "{\"quality\": \"fancy\"}"
    );
    assert_eq!(std::fs::read_to_string(env.game_dir.join("options.txt"))?, "fov:90");
    assert_eq!(report.lock.resolved_statements.len(), 1);
    assert_eq!(report.lock.failed_statements.len(), 1);
    assert!(
        std::fs::read_to_string(lock_file_path(&manifest))?
            .ends_with("# Failed statements:\n# - loader forge\n")
    );
    Ok(())
}

#[tokio::test]
async fn it_leaves_everything_untouched_when_a_dependency_cannot_be_resolved() -> Result<()> {
    let mut env = TestEnvironment::new().await?;
    let _missing = env
        .server
        .mock("GET", "/v2/project/ghost/version")
        .with_status(404)
        .create_async()
        .await;
    std::fs::write(env.mods_dir.join("existing.jar"), "keep me")?;
    let manifest = env.write_manifest("pack.mods", "mod ghost\n")?;

    let result = env
        .pipeline(1)
        .run(&manifest, &MockInteractiveProvider::new())
        .await;

    let message = result.expect_err("build should fail").to_string();
    assert!(message.contains("ghost"), "{message}");
    assert_eq!(env.installed_mods()?, vec!["existing.jar"]);
    assert!(!lock_file_path(&manifest).exists());
    Ok(())
}

use super::*;
use crate::api::{ModMetadata, ResolvedFile};
use crate::modpack::{ModId, ModState, Registry};

fn resolved_mod(id: &str, name: &str, version: &str) -> Mod {
    Mod::with_state(
        ModId::parse(id),
        None,
        ModState {
            metadata: Some(ModMetadata {
                name: name.to_string(),
                ..Default::default()
            }),
            file: Some(ResolvedFile {
                version_id: version.to_string(),
                display_name: format!("{name}.jar"),
                download_url: Some(format!("https://cdn.example/{version}.jar")),
                dependencies: Vec::new(),
                sha1: None,
            }),
        },
    )
}

fn statement(line: &str) -> Statement {
    let (keyword, body) = line.split_once(' ').unwrap();
    Statement::parse(keyword, body, Path::new("/packs")).unwrap()
}

fn failed(identifier: &str, name: &str) -> DownloadResult {
    DownloadResult::Failed(DownloadError {
        identifier: identifier.to_string(),
        name: name.to_string(),
        reason: "HTTP 404".to_string(),
    })
}

#[test]
fn test_lock_file_path_replaces_extension() {
    assert_eq!(
        lock_file_path(Path::new("/packs/survival.mods")),
        Path::new("/packs/survival.resolved-mods")
    );
    assert_eq!(
        lock_file_path(Path::new("pack")),
        Path::new("pack.resolved-mods")
    );
}

#[test]
fn test_scenario_renders_buckets_in_order() {
    let lock = LockFile::from_results(
        &[
            StatementRunResult::Applied(statement("game 1.20.1")),
            StatementRunResult::Applied(statement("loader fabric")),
        ],
        &[
            DownloadResult::Downloaded(Downloadable::Mod(resolved_mod(
                "123456",
                "Example Mod",
                "4567",
            ))),
            DownloadResult::Downloaded(Downloadable::Url(Url::new(
                "https://example.com/x.jar",
                None,
            ))),
        ],
    );

    assert_eq!(
        lock.render(),
        "game 1.20.1\nloader fabric\n\nmod 123456 Example Mod == 4567\n\ndownload https://example.com/x.jar\n"
    );
    assert!(lock.is_clean());
}

#[test]
fn test_failures_are_listed_as_comments() {
    let lock = LockFile::from_results(
        &[StatementRunResult::Rejected(StatementRunError {
            statement: "loader forge".to_string(),
            reason: "mismatch".to_string(),
        })],
        &[failed("lithium", "Lithium"), failed("https://a/b.jar", "https://a/b.jar")],
    );

    assert_eq!(
        lock.render(),
        "# Failed statements:\n# - loader forge\n\n# Failed downloads:\n# - Lithium\n# - https://a/b.jar\n"
    );
    assert!(!lock.is_clean());
}

#[test]
fn test_empty_build_renders_nothing() {
    assert_eq!(LockFile::from_results(&[], &[]).render(), "");
}

#[test]
fn test_resolved_and_failed_are_exclusive() {
    let lock = LockFile::from_results(
        &[],
        &[
            DownloadResult::Downloaded(Downloadable::Mod(resolved_mod("sodium", "Sodium", "v1"))),
            failed("sodium", "https://mirror/sodium.jar for mod sodium"),
        ],
    );

    assert_eq!(lock.resolved_mods.len(), 1);
    assert!(lock.failed_downloads.is_empty());
}

#[test]
fn test_mods_sorted_by_registry_then_id() {
    let lock = LockFile::from_results(
        &[],
        &[
            DownloadResult::Downloaded(Downloadable::Mod(resolved_mod("sodium", "Sodium", "a"))),
            DownloadResult::Downloaded(Downloadable::Mod(resolved_mod("900", "Nine", "b"))),
            DownloadResult::Downloaded(Downloadable::Mod(resolved_mod("1000", "Thousand", "c"))),
            DownloadResult::Downloaded(Downloadable::Mod(resolved_mod("iris", "Iris", "d"))),
        ],
    );

    let order: Vec<_> = lock
        .resolved_mods
        .iter()
        .map(|m| (m.registry(), m.id().id.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (Registry::CurseForge, "1000"),
            (Registry::CurseForge, "900"),
            (Registry::Modrinth, "iris"),
            (Registry::Modrinth, "sodium"),
        ]
    );
}

#[test]
fn test_awkward_names_still_reparse() {
    let lock = LockFile::from_results(
        &[],
        &[DownloadResult::Downloaded(Downloadable::Mod(resolved_mod(
            "238222",
            "JEI == Just\nEnough Items",
            "4712866",
        )))],
    );

    let rendered = lock.render();
    assert_eq!(rendered, "mod 238222 JEI = Just Enough Items == 4712866\n");

    let replayed = Modpack::parse(&rendered, Path::new(".")).unwrap();
    let m = replayed.mods.iter().next().unwrap();
    assert_eq!(m.id().id, "238222");
    assert_eq!(m.version_hint(), Some("4712866"));
}

#[test]
fn test_replay_yields_same_sets() {
    let mods = [
        resolved_mod("306612", "Fabric API", "4590000"),
        resolved_mod("lithium", "Lithium", "ZSNsJrPI"),
    ];
    let urls = [
        Url::new("https://cdn.example/a.jar", Some("306612".to_string())),
        Url::new("https://cdn.example/b.jar", None),
    ];
    let downloads: Vec<_> = mods
        .iter()
        .cloned()
        .map(Downloadable::Mod)
        .chain(urls.iter().cloned().map(Downloadable::Url))
        .map(DownloadResult::Downloaded)
        .collect();

    let lock = LockFile::from_results(
        &[StatementRunResult::Applied(statement("game 1.20==1.20.1"))],
        &downloads,
    );
    let replayed = Modpack::parse(&lock.render(), Path::new("/packs")).unwrap();

    assert_eq!(replayed.statements, lock.resolved_statements);
    assert_eq!(replayed.mods.iter().cloned().collect::<Vec<_>>(), lock.resolved_mods);
    for m in &replayed.mods {
        let original = mods.iter().find(|o| o.id() == m.id()).unwrap();
        assert_eq!(m.version_hint(), original.version_id());
    }
    let replayed_urls: Vec<_> = replayed.urls.iter().map(|u| u.to_string()).collect();
    assert_eq!(
        replayed_urls,
        vec![
            "https://cdn.example/a.jar for mod 306612",
            "https://cdn.example/b.jar"
        ]
    );
}

#[test]
fn test_to_disk_and_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pack.resolved-mods");
    let lock = LockFile::from_results(
        &[],
        &[DownloadResult::Downloaded(Downloadable::Mod(resolved_mod(
            "sodium", "Sodium", "v1",
        )))],
    );

    lock.to_disk(&path).unwrap();
    let replayed = LockFile::replay(&path).unwrap();

    assert_eq!(replayed.mods.len(), 1);
    assert_eq!(replayed.mods.iter().next().unwrap().version_hint(), Some("v1"));
}

#[test]
fn test_replay_reports_corrupt_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pack.resolved-mods");
    std::fs::write(&path, "game\n").unwrap();

    assert!(matches!(
        LockFile::replay(&path),
        Err(LockFileError::Corrupt { .. })
    ));
    assert!(matches!(
        LockFile::replay(&dir.path().join("absent.resolved-mods")),
        Err(LockFileError::Io { .. })
    ));
}

use super::*;
use crate::modpack::{Environment, ModLoader};
use std::io::Write;
use tempfile::TempDir;

fn target(mods_dir: impl Into<PathBuf>) -> InstallTarget {
    InstallTarget::new(Environment::new("1.20.1", ModLoader::Fabric), mods_dir)
}

fn parse(line: &str) -> Statement {
    let (keyword, body) = line.split_once(' ').unwrap();
    Statement::parse(keyword, body, Path::new("/packs")).unwrap()
}

/// Zip `entries` (path, contents) into `<dir>/<name>`
fn write_zip(dir: &Path, name: &str, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for (entry, contents) in entries {
        zip.start_file(*entry, options).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

/// `<tmp>/game/mods` with `<tmp>/game` as install root
fn install_dir() -> (TempDir, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let mods = tmp.path().join("game").join("mods");
    std::fs::create_dir_all(&mods).unwrap();
    (tmp, mods)
}

#[test]
fn test_parse_game_version_pin() {
    assert_eq!(
        parse("game 1.20.1"),
        Statement::GameVersion {
            body: "1.20.1".to_string(),
            pin: None
        }
    );
    assert_eq!(
        parse("game 1.20 == 1.20.1"),
        Statement::GameVersion {
            body: "1.20 == 1.20.1".to_string(),
            pin: Some("1.20.1".to_string())
        }
    );
}

#[test]
fn test_parse_loader_lowercases_type() {
    assert_eq!(
        parse("loader Fabric==0.14.21"),
        Statement::Loader {
            body: "Fabric==0.14.21".to_string(),
            loader_type: "fabric".to_string(),
            version: Some("0.14.21".to_string())
        }
    );
    assert_eq!(parse("loader FORGE").to_string(), "loader FORGE");
}

#[test]
fn test_parse_config_resolves_against_manifest_dir() {
    match parse("config overlays/options.zip") {
        Statement::ConfigOverlay { archive, body } => {
            assert_eq!(body, "overlays/options.zip");
            assert_eq!(archive, Path::new("/packs/overlays/options.zip"));
        }
        other => panic!("unexpected statement {other:?}"),
    }
}

#[test]
fn test_parse_rejects_empty_values() {
    let dir = Path::new(".");
    assert!(matches!(
        Statement::parse("game", "  ", dir),
        Err(StatementError::Malformed { .. })
    ));
    assert!(Statement::parse("game", "1.20==", dir).is_err());
    assert!(Statement::parse("loader", "==1.0", dir).is_err());
    assert!(Statement::parse("shader", "x", dir).is_err());
}

#[test]
fn test_unpinned_game_version_always_applies() {
    let statement = parse("game 1.19.2");
    for configured in ["1.20.1", "1.19.2", "24w10a"] {
        let target = InstallTarget::new(Environment::new(configured, ModLoader::Forge), "/x/mods");
        assert!(statement.run(&target).is_ok());
    }
}

#[test]
fn test_pinned_game_version_is_exact_and_case_sensitive() {
    let target = InstallTarget::new(Environment::new("1.20.1-Pre1", ModLoader::Fabric), "/x/mods");

    assert!(parse("game 1.20==1.20.1-Pre1").run(&target).is_ok());
    assert!(matches!(
        parse("game 1.20==1.20.1-pre1").run(&target),
        Err(StatementError::GameVersionMismatch { .. })
    ));
    assert!(parse("game 1.20==1.20.1").run(&target).is_err());
}

#[test]
fn test_loader_matches_case_insensitively() {
    let target = target("/x/mods");
    assert!(parse("loader FABRIC").run(&target).is_ok());
    assert!(matches!(
        parse("loader forge").run(&target),
        Err(StatementError::LoaderMismatch { .. })
    ));
}

#[test]
fn test_overlay_merges_named_folder_into_install_root() {
    let (tmp, mods) = install_dir();
    let root = mods.parent().unwrap().to_path_buf();
    std::fs::write(root.join("options.txt"), "old").unwrap();

    let archive = write_zip(
        tmp.path(),
        "survival.zip",
        &[
            ("survival/options.txt", "fov:90"),
            ("survival/config/sodium.json", "{}"),
        ],
    );
    let statement = Statement::ConfigOverlay {
        body: "survival.zip".to_string(),
        archive,
    };

    statement.run(&target(&mods)).unwrap();

    assert_eq!(std::fs::read_to_string(root.join("options.txt")).unwrap(), "fov:90");
    assert!(root.join("config").join("sodium.json").is_file());
}

#[test]
fn test_overlay_without_named_folder_is_rejected() {
    let (tmp, mods) = install_dir();
    let archive = write_zip(tmp.path(), "survival.zip", &[("other/options.txt", "x")]);
    let statement = Statement::ConfigOverlay {
        body: "survival.zip".to_string(),
        archive,
    };

    assert!(matches!(
        statement.run(&target(&mods)),
        Err(StatementError::MissingOverlayFolder { ref expected, .. }) if expected == "survival"
    ));
}

#[test]
fn test_overlay_requires_existing_install_root() {
    let tmp = tempfile::tempdir().unwrap();
    let archive = write_zip(tmp.path(), "pack.zip", &[("pack/a.txt", "x")]);
    let statement = Statement::ConfigOverlay {
        body: "pack.zip".to_string(),
        archive,
    };

    let missing_root = tmp.path().join("nowhere").join("mods");
    assert!(matches!(
        statement.run(&target(missing_root)),
        Err(StatementError::InvalidInstallRoot { .. })
    ));
}

#[test]
fn test_overlay_with_missing_archive_is_io_error() {
    let (tmp, mods) = install_dir();
    let statement = Statement::ConfigOverlay {
        body: "absent.zip".to_string(),
        archive: tmp.path().join("absent.zip"),
    };
    assert!(matches!(statement.run(&target(&mods)), Err(StatementError::Io { .. })));
}

#[test]
fn test_run_statements_evaluates_all_in_order() {
    let statements = vec![
        parse("game 1.20==1.19.4"),
        parse("loader fabric"),
        parse("loader quilt"),
    ];

    let results = run_statements(&statements, &target("/x/mods"));

    assert_eq!(results.len(), 3);
    assert!(matches!(
        &results[0],
        StatementRunResult::Rejected(e) if e.statement == "game 1.20==1.19.4"
    ));
    assert_eq!(results[1], StatementRunResult::Applied(statements[1].clone()));
    assert!(matches!(&results[2], StatementRunResult::Rejected(_)));
}

use super::*;
use crate::modpack::Registry;

const SCENARIO: &str = "game 1.20.1\nloader fabric\nmod 123456\ndownload https://example.com/x.jar";

fn parse(text: &str) -> Modpack {
    Modpack::parse(text, Path::new("/packs")).unwrap()
}

#[test]
fn test_scenario_manifest_buckets() {
    let modpack = parse(SCENARIO);

    assert_eq!(
        modpack
            .statements
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        vec!["game 1.20.1", "loader fabric"]
    );
    assert_eq!(modpack.mods.len(), 1);
    let m = modpack.mods.iter().next().unwrap();
    assert_eq!(m.id().registry, Registry::CurseForge);
    assert_eq!(m.id().id, "123456");
    assert_eq!(m.version_hint(), None);

    assert_eq!(modpack.urls.len(), 1);
    assert_eq!(modpack.downloadables().len(), 2);
}

#[test]
fn test_whitespace_comments_and_unknown_lines_are_ignored() {
    let modpack = parse(
        "\n   # a comment\n\tmod   sodium   \nshader bsl\n# - mod 1 broken\n  download https://a/b.jar  \n\n",
    );

    assert!(modpack.statements.is_empty());
    assert_eq!(modpack.mods.iter().next().unwrap().id().id, "sodium");
    assert_eq!(modpack.urls.iter().next().unwrap().as_str(), "https://a/b.jar");
}

#[test]
fn test_lock_file_style_mod_line_carries_version_hint() {
    let modpack = parse("mod 394468 Sodium Extra == 4567890");
    let m = modpack.mods.iter().next().unwrap();

    assert_eq!(m.id().id, "394468");
    assert_eq!(m.version_hint(), Some("4567890"));
}

#[test]
fn test_download_attribution() {
    let modpack = parse("download https://cdn.example/lib.jar for mod 306612");
    let url = modpack.urls.iter().next().unwrap();

    assert_eq!(url.as_str(), "https://cdn.example/lib.jar");
    assert_eq!(url.owner(), Some("306612"));
}

#[test]
fn test_duplicates_collapse() {
    let modpack = parse(
        "game 1.20.1\ngame 1.20.1\nmod lithium\nmod lithium\nmod lithium x == abc\ndownload https://a/b.jar\ndownload https://a/b.jar for mod 1",
    );

    assert_eq!(modpack.statements.len(), 1);
    assert_eq!(modpack.mods.len(), 1);
    // first occurrence wins
    assert_eq!(modpack.mods.iter().next().unwrap().version_hint(), None);
    assert_eq!(modpack.urls.len(), 1);
}

#[test]
fn test_statement_order_is_preserved() {
    let modpack = parse("loader forge\nconfig pack.zip\ngame 1.19.2");
    let keywords: Vec<_> = modpack.statements.iter().map(Statement::keyword).collect();
    assert_eq!(keywords, vec!["loader", "config", "game"]);
}

#[test]
fn test_empty_statement_body_is_parse_error() {
    let err = Modpack::parse("mod sodium\nloader   \n", Path::new(".")).unwrap_err();
    assert!(matches!(err, ManifestError::Parse { line: 2, .. }));
}

#[test]
fn test_mod_without_identifier_is_invalid_format() {
    let err = Modpack::parse("mod ==123", Path::new(".")).unwrap_err();
    assert!(matches!(err, ManifestError::InvalidFormat { line: 1, .. }));

    let err = Modpack::parse("download", Path::new(".")).unwrap_err();
    assert!(matches!(err, ManifestError::InvalidFormat { .. }));
}

#[test]
fn test_from_file_resolves_config_relative_to_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("survival.mods");
    std::fs::write(&path, "config overlay.zip\n").unwrap();

    let modpack = Modpack::from_file(&path).unwrap();
    match &modpack.statements[0] {
        Statement::ConfigOverlay { archive, .. } => {
            assert_eq!(archive, &dir.path().join("overlay.zip"))
        }
        other => panic!("unexpected statement {other:?}"),
    }

    assert!(matches!(
        Modpack::from_file(&dir.path().join("missing.mods")),
        Err(ManifestError::Io { .. })
    ));
}

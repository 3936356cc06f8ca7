use super::*;
use crate::modpack::ModLoader;
use clap::CommandFactory;

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_build_with_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "modlock",
        "build",
        "packs/survival.mods",
        "--loader",
        "fabric",
        "-g",
        "1.20.1",
        "-y",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Build { manifest }) => {
            assert_eq!(manifest, PathBuf::from("packs/survival.mods"))
        }
        other => panic!("unexpected command {other:?}"),
    }
    assert_eq!(cli.config.loader, Some(ModLoader::Fabric));
    assert!(cli.config.yes);
}

#[test]
fn test_info_search_and_lock_path() {
    let cli = Cli::try_parse_from(["modlock", "info", "sodium", "--pin", "abc"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Info { ref mod_id, pin: Some(ref v) }) if mod_id == "sodium" && v == "abc"
    ));

    let cli = Cli::try_parse_from(["modlock", "search", "sodium", "-g", "1.20.1"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search { ref keyword }) if keyword == "sodium"
    ));
    assert_eq!(cli.config.game_version.as_deref(), Some("1.20.1"));

    let cli = Cli::try_parse_from(["modlock", "lock-path", "a.mods"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::LockPath { .. })));
}

#[test]
fn test_unknown_loader_is_rejected() {
    assert!(Cli::try_parse_from(["modlock", "--loader", "rift", "build", "a.mods"]).is_err());
}

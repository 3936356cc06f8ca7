//! Process-level checks of the modlock binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary run from an empty directory with a private config home
fn modlock(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("modlock").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("NO_COLOR", "1")
        .env_remove("MODLOCK_CONFIG")
        .env_remove("MODLOCK_GAME_VERSION")
        .env_remove("MODLOCK_LOADER")
        .env_remove("MODLOCK_MODS_DIR");
    cmd
}

#[test]
fn help_lists_the_commands() {
    let dir = TempDir::new().unwrap();
    modlock(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("lock-path"));
}

#[test]
fn lock_path_prints_the_sibling_file() {
    let dir = TempDir::new().unwrap();
    modlock(&dir)
        .args(["lock-path", "packs/survival.mods"])
        .assert()
        .success()
        .stdout(predicate::str::contains("survival.resolved-mods"));
}

#[test]
fn build_without_environment_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("pack.mods"), "mod sodium\n").unwrap();

    modlock(&dir)
        .args(["build", "pack.mods", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("game version"));
}

#[test]
fn unreadable_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    modlock(&dir)
        .args(["--config", "missing.toml", "lock-path", "a.mods"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}

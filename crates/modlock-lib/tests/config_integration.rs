use modlock_lib::application::config::AppConfig;
use modlock_lib::modpack::ModLoader;
use modlock_lib::primitives::{ColorIntent, LogLevel};

#[test]
fn test_config_default_creation() {
    let config = AppConfig::default();

    assert_eq!(config.log_level, LogLevel::Warning);
    assert!(config.net_timeout > 0);
    assert_eq!(config.color, ColorIntent::Auto);
}

#[test]
fn test_config_file_then_cli_layering() {
    let dir = tempfile::tempdir().unwrap();
    let mods_dir = dir.path().join("mods");
    std::fs::create_dir_all(&mods_dir).unwrap();
    let path = dir.path().join("modlock.toml");
    std::fs::write(
        &path,
        format!(
            "mods_dir = {:?}\ngame_version = \"1.19.2\"\nloader = \"forge\"\ncolor = \"never\"\n",
            mods_dir.display().to_string()
        ),
    )
    .unwrap();

    let file_config = AppConfig::from_file(&path).unwrap();
    let cli_config = AppConfig {
        game_version: Some("1.20.1".to_string()),
        cpu_jobs: Some(8),
        ..AppConfig::default()
    };

    let merged = file_config.merge_with(cli_config);
    let target = merged.validate().unwrap();

    assert_eq!(target.environment.game_version, "1.20.1");
    assert_eq!(target.environment.loader, ModLoader::Forge);
    assert_eq!(target.mods_dir, mods_dir);
    assert_eq!(merged.color, ColorIntent::Never);
    assert_eq!(merged.networking_config().max_jobs, Some(8));
}

use super::*;

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.log_level, LogLevel::Warning);
    assert_eq!(config.net_timeout, 30);
    assert_eq!(config.retries, 3);
    assert_eq!(config.color, ColorIntent::Auto);
    assert!(!config.yes);
    assert!(config.mods_dir.is_none());
}

#[test]
fn test_parsed_defaults_match_default_impl() {
    let parsed = AppConfig::try_parse_from(["modlock"]).unwrap();
    let default = AppConfig::default();

    assert_eq!(parsed.log_level, default.log_level);
    assert_eq!(parsed.log_format, default.log_format);
    assert_eq!(parsed.log_output, default.log_output);
    assert_eq!(parsed.color, default.color);
    assert_eq!(parsed.net_timeout, default.net_timeout);
    assert_eq!(parsed.retries, default.retries);
}

#[test]
fn test_cli_flags_parse() {
    let config = AppConfig::try_parse_from([
        "modlock",
        "--mods-dir",
        "/games/mc/mods",
        "-g",
        "1.20.1",
        "--loader",
        "neo-forge",
        "-j",
        "4",
        "-vv",
        "--yes",
    ])
    .unwrap();

    assert_eq!(config.mods_dir, Some(PathBuf::from("/games/mc/mods")));
    assert_eq!(config.game_version.as_deref(), Some("1.20.1"));
    assert_eq!(config.loader, Some(ModLoader::NeoForge));
    assert_eq!(config.cpu_jobs, Some(4));
    assert_eq!(config.effective_log_level(), LogLevel::Debug);
    assert!(config.yes);
}

#[test]
fn test_merge_prefers_explicit_values() {
    let file = AppConfig {
        game_version: Some("1.19.2".to_string()),
        loader: Some(ModLoader::Forge),
        retries: 5,
        ..AppConfig::default()
    };
    let cli = AppConfig {
        game_version: Some("1.20.1".to_string()),
        log_format: LogFormat::Json,
        ..AppConfig::default()
    };

    let merged = file.merge_with(cli);

    assert_eq!(merged.game_version.as_deref(), Some("1.20.1"));
    assert_eq!(merged.loader, Some(ModLoader::Forge));
    assert_eq!(merged.retries, 5);
    assert_eq!(merged.log_format, LogFormat::Json);
}

#[test]
fn test_from_file_reads_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("modlock.toml");
    std::fs::write(
        &path,
        r#"
mods_dir = "/games/mc/mods"
game_version = "1.20.1"
loader = "fabric"
log_level = "debug"
retries = 4
"#,
    )
    .unwrap();

    let config = AppConfig::from_file(&path).unwrap();

    assert_eq!(config.loader, Some(ModLoader::Fabric));
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.retries, 4);
    assert_eq!(config.net_timeout, 30);
}

#[test]
fn test_from_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "shader_pack = true\n").unwrap();

    assert!(matches!(
        AppConfig::from_file(&bad),
        Err(ConfigError::FileParseError { .. })
    ));
    assert!(matches!(
        AppConfig::from_file(&dir.path().join("absent.toml")),
        Err(ConfigError::FileReadError { .. })
    ));
}

#[test]
fn test_environment_requires_version_and_loader() {
    let mut config = AppConfig::default();
    assert!(config.environment().is_err());

    config.game_version = Some("  ".to_string());
    config.loader = Some(ModLoader::Quilt);
    assert!(config.environment().is_err());

    config.game_version = Some("1.20.1".to_string());
    let environment = config.environment().unwrap();
    assert_eq!(environment.to_string(), "1.20.1 on Quilt");
}

#[test]
fn test_validate_requires_existing_mods_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig {
        game_version: Some("1.20.1".to_string()),
        loader: Some(ModLoader::Fabric),
        mods_dir: Some(dir.path().join("missing")),
        ..AppConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationFailed { .. })
    ));

    config.mods_dir = Some(dir.path().to_path_buf());
    let target = config.validate().unwrap();
    assert_eq!(target.mods_dir, dir.path());
}

#[test]
fn test_derived_settings() {
    let config = AppConfig {
        cpu_jobs: Some(3),
        retries: 0,
        log_level: LogLevel::Trace,
        ..AppConfig::default()
    };

    let networking = config.networking_config();
    assert_eq!(networking.max_jobs, Some(3));
    assert!(networking.trace_requests);
    assert_eq!(config.retry_policy().attempts(), 1);
}

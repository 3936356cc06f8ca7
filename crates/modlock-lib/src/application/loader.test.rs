use super::*;
use crate::modpack::ModLoader;
use crate::primitives::ColorIntent;

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

fn write_config(dir: &tempfile::TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("modlock.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_cli_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        "game_version = \"1.19.2\"\nloader = \"forge\"\nretries = 5\n",
    );
    let path_arg = path.display().to_string();
    let path_arg = path_arg.as_str();

    let loaded = CliConfig::layer(
        cli(&["modlock", "--config", path_arg, "-g", "1.20.1", "build", "a.mods"]),
        &EnvironmentConfig::default(),
    )
    .unwrap();

    let config = loaded.app_config;
    assert_eq!(config.game_version.as_deref(), Some("1.20.1"));
    assert_eq!(config.loader, Some(ModLoader::Forge));
    assert_eq!(config.retries, 5);
    assert_eq!(config.config, Some(path));
    assert!(matches!(loaded.command, Some(crate::application::Commands::Build { .. })));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml").display().to_string();
    let missing = missing.as_str();

    let result = CliConfig::layer(
        cli(&["modlock", "--config", missing]),
        &EnvironmentConfig::default(),
    );

    assert!(matches!(result, Err(ConfigError::FileReadError { .. })));
}

#[test]
fn test_invalid_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "loader = \"rift\"\n").display().to_string();
    let path = path.as_str();

    let result = CliConfig::layer(
        cli(&["modlock", "--config", path]),
        &EnvironmentConfig::default(),
    );

    assert!(matches!(result, Err(ConfigError::FileParseError { .. })));
}

#[test]
fn test_color_environment_and_explicit_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "").display().to_string();
    let path = path.as_str();
    let no_color = EnvironmentConfig {
        no_color: Some("1".to_string()),
        ..EnvironmentConfig::default()
    };

    let from_env = CliConfig::layer(cli(&["modlock", "--config", path]), &no_color).unwrap();
    assert_eq!(from_env.app_config.color, ColorIntent::Never);

    let explicit = CliConfig::layer(
        cli(&["modlock", "--config", path, "--color", "always"]),
        &no_color,
    )
    .unwrap();
    assert_eq!(explicit.app_config.color, ColorIntent::Always);
}

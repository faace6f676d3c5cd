//! Configuration resolution tests
//!
//! Tests that manipulate PCS_CONFIG or the working directory are marked
//! with #[serial] so they never run in parallel.

use pcs_common::config::{ConfigResolver, ConfigSource, StudyConfig, CONFIG_ENV_VAR};
use pcs_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
#[serial]
fn test_env_var_used_when_no_cli_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("study.toml");
    fs::write(&path, "reference_method = \"from_env\"\n").unwrap();

    env::set_var(CONFIG_ENV_VAR, &path);
    let (config, source) = ConfigResolver::new(None).load().unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(source, ConfigSource::Environment(path));
    assert_eq!(config.reference_method, "from_env");
}

#[test]
#[serial]
fn test_cli_path_beats_env_var() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join("env.toml");
    let cli_path = dir.path().join("cli.toml");
    fs::write(&env_path, "context_method = \"env\"\n").unwrap();
    fs::write(&cli_path, "context_method = \"cli\"\n").unwrap();

    env::set_var(CONFIG_ENV_VAR, &env_path);
    let (config, source) = ConfigResolver::new(Some(cli_path.clone())).load().unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(source, ConfigSource::CommandLine(cli_path));
    assert_eq!(config.context_method, "cli");
}

#[test]
#[serial]
fn test_working_directory_file_is_discovered() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pcs.toml"), "[seeds]\npacks = 5\n").unwrap();

    env::remove_var(CONFIG_ENV_VAR);
    let previous = env::current_dir().unwrap();
    env::set_current_dir(dir.path()).unwrap();
    let result = ConfigResolver::new(None).load();
    env::set_current_dir(previous).unwrap();

    let (config, source) = result.unwrap();
    assert!(matches!(source, ConfigSource::WorkingDirectory(_)));
    assert_eq!(config.seeds.packs, 5);
}

#[test]
#[serial]
fn test_malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "reference_method = [unterminated\n").unwrap();

    match ConfigResolver::new(Some(path.clone())).load() {
        Err(Error::Toml { path: p, .. }) => assert_eq!(p, path),
        other => panic!("Expected Toml error, got {:?}", other),
    }
}

#[test]
fn test_full_file_round_trips_through_toml() {
    let config = StudyConfig::default();
    let text = toml::to_string(&config).unwrap();
    let back: StudyConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, config);
}

//! Integration tests for configuration loading
//!
//! Verifies file < environment < CLI precedence against real TOML files.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use roadscan_core::config::{
    env, load_config_with, ConfigError, ConfigOverrides, ConfigSource, ProviderKind,
};
use roadscan_core::identity::ProviderConfig;
use roadscan_core::theme::ThemeMode;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn vars(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<&str, &str> = pairs.iter().copied().collect();
    move |key| map.get(key).map(|v| (*v).to_string())
}

const FULL_CONFIG: &str = r#"
[prediction]
endpoint = "192.168.1.20:5000"
request_timeout_ms = 2500

[capture]
interval_ms = 750
frames_dir = "/srv/frames"
abort_in_flight_on_stop = false

[identity]
provider = "firebase"
api_key = "file-key"
base_url = "http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1"

[appearance]
theme = "light"
"#;

#[test]
fn test_file_values_applied() {
    let file = write_config(FULL_CONFIG);
    let config = load_config_with(Some(file.path().to_path_buf()), vars(&[])).unwrap();

    assert_eq!(config.endpoint, "http://192.168.1.20:5000");
    assert_eq!(config.endpoint_source(), ConfigSource::File);
    assert_eq!(config.request_timeout_ms, 2500);
    assert_eq!(config.interval_ms, 750);
    assert_eq!(config.frames_dir, PathBuf::from("/srv/frames"));
    assert!(!config.capture_config().abort_in_flight_on_stop);
    assert_eq!(config.provider, Some(ProviderKind::Firebase));
    assert_eq!(config.theme, ThemeMode::Light);
    assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    assert_eq!(
        config.provider_config(),
        ProviderConfig::Firebase {
            api_key: "file-key".to_string(),
            base_url: Some("http://127.0.0.1:9099/identitytoolkit.googleapis.com/v1".to_string()),
        }
    );
}

#[test]
fn test_env_beats_file() {
    let file = write_config(FULL_CONFIG);
    let config = load_config_with(
        Some(file.path().to_path_buf()),
        vars(&[
            (env::PREDICTION_ENDPOINT, "https://gpu.example.org"),
            (env::REQUEST_TIMEOUT_MS, "0"),
            (env::THEME, "dark"),
        ]),
    )
    .unwrap();

    assert_eq!(config.endpoint, "https://gpu.example.org");
    assert_eq!(config.endpoint_source(), ConfigSource::Env);
    assert_eq!(config.request_timeout(), None);
    assert_eq!(config.theme, ThemeMode::Dark);
    // Untouched by the environment
    assert_eq!(config.interval_ms, 750);
}

#[test]
fn test_cli_beats_env() {
    let mut config = load_config_with(
        None,
        vars(&[(env::PREDICTION_ENDPOINT, "https://gpu.example.org")]),
    )
    .unwrap();

    ConfigOverrides::new()
        .with_endpoint("localhost:8080")
        .with_frames_dir("/tmp/frames")
        .apply(&mut config)
        .unwrap();

    assert_eq!(config.endpoint, "http://localhost:8080");
    assert_eq!(config.endpoint_source(), ConfigSource::Cli);
    assert_eq!(config.frames_dir, PathBuf::from("/tmp/frames"));
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config =
        load_config_with(Some(dir.path().join("absent.toml")), vars(&[])).unwrap();
    assert_eq!(config.endpoint_source(), ConfigSource::Default);
    assert_eq!(config.config_file_path, None);
}

#[test]
fn test_partial_file() {
    let file = write_config("[capture]\ninterval_ms = 1000\n");
    let config = load_config_with(Some(file.path().to_path_buf()), vars(&[])).unwrap();
    assert_eq!(config.interval_ms, 1000);
    assert_eq!(config.endpoint, "http://127.0.0.1:5000");
    assert_eq!(config.endpoint_source(), ConfigSource::Default);
}

#[test]
fn test_malformed_toml() {
    let file = write_config("[prediction\nendpoint = ");
    let result = load_config_with(Some(file.path().to_path_buf()), vars(&[]));
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_validation_errors() {
    let file = write_config("[capture]\ninterval_ms = 0\n");
    let result = load_config_with(Some(file.path().to_path_buf()), vars(&[]));
    assert!(matches!(result, Err(ConfigError::Validation(_))));

    let file = write_config("[appearance]\ntheme = \"sepia\"\n");
    let result = load_config_with(Some(file.path().to_path_buf()), vars(&[]));
    assert!(matches!(result, Err(ConfigError::Validation(_))));

    let result = load_config_with(None, vars(&[(env::IDENTITY_PROVIDER, "firebase")]));
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

use std::path::PathBuf;

use curricula::error::ConfigError;
use curricula::management::{ConfigFileManager, config_file};
use curricula::settings::{PersistedConfig, Settings, SettingsOverrides};
use curricula::types::{ConfigKey, OutputFormat};

// Helper function to create settings with every field away from its default
fn create_custom_settings() -> Settings {
    Settings {
        base_url: "https://curricula.example.com/api".to_string(),
        api_token: Some("do-not-persist-me".to_string()),
        output_format: OutputFormat::Csv,
        output_file: String::new(),
        log_dir: PathBuf::from("/var/log/curricula"),
        start_time: Some("2024-01-01".to_string()),
        end_time: Some("2024-02-01".to_string()),
        duration: "2w3d".to_string(),
        max_items: 1000,
        max_pages: 12,
        per_page: 50,
        user_id: 77,
        body_data_file: Some(PathBuf::from("body.json")),
    }
}

#[tokio::test]
async fn test_round_trip_preserves_persistable_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let original = create_custom_settings();

    config_file::write(&path, &original).await.unwrap();
    let restored = config_file::read(&path).await.unwrap();

    assert_eq!(PersistedConfig::from(&restored), PersistedConfig::from(&original));
    assert_eq!(restored.base_url, original.base_url);
    assert_eq!(restored.output_format, OutputFormat::Csv);
    assert_eq!(restored.output_file, "");
    assert_eq!(restored.duration, "2w3d");

    // Runtime-only fields are not restored
    assert_eq!(restored.api_token, None);
    assert_eq!(restored.start_time, None);
    assert_eq!(restored.end_time, None);
    assert_eq!(restored.user_id, 0);
    assert_eq!(restored.body_data_file, None);
}

#[tokio::test]
async fn test_write_never_contains_api_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    config_file::write(&path, &create_custom_settings()).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("do-not-persist-me"));
    assert!(!raw.contains("api_token"));
    assert!(!raw.contains("user_id"));
    assert!(!raw.contains("body_data_file"));
    assert!(raw.contains("\"base_url\": \"https://curricula.example.com/api\""));
}

#[tokio::test]
async fn test_write_creates_parent_directories_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("config.json");

    config_file::write(&path, &create_custom_settings()).await.unwrap();
    assert!(path.is_file());

    config_file::write(&path, &Settings::default()).await.unwrap();
    let restored = config_file::read(&path).await.unwrap();
    assert_eq!(restored, Settings::default());
}

#[tokio::test]
async fn test_read_missing_keys_keep_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "per_page": 20, "output_format": "csv" }"#).unwrap();

    let settings = config_file::read(&path).await.unwrap();

    assert_eq!(settings.per_page, 20);
    assert_eq!(settings.output_format, OutputFormat::Csv);
    assert_eq!(settings.base_url, Settings::default().base_url);
    assert_eq!(settings.duration, Settings::default().duration);
}

#[tokio::test]
async fn test_read_ignores_hand_written_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "api_token": "from-file", "max_items": 5 }"#).unwrap();

    let settings = config_file::read(&path).await.unwrap();
    assert_eq!(settings.api_token, None);
    assert_eq!(settings.max_items, 5);
}

#[tokio::test]
async fn test_read_malformed_json_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ invalid json }").unwrap();

    match config_file::read(&path).await {
        Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected Parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_read_invalid_output_format_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "output_format": "xml" }"#).unwrap();

    let result = config_file::read(&path).await;
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[tokio::test]
async fn test_read_invalid_duration_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "duration": "10s" }"#).unwrap();

    let result = config_file::read(&path).await;
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[tokio::test]
async fn test_read_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = config_file::read(&path).await.unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[tokio::test]
async fn test_manager_set_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    config_file::write(&path, &Settings::default()).await.unwrap();

    let mut manager = ConfigFileManager::load(&path).await.unwrap();
    let changed = manager.set(&SettingsOverrides {
        base_url: Some("https://set.example.com".to_string()),
        per_page: Some(10),
        api_token: Some("never-stored".to_string()),
        ..Default::default()
    });
    assert_eq!(changed, vec![ConfigKey::BaseUrl, ConfigKey::PerPage]);
    manager.persist().await.unwrap();

    let reloaded = ConfigFileManager::load(&path).await.unwrap();
    assert_eq!(reloaded.settings().base_url, "https://set.example.com");
    assert_eq!(reloaded.settings().per_page, 10);
    assert!(!std::fs::read_to_string(&path).unwrap().contains("never-stored"));

    let mut manager = reloaded;
    manager.clear(&[ConfigKey::BaseUrl]);
    manager.persist().await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(!raw.contains("base_url"));

    let settings = config_file::read(&path).await.unwrap();
    assert_eq!(settings.base_url, Settings::default().base_url);
    assert_eq!(settings.per_page, 10);
}

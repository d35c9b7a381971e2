use std::path::{Path, PathBuf};

use chrono::{Duration, TimeZone, Utc};
use curricula::error::ConfigError;
use curricula::settings::{PersistedConfig, Settings, SettingsOverrides};
use curricula::types::{ConfigKey, OutputFormat, ValueSource};

fn test_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

#[test]
fn test_defaults() {
    let settings = Settings::default();

    assert_eq!(settings.base_url, "http://localhost:8080");
    assert_eq!(settings.api_token, None);
    assert_eq!(settings.output_format, OutputFormat::Json);
    assert_eq!(settings.output_file, "results.json");
    assert_eq!(settings.log_dir, PathBuf::from("./logs"));
    assert_eq!(settings.start_time, None);
    assert_eq!(settings.end_time, None);
    assert_eq!(settings.duration, "720h");
    assert_eq!(settings.max_items, -1);
    assert_eq!(settings.max_pages, -1);
    assert_eq!(settings.per_page, 100);
    assert_eq!(settings.user_id, 0);
    assert_eq!(settings.body_data_file, None);
}

#[test]
fn test_precedence_default_file_flag() {
    let file = PersistedConfig {
        base_url: Some("https://file.example.com".to_string()),
        per_page: Some(25),
        max_items: Some(500),
        ..Default::default()
    };
    let flags = SettingsOverrides {
        base_url: Some("https://flag.example.com".to_string()),
        api_token: Some("secret-token".to_string()),
        ..Default::default()
    };

    let settings = Settings::resolve(Some(&file), &flags);

    // Flag beats file
    assert_eq!(settings.base_url, "https://flag.example.com");
    // File beats default
    assert_eq!(settings.per_page, 25);
    assert_eq!(settings.max_items, 500);
    // Untouched keys keep defaults
    assert_eq!(settings.output_format, OutputFormat::Json);
    assert_eq!(settings.api_token.as_deref(), Some("secret-token"));

    assert_eq!(flags.source_of("base_url", Some(&file)), ValueSource::Flag);
    assert_eq!(flags.source_of("per_page", Some(&file)), ValueSource::File);
    assert_eq!(flags.source_of("duration", Some(&file)), ValueSource::Default);
    assert_eq!(flags.source_of("per_page", None), ValueSource::Default);
    assert_eq!(flags.source_of("api_token", None), ValueSource::Flag);
}

#[test]
fn test_resolve_without_file_or_flags_is_default() {
    let settings = Settings::resolve(None, &SettingsOverrides::default());
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_debug_masks_api_token() {
    let settings = Settings {
        api_token: Some("super-secret-token".to_string()),
        ..Default::default()
    };

    let debug = format!("{:?}", settings);
    assert!(!debug.contains("super-secret-token"));
    assert!(debug.contains("supe****"));
}

#[test]
fn test_persisted_config_excludes_runtime_values() {
    let settings = Settings {
        api_token: Some("super-secret-token".to_string()),
        start_time: Some("2024-01-01".to_string()),
        user_id: 42,
        body_data_file: Some(PathBuf::from("body.json")),
        ..Default::default()
    };

    let json = serde_json::to_value(PersistedConfig::from(&settings)).unwrap();
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();

    let mut expected: Vec<&str> = ConfigKey::ALL.iter().map(|k| k.as_str()).collect();
    expected.sort();
    let mut actual = keys.clone();
    actual.sort();
    assert_eq!(actual, expected);
    assert!(!json.to_string().contains("super-secret-token"));
}

#[test]
fn test_persisted_config_merge_and_clear() {
    let mut file = PersistedConfig::default();
    let flags = SettingsOverrides {
        base_url: Some("https://api.example.com".to_string()),
        api_token: Some("token".to_string()),
        max_pages: Some(3),
        user_id: Some(7),
        ..Default::default()
    };

    let changed = file.merge_overrides(&flags);
    assert_eq!(changed, vec![ConfigKey::BaseUrl, ConfigKey::MaxPages]);
    assert!(file.contains(ConfigKey::BaseUrl));
    assert!(file.contains(ConfigKey::MaxPages));
    assert!(!file.contains(ConfigKey::PerPage));

    assert_eq!(flags.runtime_only(), vec!["api_token", "user_id"]);

    file.clear(ConfigKey::BaseUrl);
    assert!(!file.contains(ConfigKey::BaseUrl));
    assert_eq!(file.max_pages, Some(3));
}

#[test]
fn test_persisted_config_validate_rejects_bad_duration() {
    let file = PersistedConfig {
        duration: Some("3 fortnights".to_string()),
        ..Default::default()
    };

    match file.validate() {
        Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "duration"),
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_date_range_from_duration_only() {
    let settings = Settings::default();
    let range = settings.date_range(test_now()).unwrap();

    assert_eq!(range.end, test_now());
    assert_eq!(range.start, test_now() - Duration::days(30));
}

#[test]
fn test_date_range_with_bounds() {
    let start_only = Settings {
        start_time: Some("2024-01-01".to_string()),
        duration: "1w".to_string(),
        ..Default::default()
    };
    let range = start_only.date_range(test_now()).unwrap();
    assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap());

    let end_only = Settings {
        end_time: Some("2024-01-08T00:00:00Z".to_string()),
        duration: "2d".to_string(),
        ..Default::default()
    };
    let range = end_only.date_range(test_now()).unwrap();
    assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap());

    // Both bounds given: the duration is ignored
    let both = Settings {
        start_time: Some("2024-01-01".to_string()),
        end_time: Some("2024-01-03".to_string()),
        duration: "not used".to_string(),
        ..Default::default()
    };
    let range = both.date_range(test_now()).unwrap();
    assert_eq!(range.end - range.start, Duration::days(2));
}

#[test]
fn test_date_range_invalid_inputs() {
    let reversed = Settings {
        start_time: Some("2024-02-01".to_string()),
        end_time: Some("2024-01-01".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        reversed.date_range(test_now()),
        Err(ConfigError::InvalidValue { .. })
    ));

    let bad_start = Settings {
        start_time: Some("yesterday".to_string()),
        ..Default::default()
    };
    match bad_start.date_range(test_now()) {
        Err(ConfigError::InvalidValue { key, message }) => {
            assert_eq!(key, "start_time");
            assert!(message.contains("yesterday"));
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }

    let bad_duration = Settings {
        duration: "5y".to_string(),
        ..Default::default()
    };
    assert!(bad_duration.date_range(test_now()).is_err());
}

#[test]
fn test_limits_and_page_size() {
    let settings = Settings::default();
    assert_eq!(settings.item_limit(), None);
    assert_eq!(settings.page_limit(), None);
    assert_eq!(settings.effective_per_page(), 100);

    let capped = Settings {
        max_items: 250,
        max_pages: 0,
        per_page: 500,
        ..Default::default()
    };
    assert_eq!(capped.item_limit(), Some(250));
    assert_eq!(capped.page_limit(), Some(0));
    assert_eq!(capped.effective_per_page(), 100);

    let zero = Settings {
        per_page: 0,
        ..Default::default()
    };
    assert_eq!(zero.effective_per_page(), 1);
}

#[test]
fn test_output_target_and_user_filter() {
    let settings = Settings::default();
    assert_eq!(settings.output_target(), Some(Path::new("results.json")));
    assert_eq!(settings.user_filter(), None);

    let stdout = Settings {
        output_file: String::new(),
        user_id: 9,
        ..Default::default()
    };
    assert_eq!(stdout.output_target(), None);
    assert_eq!(stdout.user_filter(), Some(9));
}

#[test]
fn test_body_data_required_for_mutating_methods() {
    let settings = Settings::default();
    assert_eq!(settings.body_data_for("GET").unwrap(), None);
    assert_eq!(settings.body_data_for("delete").unwrap(), None);

    for method in ["POST", "put", "Patch"] {
        match settings.body_data_for(method) {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "body_data_file"),
            other => panic!("expected InvalidValue for {method}, got {:?}", other),
        }
    }

    let with_body = Settings {
        body_data_file: Some(PathBuf::from("body.json")),
        ..Default::default()
    };
    assert_eq!(
        with_body.body_data_for("POST").unwrap(),
        Some(Path::new("body.json"))
    );
}

#[test]
fn test_default_valued_file_entries_report_default_source() {
    let file = PersistedConfig::from(&Settings::default());
    let flags = SettingsOverrides::default();

    for key in ConfigKey::ALL {
        assert!(file.contains(key));
        assert!(!file.overrides_default(key));
        assert_eq!(flags.source_of(key.as_str(), Some(&file)), ValueSource::Default);
    }

    let edited = PersistedConfig {
        per_page: Some(50),
        ..file
    };
    assert!(edited.overrides_default(ConfigKey::PerPage));
    assert_eq!(flags.source_of("per_page", Some(&edited)), ValueSource::File);
    assert_eq!(flags.source_of("base_url", Some(&edited)), ValueSource::Default);
}

use std::{io::ErrorKind, path::Path};

use serde_json::json;
use tabled::Table;

use crate::{
    config::InitOutcome,
    error,
    error::ConfigError,
    info,
    logging::AppLogger,
    management::ConfigFileManager,
    settings::{PersistedConfig, Settings, SettingsOverrides},
    success,
    types::{ConfigKey, SettingTableRow},
    utils, warning,
};

/// Prints the effective settings and the layer each value came from.
///
/// The API token is masked; unset optional values show as `-`.
pub fn show_config(settings: &Settings, outcome: &InitOutcome, flags: &SettingsOverrides) {
    let rows: Vec<SettingTableRow> = setting_rows(settings)
        .into_iter()
        .map(|(key, value)| SettingTableRow {
            setting: key.to_string(),
            value,
            source: flags.source_of(key, outcome.persisted()).to_string(),
        })
        .collect();

    println!("{}", Table::new(rows));
    match outcome.config_path() {
        Some(path) if !outcome.is_degraded() => info!("Config file: {}", path.display()),
        Some(path) => warning!(
            "Config file {} is not in use; run `curricula config clear --all` to reset it.",
            path.display()
        ),
        None => warning!("No config file in use; values come from flags and defaults."),
    }
}

/// Prints the location of the config file.
pub fn config_path(outcome: &InitOutcome) {
    match outcome.config_path() {
        Some(path) => println!("{}", path.display()),
        None => error!("No usable config file. Use --config-dir to point to a writable directory."),
    }
}

/// Persists the persist-able flags given on the command line.
///
/// A config file that cannot be parsed is replaced by a record holding only
/// the given values.
pub async fn set_config(outcome: &InitOutcome, flags: &SettingsOverrides, app_log: &AppLogger) {
    let path = require_config_path(outcome);
    let mut manager = load_manager(path, app_log).await;

    for name in flags.runtime_only() {
        warning!("{} is a per-run value and is not stored in the config file.", name);
    }

    let changed = manager.set(flags);
    if changed.is_empty() {
        warning!("Nothing to store. Pass one or more setting flags, e.g. --base-url.");
        return;
    }

    persist(&manager, &changed, "config updated", app_log).await;
    success!("Updated {}", join_keys(&changed));
}

/// Resets keys in the config file to their compiled-in defaults.
///
/// With `all` the file is rewritten without reading it first, which also
/// repairs a file that can no longer be parsed.
pub async fn clear_config(
    outcome: &InitOutcome,
    keys: &[ConfigKey],
    all: bool,
    app_log: &AppLogger,
) {
    let keys: Vec<ConfigKey> = if all {
        ConfigKey::ALL.to_vec()
    } else {
        keys.to_vec()
    };
    if keys.is_empty() {
        warning!("Nothing to clear. Name one or more keys or pass --all.");
        return;
    }

    let path = require_config_path(outcome);
    let mut manager = if all {
        ConfigFileManager::new(path, PersistedConfig::default())
    } else {
        load_manager(path, app_log).await
    };
    manager.clear(&keys);

    persist(&manager, &keys, "config cleared", app_log).await;
    success!("Cleared {}", join_keys(&keys));
}

fn require_config_path(outcome: &InitOutcome) -> &Path {
    match outcome.config_path() {
        Some(path) => path,
        None => error!("No usable config file. Use --config-dir to point to a writable directory."),
    }
}

async fn load_manager(path: &Path, app_log: &AppLogger) -> ConfigFileManager {
    match ConfigFileManager::load(path).await {
        Ok(manager) => manager,
        Err(e) if is_replaceable(&e) => {
            app_log.warn(
                "config file unreadable, starting from an empty record",
                json!({ "path": path.display().to_string(), "error": e.to_string() }),
            );
            warning!("Replacing unreadable config file. Err: {}", e);
            ConfigFileManager::new(path, PersistedConfig::default())
        }
        Err(e) => {
            app_log.error(
                "failed to load config file",
                &e,
                json!({ "path": path.display().to_string() }),
            );
            error!("Cannot load config file: {}", e);
        }
    }
}

// Broken or missing content; the file itself can still be written.
fn is_replaceable(err: &ConfigError) -> bool {
    match err {
        ConfigError::Parse { .. } | ConfigError::InvalidValue { .. } => true,
        ConfigError::Io { source, .. } => source.kind() == ErrorKind::NotFound,
        _ => false,
    }
}

async fn persist(
    manager: &ConfigFileManager,
    keys: &[ConfigKey],
    msg: &str,
    app_log: &AppLogger,
) {
    let details = json!({
        "path": manager.path().display().to_string(),
        "keys": keys.iter().map(ConfigKey::as_str).collect::<Vec<_>>(),
    });

    if let Err(e) = manager.persist().await {
        app_log.error("failed to write config file", &e, details.clone());
        error!("Cannot write config file: {}", e);
    }
    app_log.info(msg, details);
}

fn join_keys(keys: &[ConfigKey]) -> String {
    keys.iter()
        .map(ConfigKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn setting_rows(settings: &Settings) -> Vec<(&'static str, String)> {
    let optional = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    vec![
        ("base_url", settings.base_url.clone()),
        (
            "api_token",
            optional(settings.api_token.as_deref().map(utils::mask_secret)),
        ),
        ("output_format", settings.output_format.to_string()),
        (
            "output_file",
            settings
                .output_target()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<stdout>".to_string()),
        ),
        ("log_dir", settings.log_dir.display().to_string()),
        ("start_time", optional(settings.start_time.clone())),
        ("end_time", optional(settings.end_time.clone())),
        ("duration", settings.duration.clone()),
        ("max_items", settings.max_items.to_string()),
        ("max_pages", settings.max_pages.to_string()),
        ("per_page", settings.effective_per_page().to_string()),
        ("user_id", optional(settings.user_filter().map(|id| id.to_string()))),
        (
            "body_data_file",
            optional(
                settings
                    .body_data_file
                    .as_ref()
                    .map(|p| p.display().to_string()),
            ),
        ),
    ]
}

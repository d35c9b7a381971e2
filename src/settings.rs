//! Resolved configuration for a single invocation.
//!
//! Values are layered in a fixed order, later layers winning:
//! 1. Compiled-in defaults ([`Settings::default`])
//! 2. The persisted config file ([`PersistedConfig`])
//! 3. Flags and `CURRICULA_*` environment variables ([`SettingsOverrides`])
//!
//! Only the fields listed in [`PersistedConfig`] are ever written to disk. The
//! API token and the per-run values (date range, user filter, body file) are
//! excluded by that allow-list.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Utc};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{
    common,
    error::ConfigError,
    types::{ConfigKey, OutputFormat, ValueSource},
    utils,
};

/// HTTP verbs that carry a request body.
const BODY_METHODS: [&str; 3] = ["POST", "PUT", "PATCH"];

#[derive(Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub api_token: Option<String>,
    pub output_format: OutputFormat,
    /// Empty means standard output.
    pub output_file: String,
    pub log_dir: PathBuf,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: String,
    /// Negative means unlimited.
    pub max_items: i64,
    /// Negative means unlimited.
    pub max_pages: i64,
    pub per_page: u32,
    /// Zero means unset.
    pub user_id: u64,
    pub body_data_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: common::DEFAULT_BASE_URL.to_string(),
            api_token: None,
            output_format: OutputFormat::default(),
            output_file: common::DEFAULT_OUTPUT_FILE.to_string(),
            log_dir: PathBuf::from(common::DEFAULT_LOG_DIR),
            start_time: None,
            end_time: None,
            duration: common::DEFAULT_DURATION.to_string(),
            max_items: common::DEFAULT_MAX_ITEMS,
            max_pages: common::DEFAULT_MAX_PAGES,
            per_page: common::DEFAULT_PER_PAGE,
            user_id: 0,
            body_data_file: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_deref().map(utils::mask_secret))
            .field("output_format", &self.output_format)
            .field("output_file", &self.output_file)
            .field("log_dir", &self.log_dir)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("duration", &self.duration)
            .field("max_items", &self.max_items)
            .field("max_pages", &self.max_pages)
            .field("per_page", &self.per_page)
            .field("user_id", &self.user_id)
            .field("body_data_file", &self.body_data_file)
            .finish()
    }
}

/// Inclusive time window a command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Settings {
    /// Computes the effective settings: defaults, then file, then flags.
    pub fn resolve(file: Option<&PersistedConfig>, flags: &SettingsOverrides) -> Self {
        let mut settings = Self::default();
        if let Some(file) = file {
            settings.apply_persisted(file);
        }
        settings.apply_overrides(flags);
        settings
    }

    pub fn apply_persisted(&mut self, file: &PersistedConfig) {
        if let Some(v) = &file.base_url {
            self.base_url = v.clone();
        }
        if let Some(v) = file.output_format {
            self.output_format = v;
        }
        if let Some(v) = &file.output_file {
            self.output_file = v.clone();
        }
        if let Some(v) = &file.log_dir {
            self.log_dir = v.clone();
        }
        if let Some(v) = &file.duration {
            self.duration = v.clone();
        }
        if let Some(v) = file.max_items {
            self.max_items = v;
        }
        if let Some(v) = file.max_pages {
            self.max_pages = v;
        }
        if let Some(v) = file.per_page {
            self.per_page = v;
        }
    }

    pub fn apply_overrides(&mut self, flags: &SettingsOverrides) {
        if let Some(v) = &flags.base_url {
            self.base_url = v.clone();
        }
        if let Some(v) = &flags.api_token {
            self.api_token = Some(v.clone());
        }
        if let Some(v) = flags.output_format {
            self.output_format = v;
        }
        if let Some(v) = &flags.output_file {
            self.output_file = v.clone();
        }
        if let Some(v) = &flags.log_dir {
            self.log_dir = v.clone();
        }
        if let Some(v) = &flags.start_time {
            self.start_time = Some(v.clone());
        }
        if let Some(v) = &flags.end_time {
            self.end_time = Some(v.clone());
        }
        if let Some(v) = &flags.duration {
            self.duration = v.clone();
        }
        if let Some(v) = flags.max_items {
            self.max_items = v;
        }
        if let Some(v) = flags.max_pages {
            self.max_pages = v;
        }
        if let Some(v) = flags.per_page {
            self.per_page = v;
        }
        if let Some(v) = flags.user_id {
            self.user_id = v;
        }
        if let Some(v) = &flags.body_data_file {
            self.body_data_file = Some(v.clone());
        }
    }

    pub fn duration(&self) -> Result<Duration, ConfigError> {
        utils::parse_duration(&self.duration).map_err(|e| ConfigError::invalid("duration", e))
    }

    /// Resolves start, end and duration into a concrete window.
    ///
    /// With both bounds set the duration is ignored; with one bound the other
    /// is derived from the duration; with none the window ends at `now`.
    pub fn date_range(&self, now: DateTime<Utc>) -> Result<DateRange, ConfigError> {
        let start = parse_bound("start_time", self.start_time.as_deref())?;
        let end = parse_bound("end_time", self.end_time.as_deref())?;

        let range = match (start, end) {
            (Some(start), Some(end)) => DateRange { start, end },
            (Some(start), None) => DateRange {
                start,
                end: shift(start, self.duration()?)?,
            },
            (None, Some(end)) => DateRange {
                start: shift(end, -self.duration()?)?,
                end,
            },
            (None, None) => DateRange {
                start: shift(now, -self.duration()?)?,
                end: now,
            },
        };

        if range.start > range.end {
            return Err(ConfigError::invalid(
                "start_time",
                format!("{} is after end time {}", range.start, range.end),
            ));
        }

        Ok(range)
    }

    pub fn item_limit(&self) -> Option<u64> {
        u64::try_from(self.max_items).ok()
    }

    pub fn page_limit(&self) -> Option<u64> {
        u64::try_from(self.max_pages).ok()
    }

    /// Page size clamped to what the API accepts.
    pub fn effective_per_page(&self) -> u32 {
        self.per_page.clamp(1, common::MAX_PER_PAGE)
    }

    /// Destination file for results, `None` meaning standard output.
    pub fn output_target(&self) -> Option<&Path> {
        if self.output_file.trim().is_empty() {
            None
        } else {
            Some(Path::new(&self.output_file))
        }
    }

    pub fn user_filter(&self) -> Option<u64> {
        (self.user_id != 0).then_some(self.user_id)
    }

    /// Body file for a request; required for verbs that carry a body.
    pub fn body_data_for(&self, method: &str) -> Result<Option<&Path>, ConfigError> {
        let method = method.trim().to_ascii_uppercase();
        if !BODY_METHODS.contains(&method.as_str()) {
            return Ok(None);
        }

        self.body_data_file
            .as_deref()
            .map(Some)
            .ok_or_else(|| {
                ConfigError::invalid(
                    "body_data_file",
                    format!("a body data file is required for {method} requests"),
                )
            })
    }
}

fn shift(at: DateTime<Utc>, by: Duration) -> Result<DateTime<Utc>, ConfigError> {
    at.checked_add_signed(by)
        .ok_or_else(|| ConfigError::invalid("duration", "date range is out of bounds"))
}

fn parse_bound(key: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, ConfigError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => utils::parse_timestamp(v)
            .map(Some)
            .map_err(|e| ConfigError::invalid(key, e)),
        None => Ok(None),
    }
}

/// The allow-listed subset of [`Settings`] stored in `config.json`.
///
/// Keys missing from the file deserialize to `None` and leave the compiled-in
/// default untouched. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl From<&Settings> for PersistedConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            base_url: Some(settings.base_url.clone()),
            output_format: Some(settings.output_format),
            output_file: Some(settings.output_file.clone()),
            log_dir: Some(settings.log_dir.clone()),
            duration: Some(settings.duration.clone()),
            max_items: Some(settings.max_items),
            max_pages: Some(settings.max_pages),
            per_page: Some(settings.per_page),
        }
    }
}

impl PersistedConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(duration) = &self.duration {
            utils::parse_duration(duration)
                .map_err(|e| ConfigError::invalid(ConfigKey::Duration.as_str(), e))?;
        }
        Ok(())
    }

    pub fn contains(&self, key: ConfigKey) -> bool {
        match key {
            ConfigKey::BaseUrl => self.base_url.is_some(),
            ConfigKey::OutputFormat => self.output_format.is_some(),
            ConfigKey::OutputFile => self.output_file.is_some(),
            ConfigKey::LogDir => self.log_dir.is_some(),
            ConfigKey::Duration => self.duration.is_some(),
            ConfigKey::MaxItems => self.max_items.is_some(),
            ConfigKey::MaxPages => self.max_pages.is_some(),
            ConfigKey::PerPage => self.per_page.is_some(),
        }
    }

    /// Whether the file sets `key` to a value other than its compiled-in
    /// default.
    pub fn overrides_default(&self, key: ConfigKey) -> bool {
        let defaults = PersistedConfig::from(&Settings::default());
        match key {
            ConfigKey::BaseUrl => self.base_url.is_some() && self.base_url != defaults.base_url,
            ConfigKey::OutputFormat => {
                self.output_format.is_some() && self.output_format != defaults.output_format
            }
            ConfigKey::OutputFile => {
                self.output_file.is_some() && self.output_file != defaults.output_file
            }
            ConfigKey::LogDir => self.log_dir.is_some() && self.log_dir != defaults.log_dir,
            ConfigKey::Duration => self.duration.is_some() && self.duration != defaults.duration,
            ConfigKey::MaxItems => self.max_items.is_some() && self.max_items != defaults.max_items,
            ConfigKey::MaxPages => self.max_pages.is_some() && self.max_pages != defaults.max_pages,
            ConfigKey::PerPage => self.per_page.is_some() && self.per_page != defaults.per_page,
        }
    }

    /// Removes a key so it falls back to its compiled-in default.
    pub fn clear(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::BaseUrl => self.base_url = None,
            ConfigKey::OutputFormat => self.output_format = None,
            ConfigKey::OutputFile => self.output_file = None,
            ConfigKey::LogDir => self.log_dir = None,
            ConfigKey::Duration => self.duration = None,
            ConfigKey::MaxItems => self.max_items = None,
            ConfigKey::MaxPages => self.max_pages = None,
            ConfigKey::PerPage => self.per_page = None,
        }
    }

    /// Copies the persist-able values present in `flags`, returning the keys
    /// that were set.
    pub fn merge_overrides(&mut self, flags: &SettingsOverrides) -> Vec<ConfigKey> {
        let mut changed = Vec::new();

        if let Some(v) = &flags.base_url {
            self.base_url = Some(v.clone());
            changed.push(ConfigKey::BaseUrl);
        }
        if let Some(v) = flags.output_format {
            self.output_format = Some(v);
            changed.push(ConfigKey::OutputFormat);
        }
        if let Some(v) = &flags.output_file {
            self.output_file = Some(v.clone());
            changed.push(ConfigKey::OutputFile);
        }
        if let Some(v) = &flags.log_dir {
            self.log_dir = Some(v.clone());
            changed.push(ConfigKey::LogDir);
        }
        if let Some(v) = &flags.duration {
            self.duration = Some(v.clone());
            changed.push(ConfigKey::Duration);
        }
        if let Some(v) = flags.max_items {
            self.max_items = Some(v);
            changed.push(ConfigKey::MaxItems);
        }
        if let Some(v) = flags.max_pages {
            self.max_pages = Some(v);
            changed.push(ConfigKey::MaxPages);
        }
        if let Some(v) = flags.per_page {
            self.per_page = Some(v);
            changed.push(ConfigKey::PerPage);
        }

        changed
    }
}

/// Per-invocation overrides, highest precedence.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct SettingsOverrides {
    /// API endpoint root
    #[arg(long, global = true, env = "CURRICULA_BASE_URL")]
    pub base_url: Option<String>,

    /// API token (never written to the config file)
    #[arg(long, global = true, env = "CURRICULA_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Result format: json or csv
    #[arg(long, global = true, env = "CURRICULA_OUTPUT_FORMAT", value_parser = utils::parse_output_format)]
    pub output_format: Option<OutputFormat>,

    /// Result file; an empty value writes to standard output
    #[arg(long, global = true, env = "CURRICULA_OUTPUT_FILE")]
    pub output_file: Option<String>,

    /// Directory for the application and API logs
    #[arg(long, global = true, env = "CURRICULA_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Start of the date range (RFC 3339 or YYYY-MM-DD)
    #[arg(long, global = true, env = "CURRICULA_START_TIME")]
    pub start_time: Option<String>,

    /// End of the date range (RFC 3339 or YYYY-MM-DD)
    #[arg(long, global = true, env = "CURRICULA_END_TIME")]
    pub end_time: Option<String>,

    /// Length of the date range, e.g. 720h, 30d, 2w, 1mo
    #[arg(long, global = true, env = "CURRICULA_DURATION", value_parser = utils::validate_duration)]
    pub duration: Option<String>,

    /// Maximum number of items to return (-1 for unlimited)
    #[arg(long, global = true, env = "CURRICULA_MAX_ITEMS", allow_negative_numbers = true)]
    pub max_items: Option<i64>,

    /// Maximum number of pages to retrieve (-1 for unlimited)
    #[arg(long, global = true, env = "CURRICULA_MAX_PAGES", allow_negative_numbers = true)]
    pub max_pages: Option<i64>,

    /// Items per page (capped at 100)
    #[arg(long, global = true, env = "CURRICULA_PER_PAGE")]
    pub per_page: Option<u32>,

    /// User ID to filter by
    #[arg(long, global = true, env = "CURRICULA_USER_ID")]
    pub user_id: Option<u64>,

    /// File containing the JSON body for POST/PUT/PATCH requests
    #[arg(long, global = true, env = "CURRICULA_BODY_DATA_FILE")]
    pub body_data_file: Option<PathBuf>,
}

impl SettingsOverrides {
    /// Names of the given flags that are never persisted.
    pub fn runtime_only(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.api_token.is_some() {
            names.push("api_token");
        }
        if self.start_time.is_some() {
            names.push("start_time");
        }
        if self.end_time.is_some() {
            names.push("end_time");
        }
        if self.user_id.is_some() {
            names.push("user_id");
        }
        if self.body_data_file.is_some() {
            names.push("body_data_file");
        }
        names
    }

    /// Which layer a setting was resolved from.
    ///
    /// A file value equal to the compiled-in default reports as
    /// [`ValueSource::Default`], so a freshly written default file does not
    /// claim every key.
    pub fn source_of(&self, key: &str, file: Option<&PersistedConfig>) -> ValueSource {
        let from_flag = match key {
            "base_url" => self.base_url.is_some(),
            "api_token" => self.api_token.is_some(),
            "output_format" => self.output_format.is_some(),
            "output_file" => self.output_file.is_some(),
            "log_dir" => self.log_dir.is_some(),
            "start_time" => self.start_time.is_some(),
            "end_time" => self.end_time.is_some(),
            "duration" => self.duration.is_some(),
            "max_items" => self.max_items.is_some(),
            "max_pages" => self.max_pages.is_some(),
            "per_page" => self.per_page.is_some(),
            "user_id" => self.user_id.is_some(),
            "body_data_file" => self.body_data_file.is_some(),
            _ => false,
        };
        if from_flag {
            return ValueSource::Flag;
        }

        let from_file = key
            .parse::<ConfigKey>()
            .ok()
            .zip(file)
            .is_some_and(|(k, f)| f.overrides_default(k));
        if from_file {
            ValueSource::File
        } else {
            ValueSource::Default
        }
    }
}

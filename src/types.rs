use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Rendering format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Json, OutputFormat::Csv];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "invalid output format '{other}'; expected one of: json, csv"
            )),
        }
    }
}

/// A key of the persisted configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    BaseUrl,
    OutputFormat,
    OutputFile,
    LogDir,
    Duration,
    MaxItems,
    MaxPages,
    PerPage,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 8] = [
        ConfigKey::BaseUrl,
        ConfigKey::OutputFormat,
        ConfigKey::OutputFile,
        ConfigKey::LogDir,
        ConfigKey::Duration,
        ConfigKey::MaxItems,
        ConfigKey::MaxPages,
        ConfigKey::PerPage,
    ];

    /// Name of the key as written in `config.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::BaseUrl => "base_url",
            ConfigKey::OutputFormat => "output_format",
            ConfigKey::OutputFile => "output_file",
            ConfigKey::LogDir => "log_dir",
            ConfigKey::Duration => "duration",
            ConfigKey::MaxItems => "max_items",
            ConfigKey::MaxPages => "max_pages",
            ConfigKey::PerPage => "per_page",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| {
                let valid: Vec<&str> = ConfigKey::ALL.iter().map(|k| k.as_str()).collect();
                format!(
                    "invalid config key '{}'; expected one of: {}",
                    s.trim(),
                    valid.join(", ")
                )
            })
    }
}

/// Layer a resolved setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Default,
    File,
    Flag,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueSource::Default => "default",
            ValueSource::File => "file",
            ValueSource::Flag => "flag",
        };
        f.write_str(s)
    }
}

#[derive(Tabled)]
pub struct SettingTableRow {
    pub setting: String,
    pub value: String,
    pub source: String,
}

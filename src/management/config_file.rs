use std::path::{Path, PathBuf};

use crate::{
    error::ConfigError,
    settings::{PersistedConfig, Settings, SettingsOverrides},
    types::ConfigKey,
};

/// Owns the persisted configuration record at a given path.
pub struct ConfigFileManager {
    path: PathBuf,
    config: PersistedConfig,
}

impl ConfigFileManager {
    pub fn new(path: impl Into<PathBuf>, config: PersistedConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Reads and validates the record stored at `path`.
    ///
    /// Keys missing from the file stay unset; unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The file cannot be read ([`ConfigError::Io`])
    /// - The content is not valid JSON or holds an unknown output format
    ///   ([`ConfigError::Parse`])
    /// - The duration expression is invalid ([`ConfigError::InvalidValue`])
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let json = async_fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::io(&path, e))?;
        let config: PersistedConfig =
            serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        config.validate()?;

        Ok(Self { path, config })
    }

    /// Writes the record as pretty JSON, creating parent directories.
    /// An existing file is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] naming the directory or file that could not
    /// be created or written.
    pub async fn persist(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(&self.config).map_err(ConfigError::Serialize)?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| ConfigError::io(&self.path, e))
    }

    /// Stores the persist-able values given as flags and returns their keys.
    pub fn set(&mut self, flags: &SettingsOverrides) -> Vec<ConfigKey> {
        self.config.merge_overrides(flags)
    }

    /// Resets the given keys to their compiled-in defaults.
    pub fn clear(&mut self, keys: &[ConfigKey]) {
        for key in keys {
            self.config.clear(*key);
        }
    }

    /// Settings as described by this file alone.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.apply_persisted(&self.config);
        settings
    }

    pub fn config(&self) -> &PersistedConfig {
        &self.config
    }

    pub fn into_config(self) -> PersistedConfig {
        self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Writes the persist-able subset of `settings` to `path`.
///
/// The API token and per-run values are never written.
///
/// # Arguments
///
/// * `path` - Destination file; missing parent directories are created
/// * `settings` - Settings whose persist-able fields are stored
///
/// # Errors
///
/// Fails with [`ConfigError::Io`] when the directory or file cannot be
/// written.
///
/// # Example
///
/// ```
/// use curricula::{management::config_file, settings::Settings};
///
/// #[tokio::main]
/// async fn main() {
///     let path = std::env::temp_dir().join("curricula").join("config.json");
///     config_file::write(&path, &Settings::default()).await.unwrap();
///     let settings = config_file::read(&path).await.unwrap();
///     assert_eq!(settings, Settings::default());
/// }
/// ```
pub async fn write(path: impl AsRef<Path>, settings: &Settings) -> Result<(), ConfigError> {
    ConfigFileManager::new(path.as_ref(), PersistedConfig::from(settings))
        .persist()
        .await
}

/// Reads `path` into settings; keys missing from the file keep their defaults.
///
/// # Errors
///
/// Same as [`ConfigFileManager::load`].
pub async fn read(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    ConfigFileManager::load(path.as_ref())
        .await
        .map(|manager| manager.settings())
}

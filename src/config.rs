//! Configuration bootstrap for the Curricula CLI.
//!
//! Locates the per-user configuration directory, creates it together with a
//! default `config.json` on first run, and loads the file into [`Settings`] on
//! every later run. The directory lives at:
//! - Linux: `~/.config/Curricula`
//! - macOS: `~/Library/Application Support/Curricula`
//! - Windows: `%APPDATA%\Curricula`
//!
//! Failures never stop the CLI. They are logged, the user is told to fall back
//! to `--config-dir` or flags, and the command continues with defaults.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    common,
    error::ConfigError,
    management::{ConfigFileManager, config_file},
    settings::{PersistedConfig, Settings},
    warning,
};

/// How the configuration bootstrap ended.
#[derive(Debug)]
pub enum InitOutcome {
    /// The directory was missing; it was created with a default file.
    DirectoryCreated { path: PathBuf },
    /// The directory existed without a file; a default file was written.
    FileCreated { path: PathBuf },
    /// An existing file was read and merged into the settings.
    Loaded {
        path: PathBuf,
        persisted: PersistedConfig,
    },
    /// Something failed; settings were left untouched. `path` is the config
    /// file location when the directory could be resolved.
    Degraded {
        path: Option<PathBuf>,
        error: ConfigError,
    },
}

impl InitOutcome {
    /// Location of the config file, if it could be resolved.
    ///
    /// A degraded outcome still reports the path so commands such as
    /// `config set` or `config clear --all` can rewrite a broken file.
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            InitOutcome::DirectoryCreated { path }
            | InitOutcome::FileCreated { path }
            | InitOutcome::Loaded { path, .. } => Some(path),
            InitOutcome::Degraded { path, .. } => path.as_deref(),
        }
    }

    /// Values read from an existing file.
    pub fn persisted(&self) -> Option<&PersistedConfig> {
        match self {
            InitOutcome::Loaded { persisted, .. } => Some(persisted),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, InitOutcome::Degraded { .. })
    }
}

/// Returns `<user-config-dir>/Curricula`.
///
/// # Errors
///
/// Returns [`ConfigError::ConfigDirUnavailable`] when the platform has no
/// per-user config directory (for example when `HOME` is unset).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(common::APP_NAME))
        .ok_or(ConfigError::ConfigDirUnavailable)
}

/// Resolves the config directory, preferring an explicit override.
///
/// # Arguments
///
/// * `dir_override` - Directory given with `--config-dir`, if any
///
/// # Errors
///
/// Only fails when no override is given and the default directory cannot be
/// determined.
pub fn config_dir(dir_override: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match dir_override {
        Some(dir) => Ok(dir.to_path_buf()),
        None => default_config_dir(),
    }
}

/// Loads `CURRICULA_*` variables from the `.env` file in the config directory.
///
/// Variables already present in the environment win. A missing file is not an
/// error, so a fresh install needs no `.env` at all.
///
/// # File Location
///
/// - Linux: `~/.config/Curricula/.env`
/// - macOS: `~/Library/Application Support/Curricula/.env`
/// - Windows: `%APPDATA%\Curricula\.env`
///
/// # Errors
///
/// This function will return an error if:
/// - The config directory cannot be determined
/// - The `.env` file exists but cannot be read or parsed
///
/// # Example
///
/// ```
/// use curricula::{config, warning};
///
/// if let Err(e) = config::load_env() {
///     warning!("Cannot load environment. Err: {}", e);
/// }
/// ```
pub fn load_env() -> Result<(), ConfigError> {
    let path = default_config_dir()?.join(common::ENV_FILE_NAME);
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| ConfigError::Env {
        path: path.clone(),
        message: e.to_string(),
    })
}

/// Bootstraps the configuration file and merges it into `settings`.
///
/// | Directory | File    | Action                                   |
/// |-----------|---------|------------------------------------------|
/// | missing   | -       | create directory, write default file     |
/// | present   | missing | write default file                       |
/// | present   | present | read file, file values override defaults |
///
/// An existing file is never overwritten.
///
/// # Arguments
///
/// * `dir_override` - Directory given with `--config-dir`; the user config
///   directory is used when `None`
/// * `settings` - Settings to merge file values into; left untouched unless
///   the file is read successfully
///
/// # Returns
///
/// The [`InitOutcome`] describing what happened. Any failure is logged,
/// reported as a console warning and returned as [`InitOutcome::Degraded`].
///
/// # Example
///
/// ```
/// use curricula::{config, settings::Settings};
///
/// #[tokio::main]
/// async fn main() {
///     let mut settings = Settings::default();
///     let outcome = config::initialize(None, &mut settings).await;
///     if outcome.is_degraded() {
///         // flags and defaults only
///     }
/// }
/// ```
pub async fn initialize(dir_override: Option<&Path>, settings: &mut Settings) -> InitOutcome {
    let dir = match config_dir(dir_override) {
        Ok(dir) => dir,
        Err(error) => return degraded(None, error),
    };
    let path = dir.join(common::CONFIG_FILE_NAME);

    match bootstrap(&dir, &path, settings).await {
        Ok(outcome) => outcome,
        Err(error) => degraded(Some(path), error),
    }
}

fn degraded(path: Option<PathBuf>, error: ConfigError) -> InitOutcome {
    tracing::error!(error = %error, "configuration bootstrap failed, using flags and defaults");
    warning!(
        "{}\nPlease use the --config-dir flag to specify a directory for your configuration file.\nFlag values or defaults will be used.",
        error
    );
    InitOutcome::Degraded { path, error }
}

async fn bootstrap(
    dir: &Path,
    path: &Path,
    settings: &mut Settings,
) -> Result<InitOutcome, ConfigError> {
    if !dir.is_dir() {
        async_fs::create_dir_all(dir)
            .await
            .map_err(|e| ConfigError::io(dir, e))?;
        tracing::info!(path = %dir.display(), "config directory created");

        config_file::write(path, &Settings::default()).await?;
        tracing::info!(path = %path.display(), "default config file written");
        return Ok(InitOutcome::DirectoryCreated {
            path: path.to_path_buf(),
        });
    }

    match async_fs::metadata(path).await {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            config_file::write(path, &Settings::default()).await?;
            tracing::info!(path = %path.display(), "default config file written");
            return Ok(InitOutcome::FileCreated {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(ConfigError::io(path, e)),
    }

    let persisted = ConfigFileManager::load(path).await?.into_config();
    settings.apply_persisted(&persisted);
    tracing::debug!(path = %path.display(), "config file loaded");

    Ok(InitOutcome::Loaded {
        path: path.to_path_buf(),
        persisted,
    })
}

use std::{
    panic::Location,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::{Dispatch, Level, level_filters::LevelFilter};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use super::sink;
use crate::{common, error::LogError};

const APP_TARGET: &str = "curricula::app";

macro_rules! app_event {
    ($logger:expr, $level:expr, $($fields:tt)+) => {{
        let caller = Location::caller();
        tracing::dispatcher::with_default(&$logger.dispatch, || {
            tracing::event!(target: APP_TARGET, $level, caller = %caller, $($fields)+)
        });
    }};
}

/// General application log, written to stdout and `<log-dir>/app.log`.
///
/// Every record is a single JSON line carrying the message, a `details`
/// mapping and the caller location.
pub struct AppLogger {
    dispatch: Dispatch,
    path: PathBuf,
}

impl AppLogger {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, LogError> {
        Self::open_with_console(dir, sink::console())
    }

    /// Like [`AppLogger::open`] but mirrors records into `console` instead of
    /// stdout.
    pub fn open_with_console(
        dir: impl AsRef<Path>,
        console: BoxMakeWriter,
    ) -> Result<Self, LogError> {
        let (file, path) = sink::open_append(dir.as_ref(), common::APP_LOG_FILE_NAME)?;
        let writer = sink::fan_out([console, sink::file(file)]);

        Ok(Self {
            dispatch: sink::json_dispatch(writer, LevelFilter::DEBUG),
            path,
        })
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, details: Value) {
        app_event!(self, Level::DEBUG, details = %details, "{}", msg);
    }

    #[track_caller]
    pub fn info(&self, msg: &str, details: Value) {
        app_event!(self, Level::INFO, details = %details, "{}", msg);
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, details: Value) {
        app_event!(self, Level::WARN, details = %details, "{}", msg);
    }

    #[track_caller]
    pub fn error(&self, msg: &str, err: &dyn std::error::Error, details: Value) {
        app_event!(self, Level::ERROR, error = %err, details = %details, "{}", msg);
    }

    /// Path of the `app.log` file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releases the file handle.
    pub fn close(self) {}
}

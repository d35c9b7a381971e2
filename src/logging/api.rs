use std::{
    panic::Location,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{DateTime, Local};
use serde_json::Value;
use tracing::{Dispatch, Level, level_filters::LevelFilter};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use super::sink;
use crate::{common, error::LogError};

const API_TARGET: &str = "curricula::api";

macro_rules! api_event {
    ($logger:expr, $level:expr, $call:expr, $($fields:tt)+) => {{
        let caller = Location::caller();
        let call = $call;
        tracing::dispatcher::with_default(&$logger.dispatch, || {
            tracing::event!(
                target: API_TARGET,
                $level,
                url = call.url,
                method = call.method,
                status = call.status,
                rate_cost = call.rate_cost,
                duration = call.duration,
                caller = %caller,
                $($fields)+
            )
        });
    }};
}

/// One outbound API call as it appears in the API log.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall<'a> {
    pub url: &'a str,
    pub method: &'a str,
    pub status: &'a str,
    /// Provider-reported rate-limit weight.
    pub rate_cost: f64,
    /// Round-trip time in seconds.
    pub duration: f64,
}

impl<'a> ApiCall<'a> {
    pub fn new(url: &'a str, method: &'a str, status: &'a str) -> Self {
        Self {
            url,
            method,
            status,
            rate_cost: 0.0,
            duration: 0.0,
        }
    }

    pub fn with_rate_cost(mut self, rate_cost: f64) -> Self {
        self.rate_cost = rate_cost;
        self
    }

    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration = elapsed.as_secs_f64();
        self
    }
}

/// Audit trail of API traffic, one file per run.
///
/// Files are named `<YYYY>-<MM>-<DD>-<HH>-<mm>-api.log` after the local time
/// the logger was opened. A second run within the same minute appends to the
/// existing file.
pub struct ApiLogger {
    dispatch: Dispatch,
    path: PathBuf,
}

impl ApiLogger {
    pub fn open(dir: impl AsRef<Path>, echo_to_console: bool) -> Result<Self, LogError> {
        let console = echo_to_console.then(sink::console);
        Self::open_with(dir, console, Local::now())
    }

    /// Opens the log named after `now`, echoing records into `console` when
    /// one is given.
    pub fn open_with(
        dir: impl AsRef<Path>,
        console: Option<BoxMakeWriter>,
        now: DateTime<Local>,
    ) -> Result<Self, LogError> {
        let (file, path) = sink::open_append(dir.as_ref(), &file_name(&now))?;
        if console.is_some() {
            tracing::info!("API log console output enabled");
        }
        tracing::info!(path = %path.display(), "API log file opened");

        let writer = sink::fan_out(console.into_iter().chain([sink::file(file)]));

        Ok(Self {
            dispatch: sink::json_dispatch(writer, LevelFilter::INFO),
            path,
        })
    }

    /// Records a completed request and its response.
    #[track_caller]
    pub fn info(&self, call: &ApiCall<'_>, msg: &str, details: Value) {
        api_event!(self, Level::INFO, call, details = %details, "{}", msg);
    }

    /// Records a non-fatal anomaly such as an approaching rate limit.
    #[track_caller]
    pub fn warn(&self, call: &ApiCall<'_>, msg: &str, details: Value) {
        api_event!(self, Level::WARN, call, details = %details, "{}", msg);
    }

    /// Records a failed request with the underlying error.
    #[track_caller]
    pub fn error(&self, call: &ApiCall<'_>, msg: &str, err: &dyn std::error::Error) {
        api_event!(self, Level::ERROR, call, error = %err, "{}", msg);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn close(self) {}
}

/// File name of the API log opened at `now`.
pub fn file_name(now: &DateTime<Local>) -> String {
    format!("{}-{}", now.format("%Y-%m-%d-%H-%M"), common::API_LOG_SUFFIX)
}

//! # Logging Module
//!
//! Structured JSON logging for the Curricula CLI. Two loggers exist side by
//! side and never share a sink:
//!
//! - [`AppLogger`] - general application records, mirrored to stdout and
//!   appended to `<log-dir>/app.log`. Minimum level: debug.
//! - [`ApiLogger`] - one record per outbound API call with URL, method,
//!   status, rate-limit cost and duration, written to a per-run
//!   `<log-dir>/<YYYY>-<MM>-<DD>-<HH>-<mm>-api.log`, optionally mirrored to
//!   stdout. Minimum level: info.
//!
//! Both loggers own a scoped `tracing` dispatcher with a JSON event
//! formatter, so their records never reach the process-wide subscriber used
//! for bootstrap diagnostics. The writers they emit into are composed by
//! [`sink::fan_out`].
//!
//! ## Record shape
//!
//! ```text
//! {"caller":"src/cli/config.rs:142:13","details":{"keys":["base_url"]},
//!  "level":"INFO","message":"config updated","target":"curricula::app",
//!  "timestamp":"2026-03-07T09:05:30.123456Z"}
//! ```

mod api;
mod app;
pub mod sink;

pub use api::ApiCall;
pub use api::ApiLogger;
pub use api::file_name as api_log_file_name;
pub use app::AppLogger;

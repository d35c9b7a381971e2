//! Application-wide constants: names, file locations, defaults and build info.

/// Name of the application directory inside the user's config directory.
pub const APP_NAME: &str = "Curricula";

/// File name of the persisted configuration.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// File name of the optional environment file next to the configuration.
pub const ENV_FILE_NAME: &str = ".env";

/// File name of the application log inside the log directory.
pub const APP_LOG_FILE_NAME: &str = "app.log";

/// Fixed suffix of the per-run API log file.
pub const API_LOG_SUFFIX: &str = "api.log";

/// Environment variable holding the API token.
pub const API_TOKEN_ENV: &str = "CURRICULA_API_TOKEN";

/// Environment variable controlling the bootstrap diagnostics filter.
pub const LOG_FILTER_ENV: &str = "CURRICULA_LOG";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_OUTPUT_FILE: &str = "results.json";
pub const DEFAULT_LOG_DIR: &str = "./logs";
pub const DEFAULT_DURATION: &str = "720h";
pub const DEFAULT_MAX_ITEMS: i64 = -1;
pub const DEFAULT_MAX_PAGES: i64 = -1;
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Largest page size the API accepts.
pub const MAX_PER_PAGE: u32 = 100;

pub const BUILD_NUMBER: &str = env!("CURRICULA_BUILD_NUMBER");
pub const BUILD_STATUS: &str = env!("CURRICULA_BUILD_STATUS");
pub const BUILD_DATE: &str = env!("CURRICULA_BUILD_DATE");

/// Version string shown by `curricula --version`.
///
/// Format: `v<version>-<build-number> (<build-status>) build-date: <build-date>`
pub const VERSION: &str = concat!(
    "v",
    env!("CARGO_PKG_VERSION"),
    "-",
    env!("CURRICULA_BUILD_NUMBER"),
    " (",
    env!("CURRICULA_BUILD_STATUS"),
    ") build-date: ",
    env!("CURRICULA_BUILD_DATE"),
);

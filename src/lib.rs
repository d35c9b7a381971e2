//! Curricula CLI Library
//!
//! Configuration persistence and structured logging for a command-line client
//! of the Curricula API.
//!
//! # Modules
//!
//! - `cli` - Command implementations invoked by the binary
//! - `common` - Application names, file names, defaults and build info
//! - `config` - Config directory discovery and first-run bootstrap
//! - `error` - Error types for configuration and log sinks
//! - `logging` - Application and API structured loggers
//! - `management` - Persisted config file handling
//! - `settings` - Resolved settings and their precedence layers
//! - `types` - Shared value types
//! - `utils` - Parsers and small helpers
//!
//! # Example
//!
//! ```
//! use curricula::{config, settings::Settings};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut settings = Settings::default();
//!     let outcome = config::initialize(None, &mut settings).await;
//!     println!("{:?}", outcome.config_path());
//! }
//! ```

pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod logging;
pub mod management;
pub mod settings;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Config file: {}", path.display());
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Updated {} config keys", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal errors: the process terminates with exit code 1 right after
/// printing.
///
/// # Example
///
/// ```
/// error!("Cannot open log directory {}", dir.display());
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues the user should notice, such as a config file
/// that could not be read.
///
/// # Example
///
/// ```
/// warning!("Flag values or defaults will be used.");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

//! # CLI Module
//!
//! Command implementations behind the `curricula` binary. The binary resolves
//! settings, bootstraps the config file and opens the application logger
//! before calling into this module, so every command receives a ready
//! [`crate::settings::Settings`] context instead of reading global state.
//!
//! ## Commands
//!
//! - [`show_config`] - `curricula config show`: effective settings and where
//!   each value came from (default, file or flag)
//! - [`config_path`] - `curricula config path`: location of `config.json`
//! - [`set_config`] - `curricula config set --base-url ...`: store the given
//!   flag values in the config file
//! - [`clear_config`] - `curricula config clear base_url | --all`: reset keys
//!   to their defaults
//!
//! ## Usage
//!
//! ```bash
//! curricula config set --base-url https://curricula.example.com --per-page 50
//! curricula config show --output-format csv
//! curricula config clear per_page
//! ```
//!
//! Commands report through the console macros (`info!`, `success!`,
//! `warning!`, `error!`) and record what they changed in the application log.

mod config;

pub use config::clear_config;
pub use config::config_path;
pub use config::set_config;
pub use config::show_config;

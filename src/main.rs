use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use tracing_subscriber::EnvFilter;

use curricula::{
    cli, common, config, error,
    logging::AppLogger,
    settings::{Settings, SettingsOverrides},
    types::ConfigKey,
    utils, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = common::VERSION,
  name = "curricula",
  bin_name = "curricula",
  about = "Curricula is a CLI tool for interacting with the Curricula API",
  styles = styles(),
)]
struct Cli {
    /// Directory holding config.json (defaults to the user config directory)
    #[clap(long, global = true, env = "CURRICULA_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[clap(flatten)]
    overrides: SettingsOverrides,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Manage the persisted configuration
    Config(ConfigOptions),
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigOptions {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Show the effective settings and where they come from
    Show,

    /// Print the location of the config file
    Path,

    /// Store the given setting flags in the config file
    Set,

    /// Reset config keys to their defaults
    Clear(ConfigClearOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigClearOpts {
    /// Reset every key
    #[clap(long, conflicts_with = "keys")]
    pub all: bool,

    /// Keys to reset, e.g. base_url per_page
    #[clap(value_parser = utils::parse_config_key, num_args = 0..)]
    pub keys: Vec<ConfigKey>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(common::LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = config::load_env() {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    let mut settings = Settings::default();
    let outcome = config::initialize(cli.config_dir.as_deref(), &mut settings).await;
    settings.apply_overrides(&cli.overrides);

    let app_log = match AppLogger::open(&settings.log_dir) {
        Ok(logger) => logger,
        Err(e) => error!("Cannot start application logger: {}", e),
    };
    tracing::debug!(
        config_file = ?outcome.config_path(),
        degraded = outcome.is_degraded(),
        settings = ?settings,
        "settings resolved"
    );

    match cli.command {
        Some(Command::Config(opt)) => match opt.command {
            ConfigSubcommand::Show => cli::show_config(&settings, &outcome, &cli.overrides),
            ConfigSubcommand::Path => cli::config_path(&outcome),
            ConfigSubcommand::Set => cli::set_config(&outcome, &cli.overrides, &app_log).await,
            ConfigSubcommand::Clear(c) => {
                cli::clear_config(&outcome, &c.keys, c.all, &app_log).await
            }
        },
        None => {
            tracing::debug!("no command given");
            if let Err(e) = Cli::command().print_help() {
                error!("Cannot print help: {}", e);
            }
        }
    }

    app_log.close();
}

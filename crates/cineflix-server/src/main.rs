use clap::{ArgAction, Parser, Subcommand};
use cineflix_config::{Config, PathManager};
use color_eyre::eyre::eyre;
use commands::{config, serve, user};
use std::path::PathBuf;

mod auth;
mod commands;
mod error;
mod extract;
mod logging;
mod output;
mod routes;
mod state;

#[derive(Parser)]
#[command(name = "cineflix")]
#[command(about = "Cineflix - movie search, trailers and community reviews over HTTP")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Directory holding config.toml, keys.toml, data/ and logs/
    #[arg(long, global = true, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    #[command(long_about = "Start the HTTP API. Reviews and accounts are loaded from the data directory and written back after every change. Stops gracefully on Ctrl-C.")]
    Serve {
        /// Address to listen on, overrides server.bind (e.g. 0.0.0.0:8000)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Manage configuration and token signing keys
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Manage user accounts offline
    #[command(long_about = "Create, list and remove accounts, or reset a password, directly in the data directory. A running server does not see these changes until it is restarted.")]
    User {
        #[command(subcommand)]
        cmd: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a default config.toml and generate a signing key
    Init {
        /// Overwrite an existing config.toml
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Show current configuration (masks the YouTube API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Generate a new signing key; older keys keep validating existing tokens
    RotateKey,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create an account
    Add {
        name: String,
        email: String,
        /// Password (if not provided, will prompt)
        #[arg(long)]
        password: Option<String>,
    },
    /// List accounts
    List,
    /// Remove an account by email
    Remove { email: String },
    /// Set a new password for an account
    Passwd {
        email: String,
        /// New password (if not provided, will prompt)
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = match &cli.base_dir {
        Some(dir) => PathManager::with_base(dir),
        None => PathManager::default(),
    };
    let mut app_config = Config::load_or_default(&paths.config_file()).map_err(|e| eyre!("{}", e))?;
    app_config.apply_env_overrides();

    logging::init_logging(cli.verbose, cli.quiet, &app_config.logging).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let result = match cli.command {
        Commands::Serve { bind } => serve::run_serve(app_config, &paths, bind, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &app_config, &paths, &output),
        Commands::User { cmd } => user::run_user(cmd, &app_config, &paths, &output).await,
    };

    if let Err(e) = &result {
        output.error(format!("{:#}", e));
    }
    result
}

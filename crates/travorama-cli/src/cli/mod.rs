//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use travorama_core::{config, telemetry};

mod commands;

#[derive(Parser)]
#[command(name = "travorama")]
#[command(version)]
#[command(about = "Log in to your Travorama account")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in (interactive screen unless --identifier is given)
    Login {
        /// Email or phone number to log in with
        #[arg(long, value_name = "ID", requires = "password_stdin")]
        identifier: Option<String>,

        /// Read the password from stdin
        #[arg(long = "password-stdin", requires = "identifier")]
        password_stdin: bool,
    },

    /// Log out (clear the logged-in flag)
    Logout,

    /// Show whether you are logged in
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // default to the interactive login screen
    let command = cli.command.unwrap_or(Commands::Login {
        identifier: None,
        password_stdin: false,
    });

    match command {
        // Config commands must work even when the config file is broken.
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        command => dispatch_with_config(command).await,
    }
}

async fn dispatch_with_config(command: Commands) -> Result<()> {
    let config = config::Config::load().context("load config")?;
    let _log_guard = telemetry::init(&config).context("init logging")?;

    match command {
        Commands::Login {
            identifier: Some(identifier),
            password_stdin: true,
        } => commands::auth::login_headless(&config, &identifier).await,
        Commands::Login { .. } => commands::auth::login_interactive(&config).await,
        Commands::Logout => commands::auth::logout(),
        Commands::Status => commands::auth::status(),
        Commands::Config { .. } => unreachable!("config commands run without loading config"),
    }
}

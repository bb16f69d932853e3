//! Main entry point for the Fabricator CLI.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use client::Route;
use dotenv::dotenv;
use shared::config::ClientConfig;
use url::Url;

mod commands;
mod console;
mod logging;

/// Fabricator CLI
#[derive(Parser)]
#[command(name = "fabricator", version)]
#[command(about = "Command-line client for the Fabricator shop", long_about = None)]
struct Cli {
    /// Path to the configuration file (yaml or json)
    #[arg(
        long,
        short,
        global = true,
        help = "Path to the configuration file (e.g., fabricator.yaml or fabricator.json). If not provided, defaults and FABRICATOR_* variables are used."
    )]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration
    #[arg(long, global = true, help = "Backend base URL (e.g., http://localhost:8000/)")]
    api_url: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the Fabricator CLI
#[derive(Subcommand)]
enum Commands {
    /// Open the landing view, logging in with the fallback account if needed
    Home {
        /// View to resolve the session for
        #[arg(
            long,
            default_value = "/",
            help = "View to resolve the session for (/, /shop, /me)"
        )]
        path: Route,
    },

    /// Seed the demonstration data
    Initialize,

    /// Show the profile of the signed-in account
    Me,

    /// Delete the signed-in account after confirming the password
    DeleteAccount {
        /// Email address of the account
        #[arg(long, short, help = "Email address of the account to delete")]
        email: String,
    },

    /// Remove the stored token
    Logout,

    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml or json). Defaults to yaml.
        #[arg(
            long,
            short,
            help = "Format of the configuration file to generate (yaml or json). Defaults to yaml."
        )]
        format: Option<String>,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell to generate the completion script for
        #[arg(
            long,
            short,
            value_enum,
            help = "The shell to generate the completion script for (e.g., bash, zsh, fish, powershell)"
        )]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { format } => {
            let format = format.unwrap_or_else(|| "yaml".to_string());
            commands::config::generate_config(&format)
        }
        Commands::Completion { shell } => {
            commands::completion::generate_completion(shell);
            Ok(())
        }
        command => {
            let config = ClientConfig::load_config(cli.config, cli.api_url)?;
            logging::init(&config.log_level);
            run(command, &config).await
        }
    }
}

async fn run(command: Commands, config: &ClientConfig) -> Result<()> {
    match command {
        Commands::Home { path } => commands::home::run(config, path).await,
        Commands::Initialize => commands::initialize::run(config).await,
        Commands::Me => commands::account::me(config).await,
        Commands::DeleteAccount { email } => commands::account::delete(config, email).await,
        Commands::Logout => commands::account::logout(config),
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

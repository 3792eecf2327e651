//! CLI command definitions and dispatch.

pub mod accounts;
pub mod diff;
pub mod directories;
pub mod files;
pub mod migrate;
pub mod serve;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use docman_core::config::AppConfig;

use crate::client::ApiClient;
use crate::output::OutputFormat;

/// Docman: versioned document storage
#[derive(Debug, Parser)]
#[command(name = "docman", version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the Docman server
    #[arg(long, global = true, env = "DOCMAN_SERVER", default_value = "http://127.0.0.1:8000")]
    pub server: String,

    /// Session token from `docman login`
    #[arg(long, global = true, env = "DOCMAN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Directory holding default.toml and the environment overlays
    #[arg(long, global = true, default_value = "config")]
    pub config_dir: String,

    /// Configuration overlay to load (serve and migrate)
    #[arg(long, global = true, env = "DOCMAN_ENV", default_value = "development")]
    pub env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the Docman server
    Serve(serve::ServeArgs),
    /// Apply database migrations
    Migrate,
    /// Create an account
    Signup(accounts::SignupArgs),
    /// Log in and print a session token
    Login(accounts::LoginArgs),
    /// Revoke the current session token
    Logout,
    /// Show the account behind the current token
    Whoami,
    /// List files with their latest version
    Ls(files::LsArgs),
    /// Upload a file, creating a new version if it already exists
    Upload(files::UploadArgs),
    /// Download one file version
    Download(files::DownloadArgs),
    /// List the versions of a file
    Versions(files::VersionsArgs),
    /// Create a directory
    Mkdir(directories::MkdirArgs),
    /// List directories under a parent
    Dirs(directories::DirsArgs),
    /// Show the differences between two versions of a file
    Diff(diff::DiffArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, self.load_config()?).await,
            Commands::Migrate => migrate::execute(self.load_config()?).await,
            Commands::Signup(args) => accounts::signup(args, &self.client()?, self.format).await,
            Commands::Login(args) => accounts::login(args, &self.client()?, self.format).await,
            Commands::Logout => accounts::logout(&self.client()?).await,
            Commands::Whoami => accounts::whoami(&self.client()?, self.format).await,
            Commands::Ls(args) => files::ls(args, &self.client()?, self.format).await,
            Commands::Upload(args) => files::upload(args, &self.client()?, self.format).await,
            Commands::Download(args) => files::download(args, &self.client()?).await,
            Commands::Versions(args) => files::versions(args, &self.client()?, self.format).await,
            Commands::Mkdir(args) => directories::mkdir(args, &self.client()?, self.format).await,
            Commands::Dirs(args) => directories::dirs(args, &self.client()?, self.format).await,
            Commands::Diff(args) => diff::execute(args, &self.client()?, self.format).await,
        }
    }

    fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.server, self.token.clone())
    }

    fn load_config(&self) -> Result<AppConfig> {
        AppConfig::load_from(&self.config_dir, &self.env)
            .with_context(|| format!("Failed to load configuration from '{}'", self.config_dir))
    }
}

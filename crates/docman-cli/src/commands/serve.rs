//! Start the Docman server.

use anyhow::Result;
use clap::Args;

use docman_core::config::AppConfig;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }

    println!("Starting Docman server...");
    println!("  Address:  {}", config.server.bind_address());
    println!("  Metadata: {}", config.database.provider);
    println!("  Data:     {}", config.storage.data_root);

    docman_api::run_server(config).await?;
    Ok(())
}

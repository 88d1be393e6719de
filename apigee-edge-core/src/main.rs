use anyhow::{Context, Result};
use apigee_edge_core::{
    config::Config,
    routing::{
        developer_app_descriptor, DeveloperAppRouteProvider, EntityTypeDescriptor, RouteProvider,
    },
    server, telemetry,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "apigee-edge-core", version, about = "Apigee Edge entity routes service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the generated route table as JSON
    Routes {
        /// Entity type descriptor (JSON); the built-in developer app type when omitted
        #[arg(long)]
        descriptor: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let config = Config::from_env()?;
            let prometheus_handle = telemetry::init(&config.telemetry);

            info!("Starting Apigee Edge Core Service");
            info!("HTTP server listening on {}", config.http_addr());

            server::run(config, prometheus_handle).await
        }
        Command::Routes { descriptor } => print_routes(descriptor),
    }
}

fn print_routes(descriptor: Option<PathBuf>) -> Result<()> {
    let descriptor = match descriptor {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<EntityTypeDescriptor>(&raw)
                .with_context(|| format!("Invalid entity type descriptor in {}", path.display()))?
        }
        None => developer_app_descriptor(),
    };

    let provider: DeveloperAppRouteProvider = DeveloperAppRouteProvider::default();
    let table = provider.routes(&descriptor);
    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}

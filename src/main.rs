//! Resource dispatch service.
//!
//! Serves the demo comment API through the standard middleware chain.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use resource_dispatch::config::{load_config, ServiceConfig};
use resource_dispatch::http::HttpServer;
use resource_dispatch::lifecycle::{
    build_service, signals, standard_responder, Shutdown, StartupError,
};
use resource_dispatch::observability::{logging, metrics};
use resource_dispatch::{demo, Dispatcher};

#[derive(Parser)]
#[command(name = "resource-dispatch")]
#[command(about = "HTTP dispatch service", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve requests (default)
    Serve,
    /// Print the resolved route table and exit
    Routes,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path).map_err(StartupError::from)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    let dispatcher = demo::comments().map_err(StartupError::from)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Routes => {
            print_routes(&dispatcher);
            Ok(())
        }
        Commands::Serve => serve(config, dispatcher).await,
    }
}

async fn serve(
    config: ServiceConfig,
    dispatcher: Dispatcher,
) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(&config.observability)?;
    tracing::info!("resource-dispatch v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let service = build_service(config)?;
    let responder = standard_responder(service, dispatcher);

    let listener = TcpListener::bind(&bind_address).await.map_err(StartupError::from)?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    HttpServer::new(responder).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(dispatcher: &Dispatcher) {
    for route in dispatcher.routes() {
        let methods = route.methods().map(|m| m.as_str()).collect::<Vec<_>>().join(",");
        println!("{:<12} {:<28} {}", route.name(), route.pattern().template(), methods);
    }
}

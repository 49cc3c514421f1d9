use std::net::SocketAddr;
use std::sync::Arc;

use axum_server::{Handle, Server};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use screenzen_core::Error;

mod config;
mod context;
mod error;
mod routes;

use config::Config;
use context::ServerContext;

#[derive(Parser, Debug, Clone)]
#[command(name = "screenzen")]
#[command(author, version, about = "ScreenZen - screen-time stress analysis backend")]
struct Args {
    /// Address to which the server will bind
    #[arg(long, default_value = "0.0.0.0:3001")]
    server_addr: String,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("screenzen=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    if let Err(e) = run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    Ok(())
}

async fn run_server(args: Args) -> Result<(), Error> {
    let config = Config::from_env()?;
    info!("Configuration loaded; connecting to Postgres...");

    let ctx = Arc::new(ServerContext::new(&config).await?);
    let app = routes::build_router(ctx);

    let addr: SocketAddr = args.server_addr.parse()?;
    info!("Backend server listening on http://{}", addr);

    let handle = Handle::new();
    let handle_clone = handle.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {:?}", e);
        }
        info!("Ctrl-C detected; shutting down...");
        handle_clone.graceful_shutdown(None);
    });

    Server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    info!("Server shut down.");
    Ok(())
}

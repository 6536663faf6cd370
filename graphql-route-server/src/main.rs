//! graphql-route server - demo host application for the GraphQL route
//!
//! Provides:
//! - GET /health - Liveness and GraphQL engine status
//! - GET, HEAD, POST /graphql - The GraphQL route (path configurable)

use clap::Parser;
use graphql_route_server::{build_router, config::Config, health};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Server CLI arguments
#[derive(Parser, Debug)]
#[command(name = "graphql-route-server")]
#[command(about = "Serve a GraphQL schema over HTTP", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,

    /// TOML configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing before the runtime so startup is captured
    let filter = if args.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "graphql_route=debug,graphql_route_server=debug,tower_http=debug".into()
        })
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "graphql_route=info,graphql_route_server=info,tower_http=info".into()
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env(args.config.as_deref())?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .thread_name("graphql-route-worker")
        .enable_all()
        .build()?;

    rt.block_on(async_main(config))
}

async fn async_main(config: Config) -> anyhow::Result<()> {
    health::init();

    let app = build_router(&config);

    info!("Starting GraphQL server on {}", config.addr);
    info!("GraphQL route mounted at {}", config.path);
    if config.route.explorer {
        info!("GraphiQL explorer enabled at http://{}{}", config.addr, config.path);
    }

    let listener = TcpListener::bind(&config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

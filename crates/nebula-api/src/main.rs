//! Nebula support chat server entry point.
//!
//! Binary name: `nebsup`
//!
//! Parses CLI arguments, initializes the database and session service, then
//! starts the HTTP/WebSocket server.

mod http;
mod state;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use state::AppState;

/// Support chat backend for the Nebula streaming site.
#[derive(Parser)]
#[command(name = "nebsup", version, about, long_about = None)]
struct Cli {
    /// Suppress all output except errors.
    #[arg(long, global = true)]
    quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on.
        #[arg(long, default_value_t = 5000, env = "NEBULA_PORT")]
        port: u16,

        /// SQLite database URL. Defaults to support.db in the data directory.
        #[arg(long, env = "NEBULA_DATABASE_URL")]
        database: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,nebula=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            database,
        } => {
            let database_url = match database {
                Some(url) => url,
                None => {
                    let data_dir = nebula_infra::sqlite::pool::resolve_data_dir();
                    tokio::fs::create_dir_all(&data_dir).await?;
                    nebula_infra::sqlite::pool::default_database_url()
                }
            };

            let state = AppState::init(&database_url).await?;
            let router = http::router::build_router(state);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!(%addr, "support chat server listening");

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("server stopped");
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

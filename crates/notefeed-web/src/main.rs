//! `notefeed` binary: serves the feed page over HTTP.
//!
//! Settings come from the environment, optionally seeded from a `.env`
//! file. Every request builds its page fresh from the configured relays.

use std::path::Path;

use axum::http::Request;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use notefeed_web::{AppState, Config, router};

#[derive(Parser, Debug)]
#[command(name = "notefeed")]
#[command(about = "HTML feed server for one Nostr author", long_about = None)]
struct Args {
    /// Environment file read before configuration is loaded. Skipped if
    /// it does not exist.
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    dotenv: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Before tracing, so RUST_LOG can come from the file.
    let dotenv_loaded = Path::new(&args.dotenv).exists();
    if dotenv_loaded {
        dotenvy::from_path(&args.dotenv)?;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if dotenv_loaded {
        tracing::info!(path = %args.dotenv, "loaded environment file");
    }

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config)?;

    let app = router(state).layer(TraceLayer::new_for_http().make_span_with(
        |request: &Request<_>| {
            tracing::span!(
                Level::INFO,
                "feed_request",
                method = %request.method(),
                path = %request.uri().path(),
                query = request.uri().query().unwrap_or(""),
            )
        },
    ));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "feed server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("feed server stopped");
    Ok(())
}

/// Resolves on Ctrl-C. In-flight requests finish; their relay sockets close
/// with them.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

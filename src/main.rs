#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

use anyhow::Result;
use stubby::config::Config;
use stubby::graceful_shutdown;
use stubby::setup_app;
use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

const DEFAULT_RUST_LOG: &str = "stubby=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config::from_env()?;
    let app = setup_app(&config).await?;

    let listener = TcpListener::bind(config.address).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::accounts::ensure_initial_account;
use crate::api::JwtKeys;
use crate::config::Config;
use crate::storage::Storage;
use crate::storage::setup;

pub mod accounts;
pub mod api;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod graceful_shutdown;
pub mod links;
pub mod ordering;
mod password;
mod root;
pub mod storage;
#[cfg(test)]
mod tests;
mod utils;

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Storage connection
/// - Initial account setup
pub async fn setup_app(config: &Config) -> Result<Router> {
    let storage = setup(config).await?;

    ensure_initial_account(&storage, config).await?;

    Ok(create_router(storage, JwtKeys::new(config.jwt_secret.as_bytes())))
}

/// Create the router for Stubby
pub fn create_router<S: Storage>(storage: S, jwt_keys: JwtKeys) -> Router {
    Router::new()
        .nest("/api", api::router::<S>())
        .fallback(get(root::root::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(storage))
        .layer(Extension(jwt_keys))
}

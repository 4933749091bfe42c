//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;

pub use request::Form;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use request::parse_slug;
pub use request::parse_url;
pub use response::DELETED;
pub use response::Error;
pub use response::Success;
pub use session::JwtKeys;
pub use session::Session;
pub use session::Token;

use crate::storage::Storage;

mod accounts;
mod links;
mod request;
mod response;
mod session;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let users = Router::new()
        .route("/", post(accounts::create::<S>))
        .route("/token", post(accounts::token::<S>))
        .route("/{username}/links", get(accounts::public_links::<S>));

    Router::new()
        .nest("/users", users)
        .route(
            "/auth",
            get(accounts::dashboard::<S>)
                .put(accounts::update::<S>)
                .delete(accounts::delete::<S>),
        )
        .route("/new", post(links::create::<S>))
        .route(
            "/{link}",
            patch(links::update::<S>).delete(links::delete::<S>),
        )
}

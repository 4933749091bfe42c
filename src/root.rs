//! The root!
//!
//! The most visited part of the service, the actual redirect logic

use axum::Extension;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::LOCATION;
use percent_encoding::percent_decode_str;
use unicode_normalization::UnicodeNormalization;

use crate::api::Error;
use crate::storage::Storage;

/// The root!
///
/// All wildcard requests end up in this function.
///
/// A lookup in storage will be done looking for the right slug, based on the path. Every
/// successful redirect counts as a click on the link.
pub async fn root<S: Storage>(
    Extension(storage): Extension<S>,
    uri: Uri,
) -> Result<(StatusCode, HeaderMap), Error> {
    let slug = url_decode_slug(uri.path().trim_matches('/'))?;

    tracing::debug!("Looking for slug: /{slug}");

    let Some(link) = storage.find_single_link_by_slug(&slug).await? else {
        tracing::debug!(r#"Slug "{slug}" not found"#);

        return Ok((StatusCode::NOT_FOUND, HeaderMap::new()));
    };

    let location = HeaderValue::from_str(&link.url).map_err(Error::internal_server_error)?;

    // clicks are best effort, the redirect happens regardless
    if let Err(err) = storage.increment_clicks(&link).await {
        tracing::error!(r#"Could not count click on "{slug}": {err}"#);
    }

    tracing::debug!(r#"Slug "{slug}" redirecting to: {}"#, link.url);

    let mut headers = HeaderMap::new();
    headers.insert(LOCATION, location);

    Ok((StatusCode::TEMPORARY_REDIRECT, headers))
}

/// URL decode slug
///
/// Uses percentage encoding for the decoding and normalizes the result the same way slugs are
/// normalized when they are stored
fn url_decode_slug(slug: &str) -> Result<String, Error> {
    percent_decode_str(slug)
        .decode_utf8()
        .map(|decoded| decoded.nfc().collect())
        .map_err(|_| Error::bad_request("URL contains invalid UTF-8 characters"))
}

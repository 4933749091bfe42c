//! Links API endpoints
//!
//! Creating, updating and deleting links

use axum::Extension;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::accounts::Account;
use crate::links::Link;
use crate::links::generate_slug;
use crate::storage::CreateLinkValues;
use crate::storage::Error as StorageError;
use crate::storage::Storage;
use crate::storage::UpdateLinkValues;

use super::DELETED;
use super::Error;
use super::Form;
use super::PathParameters;
use super::Session;
use super::Success;
use super::parse_slug;
use super::parse_url;

/// How many generated slugs are tried before giving up
const GENERATE_SLUG_ATTEMPTS: usize = 5;

/// Link response going to the client
///
/// Basically filtering which fields are shown to the client
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    /// Link ID
    pub id: Uuid,

    /// Owner of the link, absent for anonymous links
    pub user_id: Option<Uuid>,

    /// Slug used to identify the link by the root
    pub slug: String,

    /// Url where root will redirect to
    pub url: String,

    /// Number of redirects so far
    pub clicks: u64,

    /// Is the link listed on the public profile of its owner
    pub is_public: bool,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: NaiveDateTime,
}

impl LinkResponse {
    /// Create a response from a [`Link`](Link)
    pub fn from_link(link: Link) -> Self {
        Self {
            id: link.id,
            user_id: link.user_id,
            slug: link.slug,
            url: link.url,
            clicks: link.clicks,
            is_public: link.is_public,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }

    /// Create a response from multiple [`Link`](Link)s
    pub fn from_link_multiple(links: Vec<Link>) -> Vec<Self> {
        links.into_iter().map(Self::from_link).collect()
    }
}

/// Create link form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkForm {
    /// Url to redirect to
    url: String,

    /// Optional slug, a random one is generated when missing or empty
    ///
    /// The slug is normalized:
    /// - Leading and trailing slashes are removed
    /// - Unicode normalization
    slug: Option<String>,
}

/// Create a link based on the [`CreateLinkForm`](CreateLinkForm) form
///
/// Visitors without a session create anonymous links
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "url": "https://www.example.com/", "slug": "some-easy-name" }' \
///     http://localhost:6000/api/new
/// ```
///
/// Response
/// ```json
/// { "id": "<uuid>", "slug": "some-easy-name", "clicks": 0 ... }
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    session: Option<Session<S>>,
    Form(form): Form<CreateLinkForm>,
) -> Result<Success<LinkResponse>, Error> {
    let url = parse_url(&form.url)?;
    let slug = form.slug.as_deref().map(parse_slug).transpose()?;
    let account = session.as_deref();

    let link = match slug.filter(|slug| !slug.is_empty()) {
        Some(slug) => {
            let values = CreateLinkValues {
                account,
                slug: &slug,
                url: &url,
            };

            storage.create_link(&values).await?
        }
        None => create_with_generated_slug(&storage, account, &url).await?,
    };

    tracing::debug!(r#"Created link "{}" to: {}"#, link.slug, link.url);

    Ok(Success::created(LinkResponse::from_link(link)))
}

/// Create a link with a random slug, a taken slug is retried with a new one
async fn create_with_generated_slug<S: Storage>(
    storage: &S,
    account: Option<&Account>,
    url: &Url,
) -> Result<Link, Error> {
    for _ in 0..GENERATE_SLUG_ATTEMPTS {
        let slug = generate_slug().map_err(Error::internal_server_error)?;

        let values = CreateLinkValues {
            account,
            slug: &slug,
            url,
        };

        match storage.create_link(&values).await {
            Ok(link) => return Ok(link),
            Err(StorageError::DuplicateSlug) => {
                tracing::debug!(r#"Generated slug "{slug}" is taken, trying another"#);
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(Error::internal_server_error(
        "Could not generate an unused slug",
    ))
}

/// Update link form
///
/// All fields are optional and are not touched when not provided
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkForm {
    /// New slug, also accepted as `name`
    #[serde(alias = "name")]
    slug: Option<String>,

    /// New destination
    url: Option<String>,

    /// New visibility
    is_public: Option<bool>,
}

/// Update a link based on the [`UpdateLinkForm`](UpdateLinkForm) form
///
/// Only the owner of the link can update it
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "url": "https://www.example.com/", "isPublic": true }' \
///     http://localhost:6000/api/<uuid>
/// ```
///
/// Response
/// ```json
/// { "id": "<uuid>", "slug": "some-easy-name", "isPublic": true ... }
/// ```
pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    session: Session<S>,
    PathParameters(link_id): PathParameters<Uuid>,
    Form(form): Form<UpdateLinkForm>,
) -> Result<Success<LinkResponse>, Error> {
    let link = fetch_owned_link(&storage, &session, &link_id).await?;

    let slug = form.slug.as_deref().map(parse_slug).transpose()?;
    if slug.as_deref() == Some("") {
        return Err(Error::bad_request("Slug can not be empty"));
    }

    let url = form.url.as_deref().map(parse_url).transpose()?;

    let values = UpdateLinkValues {
        slug: slug.as_deref(),
        url: url.as_ref(),
        is_public: form.is_public,
    };

    let updated_link = storage.update_link(&link, &values).await?;

    Ok(Success::ok(LinkResponse::from_link(updated_link)))
}

/// Delete a link
///
/// Only the owner of the link can delete it, the response body is `OK`
///
/// Request:
/// ```sh
/// curl -v -XDELETE \
///     -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/<uuid>
/// ```
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    session: Session<S>,
    PathParameters(link_id): PathParameters<Uuid>,
) -> Result<&'static str, Error> {
    let link = fetch_owned_link(&storage, &session, &link_id).await?;

    storage.delete_link(&link).await?;

    tracing::debug!(r#"Deleted link "{}""#, link.slug);

    Ok(DELETED)
}

/// Fetch a link from storage, only when owned by the session account
async fn fetch_owned_link<S: Storage>(
    storage: &S,
    session: &Session<S>,
    link_id: &Uuid,
) -> Result<Link, Error> {
    let link = storage
        .find_single_link_by_id(link_id)
        .await?
        .ok_or_else(|| Error::not_found("Link not found"))?;

    if link.is_owned_by(session) {
        Ok(link)
    } else {
        Err(Error::unauthorized())
    }
}

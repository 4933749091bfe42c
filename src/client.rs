//! HTTP client for the API
//!
//! The dashboard controllers talk to the service through [`LinkApi`], [`ApiClient`] is the
//! implementation over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::ordering::LinkFields;
use crate::ordering::SortOrder;

/// Errors talking to the API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request did not produce a response
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status, the message is the body it sent
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// The base URL can not be used to build endpoints
    #[error("Invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// A link as the API sends it
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub slug: String,
    pub url: String,
    pub clicks: u64,
    pub is_public: bool,
}

impl LinkFields for LinkRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn clicks(&self) -> u64 {
        self.clicks
    }
}

/// An account as the API sends it
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub is_public: bool,
}

/// The session account with its links
#[derive(Clone, Debug, Deserialize)]
pub struct Dashboard {
    pub user: AccountRecord,
    pub links: Vec<LinkRecord>,
}

/// A link to create
#[derive(Clone, Debug, Default, Serialize)]
pub struct NewLink {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Changes to a link, absent fields stay as they are
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl LinkChanges {
    /// The record as it would look with these changes
    pub fn apply(&self, record: &LinkRecord) -> LinkRecord {
        LinkRecord {
            slug: self.slug.clone().unwrap_or_else(|| record.slug.clone()),
            url: self.url.clone().unwrap_or_else(|| record.url.clone()),
            is_public: self.is_public.unwrap_or(record.is_public),
            ..record.clone()
        }
    }
}

/// Operations on links the dashboard needs from the service
#[async_trait]
pub trait LinkApi: Send + Sync {
    /// Create a link, the slug is generated when not given
    async fn create_link(&self, link: &NewLink) -> Result<LinkRecord, ClientError>;

    /// Update a link
    async fn update_link(&self, id: Uuid, changes: &LinkChanges)
    -> Result<LinkRecord, ClientError>;

    /// Delete a link
    ///
    /// Resolves to the body of a 2xx response, only `OK` means the link is gone
    async fn delete_link(&self, id: Uuid) -> Result<String, ClientError>;
}

/// Token response of the login endpoint
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for the API of a single service
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl ApiClient {
    /// Create a client for the service at the base URL
    ///
    /// # Errors
    ///
    /// Will return `Err` when the base URL is not a valid absolute URL
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;

        // endpoints are joined onto the base, which needs to be a "directory"
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: Client::new(),
            base_url,
            access_token: None,
        })
    }

    /// Use an existing access token for the requests
    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Is there a session to act on behalf of?
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Log in, the token is used for all following requests
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .request(Method::POST, "api/users/token")?
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        let token: TokenResponse = success(response).await?.json().await?;
        self.access_token = Some(token.access_token);

        tracing::debug!(r#"Logged in as "{username}""#);

        Ok(())
    }

    /// The session account with its links, in the given order
    pub async fn dashboard(&self, order: SortOrder) -> Result<Dashboard, ClientError> {
        let response = self
            .request(Method::GET, "api/auth")?
            .query(&[("order", order.as_str())])
            .send()
            .await?;

        Ok(success(response).await?.json().await?)
    }

    /// The public links of a public profile
    pub async fn public_links(
        &self,
        username: &str,
        order: SortOrder,
    ) -> Result<Vec<LinkRecord>, ClientError> {
        let mut url = self.base_url.join("api/users/")?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(username)
            .push("links");

        let response = self
            .http
            .get(url)
            .query(&[("order", order.as_str())])
            .send()
            .await?;

        Ok(success(response).await?.json().await?)
    }

    /// Build a request to an endpoint, relative to the base URL
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.base_url.join(path)?;
        let builder = self.http.request(method, url);

        Ok(match &self.access_token {
            Some(access_token) => builder.bearer_auth(access_token),
            None => builder,
        })
    }
}

#[async_trait]
impl LinkApi for ApiClient {
    async fn create_link(&self, link: &NewLink) -> Result<LinkRecord, ClientError> {
        let response = self
            .request(Method::POST, "api/new")?
            .json(link)
            .send()
            .await?;

        Ok(success(response).await?.json().await?)
    }

    async fn update_link(
        &self,
        id: Uuid,
        changes: &LinkChanges,
    ) -> Result<LinkRecord, ClientError> {
        let response = self
            .request(Method::PATCH, &format!("api/{id}"))?
            .json(changes)
            .send()
            .await?;

        Ok(success(response).await?.json().await?)
    }

    async fn delete_link(&self, id: Uuid) -> Result<String, ClientError> {
        let response = self
            .request(Method::DELETE, &format!("api/{id}"))?
            .send()
            .await?;

        Ok(success(response).await?.text().await?)
    }
}

/// Pass through 2xx responses, anything else becomes [`ClientError::Rejected`]
async fn success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await?;
    tracing::debug!("Request rejected with {status}: {message}");

    Err(ClientError::Rejected { status, message })
}

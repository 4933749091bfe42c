//! All things related to the storage of accounts and links

use async_trait::async_trait;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::accounts::Account;
use crate::config::Config;
use crate::links::Link;

#[cfg(not(feature = "postgres"))]
pub use memory::Memory;
#[cfg(feature = "postgres")]
pub use postgres::Postgres;

#[cfg(not(feature = "postgres"))]
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

/// Setup the storage
#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
pub async fn setup(_config: &Config) -> Result<Memory> {
    Ok(Memory::new())
}

/// Setup the storage
#[cfg(feature = "postgres")]
pub async fn setup(config: &Config) -> Result<Postgres> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| Error::Connection("`DATABASE_URL` is not set".to_string()))?;

    Postgres::connect(database_url).await
}

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),

    /// Another link already uses the slug
    #[error("Slug already exists")]
    DuplicateSlug,

    /// Another account already uses the username
    #[error("Account already exists")]
    DuplicateUsername,
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Values to create an Account
pub struct CreateAccountValues<'a> {
    /// The initial session ID for the account
    pub session_id: &'a Uuid,

    /// The username
    pub username: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to update an Account, untouched when not provided
pub struct UpdateAccountValues<'a> {
    /// New display name
    pub name: Option<&'a str>,

    /// New visibility of the profile
    pub is_public: Option<bool>,
}

/// Values to create a Link
pub struct CreateLinkValues<'a> {
    /// The account creating the link, if any
    pub account: Option<&'a Account>,

    /// The slug of the link
    pub slug: &'a str,

    /// The URL the link redirects to
    pub url: &'a Url,
}

/// Values to update a Link, untouched when not provided
pub struct UpdateLinkValues<'a> {
    /// New slug
    pub slug: Option<&'a str>,

    /// New destination
    pub url: Option<&'a Url>,

    /// New visibility
    pub is_public: Option<bool>,
}

/// Storage with all supported operations
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Find any single account
    async fn find_any_single_account(&self) -> Result<Option<Account>>;

    /// Find a single account by its username
    async fn find_single_account_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Find a single account by its ID
    async fn find_single_account_by_id(&self, id: &Uuid) -> Result<Option<Account>>;

    /// Create an account
    ///
    /// Fails with [`Error::DuplicateUsername`] when the username is taken
    async fn create_account(&self, values: &CreateAccountValues) -> Result<Account>;

    /// Update the settings of an account
    async fn update_account(
        &self,
        account: &Account,
        values: &UpdateAccountValues,
    ) -> Result<Account>;

    /// Delete an account, together with all its links
    async fn delete_account(&self, account: &Account) -> Result<()>;

    /// Find all links of an account, oldest first
    async fn find_all_links_by_account(&self, account: &Account) -> Result<Vec<Link>>;

    /// Find a single link by slug
    async fn find_single_link_by_slug(&self, slug: &str) -> Result<Option<Link>>;

    /// Find a single link by ID
    async fn find_single_link_by_id(&self, id: &Uuid) -> Result<Option<Link>>;

    /// Create a link
    ///
    /// Fails with [`Error::DuplicateSlug`] when the slug is taken
    async fn create_link(&self, values: &CreateLinkValues) -> Result<Link>;

    /// Update a single link
    ///
    /// Fails with [`Error::DuplicateSlug`] when the new slug is taken
    async fn update_link(&self, link: &Link, values: &UpdateLinkValues) -> Result<Link>;

    /// Delete a link
    async fn delete_link(&self, link: &Link) -> Result<()>;

    /// Count a redirect of a link
    async fn increment_clicks(&self, link: &Link) -> Result<()>;
}

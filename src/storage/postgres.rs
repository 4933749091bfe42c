//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::FromRow;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::accounts::Account;
use crate::links::Link;

use super::CreateAccountValues;
use super::CreateLinkValues;
use super::Error;
use super::Result;
use super::Storage;
use super::UpdateAccountValues;
use super::UpdateLinkValues;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Columns of a link, in the order of [`SqlxLink`]
const LINK_COLUMNS: &str = "id, user_id, slug, url, clicks, is_public, created_at, updated_at";

/// Columns of an account, in the order of [`SqlxAccount`]
const ACCOUNT_COLUMNS: &str =
    "id, session_id, username, hashed_password, name, is_public, created_at, updated_at";

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Connect to Postgres and run the migrations
    pub async fn connect(database_url: &str) -> Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .map_err(connection_error)?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Connection(format!("Migrations could not run: {err}")))?;

        Ok(Self { connection_pool })
    }
}

/// `SQLx` version of account
#[derive(FromRow)]
struct SqlxAccount {
    id: Uuid,
    session_id: Uuid,
    username: String,
    hashed_password: String,
    name: Option<String>,
    is_public: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<SqlxAccount> for Account {
    fn from(account: SqlxAccount) -> Self {
        Self {
            id: account.id,
            session_id: account.session_id,
            username: account.username,
            hashed_password: account.hashed_password,
            name: account.name,
            is_public: account.is_public,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// `SQLx` version of link
#[derive(FromRow)]
struct SqlxLink {
    id: Uuid,
    user_id: Option<Uuid>,
    slug: String,
    url: String,
    clicks: i64,
    is_public: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<SqlxLink> for Link {
    fn from(link: SqlxLink) -> Self {
        Self {
            id: link.id,
            user_id: link.user_id,
            slug: link.slug,
            url: link.url,
            // the column has a non-negative check
            clicks: u64::try_from(link.clicks).unwrap_or_default(),
            is_public: link.is_public,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[async_trait]
impl Storage for Postgres {
    async fn find_any_single_account(&self) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, SqlxAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts LIMIT 1"
        ))
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(account.map(Account::from))
    }

    async fn find_single_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, SqlxAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = $1 LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(account.map(Account::from))
    }

    async fn find_single_account_by_id(&self, id: &Uuid) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, SqlxAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(account.map(Account::from))
    }

    async fn create_account(&self, values: &CreateAccountValues) -> Result<Account> {
        let account = sqlx::query_as::<_, SqlxAccount>(&format!(
            r"
            INSERT INTO accounts (id, session_id, username, hashed_password)
            VALUES ($1, $2, $3, $4)
            RETURNING {ACCOUNT_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(values.session_id)
        .bind(values.username)
        .bind(values.hashed_password)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| unique_violation_or(err, Error::DuplicateUsername))?;

        Ok(account.into())
    }

    async fn update_account(
        &self,
        account: &Account,
        values: &UpdateAccountValues,
    ) -> Result<Account> {
        let account = sqlx::query_as::<_, SqlxAccount>(&format!(
            r"
            UPDATE accounts
            SET name = COALESCE($2, name),
                is_public = COALESCE($3, is_public),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "
        ))
        .bind(account.id)
        .bind(values.name)
        .bind(values.is_public)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(account.into())
    }

    async fn delete_account(&self, account: &Account) -> Result<()> {
        // links go with it, see the foreign key
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    async fn find_all_links_by_account(&self, account: &Account) -> Result<Vec<Link>> {
        let links = sqlx::query_as::<_, SqlxLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(account.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(links.into_iter().map(Link::from).collect())
    }

    async fn find_single_link_by_slug(&self, slug: &str) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, SqlxLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE slug = $1 LIMIT 1"
        ))
        .bind(slug)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(link.map(Link::from))
    }

    async fn find_single_link_by_id(&self, id: &Uuid) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, SqlxLink>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE id = $1 LIMIT 1"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(link.map(Link::from))
    }

    async fn create_link(&self, values: &CreateLinkValues) -> Result<Link> {
        let link = sqlx::query_as::<_, SqlxLink>(&format!(
            r"
            INSERT INTO links (id, user_id, slug, url)
            VALUES ($1, $2, $3, $4)
            RETURNING {LINK_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(values.account.map(|account| account.id))
        .bind(values.slug)
        .bind(values.url.as_str())
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| unique_violation_or(err, Error::DuplicateSlug))?;

        Ok(link.into())
    }

    async fn update_link(&self, link: &Link, values: &UpdateLinkValues) -> Result<Link> {
        let link = sqlx::query_as::<_, SqlxLink>(&format!(
            r"
            UPDATE links
            SET slug = COALESCE($2, slug),
                url = COALESCE($3, url),
                is_public = COALESCE($4, is_public),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {LINK_COLUMNS}
            "
        ))
        .bind(link.id)
        .bind(values.slug)
        .bind(values.url.map(url::Url::as_str))
        .bind(values.is_public)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(|err| unique_violation_or(err, Error::DuplicateSlug))?;

        Ok(link.into())
    }

    async fn delete_link(&self, link: &Link) -> Result<()> {
        sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(link.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }

    async fn increment_clicks(&self, link: &Link) -> Result<()> {
        sqlx::query("UPDATE links SET clicks = clicks + 1 WHERE id = $1")
            .bind(link.id)
            .execute(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(())
    }
}

/// Utility function for mapping any error into a connection error
#[allow(clippy::needless_pass_by_value)]
fn connection_error(err: sqlx::Error) -> Error {
    tracing::error!("Postgres error: {err}");

    Error::Connection(err.to_string())
}

/// Map a unique violation to the given error, anything else is a connection error
fn unique_violation_or(err: sqlx::Error, duplicate: Error) -> Error {
    match &err {
        sqlx::Error::Database(database_error) if database_error.is_unique_violation() => duplicate,
        _ => connection_error(err),
    }
}

//! Accounts owning links

use anyhow::Result;
use anyhow::anyhow;
use chrono::naive::NaiveDateTime;
use uuid::Uuid;

use crate::config::Config;
use crate::password::generate;
use crate::password::hash;
use crate::storage::CreateAccountValues;
use crate::storage::Storage;

/// Minimal length of a display name
pub const NAME_MIN_LENGTH: usize = 2;

/// Maximal length of a display name
pub const NAME_MAX_LENGTH: usize = 255;

#[derive(Clone, Debug)]
pub struct Account {
    pub id: Uuid,
    pub session_id: Uuid,
    pub username: String,
    pub hashed_password: String,
    pub name: Option<String>,
    pub is_public: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Make sure there is at least one account to log in with
///
/// Missing credentials are generated and logged, once
pub async fn ensure_initial_account<S: Storage>(storage: &S, config: &Config) -> Result<()> {
    let account = storage.find_any_single_account().await?;

    if account.is_some() {
        return Ok(());
    }

    let username = config.initial_username.clone().unwrap_or_else(|| {
        let initial_username = Uuid::new_v4().to_string();
        tracing::info!("`INITIAL_USERNAME` not set, generating new username: {initial_username}");
        initial_username
    });

    let password = config.initial_password.clone().unwrap_or_else(|| {
        let initial_password = generate();
        tracing::info!("`INITIAL_PASSWORD` not set, generating new password: {initial_password}");
        initial_password
    });

    let hashed_password =
        hash(&password).map_err(|err| anyhow!("Could not hash initial password: {err}"))?;

    let values = CreateAccountValues {
        session_id: &Uuid::new_v4(),
        username: &username,
        hashed_password: &hashed_password,
    };

    storage.create_account(&values).await?;

    Ok(())
}

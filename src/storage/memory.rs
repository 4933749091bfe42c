//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
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

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All accounts in storage
    accounts: Arc<Mutex<HashMap<Uuid, Account>>>,

    /// All links in storage, in order of creation
    links: Arc<Mutex<Vec<Link>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for Memory {
    async fn find_any_single_account(&self) -> Result<Option<Account>> {
        Ok(self.accounts.lock().await.values().next().cloned())
    }

    async fn find_single_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .await
            .values()
            .find(|account| account.username == username)
            .cloned())
    }

    async fn find_single_account_by_id(&self, id: &Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.lock().await.get(id).cloned())
    }

    async fn create_account(&self, values: &CreateAccountValues) -> Result<Account> {
        let mut accounts = self.accounts.lock().await;

        if accounts
            .values()
            .any(|account| account.username == values.username)
        {
            return Err(Error::DuplicateUsername);
        }

        let now = Utc::now().naive_utc();
        let account = Account {
            id: Uuid::new_v4(),
            session_id: *values.session_id,
            username: values.username.to_string(),
            hashed_password: values.hashed_password.to_string(),
            name: None,
            is_public: false,
            created_at: now,
            updated_at: now,
        };

        accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn update_account(
        &self,
        account: &Account,
        values: &UpdateAccountValues,
    ) -> Result<Account> {
        self.accounts
            .lock()
            .await
            .get_mut(&account.id)
            .map(|account| {
                if let Some(name) = values.name {
                    account.name = Some(name.to_string());
                }

                if let Some(is_public) = values.is_public {
                    account.is_public = is_public;
                }

                account.updated_at = Utc::now().naive_utc();

                account.clone()
            })
            .ok_or_else(|| Error::Connection("Account vanished from storage".to_string()))
    }

    async fn delete_account(&self, account: &Account) -> Result<()> {
        // accounts before links, same order as `create_link`
        let mut accounts = self.accounts.lock().await;
        let mut links = self.links.lock().await;

        links.retain(|link| link.user_id != Some(account.id));
        accounts.remove(&account.id);

        Ok(())
    }

    async fn find_all_links_by_account(&self, account: &Account) -> Result<Vec<Link>> {
        Ok(self
            .links
            .lock()
            .await
            .iter()
            .filter(|link| link.is_owned_by(account))
            .cloned()
            .collect())
    }

    async fn find_single_link_by_slug(&self, slug: &str) -> Result<Option<Link>> {
        Ok(self
            .links
            .lock()
            .await
            .iter()
            .find(|link| link.slug == slug)
            .cloned())
    }

    async fn find_single_link_by_id(&self, id: &Uuid) -> Result<Option<Link>> {
        Ok(self
            .links
            .lock()
            .await
            .iter()
            .find(|link| &link.id == id)
            .cloned())
    }

    async fn create_link(&self, values: &CreateLinkValues) -> Result<Link> {
        // held until the link is stored, the owner can not be deleted in between
        let accounts = self.accounts.lock().await;
        let mut links = self.links.lock().await;

        if let Some(account) = values.account {
            if !accounts.contains_key(&account.id) {
                return Err(Error::Connection("Account vanished from storage".to_string()));
            }
        }

        if links.iter().any(|link| link.slug == values.slug) {
            return Err(Error::DuplicateSlug);
        }

        let now = Utc::now().naive_utc();
        let link = Link {
            id: Uuid::new_v4(),
            user_id: values.account.map(|account| account.id),
            slug: values.slug.to_string(),
            url: values.url.to_string(),
            clicks: 0,
            is_public: false,
            created_at: now,
            updated_at: now,
        };

        links.push(link.clone());

        Ok(link)
    }

    async fn update_link(&self, link: &Link, values: &UpdateLinkValues) -> Result<Link> {
        let mut links = self.links.lock().await;

        if let Some(slug) = values.slug {
            if links
                .iter()
                .any(|other| other.slug == slug && other.id != link.id)
            {
                return Err(Error::DuplicateSlug);
            }
        }

        links
            .iter_mut()
            .find(|stored| stored.id == link.id)
            .map(|link| {
                if let Some(slug) = values.slug {
                    link.slug = slug.to_string();
                }

                if let Some(url) = values.url {
                    link.url = url.to_string();
                }

                if let Some(is_public) = values.is_public {
                    link.is_public = is_public;
                }

                link.updated_at = Utc::now().naive_utc();

                link.clone()
            })
            .ok_or_else(|| Error::Connection("Link vanished from storage".to_string()))
    }

    async fn delete_link(&self, link: &Link) -> Result<()> {
        self.links.lock().await.retain(|stored| stored.id != link.id);

        Ok(())
    }

    async fn increment_clicks(&self, link: &Link) -> Result<()> {
        if let Some(link) = self
            .links
            .lock()
            .await
            .iter_mut()
            .find(|stored| stored.id == link.id)
        {
            link.clicks = link.clicks.saturating_add(1);
        }

        Ok(())
    }
}

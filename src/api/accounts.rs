//! Account API endpoints
//!
//! Logging in, signing up, the account dashboard and public profiles

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::accounts::Account;
use crate::accounts::NAME_MAX_LENGTH;
use crate::accounts::NAME_MIN_LENGTH;
use crate::ordering::SortOrder;
use crate::ordering::apply_ordering;
use crate::password::generate;
use crate::password::hash;
use crate::password::verify;
use crate::storage::CreateAccountValues;
use crate::storage::Storage;
use crate::storage::UpdateAccountValues;

use super::DELETED;
use super::Error;
use super::Form;
use super::JwtKeys;
use super::PathParameters;
use super::QueryParameters;
use super::Session;
use super::Success;
use super::links::LinkResponse;
use super::session::Token;
use super::session::generate_token;

/// The account response information
///
/// A subset of all the information, ready to be serialized for the outside world
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// The account ID
    pub id: Uuid,

    /// The username
    pub username: String,

    /// The display name
    pub name: Option<String>,

    /// Is the profile visible to everybody
    pub is_public: bool,

    /// The password, if generated
    // Password should only be added when newly generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl AccountResponse {
    /// Create an account response from an [`Account`](Account)
    fn from_account(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            name: account.name.clone(),
            is_public: account.is_public,
            password: None,
        }
    }

    /// Add a password to the account response
    ///
    /// This is explicit extra action to take, to make sure this is really what you want to do
    fn set_password(&mut self, password: &str) {
        self.password = Some(password.to_string());
    }
}

/// Login form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    /// Username of the account
    username: String,
    /// Password of the account
    password: String,
}

/// Get a token for an account "session"
///
/// The token can then be used to access the rest of the API routes by using it in the
/// `Authorization` header
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "username": "admin", "password": "verysecret" }' \
///     http://localhost:6000/api/users/token
/// ```
///
/// Response
/// ```json
/// { "token_type": "Bearer", "expires_in": 3600, "access_token": "some token" }
/// ```
pub async fn token<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(storage): Extension<S>,
    Form(form): Form<LoginForm>,
) -> Result<Success<Token>, Error> {
    let account = storage
        .find_single_account_by_username(&form.username)
        .await?;

    match account {
        Some(account) if verify(&account.hashed_password, &form.password) => {
            generate_token(&jwt_keys, &account).map(Success::ok)
        }
        _ => Err(Error::bad_request("Invalid credentials")),
    }
}

/// Sign up form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountForm {
    /// Username of the new account
    username: String,
    /// Optional password of the new account
    ///
    /// When not provided a new password will be generated and returned in the response, this will
    /// be the only time the password is visible -- make sure to capture it.
    password: Option<String>,
}

/// Sign up for an account based on the [`CreateAccountForm`](CreateAccountForm) form
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "username": "some-username" }' \
///     http://localhost:6000/api/users
/// ```
///
/// Response
/// ```json
/// { "id": "<uuid>", "username": "some-username", "password": "veryverysecret" ... }
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    Form(form): Form<CreateAccountForm>,
) -> Result<Success<AccountResponse>, Error> {
    let username = form.username.trim();
    if username.is_empty() {
        return Err(Error::bad_request("Username can not be empty"));
    }

    let (is_generated, password) = match form.password {
        Some(password) if !password.is_empty() => (false, password),
        _ => (true, generate()),
    };

    let hashed_password = hash(&password).map_err(Error::internal_server_error)?;

    let values = CreateAccountValues {
        session_id: &Uuid::new_v4(),
        username,
        hashed_password: &hashed_password,
    };

    let account = storage.create_account(&values).await?;

    tracing::info!(r#"Created account "{}""#, account.username);

    let mut response = AccountResponse::from_account(&account);

    // only add the generated password, its the only time the password is known to anybody
    if is_generated {
        response.set_password(&password);
    }

    Ok(Success::created(response))
}

/// Query of the dashboard
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Ordering of the links, as received when not provided
    #[serde(default)]
    order: SortOrder,
}

/// Dashboard response: the session account with its links
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// The session account
    user: AccountResponse,

    /// All links of the account
    links: Vec<LinkResponse>,
}

/// The session account with all its links
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:6000/api/auth?order=clicks_desc'
/// ```
///
/// Response:
/// ```json
/// { "user": { "id": "<uuid>", "username": "admin" ... }, "links": [ ... ] }
/// ```
pub async fn dashboard<S: Storage>(
    Extension(storage): Extension<S>,
    session: Session<S>,
    QueryParameters(query): QueryParameters<DashboardQuery>,
) -> Result<Success<DashboardResponse>, Error> {
    let links = storage.find_all_links_by_account(&session).await?;
    let links = apply_ordering(&links, query.order);

    Ok(Success::ok(DashboardResponse {
        user: AccountResponse::from_account(&session),
        links: LinkResponse::from_link_multiple(links),
    }))
}

/// Account settings form
///
/// The name is required, the visibility is left alone when not provided
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountForm {
    /// Display name
    name: String,

    /// Visibility of the profile
    is_public: Option<bool>,
}

/// Update the settings of the session account
///
/// Request:
/// ```sh
/// curl -v -XPUT -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "name": "Some Name", "isPublic": true }' \
///     http://localhost:6000/api/auth
/// ```
pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    session: Session<S>,
    Form(form): Form<UpdateAccountForm>,
) -> Result<Success<AccountResponse>, Error> {
    let name = form.name.trim();
    let length = name.chars().count();

    if length < NAME_MIN_LENGTH {
        return Err(Error::bad_request(format!(
            "Name must be at least {NAME_MIN_LENGTH} characters"
        )));
    }

    if length > NAME_MAX_LENGTH {
        return Err(Error::bad_request(format!(
            "Name can not be longer than {NAME_MAX_LENGTH} characters"
        )));
    }

    let values = UpdateAccountValues {
        name: Some(name),
        is_public: form.is_public,
    };

    let account = storage.update_account(&session, &values).await?;

    Ok(Success::ok(AccountResponse::from_account(&account)))
}

/// Delete the session account and all its links, the response body is `OK`
///
/// Request:
/// ```sh
/// curl -v -XDELETE \
///     -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/api/auth
/// ```
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    session: Session<S>,
) -> Result<&'static str, Error> {
    storage.delete_account(&session).await?;

    tracing::info!(r#"Deleted account "{}""#, session.username);

    Ok(DELETED)
}

/// The public links of a public profile
///
/// Private profiles are indistinguishable from missing ones
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/api/users/some-username/links
/// ```
pub async fn public_links<S: Storage>(
    Extension(storage): Extension<S>,
    PathParameters(username): PathParameters<String>,
    QueryParameters(query): QueryParameters<DashboardQuery>,
) -> Result<Success<Vec<LinkResponse>>, Error> {
    let account = storage
        .find_single_account_by_username(&username)
        .await?
        .filter(|account| account.is_public)
        .ok_or_else(|| Error::not_found("Account not found"))?;

    let links = storage
        .find_all_links_by_account(&account)
        .await?
        .into_iter()
        .filter(|link| link.is_public)
        .collect::<Vec<_>>();

    Ok(Success::ok(LinkResponse::from_link_multiple(
        apply_ordering(&links, query.order),
    )))
}

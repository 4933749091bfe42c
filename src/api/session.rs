//! Session lookup
//!
//! Get the logged in account from the request based on the Authorization header

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::extract::OptionalFromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::accounts::Account;
use crate::api::Error;
use crate::storage::Storage;

/// How long a token stays valid, in seconds
const TOKEN_LIFETIME: i64 = 3600;

/// The keys used for encoding/decoding JWT tokens
#[derive(Clone)]
pub struct JwtKeys {
    /// The encoding key
    encoding: EncodingKey,

    /// The decoding key
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create new encoding/decoding keys, derived from a secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// The JWT claims to identify an account
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    /// The account ID
    sub: Uuid,

    /// When the token expires, as a UNIX timestamp
    exp: i64,

    /// A session ID, used to invalidate tokens before the expiration date
    jti: Uuid,
}

/// Token information served to the account holder
#[derive(Debug, Deserialize, Serialize)]
pub struct Token {
    /// Type of the token: Bearer
    #[allow(clippy::struct_field_names)] // `type` is a reserved keyword
    pub token_type: String,

    /// In how many seconds does the token expire
    pub expires_in: i64,

    /// The access token to provide to follow up requests in the Authorization header
    #[allow(clippy::struct_field_names)] // `access_token` is the name of the field
    pub access_token: String,
}

impl Token {
    /// Create a new token response
    fn new(access_token: String, expires_in: i64) -> Self {
        Self {
            token_type: "Bearer".to_string(),
            expires_in,
            access_token,
        }
    }
}

/// Generate a token for the outside world for a given account
pub fn generate_token(jwt_keys: &JwtKeys, account: &Account) -> Result<Token, Error> {
    use jsonwebtoken::Header;
    use jsonwebtoken::encode;

    let claims = Claims {
        sub: account.id,
        exp: chrono::Utc::now().timestamp() + TOKEN_LIFETIME,
        jti: account.session_id,
    };

    let access_token = encode(&Header::default(), &claims, &jwt_keys.encoding)
        .map_err(Error::internal_server_error)?;

    Ok(Token::new(access_token, TOKEN_LIFETIME))
}

/// The logged in account
pub struct Session<S> {
    /// The actual account
    account: Arc<Account>,

    /// Storage the account was loaded from
    storage: PhantomData<S>,
}

impl<S> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self {
            account: Arc::clone(&self.account),
            storage: PhantomData,
        }
    }
}

impl<S> Session<S> {
    /// Create the session for an account
    fn new(account: Account) -> Self {
        Self {
            account: Arc::new(account),
            storage: PhantomData,
        }
    }
}

impl<S> Deref for Session<S> {
    type Target = Account;

    fn deref(&self) -> &Self::Target {
        &self.account
    }
}

impl<B, S> FromRequestParts<B> for Session<S>
where
    B: Send + Sync,
    S: Storage,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &B) -> Result<Self, Self::Rejection> {
        use jsonwebtoken::Validation;
        use jsonwebtoken::decode;

        // Extract the token from the authorization header
        let TypedHeader(Authorization(bearer)) =
            <TypedHeader<Authorization<Bearer>> as FromRequestParts<B>>::from_request_parts(
                parts, state,
            )
            .await
            .map_err(|_| Error::unauthorized())?;

        let Extension(jwt_keys) = parts
            .extract::<Extension<JwtKeys>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get JWT keys"))?;

        let Extension(storage) = parts
            .extract::<Extension<S>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get the storage"))?;

        // Decode the account data
        let token_data =
            decode::<Claims>(bearer.token(), &jwt_keys.decoding, &Validation::default())
                .map_err(|err| {
                    tracing::debug!("Invalid token: {err}");
                    Error::unauthorized()
                })?;

        let claims = token_data.claims;

        let account = storage.find_single_account_by_id(&claims.sub).await?;

        match account {
            // mechanism to invalidate JWT tokens
            Some(account) if claims.jti == account.session_id => Ok(Session::new(account)),
            Some(_) => {
                tracing::debug!("Token of an old session used");
                Err(Error::unauthorized())
            }
            None => Err(Error::unauthorized()),
        }
    }
}

/// Visitors without an Authorization header are anonymous, a bad header is still refused
impl<B, S> OptionalFromRequestParts<B> for Session<S>
where
    B: Send + Sync,
    S: Storage,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &B,
    ) -> Result<Option<Self>, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(None);
        }

        <Self as FromRequestParts<B>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

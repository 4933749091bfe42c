//! Links, the slug to destination mapping
//!
//! Slug and URL rules live here as well, the API and the create form share them

use chrono::naive::NaiveDateTime;
use rand_core::OsError;
use rand_core::OsRng;
use rand_core::TryRngCore;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use url::Url;
use uuid::Uuid;

use crate::accounts::Account;

/// Maximal length of a slug, in characters
pub const SLUG_MAX_LENGTH: usize = 255;

/// Length of a generated slug
pub const GENERATED_SLUG_LENGTH: usize = 7;

/// Characters a generated slug is made of
const SLUG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Clone, Debug)]
pub struct Link {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub slug: String,
    pub url: String,
    pub clicks: u64,
    pub is_public: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Link {
    /// Is the link created by this account?
    ///
    /// Anonymous links are owned by nobody
    pub fn is_owned_by(&self, account: &Account) -> bool {
        self.user_id == Some(account.id)
    }
}

/// Reasons a slug is refused
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error(r#"Slug can not contain "?""#)]
    QuestionMark,

    #[error(r##"Slug can not contain "#""##)]
    Hash,

    #[error("Slug can not contain whitespace")]
    Whitespace,

    #[error(r#"Slug can not start with "api/""#)]
    Reserved,

    #[error("Slug can not be longer than {SLUG_MAX_LENGTH} characters")]
    TooLong,
}

/// Reasons a destination URL is refused
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Invalid URL: {0}")]
    Invalid(#[from] url::ParseError),

    #[error("URL must use http or https")]
    UnsupportedScheme,
}

/// Normalize and validate a slug
///
/// Leading and trailing slashes are removed and the slug is NFC normalized, so the same slug
/// typed on different systems ends up at the same link.
///
/// ```rust,ignore
/// assert_eq!(normalize_slug("/some-slug/"), Ok("some-slug".to_string()));
/// ```
pub fn normalize_slug(slug: &str) -> Result<String, SlugError> {
    let slug = slug.trim_matches('/').nfc().collect::<String>();

    for ch in slug.chars() {
        if ch == '?' {
            return Err(SlugError::QuestionMark);
        }

        if ch == '#' {
            return Err(SlugError::Hash);
        }

        if ch.is_whitespace() {
            return Err(SlugError::Whitespace);
        }
    }

    // the API lives next to the redirects
    if slug == "api" || slug.starts_with("api/") {
        return Err(SlugError::Reserved);
    }

    if slug.chars().count() > SLUG_MAX_LENGTH {
        return Err(SlugError::TooLong);
    }

    Ok(slug)
}

/// Parse and validate a destination URL
///
/// Only absolute `http` and `https` URLs are accepted
pub fn parse_destination(url: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url.trim())?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(UrlError::UnsupportedScheme),
    }
}

/// Generate a random slug from the OS random source
pub fn generate_slug() -> Result<String, OsError> {
    let mut rng = OsRng;

    (0..GENERATED_SLUG_LENGTH)
        .map(|_| {
            rng.try_next_u32()
                .map(|n| char::from(SLUG_ALPHABET[n as usize % SLUG_ALPHABET.len()]))
        })
        .collect()
}

//! The create form of the front page

use crate::client::ClientError;
use crate::client::LinkApi;
use crate::client::LinkRecord;
use crate::client::NewLink;
use crate::links::normalize_slug;
use crate::links::parse_destination;

use super::UiContext;

/// Validation messages per field
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub url: Option<String>,
    pub slug: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.slug.is_none()
    }
}

/// Reasons a submit does not go out
#[derive(Debug, PartialEq, Eq)]
pub enum Refused {
    /// A previous submit is still in flight
    Busy,

    /// The fields are not valid
    Invalid(FieldErrors),
}

/// State of the create form
#[derive(Debug, Default)]
pub struct CreateForm {
    /// Destination, as typed
    pub url: String,

    /// Optional slug, as typed
    pub slug: String,

    loading: bool,
    result: Option<String>,
    error: Option<String>,
}

impl CreateForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Short URL of the last created link
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Message of the last failed submit
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Check the fields with the same rules the service uses
    pub fn validate(&self) -> FieldErrors {
        let url = self.url.trim();
        let slug = self.slug.trim();

        let url = if url.is_empty() {
            Some("URL is required".to_string())
        } else {
            parse_destination(url).err().map(|err| err.to_string())
        };

        let slug = if slug.is_empty() {
            None
        } else {
            normalize_slug(slug).err().map(|err| err.to_string())
        };

        FieldErrors { url, slug }
    }

    /// Start a submit, the previous result is cleared
    ///
    /// # Errors
    ///
    /// Will return `Err` while another submit is in flight or when the fields are not valid
    pub fn begin_submit(&mut self) -> Result<NewLink, Refused> {
        if self.loading {
            return Err(Refused::Busy);
        }

        let errors = self.validate();
        if !errors.is_empty() {
            return Err(Refused::Invalid(errors));
        }

        self.loading = true;
        self.result = None;
        self.error = None;

        let slug = self.slug.trim();

        Ok(NewLink {
            url: self.url.trim().to_string(),
            slug: (!slug.is_empty()).then(|| slug.to_string()),
        })
    }

    /// Process the answer of the service
    pub fn finish_submit(&mut self, outcome: Result<LinkRecord, ClientError>, ctx: &UiContext) {
        self.loading = false;

        match outcome {
            Ok(record) => {
                let short_url = ctx.short_url(&record.slug);
                tracing::info!("Created short URL {short_url}");

                self.result = Some(short_url);
            }
            Err(err) => {
                tracing::warn!("Could not create link: {err}");

                self.error = Some(err.to_string());
            }
        }
    }

    /// Create the link
    ///
    /// # Errors
    ///
    /// Will return `Err` when the submit does not go out, failures of the service end up in
    /// [`CreateForm::error`]
    pub async fn submit<A>(&mut self, api: &A, ctx: &UiContext) -> Result<(), Refused>
    where
        A: LinkApi + ?Sized,
    {
        let link = self.begin_submit()?;
        let outcome = api.create_link(&link).await;

        self.finish_submit(outcome, ctx);

        Ok(())
    }
}

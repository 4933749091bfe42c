//! Presentation context shared by all dashboard views

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use percent_encoding::AsciiSet;
use percent_encoding::CONTROLS;
use percent_encoding::utf8_percent_encode;
use thiserror::Error;
use url::Url;

use crate::utils::env_var;
use crate::utils::env_var_or_else;

const DEFAULT_PUBLIC_URL: &str = "http://localhost:6000/";

/// Characters escaped in a single segment of a short URL path
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Color theme of the views
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The other theme
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error(r#"Unknown theme "{0}""#)]
pub struct UnknownTheme(String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(UnknownTheme(value.to_string())),
        }
    }
}

/// Context of the rendering layer
///
/// Created once at startup and handed to whatever needs the theme or has to build short URLs.
#[derive(Clone, Debug)]
pub struct UiContext {
    theme: Theme,
    public_url: Url,
}

impl UiContext {
    /// Context for a service reachable at `public_url`, with the default theme
    pub fn new(mut public_url: Url) -> Self {
        if !public_url.path().ends_with('/') {
            let path = format!("{}/", public_url.path());
            public_url.set_path(&path);
        }

        Self {
            theme: Theme::default(),
            public_url,
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Read the context from the environment
    ///
    /// - `PUBLIC_URL`, defaults to `http://localhost:6000/`
    /// - `THEME`, `dark` or `light`, unknown values fall back to `dark`
    ///
    /// # Errors
    ///
    /// Will return `Err` when `PUBLIC_URL` is not a valid URL
    pub fn from_env() -> Result<Self> {
        let public_url = Url::parse(&env_var_or_else("PUBLIC_URL", || {
            DEFAULT_PUBLIC_URL.to_string()
        }))?;

        let theme = match env_var("THEME").map(|theme| theme.parse::<Theme>()) {
            Some(Ok(theme)) => theme,
            Some(Err(err)) => {
                tracing::warn!("{err}, using the default theme");
                Theme::default()
            }
            None => Theme::default(),
        };

        Ok(Self::new(public_url).with_theme(theme))
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch to the other theme, returns the new one
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggle();
        tracing::debug!("Switched to the {} theme", self.theme);

        self.theme
    }

    /// Class name for the document body
    pub fn body_class(&self) -> &'static str {
        self.theme.as_str()
    }

    pub fn public_url(&self) -> &Url {
        &self.public_url
    }

    /// The short URL visitors use for a slug
    ///
    /// Every segment of the slug is percent-encoded, the redirect decodes the path again.
    pub fn short_url(&self, slug: &str) -> String {
        let path = slug
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");

        format!("{}{path}", self.public_url)
    }
}

//! Ordering of link lists
//!
//! Shared by the list endpoint and the dashboard table. All functions are pure: they hand back a
//! new list and never touch the one they were given.

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::links::Link;

/// The fields a list of links can be ordered and reconciled on
pub trait LinkFields {
    /// Unique identifier
    fn id(&self) -> Uuid;

    /// Slug of the link
    fn slug(&self) -> &str;

    /// Number of redirects so far
    fn clicks(&self) -> u64;
}

impl LinkFields for Link {
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

/// Selected ordering of a link list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum SortOrder {
    /// Keep the order as received
    #[default]
    #[serde(rename = "none")]
    None,

    /// Shortest slug first
    #[serde(rename = "slug")]
    SlugLength,

    /// Least clicked first
    #[serde(rename = "clicks_asc")]
    ClicksAscending,

    /// Most clicked first
    #[serde(rename = "clicks_desc")]
    ClicksDescending,
}

impl SortOrder {
    /// Selection after activating the clicks column
    ///
    /// Ascending first, every next activation flips the direction
    #[must_use]
    pub fn toggle_clicks(self) -> Self {
        match self {
            Self::ClicksAscending => Self::ClicksDescending,
            _ => Self::ClicksAscending,
        }
    }

    /// Selection after activating the slug column
    ///
    /// There is only one direction for slugs, so this is not a toggle
    #[must_use]
    pub fn select_slug(self) -> Self {
        Self::SlugLength
    }

    /// Name used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SlugLength => "slug",
            Self::ClicksAscending => "clicks_asc",
            Self::ClicksDescending => "clicks_desc",
        }
    }
}

/// Order links by the given selection
///
/// The sorts are stable: equal keys keep their relative order.
pub fn apply_ordering<T>(records: &[T], order: SortOrder) -> Vec<T>
where
    T: LinkFields + Clone,
{
    let mut ordered = records.to_vec();

    match order {
        SortOrder::None => {}
        SortOrder::SlugLength => ordered.sort_by_key(|record| record.slug().chars().count()),
        SortOrder::ClicksAscending => ordered.sort_by_key(|record| record.clicks()),
        SortOrder::ClicksDescending => ordered.sort_by(|a, b| b.clicks().cmp(&a.clicks())),
    }

    ordered
}

/// Replace the record with the identifier of `old` by `new`, in place of the old one
pub fn replace_record<T>(records: &[T], old: &T, new: T) -> Vec<T>
where
    T: LinkFields + Clone,
{
    let id = old.id();
    let mut replaced = records.to_vec();

    if let Some(position) = replaced.iter().position(|record| record.id() == id) {
        replaced[position] = new;
    }

    replaced
}

/// Remove the record with the given identifier
pub fn remove_record<T>(records: &[T], id: Uuid) -> Vec<T>
where
    T: LinkFields + Clone,
{
    records
        .iter()
        .filter(|record| record.id() != id)
        .cloned()
        .collect()
}

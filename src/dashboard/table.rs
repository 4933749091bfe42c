//! The links table
//!
//! Holds a view copy of the links and reconciles local changes with the service. Network calls
//! are split in a `begin_*` and a `finish_*` step, so the busy flags can be observed while a
//! request is in flight; the `confirm_delete` and `submit_edit` helpers chain both steps.
//!
//! Deleting waits for the service: the record only disappears after an `OK` body. Editing is
//! optimistic: the changes show right away and are rolled back when the service refuses them.

use uuid::Uuid;

use crate::api::DELETED;
use crate::client::ClientError;
use crate::client::LinkApi;
use crate::client::LinkChanges;
use crate::client::LinkRecord;
use crate::ordering::SortOrder;
use crate::ordering::apply_ordering;
use crate::ordering::remove_record;
use crate::ordering::replace_record;

use super::UiContext;

/// Modal dialogs of the table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modal {
    Edit,
    Delete,
}

/// A delete in flight
#[derive(Debug)]
pub struct DeleteRequest {
    pub id: Uuid,
}

/// An edit in flight
#[derive(Debug)]
pub struct EditRequest {
    /// Changes sent to the service
    pub changes: LinkChanges,

    /// The record before the changes, restored on failure
    previous: LinkRecord,

    /// The record as shown while waiting
    optimistic: LinkRecord,
}

impl EditRequest {
    pub fn id(&self) -> Uuid {
        self.previous.id
    }
}

/// A rendered line of the table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub record: LinkRecord,
    pub short_url: String,

    /// Every other row gets a background
    pub striped: bool,

    /// Edit and delete buttons are shown
    pub show_actions: bool,
}

/// State of the links table
#[derive(Debug, Default)]
pub struct LinkTable {
    records: Vec<LinkRecord>,
    order: SortOrder,
    modal: Option<Modal>,
    selected: Option<LinkRecord>,
    deleting: bool,
    saving: bool,
    error: Option<String>,
    show_actions: bool,
}

impl LinkTable {
    /// Table for the links of the owner, with edit and delete actions
    pub fn owned(records: Vec<LinkRecord>) -> Self {
        Self {
            records,
            show_actions: true,
            ..Self::default()
        }
    }

    /// Read-only table, as shown on a public profile
    pub fn public(records: Vec<LinkRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    /// Records in the order they were received, with local changes applied
    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn modal(&self) -> Option<Modal> {
        self.modal
    }

    pub fn selected(&self) -> Option<&LinkRecord> {
        self.selected.as_ref()
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Message of the last failed action
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn show_actions(&self) -> bool {
        self.show_actions
    }

    /// Order by slug length, shortest first
    pub fn sort_by_slug(&mut self) {
        self.order = self.order.select_slug();
    }

    /// Order by clicks, flipping the direction on every activation
    pub fn sort_by_clicks(&mut self) {
        self.order = self.order.toggle_clicks();
    }

    /// Records in the selected order
    pub fn visible(&self) -> Vec<LinkRecord> {
        apply_ordering(&self.records, self.order)
    }

    /// Rows to render, in the selected order
    pub fn rows(&self, ctx: &UiContext) -> Vec<Row> {
        self.visible()
            .into_iter()
            .enumerate()
            .map(|(index, record)| Row {
                short_url: ctx.short_url(&record.slug),
                striped: index % 2 == 1,
                show_actions: self.show_actions,
                record,
            })
            .collect()
    }

    /// Open the edit dialog for a record
    pub fn open_edit(&mut self, record: &LinkRecord) -> bool {
        self.open(Modal::Edit, record)
    }

    /// Open the delete confirmation for a record
    pub fn open_delete(&mut self, record: &LinkRecord) -> bool {
        self.open(Modal::Delete, record)
    }

    fn open(&mut self, modal: Modal, record: &LinkRecord) -> bool {
        if !self.show_actions || self.deleting || self.saving {
            return false;
        }

        self.modal = Some(modal);
        self.selected = Some(record.clone());
        self.error = None;

        true
    }

    /// Close the open dialog
    ///
    /// Refused while a delete is in flight
    pub fn dismiss_modal(&mut self) -> bool {
        if self.deleting {
            return false;
        }

        self.modal = None;
        self.selected = None;
        self.error = None;

        true
    }

    /// Start deleting the selected record
    ///
    /// Only possible from the delete confirmation, and only once at a time
    pub fn begin_delete(&mut self) -> Option<DeleteRequest> {
        if self.modal != Some(Modal::Delete) || self.deleting {
            return None;
        }

        let id = self.selected.as_ref()?.id;

        self.deleting = true;
        self.error = None;

        Some(DeleteRequest { id })
    }

    /// Process the answer of the service to a delete
    ///
    /// Returns if the record is removed
    pub fn finish_delete(
        &mut self,
        request: DeleteRequest,
        outcome: Result<String, ClientError>,
    ) -> bool {
        self.deleting = false;

        match outcome {
            Ok(body) if body == DELETED => {
                tracing::info!("Deleted link {}", request.id);

                self.records = remove_record(&self.records, request.id);
                self.selected = None;
                self.modal = None;

                true
            }
            Ok(body) => {
                tracing::warn!("Unexpected answer deleting link {}: {body}", request.id);
                self.error = Some(body);

                false
            }
            Err(err) => {
                tracing::warn!("Could not delete link {}: {err}", request.id);
                self.error = Some(err.to_string());

                false
            }
        }
    }

    /// Delete the selected record, after confirmation
    pub async fn confirm_delete<A>(&mut self, api: &A) -> bool
    where
        A: LinkApi + ?Sized,
    {
        let Some(request) = self.begin_delete() else {
            return false;
        };

        let outcome = api.delete_link(request.id).await;

        self.finish_delete(request, outcome)
    }

    /// Apply changes to the selected record, before the service confirms them
    pub fn begin_edit(&mut self, changes: LinkChanges) -> Option<EditRequest> {
        if self.modal != Some(Modal::Edit) || self.saving {
            return None;
        }

        let id = self.selected.as_ref()?.id;
        let previous = self.records.iter().find(|record| record.id == id)?.clone();
        let optimistic = changes.apply(&previous);

        self.records = replace_record(&self.records, &previous, optimistic.clone());
        self.saving = true;
        self.error = None;

        Some(EditRequest {
            changes,
            previous,
            optimistic,
        })
    }

    /// Process the answer of the service to an edit
    ///
    /// The record of the service replaces the optimistic one, a failure restores the previous
    /// record. Returns if the changes are saved.
    pub fn finish_edit(
        &mut self,
        request: EditRequest,
        outcome: Result<LinkRecord, ClientError>,
    ) -> bool {
        self.saving = false;

        match outcome {
            Ok(updated) => {
                tracing::info!("Updated link {}", updated.id);

                self.records = replace_record(&self.records, &request.optimistic, updated);

                if self.modal == Some(Modal::Edit) {
                    self.modal = None;
                    self.selected = None;
                }

                true
            }
            Err(err) => {
                tracing::warn!("Could not update link {}: {err}", request.id());

                self.records = replace_record(&self.records, &request.optimistic, request.previous);
                self.error = Some(err.to_string());

                false
            }
        }
    }

    /// Save changes to the selected record
    pub async fn submit_edit<A>(&mut self, api: &A, changes: LinkChanges) -> bool
    where
        A: LinkApi + ?Sized,
    {
        let Some(request) = self.begin_edit(changes) else {
            return false;
        };

        let outcome = api.update_link(request.id(), &request.changes).await;

        self.finish_edit(request, outcome)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use url::Url;

    use crate::client::NewLink;

    use super::*;

    /// Service answering every request the same way
    struct FakeApi {
        delete_body: Option<&'static str>,
        update_succeeds: bool,
    }

    fn rejected(message: &str) -> ClientError {
        ClientError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    #[async_trait]
    impl LinkApi for FakeApi {
        async fn create_link(&self, _link: &NewLink) -> Result<LinkRecord, ClientError> {
            Err(rejected("Not supported"))
        }

        async fn update_link(
            &self,
            id: Uuid,
            changes: &LinkChanges,
        ) -> Result<LinkRecord, ClientError> {
            if !self.update_succeeds {
                return Err(rejected("Slug already exists"));
            }

            let mut updated = record(id, changes.slug.as_deref().unwrap_or("same"), 0);
            updated.is_public = changes.is_public.unwrap_or_default();

            Ok(updated)
        }

        async fn delete_link(&self, _id: Uuid) -> Result<String, ClientError> {
            self.delete_body
                .map(ToString::to_string)
                .ok_or_else(|| rejected("Unauthorized"))
        }
    }

    fn record(id: Uuid, slug: &str, clicks: u64) -> LinkRecord {
        LinkRecord {
            id,
            user_id: None,
            slug: slug.to_string(),
            url: "https://www.example.com/".to_string(),
            clicks,
            is_public: false,
        }
    }

    fn table() -> LinkTable {
        LinkTable::owned(vec![
            record(Uuid::new_v4(), "ab", 5),
            record(Uuid::new_v4(), "a", 1),
            record(Uuid::new_v4(), "abc", 3),
        ])
    }

    fn slugs(records: &[LinkRecord]) -> Vec<&str> {
        records.iter().map(|record| record.slug.as_str()).collect()
    }

    #[test]
    fn test_sorting() {
        let mut table = table();
        assert_eq!(vec!["ab", "a", "abc"], slugs(&table.visible()));

        table.sort_by_slug();
        assert_eq!(vec!["a", "ab", "abc"], slugs(&table.visible()));

        table.sort_by_clicks();
        assert_eq!(SortOrder::ClicksAscending, table.order());
        assert_eq!(vec!["a", "abc", "ab"], slugs(&table.visible()));

        table.sort_by_clicks();
        assert_eq!(SortOrder::ClicksDescending, table.order());
        assert_eq!(vec!["ab", "abc", "a"], slugs(&table.visible()));

        table.sort_by_clicks();
        assert_eq!(SortOrder::ClicksAscending, table.order());

        // the received order is untouched
        assert_eq!(vec!["ab", "a", "abc"], slugs(table.records()));
    }

    #[test]
    fn test_rows() {
        let mut table = table();
        table.sort_by_slug();

        let context = UiContext::new(Url::parse("https://sho.rt/").unwrap());
        let rows = table.rows(&context);

        assert_eq!(3, rows.len());
        assert_eq!("https://sho.rt/a", rows[0].short_url);
        assert!(!rows[0].striped);
        assert!(rows[1].striped);
        assert!(!rows[2].striped);
        assert!(rows.iter().all(|row| row.show_actions));
    }

    #[test]
    fn test_public_table_has_no_actions() {
        let mut table = LinkTable::public(vec![record(Uuid::new_v4(), "a", 0)]);
        let record = table.records()[0].clone();

        assert!(!table.open_delete(&record));
        assert_eq!(None, table.modal());

        let context = UiContext::new(Url::parse("https://sho.rt/").unwrap());
        assert!(!table.rows(&context)[0].show_actions);
    }

    #[tokio::test]
    async fn test_delete_confirmed() {
        let mut table = table();
        let record = table.records()[0].clone();

        assert!(table.open_delete(&record));
        assert_eq!(Some(Modal::Delete), table.modal());

        let api = FakeApi {
            delete_body: Some("OK"),
            update_succeeds: true,
        };

        assert!(table.confirm_delete(&api).await);
        assert_eq!(vec!["a", "abc"], slugs(table.records()));
        assert_eq!(None, table.modal());
        assert_eq!(None, table.selected());
        assert!(!table.is_deleting());
    }

    #[tokio::test]
    async fn test_delete_unexpected_body() {
        let mut table = table();
        let record = table.records()[0].clone();
        table.open_delete(&record);

        let api = FakeApi {
            delete_body: Some("error"),
            update_succeeds: true,
        };

        assert!(!table.confirm_delete(&api).await);
        assert_eq!(3, table.records().len());
        assert_eq!(Some(Modal::Delete), table.modal());
        assert_eq!(Some("error"), table.error());
        assert!(!table.is_deleting());
    }

    #[tokio::test]
    async fn test_delete_rejected() {
        let mut table = table();
        let record = table.records()[1].clone();
        table.open_delete(&record);

        let api = FakeApi {
            delete_body: None,
            update_succeeds: true,
        };

        assert!(!table.confirm_delete(&api).await);
        assert_eq!(3, table.records().len());
        assert_eq!(Some(Modal::Delete), table.modal());
        assert_eq!(Some("Unauthorized"), table.error());
    }

    #[test]
    fn test_dismiss_refused_while_deleting() {
        let mut table = table();
        let record = table.records()[0].clone();
        table.open_delete(&record);

        let request = table.begin_delete().unwrap();
        assert!(table.is_deleting());

        // no second request, the dialog stays
        assert!(table.begin_delete().is_none());
        assert!(!table.dismiss_modal());
        assert_eq!(Some(Modal::Delete), table.modal());

        assert!(table.finish_delete(request, Ok("OK".to_string())));
        assert!(!table.is_deleting());
        assert!(table.dismiss_modal());
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut table = table();
        let record = table.records()[0].clone();
        table.open_edit(&record);

        assert!(table.begin_delete().is_none());
        assert!(!table.is_deleting());
    }

    #[test]
    fn test_edit_is_optimistic() {
        let mut table = table();
        let record = table.records()[1].clone();
        table.open_edit(&record);

        let request = table
            .begin_edit(LinkChanges {
                slug: Some("new".to_string()),
                ..LinkChanges::default()
            })
            .unwrap();

        assert!(table.is_saving());
        assert_eq!(vec!["ab", "new", "abc"], slugs(table.records()));

        let mut updated = record.clone();
        updated.slug = "new".to_string();
        updated.clicks = 2;

        assert!(table.finish_edit(request, Ok(updated)));
        assert!(!table.is_saving());
        assert_eq!(2, table.records()[1].clicks);
        assert_eq!(None, table.modal());
    }

    #[tokio::test]
    async fn test_edit_rolled_back() {
        let mut table = table();
        let record = table.records()[2].clone();
        table.open_edit(&record);

        let api = FakeApi {
            delete_body: Some("OK"),
            update_succeeds: false,
        };

        let changes = LinkChanges {
            slug: Some("taken".to_string()),
            is_public: Some(true),
            ..LinkChanges::default()
        };

        assert!(!table.submit_edit(&api, changes).await);
        assert_eq!(&record, &table.records()[2]);
        assert_eq!(Some(Modal::Edit), table.modal());
        assert_eq!(Some("Slug already exists"), table.error());
        assert!(!table.is_saving());
    }

    #[tokio::test]
    async fn test_edit_saved() {
        let mut table = table();
        let record = table.records()[0].clone();
        table.open_edit(&record);

        let api = FakeApi {
            delete_body: Some("OK"),
            update_succeeds: true,
        };

        let changes = LinkChanges {
            is_public: Some(true),
            ..LinkChanges::default()
        };

        assert!(table.submit_edit(&api, changes).await);
        assert!(table.records()[0].is_public);
        assert_eq!(None, table.error());
    }
}

//! Headless controllers of the dashboard
//!
//! A rendering layer drives these with user events and draws their state. They talk to the
//! service through [`LinkApi`](crate::client::LinkApi).

pub use context::Theme;
pub use context::UiContext;
pub use context::UnknownTheme;
pub use form::CreateForm;
pub use form::FieldErrors;
pub use form::Refused;
pub use table::DeleteRequest;
pub use table::EditRequest;
pub use table::LinkTable;
pub use table::Modal;
pub use table::Row;

mod context;
mod form;
mod table;

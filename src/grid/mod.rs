//! Paged list screens: pagination, filters, columns and the controller that
//! ties them to a backend.

pub mod collaborators;
pub mod columns;
pub mod filters;
pub mod pagination;
pub mod resource;

pub use collaborators::{AssumeYes, Confirmer, Navigator, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use columns::{ActionColumn, ActionConfig, ActionKind, ColumnSpec, RowAction};
pub use filters::{FilterSet, FilterValue};
pub use pagination::{PaginationState, SortDirection, SortSpec};
pub use resource::{DeleteOutcome, FetchOutcome, GridSnapshot, ResourceConfig, ServerPagedResource};

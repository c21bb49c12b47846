//! # Contacts Core
//!
//! Core logic for the clinic contact dashboard.
//!
//! This crate contains the derived-view layer behind the records list:
//! - Filter selection with cascading clinic → unit invalidation, persisted between sessions
//! - Record filtering (exact matches, free-text search, calendar-day date ranges)
//! - Pagination over the filtered collection
//! - Consolidated reports, KPIs and CSV export over the same filtered collection
//!
//! **No API concerns**: HTTP handlers and command-line parsing belong in `api-rest` and `cli`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod datasource;
pub mod error;
pub mod export;
pub mod filters;
pub mod formatting;
pub mod pagination;
pub mod predicate;
pub mod record;
pub mod report;
pub mod store;
pub mod view;

pub use catalog::{OptionCatalog, UnitOption};
pub use config::{CoreConfig, DateBoundary};
pub use constants::{DEFAULT_PAGE, DEFAULT_PER_PAGE, FILTERS_STORAGE_KEY, MAX_PER_PAGE};
pub use contacts_types::NonEmptyText;
pub use datasource::{DataSource, JsonDirDataSource, StaticDataSource};
pub use error::{ContactsError, ContactsResult};
pub use export::{export_csv, ExportKind};
pub use filters::{FilterField, FilterState, FilterUpdate};
pub use pagination::{PageSlice, PaginationCursor};
pub use predicate::{filter_records, RecordPredicate};
pub use record::{find_record, RecordEntity};
pub use report::{ConsolidatedReport, Kpis};
pub use store::{FileStore, FilterStore, MemoryStore, PersistenceStore};
pub use view::{derive_view, ListView};

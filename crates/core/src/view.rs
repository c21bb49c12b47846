//! Filtered, paginated list view.
//!
//! [`derive_view`] is the pure recomputation: filter state + records + cursor in, page out.
//! [`ListView`] wires it to a persisted [`FilterStore`], a [`PaginationCursor`] and the option
//! catalog, and keeps the ordering rules of the dashboard: any filter change sends the cursor
//! back to page 1, and replacing the records pulls the cursor back inside the new page range.

use crate::catalog::{OptionCatalog, UnitOption};
use crate::config::{CoreConfig, DateBoundary};
use crate::datasource::DataSource;
use crate::filters::{FilterState, FilterUpdate};
use crate::pagination::{PageSlice, PaginationCursor};
use crate::predicate::filter_records;
use crate::record::RecordEntity;
use crate::store::{FilterStore, PersistenceStore};
use crate::ContactsResult;

/// Computes the visible page for a filter selection and cursor.
pub fn derive_view<'r>(
    filters: &FilterState,
    records: &'r [RecordEntity],
    cursor: &PaginationCursor,
    boundary: DateBoundary,
) -> PageSlice<'r, RecordEntity> {
    let filtered = filter_records(filters, records, boundary);
    cursor.slice(&filtered)
}

#[derive(Debug)]
pub struct ListView<S> {
    filters: FilterStore<S>,
    cursor: PaginationCursor,
    records: Vec<RecordEntity>,
    catalog: OptionCatalog,
    boundary: DateBoundary,
}

impl<S: PersistenceStore> ListView<S> {
    /// Loads records and options from `source` and restores the saved filter selection.
    pub fn load(source: &impl DataSource, store: S, cfg: &CoreConfig) -> ContactsResult<Self> {
        let records = source.list_records()?;
        let catalog = source.list_option_catalog()?;
        Ok(Self::from_parts(
            records,
            catalog,
            FilterStore::load(store),
            PaginationCursor::new(1, cfg.default_per_page()),
            cfg.date_boundary(),
        ))
    }

    pub fn from_parts(
        records: Vec<RecordEntity>,
        catalog: OptionCatalog,
        filters: FilterStore<S>,
        cursor: PaginationCursor,
        boundary: DateBoundary,
    ) -> Self {
        Self {
            filters,
            cursor,
            records,
            catalog,
            boundary,
        }
    }

    pub fn filters(&self) -> &FilterState {
        self.filters.state()
    }

    pub fn filter_store(&self) -> &FilterStore<S> {
        &self.filters
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn catalog(&self) -> &OptionCatalog {
        &self.catalog
    }

    pub fn records(&self) -> &[RecordEntity] {
        &self.records
    }

    pub fn boundary(&self) -> DateBoundary {
        self.boundary
    }

    /// Applies a filter update. A change sends the cursor back to the first page.
    pub fn set_filter(&mut self, update: FilterUpdate) -> bool {
        let changed = self.filters.set_filter(update);
        if changed {
            self.cursor.go_to_page(1);
        }
        changed
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear_filters();
        self.cursor.go_to_page(1);
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.cursor.go_to_page(page);
    }

    pub fn next_page(&mut self) {
        self.cursor.next_page();
    }

    pub fn prev_page(&mut self) {
        self.cursor.prev_page();
    }

    pub fn change_per_page(&mut self, per_page: usize) {
        self.cursor.change_per_page(per_page);
    }

    pub fn reset_pagination(&mut self) {
        self.cursor.reset();
    }

    /// Units selectable under the currently selected clinic.
    pub fn visible_units(&self) -> Vec<&UnitOption> {
        self.catalog.visible_units(self.filters().clinic())
    }

    pub fn filtered(&self) -> Vec<&RecordEntity> {
        filter_records(self.filters(), &self.records, self.boundary)
    }

    pub fn page(&self) -> PageSlice<'_, RecordEntity> {
        derive_view(self.filters(), &self.records, &self.cursor, self.boundary)
    }

    /// Pulls the cursor back inside the page range of the current filtered collection.
    pub fn clamp_page(&mut self) {
        let total = self.filtered().len();
        self.cursor.clamp_to_total(total);
    }

    /// Swaps in a fresh record collection, keeping filters and clamping the cursor.
    pub fn replace_records(&mut self, records: Vec<RecordEntity>) {
        self.records = records;
        self.clamp_page();
    }
}

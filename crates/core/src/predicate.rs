//! Record filtering.
//!
//! A [`FilterState`] is compiled once into a [`RecordPredicate`], a conjunction of independent
//! checks that are each vacuously true when their filter field is unset:
//!
//! - clinic, unit and action: exact, case-sensitive equality
//! - free text: case-insensitive substring of the subject name or the detail text
//! - date range: inclusive by calendar day, interpreted in the configured [`DateBoundary`]
//!
//! Filtering is stable: matching records keep their source order.

use crate::config::DateBoundary;
use crate::filters::FilterState;
use crate::record::RecordEntity;
use chrono::{DateTime, Utc};

/// Compiled form of a filter selection.
#[derive(Clone, Debug)]
pub struct RecordPredicate<'f> {
    clinic: Option<&'f str>,
    unit: Option<&'f str>,
    action: Option<&'f str>,
    search: Option<String>,
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

impl<'f> RecordPredicate<'f> {
    pub fn new(filters: &'f FilterState, boundary: DateBoundary) -> Self {
        Self {
            clinic: filters.clinic(),
            unit: filters.unit(),
            action: filters.action(),
            search: filters.search().map(str::to_lowercase),
            from: filters.date_from().map(|d| boundary.start_of_day(d)),
            until: filters.date_to().map(|d| boundary.start_of_next_day(d)),
        }
    }

    pub fn matches(&self, record: &RecordEntity) -> bool {
        exact(self.clinic, record.clinic.as_deref())
            && exact(self.unit, record.unit.as_deref())
            && exact(self.action, record.action.as_deref())
            && self.matches_search(record)
            && self.matches_dates(record)
    }

    fn matches_search(&self, record: &RecordEntity) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        [record.subject_name.as_deref(), record.detail.as_deref()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(term))
    }

    fn matches_dates(&self, record: &RecordEntity) -> bool {
        if let Some(from) = self.from {
            if record.timestamp < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if record.timestamp >= until {
                return false;
            }
        }
        true
    }
}

fn exact(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual == Some(wanted),
    }
}

/// Returns the records matching `filters`, in source order.
pub fn filter_records<'r>(
    filters: &FilterState,
    records: &'r [RecordEntity],
    boundary: DateBoundary,
) -> Vec<&'r RecordEntity> {
    let predicate = RecordPredicate::new(filters, boundary);
    let filtered: Vec<&RecordEntity> = records.iter().filter(|r| predicate.matches(r)).collect();
    tracing::debug!(
        "filtered {} of {} records ({} active filters)",
        filtered.len(),
        records.len(),
        filters.active_count()
    );
    filtered
}

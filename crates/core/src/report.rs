//! Consolidated reports and headline figures over a filtered record set.
//!
//! Groups keep the order in which their first record appears, so a report over a stable
//! filter result is itself stable. Missing clinic/unit/action values are grouped under
//! [`EMPTY_PLACEHOLDER`]. Days are calendar days in the configured [`DateBoundary`].

use crate::config::DateBoundary;
use crate::constants::EMPTY_PLACEHOLDER;
use crate::record::RecordEntity;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    #[serde(rename = "inicio")]
    pub start: NaiveDate,
    #[serde(rename = "fim")]
    pub end: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnitGroup {
    #[serde(rename = "unidade")]
    pub unit: String,
    pub total: usize,
    #[serde(rename = "por_acao")]
    pub by_action: BTreeMap<String, usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClinicGroup {
    #[serde(rename = "clinica")]
    pub clinic: String,
    pub total: usize,
    #[serde(rename = "por_unidade")]
    pub by_unit: Vec<UnitGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimeSeriesPoint {
    #[serde(rename = "data")]
    pub date: NaiveDate,
    pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConsolidatedReport {
    /// First and last day covered, or `None` for an empty record set.
    #[serde(rename = "periodo")]
    pub period: Option<ReportPeriod>,
    #[serde(rename = "total_registros")]
    pub total_records: usize,
    #[serde(rename = "por_clinica")]
    pub by_clinic: Vec<ClinicGroup>,
    /// One point per day that has records, ascending.
    #[serde(rename = "serie_temporal")]
    pub time_series: Vec<TimeSeriesPoint>,
}

fn label(value: Option<&str>) -> String {
    value.unwrap_or(EMPTY_PLACEHOLDER).to_string()
}

fn daily_counts(records: &[&RecordEntity], boundary: DateBoundary) -> BTreeMap<NaiveDate, usize> {
    let mut days = BTreeMap::new();
    for record in records {
        *days.entry(boundary.local_date(record.timestamp)).or_insert(0) += 1;
    }
    days
}

impl ConsolidatedReport {
    pub fn build(records: &[&RecordEntity], boundary: DateBoundary) -> Self {
        let mut by_clinic: Vec<ClinicGroup> = Vec::new();

        for record in records {
            let clinic = label(record.clinic.as_deref());
            let unit = label(record.unit.as_deref());
            let action = label(record.action.as_deref());

            let group = match by_clinic.iter().position(|g| g.clinic == clinic) {
                Some(i) => &mut by_clinic[i],
                None => {
                    by_clinic.push(ClinicGroup {
                        clinic,
                        total: 0,
                        by_unit: Vec::new(),
                    });
                    let last = by_clinic.len() - 1;
                    &mut by_clinic[last]
                }
            };
            group.total += 1;

            let unit_group = match group.by_unit.iter().position(|u| u.unit == unit) {
                Some(i) => &mut group.by_unit[i],
                None => {
                    group.by_unit.push(UnitGroup {
                        unit,
                        total: 0,
                        by_action: BTreeMap::new(),
                    });
                    let last = group.by_unit.len() - 1;
                    &mut group.by_unit[last]
                }
            };
            unit_group.total += 1;
            *unit_group.by_action.entry(action).or_insert(0) += 1;
        }

        let days = daily_counts(records, boundary);
        let period = match (days.keys().next(), days.keys().next_back()) {
            (Some(start), Some(end)) => Some(ReportPeriod {
                start: *start,
                end: *end,
            }),
            _ => None,
        };
        let time_series = days
            .into_iter()
            .map(|(date, total)| TimeSeriesPoint { date, total })
            .collect();

        Self {
            period,
            total_records: records.len(),
            by_clinic,
            time_series,
        }
    }
}

/// Headline figures shown on the dashboard cards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Kpis {
    #[serde(rename = "total_registros")]
    pub total_records: usize,
    #[serde(rename = "clinicas_ativas")]
    pub active_clinics: usize,
    /// Records that carry an action.
    #[serde(rename = "acoes_periodo")]
    pub actions_in_period: usize,
    /// Change between the two most recent days with records, in percent.
    #[serde(rename = "variacao_percentual")]
    pub variation_percent: Option<f64>,
}

impl Kpis {
    pub fn build(records: &[&RecordEntity], boundary: DateBoundary) -> Self {
        let active_clinics = records
            .iter()
            .filter_map(|r| r.clinic.as_deref())
            .collect::<BTreeSet<_>>()
            .len();
        let actions_in_period = records.iter().filter(|r| r.action.is_some()).count();

        let days = daily_counts(records, boundary);
        let mut recent = days.values().rev();
        let variation_percent = match (recent.next(), recent.next()) {
            (Some(&last), Some(&previous)) if previous > 0 => {
                Some((last as f64 - previous as f64) / previous as f64 * 100.0)
            }
            _ => None,
        };

        Self {
            total_records: records.len(),
            active_clinics,
            actions_in_period,
            variation_percent,
        }
    }
}

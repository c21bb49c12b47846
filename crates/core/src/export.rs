//! CSV export of filtered records.

use crate::config::DateBoundary;
use crate::report::ConsolidatedReport;
use crate::record::RecordEntity;
use crate::{ContactsError, ContactsResult};
use std::io::Write;
use std::str::FromStr;

const DETAILED_HEADER: [&str; 9] = [
    "id",
    "created_at",
    "clinica",
    "unidade",
    "acao",
    "status",
    "nome_paciente",
    "telefone_paciente",
    "detalhes",
];

const CONSOLIDATED_HEADER: [&str; 4] = ["clinica", "unidade", "acao", "total"];

/// What an export contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    /// One row per record.
    Detailed,
    /// One row per clinic, unit and action with its record count.
    Consolidated,
}

impl FromStr for ExportKind {
    type Err = ContactsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "detailed" | "detalhado" => Ok(ExportKind::Detailed),
            "consolidated" | "consolidado" => Ok(ExportKind::Consolidated),
            other => Err(ContactsError::InvalidInput(format!(
                "unknown export kind: {other}"
            ))),
        }
    }
}

/// Writes `records` as CSV. Returns the number of data rows written.
pub fn export_csv<W: Write>(
    kind: ExportKind,
    records: &[&RecordEntity],
    boundary: DateBoundary,
    writer: W,
) -> ContactsResult<usize> {
    let rows = match kind {
        ExportKind::Detailed => write_detailed(records, writer)?,
        ExportKind::Consolidated => {
            write_consolidated(&ConsolidatedReport::build(records, boundary), writer)?
        }
    };
    tracing::info!("exported {} rows ({:?})", rows, kind);
    Ok(rows)
}

fn write_detailed<W: Write>(records: &[&RecordEntity], writer: W) -> ContactsResult<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(DETAILED_HEADER)?;

    for record in records {
        let id = record.id.to_string();
        let created_at = record.timestamp.to_rfc3339();
        let column = |value: &Option<String>| value.clone().unwrap_or_default();
        csv.write_record([
            id,
            created_at,
            column(&record.clinic),
            column(&record.unit),
            column(&record.action),
            column(&record.status),
            column(&record.subject_name),
            column(&record.subject_phone),
            column(&record.detail),
        ])?;
    }

    csv.flush().map_err(ContactsError::FileWrite)?;
    Ok(records.len())
}

fn write_consolidated<W: Write>(report: &ConsolidatedReport, writer: W) -> ContactsResult<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CONSOLIDATED_HEADER)?;

    let mut rows = 0;
    for clinic in &report.by_clinic {
        for unit in &clinic.by_unit {
            for (action, total) in &unit.by_action {
                let total = total.to_string();
                csv.write_record([
                    clinic.clinic.as_str(),
                    unit.unit.as_str(),
                    action.as_str(),
                    total.as_str(),
                ])?;
                rows += 1;
            }
        }
    }

    csv.flush().map_err(ContactsError::FileWrite)?;
    Ok(rows)
}

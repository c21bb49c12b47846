//! Contact records as delivered by the data source.
//!
//! Field names on the wire follow the upstream table (`clinica`, `nome_paciente`, and the
//! historical `sttus` spelling of the status column). Every descriptive column is nullable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single contact interaction logged for a patient at a clinic unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntity {
    pub id: u64,

    #[serde(rename = "created_at")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "clinica", default)]
    pub clinic: Option<String>,

    #[serde(rename = "unidade", default)]
    pub unit: Option<String>,

    #[serde(rename = "acao", default)]
    pub action: Option<String>,

    #[serde(rename = "sttus", default)]
    pub status: Option<String>,

    #[serde(rename = "nome_paciente", default)]
    pub subject_name: Option<String>,

    #[serde(rename = "telefone_paciente", default)]
    pub subject_phone: Option<String>,

    #[serde(rename = "detalhes", default)]
    pub detail: Option<String>,
}

/// Looks up a record by identifier.
pub fn find_record(records: &[RecordEntity], id: u64) -> Option<&RecordEntity> {
    records.iter().find(|r| r.id == id)
}

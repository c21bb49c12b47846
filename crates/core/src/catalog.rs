//! Reference options for the filter controls and the cascading unit resolver.

use serde::{Deserialize, Serialize};

/// A unit together with the clinic that owns it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOption {
    pub value: String,
    #[serde(rename = "clinica")]
    pub clinic: String,
}

/// Static option catalog: known clinics, units (with owning clinic) and action kinds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCatalog {
    #[serde(rename = "clinicas", default)]
    pub clinics: Vec<String>,
    #[serde(rename = "unidades", default)]
    pub units: Vec<UnitOption>,
    #[serde(rename = "acoes", default)]
    pub actions: Vec<String>,
}

impl OptionCatalog {
    /// Units owned by `clinic`, in catalog order.
    ///
    /// Returns an empty sequence when no clinic is selected or when `clinic` is not a known
    /// clinic.
    pub fn visible_units(&self, clinic: Option<&str>) -> Vec<&UnitOption> {
        match clinic {
            None => Vec::new(),
            Some(clinic) => self.units.iter().filter(|u| u.clinic == clinic).collect(),
        }
    }

    pub fn is_known_clinic(&self, clinic: &str) -> bool {
        self.clinics.iter().any(|c| c == clinic)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample_catalog() -> OptionCatalog {
        let unit = |value: &str, clinic: &str| UnitOption {
            value: value.into(),
            clinic: clinic.into(),
        };
        OptionCatalog {
            clinics: vec![
                "Clínica Saúde Plena".into(),
                "OdontoVita".into(),
                "Bem Estar Clínicas".into(),
                "Clínica Renovar".into(),
            ],
            units: vec![
                unit("Matriz - Centro", "Clínica Saúde Plena"),
                unit("Filial - Zona Sul", "Clínica Saúde Plena"),
                unit("Sede", "OdontoVita"),
                unit("Unidade Norte", "Bem Estar Clínicas"),
                unit("Centro Médico", "Clínica Renovar"),
            ],
            actions: vec![
                "Agendamento".into(),
                "Confirmação".into(),
                "Cancelamento".into(),
                "Lembrete".into(),
            ],
        }
    }
}

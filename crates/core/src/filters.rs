//! Filter selection state.
//!
//! The dashboard filters records by clinic, unit, action, a calendar-day range and one free-text
//! term. Fields are addressed through the closed [`FilterField`] set and changed with typed
//! [`FilterUpdate`] values, so there is no string-keyed field access past the parsing boundary.
//!
//! Selecting a different clinic always clears the unit selection in the same update, since a
//! unit only makes sense under its owning clinic.

use crate::{ContactsError, ContactsResult};
use chrono::NaiveDate;
use contacts_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The closed set of filterable fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterField {
    Clinic,
    Unit,
    Action,
    DateFrom,
    DateTo,
    Search,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::Clinic,
        FilterField::Unit,
        FilterField::Action,
        FilterField::DateFrom,
        FilterField::DateTo,
        FilterField::Search,
    ];

    /// Stable key used in query strings and server requests.
    pub fn query_key(&self) -> &'static str {
        match self {
            FilterField::Clinic => "clinica",
            FilterField::Unit => "unidade",
            FilterField::Action => "acao",
            FilterField::DateFrom => "data_inicio",
            FilterField::DateTo => "data_fim",
            FilterField::Search => "search",
        }
    }

    /// Looks up a field by its exact query key. Other spellings are not accepted.
    pub fn from_query_key(key: &str) -> Option<Self> {
        FilterField::ALL.into_iter().find(|f| f.query_key() == key)
    }
}

impl std::fmt::Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.query_key())
    }
}

impl FromStr for FilterField {
    type Err = ContactsError;

    /// Accepts the query key, the camelCase key of the persisted store, or the English name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "clinica" | "clinic" => Ok(FilterField::Clinic),
            "unidade" | "unit" => Ok(FilterField::Unit),
            "acao" | "action" => Ok(FilterField::Action),
            "data_inicio" | "dataInicio" | "date_from" | "from" => Ok(FilterField::DateFrom),
            "data_fim" | "dataFim" | "date_to" | "to" => Ok(FilterField::DateTo),
            "search" | "busca" | "free_text" => Ok(FilterField::Search),
            other => Err(ContactsError::UnknownFilterField(other.to_string())),
        }
    }
}

/// A single typed change to the filter selection. `None` clears the field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterUpdate {
    Clinic(Option<NonEmptyText>),
    Unit(Option<NonEmptyText>),
    Action(Option<NonEmptyText>),
    DateFrom(Option<NaiveDate>),
    DateTo(Option<NaiveDate>),
    Search(Option<NonEmptyText>),
}

impl FilterUpdate {
    /// Builds an update from untyped input such as a CLI argument or form value.
    ///
    /// Blank input clears the field. Date fields must be `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns `ContactsError::InvalidDate` for a non-blank date that does not parse.
    pub fn parse(field: FilterField, raw: &str) -> ContactsResult<Self> {
        let text = NonEmptyText::optional(raw);
        let update = match field {
            FilterField::Clinic => FilterUpdate::Clinic(text),
            FilterField::Unit => FilterUpdate::Unit(text),
            FilterField::Action => FilterUpdate::Action(text),
            FilterField::Search => FilterUpdate::Search(text),
            FilterField::DateFrom => FilterUpdate::DateFrom(parse_optional_date(text)?),
            FilterField::DateTo => FilterUpdate::DateTo(parse_optional_date(text)?),
        };
        Ok(update)
    }

    /// An update that clears `field`.
    pub fn clear(field: FilterField) -> Self {
        match field {
            FilterField::Clinic => FilterUpdate::Clinic(None),
            FilterField::Unit => FilterUpdate::Unit(None),
            FilterField::Action => FilterUpdate::Action(None),
            FilterField::DateFrom => FilterUpdate::DateFrom(None),
            FilterField::DateTo => FilterUpdate::DateTo(None),
            FilterField::Search => FilterUpdate::Search(None),
        }
    }

    pub fn field(&self) -> FilterField {
        match self {
            FilterUpdate::Clinic(_) => FilterField::Clinic,
            FilterUpdate::Unit(_) => FilterField::Unit,
            FilterUpdate::Action(_) => FilterField::Action,
            FilterUpdate::DateFrom(_) => FilterField::DateFrom,
            FilterUpdate::DateTo(_) => FilterField::DateTo,
            FilterUpdate::Search(_) => FilterField::Search,
        }
    }
}

fn parse_optional_date(text: Option<NonEmptyText>) -> ContactsResult<Option<NaiveDate>> {
    text.map(|t| {
        NaiveDate::parse_from_str(t.as_str().trim(), DATE_FORMAT)
            .map_err(|_| ContactsError::InvalidDate(t.into_inner()))
    })
    .transpose()
}

/// Current filter selection. Every field defaults to `None` (no filter applied).
///
/// The serialized form uses the keys of the persisted browser store (`clinica`, `dataInicio`,
/// ...), so previously saved selections keep loading.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(rename = "clinica", default)]
    clinic: Option<NonEmptyText>,
    #[serde(rename = "unidade", default)]
    unit: Option<NonEmptyText>,
    #[serde(rename = "acao", default)]
    action: Option<NonEmptyText>,
    #[serde(rename = "dataInicio", default)]
    date_from: Option<NaiveDate>,
    #[serde(rename = "dataFim", default)]
    date_to: Option<NaiveDate>,
    #[serde(rename = "search", default)]
    search: Option<NonEmptyText>,
}

impl FilterState {
    pub fn clinic(&self) -> Option<&str> {
        self.clinic.as_ref().map(NonEmptyText::as_str)
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_ref().map(NonEmptyText::as_str)
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_ref().map(NonEmptyText::as_str)
    }

    pub fn date_from(&self) -> Option<NaiveDate> {
        self.date_from
    }

    pub fn date_to(&self) -> Option<NaiveDate> {
        self.date_to
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_ref().map(NonEmptyText::as_str)
    }

    /// Applies one update and returns whether anything changed.
    ///
    /// Changing the clinic to a different value resets the unit in the same step.
    pub fn apply(&mut self, update: FilterUpdate) -> bool {
        let before = self.clone();
        match update {
            FilterUpdate::Clinic(value) => {
                if self.clinic != value {
                    self.clinic = value;
                    self.unit = None;
                }
            }
            FilterUpdate::Unit(value) => self.unit = value,
            FilterUpdate::Action(value) => self.action = value,
            FilterUpdate::DateFrom(value) => self.date_from = value,
            FilterUpdate::DateTo(value) => self.date_to = value,
            FilterUpdate::Search(value) => self.search = value,
        }
        *self != before
    }

    /// Resets every field to `None`.
    pub fn clear(&mut self) {
        *self = FilterState::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterState::default()
    }

    /// Number of active structured filters. The free-text term is not counted.
    pub fn active_count(&self) -> usize {
        [
            self.clinic.is_some(),
            self.unit.is_some(),
            self.action.is_some(),
            self.date_from.is_some(),
            self.date_to.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// String form of one field, as used in query parameters.
    pub fn value(&self, field: FilterField) -> Option<String> {
        match field {
            FilterField::Clinic => self.clinic().map(str::to_string),
            FilterField::Unit => self.unit().map(str::to_string),
            FilterField::Action => self.action().map(str::to_string),
            FilterField::DateFrom => self.date_from.map(|d| d.format(DATE_FORMAT).to_string()),
            FilterField::DateTo => self.date_to.map(|d| d.format(DATE_FORMAT).to_string()),
            FilterField::Search => self.search().map(str::to_string),
        }
    }

    /// Maps every set field to its query key. Unset fields are omitted entirely.
    pub fn to_query_params(&self) -> BTreeMap<&'static str, String> {
        FilterField::ALL
            .iter()
            .filter_map(|field| self.value(*field).map(|v| (field.query_key(), v)))
            .collect()
    }

    /// Rebuilds a selection from query parameters produced by [`FilterState::to_query_params`].
    ///
    /// Only the exact query keys are read, so each field has a single source whatever the
    /// iteration order of `params`. Unknown keys, blank values and malformed dates are ignored.
    /// The unit is taken as given, without the cascading reset that [`FilterState::apply`]
    /// performs.
    pub fn from_query_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut state = FilterState::default();
        for (key, value) in params {
            let Some(field) = FilterField::from_query_key(key.as_ref()) else {
                continue;
            };
            let Ok(update) = FilterUpdate::parse(field, value.as_ref()) else {
                tracing::debug!("ignoring malformed query value for {}", field);
                continue;
            };
            match update {
                FilterUpdate::Clinic(v) => state.clinic = v,
                FilterUpdate::Unit(v) => state.unit = v,
                FilterUpdate::Action(v) => state.action = v,
                FilterUpdate::DateFrom(v) => state.date_from = v,
                FilterUpdate::DateTo(v) => state.date_to = v,
                FilterUpdate::Search(v) => state.search = v,
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<NonEmptyText> {
        Some(NonEmptyText::new(s).unwrap())
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn defaults_are_all_none() {
        let state = FilterState::default();
        assert!(state.is_empty());
        assert_eq!(state.active_count(), 0);
        assert!(state.to_query_params().is_empty());
    }

    #[test]
    fn changing_clinic_resets_unit() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::Clinic(text("A")));
        state.apply(FilterUpdate::Unit(text("U")));
        assert_eq!(state.unit(), Some("U"));

        state.apply(FilterUpdate::Clinic(text("B")));
        assert_eq!(state.clinic(), Some("B"));
        assert_eq!(state.unit(), None);
    }

    #[test]
    fn reselecting_same_clinic_keeps_unit() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::Clinic(text("A")));
        state.apply(FilterUpdate::Unit(text("U")));

        let changed = state.apply(FilterUpdate::Clinic(text("A")));
        assert!(!changed);
        assert_eq!(state.unit(), Some("U"));
    }

    #[test]
    fn clearing_clinic_also_clears_unit() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::Clinic(text("A")));
        state.apply(FilterUpdate::Unit(text("U")));
        state.apply(FilterUpdate::clear(FilterField::Clinic));
        assert_eq!(state.clinic(), None);
        assert_eq!(state.unit(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::Action(text("Lembrete")));
        state.apply(FilterUpdate::DateFrom(Some(date("2026-02-01"))));

        state.clear();
        let once = state.clone();
        state.clear();
        assert_eq!(state, once);
        assert!(state.is_empty());
    }

    #[test]
    fn query_params_omit_unset_fields() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::Clinic(text("OdontoVita")));
        state.apply(FilterUpdate::DateFrom(None));
        state.apply(FilterUpdate::Search(text("maria")));

        let params = state.to_query_params();
        let expected: BTreeMap<&str, String> = [
            ("clinica", "OdontoVita".to_string()),
            ("search", "maria".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(params, expected);
    }

    #[test]
    fn query_params_use_snake_case_date_keys() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::DateFrom(Some(date("2026-02-01"))));
        state.apply(FilterUpdate::DateTo(Some(date("2026-02-13"))));

        let params = state.to_query_params();
        assert_eq!(params.get("data_inicio").map(String::as_str), Some("2026-02-01"));
        assert_eq!(params.get("data_fim").map(String::as_str), Some("2026-02-13"));
    }

    #[test]
    fn from_query_params_restores_selection() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::Clinic(text("Clínica Saúde Plena")));
        state.apply(FilterUpdate::Unit(text("Matriz - Centro")));
        state.apply(FilterUpdate::DateTo(Some(date("2026-02-12"))));

        let restored = FilterState::from_query_params(state.to_query_params());
        assert_eq!(restored, state);
    }

    #[test]
    fn from_query_params_ignores_unknown_and_malformed() {
        let params = [
            ("page", "2"),
            ("data_inicio", "13/02/2026"),
            ("acao", "  "),
            ("search", "maria"),
        ];
        let state = FilterState::from_query_params(params);
        assert_eq!(state.date_from(), None);
        assert_eq!(state.action(), None);
        assert_eq!(state.search(), Some("maria"));
    }

    #[test]
    fn from_query_params_reads_only_exact_keys() {
        let forward = FilterState::from_query_params([("search", "maria"), ("busca", "santos")]);
        let reversed = FilterState::from_query_params([("busca", "santos"), ("search", "maria")]);
        assert_eq!(forward.search(), Some("maria"));
        assert_eq!(forward, reversed);

        let aliases = FilterState::from_query_params([("dataInicio", "2026-02-01"), ("clinic", "A")]);
        assert!(aliases.is_empty());
    }

    #[test]
    fn text_values_are_kept_verbatim() {
        let update = FilterUpdate::parse(FilterField::Clinic, " OdontoVita").unwrap();
        assert_eq!(update, FilterUpdate::Clinic(text(" OdontoVita")));

        let from = FilterUpdate::parse(FilterField::DateFrom, " 2026-02-11 ").unwrap();
        assert_eq!(from, FilterUpdate::DateFrom(Some(date("2026-02-11"))));
    }

    #[test]
    fn parse_update_validates_dates() {
        let update = FilterUpdate::parse(FilterField::DateFrom, "2026-02-11").unwrap();
        assert_eq!(update, FilterUpdate::DateFrom(Some(date("2026-02-11"))));

        let err = FilterUpdate::parse(FilterField::DateTo, "2026-13-01").unwrap_err();
        assert!(matches!(err, ContactsError::InvalidDate(_)));

        assert_eq!(
            FilterUpdate::parse(FilterField::DateTo, "").unwrap(),
            FilterUpdate::DateTo(None)
        );
    }

    #[test]
    fn field_names_parse_from_all_spellings() {
        assert_eq!("dataInicio".parse::<FilterField>().unwrap(), FilterField::DateFrom);
        assert_eq!("data_fim".parse::<FilterField>().unwrap(), FilterField::DateTo);
        assert_eq!("unit".parse::<FilterField>().unwrap(), FilterField::Unit);
        assert!(matches!(
            "periodo".parse::<FilterField>(),
            Err(ContactsError::UnknownFilterField(_))
        ));
    }

    #[test]
    fn active_count_ignores_free_text() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::Search(text("maria")));
        assert_eq!(state.active_count(), 0);
        state.apply(FilterUpdate::Clinic(text("OdontoVita")));
        state.apply(FilterUpdate::DateTo(Some(date("2026-02-12"))));
        assert_eq!(state.active_count(), 2);
    }

    #[test]
    fn serialized_form_uses_store_keys() {
        let mut state = FilterState::default();
        state.apply(FilterUpdate::DateFrom(Some(date("2026-02-01"))));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["dataInicio"], "2026-02-01");
        assert!(json["clinica"].is_null());
    }
}

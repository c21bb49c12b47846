//! # API REST
//!
//! REST API for the clinic contact dashboard.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (query parsing, JSON shapes, CORS)
//!
//! Filtering, pagination and reporting all come from `contacts-core`; handlers only translate
//! query strings into a [`FilterState`] and a [`PaginationCursor`].

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use contacts_core::{
    derive_view, export_csv, filter_records, find_record, ConsolidatedReport, ContactsResult,
    CoreConfig, DataSource, DateBoundary, ExportKind, FilterState, Kpis, OptionCatalog,
    PaginationCursor, RecordEntity, DEFAULT_PAGE, MAX_PER_PAGE,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Shared state for the REST handlers.
///
/// Records and options are loaded once at startup and shared read-only between requests.
#[derive(Clone)]
pub struct AppState {
    records: Arc<Vec<RecordEntity>>,
    catalog: Arc<OptionCatalog>,
    boundary: DateBoundary,
    default_per_page: usize,
}

impl AppState {
    pub fn new(records: Vec<RecordEntity>, catalog: OptionCatalog, cfg: &CoreConfig) -> Self {
        Self {
            records: Arc::new(records),
            catalog: Arc::new(catalog),
            boundary: cfg.date_boundary(),
            default_per_page: cfg.default_per_page(),
        }
    }

    /// Reads records and filter options from `source`.
    pub fn load(source: &impl DataSource, cfg: &CoreConfig) -> ContactsResult<Self> {
        let records = source.list_records()?;
        let catalog = source.list_option_catalog()?;
        tracing::info!(
            "loaded {} records and {} clinics",
            records.len(),
            catalog.clinics.len()
        );
        Ok(Self::new(records, catalog, cfg))
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// A contact record in its wire shape.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct RecordRes {
    pub id: u64,
    /// RFC 3339 timestamp.
    pub created_at: String,
    pub clinica: Option<String>,
    pub unidade: Option<String>,
    pub acao: Option<String>,
    pub sttus: Option<String>,
    pub nome_paciente: Option<String>,
    pub telefone_paciente: Option<String>,
    pub detalhes: Option<String>,
}

impl From<&RecordEntity> for RecordRes {
    fn from(record: &RecordEntity) -> Self {
        Self {
            id: record.id,
            created_at: record.timestamp.to_rfc3339(),
            clinica: record.clinic.clone(),
            unidade: record.unit.clone(),
            acao: record.action.clone(),
            sttus: record.status.clone(),
            nome_paciente: record.subject_name.clone(),
            telefone_paciente: record.subject_phone.clone(),
            detalhes: record.detail.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PaginatedRecordsRes {
    pub data: Vec<RecordRes>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UnitOptionRes {
    pub value: String,
    pub clinica: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct FilterOptionsRes {
    pub clinicas: Vec<String>,
    pub unidades: Vec<UnitOptionRes>,
    pub acoes: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UnitsRes {
    pub unidades: Vec<UnitOptionRes>,
}

#[derive(Deserialize, IntoParams)]
pub struct UnitsQuery {
    /// Clinic whose units are listed
    pub clinica: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PeriodRes {
    pub inicio: String,
    pub fim: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UnitGroupRes {
    pub unidade: String,
    pub total: usize,
    pub por_acao: BTreeMap<String, usize>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ClinicGroupRes {
    pub clinica: String,
    pub total: usize,
    pub por_unidade: Vec<UnitGroupRes>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TimeSeriesPointRes {
    /// Calendar day, YYYY-MM-DD.
    pub data: String,
    pub total: usize,
}

/// Consolidated report in its wire shape. `periodo` is null when nothing matched.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ConsolidatedRes {
    pub periodo: Option<PeriodRes>,
    pub total_registros: usize,
    pub por_clinica: Vec<ClinicGroupRes>,
    pub serie_temporal: Vec<TimeSeriesPointRes>,
}

impl From<ConsolidatedReport> for ConsolidatedRes {
    fn from(report: ConsolidatedReport) -> Self {
        Self {
            periodo: report.period.map(|p| PeriodRes {
                inicio: p.start.to_string(),
                fim: p.end.to_string(),
            }),
            total_registros: report.total_records,
            por_clinica: report
                .by_clinic
                .into_iter()
                .map(|c| ClinicGroupRes {
                    clinica: c.clinic,
                    total: c.total,
                    por_unidade: c
                        .by_unit
                        .into_iter()
                        .map(|u| UnitGroupRes {
                            unidade: u.unit,
                            total: u.total,
                            por_acao: u.by_action,
                        })
                        .collect(),
                })
                .collect(),
            serie_temporal: report
                .time_series
                .into_iter()
                .map(|p| TimeSeriesPointRes {
                    data: p.date.to_string(),
                    total: p.total,
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct KpisRes {
    pub total_registros: usize,
    pub clinicas_ativas: usize,
    pub acoes_periodo: usize,
    /// Change between the two most recent days with records; null with fewer than two days.
    pub variacao_percentual: Option<f64>,
}

impl From<Kpis> for KpisRes {
    fn from(kpis: Kpis) -> Self {
        Self {
            total_registros: kpis.total_records,
            clinicas_ativas: kpis.active_clinics,
            acoes_periodo: kpis.actions_in_period,
            variacao_percentual: kpis.variation_percent,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_records,
        filter_options,
        filter_option_units,
        get_record,
        consolidated_report,
        kpis,
        export_report,
    ),
    components(schemas(
        HealthRes,
        RecordRes,
        PaginatedRecordsRes,
        UnitOptionRes,
        FilterOptionsRes,
        UnitsRes,
        PeriodRes,
        UnitGroupRes,
        ClinicGroupRes,
        TimeSeriesPointRes,
        ConsolidatedRes,
        KpisRes,
    ))
)]
struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/records", get(list_records))
        .route("/records/filter-options", get(filter_options))
        .route("/records/filter-options/units", get(filter_option_units))
        .route("/records/:id", get(get_record))
        .route("/reports/consolidated", get(consolidated_report))
        .route("/reports/kpis", get(kpis))
        .route("/reports/export", get(export_report))
        .merge(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn number_param(params: &HashMap<String, String>, key: &str) -> Option<usize> {
    params.get(key).and_then(|v| v.trim().parse().ok())
}

fn unit_options(units: Vec<&contacts_core::UnitOption>) -> Vec<UnitOptionRes> {
    units
        .into_iter()
        .map(|u| UnitOptionRes {
            value: u.value.clone(),
            clinica: u.clinic.clone(),
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Contacts REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/records",
    params(
        ("clinica" = Option<String>, Query, description = "Clinic (exact match)"),
        ("unidade" = Option<String>, Query, description = "Unit (exact match)"),
        ("acao" = Option<String>, Query, description = "Action kind (exact match)"),
        ("data_inicio" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("data_fim" = Option<String>, Query, description = "Last day, YYYY-MM-DD, inclusive"),
        ("search" = Option<String>, Query, description = "Search patient name and details"),
        ("page" = Option<usize>, Query, description = "Page number, from 1"),
        ("per_page" = Option<usize>, Query, description = "Page size, 1 to 100"),
    ),
    responses(
        (status = 200, description = "One page of filtered records", body = PaginatedRecordsRes)
    )
)]
/// List records matching the filter keys, one page at a time
///
/// Unknown keys and malformed values are ignored; `page` and `per_page` are clamped into range.
#[axum::debug_handler]
async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<PaginatedRecordsRes> {
    let filters = FilterState::from_query_params(params.iter());
    let page = number_param(&params, "page").unwrap_or(DEFAULT_PAGE);
    let per_page = number_param(&params, "per_page")
        .unwrap_or(state.default_per_page)
        .clamp(1, MAX_PER_PAGE);

    let cursor = PaginationCursor::new(page, per_page);
    let slice = derive_view(&filters, &state.records, &cursor, state.boundary);
    tracing::debug!(
        "records page {} of {} ({} matches)",
        slice.page,
        slice.total_pages,
        slice.total
    );

    Json(PaginatedRecordsRes {
        data: slice.items.iter().map(|r| RecordRes::from(*r)).collect(),
        total: slice.total,
        page: slice.page,
        per_page: slice.per_page,
    })
}

#[utoipa::path(
    get,
    path = "/records/filter-options",
    responses(
        (status = 200, description = "Options for the filter controls", body = FilterOptionsRes)
    )
)]
/// Options for the clinic, unit and action filter controls
#[axum::debug_handler]
async fn filter_options(State(state): State<AppState>) -> Json<FilterOptionsRes> {
    let catalog = &state.catalog;
    Json(FilterOptionsRes {
        clinicas: catalog.clinics.clone(),
        unidades: unit_options(catalog.units.iter().collect()),
        acoes: catalog.actions.clone(),
    })
}

#[utoipa::path(
    get,
    path = "/records/filter-options/units",
    params(UnitsQuery),
    responses(
        (status = 200, description = "Units owned by the clinic", body = UnitsRes)
    )
)]
/// Units selectable under a clinic
///
/// Empty when no clinic is given or the clinic is unknown.
#[axum::debug_handler]
async fn filter_option_units(
    State(state): State<AppState>,
    Query(query): Query<UnitsQuery>,
) -> Json<UnitsRes> {
    let clinic = query.clinica.as_deref().filter(|c| !c.trim().is_empty());
    Json(UnitsRes {
        unidades: unit_options(state.catalog.visible_units(clinic)),
    })
}

#[utoipa::path(
    get,
    path = "/records/{id}",
    params(
        ("id" = u64, Path, description = "Record identifier")
    ),
    responses(
        (status = 200, description = "The record", body = RecordRes),
        (status = 404, description = "Record not found")
    )
)]
/// Fetch one record by identifier
#[axum::debug_handler]
async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<RecordRes>, (StatusCode, &'static str)> {
    match find_record(&state.records, id) {
        Some(record) => Ok(Json(RecordRes::from(record))),
        None => Err((StatusCode::NOT_FOUND, "Record not found")),
    }
}

#[utoipa::path(
    get,
    path = "/reports/consolidated",
    params(
        ("clinica" = Option<String>, Query, description = "Clinic (exact match)"),
        ("unidade" = Option<String>, Query, description = "Unit (exact match)"),
        ("acao" = Option<String>, Query, description = "Action kind (exact match)"),
        ("data_inicio" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("data_fim" = Option<String>, Query, description = "Last day, YYYY-MM-DD, inclusive"),
        ("search" = Option<String>, Query, description = "Search patient name and details"),
    ),
    responses(
        (status = 200, description = "Consolidated report", body = ConsolidatedRes)
    )
)]
/// Consolidated report over the filtered records
#[axum::debug_handler]
async fn consolidated_report(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<ConsolidatedRes> {
    let filters = FilterState::from_query_params(params.iter());
    let filtered = filter_records(&filters, &state.records, state.boundary);
    Json(ConsolidatedReport::build(&filtered, state.boundary).into())
}

#[utoipa::path(
    get,
    path = "/reports/kpis",
    params(
        ("clinica" = Option<String>, Query, description = "Clinic (exact match)"),
        ("unidade" = Option<String>, Query, description = "Unit (exact match)"),
        ("acao" = Option<String>, Query, description = "Action kind (exact match)"),
        ("data_inicio" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("data_fim" = Option<String>, Query, description = "Last day, YYYY-MM-DD, inclusive"),
        ("search" = Option<String>, Query, description = "Search patient name and details"),
    ),
    responses(
        (status = 200, description = "Headline figures", body = KpisRes)
    )
)]
/// Headline figures for the dashboard cards
#[axum::debug_handler]
async fn kpis(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<KpisRes> {
    let filters = FilterState::from_query_params(params.iter());
    let filtered = filter_records(&filters, &state.records, state.boundary);
    Json(Kpis::build(&filtered, state.boundary).into())
}

#[utoipa::path(
    get,
    path = "/reports/export",
    params(
        ("tipo" = Option<String>, Query, description = "detalhado (default) or consolidado"),
        ("formato" = Option<String>, Query, description = "Only csv is supported"),
        ("clinica" = Option<String>, Query, description = "Clinic (exact match)"),
        ("unidade" = Option<String>, Query, description = "Unit (exact match)"),
        ("acao" = Option<String>, Query, description = "Action kind (exact match)"),
        ("data_inicio" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("data_fim" = Option<String>, Query, description = "Last day, YYYY-MM-DD, inclusive"),
        ("search" = Option<String>, Query, description = "Search patient name and details"),
    ),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv"),
        (status = 400, description = "Unknown export kind or format"),
        (status = 500, description = "Internal server error")
    )
)]
/// Export the filtered records as CSV
///
/// # Errors
/// Returns `400 Bad Request` if `tipo` is not a known export kind or `formato` is not `csv`.
#[axum::debug_handler]
async fn export_report(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, (StatusCode, &'static str)> {
    if params.get("formato").is_some_and(|f| f.as_str() != "csv") {
        return Err((StatusCode::BAD_REQUEST, "Only csv export is supported"));
    }
    let kind = match params.get("tipo") {
        None => ExportKind::Detailed,
        Some(tipo) => tipo
            .parse::<ExportKind>()
            .map_err(|_| (StatusCode::BAD_REQUEST, "tipo must be detalhado or consolidado"))?,
    };

    let filters = FilterState::from_query_params(params.iter());
    let filtered = filter_records(&filters, &state.records, state.boundary);

    let mut body = Vec::new();
    if let Err(e) = export_csv(kind, &filtered, state.boundary, &mut body) {
        tracing::error!("CSV export error: {:?}", e);
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"relatorio.csv\""),
        ],
        body,
    ))
}

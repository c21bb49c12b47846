use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use contacts_api_rest::{router, AppState};
use contacts_core::{CoreConfig, DateBoundary, OptionCatalog, RecordEntity, UnitOption};
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::PathBuf;
use tower::ServiceExt;

fn record(id: u64, created_at: &str, clinic: &str, unit: &str, action: &str, name: &str) -> RecordEntity {
    RecordEntity {
        id,
        timestamp: created_at.parse().unwrap(),
        clinic: Some(clinic.into()),
        unit: Some(unit.into()),
        action: Some(action.into()),
        status: Some("Concluído".into()),
        subject_name: Some(name.into()),
        subject_phone: Some("11999001122".into()),
        detail: None,
    }
}

fn app(per_page: usize) -> Router {
    let records = vec![
        record(1, "2026-02-13T09:15:00Z", "Clínica Saúde Plena", "Matriz - Centro", "Agendamento", "Maria Oliveira"),
        record(2, "2026-02-13T08:45:00Z", "Clínica Saúde Plena", "Filial - Zona Sul", "Confirmação", "José Santos"),
        record(3, "2026-02-12T16:30:00Z", "OdontoVita", "Sede", "Cancelamento", "Ana Paula Reis"),
        record(4, "2026-02-12T14:00:00Z", "Clínica Saúde Plena", "Matriz - Centro", "Agendamento", "Roberto Costa"),
        record(5, "2026-02-10T15:30:00Z", "Bem Estar Clínicas", "Unidade Norte", "Agendamento", "André Martins"),
    ];
    let catalog = OptionCatalog {
        clinics: vec![
            "Clínica Saúde Plena".into(),
            "OdontoVita".into(),
            "Bem Estar Clínicas".into(),
        ],
        units: vec![
            UnitOption { value: "Matriz - Centro".into(), clinic: "Clínica Saúde Plena".into() },
            UnitOption { value: "Filial - Zona Sul".into(), clinic: "Clínica Saúde Plena".into() },
            UnitOption { value: "Sede".into(), clinic: "OdontoVita".into() },
            UnitOption { value: "Unidade Norte".into(), clinic: "Bem Estar Clínicas".into() },
        ],
        actions: vec!["Agendamento".into(), "Confirmação".into(), "Cancelamento".into()],
    };
    let cfg = CoreConfig::new(PathBuf::from("unused"), DateBoundary::Utc, per_page).unwrap();
    router(AppState::new(records, catalog, &cfg))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn ids(body: &Value) -> Vec<u64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = get(app(20), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn lists_first_page_with_default_size() {
    let (status, body) = get(app(2), "/records").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 2);
    assert_eq!(ids(&body), vec![1, 2]);
}

#[tokio::test]
async fn filters_by_clinic_and_date_range() {
    let uri = "/records?clinica=Cl%C3%ADnica%20Sa%C3%BAde%20Plena&data_inicio=2026-02-12&data_fim=2026-02-12";
    let (_, body) = get(app(20), uri).await;
    assert_eq!(body["total"], 1);
    assert_eq!(ids(&body), vec![4]);
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let (_, body) = get(app(20), "/records?search=MARIA").await;
    assert_eq!(ids(&body), vec![1]);
}

#[tokio::test]
async fn page_past_the_end_is_empty() {
    let (_, body) = get(app(2), "/records?page=10").await;
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 10);
    assert!(ids(&body).is_empty());
}

#[tokio::test]
async fn per_page_is_clamped() {
    let (_, body) = get(app(20), "/records?per_page=1000").await;
    assert_eq!(body["per_page"], 100);

    let (_, body) = get(app(20), "/records?per_page=0&page=0").await;
    assert_eq!(body["per_page"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(ids(&body), vec![1]);
}

#[tokio::test]
async fn malformed_filter_values_are_ignored() {
    let (status, body) = get(app(20), "/records?data_inicio=13/02/2026&unknown=x").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
}

#[tokio::test]
async fn filter_options_use_wire_names() {
    let (_, body) = get(app(20), "/records/filter-options").await;
    assert_eq!(body["clinicas"].as_array().unwrap().len(), 3);
    assert_eq!(body["unidades"][2]["value"], "Sede");
    assert_eq!(body["unidades"][2]["clinica"], "OdontoVita");
    assert_eq!(body["acoes"][0], "Agendamento");
}

#[tokio::test]
async fn units_follow_selected_clinic() {
    let (_, body) = get(app(20), "/records/filter-options/units?clinica=OdontoVita").await;
    let units = body["unidades"].as_array().unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0]["value"], "Sede");

    let (_, body) = get(app(20), "/records/filter-options/units").await;
    assert!(body["unidades"].as_array().unwrap().is_empty());

    let (_, body) = get(app(20), "/records/filter-options/units?clinica=Desconhecida").await;
    assert!(body["unidades"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn fetches_one_record() {
    let (status, body) = get(app(20), "/records/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nome_paciente"], "Ana Paula Reis");
    assert_eq!(body["sttus"], "Concluído");
    assert_eq!(body["created_at"], "2026-02-12T16:30:00+00:00");
}

#[tokio::test]
async fn unknown_record_is_not_found() {
    let (status, _) = get(app(20), "/records/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn consolidated_report_respects_filters() {
    let (status, body) = get(app(20), "/reports/consolidated?acao=Agendamento").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_registros"], 3);
    assert_eq!(body["periodo"]["inicio"], "2026-02-10");
    assert_eq!(body["periodo"]["fim"], "2026-02-13");
    assert_eq!(body["por_clinica"][0]["clinica"], "Clínica Saúde Plena");
    assert_eq!(body["por_clinica"][0]["por_unidade"][0]["por_acao"]["Agendamento"], 2);
    assert_eq!(body["serie_temporal"][0]["data"], "2026-02-10");
}

#[tokio::test]
async fn empty_report_has_null_period() {
    let (_, body) = get(app(20), "/reports/consolidated?clinica=Desconhecida").await;
    assert_eq!(body["total_registros"], 0);
    assert!(body["periodo"].is_null());
}

#[tokio::test]
async fn kpis_respect_filters() {
    let (status, body) = get(app(20), "/reports/kpis?acao=Agendamento").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_registros"], 3);
    assert_eq!(body["clinicas_ativas"], 2);
    assert_eq!(body["acoes_periodo"], 3);
    // One record on the 12th, one on the 13th.
    assert_eq!(body["variacao_percentual"], 0.0);
}

async fn get_text(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn detailed_export_is_csv() {
    let (status, content_type, csv) =
        get_text(app(20), "/reports/export?tipo=detalhado&formato=csv&clinica=OdontoVita").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/csv"));

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("id,created_at,clinica"));
    assert!(lines[1].starts_with("3,"));
}

#[tokio::test]
async fn consolidated_export_counts_actions() {
    let (status, _, csv) = get_text(app(20), "/reports/export?tipo=consolidado").await;
    assert_eq!(status, StatusCode::OK);
    assert!(csv.starts_with("clinica,unidade,acao,total"));
    assert!(csv.contains("Clínica Saúde Plena,Matriz - Centro,Agendamento,2"));
}

#[tokio::test]
async fn export_rejects_unknown_kind_and_format() {
    let (status, _, _) = get_text(app(20), "/reports/export?tipo=resumo").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = get_text(app(20), "/reports/export?tipo=detalhado&formato=pdf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_search_key_filters_text() {
    for uri in [
        "/records?search=maria&busca=santos",
        "/records?busca=santos&search=maria",
    ] {
        let (_, body) = get(app(20), uri).await;
        assert_eq!(ids(&body), vec![1]);
    }
}

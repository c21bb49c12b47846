use anyhow::Context;
use contacts_api_rest::{router, AppState};
use contacts_core::{
    config::{date_boundary_from_env_value, per_page_from_env_value},
    constants::DEFAULT_DATA_DIR,
    CoreConfig, JsonDirDataSource,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the contacts dashboard server
///
/// Loads records and filter options from the data directory and serves the REST API.
///
/// # Environment Variables
/// - `CONTACTS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CONTACTS_DATA_DIR`: Directory holding `records.json` and `filter_options.json`
///   (default: "data")
/// - `CONTACTS_DATE_BOUNDARY`: Zone for calendar-day boundaries: `utc`, `local` or `+HH:MM`
/// - `CONTACTS_PER_PAGE`: Default page size (default: 20)
///
/// # Errors
/// Returns an error if:
/// - the configuration is invalid,
/// - the data directory cannot be read, or
/// - the server address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("contacts_run=info".parse()?)
                .add_directive("contacts_api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("CONTACTS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let data_dir = std::env::var("CONTACTS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
    if !data_dir.exists() {
        anyhow::bail!("Data directory does not exist: {}", data_dir.display());
    }

    let date_boundary =
        date_boundary_from_env_value(std::env::var("CONTACTS_DATE_BOUNDARY").ok())?;
    let per_page = per_page_from_env_value(std::env::var("CONTACTS_PER_PAGE").ok())?;
    let cfg = CoreConfig::new(data_dir, date_boundary, per_page)?;

    let source = JsonDirDataSource::from_config(&cfg);
    let state = AppState::load(&source, &cfg)
        .with_context(|| format!("failed to load data from {}", cfg.data_dir().display()))?;

    tracing::info!("++ Starting contacts REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

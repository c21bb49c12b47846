use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use contacts_core::{
    config::{date_boundary_from_env_value, per_page_from_env_value},
    constants::{DEFAULT_DATA_DIR, DEFAULT_STATE_DIR},
    derive_view, export_csv, filter_records,
    formatting::{format_date, format_date_time, format_percentage, format_phone, or_placeholder, truncate},
    ConsolidatedReport, CoreConfig, DataSource, DateBoundary, ExportKind, FileStore, FilterField,
    FilterState, FilterStore, FilterUpdate, JsonDirDataSource, Kpis, PaginationCursor,
    RecordEntity, MAX_PER_PAGE,
};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "contacts")]
#[command(about = "Clinic contact records CLI")]
struct Cli {
    /// Directory containing records.json and filter_options.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Directory where the saved filter selection is kept
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,
    /// Zone for calendar-day boundaries: utc, local or +HH:MM
    #[arg(long, global = true)]
    date_boundary: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Clinic (exact match)
    #[arg(long)]
    clinic: Option<String>,
    /// Unit (exact match)
    #[arg(long)]
    unit: Option<String>,
    /// Action kind (exact match)
    #[arg(long)]
    action: Option<String>,
    /// First day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,
    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
    /// Free-text search over patient name and details
    #[arg(long)]
    search: Option<String>,
    /// Ignore the saved filter selection
    #[arg(long)]
    no_saved: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List records matching the filters, one page at a time
    Records {
        #[command(flatten)]
        filters: FilterArgs,
        /// Page to show
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Records per page
        #[arg(long)]
        per_page: Option<usize>,
    },
    /// Show one record
    Show {
        /// Record id
        id: u64,
    },
    /// List the units selectable for a clinic
    Units {
        /// Clinic (defaults to the saved clinic)
        #[arg(long)]
        clinic: Option<String>,
    },
    /// Inspect or change the saved filter selection
    Filters {
        #[command(subcommand)]
        command: FilterCommands,
    },
    /// Consolidated report over the filtered records
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        /// Also print headline figures
        #[arg(long)]
        kpis: bool,
    },
    /// Export the filtered records as CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = KindArg::Detailed)]
        kind: KindArg,
        /// Output file (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum FilterCommands {
    /// Print the saved selection
    Show,
    /// Set one filter; an empty value clears it
    Set {
        /// clinica, unidade, acao, data_inicio, data_fim or search
        key: String,
        #[arg(default_value = "")]
        value: String,
    },
    /// Clear every filter
    Clear,
    /// Print the selection as query parameters
    Params,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Detailed,
    Consolidated,
}

impl From<KindArg> for ExportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Detailed => ExportKind::Detailed,
            KindArg::Consolidated => ExportKind::Consolidated,
        }
    }
}

impl FilterArgs {
    /// Saved selection (unless `--no-saved`) with the command-line overrides applied on top.
    ///
    /// Overrides are not written back to the saved selection.
    fn resolve(&self, saved: &FilterState) -> anyhow::Result<FilterState> {
        let mut state = if self.no_saved {
            FilterState::default()
        } else {
            saved.clone()
        };

        let overrides = [
            (FilterField::Clinic, &self.clinic),
            (FilterField::Unit, &self.unit),
            (FilterField::Action, &self.action),
            (FilterField::DateFrom, &self.from),
            (FilterField::DateTo, &self.to),
            (FilterField::Search, &self.search),
        ];
        for (field, value) in overrides {
            if let Some(raw) = value {
                state.apply(FilterUpdate::parse(field, raw)?);
            }
        }
        Ok(state)
    }
}

struct App {
    cfg: CoreConfig,
    source: JsonDirDataSource,
    filters: FilterStore<FileStore>,
}

impl App {
    fn boundary(&self) -> DateBoundary {
        self.cfg.date_boundary()
    }

    fn load_records(&self) -> anyhow::Result<Vec<RecordEntity>> {
        self.source.list_records().with_context(|| {
            format!("failed to load records from {}", self.source.dir().display())
        })
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("contacts_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .or_else(|| std::env::var("CONTACTS_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let state_dir = cli
        .state_dir
        .or_else(|| std::env::var("CONTACTS_STATE_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));
    let date_boundary = date_boundary_from_env_value(
        cli.date_boundary
            .or_else(|| std::env::var("CONTACTS_DATE_BOUNDARY").ok()),
    )?;
    let per_page = per_page_from_env_value(std::env::var("CONTACTS_PER_PAGE").ok())?;

    let cfg = CoreConfig::new(data_dir, date_boundary, per_page)?;
    let mut ctx = App {
        source: JsonDirDataSource::from_config(&cfg),
        filters: FilterStore::load(FileStore::new(state_dir)),
        cfg,
    };

    match cli.command {
        Some(Commands::Records {
            filters,
            page,
            per_page,
        }) => list_records(&ctx, &filters, page, per_page)?,
        Some(Commands::Show { id }) => show_record(&ctx, id)?,
        Some(Commands::Units { clinic }) => list_units(&ctx, clinic)?,
        Some(Commands::Filters { command }) => manage_filters(&mut ctx, command)?,
        Some(Commands::Report { filters, kpis }) => print_report(&ctx, &filters, kpis)?,
        Some(Commands::Export {
            filters,
            kind,
            output,
        }) => export(&ctx, &filters, kind.into(), output)?,
        None => {
            println!("Use 'contacts --help' for commands");
        }
    }

    Ok(())
}

fn list_records(
    ctx: &App,
    args: &FilterArgs,
    page: usize,
    per_page: Option<usize>,
) -> anyhow::Result<()> {
    let state = args.resolve(ctx.filters.state())?;
    let records = ctx.load_records()?;
    let per_page = per_page
        .unwrap_or(ctx.cfg.default_per_page())
        .min(MAX_PER_PAGE);
    let cursor = PaginationCursor::new(page, per_page);
    let slice = derive_view(&state, &records, &cursor, ctx.boundary());

    if slice.total == 0 {
        println!("No records found.");
        return Ok(());
    }

    for record in &slice.items {
        println!(
            "#{:<5} {}  {:<22} {:<16} {:<22} {:<13} {:<11} {}",
            record.id,
            format_date_time(Some(record.timestamp), ctx.boundary()),
            or_placeholder(record.subject_name.as_deref()),
            format_phone(record.subject_phone.as_deref()),
            or_placeholder(record.clinic.as_deref()),
            or_placeholder(record.action.as_deref()),
            or_placeholder(record.status.as_deref()),
            truncate(or_placeholder(record.detail.as_deref()), 40),
        );
    }

    match (slice.first_index(), slice.last_index()) {
        (Some(first), Some(last)) => println!(
            "Showing {}-{} of {} records (page {} of {})",
            first, last, slice.total, slice.page, slice.total_pages
        ),
        _ => println!(
            "Page {} is past the last page ({} records, {} pages)",
            slice.page, slice.total, slice.total_pages
        ),
    }
    Ok(())
}

fn show_record(ctx: &App, id: u64) -> anyhow::Result<()> {
    let records = ctx.load_records()?;
    let Some(record) = contacts_core::find_record(&records, id) else {
        anyhow::bail!("record {} not found", id);
    };

    println!("ID:       {}", record.id);
    println!(
        "Date:     {}",
        format_date_time(Some(record.timestamp), ctx.boundary())
    );
    println!("Patient:  {}", or_placeholder(record.subject_name.as_deref()));
    println!("Phone:    {}", format_phone(record.subject_phone.as_deref()));
    println!("Clinic:   {}", or_placeholder(record.clinic.as_deref()));
    println!("Unit:     {}", or_placeholder(record.unit.as_deref()));
    println!("Action:   {}", or_placeholder(record.action.as_deref()));
    println!("Status:   {}", or_placeholder(record.status.as_deref()));
    println!("Details:  {}", or_placeholder(record.detail.as_deref()));
    Ok(())
}

fn list_units(ctx: &App, clinic: Option<String>) -> anyhow::Result<()> {
    let catalog = ctx.source.list_option_catalog()?;
    let clinic = clinic.or_else(|| ctx.filters.state().clinic().map(str::to_string));

    let Some(clinic) = clinic else {
        println!("Select a clinic first (--clinic or 'contacts filters set clinica ...').");
        return Ok(());
    };

    if !catalog.is_known_clinic(&clinic) {
        println!("Unknown clinic: {}", clinic);
        return Ok(());
    }

    let units = catalog.visible_units(Some(&clinic));
    if units.is_empty() {
        println!("No units found for {}.", clinic);
    }
    for unit in units {
        println!("{}", unit.value);
    }
    Ok(())
}

fn manage_filters(ctx: &mut App, command: FilterCommands) -> anyhow::Result<()> {
    match command {
        FilterCommands::Show => {
            let state = ctx.filters.state();
            for field in FilterField::ALL {
                let value = state.value(field);
                println!("{:<12} {}", field.query_key(), or_placeholder(value.as_deref()));
            }
            println!("{} active filter(s)", state.active_count());
        }
        FilterCommands::Set { key, value } => {
            let field: FilterField = key.parse()?;
            let update = FilterUpdate::parse(field, &value)?;
            if ctx.filters.set_filter(update) {
                println!("Updated {}.", field);
            } else {
                println!("{} unchanged.", field);
            }
        }
        FilterCommands::Clear => {
            ctx.filters.clear_filters();
            println!("Filters cleared.");
        }
        FilterCommands::Params => {
            for (key, value) in ctx.filters.to_query_params() {
                println!("{}={}", key, value);
            }
        }
    }
    Ok(())
}

fn print_report(ctx: &App, args: &FilterArgs, with_kpis: bool) -> anyhow::Result<()> {
    let state = args.resolve(ctx.filters.state())?;
    let records = ctx.load_records()?;
    let filtered = filter_records(&state, &records, ctx.boundary());
    let report = ConsolidatedReport::build(&filtered, ctx.boundary());

    match &report.period {
        Some(period) => println!(
            "Period: {} to {} ({} records)",
            format_date(Some(period.start)),
            format_date(Some(period.end)),
            report.total_records
        ),
        None => println!("No records in range."),
    }

    for clinic in &report.by_clinic {
        println!("{} ({})", clinic.clinic, clinic.total);
        for unit in &clinic.by_unit {
            println!("  {} ({})", unit.unit, unit.total);
            for (action, total) in &unit.by_action {
                println!("    {:<14} {}", action, total);
            }
        }
    }

    if !report.time_series.is_empty() {
        println!("Per day:");
        for point in &report.time_series {
            println!("  {}  {}", format_date(Some(point.date)), point.total);
        }
    }

    if with_kpis {
        let kpis = Kpis::build(&filtered, ctx.boundary());
        println!("Total records:   {}", kpis.total_records);
        println!("Active clinics:  {}", kpis.active_clinics);
        println!("Actions:         {}", kpis.actions_in_period);
        println!(
            "Variation:       {}",
            kpis.variation_percent
                .map(format_percentage)
                .unwrap_or_else(|| or_placeholder(None).to_string())
        );
    }
    Ok(())
}

fn export(
    ctx: &App,
    args: &FilterArgs,
    kind: ExportKind,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let state = args.resolve(ctx.filters.state())?;
    let records = ctx.load_records()?;
    let filtered = filter_records(&state, &records, ctx.boundary());

    let rows = match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let rows = export_csv(kind, &filtered, ctx.boundary(), file)?;
            eprintln!("Wrote {} rows to {}", rows, path.display());
            rows
        }
        None => export_csv(kind, &filtered, ctx.boundary(), io::stdout().lock())?,
    };
    tracing::debug!("export finished with {} rows", rows);
    Ok(())
}

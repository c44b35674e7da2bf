use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use product_search_core::{CaseMode, EditContext, EditTarget, EntryForm, MatchOptions, RowPosition};
use product_search_sqlite::{Migration, SqliteRecordStore};
use product_search_store::{
    BackendConfig, Catalog, DEFAULT_SQLITE_PREFIX, RecordStore, SearchOutcome, SheetFileStore,
    StoreConfig,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "product-search.yml";
const LOG_ENV: &str = "PRODUCT_SEARCH_LOG";

/// Search output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "product-search")]
#[command(about = "Fuzzy product lookup and maintenance over a shared product sheet")]
#[command(version)]
struct Cli {
    /// Configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Catalog(CatalogCommand),
    /// SQLite table migration and seeding operations.
    Migrate(MigrateArgs),
}

#[derive(Debug, Subcommand)]
enum CatalogCommand {
    /// Search products by fuzzy match on the search field.
    Search(SearchArgs),
    /// List the entry-form fields.
    Fields,
    /// Append a new product.
    Add(AddArgs),
    /// Replace a product row with edited values.
    Edit(EditArgs),
    /// Delete a product row.
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Free-text product description.
    query: String,
    /// Minimum score (0-100), inclusive.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    threshold: Option<u8>,
    /// Column to match against.
    #[arg(long)]
    field: Option<String>,
    /// Compare without regard to letter case.
    #[arg(long)]
    ignore_case: bool,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Field value, repeatable.
    #[arg(long = "set", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,
}

#[derive(Debug, Args)]
struct EditArgs {
    /// Sheet row as shown by `search`.
    row: usize,
    /// Field value to change, repeatable. Other fields keep their values.
    #[arg(long = "set", value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,
    /// Refuse unless the row's derived name still equals this.
    #[arg(long)]
    expect: Option<String>,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Sheet row as shown by `search`.
    row: usize,
    /// Refuse unless the row's derived name still equals this.
    #[arg(long)]
    expect: Option<String>,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: MigrateOperation,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Create sheet tables in the database.
    Up(MigrateTarget),
    /// Drop sheet tables from the database.
    Down(MigrateTarget),
    /// Import a JSON sheet file.
    Seed(MigrateSeedArgs),
    /// Drop tables, recreate, and import a JSON sheet file.
    Refresh(MigrateSeedArgs),
    /// Show migration and table status.
    Status(MigrateTarget),
}

/// Database to migrate; defaults to the configured sqlite backend.
#[derive(Debug, Args)]
struct MigrateTarget {
    /// Database file path.
    #[arg(long)]
    db: Option<PathBuf>,
    /// Table prefix.
    #[arg(long)]
    prefix: Option<String>,
}

#[derive(Debug, Args)]
struct MigrateSeedArgs {
    #[command(flatten)]
    target: MigrateTarget,
    /// JSON sheet file to import.
    #[arg(long)]
    source: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Catalog(command) => run_catalog(&cli.config, command),
        Command::Migrate(args) => run_migrate(&cli.config, args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// catalog commands
// ---------------------------------------------------------------------------

fn run_catalog(config_path: &Path, command: CatalogCommand) -> Result<(), String> {
    let config = load_config(config_path)?;
    let session = config
        .session()
        .map_err(|e| format!("Failed to establish session: {e}"))?;

    match &config.backend {
        BackendConfig::Sheet { path } => {
            let store = SheetFileStore::open(path, session)
                .map_err(|e| format!("Failed to open sheet '{}': {e}", path.display()))?;
            run_with_store(store, &config, command)
        }
        BackendConfig::Sqlite { path, prefix } => {
            let store = SqliteRecordStore::open(path, prefix.as_str(), session)
                .map_err(|e| format!("Failed to open database '{}': {e}", path.display()))?;
            run_with_store(store, &config, command)
        }
    }
}

fn run_with_store<S: RecordStore>(
    store: S,
    config: &StoreConfig,
    command: CatalogCommand,
) -> Result<(), String> {
    let mut catalog = Catalog::new(store, config.layout.clone());
    match command {
        CatalogCommand::Search(args) => run_search(&mut catalog, config, args),
        CatalogCommand::Fields => run_fields(&mut catalog),
        CatalogCommand::Add(args) => run_add(&mut catalog, args),
        CatalogCommand::Edit(args) => run_edit(&mut catalog, args),
        CatalogCommand::Delete(args) => run_delete(&mut catalog, args),
    }
}

fn run_search<S: RecordStore>(
    catalog: &mut Catalog<S>,
    config: &StoreConfig,
    args: SearchArgs,
) -> Result<(), String> {
    let options = search_options(&config.search, &args);
    debug!(?options, "searching");
    let outcome = catalog
        .search(&args.query, &options)
        .map_err(|e| format!("Search failed: {e}"))?;

    match args.format {
        CliOutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)
                .map_err(|e| format!("Failed to serialize results: {e}"))?;
            println!("{json}");
        }
        CliOutputFormat::Table => {
            for line in render_outcome(&outcome, &options.field) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn run_fields<S: RecordStore>(catalog: &mut Catalog<S>) -> Result<(), String> {
    let form = catalog
        .blank_form()
        .map_err(|e| format!("Failed to read sheet header: {e}"))?;
    for (field, _) in form.fields() {
        println!("{field}");
    }
    let layout = catalog.layout();
    println!(
        "({} is generated from: {})",
        layout.target,
        layout.sources().join(", ")
    );
    Ok(())
}

fn run_add<S: RecordStore>(catalog: &mut Catalog<S>, args: AddArgs) -> Result<(), String> {
    let mut form = catalog
        .blank_form()
        .map_err(|e| format!("Failed to read sheet header: {e}"))?;
    fill_form(&mut form, args.set)?;
    let record = catalog.add(form).map_err(|e| format!("Add failed: {e}"))?;
    println!(
        "Product added: {}",
        record.get(&catalog.layout().target).unwrap_or_default()
    );
    Ok(())
}

fn run_edit<S: RecordStore>(catalog: &mut Catalog<S>, args: EditArgs) -> Result<(), String> {
    let (target, mut form) = select_row(catalog, args.row, args.expect.as_deref())?;
    fill_form(&mut form, args.set)?;
    let record = catalog
        .edit(&target, form)
        .map_err(|e| format!("Edit failed: {e}"))?;
    println!(
        "Row {} replaced by: {}",
        target.position,
        record.get(&catalog.layout().target).unwrap_or_default()
    );
    Ok(())
}

fn run_delete<S: RecordStore>(catalog: &mut Catalog<S>, args: DeleteArgs) -> Result<(), String> {
    let (target, _) = select_row(catalog, args.row, args.expect.as_deref())?;
    catalog
        .delete(&target)
        .map_err(|e| format!("Delete failed: {e}"))?;
    println!(
        "Row {} deleted: {}",
        target.position,
        target.record.get(&catalog.layout().target).unwrap_or_default()
    );
    Ok(())
}

/// Loads the row at `row`, checking it against the expected derived name.
fn select_row<S: RecordStore>(
    catalog: &mut Catalog<S>,
    row: usize,
    expect: Option<&str>,
) -> Result<(EditTarget, EntryForm), String> {
    let position = RowPosition::new(row);
    let (context, form) = catalog
        .begin_edit(position)
        .map_err(|e| format!("Cannot select row {row}: {e}"))?;
    let EditContext::Editing(target) = context else {
        return Err(format!("Cannot select row {row}"));
    };
    if let Some(expected) = expect {
        let current = target.record.get(&catalog.layout().target).unwrap_or_default();
        if current != expected {
            return Err(format!(
                "Row {row} now holds '{current}', not '{expected}'; search again before retrying"
            ));
        }
    }
    Ok((target, form))
}

// ---------------------------------------------------------------------------
// migrate command
// ---------------------------------------------------------------------------

fn run_migrate(config_path: &Path, args: MigrateArgs) -> Result<(), String> {
    match args.operation {
        MigrateOperation::Up(a) => run_migrate_up(config_path, a),
        MigrateOperation::Down(a) => run_migrate_down(config_path, a),
        MigrateOperation::Seed(a) => run_migrate_seed(config_path, a),
        MigrateOperation::Refresh(a) => run_migrate_refresh(config_path, a),
        MigrateOperation::Status(a) => run_migrate_status(config_path, a),
    }
}

fn run_migrate_up(config_path: &Path, target: MigrateTarget) -> Result<(), String> {
    let (db, prefix) = resolve_migrate_target(config_path, target)?;
    let mut migration = open_migration(&db, &prefix)?;
    migration
        .up()
        .map_err(|e| format!("Migration up failed: {e}"))?;
    println!(
        "Migration up complete. Tables created with prefix '{}' in '{}'.",
        prefix,
        db.display()
    );
    Ok(())
}

fn run_migrate_down(config_path: &Path, target: MigrateTarget) -> Result<(), String> {
    let (db, prefix) = resolve_migrate_target(config_path, target)?;
    let mut migration = open_migration(&db, &prefix)?;
    migration
        .down()
        .map_err(|e| format!("Migration down failed: {e}"))?;
    println!(
        "Migration down complete. Tables with prefix '{}' dropped from '{}'.",
        prefix,
        db.display()
    );
    Ok(())
}

fn run_migrate_seed(config_path: &Path, args: MigrateSeedArgs) -> Result<(), String> {
    let (db, prefix) = resolve_migrate_target(config_path, args.target)?;
    let mut migration = open_migration(&db, &prefix)?;
    let report = migration
        .seed(&args.source)
        .map_err(|e| format!("Seed failed: {e}"))?;
    println!("Seed complete:");
    println!("  Columns inserted: {}", report.columns_inserted);
    println!("  Rows inserted: {}", report.rows_inserted);
    Ok(())
}

fn run_migrate_refresh(config_path: &Path, args: MigrateSeedArgs) -> Result<(), String> {
    let (db, prefix) = resolve_migrate_target(config_path, args.target)?;
    let mut migration = open_migration(&db, &prefix)?;
    let report = migration
        .refresh(&args.source)
        .map_err(|e| format!("Refresh failed: {e}"))?;
    println!("Refresh complete (tables dropped, recreated, and reseeded):");
    println!("  Columns inserted: {}", report.columns_inserted);
    println!("  Rows inserted: {}", report.rows_inserted);
    Ok(())
}

fn run_migrate_status(config_path: &Path, target: MigrateTarget) -> Result<(), String> {
    let (db, prefix) = resolve_migrate_target(config_path, target)?;
    let migration = open_migration(&db, &prefix)?;
    let status = migration
        .status()
        .map_err(|e| format!("Failed to get migration status: {e}"))?;
    println!("Migration Status:");
    println!(
        "  Tables exist: {}",
        if status.tables_exist { "yes" } else { "no" }
    );
    println!("  Column count: {}", status.column_count);
    println!("  Row count: {}", status.row_count);
    Ok(())
}

fn open_migration(db: &Path, prefix: &str) -> Result<Migration, String> {
    let conn = rusqlite::Connection::open(db)
        .map_err(|e| format!("Failed to open database '{}': {e}", db.display()))?;
    Migration::new(conn, prefix).map_err(|e| format!("Failed to initialize migration: {e}"))
}

/// Picks the database from `--db`/`--prefix`, falling back to the config.
fn resolve_migrate_target(
    config_path: &Path,
    target: MigrateTarget,
) -> Result<(PathBuf, String), String> {
    if let Some(db) = target.db {
        let prefix = target
            .prefix
            .unwrap_or_else(|| DEFAULT_SQLITE_PREFIX.to_string());
        return Ok((db, prefix));
    }
    match load_config(config_path)?.backend {
        BackendConfig::Sqlite { path, prefix } => Ok((path, target.prefix.unwrap_or(prefix))),
        BackendConfig::Sheet { .. } => Err(format!(
            "'{}' configures a sheet backend; pass --db to migrate a SQLite file",
            config_path.display()
        )),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_config(path: &Path) -> Result<StoreConfig, String> {
    StoreConfig::load(path).map_err(|e| format!("Failed to load config '{}': {e}", path.display()))
}

/// Parses a `COLUMN=VALUE` argument. The value may be empty or contain `=`.
fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{raw}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{raw}'"));
    }
    Ok((column.to_string(), value.to_string()))
}

fn fill_form(form: &mut EntryForm, assignments: Vec<(String, String)>) -> Result<(), String> {
    for (column, value) in assignments {
        form.set(&column, value).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Configured search defaults with command-line overrides applied.
fn search_options(base: &MatchOptions, args: &SearchArgs) -> MatchOptions {
    let mut options = base.clone();
    if let Some(threshold) = args.threshold {
        options = options.with_threshold(threshold);
    }
    if let Some(field) = &args.field {
        options = options.with_field(field.clone());
    }
    if args.ignore_case {
        options = options.with_case(CaseMode::Insensitive);
    }
    options
}

fn render_outcome(outcome: &SearchOutcome, field: &str) -> Vec<String> {
    if outcome.is_empty() {
        return vec![format!(
            "No product found for '{}', consider adding it.",
            outcome.query
        )];
    }
    let mut lines = Vec::with_capacity(outcome.hits.len() + 1);
    lines.push(format!(
        "{} results found with matching score >= {}%",
        outcome.hits.len(),
        outcome.threshold
    ));
    for hit in &outcome.hits {
        lines.push(format!(
            "  row {:>4}  {:>3}%  {}",
            hit.position.get(),
            hit.score,
            hit.record.get(field).unwrap_or_default()
        ));
    }
    lines
}

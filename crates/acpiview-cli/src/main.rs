use acpiview_core::{
    signature_to_string, validate, AcpiViewConfig, Category, DataStore, DispatchStatus,
    RecordSnapshot, ReportOption, ValidationSummary,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::{ColoredString, Colorize};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "acpiview")]
#[command(version)]
#[command(about = "Cross-table validation of decoded ACPI metadata", long_about = None)]
struct Args {
    /// Report only the named table
    #[arg(short = 's', value_name = "TABLE")]
    select: Option<String>,

    /// List the installed tables
    #[arg(short = 'l', conflicts_with = "dump")]
    list: bool,

    /// Dump mode for the selected table. Record snapshots carry no raw
    /// table bytes, so this only sets the report option and checks that the
    /// table is installed.
    #[arg(short = 'd', requires = "select")]
    dump: bool,

    /// Disable consistency checking
    #[arg(short = 'q')]
    quiet: bool,

    /// Colour highlight the report
    #[arg(short = 'H', long)]
    highlight: bool,

    /// Run the optional validator with this id
    #[arg(short = 'r', value_name = "ID")]
    validator: Option<usize>,

    /// Record snapshot to validate (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    records: Option<PathBuf>,

    /// YAML configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether the pass came out clean.
fn run(args: &Args) -> Result<bool> {
    let mut config = build_config(args)?;
    debug!(?config, "effective configuration");

    let mut store = DataStore::new();
    if let Some(path) = &args.records {
        let snapshot = RecordSnapshot::from_file(path)
            .with_context(|| format!("Failed to load records from {}", path.display()))?;
        snapshot
            .load_into(&mut store)
            .with_context(|| format!("Failed to store records from {}", path.display()))?;
    }
    info!(records = store.len(), "store populated");

    let selection_found = locate_selection(&mut config, &store);

    if config.report_option == ReportOption::TableList {
        print_table_list(&store);
    }

    let summary = validate(&store, &config);

    match args.format {
        OutputFormat::Text => {
            colored::control::set_override(config.colour_highlighting);
            print_text(&summary);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)
                .context("Failed to serialize summary")?;
            println!("{}", json);
        }
    }

    Ok(summary.is_clean() && selection_found)
}

/// Mark whether the selected table is installed. A dump of a missing table
/// fails the invocation; other modes only report it.
fn locate_selection(config: &mut AcpiViewConfig, store: &DataStore) -> bool {
    let dumping = config.report_option == ReportOption::DumpBinFile;
    let Some(table) = config.selected_table.as_mut() else {
        return true;
    };

    if table.locate(store) {
        return true;
    }

    println!("Requested ACPI Table not found: {}", table.name);
    !dumping
}

fn build_config(args: &Args) -> Result<AcpiViewConfig> {
    let mut config = match &args.config {
        Some(path) => AcpiViewConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AcpiViewConfig::default(),
    };

    if let Some(name) = &args.select {
        config.select_table(name.as_str());
        config.report_option = ReportOption::Selected;
    }
    if args.list {
        config.report_option = ReportOption::TableList;
    }
    if args.dump {
        config.report_option = ReportOption::DumpBinFile;
    }
    if args.quiet {
        config.consistency_checking = false;
    }
    if args.highlight {
        config.colour_highlighting = true;
    }
    if let Some(id) = args.validator {
        config.enable_validator(id);
    }

    config.validate()?;
    Ok(config)
}

fn print_table_list(store: &DataStore) {
    let Ok(records) = store.get_all(Category::InstalledTables) else {
        println!("No installed tables recorded.");
        return;
    };

    println!("Installed tables:");
    for (index, record) in records.iter().enumerate() {
        let name = match <[u8; 4]>::try_from(record.data()) {
            Ok(bytes) => signature_to_string(u32::from_ne_bytes(bytes)),
            Err(_) => format!("<{} bytes>", record.data().len()),
        };
        println!("  {:>3}. {}", index + 1, name);
    }
    println!();
}

fn highlight(line: &str) -> ColoredString {
    if line.starts_with("ERROR") {
        line.red().bold()
    } else if line.starts_with("WARNING") {
        line.yellow().bold()
    } else {
        line.normal()
    }
}

fn print_text(summary: &ValidationSummary) {
    for line in &summary.diagnostics {
        println!("{}", highlight(line));
    }

    if !summary.diagnostics.is_empty() {
        println!();
    }

    for report in &summary.dispatches {
        let name = report.validator.as_deref().unwrap_or("<unknown>");
        let status = match &report.status {
            DispatchStatus::Passed => "passed".to_string(),
            DispatchStatus::Skipped => "skipped".to_string(),
            DispatchStatus::Unavailable { category } => format!("no {} data", category),
            DispatchStatus::Failed { reason } => format!("failed: {}", reason),
            DispatchStatus::Refused { reason } => format!("refused: {}", reason),
        };
        println!("[{}] {}: {}", report.validator_id, name, status);
    }

    println!();
    println!(
        "Table Statistics:\n  {} Error(s)\n  {} Warning(s)",
        summary.errors, summary.warnings
    );
}

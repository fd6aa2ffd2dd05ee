use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use invoice_etl::config::EtlConfig;
use invoice_etl::convert;
use invoice_etl::{EtlError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("invoice_etl=info"))
        .map_err(|e| EtlError::Logging(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| EtlError::Logging(e.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest(args) => execute_ingest(args),
    }
}

fn execute_ingest(args: IngestArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(EtlError::MissingInput(args.input));
    }

    let config = match &args.config {
        Some(path) => EtlConfig::load(path)?,
        None => EtlConfig::default(),
    }
    .with_sheet(args.sheet.clone());

    let format = args.resolve_format();
    let stats = match format {
        OutputFormat::Excel => convert::excel_to_excel(&args.input, &args.output, &config)?,
        OutputFormat::Json => convert::excel_to_json(&args.input, &args.output, &config)?,
    };

    println!(
        "{} client(s), {} invoice(s) registered; {} duplicate(s) skipped; {} row(s) rejected",
        stats.clients_registered,
        stats.invoices_registered,
        stats.duplicate_skips,
        stats.rejected_rows
    );
    Ok(())
}

fn guess_format(path: &Path) -> OutputFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
        _ => OutputFormat::Excel,
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Validate an ERP invoice export and group its invoices by client."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest an export workbook and write the client invoice report.
    Ingest(IngestArgs),
}

#[derive(clap::Args)]
struct IngestArgs {
    /// Export workbook (.xlsx).
    #[arg(long)]
    input: PathBuf,

    /// Report file path.
    #[arg(long)]
    output: PathBuf,

    /// Report format; guessed from the output extension when omitted.
    #[arg(long, value_enum)]
    to: Option<OutputFormat>,

    /// TOML file with sheet, header and column layout settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worksheet to read, overriding the configuration.
    #[arg(long)]
    sheet: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Excel,
    Json,
}

impl IngestArgs {
    fn resolve_format(&self) -> OutputFormat {
        self.to.unwrap_or_else(|| guess_format(&self.output))
    }
}

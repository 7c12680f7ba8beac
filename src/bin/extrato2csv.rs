//! CLI binary for extrato2csv.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `PipelineConfig` and prints a run summary.

use anyhow::{Context, Result};
use clap::Parser;
use extrato2csv::{build_ledger_from_path, write_ledger, NullDatePolicy, PipelineConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Merge every statement in a directory into the canonical ledger
  extrato2csv extratos/ -o extrato_completo.csv

  # Process a single statement
  extrato2csv extratos/extrato-JANEIRO.pdf

  # Drop records whose date never parsed instead of sorting them last
  extrato2csv extratos/ --null-dates drop

  # Exclude more balance lines
  extrato2csv extratos/ --deny "Saldo Final" --deny "Saldo Bloqueado"

  # Machine-readable run stats
  extrato2csv extratos/ --json -q

INPUT NAMING:
  Statement files carry their month between the first '-' and the next
  '.' or '-': extrato-JANEIRO.pdf tags its records with mes JANEIRO.
  The tag is copied into the `mes` column verbatim.

OUTPUT COLUMNS:
  data_operacao  dd/mm/yyyy, empty when the date never parsed
  descricao      description, continuation rows merged in
  doc            document/reference number
  valor          locale-formatted amount, e.g. 1.234,56
  tipo           credito | debito
  mes            month tag from the file name

ENVIRONMENT VARIABLES:
  EXTRATO_OUTPUT      Default output path (same as -o)
  EXTRATO_NULL_DATES  Default placement of unparseable dates
  RUST_LOG            Tracing filter; overrides -v/-q
"#;

/// Merge monthly bank-statement PDFs into one canonical ledger CSV.
#[derive(Parser, Debug)]
#[command(
    name = "extrato2csv",
    version,
    about = "Merge monthly bank-statement PDFs into one canonical ledger CSV",
    long_about = "Extract the movement table from each monthly statement PDF, reconcile \
wrapped and packed rows into one record per transaction, normalize amounts and movement \
types, and write a single chronologically sorted CSV covering every month.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory of `*.pdf` statements, or a single statement file.
    input: PathBuf,

    /// Write the ledger CSV to this path.
    #[arg(
        short,
        long,
        env = "EXTRATO_OUTPUT",
        default_value = "extrato_completo.csv"
    )]
    output: PathBuf,

    /// Where records with unparseable dates end up.
    #[arg(long, env = "EXTRATO_NULL_DATES", value_enum, default_value = "last")]
    null_dates: NullDatesArg,

    /// Additional denylist term (repeatable); matching records are dropped.
    #[arg(long = "deny", value_name = "TERM")]
    deny: Vec<String>,

    /// Print run stats as JSON to stdout.
    #[arg(long, env = "EXTRATO_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EXTRATO_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "EXTRATO_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum NullDatesArg {
    Last,
    First,
    Drop,
}

impl From<NullDatesArg> for NullDatePolicy {
    fn from(v: NullDatesArg) -> Self {
        match v {
            NullDatesArg::Last => NullDatePolicy::Last,
            NullDatesArg::First => NullDatePolicy::First,
            NullDatesArg::Drop => NullDatePolicy::Drop,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = PipelineConfig::builder().null_dates(cli.null_dates.clone().into());
    for term in &cli.deny {
        builder = builder.deny(term.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run pipeline ─────────────────────────────────────────────────────
    let (ledger, stats) = build_ledger_from_path(&cli.input, &config)
        .with_context(|| format!("Failed to process {}", cli.input.display()))?;

    write_ledger(&ledger, &cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    // ── Summary ──────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    }

    if !cli.quiet {
        let dropped = stats.dropped_denylist + stats.dropped_header + stats.dropped_tipo;
        // denylist and header drops are routine; flag only the surprising ones
        let unusual = stats.dropped_tipo + stats.null_dates;
        eprintln!(
            "{}  {} transaction(s) from {} file(s)  {}ms  →  {}",
            if unusual == 0 { green("✔") } else { cyan("⚠") },
            bold(&stats.transactions.to_string()),
            stats.files,
            stats.duration_ms,
            bold(&cli.output.display().to_string()),
        );
        eprintln!(
            "   {}",
            dim(&format!(
                "{} pages, {} raw rows, {} reconciled records",
                stats.pages, stats.raw_rows, stats.reconciled
            ))
        );
        if dropped > 0 {
            eprintln!(
                "   dropped: {} denylist, {} header, {} unrecognized tipo",
                stats.dropped_denylist, stats.dropped_header, stats.dropped_tipo
            );
        }
        if stats.null_dates > 0 {
            eprintln!(
                "   {} record(s) without a parseable date ({:?} placement)",
                stats.null_dates, cli.null_dates
            );
        }
    }

    Ok(())
}

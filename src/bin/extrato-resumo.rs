//! CLI binary printing monthly totals over the canonical ledger CSV.

use anyhow::{Context, Result};
use clap::Parser;
use extrato2csv::config::{default_category_rules, load_category_rules};
use extrato2csv::{category_totals_from_path, format_linha, monthly_totals_from_path};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Monthly debit/credit totals over the canonical ledger
  extrato-resumo extrato_completo.csv

  # Debit spend per category with the built-in rules
  extrato-resumo --categorias

  # Custom rules file (ordered; first match wins)
  extrato-resumo --regras regras.json

RULES FILE:
  JSON array evaluated top to bottom:
    [{"keyword": "PAGAMENTO", "label": "Pagamentos"},
     {"keyword": "PIX", "label": "Transferências PIX"}]

OUTPUT:
  One line per month present in the ledger, calendar months first:
    JANEIRO: Débito = R$ 1234.56 | Crédito = R$ 789.01
"#;

/// Print monthly debit/credit totals from the ledger CSV.
#[derive(Parser, Debug)]
#[command(
    name = "extrato-resumo",
    version,
    about = "Print monthly debit/credit totals from the ledger CSV",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Ledger CSV written by extrato2csv.
    #[arg(default_value = "extrato_completo.csv")]
    csv: PathBuf,

    /// Also print debit spend per category.
    #[arg(long)]
    categorias: bool,

    /// Category rules JSON file (implies --categorias).
    #[arg(long, value_name = "FILE")]
    regras: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let totals = monthly_totals_from_path(&cli.csv)
        .with_context(|| format!("Failed to read {}", cli.csv.display()))?;
    for (mes, t) in &totals {
        println!("{}", format_linha(mes, t));
    }

    if cli.categorias || cli.regras.is_some() {
        let rules = match &cli.regras {
            Some(path) => load_category_rules(path)
                .with_context(|| format!("Failed to load rules from {}", path.display()))?,
            None => default_category_rules(),
        };
        let categorias = category_totals_from_path(&cli.csv, &rules)
            .with_context(|| format!("Failed to read {}", cli.csv.display()))?;
        let total: f64 = categorias.iter().map(|(_, v)| v).sum();

        println!();
        println!("{}", bold("Débitos por categoria:"));
        for (label, valor) in &categorias {
            let pct = if total > 0.0 { valor / total * 100.0 } else { 0.0 };
            println!(
                "  {:<20} R$ {:>12}  {}",
                label,
                extrato2csv::format_valor(*valor),
                dim(&format!("{pct:>5.1}%"))
            );
        }
    }

    Ok(())
}

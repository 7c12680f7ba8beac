//! # extrato2csv
//!
//! Turn a year of condominium bank-statement PDFs into one canonical
//! ledger CSV, plus a monthly debit/credit summary over that file.
//!
//! ## Why this crate?
//!
//! Statement PDFs are built for reading, not for accounting: one logical
//! transaction wraps across several visual rows, several transactions
//! sometimes share a single row, amounts are locale-formatted text and
//! page boilerplate repeats between movements. This crate reconciles all
//! of that into one row per transaction, merged across months and sorted
//! chronologically, in a CSV spreadsheet tools open cleanly.
//!
//! ## Pipeline Overview
//!
//! ```text
//! *.pdf (one per month)
//!  │
//!  ├─ 1. Input      resolve files, validate magic bytes, read month tags
//!  ├─ 2. Extract    text layer → raw 5-cell rows, skip boilerplate
//!  ├─ 3. Reconcile  merge continuation rows, split multi-date rows
//!  ├─ 4. Normalize  locale amounts → numbers, +/- → credito/debito
//!  └─ 5. Ledger     merge months, sort by date, write CSV (UTF-8 BOM)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use extrato2csv::{build_ledger_from_path, write_ledger, PipelineConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let (ledger, stats) = build_ledger_from_path("extratos/", &config)?;
//!     write_ledger(&ledger, "extrato_completo.csv")?;
//!     eprintln!("{} transaction(s) from {} file(s)", stats.transactions, stats.files);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `extrato2csv` and `extrato-resumo` binaries (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! extrato2csv = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod pipeline;
pub mod process;
pub mod resumo;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use auth::{CredentialStore, LoginOutcome};
pub use config::{CategoryRule, NullDatePolicy, PipelineConfig, PipelineConfigBuilder};
pub use error::ExtratoError;
pub use ledger::{Ledger, RunStats, TipoLancamento, Transaction};
pub use pipeline::normalize::{format_valor, parse_valor};
pub use process::{build_ledger, build_ledger_from_path, build_ledger_from_texts, write_ledger};
pub use resumo::{
    category_totals_from_path, format_linha, monthly_totals_from_path, MonthlyTotals,
};

//! Run orchestration: statement files in, sorted ledger out.
//!
//! ## Why a fold?
//!
//! Each statement contributes records to an accumulator threaded through a
//! fold over the file list; nothing is shared or mutated across files, so
//! the resulting ledger depends only on the set of inputs, never on
//! processing order. The text-level entry point exists so the whole
//! reconcile-normalize-sort path can be exercised without a PDF on disk.

use crate::config::PipelineConfig;
use crate::error::ExtratoError;
use crate::ledger::{Ledger, RunStats, Transaction};
use crate::pipeline::extract::{self, RawRow};
use crate::pipeline::input::{self, StatementFile};
use crate::pipeline::{normalize, reconcile};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Build the merged ledger for every statement under `input` (a directory
/// of `*.pdf` files, or a single file).
pub fn build_ledger_from_path(
    input: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<(Ledger, RunStats), ExtratoError> {
    let statements = input::collect_statements(input)?;
    build_ledger(&statements, config)
}

/// Build the merged ledger from already-resolved statement files.
pub fn build_ledger(
    statements: &[StatementFile],
    config: &PipelineConfig,
) -> Result<(Ledger, RunStats), ExtratoError> {
    let start = Instant::now();
    let mut stats = RunStats {
        files: statements.len(),
        ..Default::default()
    };

    // ── Step 1: Extract and reconcile each statement ─────────────────────
    let tagged = statements.iter().try_fold(
        Vec::new(),
        |mut acc, statement| -> Result<_, ExtratoError> {
            info!(
                "Processing {} (mes={})",
                statement.path.display(),
                statement.mes
            );
            let pages = extract::extract_pages(&statement.path)?;
            stats.pages += pages.len();

            let rows: Vec<RawRow> = pages
                .iter()
                .flat_map(|page| extract::rows_from_text(page, &config.header_markers))
                .collect();
            stats.raw_rows += rows.len();

            let records = reconcile::reconcile(rows);
            debug!(
                "{}: {} reconciled record(s)",
                statement.path.display(),
                records.len()
            );
            acc.extend(records.into_iter().map(|r| (r, statement.mes.clone())));
            Ok(acc)
        },
    )?;

    finish_ledger(tagged, stats, start, config)
}

/// Build a ledger from in-memory page texts, one `(mes, text)` pair per
/// statement. Follows the same path as [`build_ledger`] after extraction.
pub fn build_ledger_from_texts(
    texts: &[(&str, &str)],
    config: &PipelineConfig,
) -> Result<(Ledger, RunStats), ExtratoError> {
    let start = Instant::now();
    let mut stats = RunStats {
        files: texts.len(),
        ..Default::default()
    };

    let mut tagged = Vec::new();
    for (mes, text) in texts {
        stats.pages += 1;
        let rows = extract::rows_from_text(text, &config.header_markers);
        stats.raw_rows += rows.len();
        tagged.extend(
            reconcile::reconcile(rows)
                .into_iter()
                .map(|r| (r, mes.to_string())),
        );
    }

    finish_ledger(tagged, stats, start, config)
}

/// Shared back half of the pipeline: filter, normalize, sort.
fn finish_ledger(
    tagged: Vec<(RawRow, String)>,
    mut stats: RunStats,
    start: Instant,
    config: &PipelineConfig,
) -> Result<(Ledger, RunStats), ExtratoError> {
    stats.reconciled = tagged.len();

    // ── Step 2: Drop denylist and presentation-header records ────────────
    let mut kept = Vec::with_capacity(tagged.len());
    for (row, mes) in tagged {
        if reconcile::matches_denylist(&row, &config.denylist) {
            stats.dropped_denylist += 1;
            debug!("denylist drop: {row:?}");
        } else if reconcile::is_presentation_header(&row, &config.header_markers) {
            stats.dropped_header += 1;
            debug!("header drop: {row:?}");
        } else {
            kept.push((row, mes));
        }
    }

    // ── Step 3: Normalize records into transactions ──────────────────────
    let mut transactions = Vec::with_capacity(kept.len());
    for (row, mes) in kept {
        let Some(tipo) = normalize::normalize_tipo(&row.type_marker) else {
            stats.dropped_tipo += 1;
            warn!(
                "dropping record with unrecognized movement marker {:?}: {}",
                row.type_marker, row.description
            );
            continue;
        };
        let valor = normalize::parse_valor(&row.amount_text).ok_or_else(|| {
            ExtratoError::InvalidAmount {
                text: row.amount_text.clone(),
                mes: mes.clone(),
            }
        })?;
        let data_operacao = normalize::parse_date(&row.date_text);
        if data_operacao.is_none() {
            stats.null_dates += 1;
        }
        transactions.push(Transaction {
            data_operacao,
            descricao: row.description,
            doc: row.doc_ref,
            valor,
            tipo,
            mes,
        });
    }

    // ── Step 4: Sort chronologically ─────────────────────────────────────
    let mut ledger = Ledger::new(transactions);
    ledger.sort(config.null_dates);

    stats.transactions = ledger.len();
    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Built ledger: {} transaction(s) from {} file(s) in {}ms",
        stats.transactions, stats.files, stats.duration_ms
    );
    Ok((ledger, stats))
}

/// Write the ledger CSV to `path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub fn write_ledger(ledger: &Ledger, path: impl AsRef<Path>) -> Result<(), ExtratoError> {
    let path = path.as_ref();
    let write_err = |e: std::io::Error| ExtratoError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
    }

    let mut buf = Vec::new();
    ledger.write_csv(&mut buf).map_err(write_err)?;

    let tmp_path = path.with_extension("csv.tmp");
    std::fs::write(&tmp_path, &buf).map_err(write_err)?;
    std::fs::rename(&tmp_path, path).map_err(write_err)?;

    debug!("Wrote {} ({} bytes)", path.display(), buf.len());
    Ok(())
}

//! Monthly aggregation over the written ledger CSV.
//!
//! Deliberately re-reads the persisted file instead of any in-memory
//! ledger: the summary must reflect what was actually written, including
//! the locale amount formatting, so it re-parses `valor` with the same
//! rule the normalizer uses.

use crate::config::CategoryRule;
use crate::error::ExtratoError;
use crate::pipeline::normalize::{categorize, parse_valor};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Calendar order for month tags as they appear in statement file names.
pub const MESES: [&str; 12] = [
    "JANEIRO",
    "FEVEREIRO",
    "MARCO",
    "ABRIL",
    "MAIO",
    "JUNHO",
    "JULHO",
    "AGOSTO",
    "SETEMBRO",
    "OUTUBRO",
    "NOVEMBRO",
    "DEZEMBRO",
];

/// Debit and credit sums for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlyTotals {
    pub debito: f64,
    pub credito: f64,
}

fn month_rank(mes: &str) -> Option<usize> {
    MESES.iter().position(|m| *m == mes)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, ExtratoError> {
    headers
        .iter()
        // the ledger writer emits a BOM ahead of the first header
        .position(|h| h.trim_start_matches('\u{feff}') == name)
        .ok_or_else(|| ExtratoError::Internal(format!("ledger csv: missing column '{name}'")))
}

/// Sum debits and credits per month from ledger CSV.
///
/// Months named in [`MESES`] come back in calendar order; any other tag
/// follows in first-seen order. Rows with a movement type other than
/// `debito`/`credito` are ignored.
pub fn monthly_totals<R: Read>(reader: R) -> Result<Vec<(String, MonthlyTotals)>, ExtratoError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| ExtratoError::Internal(format!("ledger csv: {e}")))?
        .clone();
    let valor_idx = column_index(&headers, "valor")?;
    let tipo_idx = column_index(&headers, "tipo")?;
    let mes_idx = column_index(&headers, "mes")?;

    let mut seen: Vec<String> = Vec::new();
    let mut totals: HashMap<String, MonthlyTotals> = HashMap::new();

    for result in rdr.records() {
        let record = result.map_err(|e| ExtratoError::Internal(format!("ledger csv: {e}")))?;
        let mes = record.get(mes_idx).unwrap_or("").to_string();
        let tipo = record.get(tipo_idx).unwrap_or("").trim().to_lowercase();
        let valor_text = record.get(valor_idx).unwrap_or("");
        let valor = parse_valor(valor_text).ok_or_else(|| ExtratoError::InvalidAmount {
            text: valor_text.to_string(),
            mes: mes.clone(),
        })?;

        let entry = totals.entry(mes.clone()).or_insert_with(|| {
            seen.push(mes.clone());
            MonthlyTotals::default()
        });
        match tipo.as_str() {
            "debito" => entry.debito += valor,
            "credito" => entry.credito += valor,
            _ => debug!("ignoring row with movement type {tipo:?}"),
        }
    }

    let mut result: Vec<(String, MonthlyTotals)> = seen
        .into_iter()
        .map(|mes| {
            let t = totals.remove(&mes).unwrap_or_default();
            (mes, t)
        })
        .collect();
    result.sort_by_key(|(mes, _)| month_rank(mes).unwrap_or(usize::MAX));
    Ok(result)
}

/// [`monthly_totals`] over a ledger CSV on disk.
pub fn monthly_totals_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<(String, MonthlyTotals)>, ExtratoError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| ExtratoError::LedgerReadFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    monthly_totals(file).map_err(|e| match e {
        ExtratoError::Internal(detail) => ExtratoError::LedgerReadFailed {
            path: path.to_path_buf(),
            detail,
        },
        other => other,
    })
}

/// One summary line, e.g. `JANEIRO: Débito = R$ 30.00 | Crédito = R$ 0.00`.
pub fn format_linha(mes: &str, totals: &MonthlyTotals) -> String {
    format!(
        "{mes}: Débito = R$ {:.2} | Crédito = R$ {:.2}",
        totals.debito, totals.credito
    )
}

/// Sum debit spend per category, largest first.
///
/// Categories come from matching each description against `rules` in
/// order; credits are left out since the breakdown answers "where did the
/// money go".
pub fn category_totals<R: Read>(
    reader: R,
    rules: &[CategoryRule],
) -> Result<Vec<(String, f64)>, ExtratoError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| ExtratoError::Internal(format!("ledger csv: {e}")))?
        .clone();
    let descricao_idx = column_index(&headers, "descricao")?;
    let valor_idx = column_index(&headers, "valor")?;
    let tipo_idx = column_index(&headers, "tipo")?;
    let mes_idx = column_index(&headers, "mes")?;

    let mut totals: HashMap<String, f64> = HashMap::new();
    for result in rdr.records() {
        let record = result.map_err(|e| ExtratoError::Internal(format!("ledger csv: {e}")))?;
        if record.get(tipo_idx).unwrap_or("").trim().to_lowercase() != "debito" {
            continue;
        }
        let valor_text = record.get(valor_idx).unwrap_or("");
        let valor = parse_valor(valor_text).ok_or_else(|| ExtratoError::InvalidAmount {
            text: valor_text.to_string(),
            mes: record.get(mes_idx).unwrap_or("").to_string(),
        })?;
        let label = categorize(record.get(descricao_idx).unwrap_or(""), rules);
        *totals.entry(label.to_string()).or_default() += valor;
    }

    let mut result: Vec<(String, f64)> = totals.into_iter().collect();
    result.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(result)
}

/// [`category_totals`] over a ledger CSV on disk.
pub fn category_totals_from_path(
    path: impl AsRef<Path>,
    rules: &[CategoryRule],
) -> Result<Vec<(String, f64)>, ExtratoError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| ExtratoError::LedgerReadFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    category_totals(file, rules).map_err(|e| match e {
        ExtratoError::Internal(detail) => ExtratoError::LedgerReadFailed {
            path: path.to_path_buf(),
            detail,
        },
        other => other,
    })
}

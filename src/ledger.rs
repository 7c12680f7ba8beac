//! Canonical ledger model: normalized transactions, ordering, CSV output.

use crate::config::NullDatePolicy;
use crate::pipeline::normalize::format_valor;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Column order of the ledger CSV.
pub const CSV_HEADER: [&str; 6] = ["data_operacao", "descricao", "doc", "valor", "tipo", "mes"];

/// UTF-8 byte-order mark, written ahead of the CSV so spreadsheet tools
/// that sniff encodings render accented descriptions correctly.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoLancamento {
    Credito,
    Debito,
}

impl TipoLancamento {
    pub fn as_str(self) -> &'static str {
        match self {
            TipoLancamento::Credito => "credito",
            TipoLancamento::Debito => "debito",
        }
    }
}

impl std::fmt::Display for TipoLancamento {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized ledger transaction.
///
/// `data_operacao` is `None` when the statement carried a date-shaped token
/// that is not a real calendar date; such records are kept and placed
/// according to [`NullDatePolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub data_operacao: Option<NaiveDate>,
    pub descricao: String,
    pub doc: String,
    /// Amount in currency units as printed on the statement; direction
    /// is carried by `tipo`, never by the sign.
    pub valor: f64,
    pub tipo: TipoLancamento,
    /// Month tag taken from the source file name, e.g. `JANEIRO`.
    pub mes: String,
}

/// The merged, ordered ledger for one run.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sort transactions chronologically, placing null dates per `policy`.
    ///
    /// The sort is stable: records sharing a date keep their statement
    /// order, which is the only ordering information the source provides
    /// for same-day movements. Returns how many records were removed
    /// (non-zero only under [`NullDatePolicy::Drop`]).
    pub fn sort(&mut self, policy: NullDatePolicy) -> usize {
        let mut removed = 0;
        if policy == NullDatePolicy::Drop {
            let before = self.transactions.len();
            self.transactions.retain(|t| t.data_operacao.is_some());
            removed = before - self.transactions.len();
        }
        match policy {
            // `None < Some(_)` for Option, so the plain key puts nulls first.
            NullDatePolicy::First | NullDatePolicy::Drop => {
                self.transactions.sort_by_key(|t| t.data_operacao);
            }
            NullDatePolicy::Last => {
                self.transactions
                    .sort_by_key(|t| (t.data_operacao.is_none(), t.data_operacao));
            }
        }
        removed
    }

    /// Write the ledger as UTF-8 CSV with a leading BOM.
    ///
    /// Dates are rendered `dd/mm/yyyy` (empty for null); amounts keep the
    /// statement locale (`.` thousands, `,` decimals), so the csv writer
    /// quotes them.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&UTF8_BOM)?;
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CSV_HEADER)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        for t in &self.transactions {
            let data = t
                .data_operacao
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_default();
            let valor = format_valor(t.valor);
            csv.write_record([
                data.as_str(),
                t.descricao.as_str(),
                t.doc.as_str(),
                valor.as_str(),
                t.tipo.as_str(),
                t.mes.as_str(),
            ])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        }
        csv.flush()
    }
}

/// Counters for one pipeline run, reported on the CLI summary line and as
/// JSON under `--json`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    /// Statement files processed.
    pub files: usize,
    /// PDF pages with a text layer.
    pub pages: usize,
    /// Raw rows captured before reconciliation.
    pub raw_rows: usize,
    /// Records after continuation merging and multi-date splitting.
    pub reconciled: usize,
    /// Records removed by the denylist.
    pub dropped_denylist: usize,
    /// Records removed as presentation-header content.
    pub dropped_header: usize,
    /// Records removed for an unrecognized movement marker.
    pub dropped_tipo: usize,
    /// Transactions whose date text did not parse.
    pub null_dates: usize,
    /// Transactions in the final ledger.
    pub transactions: usize,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
}

//! Record reconciliation: one row per transaction, whatever the layout did.
//!
//! Table extraction leaves two structural ambiguities. A long description
//! wraps onto undated follow-up rows that belong to the transaction above
//! them, and a cramped layout can pack several dated movements into a
//! single physical row. Reconciliation resolves both: continuation rows
//! are merged into the pending dated record, and packed rows are split
//! into one record per date found. The split check runs first; a packed
//! row also ends whatever record was still accumulating.

use crate::pipeline::extract::RawRow;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap());
static DATE_FIND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").unwrap());

/// Whether `text` is exactly one valid `dd/mm/yyyy` calendar date.
///
/// Shape alone is not enough: `31/02/2024` matches the pattern but is not
/// a date, and a row starting with it is a continuation, not a record.
pub fn is_date(text: &str) -> bool {
    DATE_SHAPE.is_match(text) && NaiveDate::parse_from_str(text, "%d/%m/%Y").is_ok()
}

/// All `dd/mm/yyyy`-shaped substrings of `text`, calendar-valid or not.
pub fn find_dates(text: &str) -> Vec<&str> {
    DATE_FIND.find_iter(text).map(|m| m.as_str()).collect()
}

/// Split a packed row into one record per date.
///
/// Record `i` takes `dates[i]` as its date. Every other non-empty field is
/// split on whitespace: with at least `dates.len()` tokens, record `i`
/// takes token `i`; with fewer, every record keeps the whole field text.
/// Empty fields stay empty.
pub fn split_multi_date(row: &RawRow, dates: &[&str]) -> Vec<RawRow> {
    let n = dates.len();
    dates
        .iter()
        .enumerate()
        .map(|(idx, date)| RawRow {
            date_text: (*date).to_string(),
            description: split_field(&row.description, idx, n),
            doc_ref: split_field(&row.doc_ref, idx, n),
            amount_text: split_field(&row.amount_text, idx, n),
            type_marker: split_field(&row.type_marker, idx, n),
        })
        .collect()
}

fn split_field(text: &str, idx: usize, n: usize) -> String {
    if text.is_empty() {
        return String::new();
    }
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() >= n {
        tokens[idx].to_string()
    } else {
        text.to_string()
    }
}

/// Merge continuation rows and split packed rows across one row stream.
///
/// State machine over the rows of one statement:
/// - date cell holds several date shapes: flush the pending record, then
///   emit one record per date via [`split_multi_date`]; nothing is left
///   pending, so a continuation row after a packed row is discarded
/// - first cell is a single valid date: flush the pending record and
///   start a new one
/// - anything else continues the pending record; with no pending record
///   the row is dropped
///
/// The last pending record is flushed at end of input.
pub fn reconcile(rows: Vec<RawRow>) -> Vec<RawRow> {
    let mut records: Vec<RawRow> = Vec::new();
    let mut pending: Option<RawRow> = None;

    for row in rows {
        let dates = find_dates(&row.date_text);
        if dates.len() > 1 {
            if let Some(done) = pending.take() {
                records.push(done);
            }
            records.extend(split_multi_date(&row, &dates));
        } else if is_date(&row.date_text) {
            if let Some(done) = pending.take() {
                records.push(done);
            }
            pending = Some(row);
        } else if let Some(current) = pending.as_mut() {
            merge_continuation(current, &row);
        } else {
            debug!("discarding continuation row with no pending record: {row:?}");
        }
    }
    if let Some(done) = pending.take() {
        records.push(done);
    }
    records
}

fn merge_continuation(pending: &mut RawRow, row: &RawRow) {
    merge_field(&mut pending.description, &row.description);
    merge_field(&mut pending.doc_ref, &row.doc_ref);
    merge_field(&mut pending.amount_text, &row.amount_text);
    merge_field(&mut pending.type_marker, &row.type_marker);
}

fn merge_field(target: &mut String, extra: &str) {
    if extra.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(extra);
}

/// Whether any cell of `row` contains any of `terms`, case-insensitive.
pub fn matches_denylist(row: &RawRow, terms: &[String]) -> bool {
    any_field_contains(row, terms)
}

/// Whether any cell of `row` carries presentation-header content.
pub fn is_presentation_header(row: &RawRow, markers: &[String]) -> bool {
    any_field_contains(row, markers)
}

fn any_field_contains(row: &RawRow, needles: &[String]) -> bool {
    row.fields().iter().any(|field| {
        let lower = field.to_lowercase();
        needles.iter().any(|n| lower.contains(&n.to_lowercase()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: [&str; 5]) -> RawRow {
        RawRow {
            date_text: cells[0].to_string(),
            description: cells[1].to_string(),
            doc_ref: cells[2].to_string(),
            amount_text: cells[3].to_string(),
            type_marker: cells[4].to_string(),
        }
    }

    #[test]
    fn is_date_accepts_valid_calendar_dates() {
        assert!(is_date("05/01/2024"));
        assert!(is_date("31/12/2023"));
        assert!(is_date("29/02/2024")); // leap day
    }

    #[test]
    fn is_date_rejects_shape_and_calendar_violations() {
        assert!(!is_date("2024/01/05"));
        assert!(!is_date("31/02/2024"));
        assert!(!is_date("29/02/2023"));
        assert!(!is_date("5/1/2024"));
        assert!(!is_date("05/01/24"));
        assert!(!is_date("05/01/2024 PIX"));
        assert!(!is_date("05-01-2024"));
        assert!(!is_date(""));
    }

    #[test]
    fn find_dates_reports_every_shape_even_invalid_ones() {
        assert_eq!(
            find_dates("31/02/2024 05/01/2024"),
            ["31/02/2024", "05/01/2024"]
        );
        assert_eq!(find_dates("saldo em 05/01/2024"), ["05/01/2024"]);
        assert!(find_dates("no dates here").is_empty());
    }

    #[test]
    fn split_assigns_tokens_when_counts_line_up() {
        let packed = row(["05/01/2024 06/01/2024", "Rent Feb", "", "100,00 200,00", "+"]);
        let dates = find_dates(&packed.date_text);
        let records = split_multi_date(&packed, &dates);

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].fields(),
            ["05/01/2024", "Rent", "", "100,00", "+"]
        );
        assert_eq!(records[1].fields(), ["06/01/2024", "Feb", "", "200,00", "+"]);
    }

    #[test]
    fn split_takes_leading_tokens_when_field_has_more_than_n() {
        let packed = row(["05/01/2024 06/01/2024", "Rent Jan Feb", "", "100,00 200,00", "+"]);
        let dates = find_dates(&packed.date_text);
        let records = split_multi_date(&packed, &dates);
        assert_eq!(records[0].description, "Rent");
        assert_eq!(records[1].description, "Jan");
    }

    #[test]
    fn split_copies_short_fields_to_every_record() {
        let packed = row(["05/01/2024 06/01/2024", "ALUGUEL", "777", "100,00 200,00", "-"]);
        let dates = find_dates(&packed.date_text);
        let records = split_multi_date(&packed, &dates);
        assert_eq!(records[0].description, "ALUGUEL");
        assert_eq!(records[1].description, "ALUGUEL");
        assert_eq!(records[0].doc_ref, "777");
        assert_eq!(records[1].doc_ref, "777");
    }

    #[test]
    fn reconcile_merges_continuation_into_pending_record() {
        let records = reconcile(vec![
            row(["05/01/2024", "PIX TRANSFER", "", "50,00", "-"]),
            row(["", "TO JOHN DOE", "", "", ""]),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "PIX TRANSFER TO JOHN DOE");
        assert_eq!(records[0].amount_text, "50,00");
    }

    #[test]
    fn reconcile_fills_empty_pending_fields_without_leading_space() {
        let records = reconcile(vec![
            row(["05/01/2024", "PAGAMENTO", "", "", ""]),
            row(["", "", "123", "10,00", "-"]),
        ]);
        assert_eq!(records[0].doc_ref, "123");
        assert_eq!(records[0].amount_text, "10,00");
        assert_eq!(records[0].type_marker, "-");
    }

    #[test]
    fn reconcile_accumulates_several_continuations() {
        let records = reconcile(vec![
            row(["05/01/2024", "PIX", "", "50,00", "-"]),
            row(["", "TRANSFER", "", "", ""]),
            row(["", "TO JOHN DOE", "", "", ""]),
        ]);
        assert_eq!(records[0].description, "PIX TRANSFER TO JOHN DOE");
    }

    #[test]
    fn reconcile_flushes_pending_when_next_date_arrives() {
        let records = reconcile(vec![
            row(["05/01/2024", "PRIMEIRO", "", "10,00", "-"]),
            row(["06/01/2024", "SEGUNDO", "", "20,00", "+"]),
        ]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "PRIMEIRO");
        assert_eq!(records[1].description, "SEGUNDO");
    }

    #[test]
    fn reconcile_flushes_pending_before_a_packed_row() {
        let records = reconcile(vec![
            row(["05/01/2024", "PENDENTE", "", "10,00", "-"]),
            row(["", "COM CONTINUACAO", "", "", ""]),
            row(["06/01/2024 07/01/2024", "A B", "", "1,00 2,00", "+"]),
        ]);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].description, "PENDENTE COM CONTINUACAO");
        assert_eq!(records[1].date_text, "06/01/2024");
        assert_eq!(records[2].date_text, "07/01/2024");
    }

    #[test]
    fn reconcile_discards_continuation_after_a_packed_row() {
        let records = reconcile(vec![
            row(["06/01/2024 07/01/2024", "A B", "", "1,00 2,00", "+"]),
            row(["", "ORFA", "", "", ""]),
        ]);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.description.contains("ORFA")));
    }

    #[test]
    fn reconcile_discards_continuation_before_any_dated_row() {
        let records = reconcile(vec![
            row(["", "CABECALHO PERDIDO", "", "", ""]),
            row(["05/01/2024", "PAGAMENTO", "", "10,00", "-"]),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "PAGAMENTO");
    }

    #[test]
    fn reconcile_flushes_last_pending_at_end_of_input() {
        let records = reconcile(vec![row(["05/01/2024", "ULTIMO", "", "10,00", "-"])]);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn lone_invalid_date_is_a_continuation_not_a_record() {
        let records = reconcile(vec![
            row(["05/01/2024", "PAGAMENTO", "", "10,00", "-"]),
            row(["31/02/2024", "RESTO", "", "", ""]),
        ]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "PAGAMENTO RESTO");
    }

    #[test]
    fn denylist_matches_any_field_case_insensitively() {
        let terms = vec!["Saldo Anterior".to_string()];
        assert!(matches_denylist(
            &row(["05/01/2024", "SALDO ANTERIOR", "", "1,00", ""]),
            &terms
        ));
        assert!(matches_denylist(
            &row(["", "", "saldo anterior em conta", "", ""]),
            &terms
        ));
        assert!(!matches_denylist(
            &row(["05/01/2024", "PAGAMENTO", "", "1,00", "-"]),
            &terms
        ));
    }

    #[test]
    fn header_markers_flag_presentation_rows() {
        let markers = vec!["Histórico".to_string()];
        assert!(is_presentation_header(
            &row(["Data", "HISTÓRICO", "Doc", "Valor", ""]),
            &markers
        ));
    }
}

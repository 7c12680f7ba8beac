//! Table extraction: PDF text layer to raw 5-cell rows.
//!
//! ## Why split on whitespace runs?
//!
//! Statement PDFs lay the movement table out as column-aligned text, so in
//! the extracted text layer a gap of two or more spaces (or a tab) is a
//! column boundary while single spaces stay inside a cell. Each tab is its
//! own boundary: two adjacent tabs delimit an empty cell, which tab-layout
//! extractions use for columns with no value. An indented line means its
//! first column is empty, which is how description continuations present
//! themselves to the reconciler.

use crate::error::ExtratoError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

static CELL_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\t| {2,}").unwrap());

/// One raw table row in statement column order.
///
/// Cells are trimmed but otherwise untouched; whether `date_text` holds a
/// real date is the reconciler's question, not this stage's.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    pub date_text: String,
    pub description: String,
    pub doc_ref: String,
    pub amount_text: String,
    pub type_marker: String,
}

impl RawRow {
    /// Build a row from extracted cells, forcing the 5-column shape:
    /// extra cells are dropped, missing cells padded with empty strings.
    pub fn from_cells(cells: Vec<String>) -> Self {
        let mut it = cells.into_iter().chain(std::iter::repeat(String::new()));
        let date_text = it.next().unwrap_or_default();
        // multi-line cells collapse to single-line descriptions
        let description = it.next().unwrap_or_default().replace('\n', " ");
        Self {
            date_text,
            description,
            doc_ref: it.next().unwrap_or_default(),
            amount_text: it.next().unwrap_or_default(),
            type_marker: it.next().unwrap_or_default(),
        }
    }

    /// All five cells in column order.
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.date_text,
            &self.description,
            &self.doc_ref,
            &self.amount_text,
            &self.type_marker,
        ]
    }
}

/// Extract per-page text from a statement PDF.
///
/// Pages that render no text are dropped; a document where every page is
/// blank fails with [`ExtratoError::EmptyTextLayer`] since it is almost
/// certainly a scanned statement this tool cannot read.
pub fn extract_pages(path: impl AsRef<Path>) -> Result<Vec<String>, ExtratoError> {
    let path = path.as_ref();
    let text = pdf_extract::extract_text(path).map_err(|e| ExtratoError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let pages: Vec<String> = text
        .split('\u{000C}')
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.to_string())
        .collect();

    if pages.is_empty() {
        return Err(ExtratoError::EmptyTextLayer {
            path: path.to_path_buf(),
        });
    }

    debug!("{}: {} page(s) with text", path.display(), pages.len());
    Ok(pages)
}

/// Turn one page of statement text into raw rows.
///
/// Skips blank lines, lines containing a presentation marker
/// (case-insensitive) and bare page numbers.
pub fn rows_from_text(text: &str, header_markers: &[String]) -> Vec<RawRow> {
    let lowered: Vec<String> = header_markers.iter().map(|m| m.to_lowercase()).collect();

    let mut rows = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            // bare page number
            continue;
        }
        let line_lower = line.to_lowercase();
        if lowered.iter().any(|m| line_lower.contains(m)) {
            continue;
        }

        let mut cells: Vec<String> = CELL_SPLIT
            .split(line.trim_end())
            .map(|c| c.trim().to_string())
            .collect();
        // indentation means the first column is empty
        if line.starts_with([' ', '\t']) && cells.first().is_some_and(|c| !c.is_empty()) {
            cells.insert(0, String::new());
        }
        rows.push(RawRow::from_cells(cells));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        vec!["Lançamentos do período".to_string(), "Página".to_string()]
    }

    #[test]
    fn splits_columns_on_wide_gaps() {
        let text = "05/01/2024  PIX TRANSF JOHN DOE   123456   1.234,56   -";
        let rows = rows_from_text(text, &markers());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date_text, "05/01/2024");
        assert_eq!(rows[0].description, "PIX TRANSF JOHN DOE");
        assert_eq!(rows[0].doc_ref, "123456");
        assert_eq!(rows[0].amount_text, "1.234,56");
        assert_eq!(rows[0].type_marker, "-");
    }

    #[test]
    fn splits_columns_on_tabs() {
        let rows = rows_from_text("05/01/2024\tTARIFA BANCARIA\t\t25,00\t-", &markers());
        assert_eq!(
            rows[0].fields(),
            ["05/01/2024", "TARIFA BANCARIA", "", "25,00", "-"]
        );
    }

    #[test]
    fn pads_short_rows_to_five_cells() {
        let rows = rows_from_text("05/01/2024  SALDO", &markers());
        assert_eq!(rows[0].date_text, "05/01/2024");
        assert_eq!(rows[0].description, "SALDO");
        assert_eq!(rows[0].doc_ref, "");
        assert_eq!(rows[0].type_marker, "");
    }

    #[test]
    fn drops_cells_past_the_fifth() {
        let rows = rows_from_text("a  b  c  d  e  f  g", &markers());
        assert_eq!(rows[0].fields(), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn skips_blank_lines_and_page_numbers() {
        let text = "05/01/2024  PAGAMENTO  1  10,00  -\n\n   \n2\n06/01/2024  TARIFA  2  5,00  -";
        let rows = rows_from_text(text, &markers());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn skips_marker_lines_case_insensitively() {
        let text = "LANÇAMENTOS DO PERÍODO\n05/01/2024  PAGAMENTO  1  10,00  -\npágina 2 de 3";
        let rows = rows_from_text(text, &markers());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "PAGAMENTO");
    }

    #[test]
    fn indented_line_gets_empty_first_cell() {
        let rows = rows_from_text("            TRANSFER TO JOHN DOE", &markers());
        assert_eq!(rows[0].date_text, "");
        assert_eq!(rows[0].description, "TRANSFER TO JOHN DOE");
    }

    #[test]
    fn single_space_indent_still_means_empty_first_cell() {
        let rows = rows_from_text(" CONTINUACAO DO HISTORICO", &markers());
        assert_eq!(rows[0].date_text, "");
        assert_eq!(rows[0].description, "CONTINUACAO DO HISTORICO");
    }

    #[test]
    fn from_cells_flattens_newlines_in_description() {
        let row = RawRow::from_cells(vec![
            "05/01/2024".into(),
            "PIX\nJOHN DOE".into(),
            "1".into(),
            "10,00".into(),
            "-".into(),
        ]);
        assert_eq!(row.description, "PIX JOHN DOE");
    }
}

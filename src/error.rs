//! Error types for the extrato2csv library.
//!
//! The pipeline is batch-oriented and aborts on the first failure: a
//! statement that cannot be read, a month tag that cannot be derived, or an
//! amount that cannot be parsed all stop the run. There is therefore a single
//! fatal [`ExtratoError`] enum rather than a fatal/per-item split — partial
//! success has no channel to flow through.
//!
//! Records that are merely *dropped* (denylist matches, unmappable type
//! markers) are not errors; they are counted in
//! [`crate::ledger::RunStats`] and logged.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the extrato2csv library.
#[derive(Debug, Error)]
pub enum ExtratoError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Statement file was not found at the given path.
    #[error("Statement file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The file name carries no month tag.
    ///
    /// Statement files must be named `prefix-MES.pdf` (e.g.
    /// `extrato-JANEIRO.pdf`); the month tag is the only source of the
    /// `mes` column.
    #[error("No month tag in file name: '{path}'\nExpected a name like 'extrato-JANEIRO.pdf'.")]
    MonthTagMissing { path: PathBuf },

    /// The input directory contains no statement PDFs.
    #[error("No PDF statements found in '{path}'")]
    NoStatements { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF could not be parsed at all.
    #[error("Failed to read PDF '{path}': {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The PDF parsed but its text layer is empty.
    #[error("PDF '{path}' has an empty text layer\nScanned statements without embedded text are not supported.")]
    EmptyTextLayer { path: PathBuf },

    // ── Normalization errors ──────────────────────────────────────────────
    /// An amount field survived reconciliation but cannot be parsed.
    #[error("Unparseable amount '{text}' in month {mes}\nExpected locale format like '1.234,56'.")]
    InvalidAmount { text: String, mes: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output CSV.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The canonical CSV could not be read back for aggregation.
    #[error("Failed to read ledger CSV '{path}': {detail}")]
    LedgerReadFailed { path: PathBuf, detail: String },

    /// The credential store file is missing, unreadable, or malformed.
    #[error("Failed to load credential store '{path}': {detail}")]
    CredentialsUnreadable { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

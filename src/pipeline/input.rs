//! Input resolution: locate statement PDFs and read their month tags.
//!
//! ## Why validate before extraction?
//!
//! A whole-batch run aborts on the first bad file, so problems should
//! surface as early and as precisely as possible. Checking the `%PDF`
//! magic bytes and the month tag here gives callers a named error for the
//! offending file instead of a parser failure deep inside extraction.

use crate::error::ExtratoError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One statement PDF scheduled for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFile {
    pub path: PathBuf,
    /// Month tag from the file name, e.g. `JANEIRO` in `extrato-JANEIRO.pdf`.
    pub mes: String,
}

/// Read the month tag out of a statement file name.
///
/// The tag is the segment after the first `-`, ending at the next `-` or
/// `.`. `extrato-JANEIRO.pdf` tags `JANEIRO`; `extrato-2024-JANEIRO.pdf`
/// tags `2024`, so keep the month as the only dashed segment.
pub fn month_tag(file_name: &str) -> Option<&str> {
    let rest = file_name.split_once('-')?.1;
    let end = rest.find(['-', '.']).unwrap_or(rest.len());
    let tag = &rest[..end];
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

/// Open `path` and confirm the `%PDF` prefix.
///
/// A file too short to carry the prefix passes; extraction reports those
/// as corrupt with more detail than four bytes can give.
fn check_pdf_magic(path: &Path) -> Result<(), ExtratoError> {
    use std::io::Read;

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtratoError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(_) => {
            return Err(ExtratoError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
    };

    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) if &magic != b"%PDF" => Err(ExtratoError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        }),
        _ => Ok(()),
    }
}

/// Resolve a statement path, validating readability, the `%PDF` prefix and
/// the month tag in the file name.
pub fn resolve_statement(path: impl Into<PathBuf>) -> Result<StatementFile, ExtratoError> {
    let path = path.into();
    check_pdf_magic(&path)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let mes = match month_tag(file_name) {
        Some(tag) => tag.to_string(),
        None => return Err(ExtratoError::MonthTagMissing { path }),
    };

    debug!("Resolved statement: {} (mes={})", path.display(), mes);
    Ok(StatementFile { path, mes })
}

/// Collect statement files from a directory (or accept a single file).
///
/// Directory scans take every `*.pdf` entry in file-name order, so the
/// run is deterministic regardless of filesystem enumeration order.
pub fn collect_statements(input: impl AsRef<Path>) -> Result<Vec<StatementFile>, ExtratoError> {
    let input = input.as_ref();

    if input.is_file() {
        return Ok(vec![resolve_statement(input)?]);
    }
    if !input.is_dir() {
        return Err(ExtratoError::FileNotFound {
            path: input.to_path_buf(),
        });
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(input)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                ExtratoError::PermissionDenied {
                    path: input.to_path_buf(),
                }
            } else {
                ExtratoError::FileNotFound {
                    path: input.to_path_buf(),
                }
            }
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("pdf"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(ExtratoError::NoStatements {
            path: input.to_path_buf(),
        });
    }

    paths.into_iter().map(resolve_statement).collect()
}

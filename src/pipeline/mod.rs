//! Pipeline stages for statement-PDF-to-ledger conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch PDF text backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ reconcile ──▶ normalize
//! (path+tag)  (raw rows)  (records)     (transactions)
//! ```
//!
//! 1. [`input`]     — resolve statement files and their month tags
//! 2. [`extract`]   — pull the PDF text layer apart into raw 5-cell rows,
//!    discarding blank lines and page boilerplate
//! 3. [`reconcile`] — merge description continuations into their dated row
//!    and split rows that pack several dated movements into one
//! 4. [`normalize`] — parse dates and locale amounts, map movement markers
//!    to `credito`/`debito`

pub mod extract;
pub mod input;
pub mod normalize;
pub mod reconcile;

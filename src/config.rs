//! Configuration types for the statement-to-ledger pipeline.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share a config across a run, log it, and diff two runs to
//! understand why their ledgers differ.

use crate::error::ExtratoError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for one pipeline run.
///
/// Built via [`PipelineConfig::builder()`] or using
/// [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use extrato2csv::{NullDatePolicy, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .denylist(vec!["Saldo Anterior".into(), "Saldo Final".into()])
///     .null_dates(NullDatePolicy::Drop)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Terms that exclude a record when any of its fields contains one,
    /// case-insensitive. Default: `["Saldo Anterior"]`.
    ///
    /// Opening-balance lines look exactly like transactions (dated, with an
    /// amount) but are account state, not movements; they must never reach
    /// the ledger.
    pub denylist: Vec<String>,

    /// Case-insensitive markers identifying presentation-header content.
    ///
    /// Statement PDFs repeat column headers and account boilerplate on every
    /// page. Lines containing a marker are skipped at extraction, and any
    /// record still carrying one after reconciliation is removed. The
    /// defaults mirror the issuing bank's boilerplate and will need
    /// adjustment for statements from a different bank.
    pub header_markers: Vec<String>,

    /// Ordered keyword → category rules, first match wins.
    ///
    /// Evaluation order matters: keywords overlap (`PAGAMENTO` contains
    /// nothing of `PIX`, but a description can contain both) and the first
    /// rule in the list decides. Matching is case-sensitive; statement
    /// descriptions are upper-case. Default: [`default_category_rules`].
    pub category_rules: Vec<CategoryRule>,

    /// Where records with unparseable dates sort. Default: [`NullDatePolicy::Last`].
    pub null_dates: NullDatePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            denylist: vec!["Saldo Anterior".to_string()],
            header_markers: default_header_markers(),
            category_rules: default_category_rules(),
            null_dates: NullDatePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Replace the denylist entirely.
    pub fn denylist(mut self, terms: Vec<String>) -> Self {
        self.config.denylist = terms;
        self
    }

    /// Add one denylist term on top of the current list.
    pub fn deny(mut self, term: impl Into<String>) -> Self {
        self.config.denylist.push(term.into());
        self
    }

    /// Replace the presentation-header markers.
    pub fn header_markers(mut self, markers: Vec<String>) -> Self {
        self.config.header_markers = markers;
        self
    }

    /// Replace the category rules (order is significant).
    pub fn category_rules(mut self, rules: Vec<CategoryRule>) -> Self {
        self.config.category_rules = rules;
        self
    }

    pub fn null_dates(mut self, policy: NullDatePolicy) -> Self {
        self.config.null_dates = policy;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, ExtratoError> {
        let c = &self.config;
        if c.denylist.iter().any(|t| t.trim().is_empty()) {
            return Err(ExtratoError::InvalidConfig(
                "denylist terms must be non-empty".into(),
            ));
        }
        for rule in &c.category_rules {
            if rule.keyword.is_empty() {
                return Err(ExtratoError::InvalidConfig(format!(
                    "category rule for '{}' has an empty keyword",
                    rule.label
                )));
            }
            if rule.label.is_empty() {
                return Err(ExtratoError::InvalidConfig(format!(
                    "category rule '{}' has an empty label",
                    rule.keyword
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Category rules ───────────────────────────────────────────────────────

/// One keyword → category mapping.
///
/// Rules are evaluated in list order; the first keyword found as a substring
/// of the description wins. Descriptions that match no rule fall back to
/// `"Outros"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keyword: String,
    pub label: String,
}

impl CategoryRule {
    pub fn new(keyword: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            label: label.into(),
        }
    }
}

/// The built-in rules, in evaluation order.
pub fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("PAGAMENTO", "Pagamentos"),
        CategoryRule::new("PIX", "Transferências PIX"),
        CategoryRule::new("COBRANCA", "Cobranças"),
        CategoryRule::new("APL", "Aplicações"),
        CategoryRule::new("RESGATE", "Resgates"),
        CategoryRule::new("TARIFA", "Tarifas"),
        CategoryRule::new("SAQUE", "Saques"),
    ]
}

fn default_header_markers() -> Vec<String> {
    vec![
        "Extrato de Conta".to_string(),
        "Lançamentos do período".to_string(),
        "Data Histórico".to_string(),
        "Agência".to_string(),
        "Página".to_string(),
    ]
}

/// Load category rules from a JSON array file, preserving order.
///
/// Expected shape: `[{"keyword": "PIX", "label": "Transferências PIX"}, …]`.
pub fn load_category_rules(path: impl AsRef<Path>) -> Result<Vec<CategoryRule>, ExtratoError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        ExtratoError::InvalidConfig(format!(
            "cannot read category rules file '{}': {e}",
            path.display()
        ))
    })?;
    let rules: Vec<CategoryRule> =
        serde_json::from_str(&content).map_err(|e| ExtratoError::InvalidConfig(format!(
            "category rules file '{}': {e}",
            path.display()
        )))?;
    Ok(rules)
}

// ── Null-date policy ─────────────────────────────────────────────────────

/// Where records whose date text failed to parse end up in the sorted ledger.
///
/// Invalid dates arise from multi-date splits: the split assigns shape-valid
/// date tokens without checking the calendar, so `31/02/2024` survives
/// reconciliation and parses to nothing. Such records are real movements
/// with an unusable date, which is why they are kept by default rather than
/// silently discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NullDatePolicy {
    /// Sort after all dated records, preserving relative order. (default)
    #[default]
    Last,
    /// Sort before all dated records, preserving relative order.
    First,
    /// Remove them from the ledger.
    Drop,
}

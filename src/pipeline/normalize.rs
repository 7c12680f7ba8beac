//! Field normalization: locale text to typed values, and back for output.
//!
//! Statements format amounts Brazilian-style (`.` thousands, `,` decimals)
//! and mark direction with a `+`/`-` column rather than a signed amount.
//! Each rule here is a small pure function so the aggregator can reuse the
//! exact same amount parsing on CSV it reads back in.

use crate::config::CategoryRule;
use crate::ledger::TipoLancamento;
use chrono::NaiveDate;

/// Parse a locale-formatted amount (`1.234,56`) into a float.
///
/// Strips stray CSV quotes, drops `.` thousands separators, then swaps the
/// decimal comma for a dot. The sign is kept as written; direction comes
/// from the movement marker, never from the amount.
pub fn parse_valor(text: &str) -> Option<f64> {
    let cleaned = text.replace(['"', '.'], "").replace(',', ".");
    cleaned.trim().parse::<f64>().ok()
}

/// Format an amount back into locale text, two decimal places.
pub fn format_valor(valor: f64) -> String {
    let plain = format!("{valor:.2}");
    let (sign, rest) = plain
        .strip_prefix('-')
        .map_or(("", plain.as_str()), |r| ("-", r));
    let (int_part, frac) = rest.split_once('.').unwrap_or((rest, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped},{frac}")
}

/// Map a movement marker to its category, tolerating pre-normalized text.
///
/// `+` is a credit and `-` a debit; text already reading
/// `credito`/`debito` passes through after case/space normalization.
/// Anything else is unrecognized and the record carrying it is dropped.
pub fn normalize_tipo(text: &str) -> Option<TipoLancamento> {
    match text.trim() {
        "+" => Some(TipoLancamento::Credito),
        "-" => Some(TipoLancamento::Debito),
        other => match other.to_lowercase().as_str() {
            "credito" => Some(TipoLancamento::Credito),
            "debito" => Some(TipoLancamento::Debito),
            _ => None,
        },
    }
}

/// Parse `dd/mm/yyyy` text into a date, `None` when it is not a real
/// calendar date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%d/%m/%Y").ok()
}

/// Pick the category for a description: first rule whose keyword occurs in
/// the text wins, case-sensitive, falling back to `"Outros"`.
pub fn categorize<'a>(descricao: &str, rules: &'a [CategoryRule]) -> &'a str {
    rules
        .iter()
        .find(|r| descricao.contains(&r.keyword))
        .map_or("Outros", |r| r.label.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_category_rules;

    #[test]
    fn parse_valor_handles_locale_formats() {
        assert_eq!(parse_valor("1.234,56"), Some(1234.56));
        assert_eq!(parse_valor("100,00"), Some(100.0));
        assert_eq!(parse_valor("\"2.500,00\""), Some(2500.0));
        assert_eq!(parse_valor("-50,00"), Some(-50.0));
        assert_eq!(parse_valor(" 10,00 "), Some(10.0));
        assert_eq!(parse_valor("1.234"), Some(1234.0));
    }

    #[test]
    fn parse_valor_rejects_garbage() {
        assert_eq!(parse_valor(""), None);
        assert_eq!(parse_valor("abc"), None);
        assert_eq!(parse_valor("10,00 20,00"), None);
    }

    #[test]
    fn format_valor_groups_thousands() {
        assert_eq!(format_valor(1234.56), "1.234,56");
        assert_eq!(format_valor(100.0), "100,00");
        assert_eq!(format_valor(1000.0), "1.000,00");
        assert_eq!(format_valor(1234567.89), "1.234.567,89");
        assert_eq!(format_valor(0.5), "0,50");
        assert_eq!(format_valor(-50.0), "-50,00");
    }

    #[test]
    fn valor_round_trips_within_tolerance() {
        for v in [0.01, 1.0, 999.99, 1000.0, 1234.56, 1234567.89, 12.3] {
            let text = format_valor(v);
            let back = parse_valor(&text).unwrap();
            assert!((back - v).abs() < 1e-9, "{v} -> {text} -> {back}");
        }
    }

    #[test]
    fn tipo_maps_signs_and_passes_normalized_text() {
        assert_eq!(normalize_tipo("+"), Some(TipoLancamento::Credito));
        assert_eq!(normalize_tipo("-"), Some(TipoLancamento::Debito));
        assert_eq!(normalize_tipo("credito"), Some(TipoLancamento::Credito));
        assert_eq!(normalize_tipo(" CREDITO "), Some(TipoLancamento::Credito));
        assert_eq!(normalize_tipo("Debito"), Some(TipoLancamento::Debito));
    }

    #[test]
    fn tipo_rejects_unknown_markers() {
        assert_eq!(normalize_tipo(""), None);
        assert_eq!(normalize_tipo("x"), None);
        assert_eq!(normalize_tipo("- -"), None);
    }

    #[test]
    fn parse_date_requires_a_real_calendar_date() {
        assert_eq!(
            parse_date("05/01/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(parse_date("31/02/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn categorize_respects_rule_order() {
        let rules = default_category_rules();
        // PAGAMENTO comes before PIX, so it wins even when both occur
        assert_eq!(categorize("PAGAMENTO PIX JOAO", &rules), "Pagamentos");
        assert_eq!(categorize("PIX JOAO", &rules), "Transferências PIX");
    }

    #[test]
    fn categorize_is_case_sensitive_with_outros_fallback() {
        let rules = default_category_rules();
        assert_eq!(categorize("pagamento pix", &rules), "Outros");
        assert_eq!(categorize("DEPOSITO EM CONTA", &rules), "Outros");
    }
}

//! Consumption-column detection and unit conversion. The column is found by
//! name vocabulary alone; the unit comes from a token embedded in the name,
//! and absent any token the values are assumed to already be kWh.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::detect::normalize_name;
use crate::error::NormalizeError;
use crate::table::{Cell, WorkingTable};

/// Vocabulary indicating an energy-consumption column, matched as a
/// substring of the normalized column name. Terms that directly mean
/// consumed energy outrank power/load wording, which in turn outranks a
/// bare unit token.
const PRIMARY_KEYWORDS: &[&str] = &["consumption", "verbrauch", "energy", "energie"];
const SECONDARY_KEYWORDS: &[&str] = &["load", "leistung", "power"];

/// Unit token anywhere in the name, delimited by non-letters so that
/// `Verbrauch_kWh` and `Leistung (kW)` both match but `kw` inside a longer
/// word does not. Longest tokens listed first.
static UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^a-z])(mwh|kwh|wh|mw|kw|w)(?:[^a-z]|$)").expect("unit regex")
});

/// A recognized unit token and its multiplicative factor into kWh.
/// Baseline is plain unit-scale conversion (powers of 1000); sampling
/// intervals play no part here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitHint {
    #[serde(rename = "W")]
    W,
    #[serde(rename = "kW")]
    Kw,
    #[serde(rename = "MW")]
    Mw,
    #[serde(rename = "Wh")]
    Wh,
    #[serde(rename = "kWh")]
    Kwh,
    #[serde(rename = "MWh")]
    Mwh,
    #[serde(rename = "unknown")]
    Unknown,
}

impl UnitHint {
    pub fn factor_to_kwh(self) -> f64 {
        match self {
            UnitHint::W | UnitHint::Wh => 0.001,
            UnitHint::Kw | UnitHint::Kwh | UnitHint::Unknown => 1.0,
            UnitHint::Mw | UnitHint::Mwh => 1000.0,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            UnitHint::W => "W",
            UnitHint::Kw => "kW",
            UnitHint::Mw => "MW",
            UnitHint::Wh => "Wh",
            UnitHint::Kwh => "kWh",
            UnitHint::Mwh => "MWh",
            UnitHint::Unknown => "unknown",
        }
    }
}

/// Parse the unit token embedded in a column name, if any.
pub fn parse_unit_hint(name: &str) -> UnitHint {
    let normalized = normalize_name(name);
    match UNIT_RE
        .captures(&normalized)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    {
        Some("w") => UnitHint::W,
        Some("kw") => UnitHint::Kw,
        Some("mw") => UnitHint::Mw,
        Some("wh") => UnitHint::Wh,
        Some("kwh") => UnitHint::Kwh,
        Some("mwh") => UnitHint::Mwh,
        _ => UnitHint::Unknown,
    }
}

/// Score a column name's consumption-likeness. Keyword hits dominate; a
/// bare unit token still qualifies a column on its own.
pub(crate) fn name_score(name: &str) -> usize {
    let normalized = normalize_name(name);
    let primary = PRIMARY_KEYWORDS
        .iter()
        .filter(|kw| normalized.contains(*kw))
        .count();
    let secondary = SECONDARY_KEYWORDS
        .iter()
        .filter(|kw| normalized.contains(*kw))
        .count();
    let unit_hit = usize::from(UNIT_RE.is_match(&normalized));
    4 * primary + 2 * secondary + unit_hit
}

/// The single best-matching consumption column, or `None` when nothing
/// qualifies. `None` is a reportable, non-fatal condition for the caller.
pub fn detect_consumption_column(table: &WorkingTable) -> Option<String> {
    let mut best: Option<(&String, usize)> = None;
    for name in table.column_names() {
        let score = name_score(name);
        if score == 0 {
            continue;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((name, score));
        }
    }
    let found = best.map(|(name, _)| name.clone());
    match &found {
        Some(name) => debug!(column = %name, "detected consumption column"),
        None => debug!("no consumption column detected"),
    }
    found
}

/// Convert the named column into kWh. Numeric cells (and numeric-looking
/// text, including comma decimal separators) are scaled by the unit factor;
/// anything else becomes an empty cell, never zero. The table itself is not
/// mutated; the caller writes the series back under the canonical name.
pub fn to_kwh(
    table: &WorkingTable,
    column: &str,
) -> Result<(Vec<Cell>, UnitHint), NormalizeError> {
    let cells = table
        .column(column)
        .ok_or_else(|| NormalizeError::MissingColumn {
            columns: vec![column.to_string()],
        })?;

    let hint = parse_unit_hint(column);
    let factor = hint.factor_to_kwh();
    let converted = cells
        .into_iter()
        .map(|cell| {
            let value = match cell {
                Cell::Number(n) => Some(*n),
                Cell::Text(s) => parse_numeric_text(s),
                _ => None,
            };
            match value {
                Some(v) => Cell::Number(v * factor),
                None => Cell::Empty,
            }
        })
        .collect();
    Ok((converted, hint))
}

/// Parse real-world numeric text: strips spaces, accepts comma decimal
/// separators and mixed thousands marks ("1.234,56" and "1,234.56").
fn parse_numeric_text(raw: &str) -> Option<f64> {
    let s: String = raw.trim().chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() {
        return None;
    }
    let normalized = match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) if dot > comma => s.replace(',', ""),
        (Some(_), Some(_)) => s.replace('.', "").replace(',', "."),
        (None, Some(_)) => s.replace(',', "."),
        _ => s,
    };
    normalized.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txt(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn table(names: &[&str], rows: Vec<Vec<Cell>>) -> WorkingTable {
        WorkingTable::new(names.iter().map(|s| s.to_string()).collect(), rows)
    }

    #[test]
    fn unit_hints_from_names() {
        assert_eq!(parse_unit_hint("Verbrauch (kWh)"), UnitHint::Kwh);
        assert_eq!(parse_unit_hint("Leistung in kW"), UnitHint::Kw);
        assert_eq!(parse_unit_hint("power_w"), UnitHint::W);
        assert_eq!(parse_unit_hint("Energy [MWh]"), UnitHint::Mwh);
        assert_eq!(parse_unit_hint("Verbrauch"), UnitHint::Unknown);
        // no token inside a longer word
        assert_eq!(parse_unit_hint("Kraftwerk"), UnitHint::Unknown);
    }

    #[test]
    fn detection_prefers_keyword_over_bare_unit() {
        let t = table(
            &["Datum", "Leistung (kW)", "Verbrauch (kWh)"],
            vec![vec![txt("x"), Cell::Number(1.0), Cell::Number(2.0)]],
        );
        assert_eq!(
            detect_consumption_column(&t).as_deref(),
            Some("Verbrauch (kWh)")
        );
    }

    #[test]
    fn detection_miss_is_none() {
        let t = table(&["Datum", "Zählpunkt"], vec![]);
        assert_eq!(detect_consumption_column(&t), None);
    }

    #[test]
    fn watts_scale_down_by_a_thousand() {
        let t = table(&["Verbrauch (W)"], vec![vec![Cell::Number(1000.0)]]);
        let (series, hint) = to_kwh(&t, "Verbrauch (W)").unwrap();
        assert_eq!(hint, UnitHint::W);
        assert_eq!(series, vec![Cell::Number(1.0)]);
    }

    #[test]
    fn unknown_unit_passes_values_through() {
        let t = table(&["Verbrauch"], vec![vec![Cell::Number(2.5)]]);
        let (series, hint) = to_kwh(&t, "Verbrauch").unwrap();
        assert_eq!(hint, UnitHint::Unknown);
        assert_eq!(series, vec![Cell::Number(2.5)]);
    }

    #[test]
    fn numeric_text_and_garbage_cells() {
        let t = table(
            &["consumption kwh"],
            vec![
                vec![txt("1.234,5")],
                vec![txt("2,5")],
                vec![txt("n/a")],
                vec![Cell::Empty],
            ],
        );
        let (series, _) = to_kwh(&t, "consumption kwh").unwrap();
        assert_eq!(series[0], Cell::Number(1234.5));
        assert_eq!(series[1], Cell::Number(2.5));
        // non-numeric maps to empty, not zero
        assert_eq!(series[2], Cell::Empty);
        assert_eq!(series[3], Cell::Empty);
    }

    #[test]
    fn missing_column_is_structural() {
        let t = table(&["a"], vec![]);
        assert!(matches!(
            to_kwh(&t, "consumption_kwh"),
            Err(NormalizeError::MissingColumn { .. })
        ));
    }
}

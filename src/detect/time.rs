//! Time-column candidate detection. The core contract is name-based only:
//! cell values are never consulted to build the candidate list. A
//! best-effort value classifier is offered on top for callers that want a
//! hint about each candidate's shape, but it is advisory and never changes
//! the candidate set.

use serde::Serialize;
use tracing::debug;

use crate::detect::normalize_name;
use crate::table::{Cell, WorkingTable};

/// Multilingual keywords indicating a time or date role, matched as
/// substrings of the normalized column name.
const TIME_KEYWORDS: &[&str] = &[
    "time",
    "date",
    "datum",
    "timestamp",
    "zeit",
    "uhrzeit",
    "datetime",
    "from",
    "to",
    "von",
    "bis",
    "ab",
];

pub(crate) fn has_time_keyword(name: &str) -> bool {
    let normalized = normalize_name(name);
    TIME_KEYWORDS.iter().any(|kw| normalized.contains(kw))
}

/// Every column whose name carries a time keyword, in source column order.
pub fn detect_time_columns(table: &WorkingTable) -> Vec<String> {
    let candidates: Vec<String> = table
        .column_names()
        .iter()
        .filter(|name| has_time_keyword(name))
        .cloned()
        .collect();
    debug!(count = candidates.len(), "time candidates detected");
    candidates
}

/// Advisory value-shape bucket for a time candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeShape {
    /// Values are already genuine point-in-time values.
    Timestamp,
    /// Numeric-looking values; possibly an epoch or a serial date.
    Numeric,
    /// Free text that needs format-based parsing.
    Text,
}

const SHAPE_SAMPLE: usize = 20;

/// Bucket each candidate by sampling its values. Best effort: absent
/// columns are skipped, empty columns default to `Text`, and the result
/// never overrides the name-based candidate list.
pub fn classify_candidates(
    table: &WorkingTable,
    candidates: &[String],
) -> Vec<(String, TimeShape)> {
    candidates
        .iter()
        .filter_map(|name| {
            let cells = table.column(name)?;
            let shape = classify_cells(&cells);
            Some((name.clone(), shape))
        })
        .collect()
}

fn classify_cells(cells: &[&Cell]) -> TimeShape {
    let mut timestamps = 0usize;
    let mut numerics = 0usize;
    let mut texts = 0usize;
    for cell in cells.iter().filter(|c| !c.is_empty()).take(SHAPE_SAMPLE) {
        match cell {
            Cell::DateTime(_) => timestamps += 1,
            Cell::Number(_) => numerics += 1,
            Cell::Text(s) => {
                if s.trim().parse::<f64>().is_ok() {
                    numerics += 1;
                } else {
                    texts += 1;
                }
            }
            Cell::Empty => {}
        }
    }
    if timestamps >= numerics && timestamps >= texts && timestamps > 0 {
        TimeShape::Timestamp
    } else if numerics > texts {
        TimeShape::Numeric
    } else {
        TimeShape::Text
    }
}

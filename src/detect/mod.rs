//! Column-role detection. Each detector is a stateless classifier over a
//! table snapshot: a pure function from column name (and optionally sampled
//! values) to a tagged role, never a mutation of the table itself.

pub mod consumption;
pub mod header;
pub mod time;

use serde::Serialize;

/// Derived classification of a column name, computed per invocation and
/// never stored on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnRole {
    Consumption,
    TimeCandidate,
    Unclassified,
}

/// Classify a single column name. Consumption vocabulary wins over time
/// keywords, mirroring the order the pipeline commits its decisions in.
pub fn classify_column(name: &str) -> ColumnRole {
    if consumption::name_score(name) > 0 {
        ColumnRole::Consumption
    } else if time::has_time_keyword(name) {
        ColumnRole::TimeCandidate
    } else {
        ColumnRole::Unclassified
    }
}

/// Shared name normalization for keyword matching.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

//! Timestamp synthesis: build the canonical `moment` column from either a
//! single combined date+time column or a nominated date + hour pair. The
//! strategy is a closed set selected by the caller's configuration, not by
//! runtime type inspection.

pub mod pair;
pub mod single;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::NormalizeError;
use crate::table::{WorkingTable, MOMENT_COLUMN};

/// Caller-selected synthesis strategy, chosen after inspecting the
/// detected time candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MomentStrategy {
    /// One column already encodes date and time together.
    SingleColumn { column: String },
    /// Two columns: one holds the calendar date, the other the time of day.
    DateAndHour {
        date_column: String,
        hour_column: String,
    },
}

/// Per-strategy success rates, reported so the caller can surface partial
/// failure and decide whether to retry with a different column choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SynthesisRates {
    /// Fraction of non-missing rows split into date and hour parts.
    /// Only the single-column strategy has a distinct extraction step.
    pub extract_rate: Option<f64>,
    /// Fraction of all rows whose `moment` parsed successfully.
    pub moment_rate: f64,
}

/// Run the selected strategy, producing the table with its new `moment`
/// column and the achieved rates. Rows that fail to parse carry an empty
/// `moment`, never an error and never a dropped row.
pub fn synthesize(
    table: WorkingTable,
    strategy: &MomentStrategy,
) -> Result<(WorkingTable, SynthesisRates), NormalizeError> {
    match strategy {
        MomentStrategy::SingleColumn { column } => {
            let (table, extract_rate) = single::extract_date_and_hour(table, column)?;
            let (table, moment_rate) = pair::create_moment(
                table,
                single::DATE_NORM_COLUMN,
                single::HOUR_NORM_COLUMN,
                MOMENT_COLUMN,
            )?;
            Ok((
                table,
                SynthesisRates {
                    extract_rate: Some(extract_rate),
                    moment_rate,
                },
            ))
        }
        MomentStrategy::DateAndHour {
            date_column,
            hour_column,
        } => {
            let table = pair::normalize_date(table, date_column)?;
            let table = pair::normalize_hour(table, hour_column)?;
            let (table, moment_rate) =
                pair::create_moment(table, date_column, hour_column, MOMENT_COLUMN)?;
            Ok((
                table,
                SynthesisRates {
                    extract_rate: None,
                    moment_rate,
                },
            ))
        }
    }
}

/// Calendar-date formats seen in real exports, day-first preferred.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d.%m.%y",
    "%d/%m/%y",
];

/// Combined date+time formats, including the comma-joined shape
/// ("01.01.2024, 00:00:00") that smart-meter portals export.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y, %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y, %H:%M",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Free interpretation of a textual calendar date: plain date formats
/// first, then the date part of a full datetime string.
pub(crate) fn parse_date_text(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    parse_datetime_text(s).map(|dt| dt.date())
}

pub(crate) fn parse_datetime_text(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_formats_cover_common_exports() {
        let expect = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        for raw in ["2024-01-02", "02.01.2024", "02/01/2024", "02.01.24"] {
            assert_eq!(parse_date_text(raw), Some(expect), "failed for {raw}");
        }
        // date part of a full datetime string is accepted
        assert_eq!(parse_date_text("02.01.2024 13:45:00"), Some(expect));
        assert_eq!(parse_date_text("not a date"), None);
    }

    #[test]
    fn datetime_formats_cover_comma_joined_exports() {
        let expect = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        for raw in [
            "2024-01-01 00:00:00",
            "2024-01-01T00:00:00",
            "01.01.2024, 00:00:00",
            "01.01.2024 00:00",
        ] {
            assert_eq!(parse_datetime_text(raw), Some(expect), "failed for {raw}");
        }
    }
}

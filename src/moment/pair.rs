//! Strategy B: the caller nominated one date column and one hour column.
//! Each is normalized to a canonical string form independently, then the
//! pair is merged into the `moment` timestamp. Every step is a total
//! function over rows: unparseable cells become empty markers, and only a
//! column that fails in every row is an error.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::NormalizeError;
use crate::moment::parse_date_text;
use crate::table::{Cell, WorkingTable};

/// Normalize the date column to `YYYY-MM-DD` strings. Datetime cells
/// reformat directly; text cells parse under common date encodings.
/// Fails only if every non-missing value fails to parse.
pub fn normalize_date(
    table: WorkingTable,
    date_column: &str,
) -> Result<WorkingTable, NormalizeError> {
    let idx = table
        .column_index(date_column)
        .ok_or_else(|| NormalizeError::MissingColumn {
            columns: vec![date_column.to_string()],
        })?;

    let mut non_missing = 0usize;
    let mut parsed = 0usize;
    let (names, mut rows) = table.into_parts();
    for row in &mut rows {
        let cell = &row[idx];
        if cell.is_empty() {
            continue;
        }
        non_missing += 1;
        let date = match cell {
            Cell::DateTime(dt) => Some(dt.date()),
            Cell::Text(s) => parse_date_text(s),
            _ => None,
        };
        row[idx] = match date {
            Some(d) => {
                parsed += 1;
                Cell::Text(d.format("%Y-%m-%d").to_string())
            }
            None => Cell::Empty,
        };
    }

    if non_missing > 0 && parsed == 0 {
        return Err(NormalizeError::DateParse {
            column: date_column.to_string(),
        });
    }
    debug!(column = date_column, parsed, non_missing, "date column normalized");
    Ok(WorkingTable::new(names, rows))
}

/// Normalize the hour column to `HH:MM:SS` strings under the deterministic
/// per-cell rule set. Fails only if every non-missing value fails.
pub fn normalize_hour(
    table: WorkingTable,
    hour_column: &str,
) -> Result<WorkingTable, NormalizeError> {
    let idx = table
        .column_index(hour_column)
        .ok_or_else(|| NormalizeError::MissingColumn {
            columns: vec![hour_column.to_string()],
        })?;

    let mut non_missing = 0usize;
    let mut parsed = 0usize;
    let (names, mut rows) = table.into_parts();
    for row in &mut rows {
        let cell = &row[idx];
        if cell.is_empty() {
            continue;
        }
        non_missing += 1;
        let normalized = match cell {
            Cell::DateTime(dt) => Some(dt.format("%H:%M:%S").to_string()),
            Cell::Text(s) => to_hhmmss(s),
            Cell::Number(n) => to_hhmmss(&format!("{}", n)),
            Cell::Empty => None,
        };
        row[idx] = match normalized {
            Some(s) => {
                parsed += 1;
                Cell::Text(s)
            }
            None => Cell::Empty,
        };
    }

    if non_missing > 0 && parsed == 0 {
        return Err(NormalizeError::HourParse {
            column: hour_column.to_string(),
        });
    }
    debug!(column = hour_column, parsed, non_missing, "hour column normalized");
    Ok(WorkingTable::new(names, rows))
}

// ASCII-only: unicode digits must not survive into the byte-sliced runs
static NON_DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]+").expect("non-digit regex"));

/// Deterministic text-to-time rules: squash runs of non-digits to a single
/// separator; a surviving pure digit run is read as HHMMSS / HHMM / H MM /
/// hour-only by length; separated parts are H:M or H:M:S. Ranges are
/// validated, never clamped.
fn to_hhmmss(raw: &str) -> Option<String> {
    let squashed = NON_DIGIT_RE.replace_all(raw.trim(), ":");
    let squashed = squashed.trim_matches(':');
    if squashed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = squashed.split(':').collect();
    let (h, m, s) = match parts.as_slice() {
        [digits] => match digits.len() {
            6 => (&digits[0..2], &digits[2..4], &digits[4..6]),
            4 => (&digits[0..2], &digits[2..4], "00"),
            3 => (&digits[0..1], &digits[1..3], "00"),
            1 | 2 => (*digits, "00", "00"),
            _ => return None,
        },
        [h, m] => (*h, *m, "00"),
        [h, m, s, ..] => (*h, *m, *s),
        [] => return None,
    };

    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    let s: u32 = s.parse().ok()?;
    if h > 23 || m > 59 || s > 59 {
        return None;
    }
    Some(format!("{:02}:{:02}:{:02}", h, m, s))
}

/// Join the normalized date and hour strings with a single space, parse the
/// result under the fixed `YYYY-MM-DD HH:MM:SS` format, and write it to
/// `out_name`. Returns the fraction of rows that parsed (0 for an empty
/// table). A row with either part invalid gets an empty moment, never an
/// error.
pub fn create_moment(
    table: WorkingTable,
    date_column: &str,
    hour_column: &str,
    out_name: &str,
) -> Result<(WorkingTable, f64), NormalizeError> {
    let date_idx = table.column_index(date_column);
    let hour_idx = table.column_index(hour_column);
    let missing: Vec<String> = [(date_column, date_idx), (hour_column, hour_idx)]
        .iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(NormalizeError::MissingColumn { columns: missing });
    }
    let (date_idx, hour_idx) = (date_idx.unwrap(), hour_idx.unwrap());

    let total = table.num_rows();
    let mut parsed = 0usize;
    let moments: Vec<Cell> = table
        .rows()
        .iter()
        .map(|row| {
            let combined = match (row[date_idx].as_text(), row[hour_idx].as_text()) {
                (Some(d), Some(h)) => format!("{} {}", d, h),
                _ => return Cell::Empty,
            };
            match NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M:%S") {
                Ok(dt) => {
                    parsed += 1;
                    Cell::DateTime(dt)
                }
                Err(_) => Cell::Empty,
            }
        })
        .collect();

    let rate = if total == 0 {
        0.0
    } else {
        parsed as f64 / total as f64
    };
    debug!(out = out_name, rate, "moment column created");
    Ok((table.with_column(out_name, moments), rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txt(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn one_col(name: &str, cells: Vec<Cell>) -> WorkingTable {
        WorkingTable::new(vec![name.to_string()], cells.into_iter().map(|c| vec![c]).collect())
    }

    #[test]
    fn hour_rule_table() {
        let cases = [
            ("093000", Some("09:30:00")),
            ("0930", Some("09:30:00")),
            ("930", Some("09:30:00")),
            ("9", Some("09:00:00")),
            ("09", Some("09:00:00")),
            ("9:30", Some("09:30:00")),
            ("9.30.15", Some("09:30:15")),
            ("25:00", None),
            ("9:61", None),
            ("", None),
            ("abc", None),
            ("12345", None),
        ];
        for (input, expected) in cases {
            assert_eq!(
                to_hhmmss(input),
                expected.map(str::to_string),
                "failed for {input:?}"
            );
        }
    }

    #[test]
    fn numeric_hour_cells_run_through_the_same_rules() {
        // Excel sometimes types clock values numerically
        let t = one_col(
            "Uhrzeit",
            vec![Cell::Number(930.0), Cell::Number(2300.0), Cell::Number(9.0)],
        );
        let t = normalize_hour(t, "Uhrzeit").unwrap();
        let col = t.column("Uhrzeit").unwrap();
        assert_eq!(col[0], &txt("09:30:00"));
        assert_eq!(col[1], &txt("23:00:00"));
        assert_eq!(col[2], &txt("09:00:00"));
    }

    #[test]
    fn date_normalization_handles_mixed_cells() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let t = one_col(
            "Datum",
            vec![Cell::DateTime(dt), txt("06.03.2024"), txt("garbage"), Cell::Empty],
        );
        let t = normalize_date(t, "Datum").unwrap();
        let col = t.column("Datum").unwrap();
        assert_eq!(col[0], &txt("2024-03-05"));
        assert_eq!(col[1], &txt("2024-03-06"));
        // partial failure tolerated as an invalid marker
        assert_eq!(col[2], &Cell::Empty);
        assert_eq!(col[3], &Cell::Empty);
    }

    #[test]
    fn total_date_failure_is_fatal() {
        let t = one_col("Datum", vec![txt("xx"), txt("yy")]);
        assert!(matches!(
            normalize_date(t, "Datum"),
            Err(NormalizeError::DateParse { column }) if column == "Datum"
        ));
    }

    #[test]
    fn all_missing_date_column_is_not_total_failure() {
        let t = one_col("Datum", vec![Cell::Empty, Cell::Empty]);
        assert!(normalize_date(t, "Datum").is_ok());
    }

    #[test]
    fn total_hour_failure_is_fatal() {
        let t = one_col("Uhrzeit", vec![txt("abc"), txt("99:99")]);
        assert!(matches!(
            normalize_hour(t, "Uhrzeit"),
            Err(NormalizeError::HourParse { column }) if column == "Uhrzeit"
        ));
    }

    #[test]
    fn moment_round_trip_single_row() {
        let t = WorkingTable::new(
            vec!["d".into(), "h".into()],
            vec![vec![txt("2024-01-01"), txt("00:00:00")]],
        );
        let (t, rate) = create_moment(t, "d", "h", "moment").unwrap();
        assert_eq!(rate, 1.0);
        let expect = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(t.column("moment").unwrap()[0], &Cell::DateTime(expect));

        // round-trip stability: re-serializing and re-parsing is lossless
        let rendered = expect.format("%Y-%m-%d %H:%M:%S").to_string();
        assert_eq!(
            NaiveDateTime::parse_from_str(&rendered, "%Y-%m-%d %H:%M:%S").unwrap(),
            expect
        );
    }

    #[test]
    fn moment_rate_reflects_partial_failure() {
        let t = WorkingTable::new(
            vec!["d".into(), "h".into()],
            vec![
                vec![txt("2024-01-01"), txt("00:15:00")],
                vec![Cell::Empty, txt("00:30:00")],
            ],
        );
        let (t, rate) = create_moment(t, "d", "h", "moment").unwrap();
        assert_eq!(rate, 0.5);
        // the failed row survives with an empty moment
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.column("moment").unwrap()[1], &Cell::Empty);
    }

    #[test]
    fn moment_rate_is_zero_for_empty_table() {
        let t = WorkingTable::new(vec!["d".into(), "h".into()], vec![]);
        let (_, rate) = create_moment(t, "d", "h", "moment").unwrap();
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn missing_pair_columns_are_both_named() {
        let t = WorkingTable::new(vec!["x".into()], vec![]);
        match create_moment(t, "d", "h", "moment") {
            Err(NormalizeError::MissingColumn { columns }) => {
                assert_eq!(columns, vec!["d".to_string(), "h".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}

//! Strategy A: one column already carries a combined date+time value.
//! Extraction splits each value into normalized `date_norm` / `hour_norm`
//! columns; the moment itself is then built by the shared pair merge, so
//! both strategies converge on the same final state machine.

use tracing::debug;

use crate::error::NormalizeError;
use crate::moment::parse_datetime_text;
use crate::table::{Cell, WorkingTable};

pub const DATE_NORM_COLUMN: &str = "date_norm";
pub const HOUR_NORM_COLUMN: &str = "hour_norm";

/// Split the combined column into normalized date and hour part columns.
/// Returns the fraction of non-missing rows that could be split; rows that
/// fail carry empty parts and later yield an empty moment. A miss here is
/// data, not an error: the reported rate is the caller's signal to try a
/// different column.
pub fn extract_date_and_hour(
    table: WorkingTable,
    column: &str,
) -> Result<(WorkingTable, f64), NormalizeError> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| NormalizeError::MissingColumn {
            columns: vec![column.to_string()],
        })?;

    let mut non_missing = 0usize;
    let mut extracted = 0usize;
    let mut dates = Vec::with_capacity(table.num_rows());
    let mut hours = Vec::with_capacity(table.num_rows());

    for row in table.rows() {
        let cell = &row[idx];
        if cell.is_empty() {
            dates.push(Cell::Empty);
            hours.push(Cell::Empty);
            continue;
        }
        non_missing += 1;
        let parsed = match cell {
            Cell::DateTime(dt) => Some(*dt),
            Cell::Text(s) => parse_datetime_text(s),
            _ => None,
        };
        match parsed {
            Some(dt) => {
                extracted += 1;
                dates.push(Cell::Text(dt.format("%Y-%m-%d").to_string()));
                hours.push(Cell::Text(dt.format("%H:%M:%S").to_string()));
            }
            None => {
                dates.push(Cell::Empty);
                hours.push(Cell::Empty);
            }
        }
    }

    let rate = if non_missing == 0 {
        0.0
    } else {
        extracted as f64 / non_missing as f64
    };
    debug!(column, rate, "extracted date and hour parts");

    let table = table
        .with_column(DATE_NORM_COLUMN, dates)
        .with_column(HOUR_NORM_COLUMN, hours);
    Ok((table, rate))
}

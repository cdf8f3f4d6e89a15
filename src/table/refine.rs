//! Structural hygiene between pipeline stages: empty-row/column trimming,
//! trailing-row truncation, column projection, and the quarter-hour
//! interval-alignment correction.

use chrono::Duration;
use tracing::debug;

use crate::error::NormalizeError;
use crate::table::{Cell, WorkingTable};

/// Drop all-empty columns, then all-empty rows, then trim trailing empty
/// rows. Column removal must come first so a row that is empty in every
/// remaining column is correctly dropped.
pub fn clean(table: WorkingTable) -> WorkingTable {
    let table = drop_empty_columns(table);
    let table = drop_empty_rows(table);
    trim_trailing_empty_rows(table)
}

/// Remove columns that are empty in every row, independent of row emptiness.
pub fn drop_empty_columns(table: WorkingTable) -> WorkingTable {
    let keep: Vec<usize> = (0..table.num_cols())
        .filter(|&c| table.rows().iter().any(|row| !row[c].is_empty()))
        .collect();
    if keep.len() == table.num_cols() {
        return table;
    }
    debug!(dropped = table.num_cols() - keep.len(), "dropping empty columns");

    let (names, rows) = table.into_parts();
    let kept_names = keep.iter().map(|&c| names[c].clone()).collect();
    let kept_rows = rows
        .into_iter()
        .map(|row| keep.iter().map(|&c| row[c].clone()).collect())
        .collect();
    WorkingTable::new(kept_names, kept_rows)
}

/// Remove rows that are empty in every column, wherever they occur.
pub fn drop_empty_rows(table: WorkingTable) -> WorkingTable {
    let (names, rows) = table.into_parts();
    let kept: Vec<Vec<Cell>> = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();
    WorkingTable::new(names, kept)
}

/// Keep rows `[0..=k]` where `k` is the highest row index with at least one
/// non-empty cell. Empty rows interleaved above `k` survive; everything
/// after is dropped. With no non-empty row at all the result keeps the
/// columns and zero rows.
pub fn trim_trailing_empty_rows(table: WorkingTable) -> WorkingTable {
    let last_filled = table
        .rows()
        .iter()
        .rposition(|row| row.iter().any(|cell| !cell.is_empty()));

    let (names, mut rows) = table.into_parts();
    match last_filled {
        Some(k) => rows.truncate(k + 1),
        None => rows.clear(),
    }
    WorkingTable::new(names, rows)
}

/// Project the table onto exactly `keep` in that order. Fails naming every
/// column in `keep` that the table lacks.
pub fn reduce_to(table: WorkingTable, keep: &[&str]) -> Result<WorkingTable, NormalizeError> {
    let missing: Vec<String> = keep
        .iter()
        .filter(|name| table.column_index(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(NormalizeError::MissingColumn { columns: missing });
    }

    let indices: Vec<usize> = keep
        .iter()
        .map(|name| table.column_index(name).unwrap())
        .collect();
    let (names, rows) = table.into_parts();
    let kept_names = indices.iter().map(|&c| names[c].clone()).collect();
    let kept_rows = rows
        .into_iter()
        .map(|row| indices.iter().map(|&c| row[c].clone()).collect())
        .collect();
    Ok(WorkingTable::new(kept_names, kept_rows))
}

/// Correction for meter series sampled on a fixed quarter-hour cadence whose
/// first reading is offset by one period: when the first row's minute-of-hour
/// is 15 and the last row's is 0, every value in the column shifts back by
/// 15 minutes. Anything else, including an absent column or non-datetime
/// first/last cells, leaves the table unchanged.
pub fn align_quarter_hour_offset(table: WorkingTable, moment_column: &str) -> WorkingTable {
    use chrono::Timelike;

    let Some(idx) = table.column_index(moment_column) else {
        return table;
    };
    if table.num_rows() == 0 {
        return table;
    }

    let first = table.cell(0, idx).as_datetime();
    let last = table.cell(table.num_rows() - 1, idx).as_datetime();
    let (Some(first), Some(last)) = (first, last) else {
        return table;
    };
    if first.minute() != 15 || last.minute() != 0 {
        return table;
    }
    debug!(column = moment_column, "applying quarter-hour back-shift");

    let (names, mut rows) = table.into_parts();
    for row in &mut rows {
        if let Cell::DateTime(dt) = &mut row[idx] {
            let shifted = *dt - Duration::minutes(15);
            *dt = shifted;
        }
    }
    WorkingTable::new(names, rows)
}

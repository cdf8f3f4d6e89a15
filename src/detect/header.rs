//! Header-row detection. Spreadsheet exports routinely carry title and
//! metadata rows above the real column labels; this stage finds the row
//! that best looks like a label row and promotes it to column names.

use tracing::debug;

use crate::error::NormalizeError;
use crate::table::{Cell, WorkingTable};

/// Metadata preambles are short; scanning deeper than this just risks
/// promoting a data row.
const SCAN_WINDOW: usize = 25;

/// Labels longer than this are treated as prose, not column names.
const MAX_LABEL_LEN: usize = 40;

/// Score a row's label-likeness: short text tokens score up, numeric and
/// datetime shaped cells score down, and fuller rows get a small bonus so a
/// complete label row beats a one-cell title above it. All-empty rows score
/// nothing.
fn row_score(row: &[Cell]) -> Option<f64> {
    let nonempty = row.iter().filter(|c| !c.is_empty()).count();
    if nonempty == 0 {
        return None;
    }

    let mut labels = 0usize;
    let mut data_like = 0usize;
    for cell in row.iter().filter(|c| !c.is_empty()) {
        match cell {
            Cell::Number(_) | Cell::DateTime(_) => data_like += 1,
            Cell::Text(s) => {
                let s = s.trim();
                if s.parse::<f64>().is_ok() {
                    data_like += 1;
                } else if s.chars().count() <= MAX_LABEL_LEN {
                    labels += 1;
                }
            }
            Cell::Empty => unreachable!("filtered above"),
        }
    }

    let label_frac = (labels as f64 - data_like as f64) / nonempty as f64;
    let fill = nonempty as f64 / row.len() as f64;
    Some(label_frac + 0.25 * fill)
}

/// Index of the row most likely to be the true header. Exactly one row is
/// always chosen; when every scanned row looks equally data-like the first
/// row wins as fallback.
pub fn detect_header_row(table: &WorkingTable) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (i, row) in table.rows().iter().take(SCAN_WINDOW).enumerate() {
        let Some(score) = row_score(row) else {
            continue;
        };
        // strictly-greater keeps the earliest row on ties
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i).unwrap_or(0)
}

/// Promote the detected header row: its values become the column names, and
/// every row strictly above it is discarded. Blank or duplicate labels keep
/// their columns (naming is disambiguated by the table constructor).
pub fn promote_header(table: WorkingTable) -> Result<WorkingTable, NormalizeError> {
    if table.num_rows() == 0 || table.num_cols() == 0 {
        return Err(NormalizeError::EmptyTable);
    }

    let idx = detect_header_row(&table);
    debug!(row = idx, "promoting header row");

    let (_, mut rows) = table.into_parts();
    let data = rows.split_off(idx + 1);
    let labels = rows.pop().map(|r| r.iter().map(Cell::label).collect()).unwrap_or_default();
    Ok(WorkingTable::new(labels, data))
}

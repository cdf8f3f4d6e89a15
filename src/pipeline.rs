//! Pipeline orchestration. `prepare` runs every automatic stage and hands
//! control back to the caller with the detected consumption column and the
//! time candidates; once the caller has chosen a strategy, `finalize`
//! completes the reduction to the canonical two-column table. No stage
//! retries internally: retrying with a different column choice is the
//! caller's move, driven by the reported rates.

use tracing::{info, instrument, warn};

use crate::detect::time::TimeShape;
use crate::detect::{consumption, header, time};
use crate::error::NormalizeError;
use crate::moment::{synthesize, MomentStrategy, SynthesisRates};
use crate::table::refine;
use crate::table::{RawTable, WorkingTable, CONSUMPTION_COLUMN, MOMENT_COLUMN};

/// Everything the automatic stages produced, for the caller to confirm or
/// correct before synthesis.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub table: WorkingTable,
    /// Detected consumption column, already converted and written back as
    /// `consumption_kwh`. `None` is a detection miss, not an error.
    pub consumption_column: Option<String>,
    /// Name-based time candidates, in source column order.
    pub time_candidates: Vec<String>,
    /// Advisory value-shape buckets for the candidates.
    pub time_shapes: Vec<(String, TimeShape)>,
}

/// The terminal result: exactly `moment` and `consumption_kwh`, plus the
/// success rates of the chosen strategy.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: WorkingTable,
    pub rates: SynthesisRates,
}

/// Automatic stages: refine, promote the header, refine again, convert the
/// consumption column, collect time candidates.
#[instrument(level = "info", skip(raw), fields(rows = raw.num_rows(), cols = raw.num_cols()))]
pub fn prepare(raw: RawTable) -> Result<Prepared, NormalizeError> {
    let table = refine::clean(raw.into_working());
    let table = header::promote_header(table)?;
    let mut table = refine::clean(table);
    info!(
        rows = table.num_rows(),
        cols = table.num_cols(),
        "header promoted and table cleaned"
    );

    let consumption_column = consumption::detect_consumption_column(&table);
    match &consumption_column {
        Some(name) => {
            let (series, hint) = consumption::to_kwh(&table, name)?;
            info!(column = %name, unit = hint.token(), "consumption column converted to kWh");
            table = table.with_column(CONSUMPTION_COLUMN, series);
        }
        None => warn!("no consumption column detected; conversion skipped"),
    }

    let time_candidates = time::detect_time_columns(&table);
    if time_candidates.is_empty() {
        warn!("no time candidates detected");
    }
    let time_shapes = time::classify_candidates(&table, &time_candidates);

    Ok(Prepared {
        table,
        consumption_column,
        time_candidates,
        time_shapes,
    })
}

/// Caller-selected synthesis, then reduction to the canonical columns,
/// final hygiene, and the quarter-hour alignment correction.
#[instrument(level = "info", skip(table, strategy))]
pub fn finalize(
    table: WorkingTable,
    strategy: &MomentStrategy,
) -> Result<Normalized, NormalizeError> {
    let (table, rates) = synthesize(table, strategy)?;
    let table = refine::reduce_to(table, &[MOMENT_COLUMN, CONSUMPTION_COLUMN])?;
    // only trailing hygiene here: a mid-table row whose moment failed to
    // parse stays in place as an invalid marker, it is not dropped
    let table = refine::drop_empty_columns(table);
    let table = refine::trim_trailing_empty_rows(table);
    let table = refine::align_quarter_hour_offset(table, MOMENT_COLUMN);
    info!(
        rows = table.num_rows(),
        moment_rate = rates.moment_rate,
        "table reduced to canonical columns"
    );
    Ok(Normalized { table, rates })
}

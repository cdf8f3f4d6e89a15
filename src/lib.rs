//! Column-intelligence core for normalizing messy energy-meter spreadsheet
//! exports into a canonical `(moment, consumption_kwh)` time series.
//!
//! The caller (ingestion UI, batch driver) supplies a decoded [`RawTable`]
//! and drives two stages: [`pipeline::prepare`] runs every automatic step
//! and returns the detected consumption column plus time candidates;
//! after the caller picks a [`MomentStrategy`], [`pipeline::finalize`]
//! reduces the table to the two canonical columns and reports the parse
//! success rates.

pub mod detect;
pub mod error;
pub mod moment;
pub mod pipeline;
pub mod table;

pub use detect::consumption::UnitHint;
pub use detect::time::TimeShape;
pub use detect::ColumnRole;
pub use error::NormalizeError;
pub use moment::{MomentStrategy, SynthesisRates};
pub use pipeline::{finalize, prepare, Normalized, Prepared};
pub use table::{Cell, RawTable, WorkingTable, CONSUMPTION_COLUMN, MOMENT_COLUMN};

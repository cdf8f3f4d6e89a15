use thiserror::Error;

/// Fatal pipeline errors. Cell-level parse failures are never represented
/// here: they stay in the data as empty cells and lower the reported
/// success rate. Detection misses are `None`/empty results, not errors.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// A required column is absent after a reduction step. Carries every
    /// missing name so the caller can report them all at once.
    #[error("missing required columns: {}", columns.join(", "))]
    MissingColumn { columns: Vec<String> },

    /// Every non-missing value in the nominated date column failed to
    /// parse. Distinct from partial failure: the wrong column was selected,
    /// not noisy data.
    #[error("no value in date column '{column}' could be parsed as a calendar date")]
    DateParse { column: String },

    /// Every non-missing value in the nominated hour column failed to
    /// parse as a time of day.
    #[error("no value in hour column '{column}' could be parsed as a time of day")]
    HourParse { column: String },

    /// The grid had no usable rows or columns left when header promotion
    /// was attempted.
    #[error("table has no rows or columns")]
    EmptyTable,
}

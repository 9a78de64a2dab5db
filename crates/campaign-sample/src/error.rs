//! Error types for campaign-sample.

use campaign_io::{IoError, Subscribed};

/// Errors from partitioning and resampling.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    /// Returned when the train fraction is not strictly between 0 and 1.
    #[error("train_fraction must be in (0, 1), got {train_fraction}")]
    InvalidTrainFraction {
        /// The invalid fraction provided.
        train_fraction: f64,
    },

    /// Returned when partitioning a table with no rows.
    #[error("cannot partition an empty dataset")]
    EmptyDataset,

    /// Returned when rounding leaves one side of the split without rows.
    #[error("partition of {n_rows} rows leaves an empty side: {n_train} train, {n_test} test")]
    EmptyPartition {
        /// Rows in the input table.
        n_rows: usize,
        /// Rows assigned to training.
        n_train: usize,
        /// Rows assigned to testing.
        n_test: usize,
    },

    /// Returned when a class needed by a resampling step has no rows.
    #[error("insufficient data for {operation}: no \"{class}\" rows")]
    InsufficientData {
        /// The step that needed the class.
        operation: &'static str,
        /// The class with zero rows.
        class: Subscribed,
    },

    /// Returned when the requested synthetic table size is zero.
    #[error("synthetic table size must be at least 1, got {n_rows}")]
    InvalidTargetSize {
        /// The invalid size provided.
        n_rows: usize,
    },

    /// Returned when the synthetic positive fraction is outside `[0, 1]`.
    #[error("positive_fraction must be in [0, 1], got {positive_fraction}")]
    InvalidPositiveFraction {
        /// The invalid fraction provided.
        positive_fraction: f64,
    },

    /// Returned when the kernel shrink factor is negative or not finite.
    #[error("shrink must be finite and non-negative, got {shrink}")]
    InvalidShrink {
        /// The invalid shrink factor provided.
        shrink: f64,
    },

    /// Returned when a derived table fails schema validation.
    #[error(transparent)]
    Table(#[from] IoError),
}

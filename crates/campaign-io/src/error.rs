//! I/O error types for campaign-io.

use std::path::PathBuf;

/// Errors from CSV loading, table construction, and report writing.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error(
        "inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}"
    )]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when the header has no column with the target name.
    #[error("target column \"{column}\" not found in {path}")]
    MissingTargetColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// The target column name that was looked up.
        column: String,
    },

    /// Returned when a target cell is neither `yes` nor `no`.
    #[error("unknown label \"{raw}\" in {path}: row {row_index}, expected yes or no")]
    UnknownLabel {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// The raw cell value.
        raw: String,
    },

    /// Returned when the header holds only the target column.
    #[error("no feature columns in {path}")]
    NoFeatureColumns {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a table row does not match the column schema width.
    #[error("row {row_index} has {got} cells, schema has {expected} columns")]
    RowWidthMismatch {
        /// Zero-based row index.
        row_index: usize,
        /// Number of schema columns.
        expected: usize,
        /// Number of cells in the row.
        got: usize,
    },

    /// Returned when a table has a different number of labels than rows.
    #[error("table has {n_rows} rows but {n_labels} labels")]
    LabelCountMismatch {
        /// Number of rows.
        n_rows: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a report artifact cannot be serialized to JSON.
    #[error("cannot serialize {artifact}")]
    Serialize {
        /// Name of the artifact being serialized.
        artifact: &'static str,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

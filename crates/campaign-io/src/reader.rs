//! CSV reader for the bank marketing dataset with full input validation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::{Column, Subscribed, Table};

/// Reads client records from a delimited text file.
///
/// Expected format:
/// - Header row required, one column per attribute
/// - One target column (default `deposit`) holding `yes`/`no`
/// - All rows must have the same number of columns as the header
///
/// Every other column becomes a predictor. A column is numeric when each of
/// its cells parses as a finite `f64`; otherwise it is categorical, with its
/// distinct trimmed values sorted lexicographically as levels.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingTargetColumn`] | Header has no target column |
/// | [`IoError::NoFeatureColumns`] | Only the target column is present |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::UnknownLabel`] | Target cell is not `yes` or `no` |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct BankReader {
    path: PathBuf,
    target_column: String,
    delimiter: u8,
}

impl BankReader {
    /// Create a new reader for the given file path.
    ///
    /// Defaults: target column `deposit`, delimiter `,`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            target_column: "deposit".to_string(),
            delimiter: b',',
        }
    }

    /// Set the name of the `yes`/`no` target column.
    #[must_use]
    pub fn with_target_column(mut self, target_column: impl Into<String>) -> Self {
        self.target_column = target_column.into();
        self
    }

    /// Set the field delimiter (e.g. `b';'` for the UCI distribution).
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read and validate the file, returning a [`Table`].
    #[instrument(skip(self), fields(path = %self.path.display(), target = %self.target_column))]
    pub fn read(&self) -> Result<Table, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets the InconsistentRowLength check below fire
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?.clone();
        let expected_cols = header.len();
        debug!(expected_cols, "read CSV header");

        let target_idx = header
            .iter()
            .position(|name| name.trim() == self.target_column)
            .ok_or_else(|| IoError::MissingTargetColumn {
                path: self.path.clone(),
                column: self.target_column.clone(),
            })?;

        if expected_cols < 2 {
            return Err(IoError::NoFeatureColumns {
                path: self.path.clone(),
            });
        }

        let feature_cols: Vec<usize> = (0..expected_cols).filter(|&c| c != target_idx).collect();

        // Cells are kept as text until every row is seen, since a column's
        // kind depends on all of its values.
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); feature_cols.len()];
        let mut labels = Vec::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let raw_label = record.get(target_idx).unwrap_or("");
            let label = Subscribed::parse(raw_label).ok_or_else(|| IoError::UnknownLabel {
                path: self.path.clone(),
                row_index,
                raw: raw_label.to_string(),
            })?;
            labels.push(label);

            for (slot, &col) in cells.iter_mut().zip(&feature_cols) {
                slot.push(record.get(col).unwrap_or("").trim().to_string());
            }
        }

        if labels.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let mut columns = Vec::with_capacity(feature_cols.len());
        let mut rows: Vec<Vec<f64>> = vec![Vec::with_capacity(feature_cols.len()); labels.len()];

        for (col_cells, &col) in cells.iter().zip(&feature_cols) {
            let name = header.get(col).unwrap_or("").trim().to_string();
            let (column, values) = encode_column(name, col_cells);
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
            columns.push(column);
        }

        let n_categorical = columns.iter().filter(|c| !c.is_numeric()).count();
        let table = Table::new(columns, rows, labels)?;
        let [n_no, n_yes] = table.class_counts();
        info!(
            n_rows = table.n_rows(),
            n_features = table.n_features(),
            n_categorical,
            n_no,
            n_yes,
            "bank dataset loaded"
        );

        Ok(table)
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

/// Infer a column's kind from its cells and encode them as `f64`.
fn encode_column(name: String, cells: &[String]) -> (Column, Vec<f64>) {
    let parsed: Option<Vec<f64>> = cells
        .iter()
        .map(|raw| raw.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect();

    if let Some(values) = parsed {
        return (Column::numeric(name), values);
    }

    let levels: Vec<String> = cells
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let codes = cells
        .iter()
        .map(|raw| levels.binary_search(raw).map_or(0.0, |code| code as f64))
        .collect();
    (Column::categorical(name, levels), codes)
}

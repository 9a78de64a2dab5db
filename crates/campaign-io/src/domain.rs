//! Domain types for campaign-io.

use std::fmt;

use crate::IoError;

/// The binary target: did the client subscribe to a term deposit?
///
/// `No` is class 0 and `Yes` is class 1, the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subscribed {
    /// Class 0.
    No,
    /// Class 1, the positive class.
    Yes,
}

impl Subscribed {
    /// Return the class index (`No` = 0, `Yes` = 1).
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Subscribed::No => 0,
            Subscribed::Yes => 1,
        }
    }

    /// Map a class index back to a label; `None` outside `{0, 1}`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Subscribed::No),
            1 => Some(Subscribed::Yes),
            _ => None,
        }
    }

    /// Parse a `yes`/`no` cell, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("yes") {
            Some(Subscribed::Yes)
        } else if trimmed.eq_ignore_ascii_case("no") {
            Some(Subscribed::No)
        } else {
            None
        }
    }

    /// Return the other class.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Subscribed::No => Subscribed::Yes,
            Subscribed::Yes => Subscribed::No,
        }
    }
}

impl fmt::Display for Subscribed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Subscribed::No => "no",
            Subscribed::Yes => "yes",
        })
    }
}

/// How the cells of a predictor column are encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// Cells hold the value itself.
    Numeric,
    /// Cells hold a code into `levels`, which are sorted lexicographically.
    Categorical {
        /// Level names, indexed by code.
        levels: Vec<String>,
    },
}

impl ColumnKind {
    /// Number of levels for a categorical column, `None` for numeric.
    #[must_use]
    pub fn n_levels(&self) -> Option<usize> {
        match self {
            ColumnKind::Numeric => None,
            ColumnKind::Categorical { levels } => Some(levels.len()),
        }
    }
}

/// A named predictor column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    kind: ColumnKind,
}

impl Column {
    /// Create a numeric column.
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
        }
    }

    /// Create a categorical column with the given level names.
    #[must_use]
    pub fn categorical(name: impl Into<String>, levels: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical { levels },
        }
    }

    /// Return the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the column encoding.
    #[must_use]
    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    /// Return `true` for numeric columns.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ColumnKind::Numeric)
    }
}

/// An ordered table of client records with a shared column schema.
///
/// `rows[i]` holds one cell per column (categorical cells store the level
/// code as `f64`) and `labels[i]` is its target. Tables are immutable;
/// derived tables are built with [`Table::subset`] or [`Table::with_rows`].
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<f64>>,
    labels: Vec<Subscribed>,
}

impl Table {
    /// Create a table, checking that every row matches the schema width and
    /// that there is one label per row.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::LabelCountMismatch`] | `labels.len() != rows.len()` |
    /// | [`IoError::RowWidthMismatch`] | A row's width differs from `columns.len()` |
    pub fn new(
        columns: Vec<Column>,
        rows: Vec<Vec<f64>>,
        labels: Vec<Subscribed>,
    ) -> Result<Self, IoError> {
        if rows.len() != labels.len() {
            return Err(IoError::LabelCountMismatch {
                n_rows: rows.len(),
                n_labels: labels.len(),
            });
        }
        if let Some((row_index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(IoError::RowWidthMismatch {
                row_index,
                expected: columns.len(),
                got: row.len(),
            });
        }
        Ok(Self {
            columns,
            rows,
            labels,
        })
    }

    /// Build a table with the same schema and new rows.
    ///
    /// # Errors
    ///
    /// Same as [`Table::new`].
    pub fn with_rows(&self, rows: Vec<Vec<f64>>, labels: Vec<Subscribed>) -> Result<Self, IoError> {
        Self::new(self.columns.clone(), rows, labels)
    }

    /// Build a table from the rows at `indices`, in that order. Indices may
    /// repeat.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    /// Return the column schema.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Return the column names.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Return the rows (row-major).
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Return the target labels.
    #[must_use]
    pub fn labels(&self) -> &[Subscribed] {
        &self.labels
    }

    /// Return the labels as class indices (`No` = 0, `Yes` = 1).
    #[must_use]
    pub fn label_indices(&self) -> Vec<usize> {
        self.labels.iter().map(|l| l.index()).collect()
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of predictor columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Return `true` when the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Return the row counts per class as `[no, yes]`.
    #[must_use]
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0usize; 2];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }

    /// Return the number of rows with the given label.
    #[must_use]
    pub fn count(&self, label: Subscribed) -> usize {
        self.class_counts()[label.index()]
    }

    /// Return the indices of the rows with the given label, in table order.
    #[must_use]
    pub fn indices_of(&self, label: Subscribed) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }
}

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> Table {
        Table::new(
            vec![
                Column::numeric("age"),
                Column::categorical("job", vec!["admin".into(), "services".into()]),
            ],
            vec![vec![30.0, 0.0], vec![45.0, 1.0], vec![52.0, 1.0]],
            vec![Subscribed::No, Subscribed::Yes, Subscribed::No],
        )
        .unwrap()
    }

    #[test]
    fn subscribed_parse_is_lenient() {
        assert_eq!(Subscribed::parse(" YES "), Some(Subscribed::Yes));
        assert_eq!(Subscribed::parse("no"), Some(Subscribed::No));
        assert_eq!(Subscribed::parse("maybe"), None);
    }

    #[test]
    fn subscribed_index_roundtrip() {
        for label in [Subscribed::No, Subscribed::Yes] {
            assert_eq!(Subscribed::from_index(label.index()), Some(label));
        }
        assert_eq!(Subscribed::from_index(2), None);
        assert_eq!(Subscribed::Yes.other(), Subscribed::No);
    }

    #[test]
    fn table_class_counts() {
        let table = small_table();
        assert_eq!(table.class_counts(), [2, 1]);
        assert_eq!(table.count(Subscribed::Yes), 1);
        assert_eq!(table.indices_of(Subscribed::No), vec![0, 2]);
        assert_eq!(table.label_indices(), vec![0, 1, 0]);
    }

    #[test]
    fn subset_allows_repeats() {
        let table = small_table();
        let sub = table.subset(&[1, 1, 0]);
        assert_eq!(sub.n_rows(), 3);
        assert_eq!(sub.rows()[0], vec![45.0, 1.0]);
        assert_eq!(sub.count(Subscribed::Yes), 2);
        assert_eq!(sub.columns(), table.columns());
    }

    #[test]
    fn table_rejects_ragged_rows() {
        let err = Table::new(
            vec![Column::numeric("age")],
            vec![vec![1.0], vec![1.0, 2.0]],
            vec![Subscribed::No, Subscribed::Yes],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            IoError::RowWidthMismatch {
                row_index: 1,
                expected: 1,
                got: 2
            }
        ));
    }

    #[test]
    fn table_rejects_label_count_mismatch() {
        let err = Table::new(vec![Column::numeric("age")], vec![vec![1.0]], vec![])
            .unwrap_err();
        assert!(matches!(err, IoError::LabelCountMismatch { .. }));
    }

    #[test]
    fn experiment_name_valid() {
        assert!(ExperimentName::new("bank-run_01".to_string()).is_ok());
    }

    #[test]
    fn experiment_name_rejects_spaces() {
        let result = ExperimentName::new("bad name".to_string());
        assert!(matches!(result, Err(IoError::InvalidExperimentName { .. })));
    }

    #[test]
    fn experiment_name_rejects_empty() {
        assert!(ExperimentName::new(String::new()).is_err());
    }
}

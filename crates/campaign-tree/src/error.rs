/// Errors from decision tree training, pruning, and complexity search.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when min_samples_split is less than 2.
    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The invalid min_samples_split value provided.
        min_samples_split: usize,
    },

    /// Returned when min_samples_leaf is zero.
    #[error("min_samples_leaf must be at least 1, got {min_samples_leaf}")]
    InvalidMinSamplesLeaf {
        /// The invalid min_samples_leaf value provided.
        min_samples_leaf: usize,
    },

    /// Returned when the complexity parameter is negative or not finite.
    #[error("complexity must be finite and non-negative, got {complexity}")]
    InvalidComplexity {
        /// The invalid complexity value provided.
        complexity: f64,
    },

    /// Returned when n_folds is less than 2.
    #[error("n_folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The invalid n_folds value provided.
        n_folds: usize,
    },

    /// Returned when a complexity grid cannot produce any usable value.
    #[error("invalid complexity grid: {reason}")]
    InvalidComplexityGrid {
        /// Human-readable description of what is wrong with the grid.
        reason: String,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when the declared feature kinds do not cover every column.
    #[error("{n_kinds} feature kinds declared for {n_features} feature columns")]
    FeatureKindMismatch {
        /// Number of feature kinds provided.
        n_kinds: usize,
        /// Number of feature columns in the data.
        n_features: usize,
    },

    /// Returned when labels and feature rows differ in length.
    #[error("{n_labels} labels provided for {n_samples} samples")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_samples: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when a label is not a binary class index.
    #[error("label {label} at sample {sample_index} is not 0 or 1")]
    LabelOutOfRange {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The offending label value.
        label: usize,
    },

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when a categorical cell is not a level code of its column.
    #[error(
        "value {value} at sample {sample_index}, feature {feature_index} is not a level code in [0, {n_levels})"
    )]
    CategoryOutOfRange {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the categorical column.
        feature_index: usize,
        /// The raw cell value.
        value: f64,
        /// Number of levels declared for the column.
        n_levels: usize,
    },

    /// Returned when a class has fewer samples than the number of folds.
    #[error("class {class} has only {count} samples, need at least {n_folds} for stratified CV")]
    TooFewSamplesForFolds {
        /// The class label with insufficient samples.
        class: usize,
        /// The number of samples belonging to that class.
        count: usize,
        /// The requested number of folds.
        n_folds: usize,
    },
}

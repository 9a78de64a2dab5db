//! Error types for campaign-eval.

use campaign_io::IoError;
use campaign_sample::SampleError;
use campaign_tree::TreeError;

use crate::economics::Metric;

/// Errors from scoring, evaluation, and the strategy pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Returned when predictions and true labels differ in length.
    #[error("label mismatch: {n_predictions} predictions for {n_labels} true labels")]
    LabelMismatch {
        /// Number of predictions.
        n_predictions: usize,
        /// Number of true labels.
        n_labels: usize,
    },

    /// Returned when a prediction or true label is not a class index in `{0, 1}`.
    #[error("label mismatch: value {label} at row {row_index} is neither no (0) nor yes (1)")]
    UnknownLabel {
        /// Zero-based row index.
        row_index: usize,
        /// The offending value.
        label: usize,
    },

    /// Returned when a confusion matrix would be built from zero rows.
    #[error("cannot build a confusion matrix from zero predictions")]
    EmptyPredictions,

    /// Returned when a rate has a zero denominator.
    #[error("{metric} is undefined: {denominator} = 0")]
    UndefinedMetric {
        /// The metric that could not be computed.
        metric: Metric,
        /// The cells forming the zero denominator.
        denominator: &'static str,
    },

    /// Returned when a money amount is negative or not finite.
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidAmount {
        /// Name of the configuration field.
        field: &'static str,
        /// The invalid value.
        value: f64,
    },

    /// Returned when the decision threshold is outside `[0, 1]`.
    #[error("threshold must be in [0, 1], got {threshold}")]
    InvalidThreshold {
        /// The invalid threshold.
        threshold: f64,
    },

    /// Returned when an experiment is configured with no strategies.
    #[error("no strategies selected")]
    NoStrategies,

    /// Returned when a strategy name cannot be parsed.
    #[error("unknown strategy \"{name}\"")]
    UnknownStrategy {
        /// The name that was given.
        name: String,
    },

    /// Tree training or complexity search failed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Partitioning or resampling failed.
    #[error(transparent)]
    Sample(#[from] SampleError),

    /// Table construction failed.
    #[error(transparent)]
    Io(#[from] IoError),
}

//! Stratified k-fold search for the pruning complexity parameter.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::error::TreeError;
use crate::node::FeatureKind;
use crate::tree::DecisionTreeConfig;

/// Candidate complexity values to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum ComplexityGrid {
    /// `n_values` values evenly spaced on a log scale over `[lower, upper]`.
    Geometric {
        /// Smallest value, must be positive.
        lower: f64,
        /// Largest value.
        upper: f64,
        /// Number of grid points.
        n_values: usize,
    },
    /// `n_values` values evenly spaced over `[lower, upper]`.
    Arithmetic {
        /// Smallest value, must be non-negative.
        lower: f64,
        /// Largest value.
        upper: f64,
        /// Number of grid points.
        n_values: usize,
    },
    /// An explicit list of values.
    Explicit(Vec<f64>),
}

impl Default for ComplexityGrid {
    fn default() -> Self {
        ComplexityGrid::Geometric {
            lower: 1e-4,
            upper: 1e-1,
            n_values: 10,
        }
    }
}

impl ComplexityGrid {
    /// Expand the grid into sorted, deduplicated values.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidComplexityGrid`] when bounds are
    /// non-finite, out of order, negative (or non-positive for a geometric
    /// grid), when `n_values` is zero, or when an explicit list is empty or
    /// holds an invalid value.
    pub fn values(&self) -> Result<Vec<f64>, TreeError> {
        let invalid = |reason: String| TreeError::InvalidComplexityGrid { reason };

        let mut values = match *self {
            ComplexityGrid::Geometric {
                lower,
                upper,
                n_values,
            } => {
                check_bounds(lower, upper, n_values).map_err(invalid)?;
                if lower <= 0.0 {
                    return Err(invalid(format!(
                        "geometric lower bound must be positive, got {lower}"
                    )));
                }
                if n_values == 1 {
                    vec![lower]
                } else {
                    let ratio = (upper / lower).ln();
                    (0..n_values)
                        .map(|i| lower * (ratio * i as f64 / (n_values - 1) as f64).exp())
                        .collect()
                }
            }
            ComplexityGrid::Arithmetic {
                lower,
                upper,
                n_values,
            } => {
                check_bounds(lower, upper, n_values).map_err(invalid)?;
                if n_values == 1 {
                    vec![lower]
                } else {
                    let step = (upper - lower) / (n_values - 1) as f64;
                    (0..n_values).map(|i| lower + step * i as f64).collect()
                }
            }
            ComplexityGrid::Explicit(ref values) => {
                if values.is_empty() {
                    return Err(invalid("explicit grid is empty".to_string()));
                }
                if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
                    return Err(invalid(format!(
                        "grid values must be finite and non-negative, got {bad}"
                    )));
                }
                values.clone()
            }
        };

        values.sort_by(f64::total_cmp);
        values.dedup();
        Ok(values)
    }
}

fn check_bounds(lower: f64, upper: f64, n_values: usize) -> Result<(), String> {
    if n_values == 0 {
        return Err("n_values must be at least 1".to_string());
    }
    if !lower.is_finite() || !upper.is_finite() {
        return Err(format!("bounds must be finite, got [{lower}, {upper}]"));
    }
    if lower < 0.0 {
        return Err(format!("lower bound must be non-negative, got {lower}"));
    }
    if upper < lower {
        return Err(format!("upper bound {upper} is below lower bound {lower}"));
    }
    Ok(())
}

/// Cross-validated complexity search configuration.
///
/// Construct via [`ComplexitySearch::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter | Default                              |
/// |-----------|--------------------------------------|
/// | `seed`    | 42                                   |
/// | `grid`    | geometric, 10 values in `[1e-4, 0.1]` |
#[derive(Debug, Clone)]
pub struct ComplexitySearch {
    n_folds: usize,
    seed: u64,
    grid: ComplexityGrid,
}

/// Cross-validated error for one complexity value.
#[derive(Debug, Clone)]
pub struct ComplexityScore {
    /// The complexity value evaluated.
    pub complexity: f64,
    /// Misclassification rate on each held-out fold.
    pub fold_errors: Vec<f64>,
    /// Mean misclassification rate across folds.
    pub mean_error: f64,
    /// Standard deviation of the fold error rates.
    pub std_error: f64,
}

/// Result of a complexity search.
#[derive(Debug, Clone)]
pub struct ComplexitySearchResult {
    /// Complexity value with the lowest mean error.
    pub best_complexity: f64,
    /// One score per grid value, in ascending complexity order.
    pub scores: Vec<ComplexityScore>,
    /// Number of folds.
    pub n_folds: usize,
    /// Total number of samples.
    pub n_samples: usize,
}

impl ComplexitySearchResult {
    /// Return the score of the selected complexity value.
    #[must_use]
    pub fn best_score(&self) -> Option<&ComplexityScore> {
        self.scores
            .iter()
            .find(|s| s.complexity == self.best_complexity)
    }
}

impl ComplexitySearch {
    /// Create a new search with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, TreeError> {
        if n_folds < 2 {
            return Err(TreeError::InvalidFoldCount { n_folds });
        }
        Ok(Self {
            n_folds,
            seed: 42,
            grid: ComplexityGrid::default(),
        })
    }

    /// Set the random seed for fold shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the candidate complexity values.
    #[must_use]
    pub fn with_grid(mut self, grid: ComplexityGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Return the number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Return the fold-shuffling seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the candidate grid.
    #[must_use]
    pub fn grid(&self) -> &ComplexityGrid {
        &self.grid
    }

    /// Run stratified k-fold cross-validation over the complexity grid.
    ///
    /// Each fold grows one unpruned tree with `config`'s stopping rules on
    /// the remaining folds, prunes it at every grid value, and scores the
    /// held-out fold (class 1 predicted when its probability exceeds 0.5).
    /// The value with the lowest mean error wins; ties go to the larger
    /// complexity, i.e. the smaller tree.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | Zero samples |
    /// | [`TreeError::InvalidComplexityGrid`] | Grid cannot be expanded |
    /// | [`TreeError::TooFewSamplesForFolds`] | A class has fewer samples than folds |
    /// | Other tree errors | From underlying training |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = features.len()))]
    pub fn search(
        &self,
        config: &DecisionTreeConfig,
        features: &[Vec<f64>],
        labels: &[usize],
        kinds: &[FeatureKind],
    ) -> Result<ComplexitySearchResult, TreeError> {
        if features.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        if labels.len() != features.len() {
            return Err(TreeError::LabelCountMismatch {
                n_samples: features.len(),
                n_labels: labels.len(),
            });
        }
        if let Some((sample_index, &label)) = labels.iter().enumerate().find(|&(_, &l)| l > 1) {
            return Err(TreeError::LabelOutOfRange {
                sample_index,
                label,
            });
        }

        let grid = self.grid.values()?;
        let fold_assignments = self.stratified_split(labels)?;

        // fold_errors[fold][grid_idx]
        let fold_errors: Vec<Vec<f64>> = (0..self.n_folds)
            .into_par_iter()
            .map(|fold| {
                let mut train_features = Vec::new();
                let mut train_labels = Vec::new();
                let mut test_features = Vec::new();
                let mut test_labels = Vec::new();

                for (i, &assigned_fold) in fold_assignments.iter().enumerate() {
                    if assigned_fold == fold {
                        test_features.push(features[i].clone());
                        test_labels.push(labels[i]);
                    } else {
                        train_features.push(features[i].clone());
                        train_labels.push(labels[i]);
                    }
                }

                let grown = config.grow(&train_features, &train_labels, kinds)?;

                let mut errors = Vec::with_capacity(grid.len());
                for &complexity in &grid {
                    let tree = grown.prune(complexity);
                    let mut wrong = 0usize;
                    for (sample, &label) in test_features.iter().zip(&test_labels) {
                        let predicted = usize::from(tree.score_probability(sample)? > 0.5);
                        if predicted != label {
                            wrong += 1;
                        }
                    }
                    errors.push(wrong as f64 / test_labels.len() as f64);
                }
                debug!(fold, n_test = test_labels.len(), "fold scored");
                Ok(errors)
            })
            .collect::<Result<_, TreeError>>()?;

        let scores: Vec<ComplexityScore> = grid
            .iter()
            .enumerate()
            .map(|(g, &complexity)| {
                let per_fold: Vec<f64> = fold_errors.iter().map(|errs| errs[g]).collect();
                let mean_error = per_fold.iter().sum::<f64>() / self.n_folds as f64;
                let variance = per_fold
                    .iter()
                    .map(|&e| (e - mean_error).powi(2))
                    .sum::<f64>()
                    / self.n_folds as f64;
                ComplexityScore {
                    complexity,
                    fold_errors: per_fold,
                    mean_error,
                    std_error: variance.sqrt(),
                }
            })
            .collect();

        let mut best = &scores[0];
        for score in &scores[1..] {
            if score.mean_error <= best.mean_error + 1e-12 {
                best = score;
            }
        }
        let best_complexity = best.complexity;

        info!(
            best_complexity,
            mean_error = best.mean_error,
            "complexity search complete"
        );

        Ok(ComplexitySearchResult {
            best_complexity,
            scores,
            n_folds: self.n_folds,
            n_samples: features.len(),
        })
    }

    /// Create stratified fold assignments.
    ///
    /// Groups samples by class, shuffles within each class, then
    /// round-robins across folds so each fold gets approximately
    /// equal representation of each class.
    fn stratified_split(&self, labels: &[usize]) -> Result<Vec<usize>, TreeError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut class_indices: Vec<Vec<usize>> = vec![vec![]; 2];
        for (i, &label) in labels.iter().enumerate() {
            class_indices[label].push(i);
        }

        for (class, indices) in class_indices.iter().enumerate() {
            if !indices.is_empty() && indices.len() < self.n_folds {
                return Err(TreeError::TooFewSamplesForFolds {
                    class,
                    count: indices.len(),
                    n_folds: self.n_folds,
                });
            }
        }

        let mut fold_assignments = vec![0usize; labels.len()];
        for indices in &mut class_indices {
            indices.shuffle(&mut rng);
            for (j, &idx) in indices.iter().enumerate() {
                fold_assignments[idx] = j % self.n_folds;
            }
        }

        Ok(fold_assignments)
    }
}

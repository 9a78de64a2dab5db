use tracing::{debug, instrument};

use crate::{
    TreeError,
    node::{FeatureKind, Node, NodeIndex},
    split::{SplitCriterion, find_best_split},
};

/// Configuration for a single CART decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `criterion`         | `Gini`  |
/// | `max_depth`         | `Some(30)` |
/// | `min_samples_split` | 20      |
/// | `min_samples_leaf`  | 7       |
/// | `complexity`        | 0.01    |
///
/// The defaults follow the customary recursive-partitioning settings
/// (`minsplit = 20`, `minbucket = round(minsplit / 3)`, `cp = 0.01`).
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) complexity: f64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: Some(30),
            min_samples_split: 20,
            min_samples_leaf: 7,
            complexity: 0.01,
        }
    }

    /// Use `criterion` to rank candidate splits.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Cap the depth of every leaf (root is depth 0); `None` removes the cap.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Nodes with fewer rows than this become leaves without a split attempt.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Reject any split that leaves a child with fewer rows than this.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the cost-complexity pruning parameter.
    ///
    /// Splits whose relative reduction in misclassification risk per added
    /// leaf is at most `complexity` are pruned away. `0.0` keeps every split
    /// that lowers the risk.
    #[must_use]
    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity;
        self
    }

    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    #[must_use]
    pub fn complexity(&self) -> f64 {
        self.complexity
    }

    fn check_stops(&self) -> Result<(), TreeError> {
        if self.max_depth == Some(0) {
            return Err(TreeError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(TreeError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf == 0 {
            return Err(TreeError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        Ok(())
    }

    /// Train and prune a decision tree on the provided row-major dataset.
    ///
    /// `features[sample_idx][feature_idx]` in row-major layout,
    /// `labels[sample_idx]` in `{0, 1}` with 1 the positive class, and
    /// `kinds[feature_idx]` describing each column.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | `features` is empty |
    /// | [`TreeError::ZeroFeatures`] | rows have zero feature columns |
    /// | [`TreeError::LabelCountMismatch`] | `labels.len() != features.len()` |
    /// | [`TreeError::FeatureKindMismatch`] | `kinds.len()` differs from the row width |
    /// | [`TreeError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`TreeError::NonFiniteValue`] | any value is NaN or infinite |
    /// | [`TreeError::CategoryOutOfRange`] | categorical cell is not a valid level code |
    /// | [`TreeError::LabelOutOfRange`] | a label is not 0 or 1 |
    /// | [`TreeError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    /// | [`TreeError::InvalidMinSamplesSplit`] | `min_samples_split` < 2 |
    /// | [`TreeError::InvalidMinSamplesLeaf`] | `min_samples_leaf` < 1 |
    /// | [`TreeError::InvalidComplexity`] | `complexity` negative or non-finite |
    #[instrument(skip_all, fields(n_samples = features.len(), complexity = self.complexity))]
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        kinds: &[FeatureKind],
    ) -> Result<DecisionTree, TreeError> {
        if !self.complexity.is_finite() || self.complexity < 0.0 {
            return Err(TreeError::InvalidComplexity {
                complexity: self.complexity,
            });
        }
        let grown = self.grow(features, labels, kinds)?;
        let pruned = grown.prune(self.complexity);
        debug!(
            grown_leaves = grown.n_leaves(),
            pruned_leaves = pruned.n_leaves(),
            "decision tree pruned"
        );
        Ok(pruned)
    }

    /// Grow an unpruned tree honouring the depth and sample-count stops.
    pub(crate) fn grow(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        kinds: &[FeatureKind],
    ) -> Result<DecisionTree, TreeError> {
        validate_inputs(features, labels, kinds)?;
        self.check_stops()?;

        // The splitter scans one column at a time.
        let columns: Vec<Vec<f64>> = (0..kinds.len())
            .map(|c| features.iter().map(|row| row[c]).collect())
            .collect();

        let mut grower = Grower {
            config: self,
            columns: &columns,
            kinds,
            labels,
            nodes: Vec::new(),
        };
        let all_rows: Vec<usize> = (0..features.len()).collect();
        grower.node(&all_rows, 0);

        debug!(n_nodes = grower.nodes.len(), "decision tree grown");
        Ok(DecisionTree {
            nodes: grower.nodes,
            kinds: kinds.to_vec(),
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_inputs(
    features: &[Vec<f64>],
    labels: &[usize],
    kinds: &[FeatureKind],
) -> Result<(), TreeError> {
    if features.is_empty() {
        return Err(TreeError::EmptyDataset);
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(TreeError::ZeroFeatures);
    }
    if labels.len() != features.len() {
        return Err(TreeError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    if kinds.len() != n_features {
        return Err(TreeError::FeatureKindMismatch {
            n_kinds: kinds.len(),
            n_features,
        });
    }

    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(TreeError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, (&val, kind)) in row.iter().zip(kinds).enumerate() {
            if !val.is_finite() {
                return Err(TreeError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
            if let FeatureKind::Categorical { n_levels } = *kind
                && (val < 0.0 || val.fract() != 0.0 || val as usize >= n_levels)
            {
                return Err(TreeError::CategoryOutOfRange {
                    sample_index,
                    feature_index,
                    value: val,
                    n_levels,
                });
            }
        }
    }

    if let Some((sample_index, &label)) = labels.iter().enumerate().find(|&(_, &l)| l > 1) {
        return Err(TreeError::LabelOutOfRange {
            sample_index,
            label,
        });
    }

    Ok(())
}

/// Depth-first node builder writing into a pre-order arena.
struct Grower<'a> {
    config: &'a DecisionTreeConfig,
    columns: &'a [Vec<f64>],
    kinds: &'a [FeatureKind],
    labels: &'a [usize],
    nodes: Vec<Node>,
}

impl Grower<'_> {
    fn node(&mut self, rows: &[usize], depth: usize) -> NodeIndex {
        let mut class_counts = [0usize; 2];
        for &row in rows {
            class_counts[self.labels[row]] += 1;
        }
        let impurity = self.config.criterion.impurity(&class_counts, rows.len());

        let at_depth_cap = self.config.max_depth.is_some_and(|cap| depth >= cap);
        let split = if at_depth_cap
            || rows.len() < self.config.min_samples_split
            || impurity.value() == 0.0
        {
            None
        } else {
            find_best_split(
                self.columns,
                self.kinds,
                self.labels,
                rows,
                &self.config.criterion,
                self.config.min_samples_leaf,
            )
        };

        // Reserve the slot so the parent precedes its children.
        let slot = NodeIndex::new(self.nodes.len());
        self.nodes.push(Node::Leaf {
            class_counts,
            impurity,
        });

        if let Some(split) = split {
            let left = self.node(&split.left_indices, depth + 1);
            let right = self.node(&split.right_indices, depth + 1);
            self.nodes[slot.index()] = Node::Split {
                feature: split.feature,
                rule: split.rule,
                left,
                right,
                impurity,
                class_counts,
                impurity_decrease: split.impurity_decrease,
            };
        }
        slot
    }
}

/// A fitted binary CART decision tree.
///
/// Stored as an arena-based `Vec<Node>` with index references; the root
/// is always at index 0.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) kinds: Vec<FeatureKind>,
}

impl DecisionTree {
    /// Return the estimated probability that `sample` belongs to class 1.
    ///
    /// This is the share of positive training rows in the leaf the sample
    /// falls into.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn score_probability(&self, sample: &[f64]) -> Result<f64, TreeError> {
        self.check_width(sample)?;
        Ok(self.nodes[self.traverse(sample)].positive_rate())
    }

    /// Return the class probability distribution `[P(0), P(1)]` for a sample.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<[f64; 2], TreeError> {
        let positive = self.score_probability(sample)?;
        Ok([1.0 - positive, positive])
    }

    /// Predict the majority class of the leaf a sample falls into.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, TreeError> {
        self.check_width(sample)?;
        Ok(self.nodes[self.traverse(sample)].prediction())
    }

    /// Share of the total impurity decrease contributed by each column.
    ///
    /// Sums to 1.0, or all zeros when the tree is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.kinds.len()];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[feature.index()] += impurity_decrease.max(0.0);
            }
        }
        let grand_total: f64 = totals.iter().sum();
        if grand_total > 0.0 {
            for total in &mut totals {
                *total /= grand_total;
            }
        }
        totals
    }

    /// Return the number of feature columns the tree expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.kinds.len()
    }

    /// Split and leaf nodes together.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Length of the longest root-to-leaf path; a lone root leaf is depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        fn below(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + below(nodes, left.index()).max(below(nodes, right.index()))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            below(&self.nodes, 0)
        }
    }

    fn check_width(&self, sample: &[f64]) -> Result<(), TreeError> {
        if sample.len() != self.kinds.len() {
            return Err(TreeError::PredictionFeatureMismatch {
                expected: self.kinds.len(),
                got: sample.len(),
            });
        }
        Ok(())
    }

    /// Arena slot of the leaf `sample` lands in.
    fn traverse(&self, sample: &[f64]) -> usize {
        let mut at = 0usize;
        loop {
            match &self.nodes[at] {
                Node::Leaf { .. } => return at,
                Node::Split {
                    feature,
                    rule,
                    left,
                    right,
                    ..
                } => {
                    at = if rule.goes_left(sample[feature.index()]) {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }
}

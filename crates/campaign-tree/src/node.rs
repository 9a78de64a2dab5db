use std::fmt;

/// Position of a predictor column in the row layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Column position, starting at 0.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slot of a node in the tree arena. The root is slot 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena slot, starting at 0.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Impurity of a node under the tree's [`crate::SplitCriterion`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Raw value; 0 for a pure node.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// How a feature column is interpreted by the splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Ordered real values, split by threshold.
    Numeric,
    /// Level codes `0..n_levels` stored as `f64`, split by level subset.
    Categorical {
        /// Number of distinct levels in the column.
        n_levels: usize,
    },
}

/// The routing rule of an interior node.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRule {
    /// Samples with `value <= threshold` go left.
    Threshold(f64),
    /// Samples whose level code is flagged in `goes_left` go left.
    Categories {
        /// One flag per level code.
        goes_left: Vec<bool>,
        /// Direction for codes outside `goes_left`.
        default_left: bool,
    },
}

impl SplitRule {
    /// Return `true` when a sample with this cell value is routed left.
    #[must_use]
    pub fn goes_left(&self, value: f64) -> bool {
        match self {
            SplitRule::Threshold(threshold) => value <= *threshold,
            SplitRule::Categories {
                goes_left,
                default_left,
            } => {
                if value < 0.0 || value.fract() != 0.0 {
                    return *default_left;
                }
                goes_left
                    .get(value as usize)
                    .copied()
                    .unwrap_or(*default_left)
            }
        }
    }
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by
/// [`NodeIndex`] rather than pointers. Both variants keep the binary class
/// counts of the training rows that reached them, which is what pruning
/// needs to collapse a split back into a leaf.
#[derive(Debug, Clone)]
pub enum Node {
    /// An interior split node.
    Split {
        /// Feature used for the split.
        feature: FeatureIndex,
        /// Routing rule applied to the feature value.
        rule: SplitRule,
        /// Index of the left child node.
        left: NodeIndex,
        /// Index of the right child node.
        right: NodeIndex,
        /// Impurity at this node before splitting.
        impurity: Impurity,
        /// Training rows per class (`[no, yes]`) that reached this node.
        class_counts: [usize; 2],
        /// Weighted decrease in impurity from this split.
        impurity_decrease: f64,
    },
    /// A terminal leaf node.
    Leaf {
        /// Training rows per class (`[no, yes]`) in this leaf.
        class_counts: [usize; 2],
        /// Impurity at this leaf.
        impurity: Impurity,
    },
}

impl Node {
    /// Return the impurity at this node (before splitting for interior nodes).
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    /// Return the class counts of the training rows that reached this node.
    #[must_use]
    pub fn class_counts(&self) -> [usize; 2] {
        match self {
            Node::Split { class_counts, .. } | Node::Leaf { class_counts, .. } => *class_counts,
        }
    }

    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        let [no, yes] = self.class_counts();
        no + yes
    }

    /// Share of positive-class training rows at this node; 0.0 when empty.
    #[must_use]
    pub fn positive_rate(&self) -> f64 {
        let n = self.n_samples();
        if n == 0 {
            0.0
        } else {
            self.class_counts()[1] as f64 / n as f64
        }
    }

    /// Majority class; ties resolve to class 0.
    #[must_use]
    pub fn prediction(&self) -> usize {
        let [no, yes] = self.class_counts();
        usize::from(yes > no)
    }

    /// Misclassification count if this node were a leaf.
    #[must_use]
    pub fn risk(&self) -> usize {
        let [no, yes] = self.class_counts();
        no.min(yes)
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

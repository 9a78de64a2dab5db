//! Binary CART decision trees: grow, prune, tune, score.
//!
//! Provides a hand-rolled classification tree for a two-class target with
//! numeric and categorical features, Gini/Entropy split criteria,
//! weakest-link cost-complexity pruning, and a stratified cross-validated
//! search for the pruning complexity.

mod error;
mod node;
mod prune;
mod split;
mod tree;
mod tuning;

pub use error::TreeError;
pub use node::{FeatureKind, Impurity};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
pub use tuning::{ComplexityGrid, ComplexityScore, ComplexitySearch, ComplexitySearchResult};

//! Accuracy regression tests for campaign-tree.
//!
//! These tests verify that algorithmic changes do not degrade decision tree
//! accuracy on a deterministic, imbalanced two-class dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use campaign_tree::{ComplexitySearch, DecisionTreeConfig, FeatureKind};

// ---------------------------------------------------------------------------
// Helper: deterministic imbalanced dataset
// ---------------------------------------------------------------------------

/// Generate a 600-sample dataset with roughly one positive in six.
///
/// Feature 0 is numeric and informative (positives sit higher).
/// Feature 1 is a 4-level category where level 3 is strongly positive.
/// Features 2-4 are numeric noise in [0, 1).
fn make_imbalanced() -> (Vec<Vec<f64>>, Vec<usize>, Vec<FeatureKind>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let n_samples = 600;

    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let label = usize::from(i % 6 == 0);
        labels.push(label);
        let signal = if label == 1 { 1.0 } else { 0.0 };
        let level = if label == 1 {
            if rng.r#gen::<f64>() < 0.8 { 3.0 } else { 0.0 }
        } else {
            f64::from(rng.gen_range(0u8..3))
        };
        let mut row = vec![signal + rng.r#gen::<f64>() * 1.5, level];
        row.extend((0..3).map(|_| rng.r#gen::<f64>()));
        features.push(row);
    }
    let kinds = vec![
        FeatureKind::Numeric,
        FeatureKind::Categorical { n_levels: 4 },
        FeatureKind::Numeric,
        FeatureKind::Numeric,
        FeatureKind::Numeric,
    ];
    (features, labels, kinds)
}

fn accuracy(tree: &campaign_tree::DecisionTree, features: &[Vec<f64>], labels: &[usize]) -> f64 {
    let correct = features
        .iter()
        .zip(labels)
        .filter(|(row, label)| {
            usize::from(tree.score_probability(row).unwrap() > 0.5) == **label
        })
        .count();
    correct as f64 / labels.len() as f64
}

// ---------------------------------------------------------------------------
// a) training_accuracy_above_threshold
// ---------------------------------------------------------------------------

/// Default-config training accuracy must beat the 5/6 majority baseline.
#[test]
fn training_accuracy_above_threshold() {
    let (features, labels, kinds) = make_imbalanced();
    let tree = DecisionTreeConfig::new()
        .fit(&features, &labels, &kinds)
        .unwrap();
    let acc = accuracy(&tree, &features, &labels);
    assert!(acc > 0.9, "training accuracy {acc} <= 0.9");
}

// ---------------------------------------------------------------------------
// b) top_feature_is_informative
// ---------------------------------------------------------------------------

/// The most important feature must be one of the two informative columns.
#[test]
fn top_feature_is_informative() {
    let (features, labels, kinds) = make_imbalanced();
    let tree = DecisionTreeConfig::new()
        .fit(&features, &labels, &kinds)
        .unwrap();
    let importances = tree.feature_importances();
    let top = importances
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert!(top <= 1, "top feature {top}; importances {importances:?}");
}

// ---------------------------------------------------------------------------
// c) tuned_complexity_generalizes
// ---------------------------------------------------------------------------

/// The cross-validated error of the selected complexity must beat the
/// majority-class error rate of 1/6.
#[test]
fn tuned_complexity_generalizes() {
    let (features, labels, kinds) = make_imbalanced();
    let result = ComplexitySearch::new(5)
        .unwrap()
        .with_seed(42)
        .search(&DecisionTreeConfig::new(), &features, &labels, &kinds)
        .unwrap();
    let best = result.best_score().unwrap();
    assert!(
        best.mean_error < 1.0 / 6.0,
        "cv error {} at cp = {}",
        best.mean_error,
        result.best_complexity
    );
}

// ---------------------------------------------------------------------------
// d) pruning_shrinks_tree
// ---------------------------------------------------------------------------

/// A heavily pruned tree must not have more leaves than a lightly pruned one.
#[test]
fn pruning_shrinks_tree() {
    let (features, labels, kinds) = make_imbalanced();
    let light = DecisionTreeConfig::new()
        .with_complexity(0.0)
        .fit(&features, &labels, &kinds)
        .unwrap();
    let heavy = DecisionTreeConfig::new()
        .with_complexity(0.1)
        .fit(&features, &labels, &kinds)
        .unwrap();
    assert!(heavy.n_leaves() <= light.n_leaves());
    assert!(heavy.n_leaves() >= 1);
}

// ---------------------------------------------------------------------------
// e) fit_is_deterministic
// ---------------------------------------------------------------------------

#[test]
fn fit_is_deterministic() {
    let (features, labels, kinds) = make_imbalanced();
    let a = DecisionTreeConfig::new().fit(&features, &labels, &kinds).unwrap();
    let b = DecisionTreeConfig::new().fit(&features, &labels, &kinds).unwrap();
    assert_eq!(a.n_nodes(), b.n_nodes());
    for row in &features {
        assert_eq!(a.score_probability(row).unwrap(), b.score_probability(row).unwrap());
    }
}

//! Per-strategy results and the profit-ranked comparison.

use campaign_io::{ComparisonReport, FailedStrategy, FeatureWeight, RunMeta, StrategyRow};

use crate::EvalError;
use crate::confusion::ConfusionMatrix;
use crate::economics::Economics;
use crate::importance::RankedFeature;
use crate::strategy::Strategy;

/// Everything one strategy produced on the test split.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyResult {
    strategy: Strategy,
    confusion: ConfusionMatrix,
    economics: Economics,
    train_rows: usize,
    train_class_counts: [usize; 2],
    complexity: f64,
    n_leaves: usize,
    depth: usize,
    top_features: Vec<RankedFeature>,
}

impl StrategyResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        strategy: Strategy,
        confusion: ConfusionMatrix,
        economics: Economics,
        train_rows: usize,
        train_class_counts: [usize; 2],
        complexity: f64,
        n_leaves: usize,
        depth: usize,
        top_features: Vec<RankedFeature>,
    ) -> Self {
        Self {
            strategy,
            confusion,
            economics,
            train_rows,
            train_class_counts,
            complexity,
            n_leaves,
            depth,
            top_features,
        }
    }

    /// Return the strategy.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Return the strategy display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Return the test-split confusion matrix.
    #[must_use]
    pub fn confusion(&self) -> &ConfusionMatrix {
        &self.confusion
    }

    /// Return the rates and profit.
    #[must_use]
    pub fn economics(&self) -> &Economics {
        &self.economics
    }

    /// Return the total profit.
    #[must_use]
    pub fn total_profit(&self) -> f64 {
        self.economics.total_profit
    }

    /// Return the number of rows the tree was trained on.
    #[must_use]
    pub fn train_rows(&self) -> usize {
        self.train_rows
    }

    /// Return the balanced training class counts as `[no, yes]`.
    #[must_use]
    pub fn train_class_counts(&self) -> [usize; 2] {
        self.train_class_counts
    }

    /// Return the complexity parameter the tree was pruned with.
    #[must_use]
    pub fn complexity(&self) -> f64 {
        self.complexity
    }

    /// Return the number of leaves of the fitted tree.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// Return the depth of the fitted tree.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Return the most important features, descending.
    #[must_use]
    pub fn top_features(&self) -> &[RankedFeature] {
        &self.top_features
    }

    fn to_row(&self) -> StrategyRow {
        StrategyRow {
            balancing: self.name().to_string(),
            accuracy: self.economics.accuracy,
            sensitivity: self.economics.sensitivity,
            specificity: self.economics.specificity,
            contacts_made: self.economics.contacts_made,
            tp: self.confusion.tp(),
            fp: self.confusion.fp(),
            tn: self.confusion.tn(),
            fn_: self.confusion.fn_(),
            total_profit: self.economics.total_profit,
            train_rows: self.train_rows,
            complexity: self.complexity,
            n_leaves: self.n_leaves,
            top_features: self
                .top_features
                .iter()
                .map(|f| FeatureWeight {
                    name: f.name.clone(),
                    importance: f.importance,
                })
                .collect(),
        }
    }
}

/// A strategy whose pipeline stopped with an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    /// The failed strategy.
    pub strategy: Strategy,
    /// Rendered error message.
    pub error: String,
}

/// Successful results ranked by profit, plus the failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTable {
    ranked: Vec<StrategyResult>,
    failures: Vec<StrategyFailure>,
}

impl ComparisonTable {
    /// Return the results, by total profit descending.
    #[must_use]
    pub fn ranked(&self) -> &[StrategyResult] {
        &self.ranked
    }

    /// Return the failed strategies, in canonical order.
    #[must_use]
    pub fn failures(&self) -> &[StrategyFailure] {
        &self.failures
    }

    /// Return the most profitable result, if any strategy succeeded.
    #[must_use]
    pub fn best(&self) -> Option<&StrategyResult> {
        self.ranked.first()
    }

    /// Flatten into the plain report records used by the writers.
    #[must_use]
    pub fn to_report(&self, meta: RunMeta) -> ComparisonReport {
        ComparisonReport {
            meta,
            rows: self.ranked.iter().map(StrategyResult::to_row).collect(),
            failures: self
                .failures
                .iter()
                .map(|f| FailedStrategy {
                    balancing: f.strategy.name().to_string(),
                    error: f.error.clone(),
                })
                .collect(),
        }
    }
}

/// Rank strategy outcomes by total profit, descending.
///
/// Outcomes are first put in canonical strategy order, then stably sorted
/// by profit, so tied profits keep canonical order regardless of input
/// order. Failed outcomes are listed separately, never scored.
#[must_use]
pub fn compare(outcomes: Vec<(Strategy, Result<StrategyResult, EvalError>)>) -> ComparisonTable {
    let mut outcomes = outcomes;
    outcomes.sort_by_key(|(strategy, _)| *strategy);

    let mut ranked = Vec::new();
    let mut failures = Vec::new();
    for (strategy, outcome) in outcomes {
        match outcome {
            Ok(result) => ranked.push(result),
            Err(e) => failures.push(StrategyFailure {
                strategy,
                error: e.to_string(),
            }),
        }
    }

    ranked.sort_by(|a, b| b.total_profit().total_cmp(&a.total_profit()));

    ComparisonTable { ranked, failures }
}

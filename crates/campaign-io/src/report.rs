//! Plain report records for the strategy comparison.
//!
//! These carry primitives only, so the writer has no dependency on the
//! training or evaluation crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Run-level settings echoed into every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    /// Master seed of the run.
    pub seed: u64,
    /// Fraction of rows used for training.
    pub train_fraction: f64,
    /// Rows in the training split.
    pub n_train: usize,
    /// Rows in the test split.
    pub n_test: usize,
    /// Positive (`yes`) rows in the test split.
    pub n_test_yes: usize,
    /// Cost of one contact.
    pub cost_per_contact: f64,
    /// Revenue of one subscription.
    pub revenue_per_sale: f64,
    /// Decision threshold on the predicted `yes` probability.
    pub threshold: f64,
}

/// A feature and its importance in one strategy's tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    /// Column name.
    pub name: String,
    /// Normalized mean decrease in impurity.
    pub importance: f64,
}

/// One ranked row of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRow {
    /// Strategy display name.
    pub balancing: String,
    /// `(TP + TN) / total`.
    pub accuracy: f64,
    /// `TP / (TP + FN)`.
    pub sensitivity: f64,
    /// `TN / (TN + FP)`.
    pub specificity: f64,
    /// `TP + FP`.
    pub contacts_made: usize,
    /// True positives.
    pub tp: usize,
    /// False positives.
    pub fp: usize,
    /// True negatives.
    pub tn: usize,
    /// False negatives.
    #[serde(rename = "fn")]
    pub fn_: usize,
    /// Profit of contacting every predicted `yes`.
    pub total_profit: f64,
    /// Rows in the balanced training set.
    pub train_rows: usize,
    /// Complexity parameter the tree was pruned with.
    pub complexity: f64,
    /// Leaves in the fitted tree.
    pub n_leaves: usize,
    /// Most important features, descending.
    pub top_features: Vec<FeatureWeight>,
}

/// A strategy that produced no result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedStrategy {
    /// Strategy display name.
    pub balancing: String,
    /// Rendered error message.
    pub error: String,
}

/// The full comparison: ranked rows, failures, and run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Run settings.
    pub meta: RunMeta,
    /// Successful strategies, by total profit descending.
    pub rows: Vec<StrategyRow>,
    /// Strategies that failed.
    pub failures: Vec<FailedStrategy>,
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12} {:>9} {:>11} {:>11} {:>9} {:>6} {:>13}",
            "Balancing", "Accuracy", "Sensitivity", "Specificity", "Contacts", "TP", "TotalProfit"
        )?;
        writeln!(f, "{}", "-".repeat(76))?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<12} {:>9.4} {:>11.4} {:>11.4} {:>9} {:>6} {:>13.0}",
                row.balancing,
                row.accuracy,
                row.sensitivity,
                row.specificity,
                row.contacts_made,
                row.tp,
                row.total_profit
            )?;
        }
        for failure in &self.failures {
            writeln!(f, "{:<12} failed: {}", failure.balancing, failure.error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_report() -> ComparisonReport {
        let row = |balancing: &str, tp: usize, fp: usize, total_profit: f64| StrategyRow {
            balancing: balancing.to_string(),
            accuracy: 0.8,
            sensitivity: 0.7,
            specificity: 0.85,
            contacts_made: tp + fp,
            tp,
            fp,
            tn: 100,
            fn_: 10,
            total_profit,
            train_rows: 500,
            complexity: 0.01,
            n_leaves: 9,
            top_features: vec![FeatureWeight {
                name: "duration".to_string(),
                importance: 0.6,
            }],
        };
        ComparisonReport {
            meta: RunMeta {
                seed: 42,
                train_fraction: 0.7,
                n_train: 700,
                n_test: 300,
                n_test_yes: 50,
                cost_per_contact: 100.0,
                revenue_per_sale: 3000.0,
                threshold: 0.5,
            },
            rows: vec![row("Upsample", 40, 10, 115_000.0), row("None", 20, 5, 57_500.0)],
            failures: vec![FailedStrategy {
                balancing: "Hybrid".to_string(),
                error: "insufficient data".to_string(),
            }],
        }
    }

    #[test]
    fn display_lists_rows_in_order_then_failures() {
        let text = sample_report().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Balancing"));
        assert!(lines[2].starts_with("Upsample"));
        assert!(lines[2].ends_with("115000"));
        assert!(lines[3].starts_with("None"));
        assert!(lines[4].contains("failed: insufficient data"));
    }
}

//! Classification rates and the contact-campaign profit formula.

use std::fmt;

use tracing::debug;

use crate::EvalError;
use crate::confusion::ConfusionMatrix;

/// A rate computed from the confusion matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// `(TP + TN) / total`.
    Accuracy,
    /// `TP / (TP + FN)`.
    Sensitivity,
    /// `TN / (TN + FP)`.
    Specificity,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Accuracy => "accuracy",
            Metric::Sensitivity => "sensitivity",
            Metric::Specificity => "specificity",
        })
    }
}

/// Money and decision settings for scoring a campaign.
///
/// Construct via [`EconomicConfig::new`], then chain `with_*` methods and
/// finish with [`EconomicConfig::validate`] or let [`evaluate`] check it.
///
/// # Defaults
///
/// | Parameter          | Default |
/// |--------------------|---------|
/// | `cost_per_contact` | 100     |
/// | `revenue_per_sale` | 3000    |
/// | `threshold`        | 0.5     |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EconomicConfig {
    cost_per_contact: f64,
    revenue_per_sale: f64,
    threshold: f64,
}

impl Default for EconomicConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EconomicConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cost_per_contact: 100.0,
            revenue_per_sale: 3000.0,
            threshold: 0.5,
        }
    }

    /// Set the cost charged for every predicted-`yes` contact.
    #[must_use]
    pub fn with_cost_per_contact(mut self, cost_per_contact: f64) -> Self {
        self.cost_per_contact = cost_per_contact;
        self
    }

    /// Set the revenue credited for every true positive.
    #[must_use]
    pub fn with_revenue_per_sale(mut self, revenue_per_sale: f64) -> Self {
        self.revenue_per_sale = revenue_per_sale;
        self
    }

    /// Set the decision threshold: `yes` iff `P(yes) > threshold`.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Return the cost per contact.
    #[must_use]
    pub fn cost_per_contact(&self) -> f64 {
        self.cost_per_contact
    }

    /// Return the revenue per sale.
    #[must_use]
    pub fn revenue_per_sale(&self) -> f64 {
        self.revenue_per_sale
    }

    /// Return the decision threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Check that money amounts are finite and non-negative and the
    /// threshold lies in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidAmount`] or [`EvalError::InvalidThreshold`].
    pub fn validate(&self) -> Result<(), EvalError> {
        for (field, value) in [
            ("cost_per_contact", self.cost_per_contact),
            ("revenue_per_sale", self.revenue_per_sale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EvalError::InvalidAmount { field, value });
            }
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(EvalError::InvalidThreshold {
                threshold: self.threshold,
            });
        }
        Ok(())
    }
}

/// Rates and profit of one strategy on the test split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Economics {
    /// `(TP + TN) / total`.
    pub accuracy: f64,
    /// `TP / (TP + FN)`.
    pub sensitivity: f64,
    /// `TN / (TN + FP)`.
    pub specificity: f64,
    /// `TP + FP`: every predicted `yes` is contacted.
    pub contacts_made: usize,
    /// `revenue_per_sale * TP - cost_per_contact * contacts_made`.
    pub total_profit: f64,
}

/// Turn a confusion matrix into rates and profit.
///
/// Only contacts and true positives enter the profit: false negatives and
/// true negatives carry no money.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EvalError::InvalidAmount`] / [`EvalError::InvalidThreshold`] | Invalid `config` |
/// | [`EvalError::UndefinedMetric`] | Empty matrix, `TP + FN = 0`, or `TN + FP = 0` |
pub fn evaluate(cm: &ConfusionMatrix, config: &EconomicConfig) -> Result<Economics, EvalError> {
    config.validate()?;

    let accuracy = rate(cm.tp() + cm.tn(), cm.total(), Metric::Accuracy, "TP + TN + FP + FN")?;
    let sensitivity = rate(cm.tp(), cm.tp() + cm.fn_(), Metric::Sensitivity, "TP + FN")?;
    let specificity = rate(cm.tn(), cm.tn() + cm.fp(), Metric::Specificity, "TN + FP")?;

    let contacts_made = cm.tp() + cm.fp();
    let total_profit = config.revenue_per_sale * cm.tp() as f64
        - config.cost_per_contact * contacts_made as f64;

    debug!(accuracy, sensitivity, specificity, contacts_made, total_profit, "economics evaluated");

    Ok(Economics {
        accuracy,
        sensitivity,
        specificity,
        contacts_made,
        total_profit,
    })
}

fn rate(
    numerator: usize,
    denominator: usize,
    metric: Metric,
    cells: &'static str,
) -> Result<f64, EvalError> {
    if denominator == 0 {
        return Err(EvalError::UndefinedMetric {
            metric,
            denominator: cells,
        });
    }
    Ok(numerator as f64 / denominator as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profit_formula() {
        let cm = ConfusionMatrix::new(40, 10, 200, 5);
        let econ = evaluate(&cm, &EconomicConfig::new()).unwrap();
        assert_eq!(econ.contacts_made, 50);
        assert!((econ.total_profit - 115_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rates() {
        let cm = ConfusionMatrix::new(40, 10, 200, 5);
        let econ = evaluate(&cm, &EconomicConfig::new()).unwrap();
        assert!((econ.accuracy - 240.0 / 255.0).abs() < 1e-12);
        assert!((econ.sensitivity - 40.0 / 45.0).abs() < 1e-12);
        assert!((econ.specificity - 200.0 / 210.0).abs() < 1e-12);
    }

    #[test]
    fn profit_can_be_negative() {
        let cm = ConfusionMatrix::new(1, 100, 50, 3);
        let econ = evaluate(&cm, &EconomicConfig::new()).unwrap();
        assert!((econ.total_profit - (3000.0 - 100.0 * 101.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn custom_money() {
        let cm = ConfusionMatrix::new(10, 10, 10, 10);
        let cfg = EconomicConfig::new()
            .with_cost_per_contact(5.0)
            .with_revenue_per_sale(20.0);
        let econ = evaluate(&cm, &cfg).unwrap();
        assert!((econ.total_profit - (200.0 - 100.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn sensitivity_undefined_without_positives() {
        let cm = ConfusionMatrix::new(0, 3, 7, 0);
        let err = evaluate(&cm, &EconomicConfig::new()).unwrap_err();
        assert!(matches!(
            err,
            EvalError::UndefinedMetric {
                metric: Metric::Sensitivity,
                ..
            }
        ));
    }

    #[test]
    fn specificity_undefined_without_negatives() {
        let cm = ConfusionMatrix::new(4, 0, 0, 2);
        let err = evaluate(&cm, &EconomicConfig::new()).unwrap_err();
        assert!(matches!(
            err,
            EvalError::UndefinedMetric {
                metric: Metric::Specificity,
                ..
            }
        ));
    }

    #[test]
    fn invalid_config_rejected() {
        let cm = ConfusionMatrix::new(1, 1, 1, 1);
        assert!(matches!(
            evaluate(&cm, &EconomicConfig::new().with_cost_per_contact(-1.0)),
            Err(EvalError::InvalidAmount {
                field: "cost_per_contact",
                ..
            })
        ));
        assert!(matches!(
            evaluate(&cm, &EconomicConfig::new().with_revenue_per_sale(f64::INFINITY)),
            Err(EvalError::InvalidAmount { .. })
        ));
        assert!(matches!(
            evaluate(&cm, &EconomicConfig::new().with_threshold(1.5)),
            Err(EvalError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn evaluate_is_pure() {
        let cm = ConfusionMatrix::new(12, 8, 70, 10);
        let cfg = EconomicConfig::new();
        assert_eq!(evaluate(&cm, &cfg).unwrap(), evaluate(&cm, &cfg).unwrap());
    }
}

//! The six class-balancing strategies as one tagged dispatch.

use std::fmt;
use std::str::FromStr;

use campaign_io::Table;
use campaign_sample::{SyntheticConfig, downsample, hybrid, require_both_classes, upsample};
use tracing::{info, instrument};

use crate::EvalError;

/// A remedy for class imbalance, applied to the training split.
///
/// Variants are declared in canonical order, which is also their `Ord`
/// order and the tie-break order of the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strategy {
    /// Train on the split as is.
    Baseline,
    /// Replicate minority rows up to the majority count.
    Upsample,
    /// Subsample majority rows down to the minority count.
    Downsample,
    /// Replace the split with smoothed-bootstrap synthetic rows.
    Synthetic,
    /// Downsample halfway, then synthesise back to a balanced table.
    Hybrid,
    /// Keep the data, pick the pruning complexity by cross-validation.
    Tuned,
}

impl Strategy {
    /// Every strategy, in canonical order.
    pub const ALL: [Strategy; 6] = [
        Strategy::Baseline,
        Strategy::Upsample,
        Strategy::Downsample,
        Strategy::Synthetic,
        Strategy::Hybrid,
        Strategy::Tuned,
    ];

    /// Position in canonical order, starting at 0.
    #[must_use]
    pub fn ordinal(self) -> u64 {
        self as u64
    }

    /// Display name used in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Baseline => "None",
            Strategy::Upsample => "Upsample",
            Strategy::Downsample => "Downsample",
            Strategy::Synthetic => "Synthetic",
            Strategy::Hybrid => "Hybrid",
            Strategy::Tuned => "Tuned",
        }
    }

    /// Return `true` when the strategy tunes the complexity parameter.
    #[must_use]
    pub fn tunes_complexity(self) -> bool {
        matches!(self, Strategy::Tuned)
    }

    /// Build this strategy's training table from `train`.
    ///
    /// `seed` drives every random draw; the synthetic settings are used by
    /// `Synthetic` and `Hybrid` with their seed replaced by `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Sample`] wrapping
    /// [`campaign_sample::SampleError::InsufficientData`] when either class
    /// is empty before or after the transformation, or any other resampling
    /// error.
    #[instrument(skip_all, fields(strategy = self.name(), n_rows = train.n_rows(), seed = seed))]
    pub fn balance(
        self,
        train: &Table,
        seed: u64,
        synthetic: &SyntheticConfig,
    ) -> Result<Table, EvalError> {
        let balanced = match self {
            Strategy::Baseline | Strategy::Tuned => train.clone(),
            Strategy::Upsample => upsample(train, seed)?,
            Strategy::Downsample => downsample(train, seed)?,
            Strategy::Synthetic => synthetic.clone().with_seed(seed).generate(train)?,
            Strategy::Hybrid => hybrid(train, &synthetic.clone().with_seed(seed))?,
        };
        require_both_classes(&balanced, self.name())?;

        let [n_no, n_yes] = balanced.class_counts();
        info!(n_rows = balanced.n_rows(), n_no, n_yes, "training set balanced");
        Ok(balanced)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = EvalError;

    /// Parse a display name or a common alias, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "baseline" => Ok(Strategy::Baseline),
            "upsample" | "up" => Ok(Strategy::Upsample),
            "downsample" | "down" => Ok(Strategy::Downsample),
            "synthetic" | "syntheticoversample" | "rose" => Ok(Strategy::Synthetic),
            "hybrid" => Ok(Strategy::Hybrid),
            "tuned" | "hyperparametertuned" | "cv" => Ok(Strategy::Tuned),
            _ => Err(EvalError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_io::{Column, Subscribed};
    use campaign_sample::SampleError;

    fn train() -> Table {
        Table::new(
            vec![Column::numeric("x")],
            (0..30).map(|i| vec![f64::from(i)]).collect(),
            (0..30)
                .map(|i| {
                    if i % 6 == 0 {
                        Subscribed::Yes
                    } else {
                        Subscribed::No
                    }
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn canonical_order() {
        let mut shuffled = vec![Strategy::Tuned, Strategy::Baseline, Strategy::Hybrid];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Strategy::Baseline, Strategy::Hybrid, Strategy::Tuned]
        );
        assert_eq!(Strategy::ALL[3].ordinal(), 3);
    }

    #[test]
    fn identity_strategies_keep_the_table() {
        let cfg = SyntheticConfig::new();
        assert_eq!(Strategy::Baseline.balance(&train(), 1, &cfg).unwrap(), train());
        assert_eq!(Strategy::Tuned.balance(&train(), 1, &cfg).unwrap(), train());
    }

    #[test]
    fn resampling_strategies_balance() {
        let cfg = SyntheticConfig::new();
        for strategy in [
            Strategy::Upsample,
            Strategy::Downsample,
            Strategy::Synthetic,
            Strategy::Hybrid,
        ] {
            let out = strategy.balance(&train(), 7, &cfg).unwrap();
            let [no, yes] = out.class_counts();
            assert_eq!(no, yes, "{strategy} unbalanced");
        }
    }

    #[test]
    fn single_class_is_insufficient_for_every_strategy() {
        let single = Table::new(
            vec![Column::numeric("x")],
            vec![vec![1.0], vec![2.0]],
            vec![Subscribed::No, Subscribed::No],
        )
        .unwrap();
        for strategy in Strategy::ALL {
            let err = strategy
                .balance(&single, 0, &SyntheticConfig::new())
                .unwrap_err();
            assert!(
                matches!(
                    err,
                    EvalError::Sample(SampleError::InsufficientData {
                        class: Subscribed::Yes,
                        ..
                    })
                ),
                "{strategy}: {err}"
            );
        }
    }

    #[test]
    fn parse_names_and_aliases() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!("ROSE".parse::<Strategy>().unwrap(), Strategy::Synthetic);
        assert!("smote".parse::<Strategy>().is_err());
    }
}

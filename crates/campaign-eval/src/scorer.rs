//! Threshold scoring of a fitted tree against a table.

use campaign_io::{Subscribed, Table};
use campaign_tree::{DecisionTree, FeatureKind};

use crate::EvalError;

/// Map a table's column schema to the kinds the tree splitter expects.
#[must_use]
pub fn feature_kinds(table: &Table) -> Vec<FeatureKind> {
    table
        .columns()
        .iter()
        .map(|column| match column.kind().n_levels() {
            Some(n_levels) => FeatureKind::Categorical { n_levels },
            None => FeatureKind::Numeric,
        })
        .collect()
}

/// Predict one label per row: `Yes` iff `P(yes) > threshold`.
///
/// The comparison is strict, so a score equal to the threshold is `No`.
/// Predictions are aligned with `table.labels()`.
///
/// # Errors
///
/// Returns [`EvalError::Tree`] if the table width does not match the model.
pub fn classify(
    model: &DecisionTree,
    table: &Table,
    threshold: f64,
) -> Result<Vec<Subscribed>, EvalError> {
    table
        .rows()
        .iter()
        .map(|row| {
            let p_yes = model.score_probability(row)?;
            Ok(if p_yes > threshold {
                Subscribed::Yes
            } else {
                Subscribed::No
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_io::Column;
    use campaign_tree::DecisionTreeConfig;

    fn loose() -> DecisionTreeConfig {
        DecisionTreeConfig::new()
            .with_min_samples_split(2)
            .with_min_samples_leaf(1)
            .with_complexity(0.0)
    }

    #[test]
    fn half_probability_predicts_no() {
        // One unsplittable leaf holding one row of each class: P(yes) = 0.5.
        let table = Table::new(
            vec![Column::numeric("x")],
            vec![vec![1.0], vec![1.0]],
            vec![Subscribed::No, Subscribed::Yes],
        )
        .unwrap();
        let model = loose()
            .fit(table.rows(), &table.label_indices(), &feature_kinds(&table))
            .unwrap();
        assert!((model.score_probability(&[1.0]).unwrap() - 0.5).abs() < f64::EPSILON);
        assert_eq!(classify(&model, &table, 0.5).unwrap(), vec![Subscribed::No; 2]);
        // Any lower threshold flips the tie to yes.
        assert_eq!(classify(&model, &table, 0.49).unwrap(), vec![Subscribed::Yes; 2]);
    }

    #[test]
    fn predictions_align_with_rows() {
        let table = Table::new(
            vec![Column::numeric("x")],
            vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0]],
            vec![Subscribed::No, Subscribed::No, Subscribed::Yes, Subscribed::Yes],
        )
        .unwrap();
        let model = loose()
            .fit(table.rows(), &table.label_indices(), &feature_kinds(&table))
            .unwrap();
        assert_eq!(classify(&model, &table, 0.5).unwrap(), table.labels());
    }

    #[test]
    fn width_mismatch_is_reported() {
        let train = Table::new(
            vec![Column::numeric("x")],
            vec![vec![1.0], vec![2.0]],
            vec![Subscribed::No, Subscribed::Yes],
        )
        .unwrap();
        let model = loose()
            .fit(train.rows(), &train.label_indices(), &feature_kinds(&train))
            .unwrap();
        let wide = Table::new(
            vec![Column::numeric("x"), Column::numeric("y")],
            vec![vec![1.0, 2.0]],
            vec![Subscribed::No],
        )
        .unwrap();
        assert!(matches!(classify(&model, &wide, 0.5), Err(EvalError::Tree(_))));
    }

    #[test]
    fn kinds_follow_schema() {
        let table = Table::new(
            vec![
                Column::numeric("age"),
                Column::categorical("job", vec!["a".into(), "b".into()]),
            ],
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(
            feature_kinds(&table),
            vec![FeatureKind::Numeric, FeatureKind::Categorical { n_levels: 2 }]
        );
    }
}

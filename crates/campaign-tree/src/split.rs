use crate::node::{FeatureIndex, FeatureKind, Impurity, SplitRule};

/// Node impurity measure used to rank candidate splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// `1 - p_no² - p_yes²`
    Gini,
    /// `-(p_no·ln p_no + p_yes·ln p_yes)`
    Entropy,
}

impl SplitCriterion {
    /// Impurity of a node holding `class_counts` out of `n_samples` rows.
    ///
    /// An empty node is pure.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let total = n_samples as f64;
        let shares = class_counts
            .iter()
            .filter(|&&count| count > 0)
            .map(|&count| count as f64 / total);
        Impurity::new(match self {
            SplitCriterion::Gini => 1.0 - shares.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -shares.map(|p| p * p.ln()).sum::<f64>(),
        })
    }
}

/// The winning split of a node and how its rows divide.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) rule: SplitRule,
    /// `n·I(parent) - n_l·I(left) - n_r·I(right)`, in row units.
    pub(crate) impurity_decrease: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Shared inputs of the per-feature scans at one node.
struct NodeScan<'a> {
    labels: &'a [usize],
    rows: &'a [usize],
    totals: [usize; 2],
    parent: Impurity,
    criterion: &'a SplitCriterion,
    min_samples_leaf: usize,
}

impl NodeScan<'_> {
    /// Score moving `left` out of the node, or `None` if either side is
    /// smaller than the leaf minimum.
    fn score(&self, left: [usize; 2]) -> Option<f64> {
        let right = [self.totals[0] - left[0], self.totals[1] - left[1]];
        let n_left = left[0] + left[1];
        let n_right = right[0] + right[1];
        if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
            return None;
        }
        let n = (n_left + n_right) as f64;
        Some(
            n * self.parent.value()
                - n_left as f64 * self.criterion.impurity(&left, n_left).value()
                - n_right as f64 * self.criterion.impurity(&right, n_right).value(),
        )
    }

    /// Best midpoint threshold of a numeric column.
    fn numeric(&self, column: &[f64]) -> Option<(f64, SplitRule)> {
        let mut order = self.rows.to_vec();
        order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));

        let mut left = [0usize; 2];
        let mut best: Option<(f64, f64)> = None;
        for pair in order.windows(2) {
            let (here, next) = (pair[0], pair[1]);
            left[self.labels[here]] += 1;
            if column[here] == column[next] {
                continue;
            }
            if let Some(decrease) = self.score(left)
                && best.is_none_or(|(d, _)| decrease > d)
            {
                best = Some((decrease, (column[here] + column[next]) / 2.0));
            }
        }
        best.map(|(decrease, threshold)| (decrease, SplitRule::Threshold(threshold)))
    }

    /// Best level subset of a categorical column.
    ///
    /// Levels seen at the node are ordered by their `yes` share; for a
    /// two-class target the optimal subset is a prefix of that order.
    fn categorical(&self, column: &[f64], n_levels: usize) -> Option<(f64, SplitRule)> {
        let mut per_level = vec![[0usize; 2]; n_levels];
        for &row in self.rows {
            per_level[column[row] as usize][self.labels[row]] += 1;
        }
        let share = |level: usize| {
            let [no, yes] = per_level[level];
            yes as f64 / (no + yes) as f64
        };

        let mut seen: Vec<usize> = (0..n_levels)
            .filter(|&level| per_level[level] != [0, 0])
            .collect();
        if seen.len() < 2 {
            return None;
        }
        seen.sort_by(|&a, &b| share(a).total_cmp(&share(b)).then(a.cmp(&b)));

        let mut left = [0usize; 2];
        let mut best: Option<(f64, usize, [usize; 2])> = None;
        for (cut, &level) in seen[..seen.len() - 1].iter().enumerate() {
            left[0] += per_level[level][0];
            left[1] += per_level[level][1];
            if let Some(decrease) = self.score(left)
                && best.is_none_or(|(d, _, _)| decrease > d)
            {
                best = Some((decrease, cut + 1, left));
            }
        }

        let (decrease, cut, left) = best?;
        // Unseen levels follow the larger child.
        let n_left = left[0] + left[1];
        let default_left = 2 * n_left >= self.rows.len();
        let mut goes_left = vec![default_left; n_levels];
        for (position, &level) in seen.iter().enumerate() {
            goes_left[level] = position < cut;
        }
        Some((
            decrease,
            SplitRule::Categories {
                goes_left,
                default_left,
            },
        ))
    }
}

/// Find the best split of `rows` over every column.
///
/// `features` is column-major: `features[column][row]`. Returns `None`
/// when every column is constant at the node or every split would leave a
/// child below `min_samples_leaf`. On equal decrease the earlier column and
/// the earlier boundary win.
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    kinds: &[FeatureKind],
    labels: &[usize],
    rows: &[usize],
    criterion: &SplitCriterion,
    min_samples_leaf: usize,
) -> Option<SplitResult> {
    if rows.len() < 2 {
        return None;
    }

    let mut totals = [0usize; 2];
    for &row in rows {
        totals[labels[row]] += 1;
    }
    let scan = NodeScan {
        labels,
        rows,
        totals,
        parent: criterion.impurity(&totals, rows.len()),
        criterion,
        min_samples_leaf,
    };

    let mut best: Option<(FeatureIndex, f64, SplitRule)> = None;
    for (column_index, (column, kind)) in features.iter().zip(kinds).enumerate() {
        let found = match *kind {
            FeatureKind::Numeric => scan.numeric(column),
            FeatureKind::Categorical { n_levels } => scan.categorical(column, n_levels),
        };
        if let Some((decrease, rule)) = found
            && best.as_ref().is_none_or(|(_, d, _)| decrease > *d)
        {
            best = Some((FeatureIndex::new(column_index), decrease, rule));
        }
    }

    let (feature, impurity_decrease, rule) = best?;
    let column = &features[feature.index()];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .copied()
        .partition(|&row| rule.goes_left(column[row]));

    Some(SplitResult {
        feature,
        rule,
        impurity_decrease,
        left_indices,
        right_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::{SplitCriterion, find_best_split};
    use crate::node::{FeatureKind, SplitRule};

    fn all_rows(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn impurity_of_pure_and_even_nodes() {
        assert_eq!(SplitCriterion::Gini.impurity(&[8, 0], 8).value(), 0.0);
        assert_eq!(SplitCriterion::Entropy.impurity(&[0, 3], 3).value(), 0.0);
        assert!((SplitCriterion::Gini.impurity(&[4, 4], 8).value() - 0.5).abs() < 1e-12);
        assert!(
            (SplitCriterion::Entropy.impurity(&[4, 4], 8).value() - std::f64::consts::LN_2).abs()
                < 1e-12
        );
    }

    #[test]
    fn empty_node_is_pure() {
        assert_eq!(SplitCriterion::Gini.impurity(&[0, 0], 0).value(), 0.0);
    }

    #[test]
    fn call_duration_threshold_sits_between_the_classes() {
        let duration = vec![90.0, 120.0, 150.0, 610.0, 700.0, 820.0];
        let subscribed = vec![0, 0, 0, 1, 1, 1];

        let split = find_best_split(
            &[duration],
            &[FeatureKind::Numeric],
            &subscribed,
            &all_rows(6),
            &SplitCriterion::Gini,
            1,
        )
        .unwrap();

        assert_eq!(split.feature.index(), 0);
        assert_eq!(split.rule, SplitRule::Threshold(380.0));
        assert_eq!(split.left_indices, vec![0, 1, 2]);
        assert_eq!(split.right_indices, vec![3, 4, 5]);
        // Parent Gini 0.5 over six rows, both children pure.
        assert!((split.impurity_decrease - 3.0).abs() < 1e-12);
    }

    #[test]
    fn levels_are_grouped_by_subscription_share() {
        // Levels 1 and 3 only subscribe, 0 and 2 never do; level 4 is unseen.
        let outcome = vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0];
        let subscribed = vec![0, 1, 0, 1, 0, 1, 0, 1];

        let split = find_best_split(
            &[outcome],
            &[FeatureKind::Categorical { n_levels: 5 }],
            &subscribed,
            &all_rows(8),
            &SplitCriterion::Entropy,
            1,
        )
        .unwrap();

        let SplitRule::Categories {
            goes_left,
            default_left,
        } = &split.rule
        else {
            panic!("expected a category rule, got {:?}", split.rule);
        };
        assert_eq!(&goes_left[..4], &[true, false, true, false]);
        assert!(*default_left);
        assert_eq!(goes_left[4], *default_left);
        assert_eq!(split.left_indices, vec![0, 2, 4, 6]);
    }

    #[test]
    fn earlier_column_wins_a_tie() {
        let column = vec![1.0, 2.0, 3.0, 4.0];
        let subscribed = vec![0, 0, 1, 1];
        let split = find_best_split(
            &[column.clone(), column],
            &[FeatureKind::Numeric, FeatureKind::Numeric],
            &subscribed,
            &all_rows(4),
            &SplitCriterion::Gini,
            1,
        )
        .unwrap();
        assert_eq!(split.feature.index(), 0);
    }

    #[test]
    fn no_split_on_constant_columns() {
        let subscribed = vec![0, 1, 1];
        assert!(
            find_best_split(
                &[vec![35.0; 3], vec![2.0; 3]],
                &[FeatureKind::Numeric, FeatureKind::Categorical { n_levels: 3 }],
                &subscribed,
                &all_rows(3),
                &SplitCriterion::Gini,
                1,
            )
            .is_none()
        );
    }

    #[test]
    fn leaf_minimum_blocks_small_children() {
        let balance = vec![-200.0, 50.0, 3000.0];
        let subscribed = vec![0, 0, 1];
        assert!(
            find_best_split(
                &[balance],
                &[FeatureKind::Numeric],
                &subscribed,
                &all_rows(3),
                &SplitCriterion::Gini,
                2,
            )
            .is_none()
        );
    }
}

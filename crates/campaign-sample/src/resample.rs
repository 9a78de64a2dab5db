//! Random upsampling and downsampling of the two classes.

use campaign_io::{Subscribed, Table};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::SampleError;

/// Return `(minority, majority)`. Equal counts make `Yes` the minority.
#[must_use]
pub fn class_roles(table: &Table) -> (Subscribed, Subscribed) {
    let [no, yes] = table.class_counts();
    let minority = if yes <= no {
        Subscribed::Yes
    } else {
        Subscribed::No
    };
    (minority, minority.other())
}

/// Fail with [`SampleError::InsufficientData`] unless both classes have rows.
///
/// # Errors
///
/// Returns [`SampleError::InsufficientData`] naming the first empty class.
pub fn require_both_classes(table: &Table, operation: &'static str) -> Result<(), SampleError> {
    for class in [Subscribed::No, Subscribed::Yes] {
        if table.count(class) == 0 {
            return Err(SampleError::InsufficientData { operation, class });
        }
    }
    Ok(())
}

/// Grow the minority class to the majority size.
///
/// Every input row is kept in order, followed by `majority - minority`
/// minority rows drawn with replacement. The result has
/// `2 * majority` rows.
///
/// # Errors
///
/// Returns [`SampleError::InsufficientData`] if either class has no rows.
#[instrument(skip_all, fields(n_rows = table.n_rows(), seed = seed))]
pub fn upsample(table: &Table, seed: u64) -> Result<Table, SampleError> {
    require_both_classes(table, "upsample")?;
    let (minority, majority) = class_roles(table);
    let pool = table.indices_of(minority);
    let deficit = table.count(majority) - pool.len();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..table.n_rows()).collect();
    indices.extend((0..deficit).map(|_| pool[rng.gen_range(0..pool.len())]));

    debug!(%minority, deficit, "minority upsampled");
    Ok(table.subset(&indices))
}

/// Shrink the majority class to the minority size.
///
/// Every minority row is kept; `minority` majority rows are drawn without
/// replacement. Surviving rows keep their input order. The result has
/// `2 * minority` rows.
///
/// # Errors
///
/// Returns [`SampleError::InsufficientData`] if either class has no rows.
#[instrument(skip_all, fields(n_rows = table.n_rows(), seed = seed))]
pub fn downsample(table: &Table, seed: u64) -> Result<Table, SampleError> {
    require_both_classes(table, "downsample")?;
    let (minority, _) = class_roles(table);
    downsample_majority(table, table.count(minority), seed)
}

/// Keep `target` randomly chosen majority rows and every minority row.
///
/// `target` is clamped to the majority size. Surviving rows keep their
/// input order.
///
/// # Errors
///
/// Returns [`SampleError::InsufficientData`] if either class has no rows.
pub fn downsample_majority(table: &Table, target: usize, seed: u64) -> Result<Table, SampleError> {
    require_both_classes(table, "downsample")?;
    let (_, majority) = class_roles(table);
    let pool = table.indices_of(majority);
    let keep_count = target.min(pool.len());

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut keep = vec![false; table.n_rows()];
    for &idx in pool.choose_multiple(&mut rng, keep_count) {
        keep[idx] = true;
    }
    for (idx, label) in table.labels().iter().enumerate() {
        if *label != majority {
            keep[idx] = true;
        }
    }

    let indices: Vec<usize> = (0..table.n_rows()).filter(|&i| keep[i]).collect();
    debug!(%majority, kept = keep_count, dropped = pool.len() - keep_count, "majority downsampled");
    Ok(table.subset(&indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_io::Column;

    /// 10 rows, rows 2 and 7 are `Yes`.
    fn imbalanced() -> Table {
        Table::new(
            vec![Column::numeric("x")],
            (0..10).map(|i| vec![i as f64]).collect(),
            (0..10)
                .map(|i| {
                    if i == 2 || i == 7 {
                        Subscribed::Yes
                    } else {
                        Subscribed::No
                    }
                })
                .collect(),
        )
        .unwrap()
    }

    fn single_class() -> Table {
        Table::new(
            vec![Column::numeric("x")],
            vec![vec![1.0], vec![2.0]],
            vec![Subscribed::No, Subscribed::No],
        )
        .unwrap()
    }

    #[test]
    fn roles_follow_counts() {
        assert_eq!(class_roles(&imbalanced()), (Subscribed::Yes, Subscribed::No));

        let mostly_yes = Table::new(
            vec![Column::numeric("x")],
            vec![vec![1.0], vec![2.0], vec![3.0]],
            vec![Subscribed::Yes, Subscribed::No, Subscribed::Yes],
        )
        .unwrap();
        assert_eq!(class_roles(&mostly_yes), (Subscribed::No, Subscribed::Yes));
    }

    #[test]
    fn equal_counts_make_yes_the_minority() {
        let even = Table::new(
            vec![Column::numeric("x")],
            vec![vec![1.0], vec![2.0]],
            vec![Subscribed::No, Subscribed::Yes],
        )
        .unwrap();
        assert_eq!(class_roles(&even), (Subscribed::Yes, Subscribed::No));
    }

    #[test]
    fn upsample_keeps_originals_first() {
        let source = imbalanced();
        let up = upsample(&source, 1).unwrap();
        assert_eq!(up.class_counts(), [8, 8]);
        assert_eq!(&up.rows()[..10], source.rows());
        for (row, label) in up.rows()[10..].iter().zip(&up.labels()[10..]) {
            assert_eq!(*label, Subscribed::Yes);
            assert!(row[0] == 2.0 || row[0] == 7.0);
        }
    }

    #[test]
    fn downsample_preserves_input_order() {
        let down = downsample(&imbalanced(), 1).unwrap();
        assert_eq!(down.class_counts(), [2, 2]);
        let xs: Vec<f64> = down.rows().iter().map(|r| r[0]).collect();
        let mut sorted = xs.clone();
        sorted.sort_by(f64::total_cmp);
        assert_eq!(xs, sorted);
        assert!(xs.contains(&2.0) && xs.contains(&7.0));
    }

    #[test]
    fn downsample_draws_without_replacement() {
        let down = downsample_majority(&imbalanced(), 5, 9).unwrap();
        let mut xs: Vec<f64> = down.rows().iter().map(|r| r[0]).collect();
        xs.dedup();
        assert_eq!(xs.len(), 7);
    }

    #[test]
    fn downsample_target_is_clamped() {
        let down = downsample_majority(&imbalanced(), 100, 9).unwrap();
        assert_eq!(down, imbalanced());
    }

    #[test]
    fn resampling_is_seeded() {
        assert_eq!(upsample(&imbalanced(), 5).unwrap(), upsample(&imbalanced(), 5).unwrap());
        assert_eq!(
            downsample(&imbalanced(), 5).unwrap(),
            downsample(&imbalanced(), 5).unwrap()
        );
    }

    #[test]
    fn single_class_is_insufficient() {
        assert!(matches!(
            upsample(&single_class(), 0),
            Err(SampleError::InsufficientData {
                class: Subscribed::Yes,
                ..
            })
        ));
        assert!(matches!(
            downsample(&single_class(), 0),
            Err(SampleError::InsufficientData { .. })
        ));
    }
}

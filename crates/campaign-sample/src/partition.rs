//! Seeded train/test partitioning.

use campaign_io::Table;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::SampleError;

/// Train/test partition configuration.
///
/// Construct via [`Partition::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `seed`    | 42      |
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    train_fraction: f64,
    seed: u64,
}

/// The two disjoint sides of a partition.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    train: Table,
    test: Table,
    train_indices: Vec<usize>,
    test_indices: Vec<usize>,
}

impl TrainTestSplit {
    /// Return the training table.
    #[must_use]
    pub fn train(&self) -> &Table {
        &self.train
    }

    /// Return the held-out test table.
    #[must_use]
    pub fn test(&self) -> &Table {
        &self.test
    }

    /// Return the source row indices of the training table, in its order.
    #[must_use]
    pub fn train_indices(&self) -> &[usize] {
        &self.train_indices
    }

    /// Return the source row indices of the test table, in its order.
    #[must_use]
    pub fn test_indices(&self) -> &[usize] {
        &self.test_indices
    }
}

impl Partition {
    /// Create a partition that puts `train_fraction` of the rows in training.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::InvalidTrainFraction`] unless `0 < train_fraction < 1`.
    pub fn new(train_fraction: f64) -> Result<Self, SampleError> {
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(SampleError::InvalidTrainFraction { train_fraction });
        }
        Ok(Self {
            train_fraction,
            seed: 42,
        })
    }

    /// Set the random seed for the row permutation.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the train fraction.
    #[must_use]
    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }

    /// Return the permutation seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Split `table` without replacement.
    ///
    /// Row indices are shuffled once; the first `round(train_fraction * N)`
    /// form the training table and the rest the test table, each in
    /// permutation order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SampleError::EmptyDataset`] | `table` has no rows |
    /// | [`SampleError::EmptyPartition`] | Either side would have no rows |
    #[instrument(
        skip_all,
        fields(n_rows = table.n_rows(), train_fraction = self.train_fraction, seed = self.seed)
    )]
    pub fn split(&self, table: &Table) -> Result<TrainTestSplit, SampleError> {
        let n_rows = table.n_rows();
        if n_rows == 0 {
            return Err(SampleError::EmptyDataset);
        }

        let n_train = (self.train_fraction * n_rows as f64).round() as usize;
        let n_test = n_rows - n_train.min(n_rows);
        if n_train == 0 || n_test == 0 {
            return Err(SampleError::EmptyPartition {
                n_rows,
                n_train,
                n_test,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut permutation: Vec<usize> = (0..n_rows).collect();
        permutation.shuffle(&mut rng);

        let test_indices = permutation.split_off(n_train);
        let train_indices = permutation;

        let split = TrainTestSplit {
            train: table.subset(&train_indices),
            test: table.subset(&test_indices),
            train_indices,
            test_indices,
        };

        let [train_no, train_yes] = split.train.class_counts();
        let [test_no, test_yes] = split.test.class_counts();
        info!(
            n_train,
            n_test, train_no, train_yes, test_no, test_yes, "dataset partitioned"
        );

        Ok(split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_io::{Column, Subscribed};

    fn table(n: usize) -> Table {
        Table::new(
            vec![Column::numeric("x")],
            (0..n).map(|i| vec![i as f64]).collect(),
            (0..n)
                .map(|i| {
                    if i % 4 == 0 {
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
    fn sizes_follow_rounded_fraction() {
        let split = Partition::new(0.7).unwrap().split(&table(10)).unwrap();
        assert_eq!(split.train().n_rows(), 7);
        assert_eq!(split.test().n_rows(), 3);

        let split = Partition::new(0.75).unwrap().split(&table(11)).unwrap();
        // 8.25 rounds to 8.
        assert_eq!(split.train().n_rows(), 8);
    }

    #[test]
    fn rows_follow_indices() {
        let source = table(20);
        let split = Partition::new(0.5).unwrap().with_seed(3).split(&source).unwrap();
        for (row, &idx) in split.train().rows().iter().zip(split.train_indices()) {
            assert_eq!(row, &source.rows()[idx]);
        }
        for (label, &idx) in split.test().labels().iter().zip(split.test_indices()) {
            assert_eq!(*label, source.labels()[idx]);
        }
    }

    #[test]
    fn different_seeds_give_different_permutations() {
        let source = table(50);
        let a = Partition::new(0.7).unwrap().with_seed(1).split(&source).unwrap();
        let b = Partition::new(0.7).unwrap().with_seed(2).split(&source).unwrap();
        assert_ne!(a.train_indices(), b.train_indices());
    }

    #[test]
    fn invalid_fraction_rejected() {
        for fraction in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(
                matches!(
                    Partition::new(fraction),
                    Err(SampleError::InvalidTrainFraction { .. })
                ),
                "fraction {fraction} accepted"
            );
        }
    }

    #[test]
    fn empty_side_rejected() {
        let err = Partition::new(0.9).unwrap().split(&table(2)).unwrap_err();
        assert!(matches!(
            err,
            SampleError::EmptyPartition {
                n_rows: 2,
                n_train: 2,
                n_test: 0
            }
        ));
    }

    #[test]
    fn empty_dataset_rejected() {
        let err = Partition::new(0.7).unwrap().split(&table(0)).unwrap_err();
        assert!(matches!(err, SampleError::EmptyDataset));
    }
}

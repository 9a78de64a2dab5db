//! Smoothed-bootstrap synthetic oversampling.
//!
//! Each synthetic row starts from a random real row of the same class.
//! Numeric cells are jittered with Gaussian kernel noise whose bandwidth
//! follows the normal-reference rule for a product kernel; categorical cells
//! are copied unchanged.

use campaign_io::{Subscribed, Table};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::SampleError;
use crate::resample::{class_roles, downsample_majority, require_both_classes};

/// Synthetic oversampling configuration.
///
/// Construct via [`SyntheticConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default                |
/// |---------------------|------------------------|
/// | `n_rows`            | `None` (input size)    |
/// | `positive_fraction` | 0.5                    |
/// | `shrink`            | 1.0                    |
/// | `seed`              | 42                     |
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    n_rows: Option<usize>,
    positive_fraction: f64,
    shrink: f64,
    seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            n_rows: None,
            positive_fraction: 0.5,
            shrink: 1.0,
            seed: 42,
        }
    }

    /// Set the number of rows to generate. `None` uses the input size.
    #[must_use]
    pub fn with_n_rows(mut self, n_rows: Option<usize>) -> Self {
        self.n_rows = n_rows;
        self
    }

    /// Set the share of generated rows labelled `Yes`.
    #[must_use]
    pub fn with_positive_fraction(mut self, positive_fraction: f64) -> Self {
        self.positive_fraction = positive_fraction;
        self
    }

    /// Set the multiplier applied to every kernel bandwidth. `0.0` turns the
    /// generator into a plain class-balanced bootstrap.
    #[must_use]
    pub fn with_shrink(mut self, shrink: f64) -> Self {
        self.shrink = shrink;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the requested row count, if any.
    #[must_use]
    pub fn n_rows(&self) -> Option<usize> {
        self.n_rows
    }

    /// Return the positive fraction.
    #[must_use]
    pub fn positive_fraction(&self) -> f64 {
        self.positive_fraction
    }

    /// Return the bandwidth multiplier.
    #[must_use]
    pub fn shrink(&self) -> f64 {
        self.shrink
    }

    /// Return the seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn validate(&self) -> Result<(), SampleError> {
        if let Some(n_rows) = self.n_rows
            && n_rows == 0
        {
            return Err(SampleError::InvalidTargetSize { n_rows });
        }
        if !(0.0..=1.0).contains(&self.positive_fraction) {
            return Err(SampleError::InvalidPositiveFraction {
                positive_fraction: self.positive_fraction,
            });
        }
        if !self.shrink.is_finite() || self.shrink < 0.0 {
            return Err(SampleError::InvalidShrink {
                shrink: self.shrink,
            });
        }
        Ok(())
    }

    /// Generate a fully synthetic table from `table`.
    ///
    /// The output has `N` rows (`n_rows`, or the input size), of which
    /// exactly `round(N * positive_fraction)` are `Yes`, in shuffled order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SampleError::InvalidTargetSize`] | `n_rows` is `Some(0)` |
    /// | [`SampleError::InvalidPositiveFraction`] | Fraction outside `[0, 1]` |
    /// | [`SampleError::InvalidShrink`] | Shrink negative or not finite |
    /// | [`SampleError::InsufficientData`] | Either class has no rows |
    #[instrument(skip_all, fields(n_rows = table.n_rows(), seed = self.seed))]
    pub fn generate(&self, table: &Table) -> Result<Table, SampleError> {
        self.validate()?;
        require_both_classes(table, "synthetic oversampling")?;

        let n_out = self.n_rows.unwrap_or(table.n_rows());
        let n_yes = (n_out as f64 * self.positive_fraction).round() as usize;
        let n_no = n_out - n_yes;

        let numeric: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_numeric())
            .map(|(i, _)| i)
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut rows = Vec::with_capacity(n_out);
        let mut labels = Vec::with_capacity(n_out);

        for (class, count) in [(Subscribed::No, n_no), (Subscribed::Yes, n_yes)] {
            let members = table.indices_of(class);
            let bandwidths = self.bandwidths(table, &members, &numeric);
            debug!(%class, count, pool = members.len(), "generating synthetic rows");

            for _ in 0..count {
                let source = members[rng.gen_range(0..members.len())];
                let mut row = table.rows()[source].clone();
                for (&col, &h) in numeric.iter().zip(&bandwidths) {
                    row[col] += h * standard_normal(&mut rng);
                }
                rows.push(row);
                labels.push(class);
            }
        }

        let mut order: Vec<usize> = (0..n_out).collect();
        order.shuffle(&mut rng);
        let rows = order.iter().map(|&i| rows[i].clone()).collect();
        let labels = order.iter().map(|&i| labels[i]).collect();

        let synthetic = table.with_rows(rows, labels)?;
        info!(n_out, n_yes, n_no, "synthetic table generated");
        Ok(synthetic)
    }

    /// Kernel bandwidth per numeric column for one class:
    /// `shrink * (4 / ((q + 2) * n))^(1 / (q + 4)) * sd`.
    fn bandwidths(&self, table: &Table, members: &[usize], numeric: &[usize]) -> Vec<f64> {
        let q = numeric.len() as f64;
        let n = members.len() as f64;
        let constant = (4.0 / ((q + 2.0) * n)).powf(1.0 / (q + 4.0));

        numeric
            .iter()
            .map(|&col| {
                let values: Vec<f64> = members.iter().map(|&i| table.rows()[i][col]).collect();
                self.shrink * constant * sample_sd(&values)
            })
            .collect()
    }
}

/// Unbiased sample standard deviation; 0.0 for fewer than two values.
fn sample_sd(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Box-Muller draw from N(0, 1).
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Downsample, then synthesise.
///
/// The majority class is first reduced to
/// `target = floor((majority + minority) / 2)` rows, keeping every minority
/// row, using `synthetic.seed()`. The reduced table is then replaced by
/// `2 * target` synthetic rows with a positive fraction of 0.5, seeded with
/// `synthetic.seed() + 1`. The bandwidth multiplier comes from `synthetic`;
/// its size and fraction settings are ignored.
///
/// # Errors
///
/// Returns [`SampleError::InsufficientData`] if either class has no rows,
/// or [`SampleError::InvalidShrink`] from the synthetic stage.
#[instrument(skip_all, fields(n_rows = table.n_rows(), seed = synthetic.seed()))]
pub fn hybrid(table: &Table, synthetic: &SyntheticConfig) -> Result<Table, SampleError> {
    require_both_classes(table, "hybrid")?;
    let (minority, majority) = class_roles(table);
    let target = (table.count(majority) + table.count(minority)) / 2;

    let reduced = downsample_majority(table, target, synthetic.seed())?;
    debug!(target, reduced_rows = reduced.n_rows(), "hybrid downsampling stage done");

    synthetic
        .clone()
        .with_n_rows(Some(2 * target))
        .with_positive_fraction(0.5)
        .with_seed(synthetic.seed().wrapping_add(1))
        .generate(&reduced)
}

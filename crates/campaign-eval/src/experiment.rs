//! The end-to-end comparison: partition once, run every strategy, rank.

use campaign_io::{RunMeta, Subscribed, Table};
use campaign_sample::{Partition, SyntheticConfig};
use campaign_tree::{
    ComplexityGrid, ComplexitySearch, ComplexitySearchResult, DecisionTreeConfig,
};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{info, instrument, warn};

use crate::EvalError;
use crate::compare::{ComparisonTable, StrategyResult, compare};
use crate::confusion::ConfusionMatrix;
use crate::economics::{EconomicConfig, evaluate};
use crate::importance::rank_features;
use crate::scorer::{classify, feature_kinds};
use crate::strategy::Strategy;

/// Settings for a full strategy comparison.
///
/// Construct via [`ExperimentConfig::new`], then chain `with_*` methods.
/// Values are checked when the experiment runs.
///
/// # Defaults
///
/// | Parameter        | Default                                  |
/// |------------------|------------------------------------------|
/// | `train_fraction` | 0.7                                      |
/// | `seed`           | 42                                       |
/// | `tree`           | [`DecisionTreeConfig::new`]              |
/// | `synthetic`      | [`SyntheticConfig::new`]                 |
/// | `n_folds`        | 5                                        |
/// | `grid`           | geometric, 10 values in `[1e-4, 0.1]`    |
/// | `economics`      | [`EconomicConfig::new`]                  |
/// | `strategies`     | all six, canonical order                 |
/// | `top_features`   | 5                                        |
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    train_fraction: f64,
    seed: u64,
    tree: DecisionTreeConfig,
    synthetic: SyntheticConfig,
    n_folds: usize,
    grid: ComplexityGrid,
    economics: EconomicConfig,
    strategies: Vec<Strategy>,
    top_features: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            train_fraction: 0.7,
            seed: 42,
            tree: DecisionTreeConfig::new(),
            synthetic: SyntheticConfig::new(),
            n_folds: 5,
            grid: ComplexityGrid::default(),
            economics: EconomicConfig::new(),
            strategies: Strategy::ALL.to_vec(),
            top_features: 5,
        }
    }

    /// Set the fraction of rows used for training.
    #[must_use]
    pub fn with_train_fraction(mut self, train_fraction: f64) -> Self {
        self.train_fraction = train_fraction;
        self
    }

    /// Set the master seed. Strategy `k` (canonical ordinal) uses `seed + k`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the tree settings shared by every strategy.
    #[must_use]
    pub fn with_tree(mut self, tree: DecisionTreeConfig) -> Self {
        self.tree = tree;
        self
    }

    /// Set the synthetic oversampling settings. The seed is overridden per
    /// strategy.
    #[must_use]
    pub fn with_synthetic(mut self, synthetic: SyntheticConfig) -> Self {
        self.synthetic = synthetic;
        self
    }

    /// Set the number of cross-validation folds of the tuned strategy.
    #[must_use]
    pub fn with_n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    /// Set the complexity grid of the tuned strategy.
    #[must_use]
    pub fn with_grid(mut self, grid: ComplexityGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Set the money and threshold settings.
    #[must_use]
    pub fn with_economics(mut self, economics: EconomicConfig) -> Self {
        self.economics = economics;
        self
    }

    /// Set the strategies to run. Duplicates are dropped and the list is
    /// put in canonical order.
    #[must_use]
    pub fn with_strategies(mut self, strategies: impl IntoIterator<Item = Strategy>) -> Self {
        let mut strategies: Vec<Strategy> = strategies.into_iter().collect();
        strategies.sort();
        strategies.dedup();
        self.strategies = strategies;
        self
    }

    /// Set how many top features each result keeps.
    #[must_use]
    pub fn with_top_features(mut self, top_features: usize) -> Self {
        self.top_features = top_features;
        self
    }

    /// Return the training fraction.
    #[must_use]
    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }

    /// Return the master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the tree settings.
    #[must_use]
    pub fn tree(&self) -> &DecisionTreeConfig {
        &self.tree
    }

    /// Return the synthetic settings.
    #[must_use]
    pub fn synthetic(&self) -> &SyntheticConfig {
        &self.synthetic
    }

    /// Return the number of cross-validation folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Return the complexity grid.
    #[must_use]
    pub fn grid(&self) -> &ComplexityGrid {
        &self.grid
    }

    /// Return the economic settings.
    #[must_use]
    pub fn economics(&self) -> &EconomicConfig {
        &self.economics
    }

    /// Return the selected strategies, in canonical order.
    #[must_use]
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Return how many top features each result keeps.
    #[must_use]
    pub fn top_features(&self) -> usize {
        self.top_features
    }

    /// Seed used by `strategy`'s random draws.
    #[must_use]
    pub fn strategy_seed(&self, strategy: Strategy) -> u64 {
        self.seed.wrapping_add(strategy.ordinal())
    }

    fn search(&self, seed: u64) -> Result<ComplexitySearch, EvalError> {
        Ok(ComplexitySearch::new(self.n_folds)?
            .with_grid(self.grid.clone())
            .with_seed(seed))
    }

    fn partition(&self) -> Result<Partition, EvalError> {
        Ok(Partition::new(self.train_fraction)?.with_seed(self.seed))
    }
}

/// One strategy's complete pipeline settings.
#[derive(Debug, Clone)]
pub struct StrategyPlan {
    /// The balancing strategy.
    pub strategy: Strategy,
    /// Seed for the balancing draws.
    pub seed: u64,
    /// Tree settings; the complexity is replaced when `search` is set.
    pub tree: DecisionTreeConfig,
    /// Synthetic oversampling settings.
    pub synthetic: SyntheticConfig,
    /// Cross-validated complexity search, if the strategy tunes.
    pub search: Option<ComplexitySearch>,
}

impl StrategyPlan {
    /// Balance `train`, fit a tree, and score it on `test`.
    ///
    /// # Errors
    ///
    /// Any balancing, training, scoring, or evaluation error of this
    /// strategy; see [`EvalError`].
    #[instrument(skip_all, fields(strategy = self.strategy.name(), seed = self.seed))]
    pub fn run(
        &self,
        train: &Table,
        test: &Table,
        economics: &EconomicConfig,
        top_features: usize,
    ) -> Result<StrategyResult, EvalError> {
        let balanced = self.strategy.balance(train, self.seed, &self.synthetic)?;
        let kinds = feature_kinds(&balanced);
        let labels = balanced.label_indices();

        let complexity = match &self.search {
            Some(search) => {
                search
                    .search(&self.tree, balanced.rows(), &labels, &kinds)?
                    .best_complexity
            }
            None => self.tree.complexity(),
        };

        let model = self
            .tree
            .clone()
            .with_complexity(complexity)
            .fit(balanced.rows(), &labels, &kinds)?;

        let predicted = classify(&model, test, economics.threshold())?;
        let confusion = ConfusionMatrix::from_subscribed(&predicted, test.labels())?;
        let scores = evaluate(&confusion, economics)?;
        let top = rank_features(
            &model.feature_importances(),
            &balanced.feature_names(),
            top_features,
        );

        info!(
            complexity,
            n_leaves = model.n_leaves(),
            tp = confusion.tp(),
            fp = confusion.fp(),
            total_profit = scores.total_profit,
            "strategy evaluated"
        );

        Ok(StrategyResult::new(
            self.strategy,
            confusion,
            scores,
            balanced.n_rows(),
            balanced.class_counts(),
            complexity,
            model.n_leaves(),
            model.depth(),
            top,
        ))
    }
}

/// Ranked comparison plus the run settings it was produced with.
#[derive(Debug, Clone)]
pub struct ExperimentOutcome {
    comparison: ComparisonTable,
    meta: RunMeta,
}

impl ExperimentOutcome {
    /// Return the ranked comparison.
    #[must_use]
    pub fn comparison(&self) -> &ComparisonTable {
        &self.comparison
    }

    /// Return the run settings and split sizes.
    #[must_use]
    pub fn meta(&self) -> &RunMeta {
        &self.meta
    }

    /// Flatten into the plain report consumed by the writers.
    #[must_use]
    pub fn to_report(&self) -> campaign_io::ComparisonReport {
        self.comparison.to_report(self.meta.clone())
    }
}

/// Runs the strategy comparison on a dataset.
#[derive(Debug, Clone)]
pub struct Experiment {
    config: ExperimentConfig,
}

impl Experiment {
    /// Create an experiment from its settings.
    #[must_use]
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Return the settings.
    #[must_use]
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Build the pipeline settings of one strategy.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Tree`] if the fold count is invalid for a
    /// tuning strategy.
    pub fn plan(&self, strategy: Strategy) -> Result<StrategyPlan, EvalError> {
        let seed = self.config.strategy_seed(strategy);
        let search = if strategy.tunes_complexity() {
            Some(self.config.search(seed)?)
        } else {
            None
        };
        Ok(StrategyPlan {
            strategy,
            seed,
            tree: self.config.tree.clone(),
            synthetic: self.config.synthetic.clone(),
            search,
        })
    }

    /// Partition `table` once and evaluate every selected strategy on the
    /// same split.
    ///
    /// Strategies run in parallel; results are collected in canonical
    /// order, so the outcome equals a sequential run. A failing strategy
    /// is reported in the comparison and does not stop the others.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::NoStrategies`] | The strategy list is empty |
    /// | [`EvalError::InvalidAmount`], [`EvalError::InvalidThreshold`] | Bad economic settings |
    /// | [`EvalError::Sample`] | The partition cannot be made |
    /// | [`EvalError::Tree`] | The fold count is invalid |
    #[instrument(skip_all, fields(n_rows = table.n_rows(), seed = self.config.seed))]
    pub fn run(&self, table: &Table) -> Result<ExperimentOutcome, EvalError> {
        if self.config.strategies.is_empty() {
            return Err(EvalError::NoStrategies);
        }
        self.config.economics.validate()?;

        let split = self.config.partition()?.split(table)?;
        let (train, test) = (split.train(), split.test());

        let plans = self
            .config
            .strategies
            .iter()
            .map(|&strategy| self.plan(strategy))
            .collect::<Result<Vec<_>, _>>()?;

        let outcomes: Vec<(Strategy, Result<StrategyResult, EvalError>)> = plans
            .par_iter()
            .map(|plan| {
                (
                    plan.strategy,
                    plan.run(train, test, &self.config.economics, self.config.top_features),
                )
            })
            .collect();

        for (strategy, outcome) in &outcomes {
            if let Err(e) = outcome {
                warn!(strategy = strategy.name(), error = %e, "strategy failed");
            }
        }

        let comparison = compare(outcomes);
        if let Some(best) = comparison.best() {
            info!(
                best = best.name(),
                total_profit = best.total_profit(),
                n_failed = comparison.failures().len(),
                "comparison complete"
            );
        }

        Ok(ExperimentOutcome {
            comparison,
            meta: RunMeta {
                seed: self.config.seed,
                train_fraction: self.config.train_fraction,
                n_train: train.n_rows(),
                n_test: test.n_rows(),
                n_test_yes: test.count(Subscribed::Yes),
                cost_per_contact: self.config.economics.cost_per_contact(),
                revenue_per_sale: self.config.economics.revenue_per_sale(),
                threshold: self.config.economics.threshold(),
            },
        })
    }

    /// Run the tuned strategy's complexity search on the training split
    /// alone and return the full error curve.
    ///
    /// Uses the same partition and fold seed as [`Experiment::run`], so the
    /// selected value matches the tuned row of the comparison.
    ///
    /// # Errors
    ///
    /// Partition, fold-count, or training errors.
    #[instrument(skip_all, fields(n_rows = table.n_rows(), seed = self.config.seed))]
    pub fn tune(&self, table: &Table) -> Result<ComplexitySearchResult, EvalError> {
        let split = self.config.partition()?.split(table)?;
        let train = split.train();
        let search = self
            .config
            .search(self.config.strategy_seed(Strategy::Tuned))?;
        let result = search.search(
            &self.config.tree,
            train.rows(),
            &train.label_indices(),
            &feature_kinds(train),
        )?;
        info!(
            best_complexity = result.best_complexity,
            n_values = result.scores.len(),
            "complexity tuned"
        );
        Ok(result)
    }
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use campaign_eval::{EconomicConfig, Experiment, ExperimentConfig, Strategy};
use campaign_io::{BankReader, ExperimentName, ReportWriter, Table};
use campaign_sample::SyntheticConfig;
use campaign_tree::{ComplexityGrid, DecisionTreeConfig, SplitCriterion};

#[derive(Parser)]
#[command(name = "campaign")]
#[command(about = "Rank class-balancing strategies for a bank marketing decision tree by profit")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input file and split settings.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the bank marketing CSV file
    #[arg(long)]
    data: PathBuf,

    /// Name of the yes/no target column
    #[arg(long, default_value = "deposit")]
    target: String,

    /// Field delimiter (use ';' for the UCI distribution)
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Fraction of rows used for training
    #[arg(long, default_value_t = 0.7)]
    train_fraction: f64,
}

/// Decision tree and complexity search settings.
#[derive(Args, Debug, Clone)]
struct TreeArgs {
    /// Split criterion: "gini" or "entropy"
    #[arg(long, default_value = "gini")]
    criterion: String,

    /// Maximum tree depth
    #[arg(long, default_value_t = 30)]
    max_depth: usize,

    /// Minimum rows in a node before a split is attempted
    #[arg(long, default_value_t = 20)]
    min_samples_split: usize,

    /// Minimum rows in each child of a split
    #[arg(long, default_value_t = 7)]
    min_samples_leaf: usize,

    /// Pruning complexity parameter for the untuned strategies
    #[arg(long, default_value_t = 0.01)]
    complexity: f64,

    /// Number of cross-validation folds for complexity tuning
    #[arg(long, default_value_t = 5)]
    cv_folds: usize,

    /// Smallest complexity value in the tuning grid
    #[arg(long, default_value_t = 1e-4)]
    grid_min: f64,

    /// Largest complexity value in the tuning grid
    #[arg(long, default_value_t = 0.1)]
    grid_max: f64,

    /// Number of geometrically spaced grid values
    #[arg(long, default_value_t = 10)]
    grid_size: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Train one tree per balancing strategy and rank them by campaign profit
    Compare {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        tree: TreeArgs,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for report files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Cost of contacting one client
        #[arg(long, default_value_t = 100.0)]
        cost: f64,

        /// Revenue of one subscription
        #[arg(long, default_value_t = 3000.0)]
        revenue: f64,

        /// Predict yes when P(yes) is strictly above this value
        #[arg(long, default_value_t = 0.5)]
        threshold: f64,

        /// Comma-separated strategies to run (defaults to all six)
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<Strategy>,

        /// Bandwidth multiplier for synthetic oversampling
        #[arg(long, default_value_t = 1.0)]
        shrink: f64,

        /// Number of top features kept per strategy
        #[arg(long, default_value_t = 5)]
        top_features: usize,
    },

    /// Cross-validate the pruning complexity on the training split
    Tune {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        tree: TreeArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct CompareOutput {
    experiment: String,
    n_rows: usize,
    n_train: usize,
    n_test: usize,
    best: Option<String>,
    ranking: Vec<RankingOutput>,
    failed: Vec<FailureOutput>,
    artifacts: Vec<PathBuf>,
}

#[derive(Serialize)]
struct RankingOutput {
    balancing: String,
    total_profit: f64,
    contacts_made: usize,
    tp: usize,
    accuracy: f64,
    sensitivity: f64,
    specificity: f64,
}

#[derive(Serialize)]
struct FailureOutput {
    balancing: String,
    error: String,
}

#[derive(Serialize)]
struct TuneOutput {
    n_train: usize,
    n_folds: usize,
    best_complexity: f64,
    curve: Vec<CurvePointOutput>,
}

#[derive(Serialize)]
struct CurvePointOutput {
    complexity: f64,
    mean_error: f64,
    std_error: f64,
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        other => anyhow::bail!("unknown criterion: {other} (expected gini or entropy)"),
    }
}

fn read_table(data: &DataArgs) -> Result<Table> {
    let delimiter = u8::try_from(data.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| {
            format!(
                "delimiter {:?} is not a single ASCII character",
                data.delimiter
            )
        })?;
    BankReader::new(&data.data)
        .with_target_column(data.target.as_str())
        .with_delimiter(delimiter)
        .read()
        .context("failed to read input CSV")
}

fn experiment_config(seed: u64, data: &DataArgs, tree: &TreeArgs) -> Result<ExperimentConfig> {
    let tree_config = DecisionTreeConfig::new()
        .with_criterion(parse_criterion(&tree.criterion)?)
        .with_max_depth(Some(tree.max_depth))
        .with_min_samples_split(tree.min_samples_split)
        .with_min_samples_leaf(tree.min_samples_leaf)
        .with_complexity(tree.complexity);

    Ok(ExperimentConfig::new()
        .with_seed(seed)
        .with_train_fraction(data.train_fraction)
        .with_tree(tree_config)
        .with_n_folds(tree.cv_folds)
        .with_grid(ComplexityGrid::Geometric {
            lower: tree.grid_min,
            upper: tree.grid_max,
            n_values: tree.grid_size,
        }))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Compare {
            data,
            tree,
            experiment,
            output_dir,
            cost,
            revenue,
            threshold,
            strategies,
            shrink,
            top_features,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let table = read_table(&data)?;

            let mut config = experiment_config(cli.seed, &data, &tree)?
                .with_economics(
                    EconomicConfig::new()
                        .with_cost_per_contact(cost)
                        .with_revenue_per_sale(revenue)
                        .with_threshold(threshold),
                )
                .with_synthetic(SyntheticConfig::new().with_shrink(shrink))
                .with_top_features(top_features);
            if !strategies.is_empty() {
                config = config.with_strategies(strategies);
            }

            let outcome = Experiment::new(config)
                .run(&table)
                .context("strategy comparison failed")?;
            let report = outcome.to_report();

            let writer = ReportWriter::new(&output_dir, experiment_name)?;
            let artifacts = writer.write_all(&report)?;

            let comparison = outcome.comparison();
            let output = CompareOutput {
                experiment,
                n_rows: table.n_rows(),
                n_train: outcome.meta().n_train,
                n_test: outcome.meta().n_test,
                best: comparison.best().map(|r| r.name().to_string()),
                ranking: comparison
                    .ranked()
                    .iter()
                    .map(|r| RankingOutput {
                        balancing: r.name().to_string(),
                        total_profit: r.total_profit(),
                        contacts_made: r.economics().contacts_made,
                        tp: r.confusion().tp(),
                        accuracy: r.economics().accuracy,
                        sensitivity: r.economics().sensitivity,
                        specificity: r.economics().specificity,
                    })
                    .collect(),
                failed: comparison
                    .failures()
                    .iter()
                    .map(|f| FailureOutput {
                        balancing: f.strategy.name().to_string(),
                        error: f.error.clone(),
                    })
                    .collect(),
                artifacts,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Tune { data, tree } => {
            let table = read_table(&data)?;
            let config = experiment_config(cli.seed, &data, &tree)?;

            let result = Experiment::new(config)
                .tune(&table)
                .context("complexity search failed")?;

            let output = TuneOutput {
                n_train: result.n_samples,
                n_folds: result.n_folds,
                best_complexity: result.best_complexity,
                curve: result
                    .scores
                    .iter()
                    .map(|s| CurvePointOutput {
                        complexity: s.complexity,
                        mean_error: s.mean_error,
                        std_error: s.std_error,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

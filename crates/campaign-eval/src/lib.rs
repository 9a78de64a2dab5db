//! Scoring, economic evaluation, and profit ranking of balancing strategies
//! for the bank marketing campaign.
//!
//! [`Experiment`] partitions a [`campaign_io::Table`] once, runs each
//! [`Strategy`] through balance, fit, classify and evaluate, and ranks the
//! results by total profit with [`compare`].

mod compare;
mod confusion;
mod economics;
mod error;
mod experiment;
mod importance;
mod scorer;
mod strategy;

pub use compare::{ComparisonTable, StrategyFailure, StrategyResult, compare};
pub use confusion::ConfusionMatrix;
pub use economics::{EconomicConfig, Economics, Metric, evaluate};
pub use error::EvalError;
pub use experiment::{Experiment, ExperimentConfig, ExperimentOutcome, StrategyPlan};
pub use importance::RankedFeature;
pub use scorer::{classify, feature_kinds};
pub use strategy::Strategy;

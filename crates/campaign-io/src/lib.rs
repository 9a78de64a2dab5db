//! Table types, CSV loading, and report writing for the campaign pipeline.

mod domain;
mod error;
mod reader;
mod report;
mod writer;

pub use domain::{Column, ColumnKind, ExperimentName, Subscribed, Table};
pub use error::IoError;
pub use reader::BankReader;
pub use report::{ComparisonReport, FailedStrategy, FeatureWeight, RunMeta, StrategyRow};
pub use writer::{ReportWriter, profit_chart};

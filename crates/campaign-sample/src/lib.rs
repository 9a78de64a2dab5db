//! Seeded partitioning and class-rebalancing of campaign tables.
//!
//! Every operation takes an explicit seed and draws from a `ChaCha8Rng`,
//! so identical inputs always give identical tables.

mod error;
mod partition;
mod resample;
mod synthetic;

pub use error::SampleError;
pub use partition::{Partition, TrainTestSplit};
pub use resample::{class_roles, downsample, downsample_majority, require_both_classes, upsample};
pub use synthetic::{SyntheticConfig, hybrid};

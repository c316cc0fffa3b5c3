//! Random forest classification over categorical items.
//!
//! Trains ID3 decision trees on bootstrap samples of labeled items, in
//! parallel via rayon, and combines them by majority vote. Includes
//! out-of-bag evaluation, cancellation, and model persistence.

mod cancel;
mod config;
mod confusion;
mod entropy;
mod error;
#[cfg(test)]
mod fixtures;
mod forest;
mod item;
mod node;
mod oob;
mod predict;
mod result;
mod serialize;
mod tree;

pub use cancel::CancellationToken;
pub use config::{MaxFeatures, OobMode};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use entropy::{EntropyCalculator, LabelCounts};
pub use error::{ErrorKind, ForestError};
pub use forest::{RandomForest, RandomForestTrainer};
pub use item::{AttributeValue, Item, Label, LabeledItem};
pub use node::Node;
pub use oob::OobScore;
pub use predict::Votes;
pub use result::TrainingResults;
pub use tree::{DecisionTree, DecisionTreeTrainer};

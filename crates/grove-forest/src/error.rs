use std::path::PathBuf;

use crate::item::Label;

/// Broad classification of a [`ForestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or insufficient training parameters.
    InvalidInput,
    /// Training was abandoned through a cancellation token.
    Cancelled,
    /// A post-training evaluation step could not be computed.
    Evaluation,
    /// Reading, writing, encoding or decoding a model failed.
    Persistence,
}

/// Errors from tree and forest operations.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when the requested tree count is zero.
    #[error("tree_count must be at least 1, got {tree_count}")]
    InvalidTreeCount {
        /// The invalid tree count provided.
        tree_count: usize,
    },

    /// Returned when the training set has zero items.
    #[error("training set has zero items")]
    EmptyTrainingSet,

    /// Returned when the attribute list is empty.
    #[error("attribute list is empty")]
    EmptyAttributes,

    /// Returned when the same attribute name is listed twice.
    #[error("attribute \"{attribute}\" is listed more than once")]
    DuplicateAttribute {
        /// The repeated attribute name.
        attribute: String,
    },

    /// Returned when a label distribution is built from a negative count.
    #[error("label {label} has negative count {count}")]
    NegativeLabelCount {
        /// The label carrying the negative count.
        label: Label,
        /// The offending count.
        count: i64,
    },

    /// Returned when an item has no value for a listed attribute.
    #[error("item \"{item_id}\" has no value for attribute \"{attribute}\"")]
    MissingAttribute {
        /// Identifier of the offending item.
        item_id: String,
        /// The attribute without a value.
        attribute: String,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when max_features resolves to 0 or exceeds the attribute count.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_attributes}]")]
    InvalidMaxFeatures {
        /// The resolved max_features value.
        max_features: usize,
        /// The number of candidate attributes.
        n_attributes: usize,
    },

    /// Returned when a forest would contain zero trees.
    #[error("a forest must contain at least one tree")]
    EmptyForest,

    /// Returned when training is abandoned through a cancellation token.
    #[error("training was cancelled")]
    Cancelled,

    /// Returned when OOB evaluation fails (no item has any OOB tree).
    #[error("OOB evaluation failed: {reason}")]
    OobEvaluationFailed {
        /// Human-readable description of why OOB evaluation failed.
        reason: String,
    },

    /// Returned when converting to or from the structural representation fails.
    #[error("failed to convert model to or from its structural form")]
    StructuralConversion {
        /// The underlying serde_json error.
        source: serde_json::Error,
    },

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// Path to the model file that could not be deserialized.
        path: PathBuf,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when loading a model with an incompatible format version.
    #[error("incompatible model version in {path}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// The model format version this build expects.
        expected: u32,
        /// The model format version found in the file.
        found: u32,
        /// Path to the model file with the incompatible version.
        path: PathBuf,
    },
}

impl ForestError {
    /// Return the broad kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForestError::InvalidTreeCount { .. }
            | ForestError::EmptyTrainingSet
            | ForestError::EmptyAttributes
            | ForestError::DuplicateAttribute { .. }
            | ForestError::NegativeLabelCount { .. }
            | ForestError::MissingAttribute { .. }
            | ForestError::InvalidMaxDepth { .. }
            | ForestError::InvalidMaxFeatures { .. }
            | ForestError::EmptyForest => ErrorKind::InvalidInput,
            ForestError::Cancelled => ErrorKind::Cancelled,
            ForestError::OobEvaluationFailed { .. } => ErrorKind::Evaluation,
            ForestError::StructuralConversion { .. }
            | ForestError::SerializeModel { .. }
            | ForestError::DeserializeModel { .. }
            | ForestError::WriteModel { .. }
            | ForestError::ReadModel { .. }
            | ForestError::IncompatibleModelVersion { .. } => ErrorKind::Persistence,
        }
    }
}

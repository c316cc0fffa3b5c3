//! CSV item reading and JSON artifact writing for the grove pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{ExperimentName, ItemDataset, LabeledDataset};
pub use error::IoError;
pub use reader::{DEFAULT_LABEL_COLUMN, ItemReader};
pub use writer::ResultWriter;

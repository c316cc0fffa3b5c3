//! Domain types for grove-io.

use grove_forest::{Item, LabeledItem};

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unlabeled items read from CSV, with attribute names in column order.
#[derive(Debug)]
pub struct ItemDataset {
    attributes: Vec<String>,
    items: Vec<Item>,
}

impl ItemDataset {
    pub(crate) fn new(attributes: Vec<String>, items: Vec<Item>) -> Self {
        Self { attributes, items }
    }

    /// Return the attribute column names in header order.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Return the items in row order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Return the number of items.
    #[must_use]
    pub fn n_items(&self) -> usize {
        self.items.len()
    }
}

/// Labeled items read from CSV, with attribute names in column order.
#[derive(Debug)]
pub struct LabeledDataset {
    attributes: Vec<String>,
    items: Vec<LabeledItem>,
}

impl LabeledDataset {
    pub(crate) fn new(attributes: Vec<String>, items: Vec<LabeledItem>) -> Self {
        Self { attributes, items }
    }

    /// Return the attribute column names in header order.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Return the labeled items in row order.
    #[must_use]
    pub fn items(&self) -> &[LabeledItem] {
        &self.items
    }

    /// Return the number of items.
    #[must_use]
    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    /// Return the number of distinct labels.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        let mut labels: Vec<_> = self.items.iter().map(LabeledItem::label).collect();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }
}

//! Labeled categorical records.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::ForestError;

/// A discrete class id.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Label(i32);

impl Label {
    /// Create a new label from its integer id.
    #[must_use]
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Return the integer id.
    #[must_use]
    pub fn id(self) -> i32 {
        self.0
    }
}

impl From<i32> for Label {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An integer-coded categorical level.
///
/// Codes carry no ordering semantics for the learner; `Ord` exists only so
/// maps keyed by values iterate deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct AttributeValue(i32);

impl AttributeValue {
    /// Create a new category code.
    #[must_use]
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    /// Return the integer code.
    #[must_use]
    pub fn code(self) -> i32 {
        self.0
    }
}

impl From<i32> for AttributeValue {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable record: an identifier plus attribute name → category code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Item {
    id: String,
    features: BTreeMap<String, AttributeValue>,
}

impl Item {
    /// Create an item from an id and its feature map.
    pub fn new<I, K, V>(id: impl Into<String>, features: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<AttributeValue>,
    {
        Self {
            id: id.into(),
            features: features
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Return the item identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the value recorded for `attribute`, if any.
    #[must_use]
    pub fn value(&self, attribute: &str) -> Option<AttributeValue> {
        self.features.get(attribute).copied()
    }

    /// Return the full feature map.
    #[must_use]
    pub fn features(&self) -> &BTreeMap<String, AttributeValue> {
        &self.features
    }
}

/// An [`Item`] paired with its ground-truth class.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LabeledItem {
    item: Item,
    label: Label,
}

impl LabeledItem {
    /// Pair an item with its label.
    pub fn new(item: Item, label: impl Into<Label>) -> Self {
        Self {
            item,
            label: label.into(),
        }
    }

    /// Borrow the unlabeled item.
    #[must_use]
    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Return the ground-truth label.
    #[must_use]
    pub fn label(&self) -> Label {
        self.label
    }
}

/// Check that `attributes` is duplicate-free and that every item carries a
/// value for every listed attribute.
pub(crate) fn validate_attribute_values(
    items: &[&LabeledItem],
    attributes: &[String],
) -> Result<(), ForestError> {
    let mut seen = HashSet::with_capacity(attributes.len());
    for attribute in attributes {
        if !seen.insert(attribute.as_str()) {
            return Err(ForestError::DuplicateAttribute {
                attribute: attribute.clone(),
            });
        }
    }
    for labeled in items {
        for attribute in attributes {
            if labeled.item.value(attribute).is_none() {
                return Err(ForestError::MissingAttribute {
                    item_id: labeled.item.id.clone(),
                    attribute: attribute.clone(),
                });
            }
        }
    }
    Ok(())
}

//! ID3 decision tree training and evaluation.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::{
    ForestError,
    entropy::{EntropyCalculator, LabelCounts},
    item::{AttributeValue, Item, Label, LabeledItem, validate_attribute_values},
    node::Node,
};

/// Trainer for a single ID3 decision tree over categorical attributes.
///
/// Construct via [`DecisionTreeTrainer::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter   | Default                                   |
/// |-------------|-------------------------------------------|
/// | `max_depth` | `None` (bounded by the attribute count)   |
#[derive(Debug, Clone, Default)]
pub struct DecisionTreeTrainer {
    pub(crate) calculator: EntropyCalculator,
    pub(crate) max_depth: Option<usize>,
}

impl DecisionTreeTrainer {
    /// Create a trainer that scores splits with `calculator`.
    #[must_use]
    pub fn new(calculator: EntropyCalculator) -> Self {
        Self {
            calculator,
            max_depth: None,
        }
    }

    /// Set the maximum tree depth.
    ///
    /// `None` grows until leaves are pure or attributes run out. `Some(d)`
    /// limits depth to `d` levels (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the entropy calculator used to score splits.
    #[must_use]
    pub fn calculator(&self) -> EntropyCalculator {
        self.calculator
    }

    /// Train a decision tree on `items` using the candidate `attributes`.
    ///
    /// Split selection scans `attributes` in the given order and keeps the
    /// first attribute reaching the maximum information gain, so the result
    /// is fully determined by the inputs.
    ///
    /// An empty `items` or `attributes` yields a single leaf.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                          |
    /// |---------------------------------------|-----------------------------------------------|
    /// | [`ForestError::InvalidMaxDepth`]      | `max_depth` is `Some(0)`                      |
    /// | [`ForestError::DuplicateAttribute`]   | `attributes` names an attribute twice         |
    /// | [`ForestError::MissingAttribute`]     | an item has no value for a listed attribute   |
    #[instrument(skip_all, fields(n_items = items.len(), n_attributes = attributes.len()))]
    pub fn train(
        &self,
        items: &[LabeledItem],
        attributes: &[String],
    ) -> Result<DecisionTree, ForestError> {
        let sample: Vec<&LabeledItem> = items.iter().collect();
        self.validate_config()?;
        validate_attribute_values(&sample, attributes)?;
        Ok(self.build(&sample, attributes))
    }

    pub(crate) fn validate_config(&self) -> Result<(), ForestError> {
        if let Some(d) = self.max_depth
            && d == 0
        {
            return Err(ForestError::InvalidMaxDepth { max_depth: 0 });
        }
        Ok(())
    }

    /// Build a tree from a pre-validated sample.
    pub(crate) fn build(&self, sample: &[&LabeledItem], attributes: &[String]) -> DecisionTree {
        let candidates: Vec<&str> = attributes.iter().map(String::as_str).collect();
        let root = self.build_node(sample, &candidates, 0);

        debug!(
            n_items = sample.len(),
            n_nodes = root.n_nodes(),
            depth = root.depth(),
            "decision tree built"
        );

        DecisionTree { root }
    }

    /// Recursively build the subtree for `items`.
    fn build_node(&self, items: &[&LabeledItem], candidates: &[&str], depth: usize) -> Node {
        let counts = LabelCounts::from_labels(items.iter().map(|li| li.label()));
        let majority = counts.majority().unwrap_or_default();

        // Stopping conditions → leaf.
        let depth_exceeded = self.max_depth.is_some_and(|max_d| depth >= max_d);
        if counts.n_labels() <= 1 || candidates.is_empty() || depth_exceeded {
            return Node::leaf(majority);
        }

        let parent_entropy = self.calculator.entropy(&counts);

        let mut best: Option<(usize, f64, BTreeMap<AttributeValue, Vec<&LabeledItem>>)> = None;
        for (position, &attribute) in candidates.iter().enumerate() {
            let partitions = partition(items, attribute);
            let subsets: Vec<LabelCounts> = partitions
                .values()
                .map(|subset| LabelCounts::from_labels(subset.iter().map(|li| li.label())))
                .collect();
            let gain = self
                .calculator
                .information_gain(parent_entropy, &subsets, items.len());

            // Strict comparison: the earliest attribute wins ties.
            if best.as_ref().is_none_or(|(_, best_gain, _)| gain > *best_gain) {
                best = Some((position, gain, partitions));
            }
        }

        let Some((position, _, partitions)) = best else {
            return Node::leaf(majority);
        };

        let remaining: Vec<&str> = candidates
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != position)
            .map(|(_, &a)| a)
            .collect();

        let children = partitions
            .into_iter()
            .map(|(value, subset)| (value, self.build_node(&subset, &remaining, depth + 1)))
            .collect();

        Node::Split {
            attribute: candidates[position].to_string(),
            children,
            default_label: majority,
        }
    }
}

/// Group `items` by their value for `attribute`.
fn partition<'a>(
    items: &[&'a LabeledItem],
    attribute: &str,
) -> BTreeMap<AttributeValue, Vec<&'a LabeledItem>> {
    let mut groups: BTreeMap<AttributeValue, Vec<&'a LabeledItem>> = BTreeMap::new();
    for &labeled in items {
        if let Some(value) = labeled.item().value(attribute) {
            groups.entry(value).or_default().push(labeled);
        }
    }
    groups
}

/// A fitted categorical decision tree.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) root: Node,
}

impl DecisionTree {
    /// Wrap an existing root node.
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Predict the label for `item`.
    ///
    /// Unseen or missing attribute values resolve to the default label of
    /// the split where they occur; evaluation never fails.
    #[must_use]
    pub fn evaluate(&self, item: &Item) -> Label {
        self.root.evaluate(item)
    }

    /// Borrow the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.root.n_nodes()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    /// Return the maximum depth of the tree. A single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

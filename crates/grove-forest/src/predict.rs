//! Majority-vote evaluation for the random forest ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::entropy::LabelCounts;
use crate::forest::RandomForest;
use crate::item::{Item, Label};
use crate::tree::DecisionTree;

/// Per-label vote tally from evaluating every tree on one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Votes {
    counts: LabelCounts,
}

impl Votes {
    pub(crate) fn collect<'a>(trees: impl IntoIterator<Item = &'a DecisionTree>, item: &Item) -> Self {
        Self {
            counts: LabelCounts::from_labels(trees.into_iter().map(|tree| tree.evaluate(item))),
        }
    }

    /// Return the label with the most votes, smallest label on ties.
    #[must_use]
    pub fn winner(&self) -> Label {
        self.counts.majority().unwrap_or_default()
    }

    /// Return the number of votes cast for `label`.
    #[must_use]
    pub fn count(&self, label: Label) -> usize {
        self.counts.get(label)
    }

    /// Return the total number of votes cast.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.total()
    }

    /// Return the share of votes cast for `label`, in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self, label: Label) -> f64 {
        if self.counts.total() == 0 {
            return 0.0;
        }
        self.counts.get(label) as f64 / self.counts.total() as f64
    }

    /// Return the `k` most voted labels with their vote share.
    ///
    /// Equal shares are ordered by ascending label.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<(Label, f64)> {
        let total = self.counts.total().max(1) as f64;
        let mut ranked: Vec<(Label, usize)> = self.counts.iter().collect();
        // Stable sort keeps ascending label order among equal counts.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
            .into_iter()
            .take(k)
            .map(|(label, count)| (label, count as f64 / total))
            .collect()
    }
}

impl RandomForest {
    /// Evaluate `item` by majority vote over all trees.
    ///
    /// Ties go to the smallest label, so repeated calls always agree.
    #[must_use]
    pub fn evaluate(&self, item: &Item) -> Label {
        self.votes(item).winner()
    }

    /// Return the full vote tally for `item`.
    #[must_use]
    pub fn votes(&self, item: &Item) -> Votes {
        Votes::collect(&self.trees, item)
    }

    /// Evaluate a batch of items in parallel, preserving input order.
    #[must_use]
    pub fn evaluate_batch(&self, items: &[Item]) -> Vec<Label> {
        items.into_par_iter().map(|item| self.evaluate(item)).collect()
    }

    /// Return vote tallies for a batch of items in parallel.
    #[must_use]
    pub fn votes_batch(&self, items: &[Item]) -> Vec<Votes> {
        items.into_par_iter().map(|item| self.votes(item)).collect()
    }

    /// Borrow the trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

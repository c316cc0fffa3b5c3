//! Training result type for the random forest.

use crate::forest::RandomForest;
use crate::oob::OobScore;

/// Outcome of a successful training run.
///
/// Holds the fitted forest together with the run's name and the sizes it
/// was trained on. Only a complete forest is ever wrapped here.
#[derive(Debug, Clone)]
pub struct TrainingResults {
    name: String,
    forest: RandomForest,
    item_count: usize,
    attribute_count: usize,
    attributes_per_tree: usize,
    oob_score: Option<OobScore>,
}

impl TrainingResults {
    pub(crate) fn new(
        name: String,
        forest: RandomForest,
        item_count: usize,
        attribute_count: usize,
        attributes_per_tree: usize,
        oob_score: Option<OobScore>,
    ) -> Self {
        Self {
            name,
            forest,
            item_count,
            attribute_count,
            attributes_per_tree,
            oob_score,
        }
    }

    /// Return the name given to the training run.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the fitted forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Consume the result and return the fitted forest.
    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Return the number of trees trained.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.forest.n_trees()
    }

    /// Return the number of labeled items trained on.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Return the number of candidate attributes.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.attribute_count
    }

    /// Return the resolved number of attributes offered to each tree.
    #[must_use]
    pub fn attributes_per_tree(&self) -> usize {
        self.attributes_per_tree
    }

    /// Return the OOB score, if computed.
    #[must_use]
    pub fn oob_score(&self) -> Option<&OobScore> {
        self.oob_score.as_ref()
    }
}

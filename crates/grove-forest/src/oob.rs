//! Out-of-bag (OOB) evaluation for the random forest.

use crate::confusion::ConfusionMatrix;
use crate::error::ForestError;
use crate::item::{Label, LabeledItem};
use crate::predict::Votes;
use crate::tree::DecisionTree;

/// Out-of-bag evaluation result.
#[derive(Debug, Clone)]
pub struct OobScore {
    /// Fraction of OOB-evaluated items whose vote matched their label.
    pub accuracy: f64,
    /// Confusion matrix over the OOB-evaluated items.
    pub confusion_matrix: ConfusionMatrix,
    /// Number of items that had at least one OOB tree.
    pub n_oob_items: usize,
}

/// Compute out-of-bag predictions and accuracy.
///
/// Each item is evaluated only by trees whose bootstrap sample did not
/// contain it. Items left out of no bootstrap are skipped.
pub(crate) fn compute_oob(
    trees: &[DecisionTree],
    items: &[LabeledItem],
    oob_indices_per_tree: &[Vec<usize>],
) -> Result<OobScore, ForestError> {
    // Invert tree -> items into item -> trees.
    let mut oob_trees: Vec<Vec<&DecisionTree>> = vec![Vec::new(); items.len()];
    for (tree, oob_indices) in trees.iter().zip(oob_indices_per_tree) {
        for &item_idx in oob_indices {
            oob_trees[item_idx].push(tree);
        }
    }

    let mut truth: Vec<Label> = Vec::new();
    let mut predicted: Vec<Label> = Vec::new();
    for (item, voters) in items.iter().zip(&oob_trees) {
        if voters.is_empty() {
            continue;
        }
        truth.push(item.label());
        predicted.push(Votes::collect(voters.iter().copied(), item.item()).winner());
    }

    let n_oob_items = truth.len();
    if n_oob_items == 0 {
        return Err(ForestError::OobEvaluationFailed {
            reason: "no item has any OOB tree".to_string(),
        });
    }

    let confusion_matrix = ConfusionMatrix::from_labels(&truth, &predicted);
    Ok(OobScore {
        accuracy: confusion_matrix.accuracy(),
        confusion_matrix,
        n_oob_items,
    })
}

//! Confusion matrix and per-label classification metrics.

use std::fmt;

use crate::item::Label;

/// A confusion matrix over the labels seen in a set of predictions.
///
/// Rows are true labels and columns predicted labels, both in ascending
/// label order as returned by [`ConfusionMatrix::labels`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    labels: Vec<Label>,
    matrix: Vec<Vec<usize>>,
}

/// Per-label precision, recall, and F1 score.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    /// The label these metrics describe.
    pub label: Label,
    /// Precision: TP / (TP + FP). 0.0 if nothing was predicted as this label.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no item truly has this label.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of items whose true label is this label.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from paired true and predicted labels.
    ///
    /// Pairs are formed positionally; surplus entries in the longer slice
    /// are ignored.
    #[must_use]
    pub fn from_labels(true_labels: &[Label], predicted: &[Label]) -> Self {
        let mut labels: Vec<Label> = true_labels.iter().chain(predicted).copied().collect();
        labels.sort_unstable();
        labels.dedup();

        let n = labels.len();
        let mut matrix = vec![vec![0usize; n]; n];
        for (t, p) in true_labels.iter().zip(predicted) {
            // Both labels were inserted above, so the lookups cannot miss.
            if let (Ok(row), Ok(col)) = (labels.binary_search(t), labels.binary_search(p)) {
                matrix[row][col] += 1;
            }
        }
        Self { labels, matrix }
    }

    /// Overall accuracy: proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.labels.len()).map(|i| self.matrix[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Number of (true, predicted) pairs counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flat_map(|row| row.iter()).sum()
    }

    /// Count of items with true label `actual` predicted as `predicted`.
    #[must_use]
    pub fn count(&self, actual: Label, predicted: Label) -> usize {
        match (
            self.labels.binary_search(&actual),
            self.labels.binary_search(&predicted),
        ) {
            (Ok(row), Ok(col)) => self.matrix[row][col],
            _ => 0,
        }
    }

    /// Per-label precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.labels.len();
        self.labels
            .iter()
            .enumerate()
            .map(|(c, &label)| {
                let tp = self.matrix[c][c];
                let fp: usize = (0..n).filter(|&i| i != c).map(|i| self.matrix[i][c]).sum();
                let fn_: usize = (0..n).filter(|&j| j != c).map(|j| self.matrix[c][j]).sum();
                let support = tp + fn_;
                let precision = if tp + fp == 0 {
                    0.0
                } else {
                    tp as f64 / (tp + fp) as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the labels indexing rows and columns.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "")?;
        for label in &self.labels {
            write!(f, " pred_{:<4}", label.id())?;
        }
        writeln!(f)?;

        for (label, row) in self.labels.iter().zip(&self.matrix) {
            write!(f, "true_{:<5}", label.id())?;
            for val in row {
                write!(f, " {val:>9}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

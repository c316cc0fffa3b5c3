//! Label distributions and entropy-based split scoring.

use std::collections::BTreeMap;

use crate::error::ForestError;
use crate::item::Label;

/// A label → count distribution.
///
/// Counts are unsigned, so a constructed distribution is always valid.
/// Iteration is in ascending label order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCounts {
    counts: BTreeMap<Label, usize>,
    total: usize,
}

impl LabelCounts {
    /// Create an empty distribution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally a sequence of labels.
    pub fn from_labels(labels: impl IntoIterator<Item = Label>) -> Self {
        let mut counts = Self::new();
        for label in labels {
            counts.add(label);
        }
        counts
    }

    /// Build a distribution from raw signed counts.
    ///
    /// Repeated labels are summed; zero counts are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::NegativeLabelCount`] for any count below zero.
    pub fn from_counts(
        raw: impl IntoIterator<Item = (Label, i64)>,
    ) -> Result<Self, ForestError> {
        let mut counts = Self::new();
        for (label, count) in raw {
            let n = usize::try_from(count)
                .map_err(|_| ForestError::NegativeLabelCount { label, count })?;
            if n > 0 {
                *counts.counts.entry(label).or_insert(0) += n;
                counts.total += n;
            }
        }
        Ok(counts)
    }

    /// Record one more occurrence of `label`.
    pub fn add(&mut self, label: Label) {
        *self.counts.entry(label).or_insert(0) += 1;
        self.total += 1;
    }

    /// Return the count recorded for `label`.
    #[must_use]
    pub fn get(&self, label: Label) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Return the sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Return the number of labels with a non-zero count.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.counts.len()
    }

    /// Return `true` when no label has been counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Iterate `(label, count)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, usize)> + '_ {
        self.counts.iter().map(|(&label, &count)| (label, count))
    }

    /// Return the most frequent label, ties going to the smallest label.
    ///
    /// `None` when the distribution is empty.
    #[must_use]
    pub fn majority(&self) -> Option<Label> {
        let mut best: Option<(Label, usize)> = None;
        for (label, count) in self.iter() {
            // Strict comparison keeps the first (smallest) label on ties.
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }
}

/// Shannon entropy and information gain over label distributions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyCalculator;

impl EntropyCalculator {
    /// Create a calculator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Entropy in bits: `-Σ p_i · log2(p_i)`.
    ///
    /// Empty and single-class distributions have entropy exactly 0.
    #[must_use]
    pub fn entropy(&self, label_counts: &LabelCounts) -> f64 {
        if label_counts.n_labels() <= 1 {
            return 0.0;
        }
        let n = label_counts.total() as f64;
        -label_counts
            .iter()
            .filter(|&(_, c)| c > 0)
            .map(|(_, c)| {
                let p = c as f64 / n;
                p * p.log2()
            })
            .sum::<f64>()
    }

    /// Parent entropy minus the size-weighted mean entropy of `subsets`.
    ///
    /// `total_count` is the number of items in the parent; a zero total
    /// yields zero gain.
    #[must_use]
    pub fn information_gain(
        &self,
        parent_entropy: f64,
        subsets: &[LabelCounts],
        total_count: usize,
    ) -> f64 {
        if total_count == 0 {
            return 0.0;
        }
        let n = total_count as f64;
        let weighted: f64 = subsets
            .iter()
            .map(|subset| (subset.total() as f64 / n) * self.entropy(subset))
            .sum();
        parent_entropy - weighted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(i32, i64)]) -> LabelCounts {
        LabelCounts::from_counts(pairs.iter().map(|&(l, c)| (Label::new(l), c))).unwrap()
    }

    #[test]
    fn entropy_pure() {
        let h = EntropyCalculator::new().entropy(&counts(&[(1, 10)]));
        assert_eq!(h, 0.0);
    }

    #[test]
    fn entropy_empty() {
        assert_eq!(EntropyCalculator::new().entropy(&LabelCounts::new()), 0.0);
    }

    #[test]
    fn entropy_binary_balanced_is_one_bit() {
        let h = EntropyCalculator::new().entropy(&counts(&[(0, 5), (1, 5)]));
        assert!((h - 1.0).abs() < 1e-12);
    }

    #[test]
    fn entropy_tennis_root() {
        // 9 positive, 5 negative: the textbook 0.940 bits.
        let h = EntropyCalculator::new().entropy(&counts(&[(0, 5), (1, 9)]));
        assert!((h - 0.940_285_958_670_631).abs() < 1e-12);
    }

    #[test]
    fn entropy_bounded_by_log2_of_label_count() {
        let calc = EntropyCalculator::new();
        let cases: [&[(i32, i64)]; 4] = [
            &[(0, 1), (1, 2), (2, 3)],
            &[(0, 100), (1, 1)],
            &[(0, 4), (1, 4), (2, 4), (3, 4)],
            &[(5, 7), (9, 3)],
        ];
        for case in cases {
            let dist = counts(case);
            let h = calc.entropy(&dist);
            let bound = (dist.n_labels() as f64).log2();
            assert!(h >= 0.0, "entropy {h} is negative");
            assert!(h <= bound + 1e-12, "entropy {h} exceeds {bound}");
        }
    }

    #[test]
    fn zero_counts_are_skipped() {
        let dist = counts(&[(0, 0), (1, 4)]);
        assert_eq!(dist.n_labels(), 1);
        assert_eq!(EntropyCalculator::new().entropy(&dist), 0.0);
    }

    #[test]
    fn negative_count_rejected() {
        let err = LabelCounts::from_counts([(Label::new(0), 3), (Label::new(1), -1)]).unwrap_err();
        assert!(matches!(err, ForestError::NegativeLabelCount { count: -1, .. }));
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
    }

    #[test]
    fn gain_of_outlook_on_tennis() {
        // sunny: 2+/3-, overcast: 4+/0-, rain: 3+/2-.
        let calc = EntropyCalculator::new();
        let parent = calc.entropy(&counts(&[(0, 5), (1, 9)]));
        let subsets = [
            counts(&[(1, 2), (0, 3)]),
            counts(&[(1, 4)]),
            counts(&[(1, 3), (0, 2)]),
        ];
        let gain = calc.information_gain(parent, &subsets, 14);
        assert!((gain - 0.246_749_819_774_439_4).abs() < 1e-9, "gain = {gain}");
    }

    #[test]
    fn gain_is_never_meaningfully_negative() {
        let calc = EntropyCalculator::new();
        let partitions: [Vec<LabelCounts>; 3] = [
            vec![counts(&[(0, 3), (1, 3)])],
            vec![counts(&[(0, 1), (1, 1)]), counts(&[(0, 2), (1, 2)])],
            vec![counts(&[(0, 5)]), counts(&[(1, 1), (2, 4)]), counts(&[(2, 2)])],
        ];
        for subsets in &partitions {
            let mut parent = LabelCounts::new();
            for subset in subsets {
                for (label, count) in subset.iter() {
                    for _ in 0..count {
                        parent.add(label);
                    }
                }
            }
            let gain = calc.information_gain(calc.entropy(&parent), subsets, parent.total());
            assert!(gain >= -1e-12, "gain = {gain}");
        }
    }

    #[test]
    fn majority_breaks_ties_toward_smallest_label() {
        let dist = counts(&[(3, 2), (1, 2), (2, 1)]);
        assert_eq!(dist.majority(), Some(Label::new(1)));
        assert_eq!(LabelCounts::new().majority(), None);
    }
}

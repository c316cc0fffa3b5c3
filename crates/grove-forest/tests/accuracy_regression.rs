//! Accuracy regression tests for grove-forest.
//!
//! These tests verify that algorithmic changes do not degrade forest
//! accuracy on a deterministic synthetic categorical dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use grove_forest::{
    DecisionTreeTrainer, EntropyCalculator, Item, LabelCounts, LabeledItem, MaxFeatures, Node,
    OobMode, RandomForestTrainer,
};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic categorical dataset
// ---------------------------------------------------------------------------

/// Generate 300 items with 6 attributes and 3 labels.
///
/// Attributes a0 and a1 carry the label's code. Attributes a2-a5 are
/// uniform noise over codes 0..4. Labels are assigned round-robin.
fn make_items() -> (Vec<LabeledItem>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let attributes: Vec<String> = (0..6).map(|a| format!("a{a}")).collect();
    let items = (0..300)
        .map(|i| {
            let label = (i % 3) as i32;
            let features = attributes.iter().enumerate().map(|(a, name)| {
                let code = if a < 2 { label } else { rng.gen_range(0..4) };
                (name.clone(), code)
            });
            LabeledItem::new(Item::new(format!("item-{i}"), features), label)
        })
        .collect();
    (items, attributes)
}

fn trainer() -> RandomForestTrainer {
    RandomForestTrainer::new(DecisionTreeTrainer::new(EntropyCalculator::new()))
}

// ---------------------------------------------------------------------------
// a) holdout_accuracy_above_threshold
// ---------------------------------------------------------------------------

/// Held-out accuracy with 50 trees must exceed 0.95.
#[test]
fn holdout_accuracy_above_threshold() {
    let (items, attributes) = make_items();
    let (train, holdout) = items.split_at(240);
    let result = trainer()
        .train("holdout", 50, train, &attributes, 42)
        .unwrap();

    let correct = holdout
        .iter()
        .filter(|li| result.forest().evaluate(li.item()) == li.label())
        .count();
    let accuracy = correct as f64 / holdout.len() as f64;
    assert!(accuracy > 0.95, "holdout accuracy {accuracy} <= 0.95");
}

// ---------------------------------------------------------------------------
// b) oob_accuracy_above_threshold
// ---------------------------------------------------------------------------

/// OOB accuracy with sqrt feature subsampling and 100 trees must exceed 0.85.
#[test]
fn oob_accuracy_above_threshold() {
    let (items, attributes) = make_items();
    let result = trainer()
        .with_max_features(MaxFeatures::Sqrt)
        .with_oob_mode(OobMode::Enabled)
        .train("oob", 100, &items, &attributes, 42)
        .unwrap();

    let oob = result.oob_score().expect("OOB should be computed");
    assert_eq!(result.attributes_per_tree(), 3);
    assert!(oob.accuracy > 0.85, "oob accuracy {} <= 0.85", oob.accuracy);
    assert!(oob.n_oob_items > 250);
    assert_eq!(oob.confusion_matrix.labels().len(), 3);
}

// ---------------------------------------------------------------------------
// c) unseen_category_falls_back_to_default
// ---------------------------------------------------------------------------

/// A query with only unseen codes stops at every root, so each tree votes
/// its root's default label and the forest returns their majority.
#[test]
fn unseen_category_falls_back_to_default() {
    let (items, attributes) = make_items();
    let forest = trainer()
        .train("unseen", 15, &items, &attributes, 7)
        .unwrap()
        .into_forest();

    let root_defaults: Vec<_> = forest
        .trees()
        .iter()
        .map(|tree| match tree.root() {
            Node::Leaf { label } => *label,
            Node::Split { default_label, .. } => *default_label,
        })
        .collect();
    assert!(forest.trees().iter().all(|tree| !tree.root().is_leaf()));

    let query = Item::new(
        "q",
        attributes.iter().map(|name| (name.clone(), 99)),
    );
    let votes = forest.votes(&query);
    assert_eq!(votes.total(), 15);
    for &label in &root_defaults {
        assert!(votes.count(label) > 0);
    }

    let expected = LabelCounts::from_labels(root_defaults).majority().unwrap();
    assert_eq!(forest.evaluate(&query), expected);
}

// ---------------------------------------------------------------------------
// d) seeded_training_is_reproducible
// ---------------------------------------------------------------------------

/// Same seed and inputs must reproduce the same forest and predictions.
#[test]
fn seeded_training_is_reproducible() {
    let (items, attributes) = make_items();
    let trainer = trainer().with_max_features(MaxFeatures::Sqrt);
    let a = trainer.train("a", 20, &items, &attributes, 1234).unwrap();
    let b = trainer.train("b", 20, &items, &attributes, 1234).unwrap();
    assert_eq!(a.forest(), b.forest());

    let queries: Vec<Item> = items.iter().map(|li| li.item().clone()).collect();
    assert_eq!(
        a.forest().evaluate_batch(&queries),
        b.forest().evaluate_batch(&queries)
    );
}

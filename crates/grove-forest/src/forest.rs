//! Random forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::cancel::CancellationToken;
use crate::config::{MaxFeatures, OobMode};
use crate::error::ForestError;
use crate::item::{LabeledItem, validate_attribute_values};
use crate::oob::compute_oob;
use crate::result::TrainingResults;
use crate::tree::{DecisionTree, DecisionTreeTrainer};

/// A fitted random forest: an ordered ensemble of decision trees.
///
/// Tree order does not affect evaluation but is preserved through
/// serialization, and equality compares trees element-wise in order.
///
/// Deserialization goes through [`RandomForest::new`], so an empty tree list
/// is rejected by every serde format.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawForest")]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
}

/// Unvalidated wire form of a [`RandomForest`].
#[derive(serde::Deserialize)]
pub(crate) struct RawForest {
    pub(crate) trees: Vec<DecisionTree>,
}

impl TryFrom<RawForest> for RandomForest {
    type Error = ForestError;

    fn try_from(raw: RawForest) -> Result<Self, Self::Error> {
        RandomForest::new(raw.trees)
    }
}

impl RandomForest {
    /// Assemble a forest from already trained trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::EmptyForest`] when `trees` is empty.
    pub fn new(trees: Vec<DecisionTree>) -> Result<Self, ForestError> {
        if trees.is_empty() {
            return Err(ForestError::EmptyForest);
        }
        Ok(Self { trees })
    }
}

/// Trainer for a bagged ensemble of ID3 trees.
///
/// Construct via [`RandomForestTrainer::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter      | Default                 |
/// |----------------|-------------------------|
/// | `max_features` | `All` (plain bagging)   |
/// | `oob_mode`     | `Disabled`              |
/// | `cancellation` | none                    |
#[derive(Debug, Clone)]
pub struct RandomForestTrainer {
    tree_trainer: DecisionTreeTrainer,
    max_features: MaxFeatures,
    oob_mode: OobMode,
    cancellation: Option<CancellationToken>,
}

impl RandomForestTrainer {
    /// Create a forest trainer that grows each tree with `tree_trainer`.
    #[must_use]
    pub fn new(tree_trainer: DecisionTreeTrainer) -> Self {
        Self {
            tree_trainer,
            max_features: MaxFeatures::All,
            oob_mode: OobMode::Disabled,
            cancellation: None,
        }
    }

    // --- Setters ---

    /// Set how many attributes each tree is trained on.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the OOB evaluation mode.
    #[must_use]
    pub fn with_oob_mode(mut self, oob_mode: OobMode) -> Self {
        self.oob_mode = oob_mode;
        self
    }

    /// Attach a token that abandons training when cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    // --- Getters ---

    /// Return the per-tree trainer.
    #[must_use]
    pub fn tree_trainer(&self) -> &DecisionTreeTrainer {
        &self.tree_trainer
    }

    /// Return the max features strategy.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Return the OOB evaluation mode.
    #[must_use]
    pub fn oob_mode(&self) -> OobMode {
        self.oob_mode
    }

    /// Train `tree_count` trees on bootstrap samples of `items`.
    ///
    /// A non-negative `seed` makes the forest reproducible. A negative seed
    /// draws from OS entropy, so repeated runs produce different forests.
    ///
    /// # Errors
    ///
    /// | Variant                                | When                                             |
    /// |----------------------------------------|--------------------------------------------------|
    /// | [`ForestError::InvalidTreeCount`]      | `tree_count` is zero                             |
    /// | [`ForestError::EmptyTrainingSet`]      | `items` is empty                                 |
    /// | [`ForestError::EmptyAttributes`]       | `attributes` is empty                            |
    /// | [`ForestError::DuplicateAttribute`]    | `attributes` names an attribute twice            |
    /// | [`ForestError::MissingAttribute`]      | an item has no value for a listed attribute      |
    /// | [`ForestError::InvalidMaxDepth`]       | the tree trainer's `max_depth` is `Some(0)`      |
    /// | [`ForestError::InvalidMaxFeatures`]    | max_features resolves outside [1, n_attributes]  |
    /// | [`ForestError::Cancelled`]             | the cancellation token fired                     |
    /// | [`ForestError::OobEvaluationFailed`]   | OOB enabled but no item has any OOB tree         |
    pub fn train(
        &self,
        name: &str,
        tree_count: usize,
        items: &[LabeledItem],
        attributes: &[String],
        seed: i64,
    ) -> Result<TrainingResults, ForestError> {
        let mut rng = rng_from_seed(seed);
        self.train_with_rng(name, tree_count, items, attributes, &mut rng)
    }

    /// Train using a caller-supplied random source.
    ///
    /// Per-tree seeds are drawn from `rng` up front, so the result depends
    /// only on `rng`'s state and not on how trees are scheduled.
    ///
    /// # Errors
    ///
    /// Same as [`RandomForestTrainer::train`].
    #[instrument(skip_all, fields(name, tree_count, n_items = items.len()))]
    pub fn train_with_rng(
        &self,
        name: &str,
        tree_count: usize,
        items: &[LabeledItem],
        attributes: &[String],
        rng: &mut impl Rng,
    ) -> Result<TrainingResults, ForestError> {
        // --- Validate inputs ---
        if tree_count == 0 {
            return Err(ForestError::InvalidTreeCount { tree_count });
        }
        if items.is_empty() {
            return Err(ForestError::EmptyTrainingSet);
        }
        if attributes.is_empty() {
            return Err(ForestError::EmptyAttributes);
        }
        let all: Vec<&LabeledItem> = items.iter().collect();
        validate_attribute_values(&all, attributes)?;

        // --- Validate config ---
        self.tree_trainer.validate_config()?;
        let attributes_per_tree = self.max_features.resolve(attributes.len())?;
        self.check_cancelled()?;

        let n_items = items.len();
        info!(
            name,
            tree_count,
            n_items,
            n_attributes = attributes.len(),
            attributes_per_tree,
            "training random forest"
        );

        // Generate per-tree seeds from the master RNG.
        let tree_seeds: Vec<u64> = (0..tree_count).map(|_| rng.r#gen()).collect();

        let tree_trainer = &self.tree_trainer;
        let cancellation = self.cancellation.as_ref();

        // Parallel tree training; collect preserves generation order.
        let tree_results: Vec<(DecisionTree, Vec<usize>)> = tree_seeds
            .into_par_iter()
            .enumerate()
            .map(|(tree_index, seed)| {
                if cancellation.is_some_and(CancellationToken::is_cancelled) {
                    return Err(ForestError::Cancelled);
                }
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let (bootstrap_indices, oob_indices) = bootstrap_sample(n_items, &mut rng);
                let sample: Vec<&LabeledItem> =
                    bootstrap_indices.iter().map(|&i| &items[i]).collect();
                let tree_attributes = select_attributes(attributes, attributes_per_tree, &mut rng);

                let tree = tree_trainer.build(&sample, &tree_attributes);
                debug!(
                    tree_index,
                    n_nodes = tree.n_nodes(),
                    n_oob = oob_indices.len(),
                    "tree trained"
                );
                Ok((tree, oob_indices))
            })
            .collect::<Result<_, ForestError>>()?;

        // Nothing is published from a run cancelled mid-flight.
        self.check_cancelled()?;

        let mut trees = Vec::with_capacity(tree_count);
        let mut oob_indices_per_tree = Vec::with_capacity(tree_count);
        for (tree, oob) in tree_results {
            trees.push(tree);
            oob_indices_per_tree.push(oob);
        }

        let oob_score = if self.oob_mode == OobMode::Enabled {
            Some(compute_oob(&trees, items, &oob_indices_per_tree)?)
        } else {
            None
        };

        let forest = RandomForest { trees };

        info!(
            n_trees = forest.trees.len(),
            oob_accuracy = oob_score.as_ref().map(|s| s.accuracy),
            "random forest training complete"
        );

        Ok(TrainingResults::new(
            name.to_string(),
            forest,
            n_items,
            attributes.len(),
            attributes_per_tree,
            oob_score,
        ))
    }

    fn check_cancelled(&self) -> Result<(), ForestError> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(ForestError::Cancelled);
        }
        Ok(())
    }
}

/// Seeded ChaCha for non-negative seeds, OS entropy otherwise.
fn rng_from_seed(seed: i64) -> ChaCha8Rng {
    match u64::try_from(seed) {
        Ok(seed) => ChaCha8Rng::seed_from_u64(seed),
        Err(_) => ChaCha8Rng::from_entropy(),
    }
}

/// Generate a bootstrap sample of `n_items` draws and the out-of-bag indices.
fn bootstrap_sample(n_items: usize, rng: &mut impl Rng) -> (Vec<usize>, Vec<usize>) {
    let mut in_bag = vec![false; n_items];
    let mut bootstrap_indices = Vec::with_capacity(n_items);
    for _ in 0..n_items {
        let idx = rng.gen_range(0..n_items);
        bootstrap_indices.push(idx);
        in_bag[idx] = true;
    }
    let oob_indices: Vec<usize> = (0..n_items).filter(|&i| !in_bag[i]).collect();
    (bootstrap_indices, oob_indices)
}

/// Pick `count` attributes at random, returned in their original order.
fn select_attributes(attributes: &[String], count: usize, rng: &mut impl Rng) -> Vec<String> {
    let n = attributes.len();
    if count >= n {
        return attributes.to_vec();
    }
    // Partial Fisher-Yates: shuffle only the first `count` positions.
    let mut order: Vec<usize> = (0..n).collect();
    for i in 0..count {
        let j = rng.gen_range(i..n);
        order.swap(i, j);
    }
    let mut chosen = order[..count].to_vec();
    chosen.sort_unstable();
    chosen.into_iter().map(|i| attributes[i].clone()).collect()
}

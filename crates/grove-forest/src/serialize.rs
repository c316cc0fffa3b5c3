//! Model persistence: a structural JSON form and a versioned binary file.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::ForestError;
use crate::forest::{RandomForest, RawForest};
use crate::tree::DecisionTree;

/// Current binary format version.
const FORMAT_VERSION: u32 = 1;

/// Versioned envelope for the serialized model.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope {
    /// Format version for compatibility checking.
    format_version: u32,
    /// Number of trees in the forest.
    n_trees: usize,
    /// The serialized forest.
    forest: RandomForest,
}

impl DecisionTree {
    /// Convert the tree to its structural form.
    ///
    /// Splits become `{"Split": {"attribute", "children", "default_label"}}`
    /// with children keyed by category code, and leaves `{"Leaf": {"label"}}`.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::StructuralConversion`] if encoding fails.
    pub fn to_value(&self) -> Result<Value, ForestError> {
        serde_json::to_value(self).map_err(|source| ForestError::StructuralConversion { source })
    }

    /// Rebuild a tree from its structural form.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::StructuralConversion`] if `value` is not a tree.
    pub fn from_value(value: Value) -> Result<Self, ForestError> {
        serde_json::from_value(value).map_err(|source| ForestError::StructuralConversion { source })
    }
}

impl RandomForest {
    /// Convert the forest to its structural form, trees in order.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::StructuralConversion`] if encoding fails.
    pub fn to_value(&self) -> Result<Value, ForestError> {
        serde_json::to_value(self).map_err(|source| ForestError::StructuralConversion { source })
    }

    /// Rebuild a forest from its structural form.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::StructuralConversion`] | `value` is not a forest |
    /// | [`ForestError::EmptyForest`] | the forest has no trees |
    pub fn from_value(value: Value) -> Result<Self, ForestError> {
        let raw: RawForest = serde_json::from_value(value)
            .map_err(|source| ForestError::StructuralConversion { source })?;
        RandomForest::try_from(raw)
    }

    /// Render the structural form as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::StructuralConversion`] if encoding fails.
    pub fn to_json_string(&self) -> Result<String, ForestError> {
        serde_json::to_string_pretty(self)
            .map_err(|source| ForestError::StructuralConversion { source })
    }

    /// Parse a forest from JSON produced by [`RandomForest::to_json_string`].
    ///
    /// # Errors
    ///
    /// Same as [`RandomForest::from_value`].
    pub fn from_json_str(json: &str) -> Result<Self, ForestError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|source| ForestError::StructuralConversion { source })?;
        Self::from_value(value)
    }

    /// Save the model to a binary file.
    ///
    /// Uses bincode encoding wrapped in a versioned envelope.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::SerializeModel`] | bincode encoding failed |
    /// | [`ForestError::WriteModel`] | file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ForestError> {
        let path = path.as_ref();

        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            n_trees: self.trees.len(),
            forest: self.clone(),
        };

        let bytes = bincode::serialize(&envelope)
            .map_err(|e| ForestError::SerializeModel { source: e })?;

        std::fs::write(path, &bytes).map_err(|e| ForestError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            size_bytes = bytes.len(),
            n_trees = self.trees.len(),
            "model saved"
        );

        Ok(())
    }

    /// Load a model from a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::ReadModel`] | file read failed |
    /// | [`ForestError::DeserializeModel`] | bincode decoding failed |
    /// | [`ForestError::IncompatibleModelVersion`] | format version mismatch |
    ///
    /// A stored forest with no trees fails to decode, as `DeserializeModel`.
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ForestError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| ForestError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        let envelope: ModelEnvelope =
            bincode::deserialize(&bytes).map_err(|e| ForestError::DeserializeModel {
                path: path.to_path_buf(),
                source: e,
            })?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(ForestError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: envelope.format_version,
                path: path.to_path_buf(),
            });
        }

        debug!(n_trees = envelope.n_trees, "model loaded");

        Ok(envelope.forest)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::fixtures::*;
    use crate::forest::RandomForestTrainer;
    use crate::item::{Item, Label};
    use crate::node::Node;
    use crate::tree::DecisionTreeTrainer;

    fn train_tennis_forest() -> RandomForest {
        RandomForestTrainer::new(DecisionTreeTrainer::default())
            .train("tennis", 8, &tennis_training_set(), &tennis_attributes(), 42)
            .unwrap()
            .into_forest()
    }

    fn query_items() -> Vec<Item> {
        vec![
            tennis_item("q1", SUNNY, HOT, NORMAL, WEAK),
            tennis_item("q2", OVERCAST, MILD, HIGH, STRONG),
            tennis_item("q3", RAIN, COOL, HIGH, STRONG),
            // 9 was never seen for outlook
            tennis_item("q4", 9, COOL, HIGH, WEAK),
        ]
    }

    #[test]
    fn structural_round_trip_preserves_forest() {
        let forest = train_tennis_forest();
        let restored = RandomForest::from_value(forest.to_value().unwrap()).unwrap();
        assert_eq!(restored, forest);
        for item in query_items() {
            assert_eq!(restored.evaluate(&item), forest.evaluate(&item));
        }
    }

    #[test]
    fn json_string_round_trip() {
        let forest = train_tennis_forest();
        let json = forest.to_json_string().unwrap();
        assert_eq!(RandomForest::from_json_str(&json).unwrap(), forest);
    }

    #[test]
    fn structural_form_shape() {
        let tree = DecisionTreeTrainer::default()
            .train(&tennis_training_set(), &tennis_attributes())
            .unwrap();
        let value = tree.to_value().unwrap();
        let split = &value["root"]["Split"];
        assert_eq!(split["attribute"], json!("outlook"));
        assert_eq!(split["default_label"], json!(1));
        assert_eq!(split["children"]["2"], json!({"Leaf": {"label": 1}}));
        assert_eq!(DecisionTree::from_value(value).unwrap(), tree);
    }

    #[test]
    fn tree_order_is_preserved() {
        let forest = RandomForest::new(vec![
            DecisionTree::new(Node::leaf(Label::new(3))),
            DecisionTree::new(Node::leaf(Label::new(1))),
        ])
        .unwrap();
        let restored = RandomForest::from_value(forest.to_value().unwrap()).unwrap();
        assert_eq!(restored.trees()[0].root(), &Node::leaf(Label::new(3)));
        assert_eq!(restored.trees()[1].root(), &Node::leaf(Label::new(1)));
    }

    #[test]
    fn structural_empty_forest_rejected() {
        let err = RandomForest::from_value(json!({"trees": []})).unwrap_err();
        assert!(matches!(err, ForestError::EmptyForest));
    }

    #[test]
    fn structural_garbage_rejected() {
        let err = RandomForest::from_value(json!({"trees": 5})).unwrap_err();
        assert!(matches!(err, ForestError::StructuralConversion { .. }));
    }

    #[test]
    fn binary_round_trip_identical_predictions() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("test_model.bin");

        let forest = train_tennis_forest();
        forest.save(&model_path).unwrap();
        let loaded = RandomForest::load(&model_path).unwrap();

        assert_eq!(loaded, forest);
        for item in query_items() {
            assert_eq!(
                loaded.votes(&item),
                forest.votes(&item),
                "votes differ for {}",
                item.id()
            );
        }
    }

    #[test]
    fn load_nonexistent_file_error() {
        let dir = TempDir::new().unwrap();
        let err = RandomForest::load(dir.path().join("missing.bin")).unwrap_err();
        assert!(matches!(err, ForestError::ReadModel { .. }));
        assert_eq!(err.kind(), crate::ErrorKind::Persistence);
    }

    #[test]
    fn load_corrupt_file_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.bin");
        std::fs::write(&path, b"not a valid bincode file").unwrap();
        let err = RandomForest::load(&path).unwrap_err();
        assert!(matches!(err, ForestError::DeserializeModel { .. }));
    }

    #[test]
    fn load_empty_forest_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bin");
        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            n_trees: 0,
            forest: RandomForest { trees: Vec::new() },
        };
        std::fs::write(&path, bincode::serialize(&envelope).unwrap()).unwrap();
        let err = RandomForest::load(&path).unwrap_err();
        assert!(matches!(err, ForestError::DeserializeModel { .. }));
    }

    #[test]
    fn load_wrong_version_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("future.bin");
        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION + 1,
            n_trees: 1,
            forest: RandomForest::new(vec![DecisionTree::new(Node::leaf(Label::new(0)))]).unwrap(),
        };
        std::fs::write(&path, bincode::serialize(&envelope).unwrap()).unwrap();
        let err = RandomForest::load(&path).unwrap_err();
        assert!(matches!(
            err,
            ForestError::IncompatibleModelVersion { expected: 1, found: 2, .. }
        ));
    }
}

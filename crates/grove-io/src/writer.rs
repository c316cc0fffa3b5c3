//! JSON result writer for training, prediction and export outputs.

use std::fs;
use std::path::{Path, PathBuf};

use grove_forest::{Label, OobScore, RandomForest, TrainingResults};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes training, prediction and export artifacts to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_train.json`,
/// `{experiment}_predict.json` and `{experiment}_forest.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write a training summary to `{experiment}_train.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_training_summary(
        &self,
        attributes: &[String],
        results: &TrainingResults,
    ) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("train.json");
        let forest = results.forest();

        let artifact = TrainArtifact {
            experiment: self.experiment.as_str(),
            name: results.name(),
            tree_count: results.tree_count(),
            item_count: results.item_count(),
            attribute_count: results.attribute_count(),
            attributes_per_tree: results.attributes_per_tree(),
            attributes,
            forest: ForestStats::of(forest),
            oob: results.oob_score().map(OobEntry::from_score),
        };

        let json = serde_json::to_string_pretty(&artifact).expect("serialization cannot fail");
        self.write(&path, &json)?;
        info!(path = %path.display(), "training summary written");
        Ok(path)
    }

    /// Write per-item predictions to `{experiment}_predict.json`.
    ///
    /// Each entry is `(item_id, predicted_label, top_k)` where `top_k` holds
    /// `(label, vote_share)` pairs in descending share.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_predictions(
        &self,
        n_trees: usize,
        predictions: &[(String, Label, Vec<(Label, f64)>)],
    ) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("predict.json");

        let entries: Vec<PredictionEntry> = predictions
            .iter()
            .map(|(item_id, label, top_k)| PredictionEntry {
                item_id: item_id.as_str(),
                label: label.id(),
                top_k: top_k
                    .iter()
                    .map(|&(label, vote_share)| VoteEntry {
                        label: label.id(),
                        vote_share,
                    })
                    .collect(),
            })
            .collect();

        let artifact = PredictArtifact {
            experiment: self.experiment.as_str(),
            n_items: predictions.len(),
            n_trees,
            predictions: entries,
        };

        let json = serde_json::to_string_pretty(&artifact).expect("serialization cannot fail");
        self.write(&path, &json)?;
        info!(path = %path.display(), "predictions written");
        Ok(path)
    }

    /// Write the forest's structural form to `{experiment}_forest.json`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::ExportForest`] | structural conversion failed |
    /// | [`IoError::WriteFile`] | file write failed |
    #[instrument(skip_all)]
    pub fn write_forest(&self, forest: &RandomForest) -> Result<PathBuf, IoError> {
        let path = self.artifact_path("forest.json");
        let json = forest.to_json_string().map_err(|e| IoError::ExportForest {
            path: path.clone(),
            source: e,
        })?;
        self.write(&path, &json)?;
        info!(path = %path.display(), n_trees = forest.n_trees(), "forest exported");
        Ok(path)
    }

    /// Return the path where the model binary should be saved.
    ///
    /// Does not write anything. Computes `{output_dir}/{experiment}_model.bin`.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.artifact_path("model.bin")
    }

    fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment.as_str()))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), IoError> {
        fs::write(path, contents).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct TrainArtifact<'a> {
    experiment: &'a str,
    name: &'a str,
    tree_count: usize,
    item_count: usize,
    attribute_count: usize,
    attributes_per_tree: usize,
    attributes: &'a [String],
    forest: ForestStats,
    oob: Option<OobEntry>,
}

#[derive(Serialize)]
struct ForestStats {
    total_nodes: usize,
    total_leaves: usize,
    max_depth: usize,
    mean_depth: f64,
}

impl ForestStats {
    fn of(forest: &RandomForest) -> Self {
        let trees = forest.trees();
        let total_depth: usize = trees.iter().map(|t| t.depth()).sum();
        Self {
            total_nodes: trees.iter().map(|t| t.n_nodes()).sum(),
            total_leaves: trees.iter().map(|t| t.n_leaves()).sum(),
            max_depth: trees.iter().map(|t| t.depth()).max().unwrap_or(0),
            mean_depth: total_depth as f64 / trees.len().max(1) as f64,
        }
    }
}

#[derive(Serialize)]
struct OobEntry {
    accuracy: f64,
    n_oob_items: usize,
    labels: Vec<i32>,
    confusion_matrix: Vec<Vec<usize>>,
    class_metrics: Vec<ClassEntry>,
}

impl OobEntry {
    fn from_score(score: &OobScore) -> Self {
        let cm = &score.confusion_matrix;
        Self {
            accuracy: score.accuracy,
            n_oob_items: score.n_oob_items,
            labels: cm.labels().iter().map(|l| l.id()).collect(),
            confusion_matrix: cm.as_rows().to_vec(),
            class_metrics: cm
                .class_metrics()
                .into_iter()
                .map(|m| ClassEntry {
                    label: m.label.id(),
                    precision: m.precision,
                    recall: m.recall,
                    f1: m.f1,
                    support: m.support,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct ClassEntry {
    label: i32,
    precision: f64,
    recall: f64,
    f1: f64,
    support: usize,
}

#[derive(Serialize)]
struct PredictArtifact<'a> {
    experiment: &'a str,
    n_items: usize,
    n_trees: usize,
    predictions: Vec<PredictionEntry<'a>>,
}

#[derive(Serialize)]
struct PredictionEntry<'a> {
    item_id: &'a str,
    label: i32,
    top_k: Vec<VoteEntry>,
}

#[derive(Serialize)]
struct VoteEntry {
    label: i32,
    vote_share: f64,
}

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use grove_forest::{
    DecisionTreeTrainer, EntropyCalculator, Label, MaxFeatures, OobMode, RandomForest,
    RandomForestTrainer,
};
use grove_io::{DEFAULT_LABEL_COLUMN, ExperimentName, ItemReader, ResultWriter};

#[derive(Parser)]
#[command(name = "grove")]
#[command(about = "Random forest classification over categorical attributes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility (negative draws a fresh seed per run)
    #[arg(long, default_value_t = 42, global = true, allow_negative_numbers = true)]
    seed: i64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Train a random forest on a labeled CSV file
    Train {
        /// Path to the labeled CSV file
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        name: String,

        /// Name of the label column
        #[arg(long, default_value = DEFAULT_LABEL_COLUMN)]
        label_column: String,

        /// Number of trees in the forest
        #[arg(long, default_value_t = 50)]
        n_trees: usize,

        /// Maximum tree depth (bounded by the attribute count if not set)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Attributes offered to each tree: "all", "sqrt", "log2" or a count
        #[arg(long, default_value = "all")]
        max_features: String,

        /// Compute out-of-bag accuracy
        #[arg(long, default_value_t = false)]
        oob: bool,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Predict labels for items with a trained model
    Predict {
        /// Path to the trained model binary
        #[arg(long)]
        model: PathBuf,

        /// Path to the CSV file of items to classify
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files
        #[arg(long)]
        experiment: String,

        /// Number of top-voted labels to output per item
        #[arg(long, default_value_t = 2)]
        top_k: usize,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Export a trained model to its structural JSON form
    Export {
        /// Path to the trained model binary
        #[arg(long)]
        model: PathBuf,

        /// Experiment name for output files
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TrainOutput {
    experiment: String,
    n_items: usize,
    n_attributes: usize,
    n_trees: usize,
    attributes_per_tree: usize,
    oob_accuracy: Option<f64>,
    model: PathBuf,
}

#[derive(Serialize)]
struct PredictOutput {
    experiment: String,
    n_items: usize,
    model_n_trees: usize,
    label_counts: Vec<LabelCountOutput>,
}

#[derive(Serialize)]
struct LabelCountOutput {
    label: i32,
    count: usize,
}

#[derive(Serialize)]
struct ExportOutput {
    experiment: String,
    n_trees: usize,
    path: PathBuf,
}

fn parse_max_features(s: &str) -> Result<MaxFeatures> {
    match s {
        "all" => Ok(MaxFeatures::All),
        "sqrt" => Ok(MaxFeatures::Sqrt),
        "log2" => Ok(MaxFeatures::Log2),
        other => match other.parse::<usize>() {
            Ok(n) => Ok(MaxFeatures::Fixed(n)),
            Err(_) => bail!(
                "unknown max-features \"{other}\": expected \"all\", \"sqrt\", \"log2\" or a count"
            ),
        },
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Train {
            data,
            name,
            label_column,
            n_trees,
            max_depth,
            max_features,
            oob,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(name.clone())?;

            // 1. Read labeled items
            let dataset = ItemReader::new(&data)
                .with_label_column(label_column)
                .read_labeled()
                .context("failed to read training CSV")?;
            info!(
                n_items = dataset.n_items(),
                n_labels = dataset.n_labels(),
                "dataset loaded"
            );

            // 2. Train
            let tree_trainer =
                DecisionTreeTrainer::new(EntropyCalculator::new()).with_max_depth(max_depth);
            let oob_mode = if oob {
                OobMode::Enabled
            } else {
                OobMode::Disabled
            };
            let results = RandomForestTrainer::new(tree_trainer)
                .with_max_features(parse_max_features(&max_features)?)
                .with_oob_mode(oob_mode)
                .train(&name, n_trees, dataset.items(), dataset.attributes(), cli.seed)
                .context("training failed")?;

            let oob_accuracy = results.oob_score().map(|s| s.accuracy);
            if let Some(score) = results.oob_score() {
                info!(accuracy = score.accuracy, "OOB confusion matrix:\n{}", score.confusion_matrix);
            }

            // 3. Save model and summary
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let model_path = writer.model_path();
            results
                .forest()
                .save(&model_path)
                .context("failed to save model")?;
            info!(path = %model_path.display(), "model saved");
            writer.write_training_summary(dataset.attributes(), &results)?;

            // 4. Print summary
            let output = TrainOutput {
                experiment: name,
                n_items: results.item_count(),
                n_attributes: results.attribute_count(),
                n_trees: results.tree_count(),
                attributes_per_tree: results.attributes_per_tree(),
                oob_accuracy,
                model: model_path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            model,
            data,
            experiment,
            top_k,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;

            // 1. Load model
            let forest = RandomForest::load(&model).context("failed to load model")?;
            info!(n_trees = forest.n_trees(), "model loaded");

            // 2. Read items
            let dataset = ItemReader::new(&data)
                .read()
                .context("failed to read items CSV")?;
            info!(n_items = dataset.n_items(), "items loaded");

            // 3. Predict
            let tallies = forest.votes_batch(dataset.items());
            let predictions: Vec<(String, Label, Vec<(Label, f64)>)> = dataset
                .items()
                .iter()
                .zip(&tallies)
                .map(|(item, votes)| (item.id().to_string(), votes.winner(), votes.top_k(top_k)))
                .collect();

            // 4. Write predictions JSON
            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            writer.write_predictions(forest.n_trees(), &predictions)?;

            // 5. Print summary
            let mut label_counts: Vec<LabelCountOutput> = Vec::new();
            let mut winners: Vec<Label> = predictions.iter().map(|(_, label, _)| *label).collect();
            winners.sort_unstable();
            for label in winners {
                match label_counts.last_mut() {
                    Some(last) if last.label == label.id() => last.count += 1,
                    _ => label_counts.push(LabelCountOutput {
                        label: label.id(),
                        count: 1,
                    }),
                }
            }
            let output = PredictOutput {
                experiment,
                n_items: dataset.n_items(),
                model_n_trees: forest.n_trees(),
                label_counts,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Export {
            model,
            experiment,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let forest = RandomForest::load(&model).context("failed to load model")?;

            let writer = ResultWriter::new(&output_dir, experiment_name)?;
            let path = writer.write_forest(&forest)?;

            let output = ExportOutput {
                experiment,
                n_trees: forest.n_trees(),
                path,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_max_features_keywords() {
        assert_eq!(parse_max_features("all").unwrap(), MaxFeatures::All);
        assert_eq!(parse_max_features("sqrt").unwrap(), MaxFeatures::Sqrt);
        assert_eq!(parse_max_features("log2").unwrap(), MaxFeatures::Log2);
        assert_eq!(parse_max_features("3").unwrap(), MaxFeatures::Fixed(3));
        assert!(parse_max_features("most").is_err());
    }

    #[test]
    fn cli_accepts_negative_seed() {
        let cli = Cli::try_parse_from([
            "grove", "--seed", "-1", "export", "--model", "m.bin", "--experiment", "e",
        ])
        .unwrap();
        assert_eq!(cli.seed, -1);
    }

    #[test]
    fn cli_train_defaults() {
        let cli =
            Cli::try_parse_from(["grove", "train", "--data", "d.csv", "--name", "run"]).unwrap();
        assert_eq!(cli.seed, 42);
        match cli.command {
            Command::Train {
                n_trees,
                label_column,
                max_features,
                oob,
                ..
            } => {
                assert_eq!(n_trees, 50);
                assert_eq!(label_column, "label");
                assert_eq!(max_features, "all");
                assert!(!oob);
            }
            _ => panic!("expected train command"),
        }
    }
}

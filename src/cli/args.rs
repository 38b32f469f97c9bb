//! Command line argument parsing for the ods CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::dataset::Label;

/// ods - train, retrain and apply SDG text classifiers
#[derive(Parser, Debug, Clone)]
#[command(name = "ods")]
#[command(about = "Train, retrain and apply text classifiers for the Sustainable Development Goals")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct OdsArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "ODS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Model store directory (overrides the configuration)
    #[arg(long, value_name = "DIR", global = true)]
    pub models_dir: Option<PathBuf>,

    /// Dataset directory (overrides the configuration)
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl OdsArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List stored models
    Models(ModelsArgs),

    /// Train a model on a dataset file
    Train(TrainArgs),

    /// Retrain on a base dataset plus new examples
    Retrain(RetrainArgs),

    /// Classify texts
    Predict(PredictArgs),

    /// Evaluate a model on a labeled dataset file
    Evaluate(EvaluateArgs),

    /// Show the metadata of a model
    Describe(DescribeArgs),

    /// Manage dataset files in the data directory
    #[command(subcommand)]
    Datasets(DatasetsCommand),

    /// Print the normalized form of texts
    Normalize(NormalizeArgs),
}

/// Namespace filter for listing models
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceArg {
    /// Both namespaces
    All,
    /// Models trained from a single dataset
    FromScratch,
    /// Retrained models
    Retrained,
}

/// Arguments for listing models
#[derive(Parser, Debug, Clone)]
pub struct ModelsArgs {
    /// Namespace to list
    #[arg(short, long, default_value = "all")]
    pub namespace: NamespaceArg,
}

/// Dataset file and the columns to read
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Dataset file (.csv, .tsv, .jsonl, .xlsx, .xls); relative names are
    /// also looked up in the data directory
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Name of the text column
    #[arg(long, default_value = "textos")]
    pub text_column: String,

    /// Name of the label column
    #[arg(long, default_value = "labels")]
    pub label_column: String,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Fit this smoothing value directly instead of running the grid search
    #[arg(long)]
    pub alpha: Option<f64>,
}

/// Arguments for retraining
#[derive(Parser, Debug, Clone)]
pub struct RetrainArgs {
    #[command(flatten)]
    pub base: DatasetArgs,

    /// New example text (repeat, paired with --label)
    #[arg(long = "text", value_name = "TEXT")]
    pub texts: Vec<String>,

    /// Label of the matching --text (repeat)
    #[arg(long = "label", value_name = "LABEL", allow_negative_numbers = true)]
    pub labels: Vec<Label>,

    /// File with new examples, read with the same column names as the base
    #[arg(long, value_name = "FILE")]
    pub examples: Option<PathBuf>,
}

/// Arguments for prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Texts to classify; read one per line from stdin when empty
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,

    /// Model id, or "latest"
    #[arg(short, long, default_value = "latest")]
    pub model: String,
}

/// Arguments for evaluation
#[derive(Parser, Debug, Clone)]
pub struct EvaluateArgs {
    /// Model id, or "latest"
    #[arg(short, long, default_value = "latest")]
    pub model: String,

    #[command(flatten)]
    pub dataset: DatasetArgs,
}

/// Arguments for describing a model
#[derive(Parser, Debug, Clone)]
pub struct DescribeArgs {
    /// Model id, or "latest"
    #[arg(value_name = "MODEL", default_value = "latest")]
    pub model: String,
}

/// Dataset directory subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DatasetsCommand {
    /// List dataset files
    List,

    /// Copy a dataset file into the data directory
    Import {
        /// File to copy
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Arguments for normalization
#[derive(Parser, Debug, Clone)]
pub struct NormalizeArgs {
    /// Texts to normalize; read one per line from stdin when empty
    #[arg(value_name = "TEXT")]
    pub texts: Vec<String>,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

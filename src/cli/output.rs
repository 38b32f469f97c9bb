//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::category;
use crate::cli::args::{OdsArgs, OutputFormat};
use crate::dataset::{DatasetEntry, Label};
use crate::error::Result;
use crate::lifecycle::Prediction;
use crate::ml::metrics::ClassificationMetrics;
use crate::ml::model_selection::HyperParams;
use crate::registry::{Metadata, SampleCounts};

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn print_human(&self, args: &OdsArgs);
}

/// Result structure for model listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelList {
    pub models: Vec<String>,
}

/// Result structure for training and retraining.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingResult {
    pub id: String,
    pub params: Option<HyperParams>,
    pub cv_f1_macro: Option<f64>,
    pub samples: Option<SampleCounts>,
    pub duration_ms: u64,
}

/// One classified text.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionRow {
    pub text: String,
    pub label: Label,
    pub category: String,
    pub confidence: f64,
}

impl From<Prediction> for PredictionRow {
    fn from(prediction: Prediction) -> Self {
        let category = if prediction.is_placeholder() {
            "no model".to_string()
        } else {
            category::display_name(prediction.label).into_owned()
        };
        PredictionRow {
            text: prediction.text,
            label: prediction.label,
            category,
            confidence: prediction.confidence,
        }
    }
}

/// Result structure for prediction.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResults {
    pub model: String,
    pub predictions: Vec<PredictionRow>,
}

/// Result structure for evaluation.
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub model: String,
    pub metrics: ClassificationMetrics,
}

/// Result structure for model description.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelDescription {
    pub id: String,
    pub metadata: Metadata,
}

/// Result structure for dataset listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetList {
    pub datasets: Vec<DatasetEntry>,
}

/// Result structure for normalization.
#[derive(Debug, Serialize, Deserialize)]
pub struct NormalizedText {
    pub text: String,
    pub normalized: String,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(message: &str, result: &T, args: &OdsArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 && !message.is_empty() {
                println!("{message}");
                println!();
            }
            result.print_human(args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &OdsArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

fn format_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{s:.4}"))
}

impl HumanOutput for ModelList {
    fn print_human(&self, _args: &OdsArgs) {
        if self.models.is_empty() {
            println!("No models found.");
        }
        for model in &self.models {
            println!("{model}");
        }
    }
}

impl HumanOutput for TrainingResult {
    fn print_human(&self, args: &OdsArgs) {
        println!("Model:       {}", self.id);
        if let Some(params) = &self.params {
            println!("Parameters:  {params}");
        }
        println!("CV macro-F1: {}", format_score(self.cv_f1_macro));
        if let Some(samples) = &self.samples {
            println!(
                "Samples:     {} (base {}, new {})",
                samples.total, samples.base, samples.new
            );
        }
        if args.verbosity() > 1 {
            println!("Duration:    {} ms", self.duration_ms);
        }
    }
}

impl HumanOutput for PredictionResults {
    fn print_human(&self, args: &OdsArgs) {
        if args.verbosity() > 1 {
            println!("Model: {}", self.model);
        }
        for row in &self.predictions {
            println!(
                "{:>3}  {:.4}  {:<40}  {}",
                row.label, row.confidence, row.category, row.text
            );
        }
    }
}

impl HumanOutput for EvaluationResult {
    fn print_human(&self, _args: &OdsArgs) {
        let m = &self.metrics;
        println!("Model:           {}", self.model);
        println!("Samples:         {}", m.n_samples);
        println!("Accuracy:        {:.4}", m.accuracy);
        println!("Precision (mac): {:.4}", m.precision_macro);
        println!("Recall (mac):    {:.4}", m.recall_macro);
        println!("F1 (macro):      {:.4}", m.f1_macro);
        println!("F1 (micro):      {:.4}", m.f1_micro);
        println!("F1 (weighted):   {:.4}", m.f1_weighted);
    }
}

impl HumanOutput for ModelDescription {
    fn print_human(&self, _args: &OdsArgs) {
        let metadata = &self.metadata;
        println!("Model:       {}", self.id);
        if metadata.is_legacy() {
            println!("(legacy artifact without metadata)");
            return;
        }
        if let Some(created_at) = metadata.created_at {
            println!("Created:     {}", created_at.to_rfc3339());
        }
        if let Some(dataset) = &metadata.dataset {
            for source in &dataset.sources {
                println!("Dataset:     {}", source.display());
            }
            println!(
                "Columns:     text={}, label={}",
                dataset.text_column, dataset.label_column
            );
        }
        if let Some(samples) = &metadata.samples {
            println!(
                "Samples:     {} (base {}, new {})",
                samples.total, samples.base, samples.new
            );
        }
        if let Some(params) = &metadata.params {
            println!("Parameters:  {params}");
        }
        println!("CV macro-F1: {}", format_score(metadata.cv_f1_macro));
    }
}

impl HumanOutput for DatasetList {
    fn print_human(&self, _args: &OdsArgs) {
        if self.datasets.is_empty() {
            println!("No datasets found.");
        }
        for entry in &self.datasets {
            println!("{:>10}  {}", entry.size_bytes, entry.path.display());
        }
    }
}

impl HumanOutput for DatasetEntry {
    fn print_human(&self, _args: &OdsArgs) {
        println!("{} ({} bytes)", self.path.display(), self.size_bytes);
    }
}

impl HumanOutput for Vec<NormalizedText> {
    fn print_human(&self, _args: &OdsArgs) {
        for item in self {
            println!("{}", item.normalized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_row_category() {
        let row = PredictionRow::from(Prediction {
            text: "agua".to_string(),
            label: 6,
            confidence: 0.9,
            probabilities: vec![0.1, 0.9],
        });
        assert_eq!(row.category, "Agua limpia y saneamiento");

        let row = PredictionRow::from(Prediction::no_model("agua"));
        assert_eq!(row.label, -1);
        assert_eq!(row.category, "no model");
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(None), "-");
        assert_eq!(format_score(Some(0.83333)), "0.8333");
    }
}

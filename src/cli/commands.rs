//! Command implementations for the ods CLI.

use std::io::{self, BufRead};
use std::time::Instant;

use crate::analysis::lexicon::Language;
use crate::analysis::normalizer::Normalizer;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::LifecycleConfig;
use crate::dataset::{Dataset, DatasetSource};
use crate::error::{OdsError, Result};
use crate::lifecycle::{ModelSelector, ModelService};
use crate::registry::{ArtifactId, ModelArtifact, Namespace};

/// Execute a CLI command.
pub fn execute_command(args: OdsArgs) -> Result<()> {
    let service = || build_service(&args);
    match &args.command {
        Command::Models(models_args) => list_models(&service()?, models_args, &args),
        Command::Train(train_args) => train(&service()?, train_args, &args),
        Command::Retrain(retrain_args) => retrain(&service()?, retrain_args, &args),
        Command::Predict(predict_args) => predict(&service()?, predict_args, &args),
        Command::Evaluate(evaluate_args) => evaluate(&service()?, evaluate_args, &args),
        Command::Describe(describe_args) => describe(&service()?, describe_args, &args),
        Command::Datasets(datasets_command) => datasets(&service()?, datasets_command, &args),
        Command::Normalize(normalize_args) => normalize_texts(normalize_args, &args),
    }
}

/// Configuration file, then environment, then command line flags.
pub fn load_config(args: &OdsArgs) -> Result<LifecycleConfig> {
    let config = match &args.config {
        Some(path) => LifecycleConfig::from_file(path)?,
        None => LifecycleConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(dir) = &args.models_dir {
        config.models_dir = dir.clone();
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn build_service(args: &OdsArgs) -> Result<ModelService> {
    let config = load_config(args)?;
    tracing::debug!(
        models_dir = %config.models_dir.display(),
        data_dir = %config.data_dir.display(),
        "using directories"
    );
    ModelService::new(config)
}

fn source_of(dataset: &DatasetArgs) -> DatasetSource {
    DatasetSource::new(
        dataset.dataset.clone(),
        dataset.text_column.clone(),
        dataset.label_column.clone(),
    )
}

/// Texts from the command line, or one per non-empty stdin line.
fn read_texts(texts: &[String]) -> Result<Vec<String>> {
    if !texts.is_empty() {
        return Ok(texts.to_vec());
    }
    let mut lines = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn resolve_model(service: &ModelService, model: &str) -> Result<ArtifactId> {
    match model.parse::<ModelSelector>()? {
        ModelSelector::Id(id) => Ok(id),
        ModelSelector::Latest => service
            .latest(None)?
            .ok_or_else(|| OdsError::artifact_not_found("latest (no models stored)")),
    }
}

fn training_result(artifact: &ModelArtifact, started: Instant) -> TrainingResult {
    TrainingResult {
        id: artifact.id.to_string(),
        params: artifact.metadata.params.clone(),
        cv_f1_macro: artifact.metadata.cv_f1_macro,
        samples: artifact.metadata.samples,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

fn list_models(service: &ModelService, models_args: &ModelsArgs, args: &OdsArgs) -> Result<()> {
    let namespaces: &[Namespace] = match models_args.namespace {
        NamespaceArg::All => &Namespace::ALL,
        NamespaceArg::FromScratch => &[Namespace::FromScratch],
        NamespaceArg::Retrained => &[Namespace::Retrained],
    };

    let mut models = Vec::new();
    for namespace in namespaces {
        models.extend(service.list_models(*namespace)?.iter().map(|id| id.to_string()));
    }
    output_result(
        &format!("Models in {}", service.config().models_dir.display()),
        &ModelList { models },
        args,
    )
}

fn train(service: &ModelService, train_args: &TrainArgs, args: &OdsArgs) -> Result<()> {
    let started = Instant::now();
    let source = source_of(&train_args.dataset);
    let artifact = match train_args.alpha {
        Some(alpha) => service.train_fixed(&source, alpha)?,
        None => service.train_from_dataset(&source)?,
    };
    output_result("Model trained", &training_result(&artifact, started), args)
}

fn retrain(service: &ModelService, retrain_args: &RetrainArgs, args: &OdsArgs) -> Result<()> {
    let started = Instant::now();
    let mut texts = retrain_args.texts.clone();
    let mut labels = retrain_args.labels.clone();
    if let Some(path) = &retrain_args.examples {
        let extra = Dataset::load(&DatasetSource::new(
            path.clone(),
            retrain_args.base.text_column.clone(),
            retrain_args.base.label_column.clone(),
        ))?;
        texts.extend(extra.texts());
        labels.extend(extra.labels());
    }

    let artifact = service.retrain(&source_of(&retrain_args.base), &texts, &labels)?;
    output_result("Model retrained", &training_result(&artifact, started), args)
}

fn predict(service: &ModelService, predict_args: &PredictArgs, args: &OdsArgs) -> Result<()> {
    let selector: ModelSelector = predict_args.model.parse()?;
    let texts = read_texts(&predict_args.texts)?;
    let model = match &selector {
        ModelSelector::Id(id) => id.to_string(),
        ModelSelector::Latest => service
            .latest(None)?
            .map_or_else(|| "none".to_string(), |id| id.to_string()),
    };

    let predictions = service.predict(&selector, &texts)?;
    let results = PredictionResults {
        model,
        predictions: predictions.into_iter().map(PredictionRow::from).collect(),
    };
    output_result("", &results, args)
}

fn evaluate(service: &ModelService, evaluate_args: &EvaluateArgs, args: &OdsArgs) -> Result<()> {
    let id = resolve_model(service, &evaluate_args.model)?;
    let metrics = service.evaluate(&id, &source_of(&evaluate_args.dataset))?;
    output_result(
        "Evaluation",
        &EvaluationResult {
            model: id.to_string(),
            metrics,
        },
        args,
    )
}

fn describe(service: &ModelService, describe_args: &DescribeArgs, args: &OdsArgs) -> Result<()> {
    let id = resolve_model(service, &describe_args.model)?;
    let metadata = service.describe(&id)?;
    output_result(
        "",
        &ModelDescription {
            id: id.to_string(),
            metadata,
        },
        args,
    )
}

fn datasets(service: &ModelService, command: &DatasetsCommand, args: &OdsArgs) -> Result<()> {
    let catalog = service.datasets();
    match command {
        DatasetsCommand::List => output_result(
            &format!("Datasets in {}", catalog.root().display()),
            &DatasetList {
                datasets: catalog.list()?,
            },
            args,
        ),
        DatasetsCommand::Import { file } => {
            let entry = catalog.import(file)?;
            output_result("Dataset imported", &entry, args)
        }
    }
}

fn normalize_texts(normalize_args: &NormalizeArgs, args: &OdsArgs) -> Result<()> {
    let normalizer = Normalizer::for_language(Language::default())?;
    let texts = read_texts(&normalize_args.texts)?;
    let normalized = normalizer.normalize_batch(&texts)?;
    let items: Vec<NormalizedText> = texts
        .into_iter()
        .zip(normalized)
        .map(|(text, normalized)| NormalizedText { text, normalized })
        .collect();
    output_result("", &items, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_cli_flags_override_config() {
        let args = OdsArgs::try_parse_from([
            "ods",
            "models",
            "--models-dir",
            "/srv/ods/models",
            "--data-dir",
            "/srv/ods/data",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.models_dir, PathBuf::from("/srv/ods/models"));
        assert_eq!(config.data_dir, PathBuf::from("/srv/ods/data"));
    }

    #[test]
    fn test_resolve_latest_on_empty_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = LifecycleConfig {
            models_dir: dir.path().to_path_buf(),
            ..LifecycleConfig::default()
        };
        let service = ModelService::new(config).unwrap();
        assert!(matches!(
            resolve_model(&service, "latest"),
            Err(OdsError::ArtifactNotFound(_))
        ));
        assert_eq!(
            resolve_model(&service, "retrained/x_1").unwrap().to_string(),
            "retrained/x_1"
        );
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use ods_classifier::analysis::Normalizer;
use ods_classifier::config::LifecycleConfig;
use ods_classifier::dataset::{DatasetSource, Label};
use ods_classifier::error::{OdsError, Result};
use ods_classifier::lifecycle::{ModelSelector, ModelService, Predictor};
use ods_classifier::ml::{HyperparameterGrid, Trainer};
use ods_classifier::registry::format::encode_legacy;
use ods_classifier::registry::{ArtifactId, ArtifactRegistry, Namespace};

const POOLS: [(Label, [&str; 6]); 3] = [
    (1, ["pobreza", "ingresos", "hogares", "subsidio", "vivienda", "empleo"]),
    (3, ["salud", "hospital", "vacunas", "medicos", "enfermedad", "clinica"]),
    (4, ["escuela", "docentes", "estudiantes", "aprendizaje", "becas", "colegio"]),
];

/// Balanced three-class corpus, `per_class` rows per label.
fn corpus(per_class: usize) -> (Vec<String>, Vec<Label>) {
    let mut texts = Vec::new();
    let mut labels = Vec::new();
    for (label, words) in POOLS {
        for i in 0..per_class {
            texts.push(format!(
                "Los {} y {} con {} para {}",
                words[i % 6],
                words[(i + 1) % 6],
                words[(i + 2) % 6],
                words[(i + 3) % 6]
            ));
            labels.push(label);
        }
    }
    (texts, labels)
}

fn write_csv(path: &Path, texts: &[String], labels: &[Label]) {
    let mut content = String::from("textos,labels\n");
    for (text, label) in texts.iter().zip(labels) {
        content.push_str(&format!("\"{text}\",{label}\n"));
    }
    fs::write(path, content).unwrap();
}

struct Fixture {
    dir: TempDir,
    service: ModelService,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = LifecycleConfig {
            models_dir: dir.path().join("models"),
            data_dir: dir.path().join("data"),
            ..LifecycleConfig::default()
        };
        let service = ModelService::new(config).unwrap();
        Fixture { dir, service }
    }

    fn dataset(&self, name: &str, per_class: usize) -> DatasetSource {
        let (texts, labels) = corpus(per_class);
        let path = self.dir.path().join(name);
        write_csv(&path, &texts, &labels);
        DatasetSource::new(path, "textos", "labels")
    }
}

#[test]
fn normalizer_strips_case_accents_and_punctuation() -> Result<()> {
    let normalized = Normalizer::default().normalize("¡La Educación pública es esencial!")?;
    assert!(!normalized.is_empty());
    assert!(normalized.is_ascii());
    assert!(!normalized.chars().any(|c| c.is_uppercase()));
    assert!(!normalized.contains('¡') && !normalized.contains('!'));
    assert_eq!(normalized, "educacion public esencial");
    Ok(())
}

#[test]
fn grid_search_returns_grid_point() -> Result<()> {
    let (texts, labels) = corpus(30);
    let grid = HyperparameterGrid::alpha_only(vec![0.05, 0.1, 0.3, 0.5, 1.0], 3, 0.9);
    let outcome = Trainer::default().with_grid(grid.clone()).train(&texts, &labels)?;

    assert!((0.0..=1.0).contains(&outcome.best_score));
    assert!(grid.alpha.contains(&outcome.best_params.alpha));
    assert_eq!(outcome.candidates.len(), grid.len());
    Ok(())
}

#[test]
fn retrain_length_mismatch_is_rejected() {
    let fixture = Fixture::new();
    let base = fixture.dataset("base.csv", 10);
    let texts: Vec<String> = (0..5).map(|i| format!("nuevo texto {i}")).collect();

    let result = fixture.service.retrain(&base, &texts, &[1, 3, 4, 1]);
    assert!(matches!(
        result,
        Err(OdsError::ShapeMismatch { texts: 5, labels: 4 })
    ));
    assert!(fixture.service.list_models(Namespace::Retrained).unwrap().is_empty());
}

#[test]
fn loading_unknown_artifact_fails() {
    let fixture = Fixture::new();
    let id: ArtifactId = "model_nb_20000101T000000Z_0000".parse().unwrap();
    assert!(matches!(
        fixture.service.store().load(&id),
        Err(OdsError::ArtifactNotFound(_))
    ));
}

#[test]
fn empty_registry_predicts_placeholder() -> Result<()> {
    let fixture = Fixture::new();
    let texts = vec!["acceso a vacunas".to_string(), "becas".to_string()];

    let predictions = fixture.service.predict(&ModelSelector::Latest, &texts)?;
    assert_eq!(predictions.len(), texts.len());
    for (prediction, text) in predictions.iter().zip(&texts) {
        assert_eq!(&prediction.text, text);
        assert_eq!(prediction.label, -1);
        assert_eq!(prediction.confidence, 0.0);
    }
    assert!(fixture.service.latest(None)?.is_none());
    Ok(())
}

#[test]
fn saved_pipeline_predicts_identically_after_reload() -> Result<()> {
    let fixture = Fixture::new();
    let source = fixture.dataset("train.csv", 15);
    let artifact = fixture.service.train_from_dataset(&source)?;

    let sample = vec![
        "vacunas en el hospital".to_string(),
        "becas para estudiantes".to_string(),
        "subsidio de vivienda".to_string(),
        "texto sin palabras conocidas".to_string(),
    ];
    let reloaded = fixture.service.store().load(&artifact.id)?;
    assert_eq!(reloaded.metadata, artifact.metadata);
    assert_eq!(
        reloaded.pipeline.predict(&sample)?,
        artifact.pipeline.predict(&sample)?
    );
    assert_eq!(
        reloaded.pipeline.predict_proba(&sample)?,
        artifact.pipeline.predict_proba(&sample)?
    );

    let metadata = &artifact.metadata;
    assert_eq!(metadata.samples.unwrap().total, 45);
    assert_eq!(metadata.dataset.as_ref().unwrap().sources, vec![source.path.clone()]);
    assert!(metadata.cv_f1_macro.is_some());
    assert!(metadata.created_at.is_some());
    Ok(())
}

#[test]
fn retrain_records_base_new_and_total_counts() -> Result<()> {
    let fixture = Fixture::new();
    let base = fixture.dataset("base.csv", 10);
    let new_texts = vec![
        "clinica con medicos".to_string(),
        "docentes en la escuela".to_string(),
        "empleo y ingresos".to_string(),
    ];

    let artifact = fixture.service.retrain(&base, &new_texts, &[3, 4, 1])?;
    let samples = artifact.metadata.samples.unwrap();
    assert_eq!(samples.base, 30);
    assert_eq!(samples.new, 3);
    assert_eq!(samples.total, samples.base + samples.new);
    assert_eq!(artifact.id.namespace, Namespace::Retrained);
    assert_eq!(
        fixture.service.list_models(Namespace::Retrained)?,
        vec![artifact.id.clone()]
    );

    // The base file is read on every call.
    let (texts, labels) = corpus(12);
    write_csv(&base.path, &texts, &labels);
    let second = fixture.service.retrain(&base, &new_texts, &[3, 4, 1])?;
    assert_eq!(second.metadata.samples.unwrap().base, 36);
    Ok(())
}

#[test]
fn evaluation_metrics_are_bounded_and_count_kept_rows() -> Result<()> {
    let fixture = Fixture::new();
    let artifact = fixture.service.train_from_dataset(&fixture.dataset("train.csv", 10))?;

    let test_path = fixture.dir.path().join("test.csv");
    fs::write(
        &test_path,
        "textos,labels\n\
         vacunas para la clinica,3\n\
         becas y colegio,4\n\
         ,1\n\
         vivienda para hogares,1\n\
         hospital sin etiqueta,\n\
         docentes del hospital,3\n",
    )
    .unwrap();

    let metrics = fixture
        .service
        .evaluate(&artifact.id, &DatasetSource::new(test_path, "textos", "labels"))?;
    assert_eq!(metrics.n_samples, 4);
    for value in [
        metrics.accuracy,
        metrics.precision_macro,
        metrics.recall_macro,
        metrics.f1_macro,
        metrics.f1_micro,
        metrics.f1_weighted,
    ] {
        assert!((0.0..=1.0).contains(&value));
    }
    Ok(())
}

#[test]
fn prediction_confidence_is_max_probability() -> Result<()> {
    let (texts, labels) = corpus(10);
    let pipeline = Trainer::default().fit_fixed(&texts, &labels, 0.5)?;
    let sample = vec![
        "medicos y vacunas".to_string(),
        "aprendizaje".to_string(),
        "".to_string(),
    ];

    for prediction in Predictor::new(&pipeline).predict_batch(&sample)? {
        let max = prediction
            .probabilities
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(prediction.confidence, max);
        let sum: f64 = prediction.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
    Ok(())
}

#[test]
fn legacy_bare_pipeline_loads_with_empty_metadata() -> Result<()> {
    let fixture = Fixture::new();
    let (texts, labels) = corpus(10);
    let pipeline = Trainer::default().fit_fixed(&texts, &labels, 1.0)?;

    let models_dir: PathBuf = fixture.service.config().models_dir.clone();
    fs::create_dir_all(&models_dir).unwrap();
    fs::write(models_dir.join("legacy_model.bin"), encode_legacy(&pipeline)?).unwrap();

    let id: ArtifactId = "legacy_model.bin".parse()?;
    let artifact = fixture.service.store().load(&id)?;
    assert!(artifact.metadata.is_legacy());
    assert_eq!(artifact.pipeline.predict(&texts)?, pipeline.predict(&texts)?);

    let metadata = fixture.service.describe(&id)?;
    assert!(metadata.samples.is_none() && metadata.params.is_none());
    Ok(())
}

#[test]
fn latest_prefers_newest_across_namespaces() -> Result<()> {
    let fixture = Fixture::new();
    let base = fixture.dataset("base.csv", 10);
    let scratch = fixture.service.train_fixed(&base, 0.3)?;
    assert_eq!(fixture.service.latest(None)?, Some(scratch.id.clone()));
    assert!(scratch.metadata.cv_f1_macro.is_none());

    let retrained = fixture
        .service
        .retrain(&base, &["hogares con subsidio".to_string()], &[1])?;
    assert_eq!(fixture.service.latest(None)?, Some(retrained.id.clone()));
    assert_eq!(
        fixture.service.latest(Some(Namespace::FromScratch))?,
        Some(scratch.id)
    );

    let predictions = fixture
        .service
        .predict(&ModelSelector::Latest, &["vacunas".to_string()])?;
    assert_eq!(predictions[0].label, 3);
    Ok(())
}

#[test]
fn insufficient_class_samples_is_reported() {
    let fixture = Fixture::new();
    let path = fixture.dir.path().join("small.csv");
    let (mut texts, mut labels) = corpus(10);
    texts.push("agua potable".to_string());
    labels.push(6);
    write_csv(&path, &texts, &labels);

    let result = fixture
        .service
        .train_from_dataset(&DatasetSource::new(path, "textos", "labels"));
    assert!(matches!(
        result,
        Err(OdsError::InsufficientClassSamples { label: 6, count: 1, required: 5 })
    ));
    assert!(fixture.service.list_models(Namespace::FromScratch).unwrap().is_empty());
}

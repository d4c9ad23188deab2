/// Integration tests for the training and prediction pipeline
///
/// These tests verify the complete flow:
/// - Training on labeled emails
/// - Cross-validation and holdout reporting
/// - Class coverage and balance handling
/// - Batch prediction consistency

use mailtriage::{
    labeler::RuleLabeler,
    models::{EmailRecord, LabeledExample, Priority},
    reference_examples, ModelKind, PipelineError, Predictor, TrainConfig, Trainer,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn training_corpus() -> Vec<LabeledExample> {
    init_tracing();
    // Replicate the curated seed set for more training data.
    let base = reference_examples();
    let mut corpus = base.clone();
    corpus.extend(base.clone());
    corpus.extend(base.clone());
    corpus.extend(base);
    corpus
}

fn fast_config(model_type: ModelKind) -> TrainConfig {
    let mut config = TrainConfig::default();
    config.model_type = model_type;
    config.cv_folds = 2;
    config.forest.n_estimators = 20;
    config.forest.max_depth = 12;
    config
}

fn setup_predictor(model_type: ModelKind) -> Predictor {
    let trainer = Trainer::new(fast_config(model_type)).unwrap();
    let artifact = trainer.train(&training_corpus()).unwrap();
    Predictor::from_artifact(artifact).unwrap()
}

#[test]
fn test_train_and_classify_urgent_email() {
    let predictor = setup_predictor(ModelKind::TreeEnsemble);

    let result = predictor
        .predict(&EmailRecord::new(
            "URGENT: Server outage affecting production",
            "We have a critical server outage that is impacting all production systems. Need immediate response from the infrastructure team. This is affecting customer transactions.",
        ))
        .unwrap();
    assert_eq!(result.priority, Priority::High);
    assert!(result.confidence > 0.5);

    let result = predictor
        .predict(&EmailRecord::new(
            "URGENT: Server maintenance required",
            "The production server needs immediate attention.",
        ))
        .unwrap();
    assert_eq!(result.priority, Priority::High);
}

#[test]
fn test_default_settings_classify_urgent_email_high() {
    // No hyperparameter tuning at all: stock config, curated seed corpus.
    let trainer = Trainer::new(TrainConfig::default()).unwrap();
    let artifact = trainer.train(&training_corpus()).unwrap();
    let predictor = Predictor::from_artifact(artifact).unwrap();

    let urgent = predictor
        .predict(&EmailRecord::new(
            "URGENT: Server maintenance required",
            "The production server needs immediate attention.",
        ))
        .unwrap();
    assert_eq!(urgent.priority, Priority::High);

    let newsletter = predictor
        .predict(&EmailRecord::new(
            "FYI: Monthly Newsletter",
            "Our monthly newsletter is out. Unsubscribe at any time using the link below.",
        ))
        .unwrap();
    assert_ne!(newsletter.priority, Priority::High);
}

#[test]
fn test_newsletter_classified_low() {
    let predictor = setup_predictor(ModelKind::TreeEnsemble);

    let result = predictor
        .predict(&EmailRecord::new(
            "Newsletter: Weekly Tech Digest",
            "Welcome to this week's tech newsletter! Featured articles: 10 productivity tips, new cloud services, and industry trends. Click here to read more.",
        ))
        .unwrap();
    assert_eq!(result.priority, Priority::Low);

    let result = predictor
        .predict(&EmailRecord::new(
            "FYI: Monthly Newsletter",
            "Our monthly newsletter is out. Unsubscribe at any time using the link below.",
        ))
        .unwrap();
    assert_ne!(result.priority, Priority::High);
}

#[test]
fn test_batch_matches_single_predictions() {
    let predictor = setup_predictor(ModelKind::TreeEnsemble);

    let emails = vec![
        EmailRecord::new("Newsletter: Weekly Tech Digest", "Click here to read more."),
        EmailRecord::new(
            "URGENT: Server outage affecting production",
            "Critical server outage, need immediate response.",
        ),
        EmailRecord::new(
            "Project status update for Q2",
            "Here is the monthly status update for the infrastructure project.",
        ),
    ];

    let batch = predictor.predict_batch(&emails).unwrap();
    assert_eq!(batch.len(), emails.len());

    // Order is preserved and each row matches a standalone prediction.
    for (email, from_batch) in emails.iter().zip(&batch) {
        let single = predictor.predict(email).unwrap();
        assert_eq!(single.priority, from_batch.priority);
        assert_eq!(single.probabilities, from_batch.probabilities);
    }
}

#[test]
fn test_probabilities_are_complete_and_normalized() {
    let predictor = setup_predictor(ModelKind::TreeEnsemble);

    let result = predictor
        .predict(&EmailRecord::new("Team lunch next Friday?", "Hey team, interested?"))
        .unwrap();

    assert_eq!(result.probabilities.len(), 3);
    let total: f64 = Priority::ALL
        .iter()
        .map(|priority| result.probabilities[&priority.to_string()])
        .sum();
    assert!((total - 1.0).abs() < 1e-9);

    let max = result
        .probabilities
        .values()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((result.confidence - max).abs() < 1e-12);
}

#[test]
fn test_training_summary_reports_quality() {
    let trainer = Trainer::new(fast_config(ModelKind::TreeEnsemble)).unwrap();
    let artifact = trainer.train(&training_corpus()).unwrap();
    let summary = &artifact.summary;

    assert_eq!(summary.n_examples, 76);
    assert_eq!(summary.class_counts, [24, 24, 28]);
    assert_eq!(summary.cross_validation.folds, 2);
    assert!(summary.cross_validation.mean_accuracy > 0.5);
    assert!(summary.holdout.accuracy > 0.7);

    // Confusion matrix row sums equal per-class support.
    for (class, report) in summary.holdout.per_class.iter().enumerate() {
        let row_total: usize = summary.holdout.confusion[class].iter().sum();
        assert_eq!(report.support, row_total);
    }

    // Ranked features come back heaviest first.
    let weights: Vec<f64> = summary.top_features.iter().map(|f| f.weight).collect();
    assert!(!weights.is_empty());
    assert!(weights.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn test_missing_class_is_rejected() {
    let corpus: Vec<LabeledExample> = training_corpus()
        .into_iter()
        .filter(|example| example.priority != Priority::Low)
        .collect();

    let trainer = Trainer::new(fast_config(ModelKind::TreeEnsemble)).unwrap();
    let err = trainer.train(&corpus).unwrap_err();

    assert!(matches!(err, PipelineError::Data(_)));
    assert!(err.to_string().contains("LOW"));
}

#[test]
fn test_balance_mode_equalizes_classes() {
    let mut config = fast_config(ModelKind::TreeEnsemble);
    config.balance_dataset = true;

    let trainer = Trainer::new(config).unwrap();
    let artifact = trainer.train(&training_corpus()).unwrap();

    assert!(artifact.summary.balance_applied);
    assert_eq!(artifact.summary.class_counts, [24, 24, 24]);
    assert_eq!(artifact.summary.n_examples, 72);
}

#[test]
fn test_linear_model_end_to_end() {
    let predictor = setup_predictor(ModelKind::Linear);

    let result = predictor
        .predict(&EmailRecord::new(
            "URGENT: Server outage affecting production",
            "We have a critical server outage that is impacting all production systems. Need immediate response from the infrastructure team.",
        ))
        .unwrap();

    assert_eq!(result.priority, Priority::High);
    let total: f64 = result.probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert_eq!(
        predictor.artifact().summary.model_type,
        ModelKind::Linear
    );
}

#[test]
fn test_rule_bootstrap_feeds_training() {
    // Strip the curated labels and re-derive them with the rule labeler.
    let emails: Vec<EmailRecord> = reference_examples()
        .into_iter()
        .map(|example| example.email)
        .collect();

    let labeler = RuleLabeler::default();
    let base = labeler.bootstrap_examples(&emails);
    let mut corpus = base.clone();
    corpus.extend(base.clone());
    corpus.extend(base.clone());
    corpus.extend(base);

    let trainer = Trainer::new(fast_config(ModelKind::TreeEnsemble)).unwrap();
    let artifact = trainer.train(&corpus).unwrap();

    for count in artifact.summary.class_counts {
        assert!(count > 0);
    }
}

#[test]
fn test_empty_training_set_is_rejected() {
    let trainer = Trainer::new(fast_config(ModelKind::TreeEnsemble)).unwrap();
    assert!(matches!(
        trainer.train(&[]),
        Err(PipelineError::Data(_))
    ));
}

#[test]
fn test_repeated_training_is_reproducible() {
    let trainer = Trainer::new(fast_config(ModelKind::TreeEnsemble)).unwrap();
    let first = trainer.train(&training_corpus()).unwrap();
    let second = trainer.train(&training_corpus()).unwrap();

    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(
        first.summary.cross_validation,
        second.summary.cross_validation
    );
    assert_eq!(first.summary.holdout, second.summary.holdout);
}

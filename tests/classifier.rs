//! Classifier policy and batch-gate tests.

mod common;

use std::sync::Arc;
use std::time::Duration;

use copysentry::config::{ClassifierSettings, FailurePolicy};
use copysentry::{CandidateResult, InfringementClassifier, LearnedExamples};

use common::{test_product, MockGateway};

fn candidate(url: &str) -> CandidateResult {
    CandidateResult {
        platform: "forum".to_string(),
        source_url: url.to_string(),
        risk_level: Default::default(),
        audience_estimate: None,
    }
}

fn fast_settings() -> ClassifierSettings {
    ClassifierSettings {
        min_confidence: 0.75,
        batch_size: 5,
        batch_delay: Duration::from_millis(0),
        failure_policy: FailurePolicy::FailOpen,
    }
}

fn verdict_json(is_infringement: bool, confidence: f64) -> serde_json::Value {
    serde_json::json!({
        "is_infringement": is_infringement,
        "confidence": confidence,
        "reasoning": "scripted verdict",
        "infringement_type": "piracy"
    })
}

#[tokio::test]
async fn classifier_fails_open_on_gateway_error() {
    let classifier =
        InfringementClassifier::new(Arc::new(MockGateway::failing()), fast_settings());

    let verdict = classifier
        .classify(
            &candidate("https://pirate.example/a"),
            &test_product(),
            &LearnedExamples::default(),
        )
        .await;

    assert!(verdict.is_infringement);
    assert_eq!(verdict.confidence, 0.5);
    assert!(!verdict.reasoning.is_empty());
}

#[tokio::test]
async fn classifier_fails_closed_when_configured() {
    let settings = ClassifierSettings {
        failure_policy: FailurePolicy::FailClosed,
        ..fast_settings()
    };
    let classifier = InfringementClassifier::new(Arc::new(MockGateway::failing()), settings);

    let verdict = classifier
        .classify(
            &candidate("https://pirate.example/a"),
            &test_product(),
            &LearnedExamples::default(),
        )
        .await;

    assert!(!verdict.is_infringement);
}

#[tokio::test]
async fn invalid_response_shape_degrades_like_an_error() {
    // Confidence out of range fails validation
    let gateway = MockGateway::responding(serde_json::json!({
        "is_infringement": true,
        "confidence": 7.5,
        "reasoning": "nonsense"
    }));
    let classifier = InfringementClassifier::new(Arc::new(gateway), fast_settings());

    let verdict = classifier
        .classify(
            &candidate("https://pirate.example/a"),
            &test_product(),
            &LearnedExamples::default(),
        )
        .await;

    assert!(verdict.is_infringement);
    assert_eq!(verdict.confidence, 0.5);
}

#[tokio::test]
async fn batch_promotes_only_above_threshold() {
    let gateway = MockGateway::keyed(vec![
        ("https://a.example", verdict_json(true, 0.9)),
        ("https://b.example", verdict_json(true, 0.5)),
        ("https://c.example", verdict_json(false, 0.99)),
    ]);
    let classifier = InfringementClassifier::new(Arc::new(gateway), fast_settings());

    let promoted = classifier
        .classify_batch(
            vec![
                candidate("https://a.example"),
                candidate("https://b.example"),
                candidate("https://c.example"),
            ],
            &test_product(),
            &LearnedExamples::default(),
        )
        .await;

    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].0.source_url, "https://a.example");
    assert_eq!(promoted[0].1.confidence, 0.9);
}

#[tokio::test]
async fn batch_preserves_input_order_and_survives_item_errors() {
    // b errors (no scripted response); with fail-open it still promotes at 0.5,
    // which is below the gate, so only a and c survive, in order.
    let gateway = MockGateway::keyed(vec![
        ("https://a.example", verdict_json(true, 0.8)),
        ("https://c.example", verdict_json(true, 0.95)),
    ]);
    let classifier = InfringementClassifier::new(Arc::new(gateway), fast_settings());

    let promoted = classifier
        .classify_batch(
            vec![
                candidate("https://a.example"),
                candidate("https://b.example"),
                candidate("https://c.example"),
            ],
            &test_product(),
            &LearnedExamples::default(),
        )
        .await;

    let urls: Vec<_> = promoted.iter().map(|(c, _)| c.source_url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.example", "https://c.example"]);
}

#[tokio::test]
async fn batch_spanning_multiple_groups_keeps_order() {
    let settings = ClassifierSettings {
        batch_size: 2,
        ..fast_settings()
    };
    let gateway = MockGateway::keyed(
        (0..5)
            .map(|i| (format!("https://site{}.example", i), verdict_json(true, 0.9)))
            .collect(),
    );
    let classifier = InfringementClassifier::new(Arc::new(gateway), settings);

    let candidates: Vec<_> = (0..5)
        .map(|i| candidate(&format!("https://site{}.example", i)))
        .collect();

    let promoted = classifier
        .classify_batch(candidates, &test_product(), &LearnedExamples::default())
        .await;

    let urls: Vec<_> = promoted.iter().map(|(c, _)| c.source_url.clone()).collect();
    let expected: Vec<_> = (0..5).map(|i| format!("https://site{}.example", i)).collect();
    assert_eq!(urls, expected);
}

#[tokio::test]
async fn empty_candidate_fields_degrade_per_policy() {
    let classifier = InfringementClassifier::new(
        Arc::new(MockGateway::responding(verdict_json(true, 0.99))),
        fast_settings(),
    );

    let verdict = classifier
        .classify(
            &CandidateResult {
                platform: String::new(),
                source_url: "https://pirate.example".to_string(),
                risk_level: Default::default(),
                audience_estimate: None,
            },
            &test_product(),
            &LearnedExamples::default(),
        )
        .await;

    // Missing platform short-circuits to the degraded verdict
    assert_eq!(verdict.confidence, 0.5);
}

//! Generative classifier tests
//!
//! Uses scripted generators for the label mapping and an in-process
//! completions server for the HTTP backend.

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use flowsiem_classifiers::{
    Classifier, CompletionsGenerator, GenerativeClassifier, GeneratorConfig, TextGenerator,
};
use flowsiem_core::{Error, Label, Result};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// A generator that always answers with the same text
struct ScriptedGenerator {
    response: String,
    call_count: AtomicU32,
}

impl ScriptedGenerator {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            call_count: AtomicU32::new(0),
        }
    }

    fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.response.clone())
    }
}

/// A generator that always fails - for testing error paths
struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(Error::inference("out of GPU memory"))
    }
}

fn classifier_answering(response: &str) -> (GenerativeClassifier, Arc<ScriptedGenerator>) {
    let generator = Arc::new(ScriptedGenerator::new(response));
    let classifier = GenerativeClassifier::new("scripted", generator.clone());
    (classifier, generator)
}

#[tokio::test]
async fn test_labels_from_generated_text() {
    let cases = [
        (" This traffic flow is normal.", Label::Normal),
        ("The flow belongs to an Attacker", Label::Attacker),
        ("victim", Label::Victim),
        ("I am not sure", Label::Unknown),
        ("attacker targeting a victim, otherwise normal", Label::Normal),
    ];

    for (response, expected) in cases {
        let (classifier, generator) = classifier_answering(response);
        let label = classifier.classify("tcp 1.1.1.1:80").await.unwrap();
        assert_eq!(label, expected, "response {:?}", response);
        assert_eq!(generator.call_count(), 1);
    }
}

#[tokio::test]
async fn test_generator_failure_is_inference_error() {
    let classifier = GenerativeClassifier::new("broken", Arc::new(FailingGenerator));

    let result = classifier.classify("udp 8.8.8.8:53").await;
    assert!(matches!(result, Err(Error::Inference(_))));
}

// =============================================================================
// Completions backend
// =============================================================================

#[derive(Clone)]
struct BackendState {
    requests: Arc<Mutex<Vec<Value>>>,
    reply: Arc<(StatusCode, Value)>,
}

async fn completions(
    State(state): State<BackendState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(body);
    let (status, reply) = state.reply.as_ref().clone();
    (status, Json(reply))
}

async fn spawn_backend(status: StatusCode, reply: Value) -> (SocketAddr, Arc<Mutex<Vec<Value>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = BackendState {
        requests: requests.clone(),
        reply: Arc::new((status, reply)),
    };
    let app = Router::new()
        .route("/v1/completions", post(completions))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, requests)
}

fn config_for(addr: SocketAddr) -> GeneratorConfig {
    GeneratorConfig {
        endpoint: format!("http://{}/v1", addr),
        model: "flows-lora".to_string(),
        timeout_secs: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_completions_backend_round_trip() {
    let (addr, requests) = spawn_backend(
        StatusCode::OK,
        json!({"choices": [{"index": 0, "text": " ATTACKER", "finish_reason": "stop"}]}),
    )
    .await;

    let classifier = GenerativeClassifier::load(config_for(addr)).unwrap();
    assert_eq!(classifier.name(), "flows-lora");

    let label = classifier.classify("tcp 10.0.0.1:4444 -> 10.0.0.2:445").await.unwrap();
    assert_eq!(label, Label::Attacker);

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["model"], "flows-lora");
    assert_eq!(requests[0]["max_tokens"], 1000);
    let prompt = requests[0]["prompt"].as_str().unwrap();
    assert!(prompt.contains("###input: tcp 10.0.0.1:4444 -> 10.0.0.2:445"));
}

#[tokio::test]
async fn test_completions_backend_error_status() {
    let (addr, _) = spawn_backend(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"error": "model not loaded"}),
    )
    .await;

    let generator = CompletionsGenerator::new(config_for(addr)).unwrap();
    let result = generator.generate("prompt").await;

    match result {
        Err(Error::Inference(msg)) => assert!(msg.contains("503")),
        other => panic!("Expected inference error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_completions_backend_without_choices() {
    let (addr, _) = spawn_backend(StatusCode::OK, json!({"choices": []})).await;

    let generator = CompletionsGenerator::new(config_for(addr)).unwrap();
    assert!(matches!(
        generator.generate("prompt").await,
        Err(Error::Inference(_))
    ));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let generator = CompletionsGenerator::new(config_for(addr)).unwrap();
    assert!(matches!(
        generator.generate("prompt").await,
        Err(Error::Inference(_))
    ));
}

//! Common utilities for integration tests

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;
use tts_core::{SpeechChunk, SpeechChunks, SpeechPipeline, SAMPLE_RATE};
use tts_server::{build_router, config::ServerConfig, handle::PipelineHandle, AppState};

/// What the stub pipeline does when asked to speak.
#[derive(Clone)]
pub enum StubOutput {
    Chunks(Vec<Vec<f32>>),
    Fail(String),
}

/// Pipeline that replays canned chunks and records every call.
pub struct StubPipeline {
    output: StubOutput,
    pub calls: Mutex<Vec<(String, String, f32)>>,
}

impl StubPipeline {
    pub fn new(output: StubOutput) -> Self {
        Self {
            output,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl SpeechPipeline for StubPipeline {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn synthesize<'a>(&'a self, text: &'a str, voice: &'a str, speed: f32) -> anyhow::Result<SpeechChunks<'a>> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string(), speed));

        match &self.output {
            StubOutput::Chunks(chunks) => Ok(Box::new(chunks.iter().map(move |audio| {
                Ok(SpeechChunk {
                    graphemes: text.to_string(),
                    phonemes: None,
                    audio: audio.clone(),
                })
            }))),
            StubOutput::Fail(msg) => Err(anyhow::anyhow!("{msg}")),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub pipeline: Arc<StubPipeline>,
    pub loads: Arc<AtomicUsize>,
    pub output_dir: TempDir,
}

impl TestApp {
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

/// Create a test app whose pipeline loads lazily on the first `/tts`.
pub fn create_test_app(output: StubOutput) -> TestApp {
    let pipeline = Arc::new(StubPipeline::new(output));
    let loads = Arc::new(AtomicUsize::new(0));
    let output_dir = tempfile::tempdir().expect("tempdir");

    let loader = {
        let pipeline = Arc::clone(&pipeline);
        let loads = Arc::clone(&loads);
        move || -> anyhow::Result<Arc<dyn SpeechPipeline>> {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(pipeline.clone())
        }
    };

    let config = ServerConfig {
        preload: false,
        output_dir: output_dir.path().to_path_buf(),
        ..Default::default()
    };
    let state = AppState::new(Arc::new(PipelineHandle::new(loader)), config);

    TestApp {
        router: build_router(state.clone()),
        state,
        pipeline,
        loads,
        output_dir,
    }
}

/// One loud second of speech followed by a second of silence.
pub fn speech_with_tail() -> Vec<Vec<f32>> {
    let speech: Vec<f32> = (0..SAMPLE_RATE as usize)
        .map(|i| ((i as f32) * 0.06).sin() * 0.4 + 0.5)
        .collect();
    vec![speech, vec![0.0; SAMPLE_RATE as usize]]
}

/// Send a request and return the status with the body parsed as JSON.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

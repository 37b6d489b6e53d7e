//! Shared fixtures for unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::food::api::NutritionAnalyzer;
use crate::food::config::{NUTRITION_PATH, SEGMENTATION_PATH};
use crate::food::error::AnalysisError;
use crate::food::handoff::{NavigationParams, Navigator};
use crate::food::models::{CapturedImage, NutritionRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    Push(String, NavigationParams),
    Replace(String, NavigationParams),
    Back,
    Alert(String, String),
}

#[derive(Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<NavEvent>>,
}

impl RecordingNavigator {
    pub fn events(&self) -> Vec<NavEvent> {
        self.events.lock().clone()
    }

    pub fn replace_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, NavEvent::Replace(..)))
            .count()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, route: &str, params: NavigationParams) {
        self.events.lock().push(NavEvent::Push(route.to_string(), params));
    }

    fn replace(&self, route: &str, params: NavigationParams) {
        self.events.lock().push(NavEvent::Replace(route.to_string(), params));
    }

    fn back(&self) {
        self.events.lock().push(NavEvent::Back);
    }

    fn alert(&self, title: &str, message: &str) {
        self.events
            .lock()
            .push(NavEvent::Alert(title.to_string(), message.to_string()));
    }
}

pub fn avocado_toast() -> NutritionRecord {
    NutritionRecord {
        food_name: "Avocado Toast".to_string(),
        calories: 280.0,
        carbs: 30.0,
        protein: 8.0,
        fat: 14.0,
        nutri_score: Some(7.0),
    }
}

type ErrorFactory = Box<dyn Fn() -> AnalysisError + Send + Sync>;

/// Resolves with a fixed result, optionally after a delay.
pub struct StubAnalyzer {
    result: Result<NutritionRecord, ErrorFactory>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubAnalyzer {
    pub fn succeeding(record: NutritionRecord) -> Self {
        Self {
            result: Ok(record),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: impl Fn() -> AnalysisError + Send + Sync + 'static) -> Self {
        Self {
            result: Err(Box::new(error)),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NutritionAnalyzer for StubAnalyzer {
    async fn analyze(&self, _image: &CapturedImage) -> Result<NutritionRecord, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.result {
            Ok(record) => Ok(record.clone()),
            Err(make) => Err(make()),
        }
    }
}

/// Never resolves.
pub struct PendingAnalyzer;

#[async_trait]
impl NutritionAnalyzer for PendingAnalyzer {
    async fn analyze(&self, _image: &CapturedImage) -> Result<NutritionRecord, AnalysisError> {
        futures::future::pending().await
    }
}

/// Resolves only once the paired sender fires.
pub struct GatedAnalyzer {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    result: Mutex<Option<Result<NutritionRecord, AnalysisError>>>,
    calls: AtomicUsize,
}

impl GatedAnalyzer {
    pub fn new(result: Result<NutritionRecord, AnalysisError>) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let analyzer = Self {
            gate: Mutex::new(Some(rx)),
            result: Mutex::new(Some(result)),
            calls: AtomicUsize::new(0),
        };
        (analyzer, tx)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NutritionAnalyzer for GatedAnalyzer {
    async fn analyze(&self, _image: &CapturedImage) -> Result<NutritionRecord, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.result
            .lock()
            .take()
            .unwrap_or(Err(AnalysisError::NoImageId))
    }
}

/// Writes a small gradient image and returns its path as a string.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> String {
    let path = dir.join(name);
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(&path).unwrap();
    path.to_string_lossy().into_owned()
}

pub fn write_fixture_image() -> (tempfile::TempDir, CapturedImage) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_image(dir.path(), "meal.jpg", 64, 48);
    (dir, CapturedImage::new(path, "image/jpeg"))
}

#[derive(Debug, Default)]
pub struct SeenRequests {
    pub segmentation_auth: Option<String>,
    pub segmentation_content_type: Option<String>,
    pub nutrition_auth: Option<String>,
    pub nutrition_body: Option<Value>,
}

/// A local stand-in for the LogMeal API.
pub struct MockApi {
    pub base_url: String,
    pub segmentation_calls: Arc<AtomicUsize>,
    pub nutrition_calls: Arc<AtomicUsize>,
    pub seen: Arc<tokio::sync::Mutex<SeenRequests>>,
}

/// What the stand-in answers on each route.
#[derive(Clone)]
pub struct Responses {
    pub segmentation_status: StatusCode,
    pub segmentation_body: Value,
    pub segmentation_delay: Option<Duration>,
    pub nutrition_status: StatusCode,
    pub nutrition_body: Value,
    /// Sent verbatim as `text/html` instead of `nutrition_body`.
    pub nutrition_raw: Option<&'static str>,
}

impl Responses {
    pub fn ok(segmentation: Value, nutrition: Value) -> Self {
        Self {
            segmentation_status: StatusCode::OK,
            segmentation_body: segmentation,
            segmentation_delay: None,
            nutrition_status: StatusCode::OK,
            nutrition_body: nutrition,
            nutrition_raw: None,
        }
    }
}

#[derive(Clone)]
struct ServerState {
    responses: Responses,
    segmentation_calls: Arc<AtomicUsize>,
    nutrition_calls: Arc<AtomicUsize>,
    seen: Arc<tokio::sync::Mutex<SeenRequests>>,
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

async fn segmentation_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    _body: Bytes,
) -> Response {
    state.segmentation_calls.fetch_add(1, Ordering::SeqCst);
    {
        let mut seen = state.seen.lock().await;
        seen.segmentation_auth = header_string(&headers, header::AUTHORIZATION);
        seen.segmentation_content_type = header_string(&headers, header::CONTENT_TYPE);
    }
    let responses = &state.responses;
    if let Some(delay) = responses.segmentation_delay {
        tokio::time::sleep(delay).await;
    }
    (
        responses.segmentation_status,
        Json(responses.segmentation_body.clone()),
    )
        .into_response()
}

async fn nutrition_handler(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.nutrition_calls.fetch_add(1, Ordering::SeqCst);
    {
        let mut seen = state.seen.lock().await;
        seen.nutrition_auth = header_string(&headers, header::AUTHORIZATION);
        seen.nutrition_body = Some(body);
    }
    let responses = &state.responses;
    match responses.nutrition_raw {
        Some(raw) => (
            responses.nutrition_status,
            [(header::CONTENT_TYPE, "text/html")],
            raw,
        )
            .into_response(),
        None => (
            responses.nutrition_status,
            Json(responses.nutrition_body.clone()),
        )
            .into_response(),
    }
}

impl MockApi {
    pub async fn spawn(responses: Responses) -> Self {
        let segmentation_calls = Arc::new(AtomicUsize::new(0));
        let nutrition_calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(tokio::sync::Mutex::new(SeenRequests::default()));

        let state = ServerState {
            responses,
            segmentation_calls: segmentation_calls.clone(),
            nutrition_calls: nutrition_calls.clone(),
            seen: seen.clone(),
        };
        let router = Router::new()
            .route(SEGMENTATION_PATH, post(segmentation_handler))
            .route(NUTRITION_PATH, post(nutrition_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            segmentation_calls,
            nutrition_calls,
            seen,
        }
    }

    pub async fn failing_segmentation(status: u16) -> Self {
        Self::spawn(Responses {
            segmentation_status: StatusCode::from_u16(status).unwrap(),
            ..Responses::ok(json!({ "message": "upstream error" }), Value::Null)
        })
        .await
    }

    pub async fn failing_nutrition(status: u16) -> Self {
        Self::spawn(Responses {
            nutrition_status: StatusCode::from_u16(status).unwrap(),
            ..Responses::ok(json!({ "imageId": 1 }), json!({ "message": "upstream error" }))
        })
        .await
    }
}

pub async fn mock_api(segmentation: Value, nutrition: Value) -> MockApi {
    MockApi::spawn(Responses::ok(segmentation, nutrition)).await
}

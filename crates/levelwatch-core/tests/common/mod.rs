//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use axum::Router;
use parking_lot::Mutex;
use tempfile::TempDir;
use tower::ServiceExt;

use levelwatch::alerting::{Notifier, ThresholdAlerter};
use levelwatch::api::{build_app, AppState};
use levelwatch::config::{AlertingConfig, DatabaseConfig};
use levelwatch::db::ReadingStore;
use levelwatch::error::NotifyError;

/// Notifier that records every message and optionally stalls or fails.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<String>>,
    pub delay: Duration,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.sent.lock().push(message.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(NotifyError::Unreachable("gateway down".to_string()));
        }
        Ok(())
    }
}

/// A fully wired application backed by a throwaway SQLite file.
pub struct TestApp {
    pub router: Router,
    pub store: ReadingStore,
    pub notifier: Arc<RecordingNotifier>,
    _dir: TempDir,
}

/// Build a test app with the given threshold and cooldown.
pub async fn spawn_app(threshold: Option<f64>, cooldown: Duration) -> TestApp {
    spawn_app_with(threshold, cooldown, RecordingNotifier::default()).await
}

/// Build a test app around a specific notifier.
pub async fn spawn_app_with(
    threshold: Option<f64>,
    cooldown: Duration,
    notifier: RecordingNotifier,
) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let database = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("levels.db").display()),
        max_connections: 5,
    };
    let store = ReadingStore::connect(&database)
        .await
        .expect("Failed to open test database");

    let notifier = Arc::new(notifier);
    let alerting = AlertingConfig { threshold, cooldown };
    let alerter = Arc::new(ThresholdAlerter::new(notifier.clone(), &alerting));

    let router = build_app(AppState {
        store: store.clone(),
        alerter,
    });

    TestApp {
        router,
        store,
        notifier,
        _dir: dir,
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Body) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: &str) -> Response<Body> {
    send(app, Method::POST, uri, Body::from(body.to_string())).await
}

pub async fn post_level(app: &Router, level: f64) -> Response<Body> {
    post_json(app, "/api", &serde_json::json!({ "level": level }).to_string()).await
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Give detached threshold checks time to run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

/// Wait until `count` notifications were recorded, or give up after a second.
pub async fn wait_for_notifications(notifier: &RecordingNotifier, count: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
    while notifier.sent().len() < count && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

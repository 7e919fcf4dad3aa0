//! In-process stand-in for the OData backend.

use crate::config::AppConfig;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const TEST_DOCTOR: &str = "00163c3a-06c9-1edf-88aa-376034cb9e31";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub params: HashMap<String, String>,
    pub authorization: Option<String>,
}

struct StubState {
    routes: HashMap<String, (StatusCode, String)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubBackend {
    pub base_url: String,
    state: Arc<StubState>,
}

impl StubBackend {
    pub async fn start(routes: Vec<(&str, StatusCode, serde_json::Value)>) -> Self {
        let state = Arc::new(StubState {
            routes: routes
                .into_iter()
                .map(|(path, status, body)| (path.to_string(), (status, body.to_string())))
                .collect(),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(respond)
            .with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend");
        });

        Self {
            base_url: format!("http://{addr}/"),
            state,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }
}

async fn respond(
    State(state): State<Arc<StubState>>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            path: uri.path().to_string(),
            params,
            authorization: headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        });

    match state.routes.get(uri.path()) {
        Some((status, body)) => (*status, body.clone()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

/// Config pointing at `base_url` with no endpoints except the registration default.
pub fn test_config(base_url: Option<&str>) -> AppConfig {
    let mut config = AppConfig::from_lookup(|key| match key {
        "DOCTOR_ID" => Some(TEST_DOCTOR.to_string()),
        "API_BASE_URL" => base_url.map(str::to_string),
        _ => None,
    })
    .expect("test config");
    config.request_timeout = Duration::from_secs(5);
    config
}

pub fn test_doctor() -> Uuid {
    Uuid::parse_str(TEST_DOCTOR).expect("doctor id")
}

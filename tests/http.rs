use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const DOCTOR_ID: &str = "00163c3a-06c9-1edf-88aa-376034cb9e31";

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

// The backend stub outlives any single test runtime, so it gets its own thread.
static BACKEND: Lazy<String> = Lazy::new(spawn_backend);

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn appointments(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    let filter = params.get("$filter").cloned().unwrap_or_default();
    if !filter.contains(&format!("DoctorID eq guid'{DOCTOR_ID}'")) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": filter })));
    }
    (
        StatusCode::OK,
        Json(json!({ "d": { "results": [
            { "AppointmentDate": "20240513", "BookingStatus": "A" },
            { "AppointmentDate": "20240513", "BookingStatus": "C" },
            { "AppointmentDate": "/Date(1715644800000)/", "BookingStatus": "D" }
        ] } })),
    )
}

async fn bills() -> (StatusCode, Json<Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": { "message": "maintenance" } })),
    )
}

fn spawn_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind backend port");
    listener.set_nonblocking(true).expect("nonblocking backend");
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("backend runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("backend listener");
            let app = Router::new()
                .route("/odata/Appointments", get(appointments))
                .route("/odata/Bills", get(bills));
            axum::serve(listener, app).await.expect("backend stub");
        });
    });

    format!("http://{addr}/")
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_practice_analytics"))
        .env("PORT", port.to_string())
        .env("DOCTOR_ID", DOCTOR_ID)
        .env("API_BASE_URL", BACKEND.as_str())
        .env("APPOINTMENTS_ENDPOINT", "odata/Appointments")
        .env("OPD_BILLING_ENDPOINT", "odata/Bills")
        .env_remove("RX_ENDPOINT")
        .env("API_TIMEOUT_SECS", "5")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_json(path: &str) -> (StatusCode, Value) {
    let server = shared_server().await;
    let response = Client::new()
        .get(format!("{}{path}", server.base_url))
        .send()
        .await
        .unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn http_index_serves_dashboard_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;

    let body = Client::new()
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Practice Analytics"));
    assert!(!body.contains("{{TODAY}}"));
}

#[tokio::test]
async fn http_appointment_section_aggregates_backend_rows() {
    let _guard = TEST_LOCK.lock().await;
    let (status, body) = get_json("/api/sections/appointment?range=30days").await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["section"], "appointment");
    assert_eq!(body["data"]["kind"], "appointments");
    assert_eq!(
        body["data"]["days"],
        json!([
            { "date": "13 May", "approved": 1, "cancelled": 1, "completed": 0, "total": 2 },
            { "date": "14 May", "approved": 0, "cancelled": 0, "completed": 1, "total": 1 }
        ])
    );
    assert!(body["range"]["start"].is_string());
}

#[tokio::test]
async fn http_backend_failure_is_bad_gateway_with_upstream_status() {
    let _guard = TEST_LOCK.lock().await;
    let (status, body) = get_json("/api/sections/opd-billing").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["upstreamStatus"], 503);
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn http_unconfigured_source_is_internal_error() {
    let _guard = TEST_LOCK.lock().await;
    let (status, body) = get_json("/api/sections/rx").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["upstreamStatus"].is_null());
}

#[tokio::test]
async fn http_rejects_unknown_section_and_bad_range() {
    let _guard = TEST_LOCK.lock().await;

    let (status, _) = get_json("/api/sections/payroll").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_json("/api/sections/appointment?range=fortnight").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("fortnight"));
}

#[tokio::test]
async fn http_lists_sections_by_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let (status, body) = get_json("/api/sections").await;

    assert_eq!(status, StatusCode::OK);
    let sections = body.as_array().unwrap();
    assert_eq!(sections.len(), 9);
    assert_eq!(sections[0], json!({ "id": "consultations", "dashboard": "analytics" }));
    assert_eq!(sections[8], json!({ "id": "ipd-registration", "dashboard": "clinics" }));
}

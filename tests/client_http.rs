//
// client_http.rs
// Orthanc-Client-rs
//
// Drives the reqwest-backed client against a canned Axum server: routing, auth, status mapping, and body handling.
//
// Thales Matheus Mendonça Santos - August 2026

use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};

use orthanc_client::{AnonymizeRequest, ApiClient, EntityKind, Error, OrthancClient};

#[derive(Clone, Default)]
struct AppState {
    labels: Arc<Mutex<Vec<String>>>,
    protected: Arc<Mutex<bool>>,
    anonymize_body: Arc<Mutex<Option<Value>>>,
    authorization: Arc<Mutex<Option<String>>>,
}

async fn patient_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> axum::response::Response {
    *state.authorization.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if id == "p1" {
        Json(json!({
            "ID": "p1",
            "MainDicomTags": {"PatientID": "PAT-001"},
            "Studies": [],
        }))
        .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn broken_study_handler() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance window")
}

async fn put_label_handler(
    State(state): State<AppState>,
    Path((_id, label)): Path<(String, String)>,
) -> StatusCode {
    state.labels.lock().unwrap().push(label);
    StatusCode::OK
}

async fn delete_label_handler(
    State(state): State<AppState>,
    Path((_id, label)): Path<(String, String)>,
) -> StatusCode {
    state.labels.lock().unwrap().retain(|kept| *kept != label);
    StatusCode::OK
}

async fn anonymize_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    *state.anonymize_body.lock().unwrap() = Some(body);
    Json(json!({"ID": format!("anon-{id}")}))
}

async fn get_protected_handler(State(state): State<AppState>) -> String {
    if *state.protected.lock().unwrap() {
        "1".to_string()
    } else {
        "0".to_string()
    }
}

async fn put_protected_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> StatusCode {
    *state.protected.lock().unwrap() = body == json!(1);
    StatusCode::OK
}

async fn archive_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/zip")],
        b"PK canned archive".to_vec(),
    )
}

fn canned_router(state: AppState) -> Router {
    Router::new()
        .route("/patients/:id", get(patient_handler))
        .route(
            "/patients/:id/labels/:label",
            put(put_label_handler).delete(delete_label_handler),
        )
        .route("/patients/:id/anonymize", post(anonymize_handler))
        .route(
            "/patients/:id/protected",
            get(get_protected_handler).put(put_protected_handler),
        )
        .route("/patients/:id/archive", get(archive_handler))
        .route("/studies/:id", get(broken_study_handler))
        .with_state(state)
}

/// Boots the canned server on an ephemeral port and returns its base URL. The
/// runtime must stay alive for the duration of the test.
fn spawn_server(state: AppState) -> (String, tokio::runtime::Runtime) {
    let _ = tracing_subscriber::fmt().try_init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("runtime");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test port");
    let address = listener.local_addr().expect("local addr");
    listener.set_nonblocking(true).expect("nonblocking");

    let app = canned_router(state);
    runtime.spawn(async move {
        let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
        axum::serve(listener, app).await.expect("serve");
    });

    (format!("http://{address}"), runtime)
}

#[test]
fn entity_documents_decode_and_credentials_are_sent() {
    let state = AppState::default();
    let (base_url, _runtime) = spawn_server(state.clone());
    let client = OrthancClient::new(&base_url).with_credentials("orthanc", "secret");

    let document = client
        .get_entity(EntityKind::Patient, "p1")
        .expect("document");
    assert_eq!(document["ID"], "p1");

    let authorization = state
        .authorization
        .lock()
        .unwrap()
        .clone()
        .expect("auth header");
    assert!(authorization.starts_with("Basic "));
}

#[test]
fn missing_entities_map_to_not_found() {
    let (base_url, _runtime) = spawn_server(AppState::default());
    let client = OrthancClient::new(&base_url);

    assert!(matches!(
        client.get_entity(EntityKind::Patient, "ghost"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn other_failures_carry_the_http_status() {
    let (base_url, _runtime) = spawn_server(AppState::default());
    let client = OrthancClient::new(&base_url);

    match client.get_entity(EntityKind::Study, "s1") {
        Err(Error::Http { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance window");
        }
        other => panic!("expected an HTTP error, got {other:?}"),
    }
}

#[test]
fn labels_are_put_and_deleted() {
    let state = AppState::default();
    let (base_url, _runtime) = spawn_server(state.clone());
    let client = OrthancClient::new(&base_url);

    client
        .put_label(EntityKind::Patient, "p1", "research")
        .expect("put label");
    assert_eq!(state.labels.lock().unwrap().clone(), vec!["research"]);

    client
        .delete_label(EntityKind::Patient, "p1", "research")
        .expect("delete label");
    assert!(state.labels.lock().unwrap().is_empty());
}

#[test]
fn anonymize_sends_the_documented_body() {
    let state = AppState::default();
    let (base_url, _runtime) = spawn_server(state.clone());
    let client = OrthancClient::new(&base_url);

    let request = AnonymizeRequest {
        remove: vec!["StudyDate".to_string()],
        ..Default::default()
    };
    let answer = client
        .post_anonymize(EntityKind::Patient, "p1", &request)
        .expect("anonymize");
    assert_eq!(answer["ID"], "anon-p1");

    let body = state
        .anonymize_body
        .lock()
        .unwrap()
        .clone()
        .expect("captured body");
    assert_eq!(body["Remove"][0], "StudyDate");
    assert_eq!(body["KeepSource"], true);
    assert!(body.get("DicomVersion").is_none());
}

#[test]
fn protected_round_trips_over_http() {
    let state = AppState::default();
    let (base_url, _runtime) = spawn_server(state.clone());
    let client = OrthancClient::new(&base_url);

    assert_eq!(client.get_protected("p1").unwrap(), "0");
    client.set_protected("p1", true).expect("protect");
    assert_eq!(client.get_protected("p1").unwrap(), "1");
}

#[test]
fn archives_come_back_as_raw_bytes() {
    let (base_url, _runtime) = spawn_server(AppState::default());
    let client = OrthancClient::new(&base_url);

    let bytes = client
        .get_archive(EntityKind::Patient, "p1")
        .expect("archive");
    assert_eq!(bytes, b"PK canned archive");
}

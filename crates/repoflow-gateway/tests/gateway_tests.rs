//! Gateway behaviour: signature checks, routing, aggregation, auth
//!
//! Stub workers are real axum listeners on ephemeral ports, so dispatch
//! and dashboard aggregation go over actual HTTP.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use repoflow_config::AppConfig;
use repoflow_gateway::{routes, AppState, WorkerEndpoints};
use repoflow_github::sign;
use serde_json::{json, Value};

const SECRET: &str = "s3cret";

#[derive(Clone, Default)]
struct StubWorker {
    deliveries: Arc<Mutex<Vec<String>>>,
}

fn stub_router(stub: StubWorker) -> Router {
    Router::new()
        .route(
            "/webhook",
            post(|State(stub): State<StubWorker>, body: String| async move {
                stub.deliveries.lock().unwrap().push(body);
                (axum::http::StatusCode::ACCEPTED, Json(json!({"status": "accepted"})))
            }),
        )
        .route(
            "/api/stats",
            get(|| async {
                Json(json!({"queued": 1, "processing": 0, "completed": 2, "failed": 0, "total": 3}))
            }),
        )
        .with_state(stub)
}

async fn spawn_app(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

struct Gateway {
    url: String,
    review: StubWorker,
    copier: StubWorker,
    scorer: StubWorker,
}

async fn spawn_gateway(auth: Option<(String, String)>, scorer_down: bool) -> Gateway {
    let review = StubWorker::default();
    let copier = StubWorker::default();
    let scorer = StubWorker::default();

    let review_url = spawn_app(stub_router(review.clone())).await;
    let copier_url = spawn_app(stub_router(copier.clone())).await;
    let scorer_url = if scorer_down {
        // nothing listens here
        "http://127.0.0.1:1".to_string()
    } else {
        spawn_app(stub_router(scorer.clone())).await
    };

    let mut config = AppConfig::default();
    config.issue_copy.source_repo = "acme/src".to_string();
    config
        .issue_copy
        .label_to_repo
        .insert("OS3".to_string(), "acme/os3".to_string());
    config.issue_scoring.target_repos = vec!["acme/scored".to_string()];

    let state = AppState::new(
        SECRET.to_string(),
        auth,
        WorkerEndpoints {
            review: review_url,
            copier: copier_url,
            scorer: scorer_url,
        },
        config,
    );
    let url = spawn_app(routes::router(state)).await;
    Gateway { url, review, copier, scorer }
}

fn signed_headers(body: &str) -> Vec<(&'static str, String)> {
    vec![
        ("x-hub-signature-256", sign(SECRET, body.as_bytes())),
        ("x-github-delivery", "delivery-1".to_string()),
    ]
}

async fn post_webhook(
    gateway: &Gateway,
    event: &str,
    body: &str,
    signature: Option<String>,
) -> reqwest::Response {
    let client = reqwest::Client::new();
    let mut request = client
        .post(format!("{}/webhook", gateway.url))
        .header("x-github-event", event)
        .header("content-type", "application/json")
        .body(body.to_string());
    for (name, value) in signed_headers(body) {
        if name == "x-hub-signature-256" {
            continue;
        }
        request = request.header(name, value);
    }
    if let Some(signature) = signature {
        request = request.header("x-hub-signature-256", signature);
    }
    request.send().await.unwrap()
}

#[tokio::test]
async fn invalid_signature_is_rejected_and_not_forwarded() {
    let gateway = spawn_gateway(None, false).await;
    let body = r#"{"action":"opened","repository":{"full_name":"acme/foo"}}"#;
    let response = post_webhook(
        &gateway,
        "pull_request",
        body,
        Some("sha256=0000000000000000000000000000000000000000000000000000000000000000".to_string()),
    )
    .await;
    assert_eq!(response.status(), 401);
    assert!(gateway.review.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_signature_header_is_rejected() {
    let gateway = spawn_gateway(None, false).await;
    let body = r#"{"action":"opened","repository":{"full_name":"acme/foo"}}"#;
    let response = post_webhook(&gateway, "pull_request", body, None).await;
    assert_eq!(response.status(), 401);
    assert!(gateway.review.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn ping_answers_directly() {
    let gateway = spawn_gateway(None, false).await;
    let body = r#"{"zen":"Design for failure."}"#;
    let response = post_webhook(&gateway, "ping", body, Some(sign(SECRET, body.as_bytes()))).await;
    assert_eq!(response.status(), 200);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["status"], "success");
    assert_eq!(payload["event"], "ping");
}

#[tokio::test]
async fn pull_request_goes_to_the_review_worker() {
    let gateway = spawn_gateway(None, false).await;
    let body = r#"{"action":"opened","repository":{"full_name":"acme/foo"}}"#;
    let response =
        post_webhook(&gateway, "pull_request", body, Some(sign(SECRET, body.as_bytes()))).await;
    assert_eq!(response.status(), 202);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["dispatched"], json!(["pr_reviewer"]));
    assert_eq!(gateway.review.deliveries.lock().unwrap().len(), 1);
    assert!(gateway.copier.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn issues_on_source_repo_go_to_the_copier() {
    let gateway = spawn_gateway(None, false).await;
    let body = r#"{"action":"labeled","repository":{"full_name":"acme/src"}}"#;
    let response = post_webhook(&gateway, "issues", body, Some(sign(SECRET, body.as_bytes()))).await;
    assert_eq!(response.status(), 202);
    assert_eq!(gateway.copier.deliveries.lock().unwrap().len(), 1);
    assert!(gateway.review.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn issues_on_scored_repo_go_to_the_scorer() {
    let gateway = spawn_gateway(None, false).await;
    let body = r#"{"action":"opened","repository":{"full_name":"acme/scored"}}"#;
    let response = post_webhook(&gateway, "issues", body, Some(sign(SECRET, body.as_bytes()))).await;
    assert_eq!(response.status(), 202);
    assert_eq!(gateway.scorer.deliveries.lock().unwrap().len(), 1);
    assert!(gateway.copier.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unrelated_events_are_ignored() {
    let gateway = spawn_gateway(None, false).await;
    let body = r#"{"repository":{"full_name":"acme/elsewhere"}}"#;
    let response =
        post_webhook(&gateway, "workflow_run", body, Some(sign(SECRET, body.as_bytes()))).await;
    assert_eq!(response.status(), 200);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["status"], "ignored");
    assert!(gateway.review.deliveries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_worker_turns_into_5xx_for_redelivery() {
    let gateway = spawn_gateway(None, true).await;
    let body = r#"{"action":"opened","repository":{"full_name":"acme/scored"}}"#;
    let response = post_webhook(&gateway, "issues", body, Some(sign(SECRET, body.as_bytes()))).await;
    assert_eq!(response.status(), 502);
}

#[tokio::test]
async fn dashboard_reports_partial_data_when_a_worker_is_down() {
    let gateway = spawn_gateway(None, true).await;
    let response = reqwest::get(format!("{}/api/dashboard", gateway.url)).await.unwrap();
    assert_eq!(response.status(), 200);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["pr_reviewer"]["reachable"], json!(true));
    assert_eq!(payload["pr_reviewer"]["stats"]["total"], json!(3));
    assert_eq!(payload["issue_scorer"]["reachable"], json!(false));
}

#[tokio::test]
async fn auth_guards_everything_but_health_and_webhook() {
    let gateway =
        spawn_gateway(Some(("admin".to_string(), "hunter2".to_string())), false).await;
    let client = reqwest::Client::new();

    // dashboard requires credentials
    let denied = client
        .get(format!("{}/api/dashboard", gateway.url))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 401);

    let allowed = client
        .get(format!("{}/api/dashboard", gateway.url))
        .basic_auth("admin", Some("hunter2"))
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), 200);

    // health stays open and reports auth on
    let health = client.get(format!("{}/health", gateway.url)).send().await.unwrap();
    assert_eq!(health.status(), 200);
    let payload: Value = health.json().await.unwrap();
    assert_eq!(payload["auth_enabled"], json!(true));

    // webhook stays open (signature is its own gate)
    let body = r#"{"zen":"ok"}"#;
    let ping = post_webhook(&gateway, "ping", body, Some(sign(SECRET, body.as_bytes()))).await;
    assert_eq!(ping.status(), 200);
}

#[tokio::test]
async fn auth_disabled_mode_is_open_and_visible() {
    let gateway = spawn_gateway(None, false).await;
    let response = reqwest::get(format!("{}/api/dashboard", gateway.url)).await.unwrap();
    assert_eq!(response.status(), 200);
    let health: Value = reqwest::get(format!("{}/health", gateway.url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["auth_enabled"], json!(false));
}

#[tokio::test]
async fn ui_paths_proxy_to_the_workers() {
    let gateway = spawn_gateway(None, false).await;
    let response = reqwest::get(format!("{}/pr-tasks/api/stats", gateway.url)).await.unwrap();
    assert_eq!(response.status(), 200);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["total"], json!(3));
}

//! In-process fake storefront backend for integration tests

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PASSWORD: &str = "secret";
pub const GOOD_REFRESH: &str = "good-refresh";

pub fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

pub fn make_token(id: i64, name: &str, exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = json!({ "id": id, "name": name, "iat": now_secs(), "exp": exp });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

pub fn fresh_token(name: &str) -> String {
    make_token(1, name, now_secs() + 3_600)
}

pub fn expired_token(name: &str) -> String {
    make_token(1, name, now_secs() - 60)
}

pub struct Backend {
    /// Product requests left to fail with 500
    pub product_failures: AtomicUsize,
    pub product_hits: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub logout_status: AtomicU16,
    pub logouts: Mutex<Vec<String>>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            product_failures: AtomicUsize::new(0),
            product_hits: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            logout_status: AtomicU16::new(204),
            logouts: Mutex::new(Vec::new()),
        }
    }
}

impl Backend {
    pub fn logouts(&self) -> Vec<String> {
        self.logouts.lock().unwrap().clone()
    }

    /// Wait for the detached logout notification to land
    pub async fn wait_for_logouts(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            let seen = self.logouts();
            if seen.len() >= count {
                return seen;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.logouts()
    }
}

pub fn catalog() -> Value {
    json!([
        {
            "id": 1,
            "name": "T-Shirt Classic",
            "price": 20,
            "description": "A comfortable cotton t-shirt.",
            "imageUrl": "https://placehold.co/600x400?text=T-Shirt"
        },
        {
            "id": 2,
            "name": "Modern Jeans",
            "price": 55,
            "description": "High quality denim with a slim cut.",
            "imageUrl": "https://placehold.co/600x400?text=Jeans"
        }
    ])
}

fn take_failure(backend: &Backend) -> bool {
    backend
        .product_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

async fn list_products(State(backend): State<Arc<Backend>>) -> Response {
    backend.product_hits.fetch_add(1, Ordering::SeqCst);
    if take_failure(&backend) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(catalog()).into_response()
}

async fn product(State(backend): State<Arc<Backend>>, Path(id): Path<u64>) -> Response {
    backend.product_hits.fetch_add(1, Ordering::SeqCst);
    if take_failure(&backend) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let found = catalog()
        .as_array()
        .and_then(|items| items.iter().find(|p| p["id"] == json!(id)).cloned());
    match found {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))).into_response(),
    }
}

fn token_pair(name: &str) -> Value {
    json!({ "accessToken": fresh_token(name), "refreshToken": GOOD_REFRESH })
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if email == "broken@shop.test" {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response();
    }
    Json(token_pair("admin")).into_response()
}

async fn signup(Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or("anonymous");
    (StatusCode::CREATED, Json(token_pair(name))).into_response()
}

async fn refresh(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    // Long enough for concurrent callers to overlap
    tokio::time::sleep(Duration::from_millis(50)).await;
    if body["refreshToken"] != GOOD_REFRESH {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid refresh token" })),
        )
            .into_response();
    }
    Json(json!({ "accessToken": fresh_token("refreshed") })).into_response()
}

async fn logout(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    let token = body["refreshToken"].as_str().unwrap_or_default().to_string();
    backend.logouts.lock().unwrap().push(token);
    let status = StatusCode::from_u16(backend.logout_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::NO_CONTENT);
    status.into_response()
}

/// Serve the fake backend on an ephemeral port and return its base URL
pub async fn spawn(backend: Arc<Backend>) -> String {
    let app = Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(product))
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/refresh-token", post(refresh))
        .route("/auth/logout", post(logout))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use warden::app::{build_router, build_state};
use warden::config::{AppConfig, PolicyBackend};

pub type App = axum::routing::RouterIntoService<Body, ()>;

pub async fn memory_app() -> App {
    let config = AppConfig {
        model_path: None,
        backend: PolicyBackend::Memory,
        ..AppConfig::default()
    };
    let state = build_state(&config).await.expect("state");
    build_router(state).into_service()
}

pub fn request(method: &str, uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("user", user);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn json_request(
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("user", user);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

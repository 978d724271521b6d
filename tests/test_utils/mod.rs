//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body};

use streamchat::api::AppState;
use streamchat::api::app;
use streamchat::core::{AppConfig, DEFAULT_BODY_LIMIT};

pub fn test_config(chunk_delay: Duration) -> AppConfig {
    AppConfig {
        host: String::from("127.0.0.1"),
        port: 0,
        chunk_delay,
        body_limit: DEFAULT_BODY_LIMIT,
        api_url: String::from("http://127.0.0.1:0"),
    }
}

/// Creates a test application router that streams without delay
pub fn test_app() -> Router {
    app_with_config(test_config(Duration::ZERO))
}

pub fn app_with_config(config: AppConfig) -> Router {
    app(Arc::new(AppState::new(config)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

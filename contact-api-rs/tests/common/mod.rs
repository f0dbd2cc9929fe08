#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{self, header, StatusCode},
    Router,
};
use contact_api::rate_limit::{RateLimitConfig, RateLimitStore, RateLimiter};
use contact_api::repository::InMemoryContactRepository;
use contact_api::ContactApi;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<RateLimitStore>,
}

pub fn app_with(config: RateLimitConfig) -> TestApp {
    let store = Arc::new(RateLimitStore::new());
    let limiter = Arc::new(RateLimiter::new(config, Arc::clone(&store)));
    let api = Arc::new(ContactApi::new(
        Arc::new(InMemoryContactRepository::new()),
        limiter,
    ));

    TestApp {
        router: api.create_router(),
        store,
    }
}

pub fn app() -> TestApp {
    app_with(RateLimitConfig::api())
}

pub fn get(uri: &str) -> http::Request<Body> {
    http::Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> http::Request<Body> {
    http::Request::builder()
        .method(http::Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> http::Request<Body> {
    post_raw(uri, body.to_string())
}

pub fn post_raw(uri: &str, body: impl Into<String>) -> http::Request<Body> {
    http::Request::builder()
        .method(http::Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

/// Attach the peer address axum would record when serving with connect info
pub fn from_ip(mut req: http::Request<Body>, ip: [u8; 4]) -> http::Request<Body> {
    req.extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 51000))));
    req
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub body: Value,
}

pub async fn send(router: &Router, req: http::Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

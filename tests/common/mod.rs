// Common test utilities and helper structs
// Shared across all test files to avoid duplication

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, Response, StatusCode},
    Router,
};
use blog_api::{app::AppState, build_router, db::Storage, AppConfig};
use serde::Serialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tower::util::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn request(&self, method: Method, uri: &str) -> TestRequest {
        TestRequest::new(self, method, uri)
    }

    pub fn get(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, Method::GET, uri)
    }

    pub fn head(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, Method::HEAD, uri)
    }

    pub fn post(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, Method::POST, uri)
    }

    pub fn put(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, Method::PUT, uri)
    }

    pub fn patch(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, Method::PATCH, uri)
    }

    pub fn delete(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, Method::DELETE, uri)
    }

    /// Register a user and return its access token
    pub async fn register(&self, email: &str) -> String {
        let response = self
            .post("/api/register")
            .json(&json!({
                "name": "Test User",
                "email": email,
                "password": TEST_PASSWORD,
                "password_confirmation": TEST_PASSWORD,
            }))
            .send()
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = response.json().await;
        body["data"]["access_token"]
            .as_str()
            .expect("register should return an access token")
            .to_string()
    }

    /// Create a product for the token's user and return its id
    pub async fn create_product(&self, token: &str, name: &str, price: i64) -> i64 {
        let response = self
            .post("/api/products")
            .bearer(token)
            .json(&json!({ "name": name, "price": price }))
            .send()
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = response.json().await;
        body["data"]["id"].as_i64().expect("product id")
    }
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: Method,
    uri: String,
    headers: Vec<(header::HeaderName, String)>,
    body: Body,
    client_addr: SocketAddr,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: Method, uri: &str) -> Self {
        Self {
            app,
            method,
            uri: uri.to_string(),
            headers: Vec::new(),
            body: Body::empty(),
            client_addr: SocketAddr::from(([127, 0, 0, 1], 12345)),
        }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.headers
            .push((header::CONTENT_TYPE, "application/json".to_string()));
        self.body = Body::from(serde_json::to_vec(body).unwrap());
        self
    }

    /// Send a raw body labelled as JSON
    pub fn raw_json(mut self, body: &'static str) -> Self {
        self.headers
            .push((header::CONTENT_TYPE, "application/json".to_string()));
        self.body = Body::from(body);
        self
    }

    pub fn header(mut self, name: header::HeaderName, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header(header::AUTHORIZATION, &format!("Bearer {}", token))
    }

    /// Set the client address seen through ConnectInfo (useful for throttle tests)
    pub fn with_ip(mut self, ip: &str) -> Self {
        self.client_addr = format!("{}:12345", ip).parse().unwrap();
        self
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        let mut request = builder.body(self.body).unwrap();

        // Simulate a client connection
        request
            .extensions_mut()
            .insert(ConnectInfo(self.client_addr));

        let response = self.app.app.clone().oneshot(request).await.unwrap();

        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    pub fn header(&self, name: header::HeaderName) -> Option<String> {
        self.response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    pub async fn text(self) -> String {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }
}

/// Test application over in-memory storage with the throttle disabled
pub fn setup_test_app() -> TestApp {
    setup_test_app_with(AppConfig::for_test())
}

pub fn setup_test_app_with(config: AppConfig) -> TestApp {
    let state = AppState::new(config, Storage::in_memory()).unwrap();
    let app = build_router(state.clone());
    TestApp { app, state }
}

// Register, login and get-user through the HTTP surface

mod common;

use axum::http::{header, StatusCode};
use common::{setup_test_app, TEST_PASSWORD};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

#[tokio::test]
async fn test_register_issues_bearer_token() {
    let app = setup_test_app();

    let response = app
        .post("/api/register")
        .json(&json!({
            "name": "Ann Example",
            "email": "Ann@Example.com",
            "password": TEST_PASSWORD,
        }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 3600);
    assert_eq!(
        body["data"]["access_token"]
            .as_str()
            .unwrap()
            .split('.')
            .count(),
        3
    );
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = setup_test_app();

    let response = app
        .post("/api/register")
        .json(&json!({
            "name": "",
            "email": "not-an-email",
            "password": "short",
            "password_confirmation": "different",
        }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let fields = &body["error"]["fields"];
    assert!(fields["name"].is_array());
    assert!(fields["email"].is_array());
    assert!(fields["password"].is_array());
    assert!(fields["password_confirmation"].is_array());
}

#[tokio::test]
async fn test_register_rejects_taken_email() {
    let app = setup_test_app();
    app.register("ann@example.com").await;

    let response = app
        .post("/api/register")
        .json(&json!({
            "name": "Another Ann",
            "email": "ANN@example.com",
            "password": TEST_PASSWORD,
        }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await;
    assert_eq!(
        body["error"]["fields"]["email"][0],
        "The email has already been taken"
    );
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let app = setup_test_app();

    let response = app.post("/api/register").raw_json("{not json").send().await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await;
    assert!(body["error"]["fields"]["body"].is_array());
}

#[tokio::test]
async fn test_login_success_and_failures() {
    let app = setup_test_app();
    app.register("ann@example.com").await;

    let ok = app
        .post("/api/login")
        .json(&json!({ "email": "ann@example.com", "password": TEST_PASSWORD }))
        .send()
        .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = ok.json().await;
    assert!(body["data"]["access_token"].is_string());

    for credentials in [
        json!({ "email": "ann@example.com", "password": "wrong-password" }),
        json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
    ] {
        let response = app.post("/api/login").json(&credentials).send().await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json().await;
        assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    }
}

#[tokio::test]
async fn test_get_user_requires_bearer_token() {
    let app = setup_test_app();
    let token = app.register("ann@example.com").await;

    let missing = app.get("/api/get-user").send().await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    let body: Value = missing.json().await;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

    let wrong_scheme = app
        .get("/api/get-user")
        .header(header::AUTHORIZATION, &format!("Token {}", token))
        .send()
        .await;
    assert_eq!(wrong_scheme.status(), StatusCode::UNAUTHORIZED);

    let garbage = app.get("/api/get-user").bearer("abc.def.ghi").send().await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);

    let ok = app.get("/api/get-user").bearer(&token).send().await;
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = ok.json().await;
    assert_eq!(body["data"]["email"], "ann@example.com");
    assert_eq!(body["data"]["name"], "Test User");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = setup_test_app();
    let token = app.register("ann@example.com").await;
    let user: Value = app.get("/api/get-user").bearer(&token).send().await.json().await;

    let config = &app.state.config.jwt;
    let now = chrono::Utc::now().timestamp() as u64;
    let claims = json!({
        "sub": user["data"]["id"],
        "jti": "expired-token",
        "email": "ann@example.com",
        "scope": ["api"],
        "aud": config.audience,
        "iss": config.issuer,
        "iat": now - 7200,
        "exp": now - 3600,
    });
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap();

    let response = app.get("/api/get-user").bearer(&expired).send().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_another_secret_is_rejected() {
    let app = setup_test_app();
    let token = app.register("ann@example.com").await;
    let user: Value = app.get("/api/get-user").bearer(&token).send().await.json().await;

    let config = &app.state.config.jwt;
    let now = chrono::Utc::now().timestamp() as u64;
    let forged = encode(
        &Header::default(),
        &json!({
            "sub": user["data"]["id"],
            "jti": "forged",
            "email": "ann@example.com",
            "scope": ["api"],
            "aud": config.audience,
            "iss": config.issuer,
            "iat": now,
            "exp": now + 600,
        }),
        &EncodingKey::from_secret(b"some-other-secret-that-is-32-chars-long"),
    )
    .unwrap();

    let response = app.get("/api/get-user").bearer(&forged).send().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// Route table behaviour observed through the generated router

mod common;

use axum::http::{Method, StatusCode};
use common::{setup_test_app, TEST_PASSWORD};
use serde_json::{json, Value};

#[tokio::test]
async fn test_register_is_public() {
    let app = setup_test_app();

    let response = app
        .post("/api/register")
        .json(&json!({
            "name": "Public Route",
            "email": "public@example.com",
            "password": TEST_PASSWORD,
        }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_login_is_public() {
    let app = setup_test_app();

    // Reaches the handler: a credential check failure, not a gate rejection
    let response = app
        .post("/api/login")
        .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_gated_routes_reject_missing_credentials() {
    let app = setup_test_app();

    let requests = vec![
        app.get("/api/get-user"),
        app.get("/api/products"),
        app.get("/api/products/create"),
        app.post("/api/products").json(&json!({ "name": "Desk", "price": 1 })),
        app.get("/api/products/1"),
        app.get("/api/products/1/edit"),
        app.put("/api/products/1").json(&json!({ "price": 2 })),
        app.patch("/api/products/1").json(&json!({ "price": 2 })),
        app.delete("/api/products/1"),
        // The gate runs before the handler could reject the id
        app.delete("/api/products/not-a-number"),
    ];

    for request in requests {
        let response = request.send().await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json().await;
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    }
}

#[tokio::test]
async fn test_valid_token_reaches_list_handler() {
    let app = setup_test_app();
    let token = app.register("ann@example.com").await;

    let response = app.get("/api/products").bearer(&token).send().await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_delete_reaches_destroy_handler_with_id() {
    let app = setup_test_app();
    let token = app.register("ann@example.com").await;

    for n in 1..=42 {
        app.create_product(&token, &format!("Product {}", n), n).await;
    }

    let response = app.delete("/api/products/42").bearer(&token).send().await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["data"]["id"], 42);
}

#[tokio::test]
async fn test_unknown_paths_are_not_found() {
    let app = setup_test_app();

    for path in ["/unknown", "/api/unknown", "/api/products/1/extra", "/register"] {
        let response = app.get(path).send().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
        let body: Value = response.json().await;
        assert_eq!(body["error"]["code"], "ROUTE_NOT_FOUND");
    }
}

#[tokio::test]
async fn test_paths_are_case_sensitive() {
    let app = setup_test_app();
    let token = app.register("ann@example.com").await;

    let response = app.get("/api/Products").bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_routes_answer_head() {
    let app = setup_test_app();
    let token = app.register("ann@example.com").await;

    let response = app.head("/api/get-user").bearer(&token).send().await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_method_on_known_path() {
    let app = setup_test_app();

    let response = app.get("/api/login").send().await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_is_outside_the_table() {
    let app = setup_test_app();

    let response = app.get("/health").send().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_create_path_follows_table_for_update_and_destroy() {
    let app = setup_test_app();
    let token = app.register("ann@example.com").await;

    for method in [Method::PUT, Method::PATCH, Method::DELETE] {
        let resolved = app.state.routes.resolve(&method, "/api/products/create").unwrap();
        assert!(resolved.route.requires_auth());

        // Gated like every product route
        let anonymous = app
            .request(method.clone(), "/api/products/create")
            .json(&json!({ "price": 1 }))
            .send()
            .await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED, "{}", method);

        // "create" is not a product id
        let response = app
            .request(method.clone(), "/api/products/create")
            .bearer(&token)
            .json(&json!({ "price": 1 }))
            .send()
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", method);
        let body: Value = response.json().await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_served_routes_agree_with_table() {
    let app = setup_test_app();
    let token = app.register("ann@example.com").await;
    let id = app.create_product(&token, "Desk", 100).await;
    let show = format!("/api/products/{}", id);
    let edit = format!("/api/products/{}/edit", id);

    let cases = [
        (Method::GET, "/api/products"),
        (Method::GET, "/api/products/create"),
        (Method::GET, show.as_str()),
        (Method::GET, edit.as_str()),
        (Method::PATCH, show.as_str()),
        (Method::POST, "/api/products/create"),
        (Method::POST, show.as_str()),
        (Method::DELETE, "/api/products"),
    ];

    for (method, path) in cases {
        let resolved = app.state.routes.resolve(&method, path);
        let response = app
            .request(method.clone(), path)
            .bearer(&token)
            .json(&json!({ "price": 150 }))
            .send()
            .await;

        match resolved {
            Ok(_) => assert_ne!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "{} {}",
                method,
                path
            ),
            Err(_) => assert_eq!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "{} {}",
                method,
                path
            ),
        }
    }
}

use crate::utils::spawn_app;
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

#[rstest]
#[case("/")]
#[case("/nope")]
#[case("/api/nope")]
#[case("/api/contact/extra")]
#[tokio::test]
async fn unknown_routes_return_a_json_404(#[case] route: &str) {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.get(route).await;

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "message": "Route not found" }));
}

#[rstest]
#[case(reqwest::Method::GET, "/api/contact")]
#[case(reqwest::Method::PUT, "/api/contact")]
#[case(reqwest::Method::POST, "/api/health")]
#[case(reqwest::Method::DELETE, "/api/info")]
#[case(reqwest::Method::POST, "/metrics")]
#[tokio::test]
async fn unsupported_methods_return_a_json_404(
    #[case] method: reqwest::Method,
    #[case] route: &str,
) {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .api_client()
        .request(method, format!("{}{route}", app.address()))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "success": false, "message": "Route not found" }));
}

#[tokio::test]
async fn responses_carry_security_headers_and_a_request_id() {
    let app = spawn_app().await;

    let response = app.health_check().await;

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "SAMEORIGIN");
    assert_eq!(headers["referrer-policy"], "no-referrer");
    assert!(headers.contains_key("strict-transport-security"));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn the_portfolio_origin_may_call_the_api() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .api_client()
        .request(reqwest::Method::OPTIONS, format!("{}/api/contact", app.address()))
        .header("Origin", "http://localhost:8000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:8000"
    );
    assert_eq!(
        response.headers()["access-control-allow-credentials"],
        "true"
    );
}

#[tokio::test]
async fn other_origins_are_not_allowed() {
    let app = spawn_app().await;

    let response = app
        .api_client()
        .get(format!("{}/api/health", app.address()))
        .header("Origin", "https://evil.example")
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(!response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[rstest]
#[case("/api/docs/openapi.json", "application/json")]
#[case("/api/docs/openapi.yaml", "application/yaml")]
#[tokio::test]
async fn openapi_docs_are_served(#[case] route: &str, #[case] content_type: &str) {
    let app = spawn_app().await;

    let response = app.get(route).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], content_type);
    assert!(response.text().await.unwrap().contains("/api/contact"));
}

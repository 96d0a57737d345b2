use crate::utils::spawn_app;
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

#[tokio::test]
async fn health_check_works() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.health_check().await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Body is not JSON");
    assert_eq!(body, json!({ "status": "OK", "message": "Server is running" }));
}

#[tokio::test]
async fn health_check_is_not_rate_limited() {
    let app = spawn_app().await;

    for _ in 0..10 {
        assert_eq!(app.health_check().await.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn build_info_reports_the_crate_version() {
    let app = spawn_app().await;

    let body: Value = app.get("/api/info").await.json().await.unwrap();

    assert_eq!(body["name"], "portfolio-contact");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

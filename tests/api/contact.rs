use crate::utils::{spawn_app, valid_submission, OWNER_EMAIL};
use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use wiremock::{
    matchers::{any, method, path},
    Mock, ResponseTemplate,
};

#[tokio::test]
async fn contact_returns_a_200_for_a_valid_submission() {
    // Arrange
    let app = spawn_app().await;
    app.mock_send_email_endpoint_to_ok(2).await;

    // Act
    let response = app.post_contact(&valid_submission()).await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "success": true, "message": "Message sent successfully!" })
    );
}

#[tokio::test]
async fn contact_notifies_the_owner_before_acknowledging_the_sender() {
    // Arrange
    let app = spawn_app().await;
    app.mock_send_email_endpoint_to_ok(2).await;

    // Act
    app.post_contact(&valid_submission()).await;

    // Assert
    let emails = app.sent_emails().await;
    assert_eq!(emails.len(), 2);

    assert_eq!(emails[0]["To"], OWNER_EMAIL);
    assert_eq!(emails[0]["ReplyTo"], "ursula@example.com");
    assert_eq!(
        emails[0]["Subject"],
        "New Portfolio Contact from Ursula Le Guin"
    );

    assert_eq!(emails[1]["To"], "ursula@example.com");
    assert_eq!(emails[1]["Subject"], "Thank you for contacting me!");
    assert_eq!(emails[1]["From"], OWNER_EMAIL);
}

#[tokio::test]
async fn contact_accepts_url_encoded_forms() {
    let app = spawn_app().await;
    app.mock_send_email_endpoint_to_ok(2).await;

    let body = "name=le%20guin&email=ursula_le_guin%40example.com\
                &message=Hello%20there%2C%20nice%20portfolio";
    let response = app
        .post_contact_raw("application/x-www-form-urlencoded", body.into())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn contact_reports_every_invalid_field_at_once() {
    // Arrange
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        // No email should go out for an invalid submission.
        .expect(0)
        .mount(app.email_server())
        .await;

    // Act
    let response = app
        .post_contact(&json!({ "name": "", "email": "bad", "message": "hi" }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": false,
            "errors": [
                { "field": "name", "message": "Name is required" },
                { "field": "email", "message": "Please provide a valid email" },
                {
                    "field": "message",
                    "message": "Message must be between 10 and 1000 characters"
                },
            ]
        })
    );
}

#[rstest]
#[case(json!({ "email": "ursula@example.com", "message": "Hello there, nice work" }), "name")]
#[case(json!({ "name": "U", "email": "ursula@example.com", "message": "Hello there, nice work" }), "name")]
#[case(json!({ "name": "Ursula", "message": "Hello there, nice work" }), "email")]
#[case(json!({ "name": "Ursula", "email": "ursula@", "message": "Hello there, nice work" }), "email")]
#[case(json!({ "name": "Ursula", "email": "ursula@example.com", "message": null }), "message")]
#[case(json!({ "name": "Ursula", "email": "ursula@example.com", "message": "x".repeat(1001) }), "message")]
#[tokio::test]
async fn contact_returns_a_400_for_an_invalid_field(#[case] body: Value, #[case] field: &str) {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app.post_contact(&body).await;

    // Assert
    assert_eq!(
        response.status(),
        StatusCode::BAD_REQUEST,
        "The API did not fail with 400 Bad Request when the payload was {body}."
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"][0]["field"], field);
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(1));
}

#[rstest]
#[case("application/json", "{ not json")]
#[case("application/json", r#"{ "name": 42 }"#)]
#[case("text/plain", "name=Ursula")]
#[tokio::test]
async fn contact_returns_a_400_for_an_undecodable_body(
    #[case] content_type: &str,
    #[case] body: &str,
) {
    let app = spawn_app().await;

    let response = app.post_contact_raw(content_type, body.into()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "success": false, "message": "Invalid request body" })
    );
}

#[tokio::test]
async fn contact_returns_a_500_without_details_if_the_relay_fails() {
    // Arrange
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("relay credentials rejected"))
        .expect(1)
        .mount(app.email_server())
        .await;

    // Act
    let response = app.post_contact(&valid_submission()).await;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "Failed to send message. Please try again later."
        })
    );
}

#[tokio::test]
async fn contact_fails_if_only_the_acknowledgement_fails() {
    // Arrange
    let app = spawn_app().await;
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .expect(1)
        .mount(app.email_server())
        .await;
    Mock::given(path("/email"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(app.email_server())
        .await;

    // Act
    let response = app.post_contact(&valid_submission()).await;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let emails = app.sent_emails().await;
    assert_eq!(emails[0]["To"], OWNER_EMAIL);
    assert_eq!(emails[1]["To"], "ursula@example.com");
}

#[tokio::test]
async fn contact_user_input_is_escaped_in_html_emails() {
    // Arrange
    let app = spawn_app().await;
    app.mock_send_email_endpoint_to_ok(2).await;

    // Act
    app.post_contact(&json!({
        "name": "<script>alert('hi')</script>",
        "email": "ursula@example.com",
        "message": "<a href=\"https://evil.example\">click me</a>",
    }))
    .await;

    // Assert
    for email in app.sent_emails().await {
        let html = email["HtmlBody"].as_str().unwrap();
        assert!(!html.contains("<script>"), "{html}");
        assert!(!html.contains("<a href"), "{html}");
        assert!(html.contains("&lt;script&gt;"), "{html}");
    }
}

#[tokio::test]
async fn contact_outcomes_are_exported_as_metrics() {
    // Arrange
    let app = spawn_app().await;
    app.mock_send_email_endpoint_to_ok(2).await;

    // Act
    app.post_contact(&valid_submission()).await;
    app.post_contact(&json!({})).await;

    // Assert
    let metrics = app.get("/metrics").await.text().await.unwrap();
    assert!(metrics.contains(r#"contact_submissions_total{outcome="sent"} 1"#));
    assert!(metrics.contains(r#"contact_submissions_total{outcome="invalid"} 1"#));
    assert!(metrics.contains(r#"contact_submissions_total{outcome="failed"} 0"#));
}

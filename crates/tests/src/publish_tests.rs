use crate::fixtures::mock_relay::{RELAY_API_KEY, RelayMode};
use crate::fixtures::test_app::{ADMIN_EMAIL, TestApp};
use serde_json::Value;

fn urgent(send_push: bool) -> Value {
    serde_json::json!({
        "title": "Water main break",
        "message": "Building closed today",
        "priority": "high",
        "is_active": true,
        "send_push": send_push,
    })
}

#[tokio::test]
async fn publish_without_push_does_not_call_relay() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let json = app.publish(&token, urgent(false)).await;
    assert_eq!(json["push"]["status"], "not_requested");
    assert_eq!(json["announcement"]["published_by"], ADMIN_EMAIL);
    assert!(app.relay.calls_to("/api/send-push").is_empty());
}

#[tokio::test]
async fn publish_with_push_records_audit() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;
    app.relay.add_token("visitor_1", "Mozilla/5.0 (iPhone)");
    app.relay.add_token("visitor_2", "Mozilla/5.0 (Linux; Android 14)");

    let json = app.publish(&token, urgent(true)).await;
    assert_eq!(json["push"]["status"], "sent");
    assert_eq!(json["push"]["sent"], 2);
    assert_eq!(json["push"]["failed"], 0);
    assert_eq!(json["announcement"]["push_sent"], true);
    assert_eq!(json["announcement"]["push_recipients"], 2);
    assert!(json["announcement"]["push_sent_at"].is_string());

    let calls = app.relay.calls_to("/api/send-push");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].authorization.as_deref(),
        Some(format!("Bearer {RELAY_API_KEY}").as_str())
    );
    assert_eq!(calls[0].body["title"], "Water main break");
    assert_eq!(calls[0].body["message"], "Building closed today");
    assert_eq!(calls[0].body["priority"], "high");
}

#[tokio::test]
async fn inactive_announcement_is_saved_but_not_pushed() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let mut body = urgent(true);
    body["is_active"] = serde_json::json!(false);
    let json = app.publish(&token, body).await;

    assert_eq!(json["push"]["status"], "not_requested");
    assert!(app.relay.calls_to("/api/send-push").is_empty());
}

#[tokio::test]
async fn relay_failure_still_persists_announcement() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;
    app.relay.set_mode(RelayMode::Failing);

    let json = app.publish(&token, urgent(true)).await;
    assert_eq!(json["push"]["status"], "failed");
    assert!(
        json["push"]["error"]
            .as_str()
            .unwrap()
            .contains("relay exploded")
    );
    assert_eq!(json["announcement"]["push_sent"], false);
    assert!(
        json["announcement"]["push_error"]
            .as_str()
            .unwrap()
            .contains("relay exploded")
    );

    // Visible to visitors regardless of the push outcome.
    let items: Vec<Value> = app
        .client
        .get(app.url("/api/announcement"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Water main break");
}

#[tokio::test]
async fn html_error_page_is_reported_as_unexpected_content() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;
    app.relay.set_mode(RelayMode::Html);

    let json = app.publish(&token, urgent(true)).await;
    assert_eq!(json["push"]["status"], "failed");
    let error = json["push"]["error"].as_str().unwrap();
    assert!(error.contains("text/html"), "unexpected error text: {error}");
    assert!(error.contains("instead of JSON"));
}

#[tokio::test]
async fn missing_relay_key_fails_push_only() {
    let app = TestApp::spawn_with_settings(|s| s.push_relay.api_key = None).await;
    let token = app.login_admin().await;

    let json = app.publish(&token, urgent(true)).await;
    assert_eq!(json["push"]["status"], "failed");
    assert_eq!(json["push"]["error"], "Push API key not available");
    assert!(app.relay.calls().is_empty());
}

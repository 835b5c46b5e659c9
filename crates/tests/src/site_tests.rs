use crate::fixtures::test_app::TestApp;
use serde_json::{Value, json};

#[tokio::test]
async fn programs_fall_back_to_defaults_when_empty() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(app.url("/api/program")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["fallback"], true);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["name"], "Weekly Study Circle");
}

#[tokio::test]
async fn stored_programs_replace_defaults() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let resp = app
        .auth_post("/api/admin/program", &token)
        .json(&json!({ "name": "Youth Class", "timing": "Sundays 10 AM", "icon": "fas fa-child" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let resp = app
        .auth_post("/api/admin/program", &token)
        .json(&json!({
            "name": "Retired Program",
            "timing": "Never",
            "icon": "fas fa-ban",
            "is_active": false,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let json: Value = app
        .client
        .get(app.url("/api/program"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["fallback"], false);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Youth Class");

    let all: Vec<Value> = app
        .auth_get("/api/admin/program", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn program_requires_every_field() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let resp = app
        .auth_post("/api/admin/program", &token)
        .json(&json!({ "name": "  ", "timing": "Mondays", "icon": "fas fa-book" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn update_and_delete_program() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let created: Value = app
        .auth_post("/api/admin/program", &token)
        .json(&json!({ "name": "Book Club", "timing": "Fridays", "icon": "fas fa-book" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let updated: Value = app
        .auth_put(&format!("/api/admin/program/{id}"), &token)
        .json(&json!({ "name": "Book Club", "timing": "Saturdays", "icon": "fas fa-book" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["timing"], "Saturdays");

    let resp = app
        .auth_delete(&format!("/api/admin/program/{id}"), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = app
        .client
        .get(app.url("/api/program"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["fallback"], true);
}

#[tokio::test]
async fn empty_board_is_flagged() {
    let app = TestApp::spawn().await;

    let json: Value = app
        .client
        .get(app.url("/api/board"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["fallback"], true);
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn board_is_ordered_with_unordered_members_last() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    for body in [
        json!({ "name": "Unordered" }),
        json!({ "name": "Secretary", "order": 2 }),
        json!({ "name": "Chair", "order": 1 }),
    ] {
        let resp = app
            .auth_post("/api/admin/board", &token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 201);
    }

    let json: Value = app
        .client
        .get(app.url("/api/board"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["fallback"], false);
    let names: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Chair", "Secretary", "Unordered"]);
    assert_eq!(json["items"][2]["order"], 999);
}

#[tokio::test]
async fn visitor_subscription_is_forwarded_to_relay() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/push/subscribe"))
        .json(&json!({
            "visitor_id": "visitor_1700000000000_abc123def",
            "token": "fcm-token-1",
            "user_agent": "Mozilla/5.0 (iPhone)",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let calls = app.relay.calls_to("/api/store-token");
    assert_eq!(calls.len(), 1);
    let body = &calls[0].body;
    assert_eq!(body["userId"], "visitor_1700000000000_abc123def");
    assert_eq!(body["fcmToken"], "fcm-token-1");
    assert_eq!(body["userType"], "visitor");
    assert!(body["subscribedAt"].as_str().is_some());
    assert_eq!(app.relay.token_count(), 1);
}

#[tokio::test]
async fn visitor_subscription_requires_id_and_token() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/push/subscribe"))
        .json(&json!({ "visitor_id": "", "token": "fcm-token-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    assert!(app.relay.calls().is_empty());
}

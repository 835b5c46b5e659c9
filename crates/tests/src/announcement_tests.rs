use crate::fixtures::test_app::TestApp;
use chrono::{Duration, Utc};
use serde_json::Value;

#[tokio::test]
async fn public_list_is_ranked_priority_then_recency() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    app.seed_announcement(&token, "Old medium", "medium").await;
    let high = app.seed_announcement(&token, "High", "high").await;
    // Keep creation times distinct at millisecond precision.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    app.seed_announcement(&token, "New medium", "medium").await;
    app.seed_announcement(&token, "Low", "low").await;

    let resp = app.client.get(app.url("/api/announcement")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let items: Vec<Value> = resp.json().await.unwrap();
    let titles: Vec<&str> = items.iter().map(|a| a["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["High", "New medium", "Old medium", "Low"]);
    assert_eq!(items[0]["id"], high.as_str());
    assert_eq!(items[0]["priority"], "high");
}

#[tokio::test]
async fn public_list_hides_inactive_and_expired() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    app.publish(
        &token,
        serde_json::json!({
            "title": "Draft",
            "message": "Not yet",
            "priority": "high",
            "is_active": false,
        }),
    )
    .await;
    app.publish(
        &token,
        serde_json::json!({
            "title": "Expired",
            "message": "Too late",
            "priority": "high",
            "is_active": true,
            "expiry_date": (Utc::now() - Duration::hours(1)).to_rfc3339(),
        }),
    )
    .await;
    app.publish(
        &token,
        serde_json::json!({
            "title": "Current",
            "message": "Still on",
            "priority": "low",
            "is_active": true,
            "expiry_date": (Utc::now() + Duration::days(1)).to_rfc3339(),
        }),
    )
    .await;

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
    assert_eq!(items[0]["title"], "Current");

    // The admin list still shows everything, flagged.
    let all: Vec<Value> = app
        .auth_get("/api/admin/announcement", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    let expired = all.iter().find(|a| a["title"] == "Expired").unwrap();
    assert_eq!(expired["is_expired"], true);
    assert_eq!(expired["priority_label"], "EMERGENCY");
}

#[tokio::test]
async fn public_get_by_id() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;
    let id = app.seed_announcement(&token, "Open house", "medium").await;

    let resp = app
        .client
        .get(app.url(&format!("/api/announcement/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["title"], "Open house");
    assert_eq!(json["is_active"], true);
}

#[tokio::test]
async fn public_get_unknown_or_bad_id() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/announcement/000000000000000000000000"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .client
        .get(app.url("/api/announcement/not-an-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn update_overwrites_content_and_clears_expiry() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let json = app
        .publish(
            &token,
            serde_json::json!({
                "title": "Parking",
                "message": "Lot closed",
                "priority": "low",
                "is_active": true,
                "expiry_date": (Utc::now() + Duration::days(2)).to_rfc3339(),
            }),
        )
        .await;
    let id = json["announcement"]["id"].as_str().unwrap();
    assert!(json["announcement"]["expiry_date"].is_string());

    let resp = app
        .auth_put(&format!("/api/admin/announcement/{id}"), &token)
        .json(&serde_json::json!({
            "title": "Parking update",
            "message": "Lot reopened",
            "priority": "medium",
            "is_active": true,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["title"], "Parking update");
    assert_eq!(updated["priority"], "medium");
    assert!(updated["expiry_date"].is_null());
}

#[tokio::test]
async fn update_unknown_returns_404() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let resp = app
        .auth_put("/api/admin/announcement/000000000000000000000000", &token)
        .json(&serde_json::json!({
            "title": "Ghost",
            "message": "Nothing here",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn delete_is_hard() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;
    let id = app.seed_announcement(&token, "Temporary", "low").await;

    let resp = app
        .auth_delete(&format!("/api/admin/announcement/{id}"), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/api/announcement/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .auth_delete(&format!("/api/admin/announcement/{id}"), &token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn unknown_priority_reads_as_low() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let json = app
        .publish(
            &token,
            serde_json::json!({
                "title": "Odd",
                "message": "Priority from an old client",
                "priority": "urgent",
                "is_active": true,
            }),
        )
        .await;
    assert_eq!(json["announcement"]["priority"], "low");
}

#[tokio::test]
async fn blank_title_returns_422() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let resp = app
        .auth_post("/api/admin/announcement", &token)
        .json(&serde_json::json!({
            "title": "  ",
            "message": "Body",
            "is_active": true,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "validation");
}

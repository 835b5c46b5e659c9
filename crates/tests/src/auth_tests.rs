use crate::fixtures::test_app::{ADMIN_EMAIL, ADMIN_PASSWORD, TestApp};
use serde_json::Value;

#[tokio::test]
async fn login_returns_token_and_sets_cookie() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": ADMIN_EMAIL,
            "password": ADMIN_PASSWORD,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));

    let json: Value = resp.json().await.unwrap();
    assert!(json["access_token"].is_string());
    assert_eq!(json["admin"]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn login_email_is_case_insensitive() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": ADMIN_EMAIL.to_uppercase(),
            "password": ADMIN_PASSWORD,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn login_wrong_password_returns_401() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": ADMIN_EMAIL,
            "password": "WrongPassword!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 401);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn login_unknown_email_returns_401() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": "nobody@herald.test",
            "password": ADMIN_PASSWORD,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn login_malformed_email_returns_422() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "password": ADMIN_PASSWORD,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn me_with_bearer_token() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let resp = app.auth_get("/api/auth/me", &token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["email"], ADMIN_EMAIL);
    assert!(json["last_login_at"].is_string());
}

#[tokio::test]
async fn me_with_cookie_only() {
    let app = TestApp::spawn().await;
    let token = app.login_admin().await;

    let resp = reqwest::Client::new()
        .get(app.url("/api/auth/me"))
        .header("Cookie", format!("theme=dark; access_token={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn logout_expires_cookie() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(cookie.starts_with("access_token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn admin_routes_require_token() {
    let app = TestApp::spawn().await;

    for path in [
        "/api/admin/announcement",
        "/api/admin/program",
        "/api/admin/board",
        "/api/admin/push/stats",
    ] {
        let resp = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(resp.status().as_u16(), 401, "{path} should require auth");
    }

    let resp = app
        .auth_get("/api/admin/announcement", "garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

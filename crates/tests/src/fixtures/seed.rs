use serde_json::Value;

use super::test_app::{ADMIN_EMAIL, ADMIN_PASSWORD, TestApp};

impl TestApp {
    /// Logs in the bootstrapped admin and returns the access token.
    pub async fn login_admin(&self) -> String {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({
                "email": ADMIN_EMAIL,
                "password": ADMIN_PASSWORD,
            }))
            .send()
            .await
            .expect("Login request failed");

        assert!(
            resp.status().is_success(),
            "Login failed: {}",
            resp.text().await.unwrap_or_default()
        );

        let json: Value = resp.json().await.expect("Failed to parse login response");
        json["access_token"].as_str().unwrap().to_string()
    }

    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    /// Publishes an announcement and returns the response body.
    pub async fn publish(&self, token: &str, body: Value) -> Value {
        let resp = self
            .auth_post("/api/admin/announcement", token)
            .json(&body)
            .send()
            .await
            .expect("Publish request failed");

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        assert_eq!(status.as_u16(), 201, "Publish failed: {}", text);
        serde_json::from_str(&text).unwrap()
    }

    /// Publishes an active announcement without a push and returns its ID.
    pub async fn seed_announcement(&self, token: &str, title: &str, priority: &str) -> String {
        let json = self
            .publish(
                token,
                serde_json::json!({
                    "title": title,
                    "message": format!("{title} details"),
                    "priority": priority,
                    "is_active": true,
                }),
            )
            .await;
        json["announcement"]["id"].as_str().unwrap().to_string()
    }
}

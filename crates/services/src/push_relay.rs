//! Client for the push relay: device token storage and push fan-out.

use std::time::Duration;

use herald_config::PushRelaySettings;
use herald_db::models::Priority;
use reqwest::header::CONTENT_TYPE;
use reqwest::{IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PushRelayError {
    #[error("Push API key not available")]
    MissingApiKey,
    #[error("Push relay unreachable: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Push relay rejected the API key")]
    Unauthorized,
    #[error("Push relay refused the operation")]
    Forbidden,
    #[error("Push relay returned {content_type} instead of JSON (status {status})")]
    UnexpectedContent { status: u16, content_type: String },
    #[error("Push relay error ({status}): {message}")]
    Relay { status: u16, message: String },
    #[error("Unreadable push relay response: {0}")]
    Decode(String),
    #[error("Invalid push relay URL: {0}")]
    InvalidUrl(String),
}

impl PushRelayError {
    /// Worth retrying on the operator's next attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Relay { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

/// Self-registration sent by a visitor's device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRegistration {
    pub user_id: String,
    pub fcm_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    title: &'a str,
    message: &'a str,
    priority: &'a str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    #[serde(default)]
    pub sent: u32,
    #[serde(default)]
    pub failed: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    subscriber_count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct RelayAck {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenListing {
    #[serde(default)]
    pub summary: Option<TokenSummary>,
    #[serde(default)]
    pub tokens: Vec<TokenInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub user_id: Option<String>,
    pub user_agent: Option<String>,
    pub platform: Option<String>,
    pub device_info: Option<String>,
    pub stored_at: Option<String>,
    pub token_preview: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WipeOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub deleted: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub struct PushRelayClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PushRelayClient {
    pub fn new(settings: &PushRelaySettings) -> Result<Self, PushRelayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, PushRelayError> {
        self.authed_at(method, self.url(path))
    }

    fn authed_at(&self, method: Method, url: impl IntoUrl) -> Result<RequestBuilder, PushRelayError> {
        let key = self.api_key.as_deref().ok_or(PushRelayError::MissingApiKey)?;
        Ok(self.client.request(method, url).bearer_auth(key))
    }

    /// The user ID is one escaped path segment, whatever it contains.
    fn remove_token_url(&self, user_id: &str) -> Result<Url, PushRelayError> {
        let mut url = Url::parse(&self.url("/api/remove-token"))
            .map_err(|e| PushRelayError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| PushRelayError::InvalidUrl(self.base_url.clone()))?
            .push(user_id);
        Ok(url)
    }

    pub async fn store_token(&self, registration: &TokenRegistration) -> Result<(), PushRelayError> {
        let resp = self
            .client
            .post(self.url("/api/store-token"))
            .json(registration)
            .send()
            .await?;
        let ack: RelayAck = decode(resp).await?;
        if let Some(message) = ack.error {
            return Err(PushRelayError::Relay { status: 200, message });
        }
        debug!(user_id = %registration.user_id, "Stored push token");
        Ok(())
    }

    pub async fn send_push(
        &self,
        title: &str,
        message: &str,
        priority: Priority,
    ) -> Result<SendOutcome, PushRelayError> {
        let resp = self
            .authed(Method::POST, "/api/send-push")?
            .json(&SendRequest {
                title,
                message,
                priority: priority.as_str(),
            })
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn subscriber_count(&self) -> Result<u64, PushRelayError> {
        let resp = self.authed(Method::GET, "/api/stats")?.send().await?;
        let stats: StatsResponse = decode(resp).await?;
        Ok(stats.subscriber_count)
    }

    pub async fn debug_tokens(&self) -> Result<TokenListing, PushRelayError> {
        let resp = self.authed(Method::GET, "/api/debug-tokens")?.send().await?;
        decode(resp).await
    }

    pub async fn wipe_all_tokens(&self) -> Result<WipeOutcome, PushRelayError> {
        let resp = self
            .authed(Method::DELETE, "/api/wipe-all-tokens")?
            .send()
            .await?;
        decode(resp).await
    }

    /// `Ok(false)` when the relay answered with a non-success status.
    pub async fn remove_token(&self, user_id: &str) -> Result<bool, PushRelayError> {
        let resp = self
            .authed_at(Method::DELETE, self.remove_token_url(user_id)?)?
            .send()
            .await?;
        let ok = resp.status().is_success();
        if !ok {
            warn!(user_id, status = %resp.status(), "Relay did not remove token");
        }
        Ok(ok)
    }
}

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: Option<String>,
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, PushRelayError> {
    let status = resp.status();
    match status {
        StatusCode::UNAUTHORIZED => return Err(PushRelayError::Unauthorized),
        StatusCode::FORBIDDEN => return Err(PushRelayError::Forbidden),
        _ => {}
    }

    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !content_type.contains("json") {
        return Err(PushRelayError::UnexpectedContent {
            status: status.as_u16(),
            content_type: if content_type.is_empty() {
                "no content type".to_string()
            } else {
                content_type
            },
        });
    }

    let body = resp.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<RelayErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        return Err(PushRelayError::Relay {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|e| PushRelayError::Decode(e.to_string()))
}

/// One token line in the diagnostic report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenEntry {
    pub user_id: String,
    pub user_agent: String,
    pub platform: String,
    pub device_info: String,
    pub stored_at: String,
    pub token_preview: String,
}

impl From<&TokenInfo> for TokenEntry {
    fn from(t: &TokenInfo) -> Self {
        let or = |v: &Option<String>, d: &str| v.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| d.to_string());
        Self {
            user_id: or(&t.user_id, "unknown"),
            user_agent: or(&t.user_agent, "Unknown"),
            platform: or(&t.platform, "Unknown"),
            device_info: or(&t.device_info, "Unknown Device"),
            stored_at: or(&t.stored_at, "Unknown"),
            token_preview: or(&t.token_preview, "N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformGroup {
    pub platform: String,
    pub tokens: Vec<TokenEntry>,
}

/// Tokens that look like the same physical device registered twice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub fingerprint: String,
    pub tokens: Vec<TokenEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenReport {
    pub total_tokens: u64,
    pub platforms: Vec<PlatformGroup>,
    pub duplicates: Vec<DuplicateGroup>,
}

const USER_AGENT_PREVIEW: usize = 100;

impl TokenReport {
    /// Groups are listed in first-seen order.
    pub fn analyze(listing: &TokenListing) -> Self {
        let mut platforms: Vec<PlatformGroup> = Vec::new();
        let mut by_device: Vec<DuplicateGroup> = Vec::new();

        for entry in listing.tokens.iter().map(TokenEntry::from) {
            match platforms.iter_mut().find(|g| g.platform == entry.platform) {
                Some(group) => group.tokens.push(entry.clone()),
                None => platforms.push(PlatformGroup {
                    platform: entry.platform.clone(),
                    tokens: vec![entry.clone()],
                }),
            }

            let fingerprint = format!("{}_{}", entry.device_info, entry.platform);
            match by_device.iter_mut().find(|g| g.fingerprint == fingerprint) {
                Some(group) => group.tokens.push(entry),
                None => by_device.push(DuplicateGroup {
                    fingerprint,
                    tokens: vec![entry],
                }),
            }
        }

        let total_tokens = listing
            .summary
            .as_ref()
            .and_then(|s| s.total_tokens)
            .filter(|n| *n > 0)
            .unwrap_or(listing.tokens.len() as u64);

        Self {
            total_tokens,
            platforms,
            duplicates: by_device.into_iter().filter(|g| g.tokens.len() > 1).collect(),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("=== TOKEN ANALYSIS ===\n\n");
        out.push_str(&format!("Total tokens found: {}\n\n", self.total_tokens));

        if self.platforms.is_empty() {
            out.push_str("No tokens found in storage.\n");
            return out;
        }

        for group in &self.platforms {
            out.push_str(&format!("--- {} TOKENS ({}) ---\n", group.platform, group.tokens.len()));
            for (i, t) in group.tokens.iter().enumerate() {
                let agent: String = t.user_agent.chars().take(USER_AGENT_PREVIEW).collect();
                let ellipsis = if t.user_agent.chars().count() > USER_AGENT_PREVIEW { "..." } else { "" };
                out.push_str(&format!("{}. User ID: {}\n", i + 1, t.user_id));
                out.push_str(&format!("   Device: {}\n", t.device_info));
                out.push_str(&format!("   Token: {}\n", t.token_preview));
                out.push_str(&format!("   Registered: {}\n", t.stored_at));
                out.push_str(&format!("   User Agent: {agent}{ellipsis}\n\n"));
            }
        }

        out.push_str("\n=== POTENTIAL DUPLICATES ===\n");
        if self.duplicates.is_empty() {
            out.push_str("No duplicate devices detected.\n");
        }
        for group in &self.duplicates {
            out.push_str(&format!(
                "\nDUPLICATE GROUP: {} ({} tokens)\n",
                group.fingerprint,
                group.tokens.len()
            ));
            for (i, t) in group.tokens.iter().enumerate() {
                out.push_str(&format!("  {}. {} ({})\n", i + 1, t.user_id, t.stored_at));
                out.push_str(&format!("     Device: {}\n", t.device_info));
            }
        }
        out
    }
}

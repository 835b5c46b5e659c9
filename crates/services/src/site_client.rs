//! HTTP access to the public API, for page runtimes that do not talk to the
//! store directly.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::display::{DisplayState, StateStore};
use crate::manager::{AnnouncementSource, SourceError};
use crate::selection::AnnouncementView;
use crate::site::VisitorSubscription;

pub struct SiteClient {
    client: reqwest::Client,
    base_url: String,
}

impl SiteClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Registers this browser's push token under its visitor ID and records
    /// the opt-in locally once the relay accepted it.
    pub async fn subscribe_visitor<S: StateStore>(
        &self,
        state: &DisplayState<S>,
        token: &str,
        user_agent: Option<&str>,
    ) -> Result<(), SourceError> {
        let body = VisitorSubscription {
            visitor_id: state.visitor_id(),
            token: token.to_string(),
            user_agent: user_agent.map(str::to_string),
        };
        let resp = self
            .client
            .post(self.url("/api/push/subscribe"))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        state.record_subscription(token);
        info!(visitor_id = %body.visitor_id, "Push notifications enabled");
        Ok(())
    }
}

#[async_trait]
impl AnnouncementSource for SiteClient {
    async fn fetch_active(&self) -> Result<Vec<AnnouncementView>, SourceError> {
        let resp = self.client.get(self.url("/api/announcement")).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status().as_u16()));
        }
        Ok(resp.json().await?)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Option<AnnouncementView>, SourceError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/announcement/{id}")))
            .send()
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                debug!(id, "Announcement not available");
                Ok(None)
            }
            s if s.is_success() => Ok(Some(resp.json().await?)),
            s => Err(SourceError::Status(s.as_u16())),
        }
    }
}

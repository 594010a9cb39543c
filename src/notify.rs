//! Notification sink
//!
//! Fire-and-forget Discord webhook messages. Delivery failures are swallowed
//! after a log line and never reach the replay loop.

use serde_json::json;
use tracing::debug;

use crate::config::NotifyConfig;

/// Discord webhook notifier
pub struct Notifier {
    client: reqwest::Client,
    webhook_url: String,
    username: String,
}

impl Notifier {
    pub fn new(config: &NotifyConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            webhook_url: config.webhook_url.clone(),
            username: config.username.clone(),
        }
    }

    /// True when a webhook URL is configured
    pub fn is_enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    /// Post a message; failures are logged and dropped
    pub async fn send(&self, message: &str) {
        if !self.is_enabled() {
            return;
        }

        let body = json!({
            "content": message,
            "username": self.username,
        });

        if let Err(e) = self.client.post(&self.webhook_url).json(&body).send().await {
            debug!(error = %e, "notification delivery failed");
        }
    }
}

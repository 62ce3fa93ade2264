//! Chat webhook notifications
//!
//! Messages are posted as `{"text": "..."}`. Delivery is best effort: errors
//! are logged locally and never retried or escalated.

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Longest message body sent to the webhook, in characters
const MAX_MESSAGE_CHARS: usize = 3500;

/// Webhook payload
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WebhookPayload {
    pub text: String,
}

/// Notification manager for posting plain-text webhook messages
#[derive(Debug, Clone)]
pub struct NotificationManager {
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl NotificationManager {
    /// Create a new notification manager; `None` disables delivery
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to configure HTTP client, using defaults: {}", e);
                reqwest::Client::new()
            });

        Self {
            webhook_url: webhook_url.filter(|url| !url.is_empty()),
            client,
        }
    }

    /// A manager that never sends anything
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Send a message, logging (never returning) any delivery failure
    pub async fn notify(&self, message: &str) {
        if !self.is_enabled() {
            debug!("No webhook configured, skipping notification");
            return;
        }

        if let Err(e) = self.send(message).await {
            error!("Failed to deliver webhook notification: {:#}", e);
        }
    }

    /// Send a message and report the outcome
    pub async fn send(&self, message: &str) -> Result<()> {
        let Some(ref url) = self.webhook_url else {
            return Ok(());
        };

        let payload = build_payload(message);
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .context("Failed to send webhook request")?;

        let status = response.status();
        if status.is_success() {
            debug!("Webhook notification sent");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Webhook responded with status {}: {}", status, body)
        }
    }
}

/// Build the payload, truncating oversized messages
pub fn build_payload(message: &str) -> WebhookPayload {
    let text = if message.chars().count() > MAX_MESSAGE_CHARS {
        let truncated: String = message.chars().take(MAX_MESSAGE_CHARS - 3).collect();
        format!("{}...", truncated)
    } else {
        message.to_string()
    };
    WebhookPayload { text }
}

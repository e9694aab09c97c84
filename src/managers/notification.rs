//! Slack webhook notification manager
//!
//! Sends one plain-text message per backup run to an incoming webhook.
//! Delivery is best-effort: failures are logged and never returned.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use crate::config::NotificationConfig;

/// Abstraction over the notification channel, enabling mocking in tests
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message; never fails from the caller's point of view
    async fn send_notification(&self, message: &str);
}

/// Slack-style webhook payload
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Notification manager for sending Slack webhooks
pub struct NotificationManager {
    config: NotificationConfig,
    client: reqwest::Client,
}

impl NotificationManager {
    /// Create a new notification manager
    pub fn new(config: NotificationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    /// Check if a webhook is configured
    pub fn is_enabled(&self) -> bool {
        !self.config.slack_webhook_url.is_empty()
    }

    /// Send webhook to Slack
    async fn send_webhook(&self, message: &str) -> Result<()> {
        if !self.is_enabled() {
            anyhow::bail!("SLACK_WEBHOOK_URL is not defined");
        }

        let response = self
            .client
            .post(&self.config.slack_webhook_url)
            .json(&WebhookPayload { text: message })
            .send()
            .await
            .context("Failed to send Slack webhook")?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Failed to send Slack notification: {} {}",
                status,
                body
            )
        }
    }
}

#[async_trait]
impl Notifier for NotificationManager {
    async fn send_notification(&self, message: &str) {
        match self.send_webhook(message).await {
            Ok(()) => info!("Slack notification sent successfully"),
            Err(e) => error!("Error sending Slack notification: {:#}", e),
        }
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every message instead of sending it
    #[derive(Clone, Default)]
    pub struct MockNotifier {
        pub messages: Arc<Mutex<Vec<String>>>,
    }

    impl MockNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get_messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn send_notification(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }
}

// src/notify/delivery.rs
// Outbound delivery channels (email relay, chat webhooks)

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::message::EmailMessage;
use super::recipients::Recipient;
use crate::error::NotifyError;

/// Sends a rendered email to a recipient
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, recipient: &Recipient, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Posts a chat message for a recipient
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send_chat(&self, recipient: &Recipient, text: &str) -> Result<(), NotifyError>;
}

/// Chat delivery through Slack incoming webhooks
pub struct SlackNotifier {
    client: reqwest::Client,
}

impl SlackNotifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatSender for SlackNotifier {
    async fn send_chat(&self, recipient: &Recipient, text: &str) -> Result<(), NotifyError> {
        let webhook = recipient
            .chat_webhook_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(NotifyError::NoChatWebhook(recipient.spec))?;

        let response = self
            .client
            .post(webhook)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| NotifyError::Chat(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Chat(format!("webhook returned {}: {}", status, body)));
        }

        debug!(recipient = %recipient.spec, "chat notification posted");
        Ok(())
    }
}

// src/frontend/client.rs
// HTTP client for the frontend internal API

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::debug;

use super::SavedQuerySource;
use crate::error::{NotifyError, QueryRunnerError, Result};
use crate::notify::{EmailMessage, EmailSender, Recipient, RecipientResolver};
use crate::saved_query::SavedQuerySpecAndConfig;

const LIST_ALL_PATH: &str = "/.internal/saved-queries/list-all";
const DELETE_INFO_PATH: &str = "/.internal/saved-queries/delete-info";
const RECIPIENTS_PATH: &str = "/.internal/saved-queries/recipients";
const SEND_EMAIL_PATH: &str = "/.internal/send-email";

/// Frontend internal API client.
///
/// Serves as the saved query source, the recipient resolver, and the email
/// relay.
#[derive(Debug, Clone)]
pub struct FrontendClient {
    base_url: String,
    client: reqwest::Client,
}

impl FrontendClient {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let start_time = Instant::now();
        let response = self.client.post(self.url(path)).json(body).send().await?;

        let status = response.status();
        let duration_ms = start_time.elapsed().as_millis();
        debug!(path, status = status.as_u16(), duration_ms, "frontend request complete");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryRunnerError::Frontend {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.post(path, body).await?.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl SavedQuerySource for FrontendClient {
    async fn list_all(&self) -> Result<Vec<SavedQuerySpecAndConfig>> {
        self.post_json(LIST_ALL_PATH, &json!({})).await
    }

    async fn delete_info(&self, query: &str) -> Result<()> {
        self.post(DELETE_INFO_PATH, &json!({ "query": query })).await?;
        Ok(())
    }
}

#[async_trait]
impl RecipientResolver for FrontendClient {
    async fn recipients(&self, query: &SavedQuerySpecAndConfig) -> std::result::Result<Vec<Recipient>, NotifyError> {
        self.post_json(RECIPIENTS_PATH, query)
            .await
            .map_err(|e| NotifyError::Recipients(e.to_string()))
    }
}

#[async_trait]
impl EmailSender for FrontendClient {
    async fn send_email(&self, recipient: &Recipient, message: &EmailMessage) -> std::result::Result<(), NotifyError> {
        let body = json!({
            "recipient": recipient.spec,
            "subject": message.subject,
            "text": message.text,
        });
        self.post(SEND_EMAIL_PATH, &body)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Email(e.to_string()))
    }
}

// src/notify/message.rs
// Email and chat message content for subscription changes

use std::fmt;

use crate::saved_query::SavedQuerySpecAndConfig;

/// Which channel a search link is embedded in (reported as utm_source)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtmSource {
    Email,
    Slack,
}

impl fmt::Display for UtmSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Slack => write!(f, "slack"),
        }
    }
}

/// Builds links back to the search page of the instance
#[derive(Debug, Clone)]
pub struct SearchLinks {
    external_url: String,
}

impl SearchLinks {
    pub fn new(external_url: impl Into<String>) -> Self {
        let external_url = external_url.into().trim_end_matches('/').to_string();
        Self { external_url }
    }

    pub fn search_url(&self, query: &str, source: UtmSource) -> String {
        format!(
            "{}/search?q={}&utm_source={}",
            self.external_url,
            urlencoding::encode(query),
            source
        )
    }
}

/// Direction of a subscription change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    Subscribed,
    Unsubscribed,
}

/// Rendered email, relayed to the frontend for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub text: String,
}

pub fn email_message(
    kind: Subscription,
    query: &SavedQuerySpecAndConfig,
    links: &SearchLinks,
) -> EmailMessage {
    let description = &query.config.description;
    let url = links.search_url(&query.config.query, UtmSource::Email);

    match kind {
        Subscription::Subscribed => EmailMessage {
            subject: format!("Subscribed to saved search: {}", description),
            text: format!(
                "You are now receiving notifications for the saved search \"{}\".\n\n\
                 Query: {}\n\n\
                 When new search results become available, we will notify you.\n\n\
                 {}\n",
                description, query.config.query, url
            ),
        },
        Subscription::Unsubscribed => EmailMessage {
            subject: format!("Unsubscribed from saved search: {}", description),
            text: format!(
                "You will no longer receive notifications for the saved search \"{}\".\n\n\
                 Query: {}\n\n\
                 {}\n",
                description, query.config.query, url
            ),
        },
    }
}

pub fn chat_message(kind: Subscription, query: &SavedQuerySpecAndConfig, links: &SearchLinks) -> String {
    let link = chat_link(query, links);
    match kind {
        Subscription::Subscribed => format!(
            "Subscribed to saved search {}. Notifications will be posted here when new results are available.",
            link
        ),
        Subscription::Unsubscribed => {
            format!("Unsubscribed from saved search {}. Notifications have been disabled.", link)
        }
    }
}

pub fn test_chat_message(query: &SavedQuerySpecAndConfig, links: &SearchLinks) -> String {
    format!(
        "It worked! This is a test notification for the saved search {}.",
        chat_link(query, links)
    )
}

// Slack link markup: <url|label>
fn chat_link(query: &SavedQuerySpecAndConfig, links: &SearchLinks) -> String {
    format!(
        "<{}|\"{}\">",
        links.search_url(&query.config.query, UtmSource::Slack),
        query.config.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saved_query::{SavedQueryConfig, SavedQueryIdSpec, Subject};

    fn query() -> SavedQuerySpecAndConfig {
        SavedQuerySpecAndConfig::new(
            SavedQueryIdSpec::new(Subject::User(1), "errs"),
            SavedQueryConfig {
                key: "errs".to_string(),
                description: "New errors".to_string(),
                query: "error type:diff".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_search_url_encodes_query() {
        let links = SearchLinks::new("https://code.example.com/");
        assert_eq!(
            links.search_url("error type:diff", UtmSource::Slack),
            "https://code.example.com/search?q=error%20type%3Adiff&utm_source=slack"
        );
    }

    #[test]
    fn test_email_subjects() {
        let links = SearchLinks::new("https://code.example.com");
        let sub = email_message(Subscription::Subscribed, &query(), &links);
        assert_eq!(sub.subject, "Subscribed to saved search: New errors");
        assert!(sub.text.contains("utm_source=email"));

        let unsub = email_message(Subscription::Unsubscribed, &query(), &links);
        assert_eq!(unsub.subject, "Unsubscribed from saved search: New errors");
        assert!(unsub.text.contains("error type:diff"));
    }

    #[test]
    fn test_chat_messages_link_description() {
        let links = SearchLinks::new("https://code.example.com");
        let text = chat_message(Subscription::Subscribed, &query(), &links);
        assert!(text.starts_with("Subscribed to saved search <https://code.example.com/search?q="));
        assert!(text.contains("|\"New errors\">"));

        let text = test_chat_message(&query(), &links);
        assert!(text.starts_with("It worked!"));
    }
}

// src/notify/dispatcher.rs
// Fans saved query changes out to subscribed recipients

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::delivery::{ChatSender, EmailSender};
use super::message::{chat_message, email_message, test_chat_message, SearchLinks, Subscription};
use super::recipients::{diff_recipients, resolve, Recipient, RecipientResolver};
use crate::error::{NotifyError, TestNotificationError};
use crate::saved_query::{SavedQueryChange, SavedQueryDiff, SavedQuerySpecAndConfig};

/// Outcome of one change notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub removed: usize,
    pub added: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Sends subscribe/unsubscribe notifications when saved queries change.
///
/// Cache mutations are authoritative and synchronous; delivery is best
/// effort and runs on detached tasks.
pub struct Dispatcher {
    resolver: Arc<dyn RecipientResolver>,
    email: Arc<dyn EmailSender>,
    chat: Arc<dyn ChatSender>,
    links: SearchLinks,
}

impl Dispatcher {
    pub fn new(
        resolver: Arc<dyn RecipientResolver>,
        email: Arc<dyn EmailSender>,
        chat: Arc<dyn ChatSender>,
        links: SearchLinks,
    ) -> Self {
        Self {
            resolver,
            email,
            chat,
            links,
        }
    }

    /// Notify recipients who gained or lost a subscription between `old`
    /// and `new`. A recipient lookup failure aborts the whole change;
    /// individual delivery failures are logged and counted.
    pub async fn notify_change(
        &self,
        old: Option<&SavedQuerySpecAndConfig>,
        new: Option<&SavedQuerySpecAndConfig>,
    ) -> Result<DispatchReport, NotifyError> {
        let old_recipients = resolve(self.resolver.as_ref(), old).await?;
        let new_recipients = resolve(self.resolver.as_ref(), new).await?;

        let (removed, added) = diff_recipients(&old_recipients, &new_recipients);
        let removed_specs: Vec<_> = removed.iter().map(|r| r.spec).collect();
        let added_specs: Vec<_> = added.iter().map(|r| r.spec).collect();
        debug!(removed = ?removed_specs, added = ?added_specs, "notifying for saved search change");

        let mut report = DispatchReport {
            removed: removed.len(),
            added: added.len(),
            ..Default::default()
        };

        if let Some(old) = old {
            for recipient in &removed {
                self.deliver(recipient, old, Subscription::Unsubscribed, &mut report)
                    .await;
            }
        }
        if let Some(new) = new {
            for recipient in &added {
                self.deliver(recipient, new, Subscription::Subscribed, &mut report)
                    .await;
            }
        }

        Ok(report)
    }

    async fn deliver(
        &self,
        recipient: &Recipient,
        query: &SavedQuerySpecAndConfig,
        kind: Subscription,
        report: &mut DispatchReport,
    ) {
        if recipient.email {
            let message = email_message(kind, query, &self.links);
            match self.email.send_email(recipient, &message).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(recipient = %recipient.spec, ?kind, error = %e, "failed to send email notification");
                }
            }
        }
        if recipient.chat {
            let text = chat_message(kind, query, &self.links);
            match self.chat.send_chat(recipient, &text).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(recipient = %recipient.spec, ?kind, error = %e, "failed to send chat notification");
                }
            }
        }
    }

    /// Run `notify_change` on a detached task. Errors only reach the log.
    pub fn spawn_change(self: &Arc<Self>, change: SavedQueryChange) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            let result = dispatcher
                .notify_change(change.old.as_ref(), change.new.as_ref())
                .await;
            if let Err(e) = result {
                error!(query = change.query(), error = %e, "failed to handle saved search change");
            }
        })
    }

    /// Spawn one independent notification task per change in `diff`
    pub fn spawn_diff(self: &Arc<Self>, diff: SavedQueryDiff) -> Vec<JoinHandle<()>> {
        if !diff.is_empty() {
            debug!(
                deleted = diff.deleted.len(),
                created = diff.created.len(),
                updated = diff.updated.len(),
                "dispatching saved search notifications"
            );
        }
        diff.into_changes()
            .map(|change| self.spawn_change(change))
            .collect()
    }

    /// Send a test email to every current recipient, plus a chat message
    /// to those that accept chat.
    ///
    /// Stops at the first delivery failure. Returns how many recipients
    /// were notified.
    pub async fn send_test(&self, query: &SavedQuerySpecAndConfig) -> Result<usize, TestNotificationError> {
        let recipients = self
            .resolver
            .recipients(query)
            .await
            .map_err(TestNotificationError::Recipients)?;

        let message = email_message(Subscription::Subscribed, query, &self.links);
        let text = test_chat_message(query, &self.links);

        for recipient in &recipients {
            let delivery_error = |source| TestNotificationError::Delivery {
                recipient: recipient.spec,
                source,
            };
            self.email
                .send_email(recipient, &message)
                .await
                .map_err(delivery_error)?;
            // Email-only recipients have nowhere to receive chat
            if recipient.accepts_chat() {
                self.chat
                    .send_chat(recipient, &text)
                    .await
                    .map_err(delivery_error)?;
            }
        }

        info!(
            spec = %query.spec,
            recipients = recipients.len(),
            "saved query test notification sent"
        );
        Ok(recipients.len())
    }
}

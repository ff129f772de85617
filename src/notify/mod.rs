// src/notify/mod.rs
// Subscription change notifications

pub mod delivery;
pub mod dispatcher;
pub mod message;
pub mod recipients;

pub use delivery::{ChatSender, EmailSender, SlackNotifier};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use message::{EmailMessage, SearchLinks, Subscription, UtmSource};
pub use recipients::{diff_recipients, Recipient, RecipientResolver, RecipientSpec};

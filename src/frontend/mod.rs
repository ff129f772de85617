// src/frontend/mod.rs
// Access to the frontend, the source of truth for saved queries

pub mod client;

use async_trait::async_trait;

use crate::error::Result;
use crate::saved_query::SavedQuerySpecAndConfig;

pub use client::FrontendClient;

/// Authoritative store of saved query configurations
#[async_trait]
pub trait SavedQuerySource: Send + Sync {
    /// Every saved query configured for every user and org
    async fn list_all(&self) -> Result<Vec<SavedQuerySpecAndConfig>>;

    /// Drop stored result metadata for a query text
    async fn delete_info(&self, query: &str) -> Result<()>;
}

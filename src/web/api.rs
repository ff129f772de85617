// src/web/api.rs
// Frontend callback handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::saved_query::{
    batch_snapshots, diff_saved_queries, snapshot_from, ConfigSubjectAndConfig, SavedQueryIdSpec,
    Snapshot,
};
use crate::web::error::{ApiResult, IntoApiErrorOption};
use crate::web::state::AppState;

/// Payload of `POST /saved-query-was-created-or-updated`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQueryWasCreatedOrUpdatedArgs {
    pub subject_and_config: ConfigSubjectAndConfig,
    #[serde(default)]
    pub disable_subscription_notifications: bool,
}

/// Payload of `POST /saved-query-was-deleted`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQueryWasDeletedArgs {
    pub spec: SavedQueryIdSpec,
    #[serde(default)]
    pub disable_subscription_notifications: bool,
}

/// Payload of `POST /test-notification`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestNotificationArgs {
    pub spec: SavedQueryIdSpec,
}

// ═══════════════════════════════════════
// HEALTH
// ═══════════════════════════════════════

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    // While the initial load runs it holds the cache lock, so only the
    // readiness flag is consulted here.
    if !state.cache.is_ready() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "loading",
                "version": env!("CARGO_PKG_VERSION"),
                "ready": false,
            })),
        );
    }

    let total = state.cache.len().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "ready": true,
            "total_saved_queries": total,
        })),
    )
}

// ═══════════════════════════════════════
// SAVED QUERY CALLBACKS
// ═══════════════════════════════════════

pub async fn saved_query_was_created_or_updated(
    State(state): State<AppState>,
    payload: Result<Json<SavedQueryWasCreatedOrUpdatedArgs>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(args) = payload?;

    let pairs = state.cache.apply_subject_config(&args.subject_and_config).await;

    let (old, new) = batch_snapshots(pairs);
    let diff = diff_saved_queries(&old, &new);
    let changed = diff.len();

    if state.should_notify(args.disable_subscription_notifications) {
        state.dispatcher.spawn_diff(diff);
    }

    let total = state.cache.len().await;
    info!(
        subject = %args.subject_and_config.subject,
        changed,
        total_saved_queries = total,
        "saved query created or updated"
    );
    Ok(Json(json!({ "ok": true, "changed": changed })))
}

pub async fn saved_query_was_deleted(
    State(state): State<AppState>,
    payload: Result<Json<SavedQueryWasDeletedArgs>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(args) = payload?;

    let Some(removal) = state.cache.apply_delete(&args.spec).await else {
        return Ok(Json(json!({ "ok": true, "deleted": false })));
    };
    let query = removal.removed.config.query.clone();

    if state.should_notify(args.disable_subscription_notifications) {
        let old = snapshot_from([removal.removed]);
        state
            .dispatcher
            .spawn_diff(diff_saved_queries(&old, &Snapshot::new()));
    }

    // The cache change is already committed; a failed cleanup is only logged.
    if !removal.query_still_referenced {
        if let Err(e) = state.source.delete_info(&query).await {
            error!(query = %query, error = %e, "failed to delete saved query info from frontend");
        }
    }

    let total = state.cache.len().await;
    info!(spec = %args.spec, total_saved_queries = total, "saved query deleted");
    Ok(Json(json!({ "ok": true, "deleted": true })))
}

pub async fn test_notification(
    State(state): State<AppState>,
    payload: Result<Json<TestNotificationArgs>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(args) = payload?;

    let query = state
        .cache
        .get(&args.spec)
        .await
        .ok_or_not_found(format!("no saved search found with key {:?}", args.spec.cache_key()))?;

    let recipients = state.dispatcher.send_test(&query).await?;
    Ok(Json(json!({ "ok": true, "recipients": recipients })))
}

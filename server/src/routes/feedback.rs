use super::{blocking, flag};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validation::{FeedbackRequest, StatusUpdateRequest},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header::USER_AGENT, HeaderMap},
    Json,
};
use minifi_core::feedback::{FeedbackFilter, FeedbackKind, FeedbackStats};
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    let feedback = request.validate(agent).map_err(ApiError::BadRequest)?;

    let store = state
        .store
        .as_ref()
        .ok_or(ApiError::NotConfigured("Submission failed"))?;
    let record = blocking(store, "Submission failed", move |s| s.submit_feedback(&feedback)).await?;

    if let Err(e) = state.notifier.feedback_received(&record).await {
        log::warn!("[feedback] webhook failed for {}: {e}", record.id);
    }

    let preview: String = record.message.chars().take(50).collect();
    log::info!("[feedback] new {} feedback {}: {preview}", record.kind, record.id);

    Ok(Json(json!({
        "success": true,
        "message": "Thank you for your feedback! 🙏",
        "feedbackId": record.id,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    kind:  Option<String>,
    limit: Option<usize>,
    stats: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let kind = match query.kind.as_deref().filter(|k| !k.is_empty()) {
        Some(raw) => Some(
            raw.parse::<FeedbackKind>()
                .map_err(|_| ApiError::bad_request("Invalid feedback type"))?,
        ),
        None => None,
    };
    let stats_only = flag(&query.stats);

    let Some(store) = state.store.as_ref() else {
        log::warn!("[feedback] datastore not configured; returning empty results");
        let mut body = json!({
            "success": true,
            "stats": FeedbackStats::default(),
            "datastoreConfigured": false,
        });
        if !stats_only {
            body["recent"] = json!([]);
        }
        return Ok(Json(body));
    };

    if stats_only {
        let stats = blocking(store, "Could not load feedback", |s| s.feedback_stats()).await?;
        return Ok(Json(json!({
            "success": true,
            "stats": stats,
            "datastoreConfigured": true,
        })));
    }

    let filter = FeedbackFilter {
        kind,
        limit: query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        ..FeedbackFilter::default()
    };
    let (stats, recent) = blocking(store, "Could not load feedback", move |s| {
        Ok((s.feedback_stats()?, s.list_feedback(&filter)?))
    })
    .await?;

    Ok(Json(json!({
        "success": true,
        "stats": stats,
        "recent": recent,
        "datastoreConfigured": true,
    })))
}

pub async fn update_status(
    State(state): State<AppState>,
    body: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let (id, status) = request.validate().map_err(ApiError::BadRequest)?;

    let store = state
        .store
        .as_ref()
        .ok_or(ApiError::NotConfigured("Update failed"))?;
    let target = id.clone();
    let updated = blocking(store, "Update failed", move |s| {
        s.update_feedback_status(&target, status)
    })
    .await?;

    if updated {
        log::info!("[feedback] {id} marked {}", status.as_str());
    }
    Ok(Json(json!({
        "success": updated,
        "message": if updated { "Status updated" } else { "Update failed" },
    })))
}

use super::{blocking, flag};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validation::{normalize_email, SubscribeRequest},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use minifi_core::lead::{LeadFilter, LeadStats, SubscribeOutcome};
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn subscribe(
    State(state): State<AppState>,
    body: Result<Json<SubscribeRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let subscription = request.validate().map_err(ApiError::BadRequest)?;

    let store = state
        .store
        .as_ref()
        .ok_or(ApiError::NotConfigured("Subscription failed"))?;
    let (lead, outcome) = blocking(store, "Subscription failed", move |s| {
        s.subscribe(
            &subscription.email,
            subscription.first_name.as_deref(),
            &subscription.source,
        )
    })
    .await?;

    // Announce and welcome only addresses that were not already on the list.
    if outcome != SubscribeOutcome::AlreadySubscribed {
        if let Err(e) = state.notifier.new_subscriber(&lead).await {
            log::warn!("[newsletter] chat webhook failed: {e}");
        }
        if let Err(e) = state.notifier.welcome_message(&lead).await {
            log::warn!("[newsletter] welcome message failed: {e}");
        }
    }
    log::info!("[newsletter] {} ({outcome:?}) via {}", lead.email, lead.source);

    Ok(Json(json!({
        "success": true,
        "message": "Successfully subscribed! Welcome to Mini.Fi 🎉",
        "subscriber": {
            "email": lead.email,
            "subscribedAt": lead.subscribed_at,
        },
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    email: Option<String>,
    stats: Option<String>,
}

pub async fn status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let configured = state.datastore_configured();

    if flag(&query.stats) {
        let stats = lead_stats(&state).await?;
        return Ok(Json(json!({
            "success": true,
            "stats": stats,
            "datastoreConfigured": configured,
        })));
    }

    if let Some(raw) = query.email.as_deref().filter(|e| !e.trim().is_empty()) {
        let email = normalize_email(raw).map_err(ApiError::BadRequest)?;
        let subscribed = match state.store.as_ref() {
            Some(store) => {
                let filter = LeadFilter {
                    email: Some(email.clone()),
                    limit: Some(1),
                    ..LeadFilter::default()
                };
                blocking(store, "Could not load subscribers", move |s| s.list_leads(&filter))
                    .await?
                    .first()
                    .is_some_and(|lead| lead.is_subscribed())
            }
            None => false,
        };
        return Ok(Json(json!({
            "success": true,
            "email": email,
            "isSubscribed": subscribed,
            "datastoreConfigured": configured,
        })));
    }

    let stats = lead_stats(&state).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Newsletter API is running",
        "totalSubscribers": stats.total,
        "activeSubscribers": stats.subscribed,
        "datastoreConfigured": configured,
    })))
}

async fn lead_stats(state: &AppState) -> ApiResult<LeadStats> {
    match state.store.as_ref() {
        Some(store) => blocking(store, "Could not load subscribers", |s| s.lead_stats()).await,
        None => Ok(LeadStats::default()),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UnsubscribeQuery {
    email: Option<String>,
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    query: Result<Query<UnsubscribeQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let email = normalize_email(query.email.as_deref().unwrap_or_default())
        .map_err(ApiError::BadRequest)?;

    let store = state
        .store
        .as_ref()
        .ok_or(ApiError::NotConfigured("Unsubscribe failed"))?;
    let target = email.clone();
    let removed = blocking(store, "Unsubscribe failed", move |s| s.unsubscribe(&target)).await?;
    if removed {
        log::info!("[newsletter] {email} unsubscribed");
    } else {
        log::debug!("[newsletter] unsubscribe for unknown address {email}");
    }

    Ok(Json(json!({
        "success": true,
        "message": "Successfully unsubscribed",
    })))
}

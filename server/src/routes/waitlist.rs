use super::blocking;
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    validation::{invalid_feature_message, normalize_email, WaitlistRequest},
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use minifi_core::waitlist::{is_waitlist_feature, JoinOutcome, WAITLIST_FEATURES};
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn join(
    State(state): State<AppState>,
    body: Result<Json<WaitlistRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let (email, feature) = request.validate().map_err(ApiError::BadRequest)?;

    let store = state
        .store
        .as_ref()
        .ok_or(ApiError::NotConfigured("Failed to join waitlist"))?;
    let signup = blocking(store, "Failed to join waitlist", move |s| {
        s.join_waitlist(&email, &feature)
    })
    .await?;

    let entry = &signup.entry;
    let message = match signup.outcome {
        JoinOutcome::AlreadyListed => {
            format!("You're already on the waitlist for {}!", entry.feature)
        }
        JoinOutcome::Joined => {
            if let Err(e) = state.notifier.waitlist_signup(&signup).await {
                log::warn!("[waitlist] chat webhook failed: {e}");
            }
            log::info!("[waitlist] {} joined {} at #{}", entry.email, entry.feature, signup.position);
            format!(
                "You're #{} on the waitlist for {}! We'll notify you when it's ready.",
                signup.position, entry.feature
            )
        }
    };

    Ok(Json(json!({
        "success": true,
        "message": message,
        "position": signup.position,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    feature: Option<String>,
    email:   Option<String>,
}

pub async fn status(
    State(state): State<AppState>,
    query: Result<Query<StatusQuery>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let feature = query.feature.filter(|f| !f.trim().is_empty());
    let email = query.email.filter(|e| !e.trim().is_empty());
    if let Some(f) = feature.as_deref() {
        if !is_waitlist_feature(f) {
            return Err(ApiError::BadRequest(invalid_feature_message()));
        }
    }

    let Some(store) = state.store.as_ref() else {
        return Ok(Json(json!({
            "success": true,
            "features": WAITLIST_FEATURES,
            "message": "Waitlist API is running",
            "datastoreConfigured": false,
        })));
    };

    match (feature, email) {
        (Some(feature), Some(raw)) => {
            let email = normalize_email(&raw).map_err(ApiError::BadRequest)?;
            let lookup = feature.clone();
            let position = blocking(store, "Could not load waitlist", move |s| {
                s.waitlist_position(&email, &lookup)
            })
            .await?;
            let mut body = json!({
                "success": true,
                "onWaitlist": position.is_some(),
                "feature": feature,
                "datastoreConfigured": true,
            });
            if let Some(position) = position {
                body["position"] = json!(position);
            }
            Ok(Json(body))
        }
        (Some(feature), None) => {
            let stats = blocking(store, "Could not load waitlist", |s| s.waitlist_stats()).await?;
            Ok(Json(json!({
                "success": true,
                "feature": feature,
                "count": stats.get(&feature).copied().unwrap_or(0),
                "datastoreConfigured": true,
            })))
        }
        (None, _) => {
            let stats = blocking(store, "Could not load waitlist", |s| s.waitlist_stats()).await?;
            Ok(Json(json!({
                "success": true,
                "features": WAITLIST_FEATURES,
                "stats": stats,
                "datastoreConfigured": true,
            })))
        }
    }
}

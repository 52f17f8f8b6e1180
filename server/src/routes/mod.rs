use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{
    routing::{get, post},
    Json, Router,
};
use minifi_core::{CoreError, CoreResult, Datastore};
use serde_json::{json, Value};
use std::sync::Arc;

mod feedback;
mod league;
mod newsletter;
mod rewards;
mod streak;
mod waitlist;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/feedback",
            post(feedback::submit)
                .get(feedback::list)
                .patch(feedback::update_status),
        )
        .route(
            "/api/newsletter/subscribe",
            post(newsletter::subscribe)
                .get(newsletter::status)
                .delete(newsletter::unsubscribe),
        )
        .route(
            "/api/waitlist",
            post(waitlist::join).get(waitlist::status),
        )
        .route("/api/onboarding/complete", post(rewards::onboard))
        .route("/api/rewards", get(rewards::summary))
        .route("/api/rewards/apply", post(rewards::apply))
        .route("/api/streak", get(streak::status).post(streak::claim))
        .route("/api/league/standings", get(league::standings))
        .with_state(state)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}

/// Query flags arrive as strings; only the literal `true` switches them on.
fn flag(value: &Option<String>) -> bool {
    value.as_deref() == Some("true")
}

/// Run a datastore call on the blocking pool. SQLite work holds the
/// connection mutex and touches disk, so it stays off the async workers.
/// `failure` is the client-facing message if the call or its task fails.
async fn blocking<T, F>(store: &Arc<dyn Datastore>, failure: &'static str, call: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Datastore) -> CoreResult<T> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || call(store.as_ref()))
        .await
        .map_err(|e| ApiError::Persistence {
            message: failure,
            source:  CoreError::Other(anyhow::anyhow!("join error: {e}")),
        })?
        .map_err(ApiError::persistence(failure))
}

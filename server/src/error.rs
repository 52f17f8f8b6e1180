use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use minifi_core::CoreError;
use serde_json::json;
use thiserror::Error;

/// Errors a route can answer with. Every variant renders as
/// `{"success": false, "message": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Validation failure. The message goes back to the client verbatim.
    #[error("{0}")]
    BadRequest(String),

    /// No datastore is configured. Carries the client-facing message.
    #[error("{0} (datastore not configured)")]
    NotConfigured(&'static str),

    /// The datastore call failed. Details are logged, not returned.
    #[error("{message}: {source}")]
    Persistence {
        message: &'static str,
        #[source]
        source: CoreError,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn persistence(message: &'static str) -> impl FnOnce(CoreError) -> Self {
        move |source| Self::Persistence { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) | Self::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::BadRequest(message) => message.clone(),
            Self::NotConfigured(message) => (*message).to_string(),
            Self::Persistence { message, .. } => (*message).to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::BadRequest(message) => log::debug!("[api] rejected: {message}"),
            Self::NotConfigured(_) => log::warn!("[api] {self}"),
            Self::Persistence { .. } => log::error!("[api] {self}"),
        }
        let body = json!({ "success": false, "message": self.client_message() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        log::debug!("[api] unreadable body: {rejection}");
        Self::bad_request("Invalid request body")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        log::debug!("[api] unreadable query: {rejection}");
        Self::bad_request("Invalid query parameters")
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

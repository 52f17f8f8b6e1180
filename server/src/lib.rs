//! HTTP surface for Mini.Fi: feedback and newsletter intake plus the
//! reward and league endpoints.
//!
//! Every route follows the same shape: parse, validate (400), persist
//! through the datastore, notify best-effort, answer with a
//! `{success, message, ...}` envelope.

pub mod config;
pub mod error;
pub mod notify;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use notify::Notifier;
pub use routes::app;
pub use state::AppState;

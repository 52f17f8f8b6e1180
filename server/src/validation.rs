//! Request validation and text sanitising.
//!
//! Validators return the first failing rule's message; handlers answer
//! 400 with it and never touch the datastore.

use minifi_core::{
    feedback::{FeedbackKind, FeedbackStatus, NewFeedback},
    waitlist::{is_waitlist_feature, WAITLIST_FEATURES},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

pub const MAX_MESSAGE_LEN: usize = 2000;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_SOURCE_LEN: usize = 50;
pub const MAX_PAGE_CONTEXT_LEN: usize = 100;
pub const DEFAULT_SOURCE: &str = "website";

// Literal patterns, forced by `every_pattern_compiles` below.
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static JAVASCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript:").expect("javascript pattern"));
static HANDLERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)on\w+\s*=").expect("handler pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Strip markup and script vectors, collapse whitespace, cap the length.
pub fn sanitize_text(input: &str, max_len: usize) -> String {
    let truncated: String = input.trim().chars().take(max_len).collect();
    let text = TAGS.replace_all(&truncated, "");
    let text = JAVASCRIPT.replace_all(&text, "");
    let text = HANDLERS.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Trim and lower-case, then check length and shape.
pub fn normalize_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err("Email is required".into());
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err("Email too long".into());
    }
    if !is_valid_email(&email) {
        return Err("Invalid email address".into());
    }
    Ok(email)
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ── Feedback ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(rename = "type")]
    pub kind:         Option<String>,
    pub message:      Option<String>,
    pub rating:       Option<f64>,
    pub page_context: Option<String>,
    pub user_agent:   Option<String>,
    pub email:        Option<String>,
}

impl FeedbackRequest {
    /// `fallback_agent` is used when the body carries no user agent.
    pub fn validate(self, fallback_agent: Option<&str>) -> Result<NewFeedback, String> {
        let kind = blank_to_none(self.kind.as_deref());
        let message = blank_to_none(self.message.as_deref());
        let (Some(kind), Some(message)) = (kind, message) else {
            return Err("Type and message are required".into());
        };

        let kind: FeedbackKind = kind.parse().map_err(|_| "Invalid feedback type".to_string())?;

        let rating = match self.rating {
            None => None,
            Some(r) if r.fract() == 0.0 && (1.0..=5.0).contains(&r) => Some(r as u8),
            Some(_) => return Err("Rating must be between 1 and 5".into()),
        };

        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err("Message too long".into());
        }
        let message = sanitize_text(message, MAX_MESSAGE_LEN);
        if message.is_empty() {
            return Err("Type and message are required".into());
        }

        let email = match blank_to_none(self.email.as_deref()) {
            Some(raw) => Some(normalize_email(raw)?),
            None => None,
        };

        let page_context = blank_to_none(self.page_context.as_deref())
            .map(|p| sanitize_text(p, MAX_PAGE_CONTEXT_LEN))
            .unwrap_or_else(|| "unknown".to_string());

        let user_agent = blank_to_none(self.user_agent.as_deref())
            .or(blank_to_none(fallback_agent))
            .map(str::to_string);

        Ok(NewFeedback {
            kind,
            message,
            rating,
            page_context,
            user_agent,
            email,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateRequest {
    pub id:     Option<String>,
    pub status: Option<String>,
}

impl StatusUpdateRequest {
    pub fn validate(self) -> Result<(String, FeedbackStatus), String> {
        let id = blank_to_none(self.id.as_deref());
        let status = blank_to_none(self.status.as_deref());
        let (Some(id), Some(status)) = (id, status) else {
            return Err("ID and status are required".into());
        };
        let status: FeedbackStatus = status.parse().map_err(|_| "Invalid status".to_string())?;
        Ok((id.to_string(), status))
    }
}

// ── Newsletter ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub email:      Option<String>,
    pub first_name: Option<String>,
    pub source:     Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub email:      String,
    pub first_name: Option<String>,
    pub source:     String,
}

impl SubscribeRequest {
    pub fn validate(self) -> Result<Subscription, String> {
        let email = normalize_email(self.email.as_deref().unwrap_or_default())?;

        let first_name = match blank_to_none(self.first_name.as_deref()) {
            Some(name) if name.chars().count() > MAX_NAME_LEN => {
                return Err("First name too long".into());
            }
            Some(name) => Some(sanitize_text(name, MAX_NAME_LEN)).filter(|n| !n.is_empty()),
            None => None,
        };

        let source = match blank_to_none(self.source.as_deref()) {
            Some(source) if source.chars().count() > MAX_SOURCE_LEN => {
                return Err("Source too long".into());
            }
            Some(source) => source.to_string(),
            None => DEFAULT_SOURCE.to_string(),
        };

        Ok(Subscription {
            email,
            first_name,
            source,
        })
    }
}

// ── Waitlist ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WaitlistRequest {
    pub email:   Option<String>,
    pub feature: Option<String>,
}

impl WaitlistRequest {
    /// Returns the normalised email and the feature slug.
    pub fn validate(self) -> Result<(String, String), String> {
        let email = normalize_email(self.email.as_deref().unwrap_or_default())?;
        match blank_to_none(self.feature.as_deref()) {
            Some(feature) if is_waitlist_feature(feature) => Ok((email, feature.to_string())),
            _ => Err(invalid_feature_message()),
        }
    }
}

pub fn invalid_feature_message() -> String {
    format!("Invalid feature. Valid options: {}", WAITLIST_FEATURES.join(", "))
}

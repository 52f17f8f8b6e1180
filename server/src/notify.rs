//! Best-effort outbound webhooks.
//!
//! A chat webhook (Discord-style embeds) announces new feedback and new
//! subscribers and waitlist signups. A templated messaging webhook sends the welcome message.
//! Any target left unconfigured is skipped. Callers log failures and
//! carry on; a failed notification never fails a request.

use chrono::Utc;
use minifi_core::{feedback::FeedbackRecord, lead::Lead, waitlist::WaitlistSignup};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const EMBED_DESCRIPTION_LIMIT: usize = 500;
const FEEDBACK_FOOTER: &str = "Mini.Fi Feedback";
const SUBSCRIBER_COLOR: u32 = 0x00ff88;
const WAITLIST_COLOR: u32 = 0x9b59b6;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook answered HTTP {0}")]
    Status(u16),
}

/// Where the templated messaging webhook lives.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagingTarget {
    pub url:     String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    client:        reqwest::Client,
    chat_url:      Option<String>,
    feedback_url:  Option<String>,
    messaging:     Option<MessagingTarget>,
}

impl Notifier {
    pub fn new(
        chat_url: Option<String>,
        feedback_url: Option<String>,
        messaging: Option<MessagingTarget>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            chat_url,
            feedback_url,
            messaging,
        }
    }

    /// A notifier with every target unconfigured.
    pub fn disabled() -> Self {
        Self::new(None, None, None)
    }

    /// Feedback goes to the dedicated feedback hook when set, else the general one.
    fn feedback_target(&self) -> Option<&str> {
        self.feedback_url.as_deref().or(self.chat_url.as_deref())
    }

    pub async fn feedback_received(&self, record: &FeedbackRecord) -> Result<(), NotifyError> {
        let Some(url) = self.feedback_target() else {
            log::debug!("[notify] no feedback webhook configured");
            return Ok(());
        };
        self.post(url, None, &feedback_embed(record)).await
    }

    pub async fn new_subscriber(&self, lead: &Lead) -> Result<(), NotifyError> {
        let Some(url) = self.chat_url.as_deref() else {
            log::debug!("[notify] no chat webhook configured");
            return Ok(());
        };
        self.post(url, None, &subscriber_embed(lead)).await
    }

    pub async fn waitlist_signup(&self, signup: &WaitlistSignup) -> Result<(), NotifyError> {
        let Some(url) = self.chat_url.as_deref() else {
            log::debug!("[notify] no chat webhook configured");
            return Ok(());
        };
        self.post(url, None, &waitlist_embed(signup)).await
    }

    pub async fn welcome_message(&self, lead: &Lead) -> Result<(), NotifyError> {
        let Some(target) = &self.messaging else {
            log::debug!("[notify] no messaging webhook configured");
            return Ok(());
        };
        let payload = json!({
            "template": "welcome",
            "to": lead.email,
            "variables": {
                "firstName": lead.first_name,
                "source": lead.source,
            },
        });
        self.post(&target.url, target.api_key.as_deref(), &payload).await
    }

    async fn post(&self, url: &str, bearer: Option<&str>, payload: &Value) -> Result<(), NotifyError> {
        let mut request = self.client.post(url).json(payload);
        if let Some(key) = bearer {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn feedback_embed(record: &FeedbackRecord) -> Value {
    let rating = record
        .rating
        .map(|r| "⭐".repeat(usize::from(r)))
        .unwrap_or_else(|| "N/A".to_string());
    json!({
        "embeds": [{
            "title": format!(
                "{} New {} Feedback",
                record.kind.emoji(),
                capitalize(record.kind.as_str())
            ),
            "description": truncate(&record.message, EMBED_DESCRIPTION_LIMIT),
            "color": record.kind.color(),
            "fields": [
                { "name": "Rating", "value": rating, "inline": true },
                { "name": "Page", "value": record.page_context, "inline": true },
                { "name": "ID", "value": record.id, "inline": true },
            ],
            "timestamp": Utc::now().to_rfc3339(),
            "footer": { "text": FEEDBACK_FOOTER },
        }]
    })
}

pub fn subscriber_embed(lead: &Lead) -> Value {
    json!({
        "embeds": [{
            "title": "📧 New Newsletter Subscriber!",
            "color": SUBSCRIBER_COLOR,
            "fields": [
                { "name": "Email", "value": lead.email, "inline": true },
                {
                    "name": "Name",
                    "value": lead.first_name.as_deref().unwrap_or("Not provided"),
                    "inline": true
                },
                { "name": "Source", "value": lead.source, "inline": true },
            ],
            "timestamp": Utc::now().to_rfc3339(),
        }]
    })
}

pub fn waitlist_embed(signup: &WaitlistSignup) -> Value {
    json!({
        "embeds": [{
            "title": "🎯 New Waitlist Signup!",
            "color": WAITLIST_COLOR,
            "fields": [
                { "name": "Email", "value": signup.entry.email, "inline": true },
                { "name": "Feature", "value": signup.entry.feature, "inline": true },
                { "name": "Position", "value": format!("#{}", signup.position), "inline": true },
            ],
            "timestamp": Utc::now().to_rfc3339(),
        }]
    })
}

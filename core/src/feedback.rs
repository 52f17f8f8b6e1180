//! Feedback records submitted through the in-app widget.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Love,
    Idea,
    Issue,
    Bug,
    General,
}

impl FeedbackKind {
    pub const ALL: [FeedbackKind; 5] = [
        Self::Love,
        Self::Idea,
        Self::Issue,
        Self::Bug,
        Self::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Love    => "love",
            Self::Idea    => "idea",
            Self::Issue   => "issue",
            Self::Bug     => "bug",
            Self::General => "general",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Love    => "💖",
            Self::Idea    => "💡",
            Self::Issue   => "🐛",
            Self::Bug     => "🪲",
            Self::General => "💬",
        }
    }

    /// Embed colour for chat notifications.
    pub fn color(&self) -> u32 {
        match self {
            Self::Love    => 0xff69b4,
            Self::Idea    => 0xffa500,
            Self::Issue   => 0xff4444,
            Self::Bug     => 0xcc0000,
            Self::General => 0x00bfff,
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown feedback kind '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    #[default]
    New,
    Reviewed,
    Actioned,
    Archived,
}

impl FeedbackStatus {
    pub const ALL: [FeedbackStatus; 4] = [Self::New, Self::Reviewed, Self::Actioned, Self::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New      => "new",
            Self::Reviewed => "reviewed",
            Self::Actioned => "actioned",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| format!("unknown feedback status '{s}'"))
    }
}

/// Validated feedback ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub kind:         FeedbackKind,
    pub message:      String,
    pub rating:       Option<u8>,
    pub page_context: String,
    pub user_agent:   Option<String>,
    pub email:        Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackRecord {
    pub id:           String,
    #[serde(rename = "type")]
    pub kind:         FeedbackKind,
    pub message:      String,
    pub rating:       Option<u8>,
    pub page_context: String,
    pub user_agent:   Option<String>,
    pub email:        Option<String>,
    pub status:       FeedbackStatus,
    pub created_at:   String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackFilter {
    pub kind:   Option<FeedbackKind>,
    pub status: Option<FeedbackStatus>,
    pub limit:  usize,
}

impl Default for FeedbackFilter {
    fn default() -> Self {
        Self {
            kind:   None,
            status: None,
            limit:  10,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStats {
    pub total:      u64,
    pub by_type:    BTreeMap<String, u64>,
    /// Mean of submitted ratings, 0 when none were given.
    pub avg_rating: f64,
}

//! Newsletter leads.
//!
//! Emails are stored lower-cased; one row per address. Re-subscribing an
//! unsubscribed address flips it back rather than inserting a new row.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Subscribed,
    Unsubscribed,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscribed   => "subscribed",
            Self::Unsubscribed => "unsubscribed",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscribed" => Ok(Self::Subscribed),
            "unsubscribed" => Ok(Self::Unsubscribed),
            other => Err(format!("unknown lead status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id:            String,
    pub email:         String,
    pub first_name:    Option<String>,
    pub source:        String,
    pub status:        LeadStatus,
    pub subscribed_at: String,
    pub updated_at:    String,
}

impl Lead {
    pub fn is_subscribed(&self) -> bool {
        self.status == LeadStatus::Subscribed
    }
}

/// What `subscribe` did with the address.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeOutcome {
    Created,
    Resubscribed,
    AlreadySubscribed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilter {
    pub email:  Option<String>,
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
    pub limit:  Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadStats {
    pub total:      u64,
    pub subscribed: u64,
    pub by_source:  BTreeMap<String, u64>,
}

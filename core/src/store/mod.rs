//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Route handlers go through the `Datastore` trait; they never execute
//! SQL directly. The connection sits behind a mutex and every call holds
//! it for one statement (or one short read-then-write).

use crate::{
    error::{CoreError, CoreResult},
    feedback::{FeedbackFilter, FeedbackRecord, FeedbackStats, FeedbackStatus, NewFeedback},
    lead::{Lead, LeadFilter, LeadStats, SubscribeOutcome},
    profile::PlayerProfile,
    waitlist::{WaitlistSignup, WaitlistStats},
};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

mod feedback;
mod leads;
mod profile;
mod waitlist;

/// The persistence collaborator behind the API routes.
pub trait Datastore: Send + Sync {
    fn submit_feedback(&self, feedback: &NewFeedback) -> CoreResult<FeedbackRecord>;
    fn list_feedback(&self, filter: &FeedbackFilter) -> CoreResult<Vec<FeedbackRecord>>;
    fn feedback_stats(&self) -> CoreResult<FeedbackStats>;
    /// Returns false when no feedback has that id.
    fn update_feedback_status(&self, id: &str, status: FeedbackStatus) -> CoreResult<bool>;

    /// `email` must already be normalised (trimmed, lower-cased).
    fn subscribe(
        &self,
        email: &str,
        first_name: Option<&str>,
        source: &str,
    ) -> CoreResult<(Lead, SubscribeOutcome)>;
    /// Returns false when the address was never subscribed.
    fn unsubscribe(&self, email: &str) -> CoreResult<bool>;
    fn list_leads(&self, filter: &LeadFilter) -> CoreResult<Vec<Lead>>;
    fn lead_stats(&self) -> CoreResult<LeadStats>;

    /// `feature` must already be validated against the feature list.
    fn join_waitlist(&self, email: &str, feature: &str) -> CoreResult<WaitlistSignup>;
    /// None when the address is not on that feature's waitlist.
    fn waitlist_position(&self, email: &str, feature: &str) -> CoreResult<Option<u64>>;
    fn waitlist_stats(&self) -> CoreResult<WaitlistStats>;

    fn save_profile(&self, profile: &PlayerProfile) -> CoreResult<()>;
    fn load_profile(&self, player_id: &str) -> CoreResult<Option<PlayerProfile>>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> CoreResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> CoreResult<Self> {
        let conn = Connection::open(":memory:")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open and migrate in one step.
    pub fn open_migrated(path: &str) -> CoreResult<Self> {
        let store = Self::open(path)?;
        store.migrate()?;
        Ok(store)
    }

    /// Apply all schema migrations in order. Safe to run repeatedly.
    pub fn migrate(&self) -> CoreResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(include_str!("../../../migrations/001_feedback.sql"))?;
        conn.execute_batch(include_str!("../../../migrations/002_leads.sql"))?;
        conn.execute_batch(include_str!("../../../migrations/003_profiles.sql"))?;
        conn.execute_batch(include_str!("../../../migrations/004_waitlist.sql"))?;
        Ok(())
    }

    fn conn(&self) -> CoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CoreError::Other(anyhow::anyhow!("database connection lock poisoned")))
    }
}

impl Datastore for SqliteStore {
    fn submit_feedback(&self, feedback: &NewFeedback) -> CoreResult<FeedbackRecord> {
        self.insert_feedback(feedback)
    }

    fn list_feedback(&self, filter: &FeedbackFilter) -> CoreResult<Vec<FeedbackRecord>> {
        self.query_feedback(filter)
    }

    fn feedback_stats(&self) -> CoreResult<FeedbackStats> {
        self.compute_feedback_stats()
    }

    fn update_feedback_status(&self, id: &str, status: FeedbackStatus) -> CoreResult<bool> {
        self.set_feedback_status(id, status)
    }

    fn subscribe(
        &self,
        email: &str,
        first_name: Option<&str>,
        source: &str,
    ) -> CoreResult<(Lead, SubscribeOutcome)> {
        self.upsert_lead(email, first_name, source)
    }

    fn unsubscribe(&self, email: &str) -> CoreResult<bool> {
        self.mark_unsubscribed(email)
    }

    fn list_leads(&self, filter: &LeadFilter) -> CoreResult<Vec<Lead>> {
        self.query_leads(filter)
    }

    fn lead_stats(&self) -> CoreResult<LeadStats> {
        self.compute_lead_stats()
    }

    fn join_waitlist(&self, email: &str, feature: &str) -> CoreResult<WaitlistSignup> {
        self.insert_waitlist(email, feature)
    }

    fn waitlist_position(&self, email: &str, feature: &str) -> CoreResult<Option<u64>> {
        self.query_waitlist_position(email, feature)
    }

    fn waitlist_stats(&self) -> CoreResult<WaitlistStats> {
        self.compute_waitlist_stats()
    }

    fn save_profile(&self, profile: &PlayerProfile) -> CoreResult<()> {
        self.write_profile(profile)
    }

    fn load_profile(&self, player_id: &str) -> CoreResult<Option<PlayerProfile>> {
        self.read_profile(player_id)
    }
}

/// Read a text column into one of the domain enums.
fn parse_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

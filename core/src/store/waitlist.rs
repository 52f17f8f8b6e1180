use super::{timestamp, SqliteStore};
use crate::{
    error::CoreResult,
    lead::LeadStatus,
    waitlist::{JoinOutcome, WaitlistEntry, WaitlistSignup, WaitlistStats, WAITLIST_FEATURES},
};
use rusqlite::{params, Connection, OptionalExtension};

const WAITLIST_COLUMNS: &str = "id, email, feature, created_at";

fn waitlist_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<WaitlistEntry> {
    Ok(WaitlistEntry {
        id:         row.get(0)?,
        email:      row.get(1)?,
        feature:    row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// Signups for the entry's feature up to and including the entry itself.
fn position_of(conn: &Connection, entry: &WaitlistEntry) -> CoreResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM waitlist
         WHERE feature = ?1
           AND rowid <= (SELECT rowid FROM waitlist WHERE id = ?2)",
        params![&entry.feature, &entry.id],
        |row| row.get(0),
    )?;
    Ok(count.max(1) as u64)
}

fn find_entry(conn: &Connection, email: &str, feature: &str) -> CoreResult<Option<WaitlistEntry>> {
    conn.query_row(
        &format!("SELECT {WAITLIST_COLUMNS} FROM waitlist WHERE email = ?1 AND feature = ?2"),
        params![email, feature],
        waitlist_row_mapper,
    )
    .optional()
    .map_err(Into::into)
}

impl SqliteStore {
    // ── Waitlist ───────────────────────────────────────────────────

    /// Add the address to a feature's waitlist, or report where it already
    /// stands. A new signup also records the address as a lead when it is
    /// not one yet; existing leads (including unsubscribed ones) are left alone.
    pub fn insert_waitlist(&self, email: &str, feature: &str) -> CoreResult<WaitlistSignup> {
        let email = email.trim().to_lowercase();
        let conn = self.conn()?;

        if let Some(entry) = find_entry(&conn, &email, feature)? {
            let position = position_of(&conn, &entry)?;
            return Ok(WaitlistSignup {
                entry,
                position,
                outcome: JoinOutcome::AlreadyListed,
            });
        }

        let now = timestamp();
        let entry = WaitlistEntry {
            id:         uuid::Uuid::new_v4().to_string(),
            email,
            feature:    feature.to_string(),
            created_at: now.clone(),
        };
        conn.execute(
            &format!("INSERT INTO waitlist ({WAITLIST_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
            params![&entry.id, &entry.email, &entry.feature, &entry.created_at],
        )?;
        conn.execute(
            "INSERT INTO leads (id, email, first_name, source, status, subscribed_at, updated_at)
             VALUES (?1, ?2, NULL, ?3, ?4, ?5, ?5)
             ON CONFLICT(email) DO NOTHING",
            params![
                uuid::Uuid::new_v4().to_string(),
                &entry.email,
                format!("waitlist-{feature}"),
                LeadStatus::Subscribed.as_str(),
                &now,
            ],
        )?;

        let position = position_of(&conn, &entry)?;
        Ok(WaitlistSignup {
            entry,
            position,
            outcome: JoinOutcome::Joined,
        })
    }

    pub fn query_waitlist_position(&self, email: &str, feature: &str) -> CoreResult<Option<u64>> {
        let email = email.trim().to_lowercase();
        let conn = self.conn()?;
        match find_entry(&conn, &email, feature)? {
            Some(entry) => Ok(Some(position_of(&conn, &entry)?)),
            None => Ok(None),
        }
    }

    pub fn compute_waitlist_stats(&self) -> CoreResult<WaitlistStats> {
        let conn = self.conn()?;
        let mut stats: WaitlistStats = WAITLIST_FEATURES
            .iter()
            .map(|f| (f.to_string(), 0))
            .collect();

        let mut stmt = conn.prepare("SELECT feature, COUNT(*) FROM waitlist GROUP BY feature")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (feature, count) = row?;
            stats.insert(feature, count as u64);
        }
        Ok(stats)
    }
}

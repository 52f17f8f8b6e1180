use super::{parse_column, timestamp, SqliteStore};
use crate::{
    error::CoreResult,
    lead::{Lead, LeadFilter, LeadStats, LeadStatus, SubscribeOutcome},
};
use rusqlite::{params, params_from_iter, OptionalExtension};

const LEAD_COLUMNS: &str = "id, email, first_name, source, status, subscribed_at, updated_at";

fn lead_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id:            row.get(0)?,
        email:         row.get(1)?,
        first_name:    row.get(2)?,
        source:        row.get(3)?,
        status:        parse_column(row, 4)?,
        subscribed_at: row.get(5)?,
        updated_at:    row.get(6)?,
    })
}

impl SqliteStore {
    // ── Leads ──────────────────────────────────────────────────────

    /// Insert a new lead, flip an unsubscribed one back, or return the
    /// existing subscription untouched.
    pub fn upsert_lead(
        &self,
        email: &str,
        first_name: Option<&str>,
        source: &str,
    ) -> CoreResult<(Lead, SubscribeOutcome)> {
        let email = email.trim().to_lowercase();
        let conn = self.conn()?;

        let existing = conn
            .query_row(
                &format!("SELECT {LEAD_COLUMNS} FROM leads WHERE email = ?1"),
                params![&email],
                lead_row_mapper,
            )
            .optional()?;

        match existing {
            Some(lead) if lead.is_subscribed() => Ok((lead, SubscribeOutcome::AlreadySubscribed)),
            Some(mut lead) => {
                let now = timestamp();
                conn.execute(
                    "UPDATE leads SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    params![LeadStatus::Subscribed.as_str(), &now, &lead.id],
                )?;
                lead.status = LeadStatus::Subscribed;
                lead.updated_at = now;
                Ok((lead, SubscribeOutcome::Resubscribed))
            }
            None => {
                let now = timestamp();
                let lead = Lead {
                    id:            uuid::Uuid::new_v4().to_string(),
                    email,
                    first_name:    first_name
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(str::to_string),
                    source:        source.to_string(),
                    status:        LeadStatus::Subscribed,
                    subscribed_at: now.clone(),
                    updated_at:    now,
                };
                conn.execute(
                    &format!("INSERT INTO leads ({LEAD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                    params![
                        &lead.id,
                        &lead.email,
                        lead.first_name.as_deref(),
                        &lead.source,
                        lead.status.as_str(),
                        &lead.subscribed_at,
                        &lead.updated_at,
                    ],
                )?;
                Ok((lead, SubscribeOutcome::Created))
            }
        }
    }

    pub fn mark_unsubscribed(&self, email: &str) -> CoreResult<bool> {
        let changed = self.conn()?.execute(
            "UPDATE leads SET status = ?1, updated_at = ?2 WHERE email = ?3",
            params![
                LeadStatus::Unsubscribed.as_str(),
                timestamp(),
                email.trim().to_lowercase()
            ],
        )?;
        Ok(changed > 0)
    }

    /// Most recently subscribed first.
    pub fn query_leads(&self, filter: &LeadFilter) -> CoreResult<Vec<Lead>> {
        let mut sql = format!("SELECT {LEAD_COLUMNS} FROM leads WHERE 1 = 1");
        let mut args: Vec<String> = Vec::new();
        if let Some(email) = &filter.email {
            args.push(email.trim().to_lowercase());
            sql.push_str(&format!(" AND email = ?{}", args.len()));
        }
        if let Some(status) = filter.status {
            args.push(status.as_str().to_string());
            sql.push_str(&format!(" AND status = ?{}", args.len()));
        }
        if let Some(source) = &filter.source {
            args.push(source.clone());
            sql.push_str(&format!(" AND source = ?{}", args.len()));
        }
        sql.push_str(" ORDER BY subscribed_at DESC, rowid DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), lead_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn compute_lead_stats(&self) -> CoreResult<LeadStats> {
        let conn = self.conn()?;
        let mut stats = LeadStats::default();

        let mut stmt = conn.prepare("SELECT source, status, COUNT(*) FROM leads GROUP BY source, status")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;
        for row in rows {
            let (source, status, count) = row?;
            let count = count as u64;
            stats.total += count;
            if status == LeadStatus::Subscribed.as_str() {
                stats.subscribed += count;
            }
            *stats.by_source.entry(source).or_insert(0) += count;
        }
        Ok(stats)
    }
}

use super::{parse_column, timestamp, SqliteStore};
use crate::{
    error::CoreResult,
    feedback::{FeedbackFilter, FeedbackRecord, FeedbackStats, FeedbackStatus, NewFeedback},
};
use rusqlite::{params, params_from_iter};

const FEEDBACK_COLUMNS: &str =
    "id, kind, message, rating, page_context, user_agent, email, status, created_at";

fn feedback_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackRecord> {
    Ok(FeedbackRecord {
        id:           row.get(0)?,
        kind:         parse_column(row, 1)?,
        message:      row.get(2)?,
        rating:       row.get::<_, Option<i64>>(3)?.map(|r| r as u8),
        page_context: row.get(4)?,
        user_agent:   row.get(5)?,
        email:        row.get(6)?,
        status:       parse_column(row, 7)?,
        created_at:   row.get(8)?,
    })
}

impl SqliteStore {
    // ── Feedback ───────────────────────────────────────────────────

    pub fn insert_feedback(&self, f: &NewFeedback) -> CoreResult<FeedbackRecord> {
        let record = FeedbackRecord {
            id:           uuid::Uuid::new_v4().to_string(),
            kind:         f.kind,
            message:      f.message.clone(),
            rating:       f.rating,
            page_context: f.page_context.clone(),
            user_agent:   f.user_agent.clone(),
            email:        f.email.clone(),
            status:       FeedbackStatus::New,
            created_at:   timestamp(),
        };
        self.conn()?.execute(
            "INSERT INTO feedback (
                id, kind, message, rating, page_context, user_agent, email, status, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &record.id,
                record.kind.as_str(),
                &record.message,
                record.rating.map(i64::from),
                &record.page_context,
                record.user_agent.as_deref(),
                record.email.as_deref(),
                record.status.as_str(),
                &record.created_at,
            ],
        )?;
        Ok(record)
    }

    /// Most recent first.
    pub fn query_feedback(&self, filter: &FeedbackFilter) -> CoreResult<Vec<FeedbackRecord>> {
        let mut sql = format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE 1 = 1");
        let mut args: Vec<&str> = Vec::new();
        if let Some(kind) = filter.kind {
            args.push(kind.as_str());
            sql.push_str(&format!(" AND kind = ?{}", args.len()));
        }
        if let Some(status) = filter.status {
            args.push(status.as_str());
            sql.push_str(&format!(" AND status = ?{}", args.len()));
        }
        sql.push_str(&format!(" ORDER BY created_at DESC, rowid DESC LIMIT {}", filter.limit));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), feedback_row_mapper)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn compute_feedback_stats(&self) -> CoreResult<FeedbackStats> {
        let conn = self.conn()?;
        let mut stats = FeedbackStats::default();

        let mut stmt = conn.prepare("SELECT kind, COUNT(*) FROM feedback GROUP BY kind")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (kind, count) = row?;
            stats.total += count as u64;
            stats.by_type.insert(kind, count as u64);
        }

        let avg: Option<f64> = conn.query_row(
            "SELECT AVG(rating) FROM feedback WHERE rating IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        stats.avg_rating = avg.unwrap_or(0.0);
        Ok(stats)
    }

    pub fn set_feedback_status(&self, id: &str, status: FeedbackStatus) -> CoreResult<bool> {
        let changed = self.conn()?.execute(
            "UPDATE feedback SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(changed > 0)
    }
}

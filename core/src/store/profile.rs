use super::{timestamp, SqliteStore};
use crate::{error::CoreResult, profile::PlayerProfile};
use rusqlite::{params, OptionalExtension};

impl SqliteStore {
    // ── Profile snapshots ──────────────────────────────────────────

    /// Persist the whole profile as a JSON snapshot, replacing any previous one.
    pub fn write_profile(&self, profile: &PlayerProfile) -> CoreResult<()> {
        let json = serde_json::to_string(profile)?;
        self.conn()?.execute(
            "INSERT INTO player_profile (player_id, league_id, experience, snapshot, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(player_id) DO UPDATE SET
                league_id  = excluded.league_id,
                experience = excluded.experience,
                snapshot   = excluded.snapshot,
                updated_at = excluded.updated_at",
            params![
                &profile.id,
                &profile.league.league_id,
                profile.experience,
                json,
                timestamp(),
            ],
        )?;
        Ok(())
    }

    pub fn read_profile(&self, player_id: &str) -> CoreResult<Option<PlayerProfile>> {
        let json: Option<String> = self
            .conn()?
            .query_row(
                "SELECT snapshot FROM player_profile WHERE player_id = ?1",
                params![player_id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn profile_count(&self) -> CoreResult<i64> {
        self.conn()?
            .query_row("SELECT COUNT(*) FROM player_profile", [], |row| row.get(0))
            .map_err(Into::into)
    }
}

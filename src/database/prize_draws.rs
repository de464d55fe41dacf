use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{GuildId, UserId};
use sqlx::types::Json;

use super::{Database, snowflake};
use crate::models::{PrizeDrawSnapshot, PrizeEntry};
use crate::repository::{PrizeDrawRepository, RepoResult};

type SnapshotRow = (
    i64,
    i64,
    DateTime<Utc>,
    DateTime<Utc>,
    Json<Vec<PrizeEntry>>,
    Vec<i64>,
    Option<DateTime<Utc>>,
);

fn into_snapshot(row: SnapshotRow) -> PrizeDrawSnapshot {
    let (id, guild_id, period_start, period_end, entries, winners, rolled_at) = row;
    PrizeDrawSnapshot {
        id,
        guild_id: snowflake(guild_id),
        period_start,
        period_end,
        entries: entries.0,
        winners: winners.into_iter().map(snowflake).collect(),
        rolled_at,
    }
}

const SNAPSHOT_COLUMNS: &str =
    "id, guild_id, period_start, period_end, entries, winners, rolled_at";

#[async_trait]
impl PrizeDrawRepository for Database {
    async fn create_snapshot(
        &self,
        guild_id: GuildId,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        entries: &[PrizeEntry],
    ) -> RepoResult<PrizeDrawSnapshot> {
        let id = self.check(guild_id)?;
        let row: SnapshotRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO prize_draws (guild_id, period_start, period_end, entries)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SNAPSHOT_COLUMNS
        ))
        .bind(id)
        .bind(period_start)
        .bind(period_end)
        .bind(Json(entries))
        .fetch_one(self.pool())
        .await?;

        Ok(into_snapshot(row))
    }

    async fn get_snapshot(
        &self,
        guild_id: GuildId,
        snapshot_id: i64,
    ) -> RepoResult<Option<PrizeDrawSnapshot>> {
        let id = self.check(guild_id)?;
        let row: Option<SnapshotRow> = sqlx::query_as(&format!(
            "SELECT {} FROM prize_draws WHERE guild_id = $1 AND id = $2",
            SNAPSHOT_COLUMNS
        ))
        .bind(id)
        .bind(snapshot_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(into_snapshot))
    }

    async fn get_latest_snapshot(
        &self,
        guild_id: GuildId,
    ) -> RepoResult<Option<PrizeDrawSnapshot>> {
        let id = self.check(guild_id)?;
        let row: Option<SnapshotRow> = sqlx::query_as(&format!(
            "SELECT {} FROM prize_draws WHERE guild_id = $1 ORDER BY period_end DESC, id DESC LIMIT 1",
            SNAPSHOT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(into_snapshot))
    }

    async fn set_winners(
        &self,
        guild_id: GuildId,
        snapshot_id: i64,
        winners: &[UserId],
    ) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        let winners: Vec<i64> = winners.iter().map(|u| u.get() as i64).collect();
        sqlx::query(
            "UPDATE prize_draws SET winners = $3, rolled_at = NOW() WHERE guild_id = $1 AND id = $2",
        )
        .bind(id)
        .bind(snapshot_id)
        .bind(winners)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

use async_trait::async_trait;
use poise::serenity_prelude::{GuildId, UserId};

use super::{Database, snowflake};
use crate::models::{CompletionTier, UserStats};
use crate::repository::{RepoResult, UserRepository};

type StatsRow = (i64, i32, i32, i32, i32, i32, i32);

fn into_stats(row: StatsRow) -> UserStats {
    let (user_id, tasks_completed, bronze, silver, gold, prize_wins, movies_added) = row;
    UserStats {
        user_id: snowflake(user_id),
        tasks_completed,
        bronze,
        silver,
        gold,
        prize_wins,
        movies_added,
    }
}

impl Database {
    /// Increment counters on a user's stats row, creating it if needed
    ///
    /// `columns` are trusted column names, never user input.
    async fn bump_user(&self, guild_id: GuildId, user_id: UserId, columns: &[&str]) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        let names = columns.join(", ");
        let ones = vec!["1"; columns.len()].join(", ");
        let updates: Vec<String> = columns
            .iter()
            .map(|c| format!("{c} = user_stats.{c} + 1"))
            .collect();

        sqlx::query(&format!(
            r#"
            INSERT INTO user_stats (guild_id, user_id, {names})
            VALUES ($1, $2, {ones})
            ON CONFLICT (guild_id, user_id)
            DO UPDATE SET {}
            "#,
            updates.join(", ")
        ))
        .bind(id)
        .bind(user_id.get() as i64)
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for Database {
    async fn get_user_stats(&self, guild_id: GuildId, user_id: UserId) -> RepoResult<UserStats> {
        let id = self.check(guild_id)?;
        let row: Option<StatsRow> = sqlx::query_as(
            r#"
            SELECT user_id, tasks_completed, bronze, silver, gold, prize_wins, movies_added
            FROM user_stats
            WHERE guild_id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id.get() as i64)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(into_stats).unwrap_or_else(|| UserStats::empty(user_id)))
    }

    async fn record_completion(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        tier: CompletionTier,
    ) -> RepoResult<()> {
        self.bump_user(guild_id, user_id, &["tasks_completed", tier.as_str()])
            .await
    }

    async fn record_prize_win(&self, guild_id: GuildId, user_id: UserId) -> RepoResult<()> {
        self.bump_user(guild_id, user_id, &["prize_wins"]).await
    }

    async fn record_movie_added(&self, guild_id: GuildId, user_id: UserId) -> RepoResult<()> {
        self.bump_user(guild_id, user_id, &["movies_added"]).await
    }

    async fn get_leaderboard(&self, guild_id: GuildId, limit: i64) -> RepoResult<Vec<UserStats>> {
        let id = self.check(guild_id)?;
        let rows: Vec<StatsRow> = sqlx::query_as(
            r#"
            SELECT user_id, tasks_completed, bronze, silver, gold, prize_wins, movies_added
            FROM user_stats
            WHERE guild_id = $1 AND tasks_completed > 0
            ORDER BY tasks_completed DESC, gold DESC, silver DESC, user_id
            LIMIT $2
            "#,
        )
        .bind(id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(into_stats).collect())
    }
}

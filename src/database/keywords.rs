use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::GuildId;

use super::Database;
use crate::constants::KEYWORD_HISTORY_LENGTH;
use crate::models::Keyword;
use crate::repository::{KeywordRepository, RepoResult};

type KeywordRow = (String, String, Option<DateTime<Utc>>, Option<i64>, i32, Vec<i64>);

#[async_trait]
impl KeywordRepository for Database {
    async fn get_all_keywords(&self, guild_id: GuildId) -> RepoResult<Vec<Keyword>> {
        let id = self.check(guild_id)?;
        let rows: Vec<KeywordRow> = sqlx::query_as(
            r#"
            SELECT keyword_id, word, last_used_at, last_used_event, times_used, usage_history
            FROM keywords
            WHERE guild_id = $1
            ORDER BY keyword_id
            "#,
        )
        .bind(id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, word, last_used_at, last_used_event, times_used, usage_history)| Keyword {
                    id,
                    word,
                    last_used_at,
                    last_used_event,
                    times_used,
                    usage_history,
                },
            )
            .collect())
    }

    async fn add_keyword(&self, guild_id: GuildId, keyword: &Keyword) -> RepoResult<bool> {
        let id = self.check(guild_id)?;
        let result = sqlx::query(
            r#"
            INSERT INTO keywords (guild_id, keyword_id, word)
            VALUES ($1, $2, $3)
            ON CONFLICT (guild_id, keyword_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(&keyword.id)
        .bind(&keyword.word)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_keyword(&self, guild_id: GuildId, keyword_id: &str) -> RepoResult<bool> {
        let id = self.check(guild_id)?;
        let result = sqlx::query("DELETE FROM keywords WHERE guild_id = $1 AND keyword_id = $2")
            .bind(id)
            .bind(keyword_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_keyword_used(
        &self,
        guild_id: GuildId,
        keyword_id: &str,
        event_id: i64,
    ) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        // Newest first, capped
        sqlx::query(
            r#"
            UPDATE keywords
            SET last_used_at = NOW(),
                last_used_event = $3,
                times_used = times_used + 1,
                usage_history = (ARRAY[$3]::BIGINT[] || usage_history)[1:$4]
            WHERE guild_id = $1 AND keyword_id = $2
            "#,
        )
        .bind(id)
        .bind(keyword_id)
        .bind(event_id)
        .bind(KEYWORD_HISTORY_LENGTH as i32)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn reset_keyword_usage(&self, guild_id: GuildId) -> RepoResult<u64> {
        let id = self.check(guild_id)?;
        let result = sqlx::query(
            r#"
            UPDATE keywords
            SET last_used_at = NULL,
                last_used_event = NULL,
                times_used = 0,
                usage_history = '{}'
            WHERE guild_id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected())
    }
}

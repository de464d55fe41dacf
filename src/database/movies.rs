use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};

use super::{Database, snowflake};
use crate::models::{Movie, MoviePoll, title_key};
use crate::repository::{MovieRepository, RepoResult};

type MovieRow = (i64, i64, String, i64, DateTime<Utc>, bool, Option<DateTime<Utc>>);

fn into_movie(row: MovieRow) -> Movie {
    let (id, guild_id, title, added_by, added_at, watched, watched_at) = row;
    Movie {
        id,
        guild_id: snowflake(guild_id),
        title,
        added_by: snowflake(added_by),
        added_at,
        watched,
        watched_at,
    }
}

type MoviePollRow = (i64, i64, Vec<i64>, Option<i64>, Option<i64>, bool);

fn into_poll(row: MoviePollRow) -> MoviePoll {
    let (id, guild_id, options, channel_id, message_id, active) = row;
    MoviePoll {
        id,
        guild_id: snowflake(guild_id),
        options,
        channel_id: channel_id.map(snowflake),
        message_id: message_id.map(snowflake),
        active,
    }
}

const MOVIE_COLUMNS: &str = "id, guild_id, title, added_by, added_at, watched, watched_at";
const POLL_COLUMNS: &str = "id, guild_id, options, channel_id, message_id, active";

#[async_trait]
impl MovieRepository for Database {
    async fn add_movie(
        &self,
        guild_id: GuildId,
        title: &str,
        added_by: UserId,
    ) -> RepoResult<Option<Movie>> {
        let id = self.check(guild_id)?;
        let row: Option<MovieRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO movies (guild_id, title, title_key, added_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (guild_id, title_key) DO NOTHING
            RETURNING {}
            "#,
            MOVIE_COLUMNS
        ))
        .bind(id)
        .bind(title.trim())
        .bind(title_key(title))
        .bind(added_by.get() as i64)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(into_movie))
    }

    async fn find_movie_by_title(
        &self,
        guild_id: GuildId,
        title: &str,
    ) -> RepoResult<Option<Movie>> {
        let id = self.check(guild_id)?;
        let row: Option<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies WHERE guild_id = $1 AND title_key = $2",
            MOVIE_COLUMNS
        ))
        .bind(id)
        .bind(title_key(title))
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(into_movie))
    }

    async fn get_movie(&self, guild_id: GuildId, movie_id: i64) -> RepoResult<Option<Movie>> {
        let id = self.check(guild_id)?;
        let row: Option<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies WHERE guild_id = $1 AND id = $2",
            MOVIE_COLUMNS
        ))
        .bind(id)
        .bind(movie_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(into_movie))
    }

    async fn get_all_movies(&self, guild_id: GuildId) -> RepoResult<Vec<Movie>> {
        let id = self.check(guild_id)?;
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movies WHERE guild_id = $1 ORDER BY watched, added_at",
            MOVIE_COLUMNS
        ))
        .bind(id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(into_movie).collect())
    }

    async fn remove_movie(&self, guild_id: GuildId, movie_id: i64) -> RepoResult<bool> {
        let id = self.check(guild_id)?;
        let result = sqlx::query("DELETE FROM movies WHERE guild_id = $1 AND id = $2")
            .bind(id)
            .bind(movie_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_movie_watched(&self, guild_id: GuildId, movie_id: i64) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        sqlx::query(
            "UPDATE movies SET watched = TRUE, watched_at = NOW() WHERE guild_id = $1 AND id = $2",
        )
        .bind(id)
        .bind(movie_id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn create_movie_poll(&self, guild_id: GuildId, options: &[i64]) -> RepoResult<MoviePoll> {
        let id = self.check(guild_id)?;
        let mut tx = self.pool().begin().await?;

        // A guild has at most one open movie poll
        sqlx::query("UPDATE movie_polls SET active = FALSE WHERE guild_id = $1 AND active")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let row: MoviePollRow = sqlx::query_as(&format!(
            "INSERT INTO movie_polls (guild_id, options) VALUES ($1, $2) RETURNING {}",
            POLL_COLUMNS
        ))
        .bind(id)
        .bind(options)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(into_poll(row))
    }

    async fn get_active_movie_poll(&self, guild_id: GuildId) -> RepoResult<Option<MoviePoll>> {
        let id = self.check(guild_id)?;
        let row: Option<MoviePollRow> = sqlx::query_as(&format!(
            "SELECT {} FROM movie_polls WHERE guild_id = $1 AND active ORDER BY id DESC LIMIT 1",
            POLL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(into_poll))
    }

    async fn set_movie_poll_message(
        &self,
        guild_id: GuildId,
        poll_id: i64,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        sqlx::query(
            "UPDATE movie_polls SET channel_id = $3, message_id = $4 WHERE guild_id = $1 AND id = $2",
        )
        .bind(id)
        .bind(poll_id)
        .bind(channel_id.get() as i64)
        .bind(message_id.get() as i64)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn record_movie_vote(
        &self,
        guild_id: GuildId,
        poll_id: i64,
        user_id: UserId,
        movie_id: i64,
    ) -> RepoResult<bool> {
        let id = self.check(guild_id)?;
        let result = sqlx::query(
            r#"
            INSERT INTO movie_poll_votes (poll_id, user_id, movie_id)
            SELECT id, $3, $4 FROM movie_polls
            WHERE id = $2 AND guild_id = $1 AND active AND $4 = ANY(options)
            ON CONFLICT (poll_id, user_id) DO UPDATE SET movie_id = EXCLUDED.movie_id
            "#,
        )
        .bind(id)
        .bind(poll_id)
        .bind(user_id.get() as i64)
        .bind(movie_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_movie_votes(&self, poll_id: i64) -> RepoResult<Vec<(UserId, i64)>> {
        let rows: Vec<(i64, i64)> =
            sqlx::query_as("SELECT user_id, movie_id FROM movie_poll_votes WHERE poll_id = $1")
                .bind(poll_id)
                .fetch_all(self.pool())
                .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, movie_id)| (snowflake(user_id), movie_id))
            .collect())
    }

    async fn close_movie_poll(&self, guild_id: GuildId, poll_id: i64) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        sqlx::query("UPDATE movie_polls SET active = FALSE WHERE guild_id = $1 AND id = $2")
            .bind(id)
            .bind(poll_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

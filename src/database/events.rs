use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};
use sqlx::types::Json;

use super::{Database, malformed, snowflake};
use crate::models::{EventTask, TaskCategory, TaskEvent, TaskPoll, Vote};
use crate::repository::{RepoResult, TaskEventRepository};

type EventRow = (
    i64,
    i64,
    DateTime<Utc>,
    Json<Vec<EventTask>>,
    Option<String>,
    Option<i64>,
    Option<i64>,
);

fn into_event(row: EventRow) -> TaskEvent {
    let (id, guild_id, created_at, tasks, keyword, channel_id, message_id) = row;
    TaskEvent {
        id,
        guild_id: snowflake(guild_id),
        created_at,
        tasks: tasks.0,
        keyword,
        channel_id: channel_id.map(snowflake),
        message_id: message_id.map(snowflake),
    }
}

type PollRow = (i64, i64, String, Vec<String>, Option<i64>, Option<i64>, bool);

fn into_poll(row: PollRow) -> RepoResult<TaskPoll> {
    let (id, guild_id, category, options, channel_id, message_id, active) = row;
    Ok(TaskPoll {
        id,
        guild_id: snowflake(guild_id),
        category: category
            .parse::<TaskCategory>()
            .map_err(|_| malformed("poll category", &category))?,
        options,
        channel_id: channel_id.map(snowflake),
        message_id: message_id.map(snowflake),
        active,
    })
}

const SELECT_EVENT: &str = r#"
    SELECT id, guild_id, created_at, tasks, keyword, channel_id, message_id
    FROM task_events
"#;

const SELECT_POLL: &str = r#"
    SELECT id, guild_id, category, options, channel_id, message_id, active
    FROM task_polls
"#;

#[async_trait]
impl TaskEventRepository for Database {
    async fn create_event(&self, guild_id: GuildId, tasks: &[EventTask]) -> RepoResult<TaskEvent> {
        let id = self.check(guild_id)?;
        let row: EventRow = sqlx::query_as(
            r#"
            INSERT INTO task_events (guild_id, tasks)
            VALUES ($1, $2)
            RETURNING id, guild_id, created_at, tasks, keyword, channel_id, message_id
            "#,
        )
        .bind(id)
        .bind(Json(tasks))
        .fetch_one(self.pool())
        .await?;

        Ok(into_event(row))
    }

    async fn get_event(&self, guild_id: GuildId, event_id: i64) -> RepoResult<Option<TaskEvent>> {
        let id = self.check(guild_id)?;
        let row: Option<EventRow> =
            sqlx::query_as(&format!("{} WHERE guild_id = $1 AND id = $2", SELECT_EVENT))
                .bind(id)
                .bind(event_id)
                .fetch_optional(self.pool())
                .await?;

        Ok(row.map(into_event))
    }

    async fn get_latest_event(&self, guild_id: GuildId) -> RepoResult<Option<TaskEvent>> {
        let id = self.check(guild_id)?;
        let row: Option<EventRow> = sqlx::query_as(&format!(
            "{} WHERE guild_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
            SELECT_EVENT
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(into_event))
    }

    async fn set_event_keyword(
        &self,
        guild_id: GuildId,
        event_id: i64,
        keyword: &str,
    ) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        sqlx::query("UPDATE task_events SET keyword = $3 WHERE guild_id = $1 AND id = $2")
            .bind(id)
            .bind(event_id)
            .bind(keyword)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn set_event_message(
        &self,
        guild_id: GuildId,
        event_id: i64,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        sqlx::query(
            "UPDATE task_events SET channel_id = $3, message_id = $4 WHERE guild_id = $1 AND id = $2",
        )
        .bind(id)
        .bind(event_id)
        .bind(channel_id.get() as i64)
        .bind(message_id.get() as i64)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn create_poll(
        &self,
        guild_id: GuildId,
        category: TaskCategory,
        options: &[String],
    ) -> RepoResult<TaskPoll> {
        let id = self.check(guild_id)?;
        let row: PollRow = sqlx::query_as(
            r#"
            INSERT INTO task_polls (guild_id, category, options)
            VALUES ($1, $2, $3)
            RETURNING id, guild_id, category, options, channel_id, message_id, active
            "#,
        )
        .bind(id)
        .bind(category.as_str())
        .bind(options)
        .fetch_one(self.pool())
        .await?;

        into_poll(row)
    }

    async fn get_active_polls(&self, guild_id: GuildId) -> RepoResult<Vec<TaskPoll>> {
        let id = self.check(guild_id)?;
        let rows: Vec<PollRow> = sqlx::query_as(&format!(
            "{} WHERE guild_id = $1 AND active ORDER BY id",
            SELECT_POLL
        ))
        .bind(id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(into_poll).collect()
    }

    async fn set_poll_message(
        &self,
        guild_id: GuildId,
        poll_id: i64,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        sqlx::query(
            "UPDATE task_polls SET channel_id = $3, message_id = $4 WHERE guild_id = $1 AND id = $2",
        )
        .bind(id)
        .bind(poll_id)
        .bind(channel_id.get() as i64)
        .bind(message_id.get() as i64)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn record_poll_vote(
        &self,
        guild_id: GuildId,
        poll_id: i64,
        user_id: UserId,
        task_id: &str,
    ) -> RepoResult<bool> {
        let id = self.check(guild_id)?;
        // Only counts while the poll is open and the task is one of its options
        let result = sqlx::query(
            r#"
            INSERT INTO task_poll_votes (poll_id, user_id, task_id)
            SELECT id, $3, $4 FROM task_polls
            WHERE id = $2 AND guild_id = $1 AND active AND $4 = ANY(options)
            ON CONFLICT (poll_id, user_id) DO UPDATE SET task_id = EXCLUDED.task_id
            "#,
        )
        .bind(id)
        .bind(poll_id)
        .bind(user_id.get() as i64)
        .bind(task_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_poll_votes(&self, poll_id: i64) -> RepoResult<Vec<(UserId, String)>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT user_id, task_id FROM task_poll_votes WHERE poll_id = $1")
                .bind(poll_id)
                .fetch_all(self.pool())
                .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, task_id)| (snowflake(user_id), task_id))
            .collect())
    }

    async fn close_poll(&self, guild_id: GuildId, poll_id: i64) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        sqlx::query("UPDATE task_polls SET active = FALSE WHERE guild_id = $1 AND id = $2")
            .bind(id)
            .bind(poll_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn get_feedback(
        &self,
        guild_id: GuildId,
        event_id: i64,
        task_id: &str,
        user_id: UserId,
    ) -> RepoResult<Option<Vote>> {
        let id = self.check(guild_id)?;
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT vote FROM task_feedback
            WHERE guild_id = $1 AND event_id = $2 AND task_id = $3 AND user_id = $4
            "#,
        )
        .bind(id)
        .bind(event_id)
        .bind(task_id)
        .bind(user_id.get() as i64)
        .fetch_optional(self.pool())
        .await?;

        row.map(|(vote,)| vote.parse::<Vote>().map_err(|_| malformed("vote", &vote)))
            .transpose()
    }

    async fn set_feedback(
        &self,
        guild_id: GuildId,
        event_id: i64,
        task_id: &str,
        user_id: UserId,
        vote: Vote,
    ) -> RepoResult<()> {
        let id = self.check(guild_id)?;
        sqlx::query(
            r#"
            INSERT INTO task_feedback (guild_id, event_id, task_id, user_id, vote)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (guild_id, event_id, task_id, user_id)
            DO UPDATE SET vote = $5
            "#,
        )
        .bind(id)
        .bind(event_id)
        .bind(task_id)
        .bind(user_id.get() as i64)
        .bind(vote.as_str())
        .execute(self.pool())
        .await?;
        Ok(())
    }
}

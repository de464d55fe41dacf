use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{GuildId, UserId};

use super::{Database, malformed, snowflake};
use crate::models::{CompletionTier, Submission, SubmissionStatus};
use crate::repository::{RepoResult, SubmissionRepository};

type SubmissionRow = (
    i64,
    i64,
    i64,
    i64,
    String,
    String,
    String,
    Option<String>,
    Option<i64>,
    DateTime<Utc>,
);

fn into_submission(row: SubmissionRow) -> RepoResult<Submission> {
    let (id, guild_id, user_id, event_id, task_id, proof, status, tier, reviewed_by, created_at) =
        row;

    let status = status
        .parse::<SubmissionStatus>()
        .map_err(|_| malformed("submission status", &status))?;
    let tier = tier
        .map(|t| t.parse::<CompletionTier>().map_err(|_| malformed("tier", &t)))
        .transpose()?;

    Ok(Submission {
        id,
        guild_id: snowflake(guild_id),
        user_id: snowflake(user_id),
        event_id,
        task_id,
        proof,
        status,
        tier,
        reviewed_by: reviewed_by.map(snowflake),
        created_at,
    })
}

const SUBMISSION_COLUMNS: &str =
    "id, guild_id, user_id, event_id, task_id, proof, status, tier, reviewed_by, created_at";

#[async_trait]
impl SubmissionRepository for Database {
    async fn create_submission(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        event_id: i64,
        task_id: &str,
        proof: &str,
    ) -> RepoResult<Submission> {
        let id = self.check(guild_id)?;
        let row: SubmissionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO submissions (guild_id, user_id, event_id, task_id, proof)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .bind(user_id.get() as i64)
        .bind(event_id)
        .bind(task_id)
        .bind(proof)
        .fetch_one(self.pool())
        .await?;

        into_submission(row)
    }

    async fn get_submission(
        &self,
        guild_id: GuildId,
        submission_id: i64,
    ) -> RepoResult<Option<Submission>> {
        let id = self.check(guild_id)?;
        let row: Option<SubmissionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM submissions WHERE guild_id = $1 AND id = $2",
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .bind(submission_id)
        .fetch_optional(self.pool())
        .await?;

        row.map(into_submission).transpose()
    }

    async fn review_submission(
        &self,
        guild_id: GuildId,
        submission_id: i64,
        status: SubmissionStatus,
        tier: Option<CompletionTier>,
        reviewer: UserId,
    ) -> RepoResult<bool> {
        let id = self.check(guild_id)?;
        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET status = $3, tier = $4, reviewed_by = $5, reviewed_at = NOW()
            WHERE guild_id = $1 AND id = $2 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(submission_id)
        .bind(status.as_str())
        .bind(tier.map(|t| t.as_str()))
        .bind(reviewer.get() as i64)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_approved_between(
        &self,
        guild_id: GuildId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Submission>> {
        let id = self.check(guild_id)?;
        let rows: Vec<SubmissionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM submissions
            WHERE guild_id = $1 AND status = 'approved'
              AND reviewed_at >= $2 AND reviewed_at < $3
            ORDER BY id
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(into_submission).collect()
    }
}

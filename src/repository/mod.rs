/// Storage traits, one per entity
///
/// `Database` implements all of them; services take the narrowest trait they
/// need so they can run against in-memory fakes in tests.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};

use crate::models::{
    CompletionTier, EventTask, GuildConfig, Keyword, Movie, MoviePoll, PrizeDrawSnapshot,
    PrizeEntry, Submission, SubmissionStatus, Task, TaskCategory, TaskEvent, TaskPoll, UserStats,
    Vote,
};

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("malformed stored value: {0}")]
    Malformed(String),

    #[error("guild {0} is not permitted in the current bot mode")]
    GuildNotPermitted(GuildId),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome of a bulk task import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub inserted: usize,
    pub skipped: usize,
}

#[async_trait]
pub trait GuildRepository: Send + Sync {
    async fn get_guild(&self, guild_id: GuildId) -> RepoResult<Option<GuildConfig>>;
    async fn save_guild(&self, config: &GuildConfig) -> RepoResult<()>;
    /// All stored guilds permitted in the current mode
    async fn get_all_guilds(&self) -> RepoResult<Vec<GuildConfig>>;
}

#[async_trait]
pub trait KeywordRepository: Send + Sync {
    async fn get_all_keywords(&self, guild_id: GuildId) -> RepoResult<Vec<Keyword>>;
    /// Returns false when a keyword with the same id already exists
    async fn add_keyword(&self, guild_id: GuildId, keyword: &Keyword) -> RepoResult<bool>;
    async fn remove_keyword(&self, guild_id: GuildId, keyword_id: &str) -> RepoResult<bool>;
    /// Record one use of a keyword for an event
    async fn mark_keyword_used(
        &self,
        guild_id: GuildId,
        keyword_id: &str,
        event_id: i64,
    ) -> RepoResult<()>;
    /// Clear usage on every keyword of the guild in one transaction
    async fn reset_keyword_usage(&self, guild_id: GuildId) -> RepoResult<u64>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn get_all_tasks(&self, guild_id: GuildId) -> RepoResult<Vec<Task>>;
    async fn get_tasks_by_category(
        &self,
        guild_id: GuildId,
        category: TaskCategory,
    ) -> RepoResult<Vec<Task>>;
    /// Insert tasks, skipping ids that already exist
    async fn insert_tasks(&self, guild_id: GuildId, tasks: &[Task]) -> RepoResult<ImportCounts>;
    async fn adjust_task_weight(&self, guild_id: GuildId, task_id: &str, delta: i32)
    -> RepoResult<()>;
}

#[async_trait]
pub trait TaskEventRepository: Send + Sync {
    async fn create_event(&self, guild_id: GuildId, tasks: &[EventTask]) -> RepoResult<TaskEvent>;
    async fn get_event(&self, guild_id: GuildId, event_id: i64) -> RepoResult<Option<TaskEvent>>;
    async fn get_latest_event(&self, guild_id: GuildId) -> RepoResult<Option<TaskEvent>>;
    async fn set_event_keyword(&self, guild_id: GuildId, event_id: i64, keyword: &str)
    -> RepoResult<()>;
    async fn set_event_message(
        &self,
        guild_id: GuildId,
        event_id: i64,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> RepoResult<()>;

    async fn create_poll(
        &self,
        guild_id: GuildId,
        category: TaskCategory,
        options: &[String],
    ) -> RepoResult<TaskPoll>;
    async fn get_active_polls(&self, guild_id: GuildId) -> RepoResult<Vec<TaskPoll>>;
    async fn set_poll_message(
        &self,
        guild_id: GuildId,
        poll_id: i64,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> RepoResult<()>;
    /// Returns false when the poll is closed or missing
    async fn record_poll_vote(
        &self,
        guild_id: GuildId,
        poll_id: i64,
        user_id: UserId,
        task_id: &str,
    ) -> RepoResult<bool>;
    async fn get_poll_votes(&self, poll_id: i64) -> RepoResult<Vec<(UserId, String)>>;
    async fn close_poll(&self, guild_id: GuildId, poll_id: i64) -> RepoResult<()>;

    async fn get_feedback(
        &self,
        guild_id: GuildId,
        event_id: i64,
        task_id: &str,
        user_id: UserId,
    ) -> RepoResult<Option<Vote>>;
    async fn set_feedback(
        &self,
        guild_id: GuildId,
        event_id: i64,
        task_id: &str,
        user_id: UserId,
        vote: Vote,
    ) -> RepoResult<()>;
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create_submission(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        event_id: i64,
        task_id: &str,
        proof: &str,
    ) -> RepoResult<Submission>;
    async fn get_submission(
        &self,
        guild_id: GuildId,
        submission_id: i64,
    ) -> RepoResult<Option<Submission>>;
    /// Move a pending submission to a final status; false if it was already reviewed
    async fn review_submission(
        &self,
        guild_id: GuildId,
        submission_id: i64,
        status: SubmissionStatus,
        tier: Option<CompletionTier>,
        reviewer: UserId,
    ) -> RepoResult<bool>;
    async fn get_approved_between(
        &self,
        guild_id: GuildId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Submission>>;
}

#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Returns `None` when the title is already on the list
    async fn add_movie(
        &self,
        guild_id: GuildId,
        title: &str,
        added_by: UserId,
    ) -> RepoResult<Option<Movie>>;
    async fn find_movie_by_title(&self, guild_id: GuildId, title: &str)
    -> RepoResult<Option<Movie>>;
    async fn get_movie(&self, guild_id: GuildId, movie_id: i64) -> RepoResult<Option<Movie>>;
    async fn get_all_movies(&self, guild_id: GuildId) -> RepoResult<Vec<Movie>>;
    async fn remove_movie(&self, guild_id: GuildId, movie_id: i64) -> RepoResult<bool>;
    async fn mark_movie_watched(&self, guild_id: GuildId, movie_id: i64) -> RepoResult<()>;

    async fn create_movie_poll(&self, guild_id: GuildId, options: &[i64]) -> RepoResult<MoviePoll>;
    async fn get_active_movie_poll(&self, guild_id: GuildId) -> RepoResult<Option<MoviePoll>>;
    async fn set_movie_poll_message(
        &self,
        guild_id: GuildId,
        poll_id: i64,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> RepoResult<()>;
    async fn record_movie_vote(
        &self,
        guild_id: GuildId,
        poll_id: i64,
        user_id: UserId,
        movie_id: i64,
    ) -> RepoResult<bool>;
    async fn get_movie_votes(&self, poll_id: i64) -> RepoResult<Vec<(UserId, i64)>>;
    async fn close_movie_poll(&self, guild_id: GuildId, poll_id: i64) -> RepoResult<()>;
}

#[async_trait]
pub trait PrizeDrawRepository: Send + Sync {
    async fn create_snapshot(
        &self,
        guild_id: GuildId,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
        entries: &[PrizeEntry],
    ) -> RepoResult<PrizeDrawSnapshot>;
    async fn get_snapshot(
        &self,
        guild_id: GuildId,
        snapshot_id: i64,
    ) -> RepoResult<Option<PrizeDrawSnapshot>>;
    async fn get_latest_snapshot(&self, guild_id: GuildId)
    -> RepoResult<Option<PrizeDrawSnapshot>>;
    async fn set_winners(
        &self,
        guild_id: GuildId,
        snapshot_id: i64,
        winners: &[UserId],
    ) -> RepoResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user_stats(&self, guild_id: GuildId, user_id: UserId) -> RepoResult<UserStats>;
    async fn record_completion(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        tier: CompletionTier,
    ) -> RepoResult<()>;
    async fn record_prize_win(&self, guild_id: GuildId, user_id: UserId) -> RepoResult<()>;
    async fn record_movie_added(&self, guild_id: GuildId, user_id: UserId) -> RepoResult<()>;
    /// Users ordered by tasks completed
    async fn get_leaderboard(&self, guild_id: GuildId, limit: i64) -> RepoResult<Vec<UserStats>>;
}

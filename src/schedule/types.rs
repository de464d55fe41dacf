use async_trait::async_trait;
use poise::serenity_prelude::{GuildId, UserId};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::constants::{POLL_CRON, PRIZE_DRAW_CRON, TASK_START_CRON};
use crate::models::Error;

/// The weekly jobs registered for every active guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Poll,
    TaskStart,
    PrizeDraw,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::Poll, JobKind::TaskStart, JobKind::PrizeDraw];

    /// Six-field cron expression, evaluated in UTC
    pub fn cron_expression(&self) -> &'static str {
        match self {
            JobKind::Poll => POLL_CRON,
            JobKind::TaskStart => TASK_START_CRON,
            JobKind::PrizeDraw => PRIZE_DRAW_CRON,
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Poll => write!(f, "task poll"),
            JobKind::TaskStart => write!(f, "task start"),
            JobKind::PrizeDraw => write!(f, "prize draw"),
        }
    }
}

pub type JobFuture = Pin<Box<dyn Future<Output = Result<(), Error>> + Send>>;

/// Body of a job, invoked once per firing
pub type JobCallback = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// Cancels a registered job
pub trait JobHandle: Send + Sync {
    fn cancel(&self);
}

/// Something that fires callbacks on a cron schedule
pub trait JobRunner: Send + Sync {
    fn schedule(
        &self,
        guild_id: GuildId,
        kind: JobKind,
        expression: &str,
        callback: JobCallback,
    ) -> Result<Box<dyn JobHandle>, Error>;
}

/// The work behind each job, implemented against Discord in production
#[async_trait]
pub trait ScheduledWorkflows: Send + Sync {
    async fn post_task_polls(&self, guild_id: GuildId) -> Result<(), Error>;
    async fn start_task_event(&self, guild_id: GuildId) -> Result<(), Error>;
    /// Freeze the entries of the current draw period, returning the snapshot id
    async fn generate_prize_snapshot(&self, guild_id: GuildId) -> Result<i64, Error>;
    async fn roll_prize_winners(&self, guild_id: GuildId, snapshot_id: i64)
    -> Result<Vec<UserId>, Error>;
    async fn announce_prize_winners(
        &self,
        guild_id: GuildId,
        snapshot_id: i64,
        winners: &[UserId],
    ) -> Result<(), Error>;
}

/// Domain types and shared bot state
mod guild_config;
mod keyword;
mod movie;
mod prize_draw;
mod task;
mod user_stats;

pub use guild_config::{
    ChannelKind, GuildChannels, GuildConfig, GuildConfigPatch, GuildRoles, GuildToggles, RoleKind,
    SetupFlags,
};
pub use keyword::Keyword;
pub use movie::{Movie, MoviePoll, title_key};
pub use prize_draw::{PrizeDrawSnapshot, PrizeEntry};
pub use task::{
    CompletionTier, EventTask, Submission, SubmissionStatus, Task, TaskCategory, TaskEvent,
    TaskPoll, TierAmounts, Vote,
};
pub use user_stats::UserStats;

use std::sync::Arc;

use crate::config::Config;
use crate::database::Database;
use crate::schedule::SchedulerManager;
use crate::services::{FeedbackLocks, GuildConfigService};

/// Bot state shared across all handlers
#[derive(Clone)]
pub struct Data {
    /// Database connection
    pub db: Database,
    /// Read-through cache of guild configs
    pub guild_configs: Arc<GuildConfigService>,
    /// Per-guild scheduled jobs
    pub scheduler: Arc<SchedulerManager>,
    /// Serializes task feedback per user ballot
    pub feedback_locks: Arc<FeedbackLocks>,
    /// Configuration loaded at startup
    pub config: Arc<Config>,
}

impl Data {
    /// Create a new Data instance with the given database connection
    pub fn new(db: Database, config: Config) -> Self {
        let scope = config.guild_scope();
        Self {
            guild_configs: Arc::new(GuildConfigService::new(Arc::new(db.clone()))),
            scheduler: Arc::new(SchedulerManager::with_tokio_runner(scope)),
            feedback_locks: Arc::new(FeedbackLocks::new()),
            config: Arc::new(config),
            db,
        }
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

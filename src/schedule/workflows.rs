use async_trait::async_trait;
use poise::serenity_prelude::{self as serenity, GuildId, UserId};
use std::sync::Arc;

use super::types::ScheduledWorkflows;
use super::{prize_jobs, task_jobs};
use crate::models::{Data, Error};

/// Job bodies that talk to Discord through the bot's HTTP client
pub struct DiscordWorkflows {
    http: Arc<serenity::Http>,
    data: Data,
}

impl DiscordWorkflows {
    pub fn new(http: Arc<serenity::Http>, data: Data) -> Self {
        Self { http, data }
    }
}

#[async_trait]
impl ScheduledWorkflows for DiscordWorkflows {
    async fn post_task_polls(&self, guild_id: GuildId) -> Result<(), Error> {
        task_jobs::post_task_polls(&self.http, &self.data, guild_id).await
    }

    async fn start_task_event(&self, guild_id: GuildId) -> Result<(), Error> {
        task_jobs::start_task_event(&self.http, &self.data, guild_id).await
    }

    async fn generate_prize_snapshot(&self, guild_id: GuildId) -> Result<i64, Error> {
        prize_jobs::generate_prize_snapshot(&self.data, guild_id).await
    }

    async fn roll_prize_winners(
        &self,
        guild_id: GuildId,
        snapshot_id: i64,
    ) -> Result<Vec<UserId>, Error> {
        prize_jobs::roll_prize_winners(&self.data, guild_id, snapshot_id).await
    }

    async fn announce_prize_winners(
        &self,
        guild_id: GuildId,
        snapshot_id: i64,
        winners: &[UserId],
    ) -> Result<(), Error> {
        prize_jobs::announce_prize_winners(&self.http, &self.data, guild_id, snapshot_id, winners)
            .await
    }
}

use chrono::Utc;
use dashmap::DashMap;
use poise::serenity_prelude::{ChannelId, GuildId, RoleId, UserId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::{ChannelKind, GuildConfig, GuildConfigPatch, RoleKind};
use crate::repository::{GuildRepository, RepoResult};

/// Read-through, write-through cache of guild configs
///
/// Entries live for the whole process. Two concurrent `get` calls for an
/// uncached guild may both hit the repository; updates to one guild are
/// serialized so a merge never works from a stale copy.
pub struct GuildConfigService {
    repo: Arc<dyn GuildRepository>,
    cache: DashMap<GuildId, GuildConfig>,
    locks: DashMap<GuildId, Arc<Mutex<()>>>,
}

impl GuildConfigService {
    pub fn new(repo: Arc<dyn GuildRepository>) -> Self {
        Self {
            repo,
            cache: DashMap::new(),
            locks: DashMap::new(),
        }
    }

    /// Get a guild's config, creating the default one on first use
    pub async fn get(&self, guild_id: GuildId) -> RepoResult<GuildConfig> {
        if let Some(config) = self.cache.get(&guild_id) {
            return Ok(config.clone());
        }

        let config = match self.repo.get_guild(guild_id).await? {
            Some(config) => config,
            None => {
                let config = GuildConfig::new(guild_id);
                self.repo.save_guild(&config).await?;
                info!("Created default config for guild {}", guild_id);
                config
            }
        };

        self.cache.insert(guild_id, config.clone());
        Ok(config)
    }

    /// Merge a patch into the guild's config and write it through
    pub async fn update(
        &self,
        guild_id: GuildId,
        patch: &GuildConfigPatch,
        updated_by: Option<UserId>,
    ) -> RepoResult<GuildConfig> {
        let lock = self.locks.entry(guild_id).or_default().clone();
        let _guard = lock.lock().await;

        let mut config = self.get(guild_id).await?;
        config.apply(patch);
        config.updated_by = updated_by;
        config.updated_at = Some(Utc::now());

        self.repo.save_guild(&config).await?;
        self.cache.insert(guild_id, config.clone());
        Ok(config)
    }

    pub async fn toggle_scheduler(
        &self,
        guild_id: GuildId,
        enabled: bool,
        updated_by: UserId,
    ) -> RepoResult<GuildConfig> {
        self.update(guild_id, &GuildConfigPatch::task_scheduler(enabled), Some(updated_by))
            .await
    }

    pub async fn toggle_leagues(
        &self,
        guild_id: GuildId,
        enabled: bool,
        updated_by: UserId,
    ) -> RepoResult<GuildConfig> {
        self.update(guild_id, &GuildConfigPatch::leagues(enabled), Some(updated_by))
            .await
    }

    pub async fn set_channel(
        &self,
        guild_id: GuildId,
        kind: ChannelKind,
        channel_id: ChannelId,
        updated_by: UserId,
    ) -> RepoResult<GuildConfig> {
        self.update(guild_id, &GuildConfigPatch::channel(kind, channel_id), Some(updated_by))
            .await
    }

    pub async fn set_role(
        &self,
        guild_id: GuildId,
        kind: RoleKind,
        role_id: RoleId,
        updated_by: UserId,
    ) -> RepoResult<GuildConfig> {
        self.update(guild_id, &GuildConfigPatch::role(kind, role_id), Some(updated_by))
            .await
    }

    pub async fn complete_task_setup(
        &self,
        guild_id: GuildId,
        updated_by: UserId,
    ) -> RepoResult<GuildConfig> {
        self.update(guild_id, &GuildConfigPatch::tasks_setup_complete(), Some(updated_by))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeGuilds {
        stored: StdMutex<HashMap<GuildId, GuildConfig>>,
        fetches: AtomicUsize,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl GuildRepository for FakeGuilds {
        async fn get_guild(&self, guild_id: GuildId) -> RepoResult<Option<GuildConfig>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.stored.lock().unwrap().get(&guild_id).cloned())
        }

        async fn save_guild(&self, config: &GuildConfig) -> RepoResult<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.stored
                .lock()
                .unwrap()
                .insert(config.guild_id, config.clone());
            Ok(())
        }

        async fn get_all_guilds(&self) -> RepoResult<Vec<GuildConfig>> {
            Ok(self.stored.lock().unwrap().values().cloned().collect())
        }
    }

    fn service_with(configs: Vec<GuildConfig>) -> (Arc<FakeGuilds>, GuildConfigService) {
        let repo = Arc::new(FakeGuilds::default());
        for config in configs {
            repo.stored.lock().unwrap().insert(config.guild_id, config);
        }
        let service = GuildConfigService::new(repo.clone());
        (repo, service)
    }

    #[tokio::test]
    async fn test_get_fetches_once() {
        let guild = GuildId::new(10);
        let (repo, service) = service_with(vec![GuildConfig::new(guild)]);

        service.get(guild).await.unwrap();
        assert_eq!(repo.fetches.load(Ordering::SeqCst), 1);

        service.get(guild).await.unwrap();
        assert_eq!(repo.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_creates_default_config() {
        let guild = GuildId::new(11);
        let (repo, service) = service_with(vec![]);

        let config = service.get(guild).await.unwrap();
        assert_eq!(config, GuildConfig::new(guild));
        assert_eq!(repo.saves.load(Ordering::SeqCst), 1);
        assert!(repo.stored.lock().unwrap().contains_key(&guild));
    }

    #[tokio::test]
    async fn test_update_merges_nested_toggles() {
        let guild = GuildId::new(12);
        let mut existing = GuildConfig::new(guild);
        existing.toggles.leagues = true;
        let (repo, service) = service_with(vec![existing]);

        let updated = service
            .toggle_scheduler(guild, true, UserId::new(99))
            .await
            .unwrap();

        assert!(updated.toggles.task_scheduler);
        assert!(updated.toggles.leagues);
        assert_eq!(updated.updated_by, Some(UserId::new(99)));
        assert!(updated.updated_at.is_some());

        let stored = repo.stored.lock().unwrap().get(&guild).cloned().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_is_visible_through_cache() {
        let guild = GuildId::new(13);
        let (repo, service) = service_with(vec![GuildConfig::new(guild)]);

        service
            .set_channel(guild, ChannelKind::TaskChannel, ChannelId::new(5), UserId::new(1))
            .await
            .unwrap();
        let config = service.get(guild).await.unwrap();

        assert_eq!(config.channels.task_channel, Some(ChannelId::new(5)));
        assert_eq!(repo.fetches.load(Ordering::SeqCst), 1);
    }
}

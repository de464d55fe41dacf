use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, GuildId, RoleId, UserId};
use serde::{Deserialize, Serialize};

/// Per-guild feature flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildToggles {
    pub task_scheduler: bool,
    pub leagues: bool,
}

/// Roles the bot relies on, bound by admins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildRoles {
    pub admin: Option<RoleId>,
    pub task_admin: Option<RoleId>,
    pub movie_admin: Option<RoleId>,
    pub task_user: Option<RoleId>,
    pub movie_user: Option<RoleId>,
}

/// Channels the bot posts into
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildChannels {
    pub announcements: Option<ChannelId>,
    pub task_channel: Option<ChannelId>,
    pub task_verification: Option<ChannelId>,
    pub movie_night: Option<ChannelId>,
    pub bot_log: Option<ChannelId>,
}

/// Which setup flows an admin has completed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupFlags {
    pub tasks_complete: bool,
    pub movies_complete: bool,
}

/// Role binding slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum RoleKind {
    #[name = "Admin"]
    Admin,
    #[name = "Task admin"]
    TaskAdmin,
    #[name = "Movie admin"]
    MovieAdmin,
    #[name = "Task participant"]
    TaskUser,
    #[name = "Movie night"]
    MovieUser,
}

/// Channel binding slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, poise::ChoiceParameter)]
pub enum ChannelKind {
    #[name = "Announcements"]
    Announcements,
    #[name = "Task channel"]
    TaskChannel,
    #[name = "Task verification"]
    TaskVerification,
    #[name = "Movie night"]
    MovieNight,
    #[name = "Bot log"]
    BotLog,
}

impl GuildRoles {
    pub fn get(&self, kind: RoleKind) -> Option<RoleId> {
        match kind {
            RoleKind::Admin => self.admin,
            RoleKind::TaskAdmin => self.task_admin,
            RoleKind::MovieAdmin => self.movie_admin,
            RoleKind::TaskUser => self.task_user,
            RoleKind::MovieUser => self.movie_user,
        }
    }
}

impl GuildChannels {
    pub fn get(&self, kind: ChannelKind) -> Option<ChannelId> {
        match kind {
            ChannelKind::Announcements => self.announcements,
            ChannelKind::TaskChannel => self.task_channel,
            ChannelKind::TaskVerification => self.task_verification,
            ChannelKind::MovieNight => self.movie_night,
            ChannelKind::BotLog => self.bot_log,
        }
    }
}

/// Persisted configuration of one guild
#[derive(Debug, Clone, PartialEq)]
pub struct GuildConfig {
    pub guild_id: GuildId,
    pub toggles: GuildToggles,
    pub roles: GuildRoles,
    pub channels: GuildChannels,
    pub setup: SetupFlags,
    pub updated_by: Option<UserId>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl GuildConfig {
    /// Default configuration created on a guild's first interaction
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            toggles: GuildToggles::default(),
            roles: GuildRoles::default(),
            channels: GuildChannels::default(),
            setup: SetupFlags::default(),
            updated_by: None,
            updated_at: None,
        }
    }

    /// Merge a patch into this config, one level deep
    pub fn apply(&mut self, patch: &GuildConfigPatch) {
        let t = &patch.toggles;
        merge(&mut self.toggles.task_scheduler, t.task_scheduler);
        merge(&mut self.toggles.leagues, t.leagues);

        let r = &patch.roles;
        merge_id(&mut self.roles.admin, r.admin);
        merge_id(&mut self.roles.task_admin, r.task_admin);
        merge_id(&mut self.roles.movie_admin, r.movie_admin);
        merge_id(&mut self.roles.task_user, r.task_user);
        merge_id(&mut self.roles.movie_user, r.movie_user);

        let c = &patch.channels;
        merge_id(&mut self.channels.announcements, c.announcements);
        merge_id(&mut self.channels.task_channel, c.task_channel);
        merge_id(&mut self.channels.task_verification, c.task_verification);
        merge_id(&mut self.channels.movie_night, c.movie_night);
        merge_id(&mut self.channels.bot_log, c.bot_log);

        let s = &patch.setup;
        merge(&mut self.setup.tasks_complete, s.tasks_complete);
        merge(&mut self.setup.movies_complete, s.movies_complete);
    }
}

fn merge<T: Copy>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn merge_id<T: Copy>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TogglesPatch {
    pub task_scheduler: Option<bool>,
    pub leagues: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolesPatch {
    pub admin: Option<RoleId>,
    pub task_admin: Option<RoleId>,
    pub movie_admin: Option<RoleId>,
    pub task_user: Option<RoleId>,
    pub movie_user: Option<RoleId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelsPatch {
    pub announcements: Option<ChannelId>,
    pub task_channel: Option<ChannelId>,
    pub task_verification: Option<ChannelId>,
    pub movie_night: Option<ChannelId>,
    pub bot_log: Option<ChannelId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupPatch {
    pub tasks_complete: Option<bool>,
    pub movies_complete: Option<bool>,
}

/// Partial update of a guild config; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildConfigPatch {
    pub toggles: TogglesPatch,
    pub roles: RolesPatch,
    pub channels: ChannelsPatch,
    pub setup: SetupPatch,
}

impl GuildConfigPatch {
    pub fn task_scheduler(enabled: bool) -> Self {
        let mut patch = Self::default();
        patch.toggles.task_scheduler = Some(enabled);
        patch
    }

    pub fn leagues(enabled: bool) -> Self {
        let mut patch = Self::default();
        patch.toggles.leagues = Some(enabled);
        patch
    }

    pub fn role(kind: RoleKind, role_id: RoleId) -> Self {
        let mut patch = Self::default();
        let slot = match kind {
            RoleKind::Admin => &mut patch.roles.admin,
            RoleKind::TaskAdmin => &mut patch.roles.task_admin,
            RoleKind::MovieAdmin => &mut patch.roles.movie_admin,
            RoleKind::TaskUser => &mut patch.roles.task_user,
            RoleKind::MovieUser => &mut patch.roles.movie_user,
        };
        *slot = Some(role_id);
        patch
    }

    pub fn channel(kind: ChannelKind, channel_id: ChannelId) -> Self {
        let mut patch = Self::default();
        let slot = match kind {
            ChannelKind::Announcements => &mut patch.channels.announcements,
            ChannelKind::TaskChannel => &mut patch.channels.task_channel,
            ChannelKind::TaskVerification => &mut patch.channels.task_verification,
            ChannelKind::MovieNight => &mut patch.channels.movie_night,
            ChannelKind::BotLog => &mut patch.channels.bot_log,
        };
        *slot = Some(channel_id);
        patch
    }

    pub fn tasks_setup_complete() -> Self {
        let mut patch = Self::default();
        patch.setup.tasks_complete = Some(true);
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_sibling_toggles() {
        let mut config = GuildConfig::new(GuildId::new(1));
        config.toggles.leagues = true;

        config.apply(&GuildConfigPatch::task_scheduler(true));

        assert!(config.toggles.task_scheduler);
        assert!(config.toggles.leagues);
    }

    #[test]
    fn test_apply_role_and_channel() {
        let mut config = GuildConfig::new(GuildId::new(1));
        config.channels.bot_log = Some(ChannelId::new(9));

        config.apply(&GuildConfigPatch::role(RoleKind::TaskAdmin, RoleId::new(5)));
        config.apply(&GuildConfigPatch::channel(ChannelKind::TaskChannel, ChannelId::new(6)));

        assert_eq!(config.roles.get(RoleKind::TaskAdmin), Some(RoleId::new(5)));
        assert_eq!(config.channels.get(ChannelKind::TaskChannel), Some(ChannelId::new(6)));
        assert_eq!(config.channels.bot_log, Some(ChannelId::new(9)));
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut config = GuildConfig::new(GuildId::new(1));
        config.toggles.task_scheduler = true;
        let before = config.clone();

        config.apply(&GuildConfigPatch::default());
        assert_eq!(config, before);
    }

    #[test]
    fn test_toggles_deserialize_missing_fields() {
        let toggles: GuildToggles = serde_json::from_str(r#"{"leagues": true}"#).unwrap();
        assert!(toggles.leagues);
        assert!(!toggles.task_scheduler);
    }
}

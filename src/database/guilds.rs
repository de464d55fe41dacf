use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::GuildId;
use sqlx::types::Json;

use super::{Database, snowflake};
use crate::models::{GuildChannels, GuildConfig, GuildRoles, GuildToggles, SetupFlags};
use crate::repository::{GuildRepository, RepoResult};

type GuildRow = (
    i64,
    Json<GuildToggles>,
    Json<GuildRoles>,
    Json<GuildChannels>,
    Json<SetupFlags>,
    Option<i64>,
    Option<DateTime<Utc>>,
);

fn into_config(row: GuildRow) -> GuildConfig {
    let (guild_id, toggles, roles, channels, setup, updated_by, updated_at) = row;
    GuildConfig {
        guild_id: snowflake(guild_id),
        toggles: toggles.0,
        roles: roles.0,
        channels: channels.0,
        setup: setup.0,
        updated_by: updated_by.map(snowflake),
        updated_at,
    }
}

const SELECT_GUILD: &str = r#"
    SELECT guild_id, toggles, roles, channels, setup, updated_by, updated_at
    FROM guilds
"#;

#[async_trait]
impl GuildRepository for Database {
    async fn get_guild(&self, guild_id: GuildId) -> RepoResult<Option<GuildConfig>> {
        let id = self.check(guild_id)?;
        let row: Option<GuildRow> = sqlx::query_as(&format!("{} WHERE guild_id = $1", SELECT_GUILD))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.map(into_config))
    }

    async fn save_guild(&self, config: &GuildConfig) -> RepoResult<()> {
        let id = self.check(config.guild_id)?;
        sqlx::query(
            r#"
            INSERT INTO guilds (guild_id, toggles, roles, channels, setup, updated_by, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (guild_id)
            DO UPDATE SET
                toggles = $2,
                roles = $3,
                channels = $4,
                setup = $5,
                updated_by = $6,
                updated_at = $7
            "#,
        )
        .bind(id)
        .bind(Json(&config.toggles))
        .bind(Json(&config.roles))
        .bind(Json(&config.channels))
        .bind(Json(&config.setup))
        .bind(config.updated_by.map(|u| u.get() as i64))
        .bind(config.updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_all_guilds(&self) -> RepoResult<Vec<GuildConfig>> {
        let rows: Vec<GuildRow> = sqlx::query_as(SELECT_GUILD)
            .fetch_all(self.pool())
            .await?;

        Ok(rows
            .into_iter()
            .map(into_config)
            .filter(|config| self.scope.permits(config.guild_id))
            .collect())
    }
}

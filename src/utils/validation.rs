use poise::serenity_prelude::{self as serenity, GuildId, Member, RoleId};
use tracing::warn;

use crate::{
    models::{Context, Data, Error, GuildConfig},
    utils::messages::build_permission_error,
    utils::permissions::{AccessLevel, bound_roles_for, has_access, roles_named},
};

/// Validation error types
#[derive(Debug)]
pub enum ValidationError {
    NotInGuild,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NotInGuild => write!(f, "This command must be used in a server"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Extract guild ID from context, returning error if not in a guild
pub fn require_guild(guild_id: Option<GuildId>) -> Result<GuildId, ValidationError> {
    guild_id.ok_or(ValidationError::NotInGuild)
}

/// Check a guild member against the access rules of the guild config
pub async fn member_has_access(
    http: &serenity::Http,
    member: &Member,
    config: &GuildConfig,
    admin_role_name: &str,
    level: AccessLevel,
) -> bool {
    let is_administrator = member
        .permissions
        .is_some_and(|permissions| permissions.administrator());
    let bound = bound_roles_for(level, &config.roles);

    let named: Vec<RoleId> = if bound.is_empty() {
        match member.guild_id.roles(http).await {
            Ok(roles) => roles_named(
                roles.into_iter().map(|(id, role)| (id, role.name)),
                admin_role_name,
            ),
            Err(e) => {
                warn!("Failed to fetch roles for guild {}: {}", member.guild_id, e);
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    has_access(&member.roles, is_administrator, &bound, &named)
}

/// Gate a slash command behind an access level
///
/// Replies with an ephemeral permission error and returns false when the
/// invoking member lacks access.
pub async fn ensure_access(ctx: Context<'_>, level: AccessLevel) -> Result<bool, Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    let config = ctx.data().guild_configs.get(guild_id).await?;

    let allowed = match ctx.author_member().await {
        Some(member) => {
            member_has_access(
                ctx.http(),
                &member,
                &config,
                &ctx.data().config.admin_role_name,
                level,
            )
            .await
        }
        None => false,
    };

    if !allowed {
        ctx.send(
            poise::CreateReply::default()
                .content(build_permission_error(level.label()))
                .ephemeral(true),
        )
        .await?;
    }

    Ok(allowed)
}

/// Access check for component interactions
pub async fn interaction_has_access(
    ctx: &serenity::Context,
    member: Option<&Member>,
    data: &Data,
    level: AccessLevel,
) -> Result<bool, Error> {
    let Some(member) = member else {
        return Ok(false);
    };
    let config = data.guild_configs.get(member.guild_id).await?;
    Ok(member_has_access(&ctx.http, member, &config, &data.config.admin_role_name, level).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_guild() {
        assert!(require_guild(None).is_err());
        assert!(require_guild(Some(GuildId::new(123))).is_ok());
    }
}

use poise::ChoiceParameter;
use poise::serenity_prelude::{GuildChannel, Role};
use tracing::info;

use super::reply_ephemeral;
use crate::{
    handlers::{task_setup_components, task_setup_summary},
    models::{ChannelKind, Context, Error, GuildConfig, RoleKind},
    utils::messages::format_success,
    utils::permissions::AccessLevel,
    utils::validation::{ensure_access, require_guild},
};

/// Configure BustinBot for this server
#[poise::command(
    slash_command,
    guild_only,
    subcommands("setup_channel", "setup_role", "setup_show", "setup_tasks"),
    subcommand_required
)]
pub async fn setup(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Bind a channel used by the bot
#[poise::command(slash_command, guild_only, rename = "channel")]
pub async fn setup_channel(
    ctx: Context<'_>,
    #[description = "What the channel is used for"] kind: ChannelKind,
    #[description = "The channel"]
    #[channel_types("Text")]
    channel: GuildChannel,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::Admin).await? {
        return Ok(());
    }

    ctx.data()
        .guild_configs
        .set_channel(guild_id, kind, channel.id, ctx.author().id)
        .await?;

    info!("Bound {} channel {} in guild {}", kind.name(), channel.id, guild_id);
    reply_ephemeral(
        ctx,
        format_success(&format!("{} channel set to <#{}>.", kind.name(), channel.id)),
    )
    .await
}

/// Bind a role used for permissions
#[poise::command(slash_command, guild_only, rename = "role")]
pub async fn setup_role(
    ctx: Context<'_>,
    #[description = "What the role grants"] kind: RoleKind,
    #[description = "The role"] role: Role,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::Admin).await? {
        return Ok(());
    }

    ctx.data()
        .guild_configs
        .set_role(guild_id, kind, role.id, ctx.author().id)
        .await?;

    info!("Bound {} role {} in guild {}", kind.name(), role.id, guild_id);
    reply_ephemeral(
        ctx,
        format_success(&format!("{} role set to <@&{}>.", kind.name(), role.id)),
    )
    .await
}

/// Render the whole config for display
pub fn format_config(config: &GuildConfig) -> String {
    let on_off = |enabled: bool| if enabled { "on" } else { "off" };

    let mut lines = vec![
        "**Toggles**".to_string(),
        format!("Task scheduler: {}", on_off(config.toggles.task_scheduler)),
        format!("Leagues tasks: {}", on_off(config.toggles.leagues)),
        String::new(),
        "**Channels**".to_string(),
    ];
    for kind in [
        ChannelKind::Announcements,
        ChannelKind::TaskChannel,
        ChannelKind::TaskVerification,
        ChannelKind::MovieNight,
        ChannelKind::BotLog,
    ] {
        let value = config
            .channels
            .get(kind)
            .map(|c| format!("<#{}>", c))
            .unwrap_or_else(|| "*not set*".to_string());
        lines.push(format!("{}: {}", kind.name(), value));
    }

    lines.push(String::new());
    lines.push("**Roles**".to_string());
    for kind in [
        RoleKind::Admin,
        RoleKind::TaskAdmin,
        RoleKind::MovieAdmin,
        RoleKind::TaskUser,
        RoleKind::MovieUser,
    ] {
        let value = config
            .roles
            .get(kind)
            .map(|r| format!("<@&{}>", r))
            .unwrap_or_else(|| "*not set*".to_string());
        lines.push(format!("{}: {}", kind.name(), value));
    }

    lines.push(String::new());
    lines.push(format!(
        "Task setup complete: {}",
        if config.setup.tasks_complete { "yes" } else { "no" }
    ));
    lines.join("\n")
}

/// Show the current configuration
#[poise::command(slash_command, guild_only, rename = "show")]
pub async fn setup_show(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::Admin).await? {
        return Ok(());
    }

    let config = ctx.data().guild_configs.get(guild_id).await?;
    reply_ephemeral(ctx, format_config(&config)).await
}

/// Walk through task channel and role setup
#[poise::command(slash_command, guild_only, rename = "tasks")]
pub async fn setup_tasks(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::Admin).await? {
        return Ok(());
    }

    let config = ctx.data().guild_configs.get(guild_id).await?;
    ctx.send(
        poise::CreateReply::default()
            .content(task_setup_summary(&config))
            .components(task_setup_components(&config))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use poise::serenity_prelude::{ChannelId, GuildId};

    #[test]
    fn test_format_config() {
        let mut config = GuildConfig::new(GuildId::new(1));
        config.toggles.task_scheduler = true;
        config.channels.bot_log = Some(ChannelId::new(77));

        let text = format_config(&config);
        assert!(text.contains("Task scheduler: on"));
        assert!(text.contains("Leagues tasks: off"));
        assert!(text.contains("Bot log: <#77>"));
        assert!(text.contains("Task admin: *not set*"));
        assert!(text.contains("Task setup complete: no"));
    }
}

use tracing::info;

use super::reply_ephemeral;
use crate::{
    models::{Context, Error, Keyword},
    repository::KeywordRepository,
    utils::messages::{format_error, format_info, format_success},
    utils::permissions::AccessLevel,
    utils::string_utils::{is_empty_or_whitespace, slugify, truncate_message},
    utils::validation::{ensure_access, require_guild},
};

/// Manage verification keywords
#[poise::command(
    slash_command,
    guild_only,
    subcommands("keyword_add", "keyword_remove", "keyword_list", "keyword_reset"),
    subcommand_required
)]
pub async fn keyword(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Add a keyword to the rotation
#[poise::command(slash_command, guild_only, rename = "add")]
pub async fn keyword_add(
    ctx: Context<'_>,
    #[description = "Word players must include in their screenshots"] word: String,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::TaskAdmin).await? {
        return Ok(());
    }

    let keyword = Keyword::new(&word);
    if is_empty_or_whitespace(&keyword.id) {
        return reply_ephemeral(ctx, format_error("Keywords need at least one letter or digit.")).await;
    }

    let added = ctx.data().db.add_keyword(guild_id, &keyword).await?;
    let message = if added {
        info!("Keyword '{}' added in guild {}", keyword.id, guild_id);
        format_success(&format!("Added keyword **{}**.", keyword.word))
    } else {
        format_error(&format!("**{}** is already a keyword.", keyword.word))
    };
    reply_ephemeral(ctx, message).await
}

/// Remove a keyword from the rotation
#[poise::command(slash_command, guild_only, rename = "remove")]
pub async fn keyword_remove(
    ctx: Context<'_>,
    #[description = "Keyword to remove"] word: String,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::TaskAdmin).await? {
        return Ok(());
    }

    let removed = ctx.data().db.remove_keyword(guild_id, &slugify(&word)).await?;
    let message = if removed {
        format_success(&format!("Removed keyword **{}**.", word.trim()))
    } else {
        format_error(&format!("**{}** is not a keyword.", word.trim()))
    };
    reply_ephemeral(ctx, message).await
}

/// Keywords sorted least recently used first
pub fn format_keyword_list(keywords: &[Keyword]) -> String {
    if keywords.is_empty() {
        return format_info("No keywords yet. Add one with `/keyword add`.");
    }

    let mut sorted: Vec<&Keyword> = keywords.iter().collect();
    sorted.sort_by(|a, b| {
        a.last_used_millis()
            .cmp(&b.last_used_millis())
            .then_with(|| a.id.cmp(&b.id))
    });

    let lines: Vec<String> = sorted
        .into_iter()
        .map(|k| match k.last_used_event {
            Some(event) => format!("**{}** used {} time(s), last in event #{}", k.word, k.times_used, event),
            None => format!("**{}** never used", k.word),
        })
        .collect();
    truncate_message(&lines.join("\n"), 2000)
}

/// List keywords and how often they were used
#[poise::command(slash_command, guild_only, rename = "list")]
pub async fn keyword_list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::TaskAdmin).await? {
        return Ok(());
    }

    let keywords = ctx.data().db.get_all_keywords(guild_id).await?;
    reply_ephemeral(ctx, format_keyword_list(&keywords)).await
}

/// Forget keyword usage so every keyword is eligible again
#[poise::command(slash_command, guild_only, rename = "reset")]
pub async fn keyword_reset(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::Admin).await? {
        return Ok(());
    }

    let count = ctx.data().db.reset_keyword_usage(guild_id).await?;
    info!("Reset usage of {} keyword(s) in guild {}", count, guild_id);
    reply_ephemeral(
        ctx,
        format_success(&format!("Reset usage history of {} keyword(s).", count)),
    )
    .await
}

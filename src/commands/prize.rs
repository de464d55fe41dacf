use poise::serenity_prelude::CreateEmbed;
use tracing::{error, info};

use super::reply_ephemeral;
use crate::{
    constants::EMBED_COLOUR,
    models::{Context, Error},
    repository::PrizeDrawRepository,
    schedule::{DiscordWorkflows, JobKind, format_prize_announcement, run_job},
    utils::messages::{format_error, format_info, format_success},
    utils::permissions::AccessLevel,
    utils::validation::{ensure_access, require_guild},
};

/// Fortnightly prize draws
#[poise::command(
    slash_command,
    guild_only,
    subcommands("prize_draw_now", "prize_last"),
    subcommand_required
)]
pub async fn prize(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Snapshot entries, roll winners and announce them right away
#[poise::command(slash_command, guild_only, rename = "draw_now")]
pub async fn prize_draw_now(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::TaskAdmin).await? {
        return Ok(());
    }
    ctx.defer_ephemeral().await?;

    let workflows = DiscordWorkflows::new(ctx.serenity_context().http.clone(), ctx.data().clone());

    info!("Prize draw triggered manually in guild {} by {}", guild_id, ctx.author().id);
    match run_job(JobKind::PrizeDraw, guild_id, &workflows).await {
        Ok(()) => reply_ephemeral(ctx, format_success("Prize draw complete.")).await,
        Err(e) => {
            error!("Manual prize draw failed in guild {}: {}", guild_id, e);
            reply_ephemeral(ctx, format_error("The prize draw failed, check the bot logs.")).await
        }
    }
}

/// Show the most recent prize draw
#[poise::command(slash_command, guild_only, rename = "last")]
pub async fn prize_last(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;

    let Some(snapshot) = ctx.data().db.get_latest_snapshot(guild_id).await? else {
        return reply_ephemeral(ctx, format_info("No prize draw has been held yet.")).await;
    };

    let description = if snapshot.rolled_at.is_some() {
        format_prize_announcement(&snapshot, &snapshot.winners)
    } else {
        format_info(&format!(
            "Draw #{} has {} entries and has not been rolled yet.",
            snapshot.id,
            snapshot.total_entries()
        ))
    };

    let embed = CreateEmbed::new()
        .title("🏆 Last prize draw")
        .description(description)
        .colour(EMBED_COLOUR);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

use poise::serenity_prelude as serenity;
use tracing::info;

use super::interaction::reply_ephemeral;
use crate::models::{Data, Error, Vote};
use crate::repository::TaskEventRepository;
use crate::services::{FeedbackOutcome, record_feedback};
use crate::utils::messages::{format_error, format_info, format_success};
use crate::utils::validation::require_guild;

/// Handle a 👍/👎 on an event task
pub(super) async fn handle_task_feedback(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    vote: Vote,
    task_id: &str,
    event_id: i64,
) -> Result<(), Error> {
    let guild_id = require_guild(interaction.guild_id)?;

    let outcome = record_feedback(
        &data.feedback_locks,
        &data.db,
        &data.db,
        guild_id,
        event_id,
        task_id,
        interaction.user.id,
        vote,
    )
    .await?;

    let message = match outcome {
        FeedbackOutcome::Recorded { .. } => {
            let verdict = match vote {
                Vote::Up => "more",
                Vote::Down => "less",
            };
            format_success(&format!(
                "Thanks for the feedback! This task will show up {} often.",
                verdict
            ))
        }
        FeedbackOutcome::Unchanged => format_info("You already rated this task that way."),
        FeedbackOutcome::UnknownTask => format_error("This task is no longer part of an event."),
    };

    reply_ephemeral(ctx, interaction, message).await
}

/// Handle a vote in a category task poll
pub(super) async fn handle_task_vote(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    poll_id: i64,
    task_id: &str,
) -> Result<(), Error> {
    let guild_id = require_guild(interaction.guild_id)?;
    let user_id = interaction.user.id;

    let recorded = data
        .db
        .record_poll_vote(guild_id, poll_id, user_id, task_id)
        .await?;

    let message = if recorded {
        info!("User {} voted for task {} in poll {}", user_id, task_id, poll_id);
        format_success("Your vote has been counted. Voting again changes it.")
    } else {
        format_error("This poll has closed.")
    };

    reply_ephemeral(ctx, interaction, message).await
}

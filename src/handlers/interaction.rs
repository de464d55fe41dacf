use poise::serenity_prelude::{
    self as serenity, CreateInteractionResponse, CreateInteractionResponseMessage,
};
use tracing::{error, warn};

use super::custom_id::ComponentAction;
use super::movies::handle_movie_vote;
use super::setup::handle_task_setup;
use super::tasks::{handle_task_feedback, handle_task_vote};
use super::verification::handle_review;
use crate::models::{Data, Error};
use crate::utils::messages::build_database_error;

/// Route a component interaction to its handler by custom id
pub async fn handle_interaction(
    ctx: &serenity::Context,
    interaction: serenity::ComponentInteraction,
    data: &Data,
) {
    let action = match interaction.data.custom_id.parse::<ComponentAction>() {
        Ok(action) => action,
        Err(e) => {
            warn!("Ignoring component interaction: {}", e);
            return;
        }
    };

    if let Some(guild_id) = interaction.guild_id
        && !data.config.guild_scope().permits(guild_id)
    {
        return;
    }

    let result = match action {
        ComponentAction::TaskFeedback { vote, task_id, event_id } => {
            handle_task_feedback(ctx, &interaction, data, vote, &task_id, event_id).await
        }
        ComponentAction::TaskVote { poll_id, task_id } => {
            handle_task_vote(ctx, &interaction, data, poll_id, &task_id).await
        }
        ComponentAction::MovieVote { poll_id, movie_id } => {
            handle_movie_vote(ctx, &interaction, data, poll_id, movie_id).await
        }
        ComponentAction::Approve { tier, submission_id } => {
            handle_review(ctx, &interaction, data, submission_id, Some(tier)).await
        }
        ComponentAction::Reject { submission_id } => {
            handle_review(ctx, &interaction, data, submission_id, None).await
        }
        ComponentAction::TaskSetup(field) => handle_task_setup(ctx, &interaction, data, field).await,
    };

    if let Err(e) = &result {
        error!(
            "Failed to handle component '{}': {}",
            interaction.data.custom_id, e
        );
    }
    if let Some(notice) = failure_notice(&result)
        && let Err(e) = reply_ephemeral(ctx, &interaction, notice).await
    {
        warn!(
            "Could not report failure of component '{}': {}",
            interaction.data.custom_id, e
        );
    }
}

/// Generic reply for a failed handler; internal error details stay in the logs
fn failure_notice(result: &Result<(), Error>) -> Option<String> {
    result.as_ref().err().map(|_| build_database_error())
}

/// Send an ephemeral reply to a component interaction
pub(super) async fn reply_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: String,
) -> Result<(), Error> {
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    );
    interaction.create_response(ctx, response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_notice_is_generic() {
        let failed: Result<(), Error> = Err("connection reset by peer".into());
        let notice = failure_notice(&failed).unwrap();

        assert_eq!(notice, build_database_error());
        assert!(!notice.contains("connection reset"));
        assert_eq!(failure_notice(&Ok(())), None);
    }
}

use poise::serenity_prelude::{
    self as serenity, ButtonStyle, CreateActionRow, CreateButton, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};

use super::custom_id::ComponentAction;
use super::interaction::reply_ephemeral;
use crate::models::{CompletionTier, Data, Error};
use crate::services::{ReviewOutcome, review_submission};
use crate::utils::messages::{build_permission_error, format_error, format_info};
use crate::utils::permissions::AccessLevel;
use crate::utils::validation::{interaction_has_access, require_guild};

/// Approve-at-tier and reject buttons for a submission in the verification channel
pub fn review_buttons(submission_id: i64) -> Vec<CreateActionRow> {
    let mut buttons: Vec<CreateButton> = CompletionTier::ALL
        .iter()
        .map(|tier| {
            let action = ComponentAction::Approve {
                tier: *tier,
                submission_id,
            };
            let label = format!("{} {}", tier.emoji(), tier.label());
            CreateButton::new(action.custom_id())
                .label(label)
                .style(ButtonStyle::Success)
        })
        .collect();

    buttons.push(
        CreateButton::new(ComponentAction::Reject { submission_id }.custom_id())
            .label("Reject")
            .style(ButtonStyle::Danger),
    );

    vec![CreateActionRow::Buttons(buttons)]
}

/// Handle an approve or reject click on a submission
pub(super) async fn handle_review(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    submission_id: i64,
    tier: Option<CompletionTier>,
) -> Result<(), Error> {
    let guild_id = require_guild(interaction.guild_id)?;

    if !interaction_has_access(ctx, interaction.member.as_ref(), data, AccessLevel::TaskAdmin).await? {
        let denial = build_permission_error(AccessLevel::TaskAdmin.label());
        return reply_ephemeral(ctx, interaction, denial).await;
    }

    let reviewer = interaction.user.id;
    let outcome =
        review_submission(&data.db, &data.db, guild_id, submission_id, tier, reviewer).await?;

    let submission = match outcome {
        ReviewOutcome::Reviewed(submission) => submission,
        ReviewOutcome::AlreadyReviewed(submission) => {
            let message = format_info(&format!(
                "This submission was already {}.",
                submission.status.as_str()
            ));
            return reply_ephemeral(ctx, interaction, message).await;
        }
        ReviewOutcome::NotFound => {
            return reply_ephemeral(ctx, interaction, format_error("Submission not found.")).await;
        }
    };

    let verdict = match tier {
        Some(tier) => format!(
            "{} Approved **{}** for <@{}> by <@{}>",
            tier.emoji(),
            tier.label(),
            submission.user_id,
            reviewer
        ),
        None => format!("❌ Rejected for <@{}> by <@{}>", submission.user_id, reviewer),
    };

    let response = CreateInteractionResponse::UpdateMessage(
        CreateInteractionResponseMessage::new()
            .content(verdict)
            .components(vec![]),
    );
    interaction.create_response(ctx, response).await?;

    Ok(())
}

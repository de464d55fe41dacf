use poise::serenity_prelude as serenity;
use tracing::info;

use super::interaction::reply_ephemeral;
use crate::models::{Data, Error};
use crate::repository::MovieRepository;
use crate::utils::messages::{format_error, format_success};
use crate::utils::validation::require_guild;

/// Handle a vote in a movie night poll
pub(super) async fn handle_movie_vote(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
    poll_id: i64,
    movie_id: i64,
) -> Result<(), Error> {
    let guild_id = require_guild(interaction.guild_id)?;
    let user_id = interaction.user.id;

    let recorded = data
        .db
        .record_movie_vote(guild_id, poll_id, user_id, movie_id)
        .await?;
    if !recorded {
        return reply_ephemeral(ctx, interaction, format_error("This movie poll has closed.")).await;
    }

    let title = data
        .db
        .get_movie(guild_id, movie_id)
        .await?
        .map(|movie| movie.title)
        .unwrap_or_else(|| "that movie".to_string());

    info!("User {} voted for movie {} in poll {}", user_id, movie_id, poll_id);
    reply_ephemeral(
        ctx,
        interaction,
        format_success(&format!("You voted for **{}**.", title)),
    )
    .await
}

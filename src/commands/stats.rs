use poise::serenity_prelude::{CreateEmbed, User};

use crate::{
    constants::EMBED_COLOUR,
    models::{CompletionTier, Context, Error, UserStats},
    repository::UserRepository,
    utils::validation::require_guild,
};

/// Stat lines shown on a user's card
pub fn format_user_stats(stats: &UserStats) -> String {
    let mut lines = vec![format!("Tasks completed: **{}**", stats.tasks_completed)];
    lines.extend(
        [CompletionTier::Gold, CompletionTier::Silver, CompletionTier::Bronze]
            .into_iter()
            .map(|tier| format!("{} {}: {}", tier.emoji(), tier.label(), stats.tier_count(tier))),
    );
    lines.push(format!("Prize draws won: **{}**", stats.prize_wins));
    lines.push(format!("Movies suggested: **{}**", stats.movies_added));
    lines.join("\n")
}

/// Show task and movie night stats for a member
#[poise::command(slash_command, guild_only)]
pub async fn stats(
    ctx: Context<'_>,
    #[description = "Member to look up (defaults to you)"] user: Option<User>,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    let user = user.as_ref().unwrap_or_else(|| ctx.author());

    let stats = ctx.data().db.get_user_stats(guild_id, user.id).await?;
    let embed = CreateEmbed::new()
        .title(format!("📈 Stats for {}", user.name))
        .description(format_user_stats(&stats))
        .colour(EMBED_COLOUR);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use poise::serenity_prelude::UserId;

    #[test]
    fn test_format_user_stats() {
        let stats = UserStats {
            tasks_completed: 3,
            gold: 1,
            bronze: 2,
            prize_wins: 1,
            ..UserStats::empty(UserId::new(1))
        };

        let text = format_user_stats(&stats);
        assert!(text.starts_with("Tasks completed: **3**"));
        assert!(text.contains(&format!("{} {}: 1", CompletionTier::Gold.emoji(), CompletionTier::Gold.label())));
        assert!(text.contains(&format!("{} {}: 2", CompletionTier::Bronze.emoji(), CompletionTier::Bronze.label())));
        assert!(text.contains("Prize draws won: **1**"));
        assert!(text.ends_with("Movies suggested: **0**"));
    }
}

use chrono::Utc;
use poise::serenity_prelude::{self as serenity, CreateEmbed, CreateMessage, GuildId, UserId};
use tracing::{info, warn};

use crate::constants::{EMBED_COLOUR, PRIZE_DRAW_WINNERS};
use crate::models::{Data, Error, PrizeDrawSnapshot};
use crate::repository::{PrizeDrawRepository, SubmissionRepository, UserRepository};
use crate::selection::ThreadRandom;
use crate::services::{build_prize_entries, draw_period, roll_winners};
use crate::utils::datetime::discord_full;

/// Freeze the entries earned since the last draw
pub async fn generate_prize_snapshot(data: &Data, guild_id: GuildId) -> Result<i64, Error> {
    let previous = data.db.get_latest_snapshot(guild_id).await?;
    let (period_start, period_end) = draw_period(previous.as_ref(), Utc::now());

    let submissions = data
        .db
        .get_approved_between(guild_id, period_start, period_end)
        .await?;
    let entries = build_prize_entries(&submissions);

    let snapshot = data
        .db
        .create_snapshot(guild_id, period_start, period_end, &entries)
        .await?;

    info!(
        "Prize snapshot {} for guild {}: {} participant(s), {} entries",
        snapshot.id,
        guild_id,
        snapshot.entries.len(),
        snapshot.total_entries()
    );
    Ok(snapshot.id)
}

/// Roll the winners of a snapshot; a snapshot is only ever rolled once
pub async fn roll_prize_winners(
    data: &Data,
    guild_id: GuildId,
    snapshot_id: i64,
) -> Result<Vec<UserId>, Error> {
    let snapshot = data
        .db
        .get_snapshot(guild_id, snapshot_id)
        .await?
        .ok_or_else(|| format!("Prize snapshot {} not found", snapshot_id))?;

    if snapshot.rolled_at.is_some() {
        warn!("Prize snapshot {} was already rolled", snapshot_id);
        return Ok(snapshot.winners);
    }

    let winners = roll_winners(&snapshot.entries, PRIZE_DRAW_WINNERS, &mut ThreadRandom);
    data.db.set_winners(guild_id, snapshot_id, &winners).await?;
    for winner in &winners {
        data.db.record_prize_win(guild_id, *winner).await?;
    }

    info!("Rolled {} winner(s) for prize snapshot {}", winners.len(), snapshot_id);
    Ok(winners)
}

/// Announcement text for a finished draw
pub fn format_prize_announcement(snapshot: &PrizeDrawSnapshot, winners: &[UserId]) -> String {
    let period = format!(
        "Draw period: {} to {}",
        discord_full(snapshot.period_start),
        discord_full(snapshot.period_end)
    );

    if winners.is_empty() {
        return format!("No task completions were approved this period, so there is no winner.\n{}", period);
    }

    let mentions: Vec<String> = winners.iter().map(|w| format!("<@{}>", w)).collect();
    format!(
        "Congratulations {}! 🎉\n{} participant(s) earned {} entries.\n{}",
        mentions.join(", "),
        snapshot.entries.len(),
        snapshot.total_entries(),
        period
    )
}

/// Post the result of a draw to the announcements channel
pub async fn announce_prize_winners(
    http: &serenity::Http,
    data: &Data,
    guild_id: GuildId,
    snapshot_id: i64,
    winners: &[UserId],
) -> Result<(), Error> {
    let config = data.guild_configs.get(guild_id).await?;
    let Some(channel_id) = config
        .channels
        .announcements
        .or(config.channels.task_channel)
    else {
        warn!("No announcement channel configured for guild {}", guild_id);
        return Ok(());
    };

    let snapshot = data
        .db
        .get_snapshot(guild_id, snapshot_id)
        .await?
        .ok_or_else(|| format!("Prize snapshot {} not found", snapshot_id))?;

    let embed = CreateEmbed::new()
        .title("🏆 Prize draw")
        .description(format_prize_announcement(&snapshot, winners))
        .colour(EMBED_COLOUR);
    channel_id
        .send_message(http, CreateMessage::new().embed(embed))
        .await?;

    info!("Announced prize snapshot {} in guild {}", snapshot_id, guild_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrizeEntry;
    use chrono::TimeZone;

    fn snapshot(entries: Vec<PrizeEntry>) -> PrizeDrawSnapshot {
        PrizeDrawSnapshot {
            id: 1,
            guild_id: GuildId::new(1),
            period_start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            period_end: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            entries,
            winners: vec![],
            rolled_at: None,
        }
    }

    #[test]
    fn test_announcement_with_winner() {
        let snapshot = snapshot(vec![
            PrizeEntry { user_id: UserId::new(11), entries: 3 },
            PrizeEntry { user_id: UserId::new(12), entries: 2 },
        ]);

        let text = format_prize_announcement(&snapshot, &[UserId::new(11)]);
        assert!(text.starts_with("Congratulations <@11>!"));
        assert!(text.contains("2 participant(s) earned 5 entries"));
        assert!(text.contains("<t:1704067200:F>"));
    }

    #[test]
    fn test_announcement_without_entries() {
        let text = format_prize_announcement(&snapshot(vec![]), &[]);
        assert!(text.contains("no winner"));
    }
}

use chrono::{DateTime, NaiveDateTime, Utc};
use poise::serenity_prelude::{
    ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateMessage, EditMessage,
};
use tracing::{info, warn};

use super::reply_ephemeral;
use crate::{
    constants::{BUTTON_LABEL_MAX, EMBED_COLOUR, MOVIE_POLL_SIZE},
    handlers::ComponentAction,
    models::{Context, Error, Movie, MoviePoll},
    repository::{MovieRepository, UserRepository},
    selection::{RandomSource, ThreadRandom, shuffle},
    utils::datetime::{discord_full, discord_relative},
    utils::messages::{build_setup_required, format_error, format_info, format_success},
    utils::permissions::AccessLevel,
    utils::string_utils::{is_empty_or_whitespace, take_chars, truncate_message},
    utils::tally::{count_votes, winning_option},
    utils::validation::{ensure_access, require_guild},
};

/// Movie night list and polls
#[poise::command(
    slash_command,
    guild_only,
    subcommands(
        "movie_add",
        "movie_remove",
        "movie_list",
        "movie_pick",
        "movie_poll",
        "movie_close_poll",
        "movie_watched",
        "movie_night"
    ),
    subcommand_required
)]
pub async fn movie(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Suggest a movie
#[poise::command(slash_command, guild_only, rename = "add")]
pub async fn movie_add(
    ctx: Context<'_>,
    #[description = "Movie title"] title: String,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if is_empty_or_whitespace(&title) {
        return reply_ephemeral(ctx, format_error("The title can't be empty.")).await;
    }

    let user_id = ctx.author().id;
    let db = &ctx.data().db;
    let Some(movie) = db.add_movie(guild_id, title.trim(), user_id).await? else {
        return reply_ephemeral(
            ctx,
            format_error(&format!("**{}** is already on the list.", title.trim())),
        )
        .await;
    };
    db.record_movie_added(guild_id, user_id).await?;

    info!("Movie {} '{}' added in guild {} by {}", movie.id, movie.title, guild_id, user_id);
    ctx.say(format_success(&format!("<@{}> added **{}** to the movie list.", user_id, movie.title)))
        .await?;
    Ok(())
}

/// Remove a movie from the list
#[poise::command(slash_command, guild_only, rename = "remove")]
pub async fn movie_remove(
    ctx: Context<'_>,
    #[description = "Movie title"] title: String,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::MovieAdmin).await? {
        return Ok(());
    }

    let db = &ctx.data().db;
    let Some(movie) = db.find_movie_by_title(guild_id, &title).await? else {
        return reply_ephemeral(ctx, format_error(&format!("**{}** is not on the list.", title.trim()))).await;
    };
    db.remove_movie(guild_id, movie.id).await?;

    reply_ephemeral(ctx, format_success(&format!("Removed **{}**.", movie.title))).await
}

/// Unwatched movies first, then the ones already seen
pub fn format_movie_list(movies: &[Movie]) -> String {
    if movies.is_empty() {
        return format_info("The movie list is empty. Suggest one with `/movie add`.");
    }

    let (watched, unwatched): (Vec<&Movie>, Vec<&Movie>) = movies.iter().partition(|m| m.watched);
    let mut lines: Vec<String> = unwatched
        .iter()
        .map(|m| format!("🎬 **{}** (added by <@{}>)", m.title, m.added_by))
        .collect();
    if !watched.is_empty() {
        lines.push(String::new());
        lines.push("**Already watched**".to_string());
        lines.extend(watched.iter().map(|m| format!("✔️ ~~{}~~", m.title)));
    }
    truncate_message(&lines.join("\n"), 4000)
}

/// Show the movie list
#[poise::command(slash_command, guild_only, rename = "list")]
pub async fn movie_list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    let movies = ctx.data().db.get_all_movies(guild_id).await?;

    let embed = CreateEmbed::new()
        .title("🍿 Movie list")
        .description(format_movie_list(&movies))
        .colour(EMBED_COLOUR);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn unwatched(movies: Vec<Movie>) -> Vec<Movie> {
    movies.into_iter().filter(|m| !m.watched).collect()
}

/// Pick a random unwatched movie
#[poise::command(slash_command, guild_only, rename = "pick")]
pub async fn movie_pick(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::MovieAdmin).await? {
        return Ok(());
    }

    let candidates = unwatched(ctx.data().db.get_all_movies(guild_id).await?);
    if candidates.is_empty() {
        return reply_ephemeral(ctx, format_info("There are no unwatched movies to pick from.")).await;
    }

    let index = ThreadRandom.next_below(candidates.len() as u64) as usize;
    let movie = &candidates[index];
    ctx.say(format!("🎲 Tonight's pick: **{}**", movie.title)).await?;
    Ok(())
}

/// Choose poll candidates from the unwatched movies
pub fn choose_poll_movies(movies: Vec<Movie>, rng: &mut dyn RandomSource) -> Vec<Movie> {
    let mut candidates = unwatched(movies);
    shuffle(&mut candidates, rng);
    candidates.truncate(MOVIE_POLL_SIZE);
    candidates
}

fn movie_poll_buttons(poll: &MoviePoll, movies: &[Movie]) -> Vec<CreateActionRow> {
    let buttons = movies
        .iter()
        .map(|movie| {
            let action = ComponentAction::MovieVote {
                poll_id: poll.id,
                movie_id: movie.id,
            };
            CreateButton::new(action.custom_id())
                .label(take_chars(&movie.title, BUTTON_LABEL_MAX))
                .style(ButtonStyle::Primary)
        })
        .collect();
    vec![CreateActionRow::Buttons(buttons)]
}

/// Post a poll for the next movie night
#[poise::command(slash_command, guild_only, rename = "poll")]
pub async fn movie_poll(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::MovieAdmin).await? {
        return Ok(());
    }

    let data = ctx.data();
    let config = data.guild_configs.get(guild_id).await?;
    let Some(channel_id) = config.channels.movie_night else {
        return reply_ephemeral(ctx, build_setup_required("movie night channel")).await;
    };

    let candidates = choose_poll_movies(data.db.get_all_movies(guild_id).await?, &mut ThreadRandom);
    if candidates.len() < 2 {
        return reply_ephemeral(
            ctx,
            format_info("At least two unwatched movies are needed for a poll."),
        )
        .await;
    }

    let ids: Vec<i64> = candidates.iter().map(|m| m.id).collect();
    let poll = data.db.create_movie_poll(guild_id, &ids).await?;

    let lines: Vec<String> = candidates.iter().map(|m| format!("🎬 {}", m.title)).collect();
    let embed = CreateEmbed::new()
        .title("🍿 Movie night poll")
        .description(format!("Vote for the next movie!\n{}", lines.join("\n")))
        .colour(EMBED_COLOUR);
    let message = channel_id
        .send_message(
            ctx.http(),
            CreateMessage::new()
                .embed(embed)
                .components(movie_poll_buttons(&poll, &candidates)),
        )
        .await?;
    data.db
        .set_movie_poll_message(guild_id, poll.id, channel_id, message.id)
        .await?;

    info!("Movie poll {} posted in guild {}", poll.id, guild_id);
    reply_ephemeral(ctx, format_success(&format!("Poll posted in <#{}>.", channel_id))).await
}

/// Result line for a closed movie poll
pub fn format_movie_poll_result(movies: &[Movie], votes: &[(i64, usize)], winner: Option<&Movie>) -> String {
    let Some(winner) = winner else {
        return "Nobody voted, so there is no winner this time.".to_string();
    };

    let mut lines = vec![format!("🏆 **{}** wins!", winner.title)];
    for (movie_id, count) in votes {
        if let Some(movie) = movies.iter().find(|m| m.id == *movie_id) {
            lines.push(format!("{}: {} vote(s)", movie.title, count));
        }
    }
    lines.join("\n")
}

/// Close the running movie poll and announce the winner
#[poise::command(slash_command, guild_only, rename = "close_poll")]
pub async fn movie_close_poll(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::MovieAdmin).await? {
        return Ok(());
    }

    let db = &ctx.data().db;
    let Some(poll) = db.get_active_movie_poll(guild_id).await? else {
        return reply_ephemeral(ctx, format_info("There is no movie poll running.")).await;
    };

    let votes = db.get_movie_votes(poll.id).await?;
    db.close_movie_poll(guild_id, poll.id).await?;

    if let (Some(channel_id), Some(message_id)) = (poll.channel_id, poll.message_id)
        && let Err(e) = channel_id
            .edit_message(ctx.http(), message_id, EditMessage::new().components(vec![]))
            .await
    {
        warn!("Failed to close movie poll message {} in guild {}: {}", message_id, guild_id, e);
    }

    let movies = db.get_all_movies(guild_id).await?;
    let winner_id = winning_option(&poll.options, &votes);
    let winner = winner_id.and_then(|id| movies.iter().find(|m| m.id == id));
    let counts = count_votes(&poll.options, &votes);

    info!("Movie poll {} closed in guild {} with winner {:?}", poll.id, guild_id, winner_id);
    let embed = CreateEmbed::new()
        .title("🍿 Movie poll closed")
        .description(format_movie_poll_result(&movies, &counts, winner))
        .colour(EMBED_COLOUR);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Mark a movie as watched
#[poise::command(slash_command, guild_only, rename = "watched")]
pub async fn movie_watched(
    ctx: Context<'_>,
    #[description = "Movie title"] title: String,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::MovieAdmin).await? {
        return Ok(());
    }

    let db = &ctx.data().db;
    let Some(movie) = db.find_movie_by_title(guild_id, &title).await? else {
        return reply_ephemeral(ctx, format_error(&format!("**{}** is not on the list.", title.trim()))).await;
    };
    if movie.watched {
        return reply_ephemeral(ctx, format_info(&format!("**{}** was already watched.", movie.title))).await;
    }
    db.mark_movie_watched(guild_id, movie.id).await?;

    reply_ephemeral(ctx, format_success(&format!("Marked **{}** as watched.", movie.title))).await
}

/// Read a movie night start time given as `YYYY-MM-DD HH:MM` (UTC) or RFC 3339
pub fn parse_movie_night_time(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Announcement body for a movie night
pub fn format_movie_night(when: &str) -> String {
    match parse_movie_night_time(when) {
        Some(at) => format!(
            "🍿 Movie night starts {} ({})!",
            discord_full(at),
            discord_relative(at)
        ),
        None => format!("🍿 Movie night: **{}**!", when.trim()),
    }
}

/// Announce the next movie night
#[poise::command(slash_command, guild_only, rename = "night")]
pub async fn movie_night(
    ctx: Context<'_>,
    #[description = "When it starts, e.g. 2024-06-01 20:00 (UTC)"] when: String,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::MovieAdmin).await? {
        return Ok(());
    }

    let config = ctx.data().guild_configs.get(guild_id).await?;
    let Some(channel_id) = config.channels.movie_night else {
        return reply_ephemeral(ctx, build_setup_required("movie night channel")).await;
    };

    let announcement = match config.roles.movie_user {
        Some(role_id) => format!("<@&{}> {}", role_id, format_movie_night(&when)),
        None => format_movie_night(&when),
    };
    channel_id
        .send_message(ctx.http(), CreateMessage::new().content(announcement))
        .await?;

    reply_ephemeral(ctx, format_success(&format!("Movie night announced in <#{}>.", channel_id))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ScriptedRandom;
    use chrono::TimeZone;
    use poise::serenity_prelude::{GuildId, UserId};

    fn movie(id: i64, title: &str, watched: bool) -> Movie {
        Movie {
            id,
            guild_id: GuildId::new(1),
            title: title.to_string(),
            added_by: UserId::new(7),
            added_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            watched,
            watched_at: None,
        }
    }

    #[test]
    fn test_format_movie_list_splits_watched() {
        let movies = vec![movie(1, "Heat", true), movie(2, "Alien", false)];
        assert_eq!(
            format_movie_list(&movies),
            "🎬 **Alien** (added by <@7>)\n\n**Already watched**\n✔️ ~~Heat~~"
        );
        assert!(format_movie_list(&[]).contains("/movie add"));
    }

    #[test]
    fn test_choose_poll_movies_skips_watched_and_caps() {
        let movies: Vec<Movie> = (1..=8).map(|id| movie(id, &format!("M{}", id), id == 3)).collect();

        let chosen = choose_poll_movies(movies, &mut ScriptedRandom::new(&[]));
        assert_eq!(chosen.len(), MOVIE_POLL_SIZE);
        assert!(chosen.iter().all(|m| !m.watched));
    }

    #[test]
    fn test_format_movie_poll_result() {
        let movies = vec![movie(1, "Heat", false), movie(2, "Alien", false)];
        let text = format_movie_poll_result(&movies, &[(1, 1), (2, 3)], Some(&movies[1]));
        assert_eq!(text, "🏆 **Alien** wins!\nHeat: 1 vote(s)\nAlien: 3 vote(s)");
        assert!(format_movie_poll_result(&movies, &[], None).contains("no winner"));
    }

    #[test]
    fn test_parse_movie_night_time() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();
        assert_eq!(parse_movie_night_time("2024-06-01 20:00"), Some(expected));
        assert_eq!(parse_movie_night_time("2024-06-01T22:00:00+02:00"), Some(expected));
        assert_eq!(parse_movie_night_time("friday"), None);
    }

    #[test]
    fn test_format_movie_night() {
        assert_eq!(
            format_movie_night("2024-06-01 20:00"),
            "🍿 Movie night starts <t:1717272000:F> (<t:1717272000:R>)!"
        );
        assert_eq!(format_movie_night(" Friday 8pm "), "🍿 Movie night: **Friday 8pm**!");
    }
}

use poise::serenity_prelude::{
    self as serenity, ButtonStyle, CreateActionRow, CreateButton, CreateEmbed,
    CreateMessage, EditMessage, GuildId,
};
use tracing::{info, warn};

use crate::constants::{BUTTON_LABEL_MAX, EMBED_COLOUR};
use crate::handlers::ComponentAction;
use crate::models::{Data, Error, EventTask, Task, TaskCategory, TaskPoll, Vote};
use crate::repository::{TaskEventRepository, TaskRepository};
use crate::selection::{KeywordSelector, ThreadRandom, select_tasks_for_category};
use crate::services::{PollOutcome, choose_event_tasks};
use crate::utils::string_utils::take_chars;

/// Body of the poll embed for one category
pub fn format_poll_description(category: TaskCategory, candidates: &[Task]) -> String {
    let mut lines = vec![format!(
        "Vote for next week's **{}** task. The option with the most votes wins.",
        category.label()
    )];
    lines.extend(
        candidates
            .iter()
            .enumerate()
            .map(|(i, task)| format!("**{}.** {}", i + 1, task.display_name())),
    );
    lines.join("\n")
}

/// Body of the weekly event announcement
pub fn format_event_description(tasks: &[EventTask], keyword: &str) -> String {
    let mut lines: Vec<String> = tasks
        .iter()
        .map(|t| format!("**{}:** {}", t.category.label(), t.task_name))
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "Include the keyword **{}** in your screenshots and submit them with `/task submit`.",
        keyword
    ));
    lines.join("\n")
}

fn poll_buttons(poll: &TaskPoll, candidates: &[Task]) -> Vec<CreateActionRow> {
    let buttons = candidates
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let action = ComponentAction::TaskVote {
                poll_id: poll.id,
                task_id: task.id.clone(),
            };
            CreateButton::new(action.custom_id())
                .label(take_chars(&format!("{}. {}", i + 1, task.display_name()), BUTTON_LABEL_MAX))
                .style(ButtonStyle::Primary)
        })
        .collect();
    vec![CreateActionRow::Buttons(buttons)]
}

fn feedback_buttons(event_id: i64, tasks: &[EventTask]) -> Vec<CreateActionRow> {
    tasks
        .iter()
        .map(|task| {
            let button = |vote: Vote, emoji: &str| {
                let action = ComponentAction::TaskFeedback {
                    vote,
                    task_id: task.task_id.clone(),
                    event_id,
                };
                CreateButton::new(action.custom_id())
                    .label(format!("{} {}", emoji, task.category.label()))
                    .style(ButtonStyle::Secondary)
            };
            CreateActionRow::Buttons(vec![button(Vote::Up, "👍"), button(Vote::Down, "👎")])
        })
        .collect()
}

/// Post one poll per scheduled category
pub async fn post_task_polls(
    http: &serenity::Http,
    data: &Data,
    guild_id: GuildId,
) -> Result<(), Error> {
    let config = data.guild_configs.get(guild_id).await?;
    let Some(channel_id) = config.channels.task_channel else {
        warn!("No task channel configured for guild {}", guild_id);
        return Ok(());
    };

    // Polls left open by a skipped task start would otherwise linger forever
    for stale in data.db.get_active_polls(guild_id).await? {
        data.db.close_poll(guild_id, stale.id).await?;
    }

    let all_tasks = data.db.get_all_tasks(guild_id).await?;
    let mut rng = ThreadRandom;
    let mut posted = 0;

    for category in TaskCategory::scheduled(config.toggles.leagues) {
        let candidates = select_tasks_for_category(category, &all_tasks, &mut rng);
        if candidates.is_empty() {
            continue;
        }

        let options: Vec<String> = candidates.iter().map(|t| t.id.clone()).collect();
        let poll = data.db.create_poll(guild_id, category, &options).await?;

        let embed = CreateEmbed::new()
            .title(format!("📊 {} task poll", category.label()))
            .description(format_poll_description(category, &candidates))
            .colour(EMBED_COLOUR);
        let message = channel_id
            .send_message(
                http,
                CreateMessage::new()
                    .embed(embed)
                    .components(poll_buttons(&poll, &candidates)),
            )
            .await?;

        data.db
            .set_poll_message(guild_id, poll.id, channel_id, message.id)
            .await?;
        posted += 1;
    }

    info!("Posted {} task poll(s) for guild {}", posted, guild_id);
    Ok(())
}

/// Close the open polls and collect their ballots
async fn close_polls(
    http: &serenity::Http,
    data: &Data,
    guild_id: GuildId,
) -> Result<Vec<PollOutcome>, Error> {
    let mut outcomes = Vec::new();

    for poll in data.db.get_active_polls(guild_id).await? {
        let votes = data.db.get_poll_votes(poll.id).await?;
        data.db.close_poll(guild_id, poll.id).await?;

        if let (Some(channel_id), Some(message_id)) = (poll.channel_id, poll.message_id)
            && let Err(e) = channel_id
                .edit_message(http, message_id, EditMessage::new().components(vec![]))
                .await
        {
            warn!("Failed to close poll message {} in guild {}: {}", message_id, guild_id, e);
        }

        outcomes.push(PollOutcome {
            category: poll.category,
            options: poll.options,
            votes,
        });
    }

    Ok(outcomes)
}

/// Turn the week's polls into a new task event and announce it
pub async fn start_task_event(
    http: &serenity::Http,
    data: &Data,
    guild_id: GuildId,
) -> Result<(), Error> {
    let config = data.guild_configs.get(guild_id).await?;
    let Some(channel_id) = config.channels.task_channel else {
        warn!("No task channel configured for guild {}", guild_id);
        return Ok(());
    };

    let outcomes = close_polls(http, data, guild_id).await?;
    let all_tasks = data.db.get_all_tasks(guild_id).await?;
    let mut rng = ThreadRandom;

    let chosen = choose_event_tasks(
        &TaskCategory::scheduled(config.toggles.leagues),
        &outcomes,
        &all_tasks,
        &mut rng,
    );
    if chosen.is_empty() {
        warn!("No tasks available to start an event in guild {}", guild_id);
        return Ok(());
    }

    let event = data.db.create_event(guild_id, &chosen).await?;
    let keyword = KeywordSelector::new(&data.db)
        .select_keyword(guild_id, event.id, &mut rng)
        .await?;
    data.db.set_event_keyword(guild_id, event.id, &keyword).await?;

    let embed = CreateEmbed::new()
        .title("🗓️ This week's tasks")
        .description(format_event_description(&event.tasks, &keyword))
        .colour(EMBED_COLOUR);
    let message = channel_id
        .send_message(
            http,
            CreateMessage::new()
                .embed(embed)
                .components(feedback_buttons(event.id, &event.tasks)),
        )
        .await?;
    data.db
        .set_event_message(guild_id, event.id, channel_id, message.id)
        .await?;

    info!(
        "Started task event {} with {} task(s) in guild {}",
        event.id,
        event.tasks.len(),
        guild_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TierAmounts;

    #[test]
    fn test_format_poll_description() {
        let task = Task {
            id: "p1".to_string(),
            name: "Kill {amount} Zulrah".to_string(),
            category: TaskCategory::PvM,
            skill: None,
            verification_type: "kc".to_string(),
            amounts: TierAmounts { bronze: 5, silver: 10, gold: 20 },
            weight: 50,
        };

        let text = format_poll_description(TaskCategory::PvM, &[task]);
        assert!(text.contains("**PvM**"));
        assert!(text.contains("**1.** Kill 5/10/20 Zulrah"));
    }

    #[test]
    fn test_format_event_description() {
        let tasks = vec![
            EventTask {
                category: TaskCategory::Skilling,
                task_id: "s1".to_string(),
                task_name: "Mine 100/200/300 ore".to_string(),
            },
            EventTask {
                category: TaskCategory::MinigameMisc,
                task_id: "m1".to_string(),
                task_name: "Win 1/2/3 games".to_string(),
            },
        ];

        let text = format_event_description(&tasks, "Tangleroot");
        assert!(text.starts_with("**Skilling:** Mine 100/200/300 ore\n**Minigame/Misc:**"));
        assert!(text.contains("**Tangleroot**"));
    }
}

use poise::serenity_prelude::{Attachment, CreateEmbed, CreateMessage};
use std::sync::Arc;
use tracing::{error, info};

use super::reply_ephemeral;
use crate::{
    constants::{EMBED_COLOUR, LEADERBOARD_SIZE},
    handlers::review_buttons,
    models::{Context, Error, Task, TaskCategory, UserStats},
    repository::{SubmissionRepository, TaskEventRepository, TaskRepository, UserRepository},
    schedule::{DiscordWorkflows, JobKind, SchedulerChange, StartOutcome, StopOutcome, run_job},
    utils::csv_import::parse_task_csv,
    utils::messages::{
        build_import_summary, build_setup_required, format_error, format_info, format_success,
    },
    utils::permissions::AccessLevel,
    utils::string_utils::truncate_message,
    utils::validation::{ensure_access, require_guild},
};

/// Weekly task events
#[poise::command(
    slash_command,
    guild_only,
    subcommands(
        "task_scheduler",
        "task_leagues",
        "task_import",
        "task_list",
        "task_poll_now",
        "task_start_now",
        "task_submit",
        "task_leaderboard"
    ),
    subcommand_required
)]
pub async fn task(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

fn workflows(ctx: Context<'_>) -> DiscordWorkflows {
    DiscordWorkflows::new(ctx.serenity_context().http.clone(), ctx.data().clone())
}

/// Turn the weekly task schedule on or off
#[poise::command(slash_command, guild_only, rename = "scheduler")]
pub async fn task_scheduler(
    ctx: Context<'_>,
    #[description = "Run polls, events and prize draws every week"] enabled: bool,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::TaskAdmin).await? {
        return Ok(());
    }

    let data = ctx.data();
    if enabled {
        let config = data.guild_configs.get(guild_id).await?;
        if config.channels.task_channel.is_none() {
            return reply_ephemeral(ctx, build_setup_required("task channel")).await;
        }
    }

    let change = data
        .scheduler
        .set_enabled(
            &data.guild_configs,
            guild_id,
            enabled,
            ctx.author().id,
            Arc::new(workflows(ctx)),
        )
        .await?;

    let message = match change {
        SchedulerChange::Start(StartOutcome::Started) => {
            format_success("Weekly task schedule enabled.")
        }
        SchedulerChange::Start(StartOutcome::AlreadyActive) => {
            format_info("The weekly task schedule is already running.")
        }
        SchedulerChange::Start(StartOutcome::NotPermitted) => {
            format_error("This server is not served by the bot in its current mode.")
        }
        SchedulerChange::Stop(StopOutcome::Stopped) => {
            format_success("Weekly task schedule disabled.")
        }
        SchedulerChange::Stop(StopOutcome::AlreadyInactive) => {
            format_info("The weekly task schedule was not running.")
        }
    };

    reply_ephemeral(ctx, message).await
}

/// Include Leagues tasks in weekly events
#[poise::command(slash_command, guild_only, rename = "leagues")]
pub async fn task_leagues(
    ctx: Context<'_>,
    #[description = "Offer a Leagues category each week"] enabled: bool,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::TaskAdmin).await? {
        return Ok(());
    }

    ctx.data()
        .guild_configs
        .toggle_leagues(guild_id, enabled, ctx.author().id)
        .await?;

    let state = if enabled { "included in" } else { "left out of" };
    reply_ephemeral(
        ctx,
        format_success(&format!("Leagues tasks will be {} weekly events.", state)),
    )
    .await
}

/// Import tasks from a CSV file
#[poise::command(slash_command, guild_only, rename = "import")]
pub async fn task_import(
    ctx: Context<'_>,
    #[description = "CSV with id, taskName, category, type, amtBronze, amtSilver, amtGold, skill"]
    file: Attachment,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::TaskAdmin).await? {
        return Ok(());
    }
    ctx.defer_ephemeral().await?;

    let bytes = match file.download().await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to download task import {}: {}", file.filename, e);
            return reply_ephemeral(ctx, format_error("Could not download that file.")).await;
        }
    };

    let import = match parse_task_csv(&String::from_utf8_lossy(&bytes)) {
        Ok(import) => import,
        Err(reason) => return reply_ephemeral(ctx, format_error(&reason)).await,
    };

    let counts = ctx.data().db.insert_tasks(guild_id, &import.tasks).await?;
    info!(
        "Imported tasks into guild {}: {} new, {} skipped, {} malformed",
        guild_id,
        counts.inserted,
        counts.skipped,
        import.malformed.len()
    );

    reply_ephemeral(
        ctx,
        build_import_summary(counts.inserted, counts.skipped, &import.malformed),
    )
    .await
}

/// One line per task for the task list
pub fn format_task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return format_info("No tasks found. Import some with `/task import`.");
    }

    let lines: Vec<String> = tasks
        .iter()
        .map(|t| {
            let skill = t
                .skill
                .as_deref()
                .map(|s| format!(" [{}]", s))
                .unwrap_or_default();
            format!(
                "`{}` {}{} ({}, weight {})",
                t.id,
                t.display_name(),
                skill,
                t.category.label(),
                t.weight
            )
        })
        .collect();
    truncate_message(&lines.join("\n"), 2000)
}

/// List imported tasks
#[poise::command(slash_command, guild_only, rename = "list")]
pub async fn task_list(
    ctx: Context<'_>,
    #[description = "Only show one category"] category: Option<TaskCategory>,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::TaskAdmin).await? {
        return Ok(());
    }

    let db = &ctx.data().db;
    let tasks = match category {
        Some(category) => db.get_tasks_by_category(guild_id, category).await?,
        None => db.get_all_tasks(guild_id).await?,
    };

    reply_ephemeral(ctx, format_task_list(&tasks)).await
}

/// Post this week's category polls right away
#[poise::command(slash_command, guild_only, rename = "poll_now")]
pub async fn task_poll_now(ctx: Context<'_>) -> Result<(), Error> {
    run_now(ctx, JobKind::Poll, "Task polls posted.").await
}

/// Close the polls and start a task event right away
#[poise::command(slash_command, guild_only, rename = "start_now")]
pub async fn task_start_now(ctx: Context<'_>) -> Result<(), Error> {
    run_now(ctx, JobKind::TaskStart, "Task event started.").await
}

async fn run_now(ctx: Context<'_>, kind: JobKind, done: &str) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    if !ensure_access(ctx, AccessLevel::TaskAdmin).await? {
        return Ok(());
    }
    ctx.defer_ephemeral().await?;

    let config = ctx.data().guild_configs.get(guild_id).await?;
    if config.channels.task_channel.is_none() {
        return reply_ephemeral(ctx, build_setup_required("task channel")).await;
    }

    info!("{} job triggered manually in guild {} by {}", kind, guild_id, ctx.author().id);
    match run_job(kind, guild_id, &workflows(ctx)).await {
        Ok(()) => reply_ephemeral(ctx, format_success(done)).await,
        Err(e) => {
            error!("Manual {} job failed in guild {}: {}", kind, guild_id, e);
            reply_ephemeral(ctx, format_error("Something went wrong, check the bot logs.")).await
        }
    }
}

/// Submit proof of completing this week's task
#[poise::command(slash_command, guild_only, rename = "submit")]
pub async fn task_submit(
    ctx: Context<'_>,
    #[description = "Category of the task you completed"] category: TaskCategory,
    #[description = "Screenshot showing the keyword"] proof: Attachment,
    #[description = "Anything the reviewers should know"] notes: Option<String>,
) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    let data = ctx.data();

    let config = data.guild_configs.get(guild_id).await?;
    let Some(verification_channel) = config.channels.task_verification else {
        return reply_ephemeral(ctx, build_setup_required("verification channel")).await;
    };

    let Some(event) = data.db.get_latest_event(guild_id).await? else {
        return reply_ephemeral(ctx, format_error("There is no task event running.")).await;
    };
    let Some(event_task) = event.tasks.iter().find(|t| t.category == category) else {
        return reply_ephemeral(
            ctx,
            format_error(&format!("This week's event has no {} task.", category.label())),
        )
        .await;
    };

    let user_id = ctx.author().id;
    let submission = data
        .db
        .create_submission(guild_id, user_id, event.id, &event_task.task_id, &proof.url)
        .await?;

    let mut embed = CreateEmbed::new()
        .title(format!("Submission #{}", submission.id))
        .description(format!(
            "<@{}> completed **{}**\nKeyword: **{}**",
            user_id,
            event_task.task_name,
            event.keyword.as_deref().unwrap_or("none")
        ))
        .image(proof.url.clone())
        .colour(EMBED_COLOUR);
    if let Some(notes) = notes.as_deref().filter(|n| !n.trim().is_empty()) {
        embed = embed.field("Notes", notes, false);
    }

    verification_channel
        .send_message(
            ctx.http(),
            CreateMessage::new()
                .embed(embed)
                .components(review_buttons(submission.id)),
        )
        .await?;

    info!(
        "Submission {} from {} for task {} in guild {}",
        submission.id, user_id, event_task.task_id, guild_id
    );
    reply_ephemeral(
        ctx,
        format_success("Submission received! A task admin will review it soon."),
    )
    .await
}

/// Leaderboard rows, best first
pub fn format_leaderboard(rows: &[UserStats]) -> String {
    if rows.is_empty() {
        return format_info("Nobody has completed a task yet.");
    }

    rows.iter()
        .enumerate()
        .map(|(i, stats)| {
            format!(
                "**{}.** <@{}> {} task(s) 🥇{} 🥈{} 🥉{}",
                i + 1,
                stats.user_id,
                stats.tasks_completed,
                stats.gold,
                stats.silver,
                stats.bronze
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Show who completed the most tasks
#[poise::command(slash_command, guild_only, rename = "leaderboard")]
pub async fn task_leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = require_guild(ctx.guild_id())?;
    let rows = ctx
        .data()
        .db
        .get_leaderboard(guild_id, LEADERBOARD_SIZE)
        .await?;

    let embed = CreateEmbed::new()
        .title("🏅 Task leaderboard")
        .description(format_leaderboard(&rows))
        .colour(EMBED_COLOUR);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TierAmounts;
    use poise::serenity_prelude::UserId;

    #[test]
    fn test_format_task_list() {
        let tasks = vec![Task {
            id: "sk-1".to_string(),
            name: "Chop {amount} logs".to_string(),
            category: TaskCategory::Skilling,
            skill: Some("Woodcutting".to_string()),
            verification_type: "xp".to_string(),
            amounts: TierAmounts { bronze: 100, silver: 200, gold: 500 },
            weight: 48,
        }];

        assert_eq!(
            format_task_list(&tasks),
            "`sk-1` Chop 100/200/500 logs [Woodcutting] (Skilling, weight 48)"
        );
        assert!(format_task_list(&[]).contains("/task import"));
    }

    #[test]
    fn test_format_leaderboard() {
        let mut first = UserStats::empty(UserId::new(5));
        first.tasks_completed = 4;
        first.gold = 1;
        first.silver = 2;
        first.bronze = 1;
        let second = UserStats {
            tasks_completed: 1,
            bronze: 1,
            ..UserStats::empty(UserId::new(6))
        };

        let text = format_leaderboard(&[first, second]);
        assert_eq!(
            text,
            "**1.** <@5> 4 task(s) 🥇1 🥈2 🥉1\n**2.** <@6> 1 task(s) 🥇0 🥈0 🥉1"
        );
    }
}

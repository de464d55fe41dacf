use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use poise::serenity_prelude::{GuildId, UserId};
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep, timeout};
use tracing::{error, info, warn};

use super::types::{JobCallback, JobFuture, JobHandle, JobKind, JobRunner, ScheduledWorkflows};
use crate::config::GuildScope;
use crate::constants::JOB_TIMEOUT_SECS;
use crate::models::Error;
use crate::services::GuildConfigService;
use crate::utils::datetime::{current_week_number, is_prize_draw_week};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyActive,
    /// The guild is outside the current bot mode's scope
    NotPermitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyInactive,
}

/// Result of turning a guild's schedule on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerChange {
    Start(StartOutcome),
    Stop(StopOutcome),
}

/// Tracks which guilds have their weekly jobs running
///
/// A guild is either inactive (no handles) or active with exactly one handle
/// per `JobKind`.
pub struct SchedulerManager {
    runner: Arc<dyn JobRunner>,
    scope: GuildScope,
    week_number: Arc<dyn Fn() -> u32 + Send + Sync>,
    active: DashMap<GuildId, Vec<Box<dyn JobHandle>>>,
}

impl SchedulerManager {
    pub fn new(
        runner: Arc<dyn JobRunner>,
        scope: GuildScope,
        week_number: Arc<dyn Fn() -> u32 + Send + Sync>,
    ) -> Self {
        Self {
            runner,
            scope,
            week_number,
            active: DashMap::new(),
        }
    }

    /// Production manager: tokio timers and the wall-clock ISO week
    pub fn with_tokio_runner(scope: GuildScope) -> Self {
        Self::new(Arc::new(TokioCronRunner), scope, Arc::new(current_week_number))
    }

    pub fn is_active(&self, guild_id: GuildId) -> bool {
        self.active.contains_key(&guild_id)
    }

    /// Register the weekly jobs for a guild
    pub fn start(
        &self,
        guild_id: GuildId,
        workflows: Arc<dyn ScheduledWorkflows>,
    ) -> Result<StartOutcome, Error> {
        if !self.scope.permits(guild_id) {
            warn!("Not starting scheduler for out-of-scope guild {}", guild_id);
            return Ok(StartOutcome::NotPermitted);
        }

        let slot = match self.active.entry(guild_id) {
            Entry::Occupied(_) => return Ok(StartOutcome::AlreadyActive),
            Entry::Vacant(slot) => slot,
        };

        let mut handles: Vec<Box<dyn JobHandle>> = Vec::with_capacity(JobKind::ALL.len());
        for kind in JobKind::ALL {
            let callback = self.job_callback(kind, guild_id, workflows.clone());
            match self
                .runner
                .schedule(guild_id, kind, kind.cron_expression(), callback)
            {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    handles.iter().for_each(|h| h.cancel());
                    return Err(e);
                }
            }
        }

        slot.insert(handles);
        info!("Scheduler started for guild {}", guild_id);
        Ok(StartOutcome::Started)
    }

    /// Cancel every job of a guild
    pub fn stop(&self, guild_id: GuildId) -> StopOutcome {
        match self.active.remove(&guild_id) {
            Some((_, handles)) => {
                handles.iter().for_each(|h| h.cancel());
                info!("Scheduler stopped for guild {}", guild_id);
                StopOutcome::Stopped
            }
            None => StopOutcome::AlreadyInactive,
        }
    }

    /// Turn a guild's schedule on or off and persist the toggle
    ///
    /// The stored toggle only reads enabled once the jobs are registered. A
    /// failed save after a fresh start cancels the jobs again.
    pub async fn set_enabled(
        &self,
        configs: &GuildConfigService,
        guild_id: GuildId,
        enabled: bool,
        updated_by: UserId,
        workflows: Arc<dyn ScheduledWorkflows>,
    ) -> Result<SchedulerChange, Error> {
        if !enabled {
            configs.toggle_scheduler(guild_id, false, updated_by).await?;
            return Ok(SchedulerChange::Stop(self.stop(guild_id)));
        }

        let outcome = self.start(guild_id, workflows)?;
        if outcome == StartOutcome::NotPermitted {
            return Ok(SchedulerChange::Start(outcome));
        }

        if let Err(e) = configs.toggle_scheduler(guild_id, true, updated_by).await {
            if outcome == StartOutcome::Started {
                self.stop(guild_id);
            }
            error!("Could not save scheduler toggle for guild {}: {}", guild_id, e);
            return Err(e.into());
        }

        Ok(SchedulerChange::Start(outcome))
    }

    fn job_callback(
        &self,
        kind: JobKind,
        guild_id: GuildId,
        workflows: Arc<dyn ScheduledWorkflows>,
    ) -> JobCallback {
        let week_number = self.week_number.clone();
        Arc::new(move || -> JobFuture {
            let workflows = workflows.clone();
            let week = week_number();
            Box::pin(async move {
                if kind == JobKind::PrizeDraw && !is_prize_draw_week(week) {
                    info!("Week {} is not a prize draw week, skipping guild {}", week, guild_id);
                    return Ok(());
                }
                run_job(kind, guild_id, workflows.as_ref()).await
            })
        })
    }
}

/// Run one job body immediately, without the prize draw week gate
pub async fn run_job(
    kind: JobKind,
    guild_id: GuildId,
    workflows: &dyn ScheduledWorkflows,
) -> Result<(), Error> {
    match kind {
        JobKind::Poll => workflows.post_task_polls(guild_id).await,
        JobKind::TaskStart => workflows.start_task_event(guild_id).await,
        JobKind::PrizeDraw => {
            let snapshot_id = workflows.generate_prize_snapshot(guild_id).await?;
            let winners = workflows.roll_prize_winners(guild_id, snapshot_id).await?;
            workflows
                .announce_prize_winners(guild_id, snapshot_id, &winners)
                .await
        }
    }
}

/// Fires jobs from tokio tasks that sleep until the next cron occurrence
pub struct TokioCronRunner;

struct TokioJobHandle(JoinHandle<()>);

impl JobHandle for TokioJobHandle {
    fn cancel(&self) {
        self.0.abort();
    }
}

impl JobRunner for TokioCronRunner {
    fn schedule(
        &self,
        guild_id: GuildId,
        kind: JobKind,
        expression: &str,
        callback: JobCallback,
    ) -> Result<Box<dyn JobHandle>, Error> {
        let schedule = cron::Schedule::from_str(expression)
            .map_err(|e| format!("Invalid cron expression '{}' for {} job: {}", expression, kind, e))?;

        let handle = tokio::spawn(async move {
            loop {
                let Some(next_time) = schedule.upcoming(Utc).next() else {
                    warn!("No upcoming time for {} job in guild {}", kind, guild_id);
                    break;
                };

                let wait_duration = (next_time - Utc::now())
                    .to_std()
                    .unwrap_or(Duration::from_secs(0));
                info!(
                    "Next {} job for guild {} in {} minutes",
                    kind,
                    guild_id,
                    wait_duration.as_secs() / 60
                );

                sleep(wait_duration).await;
                fire(kind, guild_id, callback.clone()).await;
            }
        });

        Ok(Box::new(TokioJobHandle(handle)))
    }
}

/// Run one firing in its own task so a panic or hang cannot kill the schedule
async fn fire(kind: JobKind, guild_id: GuildId, callback: JobCallback) {
    let run = tokio::spawn(async move {
        timeout(Duration::from_secs(JOB_TIMEOUT_SECS), callback()).await
    });

    match run.await {
        Ok(Ok(Ok(()))) => info!("{} job finished for guild {}", kind, guild_id),
        Ok(Ok(Err(e))) => error!("{} job failed for guild {}: {}", kind, guild_id, e),
        Ok(Err(_)) => error!(
            "{} job for guild {} timed out after {} seconds",
            kind, guild_id, JOB_TIMEOUT_SECS
        ),
        Err(e) => error!("{} job for guild {} panicked: {}", kind, guild_id, e),
    }
}

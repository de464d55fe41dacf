/// Per-guild weekly jobs: task polls, task events and prize draws
mod manager;
mod prize_jobs;
mod task_jobs;
mod types;
mod workflows;

pub use manager::{SchedulerChange, SchedulerManager, StartOutcome, StopOutcome, run_job};
pub use prize_jobs::format_prize_announcement;
pub use types::JobKind;
pub use workflows::DiscordWorkflows;

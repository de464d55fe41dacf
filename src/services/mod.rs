/// Business logic shared by commands, handlers and scheduled jobs
mod feedback;
mod guild_config;
mod prize_draw;
mod review;
mod task_event;

pub use feedback::{FeedbackLocks, FeedbackOutcome, record_feedback};
pub use guild_config::GuildConfigService;
pub use prize_draw::{build_prize_entries, draw_period, roll_winners};
pub use review::{ReviewOutcome, review_submission};
pub use task_event::{PollOutcome, choose_event_tasks};

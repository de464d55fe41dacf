/// Log directive for the application
pub const LOG_DIRECTIVE: &str = "bustinbot=info";

/// Role name that grants admin access when no admin role is bound in the guild config
pub const DEFAULT_ADMIN_ROLE_NAME: &str = "BustinBot Admin";

/// Weight given to tasks that have never been rated
pub const DEFAULT_TASK_WEIGHT: i32 = 50;

/// Number of tasks offered per category poll
pub const TASKS_PER_CATEGORY: usize = 3;

/// Skill bucket for skilling tasks without a skill tag
pub const UNKNOWN_SKILL: &str = "Unknown";

/// Number of most recently used keywords excluded from selection
pub const KEYWORD_RECENT_WINDOW: usize = 26;

/// Number of event ids kept in a keyword's usage history
pub const KEYWORD_HISTORY_LENGTH: usize = 20;

/// Keyword returned when a guild has no keywords configured
pub const FALLBACK_KEYWORD: &str = "keyword";

/// Weekly poll job: Sunday 00:00 UTC
pub const POLL_CRON: &str = "0 0 0 * * Sun";

/// Weekly task start job: Monday 00:00 UTC
pub const TASK_START_CRON: &str = "0 0 0 * * Mon";

/// Prize draw job: every Tuesday 00:00 UTC, gated to even weeks by the handler
pub const PRIZE_DRAW_CRON: &str = "0 0 0 * * Tue";

/// Upper bound on how long a single scheduled job may run
pub const JOB_TIMEOUT_SECS: u64 = 15 * 60;

/// Length of a prize draw period when no earlier draw exists
pub const PRIZE_DRAW_PERIOD_DAYS: i64 = 14;

/// Number of winners rolled per prize draw
pub const PRIZE_DRAW_WINNERS: usize = 1;

/// Maximum number of movies offered in a movie poll
pub const MOVIE_POLL_SIZE: usize = 5;

/// Number of rows shown on the task leaderboard
pub const LEADERBOARD_SIZE: i64 = 10;

/// Embed accent colour
pub const EMBED_COLOUR: u32 = 0xA8_6B2F;

/// Discord's limit on button label length
pub const BUTTON_LABEL_MAX: usize = 80;

/// Discord's limit on component custom id length
pub const CUSTOM_ID_MAX: usize = 100;

/// Longest task id that still fits every custom id it is embedded in
pub const TASK_ID_MAX_LEN: usize = 60;

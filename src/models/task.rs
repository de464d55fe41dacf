use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::selection::Weighted;

/// Task categories offered in weekly events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, poise::ChoiceParameter)]
pub enum TaskCategory {
    #[name = "PvM"]
    PvM,
    #[name = "Skilling"]
    Skilling,
    #[name = "Minigame/Misc"]
    MinigameMisc,
    #[name = "Leagues"]
    Leagues,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::PvM,
        TaskCategory::Skilling,
        TaskCategory::MinigameMisc,
        TaskCategory::Leagues,
    ];

    /// Categories that get a poll and an event slot each week
    pub fn scheduled(include_leagues: bool) -> Vec<TaskCategory> {
        Self::ALL
            .into_iter()
            .filter(|c| include_leagues || *c != TaskCategory::Leagues)
            .collect()
    }

    /// Stable identifier used in storage and custom ids
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::PvM => "PvM",
            TaskCategory::Skilling => "Skilling",
            TaskCategory::MinigameMisc => "MinigameMisc",
            TaskCategory::Leagues => "Leagues",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            TaskCategory::PvM => "PvM",
            TaskCategory::Skilling => "Skilling",
            TaskCategory::MinigameMisc => "Minigame/Misc",
            TaskCategory::Leagues => "Leagues",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TaskCategory {
    type Err = String;

    /// Accepts the storage form as well as common spellings found in imports
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "pvm" => Ok(TaskCategory::PvM),
            "skilling" | "skill" => Ok(TaskCategory::Skilling),
            "minigamemisc" | "minigame" | "misc" => Ok(TaskCategory::MinigameMisc),
            "leagues" | "league" => Ok(TaskCategory::Leagues),
            _ => Err(format!("Unknown task category '{}'", s)),
        }
    }
}

/// Completion thresholds for the three prize tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierAmounts {
    pub bronze: i32,
    pub silver: i32,
    pub gold: i32,
}

/// A task that can be picked for a weekly event
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub category: TaskCategory,
    pub skill: Option<String>,
    pub verification_type: String,
    pub amounts: TierAmounts,
    pub weight: i32,
}

impl Task {
    /// Render the task name with its tier amounts substituted in
    pub fn display_name(&self) -> String {
        let amounts = format!(
            "{}/{}/{}",
            self.amounts.bronze, self.amounts.silver, self.amounts.gold
        );
        if self.name.contains("{amount}") {
            self.name.replace("{amount}", &amounts)
        } else {
            format!("{} ({})", self.name, amounts)
        }
    }
}

impl Weighted for Task {
    fn weight(&self) -> Option<i64> {
        Some(self.weight as i64)
    }
}

/// Prize tier awarded when a submission is approved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionTier {
    Bronze,
    Silver,
    Gold,
}

impl CompletionTier {
    pub const ALL: [CompletionTier; 3] = [
        CompletionTier::Bronze,
        CompletionTier::Silver,
        CompletionTier::Gold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionTier::Bronze => "bronze",
            CompletionTier::Silver => "silver",
            CompletionTier::Gold => "gold",
        }
    }

    /// Prize draw entries earned by one approved submission of this tier
    pub fn entries(&self) -> u32 {
        match self {
            CompletionTier::Bronze => 1,
            CompletionTier::Silver => 2,
            CompletionTier::Gold => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompletionTier::Bronze => "Bronze",
            CompletionTier::Silver => "Silver",
            CompletionTier::Gold => "Gold",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            CompletionTier::Bronze => "🥉",
            CompletionTier::Silver => "🥈",
            CompletionTier::Gold => "🥇",
        }
    }
}

impl FromStr for CompletionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bronze" => Ok(CompletionTier::Bronze),
            "silver" => Ok(CompletionTier::Silver),
            "gold" => Ok(CompletionTier::Gold),
            _ => Err(format!("Unknown completion tier '{}'", s)),
        }
    }
}

/// A user's rating of a task shown in an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vote::Up => "up",
            Vote::Down => "down",
        }
    }

    /// Weight change caused by moving from `previous` to this vote
    pub fn weight_delta(self, previous: Option<Vote>) -> i32 {
        match (previous, self) {
            (None, Vote::Up) => 1,
            (None, Vote::Down) => -1,
            (Some(Vote::Up), Vote::Down) => -2,
            (Some(Vote::Down), Vote::Up) => 2,
            (Some(_), _) => 0,
        }
    }
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Vote::Up),
            "down" => Ok(Vote::Down),
            _ => Err(format!("Unknown vote '{}'", s)),
        }
    }
}

/// Task chosen for one category of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTask {
    pub category: TaskCategory,
    pub task_id: String,
    pub task_name: String,
}

/// One weekly task event
#[derive(Debug, Clone)]
pub struct TaskEvent {
    pub id: i64,
    pub guild_id: GuildId,
    pub created_at: DateTime<Utc>,
    pub tasks: Vec<EventTask>,
    pub keyword: Option<String>,
    pub channel_id: Option<ChannelId>,
    pub message_id: Option<MessageId>,
}

impl TaskEvent {
    /// Find the event entry for a task id
    pub fn task(&self, task_id: &str) -> Option<&EventTask> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }
}

/// A category poll posted ahead of an event
#[derive(Debug, Clone)]
pub struct TaskPoll {
    pub id: i64,
    pub guild_id: GuildId,
    pub category: TaskCategory,
    pub options: Vec<String>,
    pub channel_id: Option<ChannelId>,
    pub message_id: Option<MessageId>,
    pub active: bool,
}

/// Review state of a task submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            "approved" => Ok(SubmissionStatus::Approved),
            "rejected" => Ok(SubmissionStatus::Rejected),
            _ => Err(format!("Unknown submission status '{}'", s)),
        }
    }
}

/// Proof of a completed event task awaiting review
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: i64,
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub event_id: i64,
    pub task_id: String,
    pub proof: String,
    pub status: SubmissionStatus,
    pub tier: Option<CompletionTier>,
    pub reviewed_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str) -> Task {
        Task {
            id: "t1".to_string(),
            name: name.to_string(),
            category: TaskCategory::PvM,
            skill: None,
            verification_type: "screenshot".to_string(),
            amounts: TierAmounts { bronze: 1, silver: 5, gold: 10 },
            weight: 50,
        }
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("PvM".parse::<TaskCategory>(), Ok(TaskCategory::PvM));
        assert_eq!("Minigame/Misc".parse::<TaskCategory>(), Ok(TaskCategory::MinigameMisc));
        assert_eq!("minigamemisc".parse::<TaskCategory>(), Ok(TaskCategory::MinigameMisc));
        assert_eq!("leagues".parse::<TaskCategory>(), Ok(TaskCategory::Leagues));
        assert!("raids".parse::<TaskCategory>().is_err());
    }

    #[test]
    fn test_category_round_trips_through_storage_form() {
        for category in TaskCategory::ALL {
            assert_eq!(category.as_str().parse::<TaskCategory>(), Ok(category));
        }
    }

    #[test]
    fn test_scheduled_categories() {
        assert_eq!(TaskCategory::scheduled(false).len(), 3);
        assert!(TaskCategory::scheduled(true).contains(&TaskCategory::Leagues));
    }

    #[test]
    fn test_display_name_substitutes_amounts() {
        assert_eq!(task("Kill {amount} Zulrah").display_name(), "Kill 1/5/10 Zulrah");
        assert_eq!(task("Barrows chests").display_name(), "Barrows chests (1/5/10)");
    }

    #[test]
    fn test_vote_weight_delta() {
        assert_eq!(Vote::Up.weight_delta(None), 1);
        assert_eq!(Vote::Down.weight_delta(None), -1);
        assert_eq!(Vote::Down.weight_delta(Some(Vote::Up)), -2);
        assert_eq!(Vote::Up.weight_delta(Some(Vote::Down)), 2);
        assert_eq!(Vote::Up.weight_delta(Some(Vote::Up)), 0);
        assert_eq!(Vote::Down.weight_delta(Some(Vote::Down)), 0);
    }

    #[test]
    fn test_tier_entries() {
        assert_eq!(CompletionTier::Bronze.entries(), 1);
        assert_eq!(CompletionTier::Gold.entries(), 3);
        assert_eq!("Silver".parse::<CompletionTier>(), Ok(CompletionTier::Silver));
    }
}

use poise::serenity_prelude::UserId;

use super::CompletionTier;

/// Per-guild participation counters for a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStats {
    pub user_id: UserId,
    pub tasks_completed: i32,
    pub bronze: i32,
    pub silver: i32,
    pub gold: i32,
    pub prize_wins: i32,
    pub movies_added: i32,
}

impl UserStats {
    /// Counters for a user with no recorded activity
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            tasks_completed: 0,
            bronze: 0,
            silver: 0,
            gold: 0,
            prize_wins: 0,
            movies_added: 0,
        }
    }

    pub fn tier_count(&self, tier: CompletionTier) -> i32 {
        match tier {
            CompletionTier::Bronze => self.bronze,
            CompletionTier::Silver => self.silver,
            CompletionTier::Gold => self.gold,
        }
    }
}

use chrono::{DateTime, Utc};
use poise::serenity_prelude::{GuildId, UserId};
use serde::{Deserialize, Serialize};

use crate::selection::Weighted;

/// One participant's entries in a prize draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeEntry {
    pub user_id: UserId,
    pub entries: u32,
}

impl Weighted for PrizeEntry {
    fn weight(&self) -> Option<i64> {
        Some(self.entries as i64)
    }
}

/// Entrants captured at draw time, plus the winners once rolled
#[derive(Debug, Clone)]
pub struct PrizeDrawSnapshot {
    pub id: i64,
    pub guild_id: GuildId,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub entries: Vec<PrizeEntry>,
    pub winners: Vec<UserId>,
    pub rolled_at: Option<DateTime<Utc>>,
}

impl PrizeDrawSnapshot {
    pub fn total_entries(&self) -> u32 {
        self.entries.iter().map(|e| e.entries).sum()
    }
}

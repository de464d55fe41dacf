use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};

/// A movie suggested for movie night
#[derive(Debug, Clone)]
pub struct Movie {
    pub id: i64,
    pub guild_id: GuildId,
    pub title: String,
    pub added_by: UserId,
    pub added_at: DateTime<Utc>,
    pub watched: bool,
    pub watched_at: Option<DateTime<Utc>>,
}

/// A poll choosing the next movie
#[derive(Debug, Clone)]
pub struct MoviePoll {
    pub id: i64,
    pub guild_id: GuildId,
    pub options: Vec<i64>,
    pub channel_id: Option<ChannelId>,
    pub message_id: Option<MessageId>,
    pub active: bool,
}

/// Normalized key used to detect duplicate titles
pub fn title_key(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_key() {
        assert_eq!(title_key("  The   Matrix "), "the matrix");
        assert_eq!(title_key("ALIEN"), title_key("alien"));
    }
}

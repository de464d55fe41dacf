use chrono::{DateTime, Utc};

use crate::utils::string_utils::slugify;

/// A verification keyword that rotates between task events
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub id: String,
    pub word: String,
    pub last_used_at: Option<DateTime<Utc>>,
    pub last_used_event: Option<i64>,
    pub times_used: i32,
    pub usage_history: Vec<i64>,
}

impl Keyword {
    /// Create an unused keyword, deriving its id from the word
    pub fn new(word: &str) -> Self {
        let word = word.trim().to_string();
        Self {
            id: slugify(&word),
            word,
            last_used_at: None,
            last_used_event: None,
            times_used: 0,
            usage_history: Vec::new(),
        }
    }

    /// Last use as epoch millis; never-used keywords sort as 0
    pub fn last_used_millis(&self) -> i64 {
        self.last_used_at
            .map(|at| at.timestamp_millis())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_keyword_uses_slug_id() {
        let keyword = Keyword::new("  Dragon Scimitar ");
        assert_eq!(keyword.id, "dragon-scimitar");
        assert_eq!(keyword.word, "Dragon Scimitar");
        assert_eq!(keyword.times_used, 0);
    }

    #[test]
    fn test_last_used_millis() {
        let mut keyword = Keyword::new("abyss");
        assert_eq!(keyword.last_used_millis(), 0);

        keyword.last_used_at = Some(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        assert_eq!(keyword.last_used_millis(), 1_700_000_000_000);
    }
}

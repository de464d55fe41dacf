use poise::serenity_prelude::GuildId;
use std::cmp::Reverse;
use tracing::{info, warn};

use super::random::RandomSource;
use crate::constants::{FALLBACK_KEYWORD, KEYWORD_RECENT_WINDOW};
use crate::models::Keyword;
use crate::repository::{KeywordRepository, RepoResult};

/// Choose a keyword while skipping the most recently used ones
///
/// Keywords are ordered by last use, newest first (unused ones count as
/// epoch 0). The newest `KEYWORD_RECENT_WINDOW` are excluded and the pick is
/// uniform over the rest. When every keyword falls inside the window the
/// whole list is eligible again.
pub fn pick_keyword<'k>(keywords: &'k [Keyword], rng: &mut dyn RandomSource) -> Option<&'k Keyword> {
    if keywords.is_empty() {
        return None;
    }

    let mut sorted: Vec<&Keyword> = keywords.iter().collect();
    sorted.sort_by_key(|k| Reverse(k.last_used_millis()));

    let exclude_count = KEYWORD_RECENT_WINDOW.min(sorted.len());
    let eligible = &sorted[exclude_count..];
    let pool = if eligible.is_empty() { &sorted[..] } else { eligible };

    let index = rng.next_below(pool.len() as u64) as usize;
    pool.get(index).copied()
}

/// Keyword selection backed by a keyword repository
pub struct KeywordSelector<'a> {
    repo: &'a dyn KeywordRepository,
}

impl<'a> KeywordSelector<'a> {
    pub fn new(repo: &'a dyn KeywordRepository) -> Self {
        Self { repo }
    }

    /// Pick the keyword for an event and record its use
    ///
    /// Returns the fallback word without touching storage when the guild has
    /// no keywords.
    pub async fn select_keyword(
        &self,
        guild_id: GuildId,
        event_id: i64,
        rng: &mut dyn RandomSource,
    ) -> RepoResult<String> {
        let keywords = self.repo.get_all_keywords(guild_id).await?;

        let Some(chosen) = pick_keyword(&keywords, rng) else {
            warn!("No keywords configured for guild {}, using fallback", guild_id);
            return Ok(FALLBACK_KEYWORD.to_string());
        };

        self.repo
            .mark_keyword_used(guild_id, &chosen.id, event_id)
            .await?;

        info!(
            "Selected keyword '{}' for event {} in guild {}",
            chosen.word, event_id, guild_id
        );
        Ok(chosen.word.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ScriptedRandom;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeKeywords {
        keywords: Vec<Keyword>,
        marked: Mutex<Vec<(String, i64)>>,
    }

    #[async_trait]
    impl KeywordRepository for FakeKeywords {
        async fn get_all_keywords(&self, _guild_id: GuildId) -> RepoResult<Vec<Keyword>> {
            Ok(self.keywords.clone())
        }

        async fn add_keyword(&self, _guild_id: GuildId, _keyword: &Keyword) -> RepoResult<bool> {
            Ok(true)
        }

        async fn remove_keyword(&self, _guild_id: GuildId, _keyword_id: &str) -> RepoResult<bool> {
            Ok(true)
        }

        async fn mark_keyword_used(
            &self,
            _guild_id: GuildId,
            keyword_id: &str,
            event_id: i64,
        ) -> RepoResult<()> {
            self.marked
                .lock()
                .unwrap()
                .push((keyword_id.to_string(), event_id));
            Ok(())
        }

        async fn reset_keyword_usage(&self, _guild_id: GuildId) -> RepoResult<u64> {
            Ok(0)
        }
    }

    /// Keyword `word-{i}` last used `i` hours after a fixed origin
    fn used_keyword(i: i64) -> Keyword {
        let mut keyword = Keyword::new(&format!("word {}", i));
        keyword.last_used_at = Some(Utc.timestamp_opt(1_700_000_000 + i * 3600, 0).unwrap());
        keyword.times_used = 1;
        keyword
    }

    #[tokio::test]
    async fn test_empty_repository_returns_fallback() {
        let repo = FakeKeywords::default();
        let selector = KeywordSelector::new(&repo);

        let word = selector
            .select_keyword(GuildId::new(1), 7, &mut ScriptedRandom::new(&[]))
            .await
            .unwrap();

        assert_eq!(word, "keyword");
        assert!(repo.marked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_excludes_recent_window() {
        // Shuffled insertion order; recency decides, not storage order
        let mut keywords: Vec<Keyword> = (0..30).map(used_keyword).collect();
        keywords.reverse();
        keywords.swap(3, 17);
        let repo = FakeKeywords { keywords, ..Default::default() };
        let selector = KeywordSelector::new(&repo);
        let mut rng = ScriptedRandom::new(&[0]);

        let word = selector
            .select_keyword(GuildId::new(1), 42, &mut rng)
            .await
            .unwrap();

        // Newest 26 (hours 29..=4) are excluded, so the first eligible is hour 3
        assert_eq!(word, "word 3");
        assert_eq!(rng.requests, vec![4]);
        assert_eq!(
            *repo.marked.lock().unwrap(),
            vec![("word-3".to_string(), 42)]
        );
    }

    #[tokio::test]
    async fn test_small_pool_falls_back_to_all_keywords() {
        let keywords: Vec<Keyword> = (0..5).map(used_keyword).collect();
        let repo = FakeKeywords { keywords, ..Default::default() };
        let selector = KeywordSelector::new(&repo);
        let mut rng = ScriptedRandom::new(&[4]);

        let word = selector
            .select_keyword(GuildId::new(1), 1, &mut rng)
            .await
            .unwrap();

        // Whole pool, newest first: index 4 is the oldest
        assert_eq!(word, "word 0");
        assert_eq!(rng.requests, vec![5]);
    }

    #[test]
    fn test_unused_keywords_are_eligible_first() {
        let mut keywords: Vec<Keyword> = (0..26).map(used_keyword).collect();
        keywords.push(Keyword::new("fresh"));

        let picked = pick_keyword(&keywords, &mut ScriptedRandom::new(&[0])).unwrap();
        assert_eq!(picked.word, "fresh");
    }

    #[test]
    fn test_pick_keyword_empty() {
        assert!(pick_keyword(&[], &mut ScriptedRandom::new(&[])).is_none());
    }
}

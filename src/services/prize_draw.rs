use chrono::{DateTime, Duration, Utc};
use poise::serenity_prelude::UserId;
use std::collections::BTreeMap;

use crate::constants::PRIZE_DRAW_PERIOD_DAYS;
use crate::models::{PrizeDrawSnapshot, PrizeEntry, Submission, SubmissionStatus};
use crate::selection::{RandomSource, pick_weighted_random};

/// Window of approved submissions that count towards a draw
///
/// A draw covers everything since the previous draw ended, or the default
/// period when this is the first draw.
pub fn draw_period(
    previous: Option<&PrizeDrawSnapshot>,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = previous
        .map(|snapshot| snapshot.period_end)
        .filter(|end| *end < now)
        .unwrap_or_else(|| now - Duration::days(PRIZE_DRAW_PERIOD_DAYS));
    (start, now)
}

/// Sum prize entries per user from approved submissions
pub fn build_prize_entries(submissions: &[Submission]) -> Vec<PrizeEntry> {
    let mut totals: BTreeMap<UserId, u32> = BTreeMap::new();
    for submission in submissions {
        if submission.status != SubmissionStatus::Approved {
            continue;
        }
        if let Some(tier) = submission.tier {
            *totals.entry(submission.user_id).or_default() += tier.entries();
        }
    }

    totals
        .into_iter()
        .map(|(user_id, entries)| PrizeEntry { user_id, entries })
        .collect()
}

/// Roll distinct winners, weighted by entry count
pub fn roll_winners(
    entries: &[PrizeEntry],
    count: usize,
    rng: &mut dyn RandomSource,
) -> Vec<UserId> {
    let eligible: Vec<PrizeEntry> = entries.iter().filter(|e| e.entries > 0).cloned().collect();
    pick_weighted_random(&eligible, count, rng)
        .into_iter()
        .map(|entry| entry.user_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompletionTier;
    use crate::selection::ScriptedRandom;
    use chrono::TimeZone;
    use poise::serenity_prelude::GuildId;

    fn submission(user: u64, status: SubmissionStatus, tier: Option<CompletionTier>) -> Submission {
        Submission {
            id: 1,
            guild_id: GuildId::new(1),
            user_id: UserId::new(user),
            event_id: 1,
            task_id: "t".to_string(),
            proof: String::new(),
            status,
            tier,
            reviewed_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_prize_entries() {
        let submissions = vec![
            submission(2, SubmissionStatus::Approved, Some(CompletionTier::Gold)),
            submission(1, SubmissionStatus::Approved, Some(CompletionTier::Bronze)),
            submission(2, SubmissionStatus::Approved, Some(CompletionTier::Silver)),
            submission(3, SubmissionStatus::Rejected, None),
            submission(4, SubmissionStatus::Pending, None),
        ];

        let entries = build_prize_entries(&submissions);
        assert_eq!(
            entries,
            vec![
                PrizeEntry { user_id: UserId::new(1), entries: 1 },
                PrizeEntry { user_id: UserId::new(2), entries: 5 },
            ]
        );
    }

    #[test]
    fn test_roll_winners_is_weighted_and_distinct() {
        let entries = vec![
            PrizeEntry { user_id: UserId::new(1), entries: 1 },
            PrizeEntry { user_id: UserId::new(2), entries: 0 },
            PrizeEntry { user_id: UserId::new(3), entries: 5 },
        ];

        // 2 is past user 1's single entry and lands on user 3
        let winners = roll_winners(&entries, 5, &mut ScriptedRandom::new(&[2]));
        assert_eq!(winners, vec![UserId::new(3), UserId::new(1)]);
    }

    #[test]
    fn test_roll_winners_without_entries() {
        assert!(roll_winners(&[], 1, &mut ScriptedRandom::new(&[])).is_empty());
    }

    #[test]
    fn test_draw_period() {
        let now = Utc.with_ymd_and_hms(2024, 3, 12, 0, 0, 0).unwrap();
        let (start, end) = draw_period(None, now);
        assert_eq!(end, now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 27, 0, 0, 0).unwrap());

        let previous = PrizeDrawSnapshot {
            id: 1,
            guild_id: GuildId::new(1),
            period_start: Utc.with_ymd_and_hms(2024, 2, 13, 0, 0, 0).unwrap(),
            period_end: Utc.with_ymd_and_hms(2024, 2, 27, 0, 0, 0).unwrap(),
            entries: vec![],
            winners: vec![],
            rolled_at: None,
        };
        let (start, _) = draw_period(Some(&previous), now);
        assert_eq!(start, previous.period_end);
    }
}

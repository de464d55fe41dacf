use poise::serenity_prelude::{GuildId, UserId};
use tracing::info;

use crate::models::{CompletionTier, Submission, SubmissionStatus};
use crate::repository::{RepoResult, SubmissionRepository, UserRepository};

#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    Reviewed(Submission),
    /// Someone else got there first
    AlreadyReviewed(Submission),
    NotFound,
}

/// Approve a submission at a tier, or reject it when `tier` is `None`
///
/// Only pending submissions change. An approval credits the submitter's
/// completion stats exactly once.
pub async fn review_submission(
    submissions: &dyn SubmissionRepository,
    users: &dyn UserRepository,
    guild_id: GuildId,
    submission_id: i64,
    tier: Option<CompletionTier>,
    reviewer: UserId,
) -> RepoResult<ReviewOutcome> {
    let status = match tier {
        Some(_) => SubmissionStatus::Approved,
        None => SubmissionStatus::Rejected,
    };

    let changed = submissions
        .review_submission(guild_id, submission_id, status, tier, reviewer)
        .await?;
    let Some(submission) = submissions.get_submission(guild_id, submission_id).await? else {
        return Ok(ReviewOutcome::NotFound);
    };
    if !changed {
        return Ok(ReviewOutcome::AlreadyReviewed(submission));
    }

    if let Some(tier) = tier {
        users
            .record_completion(guild_id, submission.user_id, tier)
            .await?;
    }

    info!(
        "Submission {} {} by {}",
        submission_id,
        status.as_str(),
        reviewer
    );
    Ok(ReviewOutcome::Reviewed(submission))
}

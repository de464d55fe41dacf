use dashmap::DashMap;
use poise::serenity_prelude::{GuildId, UserId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::models::Vote;
use crate::repository::{RepoResult, TaskEventRepository, TaskRepository};

type FeedbackKey = (GuildId, i64, String, UserId);

/// Per-ballot locks so one user's rapid clicks on a task are applied in order
#[derive(Default)]
pub struct FeedbackLocks {
    locks: DashMap<FeedbackKey, Arc<Mutex<()>>>,
}

impl FeedbackLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self, key: &FeedbackKey) -> Arc<Mutex<()>> {
        self.locks.entry(key.clone()).or_default().clone()
    }

    /// Drop the lock once nobody else holds or waits on it
    fn release(&self, key: &FeedbackKey) {
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The vote was stored and the task weight moved by `delta`
    Recorded { delta: i32 },
    /// The user already cast this exact vote
    Unchanged,
    /// The event is gone or never contained the task
    UnknownTask,
}

/// Store a user's rating of an event task and adjust the task's weight
///
/// Each user holds at most one vote per task per event. Switching sides moves
/// the weight by two so the net effect always equals the current vote. Votes
/// on the same ballot are serialized, so a double click is counted once.
#[allow(clippy::too_many_arguments)]
pub async fn record_feedback(
    locks: &FeedbackLocks,
    events: &dyn TaskEventRepository,
    tasks: &dyn TaskRepository,
    guild_id: GuildId,
    event_id: i64,
    task_id: &str,
    user_id: UserId,
    vote: Vote,
) -> RepoResult<FeedbackOutcome> {
    let key = (guild_id, event_id, task_id.to_string(), user_id);
    let lock = locks.acquire(&key);
    let outcome = {
        let _guard = lock.lock().await;
        apply_feedback(events, tasks, guild_id, event_id, task_id, user_id, vote).await
    };
    drop(lock);
    locks.release(&key);
    outcome
}

async fn apply_feedback(
    events: &dyn TaskEventRepository,
    tasks: &dyn TaskRepository,
    guild_id: GuildId,
    event_id: i64,
    task_id: &str,
    user_id: UserId,
    vote: Vote,
) -> RepoResult<FeedbackOutcome> {
    let known = events
        .get_event(guild_id, event_id)
        .await?
        .is_some_and(|event| event.task(task_id).is_some());
    if !known {
        return Ok(FeedbackOutcome::UnknownTask);
    }

    let previous = events.get_feedback(guild_id, event_id, task_id, user_id).await?;
    if previous == Some(vote) {
        return Ok(FeedbackOutcome::Unchanged);
    }

    let delta = vote.weight_delta(previous);
    events
        .set_feedback(guild_id, event_id, task_id, user_id, vote)
        .await?;
    tasks.adjust_task_weight(guild_id, task_id, delta).await?;

    info!(
        "User {} voted {} on task {} (weight {:+})",
        user_id,
        vote.as_str(),
        task_id,
        delta
    );
    Ok(FeedbackOutcome::Recorded { delta })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventTask, TaskCategory, TaskEvent, TaskPoll, Task};
    use crate::repository::ImportCounts;
    use async_trait::async_trait;
    use chrono::Utc;
    use poise::serenity_prelude::{ChannelId, MessageId};
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeStore {
        votes: StdMutex<HashMap<(i64, String, UserId), Vote>>,
        weight_changes: StdMutex<Vec<(String, i32)>>,
        locks: FeedbackLocks,
    }

    fn event() -> TaskEvent {
        TaskEvent {
            id: 1,
            guild_id: GuildId::new(1),
            created_at: Utc::now(),
            tasks: vec![EventTask {
                category: TaskCategory::PvM,
                task_id: "p1".to_string(),
                task_name: "Kill things".to_string(),
            }],
            keyword: Some("word".to_string()),
            channel_id: None,
            message_id: None,
        }
    }

    #[async_trait]
    impl TaskEventRepository for FakeStore {
        async fn create_event(&self, _: GuildId, _: &[EventTask]) -> RepoResult<TaskEvent> {
            unimplemented!()
        }
        async fn get_event(&self, _: GuildId, event_id: i64) -> RepoResult<Option<TaskEvent>> {
            Ok((event_id == 1).then(event))
        }
        async fn get_latest_event(&self, _: GuildId) -> RepoResult<Option<TaskEvent>> {
            Ok(Some(event()))
        }
        async fn set_event_keyword(&self, _: GuildId, _: i64, _: &str) -> RepoResult<()> {
            unimplemented!()
        }
        async fn set_event_message(
            &self,
            _: GuildId,
            _: i64,
            _: ChannelId,
            _: MessageId,
        ) -> RepoResult<()> {
            unimplemented!()
        }
        async fn create_poll(&self, _: GuildId, _: TaskCategory, _: &[String]) -> RepoResult<TaskPoll> {
            unimplemented!()
        }
        async fn get_active_polls(&self, _: GuildId) -> RepoResult<Vec<TaskPoll>> {
            unimplemented!()
        }
        async fn set_poll_message(
            &self,
            _: GuildId,
            _: i64,
            _: ChannelId,
            _: MessageId,
        ) -> RepoResult<()> {
            unimplemented!()
        }
        async fn record_poll_vote(&self, _: GuildId, _: i64, _: UserId, _: &str) -> RepoResult<bool> {
            unimplemented!()
        }
        async fn get_poll_votes(&self, _: i64) -> RepoResult<Vec<(UserId, String)>> {
            unimplemented!()
        }
        async fn close_poll(&self, _: GuildId, _: i64) -> RepoResult<()> {
            unimplemented!()
        }
        async fn get_feedback(
            &self,
            _: GuildId,
            event_id: i64,
            task_id: &str,
            user_id: UserId,
        ) -> RepoResult<Option<Vote>> {
            let previous = self
                .votes
                .lock()
                .unwrap()
                .get(&(event_id, task_id.to_string(), user_id))
                .copied();
            // Give other ballots a chance to run, as a database round trip would
            tokio::task::yield_now().await;
            Ok(previous)
        }
        async fn set_feedback(
            &self,
            _: GuildId,
            event_id: i64,
            task_id: &str,
            user_id: UserId,
            vote: Vote,
        ) -> RepoResult<()> {
            let mut votes = self.votes.lock().unwrap();
            votes.insert((event_id, task_id.to_string(), user_id), vote);
            Ok(())
        }
    }

    #[async_trait]
    impl TaskRepository for FakeStore {
        async fn get_all_tasks(&self, _: GuildId) -> RepoResult<Vec<Task>> {
            unimplemented!()
        }
        async fn get_tasks_by_category(&self, _: GuildId, _: TaskCategory) -> RepoResult<Vec<Task>> {
            unimplemented!()
        }
        async fn insert_tasks(&self, _: GuildId, _: &[Task]) -> RepoResult<ImportCounts> {
            unimplemented!()
        }
        async fn adjust_task_weight(&self, _: GuildId, task_id: &str, delta: i32) -> RepoResult<()> {
            self.weight_changes
                .lock()
                .unwrap()
                .push((task_id.to_string(), delta));
            Ok(())
        }
    }

    async fn vote(store: &FakeStore, user: u64, vote: Vote) -> FeedbackOutcome {
        record_feedback(&store.locks, store, store, GuildId::new(1), 1, "p1", UserId::new(user), vote)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_vote_and_switch() {
        let store = FakeStore::default();

        assert_eq!(vote(&store, 5, Vote::Up).await, FeedbackOutcome::Recorded { delta: 1 });
        assert_eq!(vote(&store, 5, Vote::Up).await, FeedbackOutcome::Unchanged);
        assert_eq!(vote(&store, 5, Vote::Down).await, FeedbackOutcome::Recorded { delta: -2 });
        assert_eq!(vote(&store, 6, Vote::Down).await, FeedbackOutcome::Recorded { delta: -1 });

        let changes = store.weight_changes.lock().unwrap().clone();
        assert_eq!(
            changes,
            vec![("p1".to_string(), 1), ("p1".to_string(), -2), ("p1".to_string(), -1)]
        );
    }

    #[tokio::test]
    async fn test_double_click_counts_once() {
        let store = FakeStore::default();

        let (first, second) = tokio::join!(vote(&store, 5, Vote::Up), vote(&store, 5, Vote::Up));

        assert_eq!(first, FeedbackOutcome::Recorded { delta: 1 });
        assert_eq!(second, FeedbackOutcome::Unchanged);
        assert_eq!(
            store.weight_changes.lock().unwrap().clone(),
            vec![("p1".to_string(), 1)]
        );
        assert_eq!(store.locks.len(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_switch_nets_current_vote() {
        let store = FakeStore::default();

        let (up, down) = tokio::join!(vote(&store, 5, Vote::Up), vote(&store, 5, Vote::Down));

        assert_eq!(up, FeedbackOutcome::Recorded { delta: 1 });
        assert_eq!(down, FeedbackOutcome::Recorded { delta: -2 });
        let net: i32 = store.weight_changes.lock().unwrap().iter().map(|(_, d)| d).sum();
        assert_eq!(net, -1);
    }

    #[tokio::test]
    async fn test_unknown_task_or_event() {
        let store = FakeStore::default();

        let outcome = record_feedback(&store.locks, &store, &store, GuildId::new(1), 1, "zz", UserId::new(5), Vote::Up)
            .await
            .unwrap();
        assert_eq!(outcome, FeedbackOutcome::UnknownTask);

        let outcome = record_feedback(&store.locks, &store, &store, GuildId::new(1), 9, "p1", UserId::new(5), Vote::Up)
            .await
            .unwrap();
        assert_eq!(outcome, FeedbackOutcome::UnknownTask);
        assert!(store.weight_changes.lock().unwrap().is_empty());
    }
}

use poise::serenity_prelude::UserId;
use tracing::info;

use crate::models::{EventTask, Task, TaskCategory};
use crate::selection::{RandomSource, pick_weighted_random, select_tasks_for_category};
use crate::utils::tally::winning_option;

/// Options and ballots of one closed category poll
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub category: TaskCategory,
    pub options: Vec<String>,
    pub votes: Vec<(UserId, String)>,
}

/// Decide the task for every category of a new event
///
/// The poll winner takes the slot. A poll nobody voted on falls back to a
/// weighted draw among its options, and a category without a poll gets a
/// fresh pick from the selector. Categories with no tasks at all are left out.
pub fn choose_event_tasks(
    categories: &[TaskCategory],
    polls: &[PollOutcome],
    all_tasks: &[Task],
    rng: &mut dyn RandomSource,
) -> Vec<EventTask> {
    let find_task = |id: &str| all_tasks.iter().find(|t| t.id == id);

    categories
        .iter()
        .filter_map(|category| {
            let poll = polls.iter().find(|p| p.category == *category);

            let chosen: Option<Task> = match poll {
                Some(poll) => match winning_option(&poll.options, &poll.votes) {
                    Some(winner) => find_task(&winner).cloned(),
                    None => {
                        let offered: Vec<Task> = poll
                            .options
                            .iter()
                            .filter_map(|id| find_task(id).cloned())
                            .collect();
                        info!("No votes in {} poll, drawing from its options", category);
                        pick_weighted_random(&offered, 1, rng).into_iter().next()
                    }
                },
                None => select_tasks_for_category(*category, all_tasks, rng)
                    .into_iter()
                    .next(),
            };

            chosen.map(|task| EventTask {
                category: *category,
                task_id: task.id.clone(),
                task_name: task.display_name(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TierAmounts;
    use crate::selection::ScriptedRandom;

    fn task(id: &str, category: TaskCategory) -> Task {
        Task {
            id: id.to_string(),
            name: format!("Do {}", id),
            category,
            skill: Some(id.to_string()),
            verification_type: "screenshot".to_string(),
            amounts: TierAmounts { bronze: 1, silver: 2, gold: 3 },
            weight: 50,
        }
    }

    fn all_tasks() -> Vec<Task> {
        vec![
            task("p1", TaskCategory::PvM),
            task("p2", TaskCategory::PvM),
            task("p3", TaskCategory::PvM),
            task("s1", TaskCategory::Skilling),
            task("m1", TaskCategory::MinigameMisc),
        ]
    }

    #[test]
    fn test_poll_winner_takes_slot() {
        let polls = vec![PollOutcome {
            category: TaskCategory::PvM,
            options: vec!["p1".into(), "p2".into(), "p3".into()],
            votes: vec![
                (UserId::new(1), "p3".into()),
                (UserId::new(2), "p3".into()),
                (UserId::new(3), "p1".into()),
            ],
        }];

        let chosen = choose_event_tasks(
            &[TaskCategory::PvM],
            &polls,
            &all_tasks(),
            &mut ScriptedRandom::new(&[]),
        );

        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].task_id, "p3");
        assert_eq!(chosen[0].task_name, "Do p3 (1/2/3)");
    }

    #[test]
    fn test_unvoted_poll_draws_from_options() {
        let polls = vec![PollOutcome {
            category: TaskCategory::PvM,
            options: vec!["p2".into(), "p3".into()],
            votes: vec![],
        }];

        // Zero draw lands on the first offered task
        let chosen = choose_event_tasks(
            &[TaskCategory::PvM],
            &polls,
            &all_tasks(),
            &mut ScriptedRandom::new(&[0]),
        );

        assert_eq!(chosen[0].task_id, "p2");
    }

    #[test]
    fn test_missing_poll_uses_selector_and_skips_empty_categories() {
        let chosen = choose_event_tasks(
            &TaskCategory::scheduled(true),
            &[],
            &all_tasks(),
            &mut ScriptedRandom::new(&[]),
        );

        let categories: Vec<TaskCategory> = chosen.iter().map(|t| t.category).collect();
        assert_eq!(
            categories,
            vec![TaskCategory::PvM, TaskCategory::Skilling, TaskCategory::MinigameMisc]
        );
        assert_eq!(chosen[1].task_id, "s1");
    }
}

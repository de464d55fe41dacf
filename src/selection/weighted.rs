use std::collections::BTreeMap;
use tracing::warn;

use super::random::{RandomSource, shuffle};
use crate::constants::{DEFAULT_TASK_WEIGHT, TASKS_PER_CATEGORY, UNKNOWN_SKILL};
use crate::models::{Task, TaskCategory};

/// Anything that can be drawn with a relative weight
pub trait Weighted {
    /// Relative weight; `None` means the default weight
    fn weight(&self) -> Option<i64>;
}

/// Weight used for a draw. Non-positive weights still get a minimal chance.
fn draw_weight<T: Weighted>(item: &T) -> i64 {
    item.weight().unwrap_or(DEFAULT_TASK_WEIGHT as i64).max(1)
}

/// Draw up to `count` distinct items, each with probability proportional to its weight
///
/// Every draw picks `r` in `[0, total)` and walks the remaining pool subtracting
/// weights until `r` drops to zero or below. The chosen item is removed before
/// the next draw, so results never repeat. Stops early once the pool is empty.
pub fn pick_weighted_random<T: Weighted + Clone>(
    pool: &[T],
    count: usize,
    rng: &mut dyn RandomSource,
) -> Vec<T> {
    let mut remaining: Vec<&T> = pool.iter().collect();
    let mut selected = Vec::with_capacity(count.min(pool.len()));

    while selected.len() < count && !remaining.is_empty() {
        let total: i64 = remaining.iter().map(|item| draw_weight(*item)).sum();
        let mut r = rng.next_below(total as u64) as i64;

        let mut chosen = remaining.len() - 1;
        for (index, item) in remaining.iter().enumerate() {
            r -= draw_weight(*item);
            if r <= 0 {
                chosen = index;
                break;
            }
        }

        selected.push(remaining.remove(chosen).clone());
    }

    selected
}

/// Pick the poll candidates for one category
///
/// Skilling picks at most one task per skill from up to three randomly chosen
/// skills. Every other category draws up to three tasks straight from its pool.
pub fn select_tasks_for_category(
    category: TaskCategory,
    all_tasks: &[Task],
    rng: &mut dyn RandomSource,
) -> Vec<Task> {
    let pool: Vec<Task> = all_tasks
        .iter()
        .filter(|t| t.category == category)
        .cloned()
        .collect();

    if pool.is_empty() {
        warn!("No tasks found for category {}", category);
        return Vec::new();
    }

    if category != TaskCategory::Skilling {
        return pick_weighted_random(&pool, TASKS_PER_CATEGORY, rng);
    }

    let mut by_skill: BTreeMap<String, Vec<Task>> = BTreeMap::new();
    for task in pool {
        let skill = task
            .skill
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_SKILL.to_string());
        by_skill.entry(skill).or_default().push(task);
    }

    let mut skills: Vec<String> = by_skill.keys().cloned().collect();
    shuffle(&mut skills, rng);

    skills
        .iter()
        .take(TASKS_PER_CATEGORY)
        .filter_map(|skill| by_skill.get(skill))
        .flat_map(|group| pick_weighted_random(group, 1, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TierAmounts;
    use crate::selection::{ScriptedRandom, ThreadRandom};
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        weight: Option<i64>,
    }

    impl Weighted for Item {
        fn weight(&self) -> Option<i64> {
            self.weight
        }
    }

    fn item(name: &'static str, weight: i64) -> Item {
        Item { name, weight: Some(weight) }
    }

    fn task(id: &str, category: TaskCategory, skill: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            name: format!("Task {}", id),
            category,
            skill: skill.map(str::to_string),
            verification_type: "screenshot".to_string(),
            amounts: TierAmounts { bronze: 1, silver: 2, gold: 3 },
            weight: 50,
        }
    }

    #[test]
    fn test_pick_returns_distinct_items_from_pool() {
        let names = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];
        let pool: Vec<Item> = names.iter().map(|n| item(n, 10)).collect();

        for count in [0, 1, 3, 10, 15] {
            let picked = pick_weighted_random(&pool, count, &mut ThreadRandom);
            assert_eq!(picked.len(), count.min(pool.len()));

            let names: HashSet<_> = picked.iter().map(|i| i.name).collect();
            assert_eq!(names.len(), picked.len());
            assert!(picked.iter().all(|p| pool.contains(p)));
        }
    }

    #[test]
    fn test_pick_from_empty_pool() {
        let pool: Vec<Item> = Vec::new();
        assert!(pick_weighted_random(&pool, 3, &mut ThreadRandom).is_empty());
    }

    #[test]
    fn test_maximal_draw_favors_heavy_first_item() {
        let pool = vec![item("heavy", 100), item("light", 1)];
        // Highest value available in [0, 101)
        let mut rng = ScriptedRandom::new(&[100]);

        let picked = pick_weighted_random(&pool, 1, &mut rng);
        assert_eq!(picked[0].name, "heavy");
        assert_eq!(rng.requests, vec![101]);
    }

    #[test]
    fn test_out_of_range_draw_is_clamped() {
        let pool = vec![item("heavy", 100), item("light", 1)];
        let mut rng = ScriptedRandom::new(&[101]);
        let picked = pick_weighted_random(&pool, 2, &mut rng);

        // 101 is clamped to 100 and lands on the first item; the second draw takes what remains
        assert_eq!(picked[0].name, "heavy");
        assert_eq!(picked[1].name, "light");
        assert_eq!(rng.requests, vec![101, 1]);
    }

    #[test]
    fn test_unset_and_non_positive_weights() {
        let pool = vec![
            Item { name: "default", weight: None },
            item("negative", -5),
        ];
        let mut rng = ScriptedRandom::new(&[50]);

        let picked = pick_weighted_random(&pool, 2, &mut rng);
        assert_eq!(picked.len(), 2);
        // default weight 50 plus clamped weight 1
        assert_eq!(rng.requests[0], 51);
        assert_eq!(picked[0].name, "default");
    }

    #[test]
    fn test_heavier_items_are_drawn_more_often() {
        let pool = vec![item("common", 90), item("rare", 10)];
        let common = (0..10_000)
            .filter(|_| pick_weighted_random(&pool, 1, &mut ThreadRandom)[0].name == "common")
            .count();
        assert!(common > 8_000, "common drawn {} times", common);
    }

    #[test]
    fn test_select_for_empty_category() {
        let tasks = vec![task("1", TaskCategory::PvM, None)];
        assert!(select_tasks_for_category(TaskCategory::Leagues, &tasks, &mut ThreadRandom).is_empty());
    }

    #[test]
    fn test_select_non_skilling_takes_three() {
        let tasks: Vec<Task> = (0..6)
            .map(|i| task(&i.to_string(), TaskCategory::PvM, None))
            .chain(std::iter::once(task("x", TaskCategory::Skilling, Some("Mining"))))
            .collect();

        let picked = select_tasks_for_category(TaskCategory::PvM, &tasks, &mut ThreadRandom);
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().all(|t| t.category == TaskCategory::PvM));
    }

    #[test]
    fn test_select_skilling_one_per_skill() {
        let tasks = vec![
            task("m1", TaskCategory::Skilling, Some("Mining")),
            task("m2", TaskCategory::Skilling, Some("Mining")),
            task("m3", TaskCategory::Skilling, Some("Mining")),
            task("f1", TaskCategory::Skilling, Some("Fishing")),
            task("f2", TaskCategory::Skilling, Some("Fishing")),
            task("w1", TaskCategory::Skilling, Some("Woodcutting")),
            task("a1", TaskCategory::Skilling, Some("Agility")),
            task("u1", TaskCategory::Skilling, None),
        ];

        for _ in 0..200 {
            let picked = select_tasks_for_category(TaskCategory::Skilling, &tasks, &mut ThreadRandom);
            assert_eq!(picked.len(), 3);

            let skills: HashSet<_> = picked
                .iter()
                .map(|t| t.skill.clone().unwrap_or_else(|| UNKNOWN_SKILL.to_string()))
                .collect();
            assert_eq!(skills.len(), picked.len());
        }
    }

    #[test]
    fn test_select_skilling_with_fewer_skills() {
        let tasks = vec![
            task("m1", TaskCategory::Skilling, Some("Mining")),
            task("m2", TaskCategory::Skilling, Some("Mining")),
            task("u1", TaskCategory::Skilling, None),
        ];

        let picked = select_tasks_for_category(TaskCategory::Skilling, &tasks, &mut ThreadRandom);
        assert_eq!(picked.len(), 2);
        assert_ne!(picked[0].skill, picked[1].skill);
    }
}

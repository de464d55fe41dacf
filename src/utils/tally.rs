/// Pure vote counting (Discord-agnostic)
use std::collections::HashMap;
use std::hash::Hash;

/// Count votes per option, in option order
pub fn count_votes<T, U>(options: &[T], votes: &[(U, T)]) -> Vec<(T, usize)>
where
    T: Clone + Eq + Hash,
{
    let mut counts: HashMap<&T, usize> = HashMap::new();
    for (_, choice) in votes {
        *counts.entry(choice).or_default() += 1;
    }

    options
        .iter()
        .map(|option| (option.clone(), counts.get(option).copied().unwrap_or(0)))
        .collect()
}

/// Winning option of a poll
///
/// Votes for options not on the ballot are ignored. Ties go to the option
/// listed first; a poll without valid votes has no winner.
pub fn winning_option<T, U>(options: &[T], votes: &[(U, T)]) -> Option<T>
where
    T: Clone + Eq + Hash,
{
    let mut best: Option<(T, usize)> = None;
    for (option, count) in count_votes(options, votes) {
        if count == 0 {
            continue;
        }
        if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
            best = Some((option, count));
        }
    }
    best.map(|(option, _)| option)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_votes() {
        let options = vec!["a", "b", "c"];
        let votes = vec![(1, "a"), (2, "c"), (3, "a"), (4, "z")];
        assert_eq!(count_votes(&options, &votes), vec![("a", 2), ("b", 0), ("c", 1)]);
    }

    #[test]
    fn test_winning_option() {
        let options = vec!["a", "b", "c"];
        assert_eq!(winning_option(&options, &[(1, "b"), (2, "b"), (3, "c")]), Some("b"));
    }

    #[test]
    fn test_winning_option_tie_goes_to_first() {
        let options = vec!["a", "b", "c"];
        assert_eq!(winning_option(&options, &[(1, "c"), (2, "b")]), Some("b"));
    }

    #[test]
    fn test_winning_option_without_votes() {
        let options = vec!["a", "b"];
        let votes: Vec<(u64, &str)> = vec![(1, "z")];
        assert_eq!(winning_option(&options, &votes), None);
        assert_eq!(winning_option::<&str, u64>(&options, &[]), None);
    }
}

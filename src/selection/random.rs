use rand::Rng;
#[cfg(test)]
use std::collections::VecDeque;

/// Source of uniform random integers
///
/// Selection code draws through this trait so tests can script the draws.
pub trait RandomSource: Send {
    /// Uniform integer in `0..upper`; `upper` is always greater than zero
    fn next_below(&mut self, upper: u64) -> u64;
}

/// Thread-local RNG from `rand`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_below(&mut self, upper: u64) -> u64 {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Shuffle a slice uniformly (Fisher-Yates)
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.next_below(i as u64 + 1) as usize;
        items.swap(i, j);
    }
}

/// Replays a fixed list of draws, clamped into range
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<u64>,
    /// Upper bounds requested so far
    pub requests: Vec<u64>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(draws: &[u64]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
            requests: Vec::new(),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn next_below(&mut self, upper: u64) -> u64 {
        self.requests.push(upper);
        // Out of script: always take the lowest value
        self.draws.pop_front().unwrap_or(0).min(upper - 1)
    }
}

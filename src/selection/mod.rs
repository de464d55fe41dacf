/// Random selection of tasks, keywords and prize winners
mod keyword;
mod random;
mod weighted;

pub use keyword::KeywordSelector;
pub use random::{RandomSource, ThreadRandom, shuffle};
pub use weighted::{Weighted, pick_weighted_random, select_tasks_for_category};

#[cfg(test)]
pub use random::ScriptedRandom;

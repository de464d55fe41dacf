use std::fmt;
use std::str::FromStr;

use crate::models::{CompletionTier, Vote};

/// Fields of the task setup wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    TaskChannel,
    VerificationChannel,
    TaskAdminRole,
    Finish,
}

impl SetupField {
    fn as_str(&self) -> &'static str {
        match self {
            SetupField::TaskChannel => "channel",
            SetupField::VerificationChannel => "verification",
            SetupField::TaskAdminRole => "admin",
            SetupField::Finish => "finish",
        }
    }
}

/// Every component the bot posts, decoded from its custom id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentAction {
    TaskFeedback {
        vote: Vote,
        task_id: String,
        event_id: i64,
    },
    TaskVote {
        poll_id: i64,
        task_id: String,
    },
    MovieVote {
        poll_id: i64,
        movie_id: i64,
    },
    Approve {
        tier: CompletionTier,
        submission_id: i64,
    },
    Reject {
        submission_id: i64,
    },
    TaskSetup(SetupField),
}

impl ComponentAction {
    pub fn custom_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ComponentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentAction::TaskFeedback { vote, task_id, event_id } => {
                write!(f, "task-feedback|{}|{}|{}", vote.as_str(), task_id, event_id)
            }
            ComponentAction::TaskVote { poll_id, task_id } => {
                write!(f, "task-vote|{}|{}", poll_id, task_id)
            }
            ComponentAction::MovieVote { poll_id, movie_id } => {
                write!(f, "movie-vote|{}|{}", poll_id, movie_id)
            }
            ComponentAction::Approve { tier, submission_id } => {
                write!(f, "approve_{}|{}", tier.as_str(), submission_id)
            }
            ComponentAction::Reject { submission_id } => write!(f, "reject|{}", submission_id),
            ComponentAction::TaskSetup(field) => write!(f, "tasksetup_{}", field.as_str()),
        }
    }
}

fn parse_id(value: &str) -> Result<i64, String> {
    value
        .parse::<i64>()
        .map_err(|_| format!("'{}' is not a numeric id", value))
}

impl FromStr for ComponentAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(field) = s.strip_prefix("tasksetup_") {
            let field = match field {
                "channel" => SetupField::TaskChannel,
                "verification" => SetupField::VerificationChannel,
                "admin" => SetupField::TaskAdminRole,
                "finish" => SetupField::Finish,
                other => return Err(format!("Unknown setup field '{}'", other)),
            };
            return Ok(ComponentAction::TaskSetup(field));
        }

        let parts: Vec<&str> = s.split('|').collect();
        match parts.as_slice() {
            ["task-feedback", vote, task_id, event_id] if !task_id.is_empty() => {
                Ok(ComponentAction::TaskFeedback {
                    vote: vote.parse::<Vote>()?,
                    task_id: task_id.to_string(),
                    event_id: parse_id(event_id)?,
                })
            }
            ["task-vote", poll_id, task_id] if !task_id.is_empty() => Ok(ComponentAction::TaskVote {
                poll_id: parse_id(poll_id)?,
                task_id: task_id.to_string(),
            }),
            ["movie-vote", poll_id, movie_id] => Ok(ComponentAction::MovieVote {
                poll_id: parse_id(poll_id)?,
                movie_id: parse_id(movie_id)?,
            }),
            ["reject", submission_id] => Ok(ComponentAction::Reject {
                submission_id: parse_id(submission_id)?,
            }),
            [action, submission_id] if action.starts_with("approve_") => {
                Ok(ComponentAction::Approve {
                    tier: action["approve_".len()..].parse::<CompletionTier>()?,
                    submission_id: parse_id(submission_id)?,
                })
            }
            _ => Err(format!("Unrecognised custom id '{}'", s)),
        }
    }
}

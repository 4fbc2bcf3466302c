//! Core types shared by the fetcher, formatter and poller

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review state of a submitted homework, as reported by the API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    /// The reviewer accepted the work
    Approved,
    /// A reviewer picked the work up
    Reviewing,
    /// The reviewer sent the work back with remarks
    Rejected,
}

impl HomeworkStatus {
    /// Every status the API is known to send
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Text shown to the student for this status
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of [`HomeworkStatus::ALL`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedStatus(pub String);

impl FromStr for HomeworkStatus {
    type Err = UnrecognizedStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HomeworkStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnrecognizedStatus(s.to_string()))
    }
}

/// A validated homework API answer
///
/// The records are kept as raw JSON: each one is checked separately when it
/// is formatted, and the poller compares whole lists by value.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    /// Homework records changed since the requested `from_date`
    pub homeworks: Vec<serde_json::Value>,

    /// Server time; the cursor for the next request
    pub current_date: i64,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the user's lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListSummary {
    pub id: String,
    pub name: String,
}

/// A task series, reduced to the fields the CLI shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskSummary {
    pub id: String,
    pub name: String,
    pub created: DateTime<Utc>,
    /// Completion state of the series' first task instance.
    pub completed: bool,
}

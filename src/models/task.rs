use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    #[serde(deserialize_with = "super::id")]
    pub id: String,
    pub title: String,
    pub project: String,
    pub deadline: DateTime<Utc>,
}

/// Fetched lazily by id; replaces the summary wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    #[serde(flatten)]
    pub summary: TaskSummary,
    pub assignee: String,
    pub group: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
}

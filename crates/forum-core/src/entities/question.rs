use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A question posted by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub title: String,
    pub body: String,
    /// Comma-separated tag text as submitted (normalised).
    pub tags: String,
    pub author_id: i64,
    pub author: String,
    /// Cached sum of vote units cast on this question.
    pub vote_score: i64,
    pub created_at: DateTime<Utc>,
}

impl Question {
    /// Split the stored tag text into individual tags.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An answer to a question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub body: String,
    pub author_id: i64,
    pub author: String,
    /// Cached sum of vote units cast on this answer.
    pub vote_score: i64,
    pub created_at: DateTime<Utc>,
}

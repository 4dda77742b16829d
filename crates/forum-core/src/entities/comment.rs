use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment under an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub answer_id: i64,
    pub body: String,
    pub author_id: i64,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

use serde::{Deserialize, Serialize};

use crate::enums::{VoteDirection, VoteTarget};

/// A user's active vote on one target. At most one exists per
/// `(target, target_id, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub id: i64,
    pub target: VoteTarget,
    pub target_id: i64,
    pub user_id: i64,
    pub direction: VoteDirection,
}

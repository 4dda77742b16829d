//! Vote repository: toggle semantics and the cached `vote_score`.
//!
//! A user holds at most one vote per target. Casting the same direction again
//! removes it, casting the other direction switches it. The target's
//! `vote_score` column always equals the sum of its vote directions; the vote
//! row and the score are written in one transaction.

use tracing::{info, warn};

use forum_core::entities::Vote;
use forum_core::enums::{VoteAction, VoteDirection, VoteTarget};

use crate::error::DatabaseError;
use crate::service::ForumService;

fn row_to_vote(row: &libsql::Row) -> Result<Vote, DatabaseError> {
    let unit = row.get::<i64>(4)?;
    let direction = VoteDirection::from_unit(unit)
        .ok_or_else(|| DatabaseError::Query(format!("Unexpected vote direction {unit}")))?;
    Ok(Vote {
        id: row.get::<i64>(0)?,
        target: crate::helpers::parse_column(&row.get::<String>(1)?)?,
        target_id: row.get::<i64>(2)?,
        user_id: row.get::<i64>(3)?,
        direction,
    })
}

async fn find_vote(
    conn: &libsql::Connection,
    target: VoteTarget,
    target_id: i64,
    user_id: i64,
) -> Result<Option<Vote>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, target_type, target_id, user_id, direction FROM votes
             WHERE target_type = ?1 AND target_id = ?2 AND user_id = ?3",
            libsql::params![target.as_str(), target_id, user_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_vote(&row)?)),
        None => Ok(None),
    }
}

async fn cached_score(
    conn: &libsql::Connection,
    target: VoteTarget,
    target_id: i64,
) -> Result<Option<i64>, DatabaseError> {
    let sql = format!("SELECT vote_score FROM {} WHERE id = ?1", target.table());
    let mut rows = conn.query(&sql, [target_id]).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get::<i64>(0)?)),
        None => Ok(None),
    }
}

async fn apply_vote(
    conn: &libsql::Connection,
    target: VoteTarget,
    target_id: i64,
    user_id: i64,
    direction: VoteDirection,
) -> Result<(VoteAction, i64), DatabaseError> {
    if cached_score(conn, target, target_id).await?.is_none() {
        return Err(DatabaseError::not_found(target.as_str(), target_id));
    }
    let mut users = conn.query("SELECT 1 FROM users WHERE id = ?1", [user_id]).await?;
    if users.next().await?.is_none() {
        return Err(DatabaseError::not_found("user", user_id));
    }

    let existing = find_vote(conn, target, target_id, user_id).await?;
    let (action, delta) = VoteAction::resolve(existing.as_ref().map(|v| v.direction), direction);

    match (action, existing) {
        (VoteAction::Created, _) => {
            conn.execute(
                "INSERT INTO votes (target_type, target_id, user_id, direction)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![target.as_str(), target_id, user_id, direction.unit()],
            )
            .await?;
        }
        (VoteAction::Removed, Some(vote)) => {
            conn.execute("DELETE FROM votes WHERE id = ?1", [vote.id])
                .await?;
        }
        (VoteAction::Switched, Some(vote)) => {
            conn.execute(
                "UPDATE votes SET direction = ?1 WHERE id = ?2",
                libsql::params![direction.unit(), vote.id],
            )
            .await?;
        }
        (_, None) => return Err(DatabaseError::NoResult),
    }

    let sql = format!(
        "UPDATE {} SET vote_score = vote_score + ?1 WHERE id = ?2",
        target.table()
    );
    conn.execute(&sql, libsql::params![delta, target_id]).await?;

    let score = cached_score(conn, target, target_id)
        .await?
        .ok_or(DatabaseError::NoResult)?;
    Ok((action, score))
}

async fn tally(
    conn: &libsql::Connection,
    target: VoteTarget,
    target_id: i64,
) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT COALESCE(SUM(direction), 0) FROM votes WHERE target_type = ?1 AND target_id = ?2",
            libsql::params![target.as_str(), target_id],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}

async fn repair_score(
    conn: &libsql::Connection,
    target: VoteTarget,
    target_id: i64,
) -> Result<(i64, i64), DatabaseError> {
    let cached = cached_score(conn, target, target_id)
        .await?
        .ok_or_else(|| DatabaseError::not_found(target.as_str(), target_id))?;
    let actual = tally(conn, target, target_id).await?;
    if cached != actual {
        let sql = format!("UPDATE {} SET vote_score = ?1 WHERE id = ?2", target.table());
        conn.execute(&sql, libsql::params![actual, target_id]).await?;
    }
    Ok((cached, actual))
}

impl ForumService {
    /// Cast, retract, or switch `user_id`'s vote on a question or answer.
    ///
    /// - no prior vote: record it, score moves by the direction's unit
    /// - same direction again: remove it, score moves back
    /// - opposite direction: switch it, score moves by twice the new unit
    ///
    /// Returns the target's score after the change.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the target or user does not
    /// exist; nothing is written in that case.
    pub async fn cast_vote(
        &self,
        target: VoteTarget,
        target_id: i64,
        user_id: i64,
        direction: VoteDirection,
    ) -> Result<i64, DatabaseError> {
        let tx = self.db().begin_write().await?;
        let result = apply_vote(&tx, target, target_id, user_id, direction).await;
        let (action, score) = tx.finish(result).await?;
        info!(
            %target,
            target_id,
            user_id,
            %direction,
            %action,
            score,
            "vote cast"
        );
        Ok(score)
    }

    /// The caller's active vote on a target, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_vote(
        &self,
        target: VoteTarget,
        target_id: i64,
        user_id: i64,
    ) -> Result<Option<Vote>, DatabaseError> {
        let read = self.db().read().await?;
        find_vote(&read, target, target_id, user_id).await
    }

    /// Cached score of a target.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the target does not exist.
    pub async fn vote_score(&self, target: VoteTarget, target_id: i64) -> Result<i64, DatabaseError> {
        let read = self.db().read().await?;
        cached_score(&read, target, target_id)
            .await?
            .ok_or_else(|| DatabaseError::not_found(target.as_str(), target_id))
    }

    /// Recompute a target's score from its vote rows and fix the cache if it
    /// drifted. Returns the recomputed score.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the target does not exist.
    pub async fn recount_vote_score(
        &self,
        target: VoteTarget,
        target_id: i64,
    ) -> Result<i64, DatabaseError> {
        let tx = self.db().begin_write().await?;
        let result = repair_score(&tx, target, target_id).await;
        let (cached, actual) = tx.finish(result).await?;
        if cached != actual {
            warn!(%target, target_id, cached, actual, "vote score drift repaired");
        }
        Ok(actual)
    }
}

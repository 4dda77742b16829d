//! Login session repository.
//!
//! Sessions are opaque random tokens mapped to a user with a fixed expiry.
//! Expiry timestamps are stored as second-precision RFC 3339 in UTC
//! (`2026-10-19T12:00:00Z`) so they compare correctly as text.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info, warn};

use forum_core::entities::User;

use crate::credentials::{new_session_token, verify_password};
use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::repos::user::{USER_COLUMNS, row_to_user};
use crate::service::ForumService;

fn expiry_text(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

async fn purge_expired(conn: &libsql::Connection, now: DateTime<Utc>) -> Result<u64, DatabaseError> {
    Ok(conn
        .execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            [expiry_text(now)],
        )
        .await?)
}

async fn open_session(
    conn: &libsql::Connection,
    username: &str,
    password: &str,
    ttl: chrono::Duration,
) -> Result<(User, String), DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS}, u.password_hash FROM users u WHERE u.username = ?1");
    let mut rows = conn.query(&sql, [username]).await?;
    let Some(row) = rows.next().await? else {
        return Err(DatabaseError::InvalidCredentials);
    };
    let stored = row.get::<String>(3)?;
    if !verify_password(password, &stored) {
        return Err(DatabaseError::InvalidCredentials);
    }
    let user = row_to_user(&row)?;

    let now = Utc::now();
    purge_expired(conn, now).await?;

    let token = new_session_token()?;
    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        libsql::params![
            token.as_str(),
            user.id,
            expiry_text(now),
            expiry_text(now + ttl)
        ],
    )
    .await?;

    Ok((user, token))
}

impl ForumService {
    /// Check credentials and open a session.
    ///
    /// Returns the user and the new session token. Expired sessions are
    /// purged on the way.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidCredentials` for an unknown username or
    /// wrong password; the two cases are indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), DatabaseError> {
        let tx = self.db().begin_write().await?;
        let result = open_session(&tx, username, password, self.session_ttl()).await;
        match tx.finish(result).await {
            Ok((user, token)) => {
                info!(user_id = user.id, "login");
                Ok((user, token))
            }
            Err(DatabaseError::InvalidCredentials) => {
                warn!(username, "rejected login");
                Err(DatabaseError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a session token to its user.
    ///
    /// Unknown and expired tokens both yield `None`; an expired session row
    /// is deleted.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn user_for_session(&self, token: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, s.expires_at
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1"
        );
        let found = {
            let read = self.db().read().await?;
            let mut rows = read.query(&sql, [token]).await?;
            match rows.next().await? {
                Some(row) => Some((parse_datetime(&row.get::<String>(3)?)?, row_to_user(&row)?)),
                None => None,
            }
        };
        // The read is released before the expiry delete takes the write gate.
        let Some((expires_at, user)) = found else {
            return Ok(None);
        };

        if expires_at <= Utc::now() {
            debug!(user_id = user.id, "session expired");
            self.logout(token).await?;
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// End a session. Returns whether a session was removed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn logout(&self, token: &str) -> Result<bool, DatabaseError> {
        let tx = self.db().begin_write().await?;
        let result = tx
            .execute("DELETE FROM sessions WHERE token = ?1", [token])
            .await
            .map_err(DatabaseError::from);
        let removed = tx.finish(result).await?;
        Ok(removed > 0)
    }
}

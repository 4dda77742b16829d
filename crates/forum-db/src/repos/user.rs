//! User repository: registration and lookup.

use chrono::Utc;
use tracing::info;

use forum_core::entities::User;
use forum_core::input::Registration;

use crate::credentials::hash_password;
use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::service::ForumService;

pub(crate) const USER_COLUMNS: &str = "u.id, u.username, u.created_at";

pub(crate) fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get::<i64>(0)?,
        username: row.get::<String>(1)?,
        created_at: parse_datetime(&row.get::<String>(2)?)?,
    })
}

pub(crate) async fn find_user(
    conn: &libsql::Connection,
    id: i64,
) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    let mut rows = conn.query(&sql, [id]).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_user(&row)?)),
        None => Ok(None),
    }
}

async fn username_taken(conn: &libsql::Connection, username: &str) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query("SELECT 1 FROM users WHERE username = ?1", [username])
        .await?;
    Ok(rows.next().await?.is_some())
}

async fn insert_user(
    conn: &libsql::Connection,
    registration: &Registration,
) -> Result<User, DatabaseError> {
    if username_taken(conn, &registration.username).await? {
        return Err(DatabaseError::Conflict(format!(
            "username '{}' is already taken",
            registration.username
        )));
    }

    let now = Utc::now();
    let password_hash = hash_password(&registration.password)?;
    let mut rows = conn
        .query(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3) RETURNING id",
            libsql::params![
                registration.username.as_str(),
                password_hash,
                now.to_rfc3339()
            ],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;

    Ok(User {
        id: row.get::<i64>(0)?,
        username: registration.username.clone(),
        created_at: now,
    })
}

impl ForumService {
    /// Create an account from a validated registration form.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Conflict` if the username is taken.
    pub async fn register_user(&self, registration: &Registration) -> Result<User, DatabaseError> {
        let tx = self.db().begin_write().await?;
        let result = insert_user(&tx, registration).await;
        let user = tx.finish(result).await?;
        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no user has this id.
    pub async fn get_user(&self, id: i64) -> Result<User, DatabaseError> {
        let read = self.db().read().await?;
        find_user(&read, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("user", id))
    }
}

//! # forum-db
//!
//! libSQL storage for the forum.
//!
//! Holds every relational record: users and their login sessions, questions,
//! answers, comments, and votes. All business rules that mutate the store
//! (vote toggling, reply saving, registration) are implemented as methods on
//! [`service::ForumService`].
//!
//! Mutations run inside [`WriteTx`]: an in-process write gate plus an
//! `IMMEDIATE` transaction, so a vote row and the cached score it feeds are
//! always written together or not at all.
//!
//! Reads never touch the writer's connection. They go through [`ReadConn`],
//! which only ever sees committed rows: file databases run in WAL mode and
//! hand each read its own connection, while an in-memory database (which
//! exists on one connection only) reads under the write gate.

pub mod credentials;
pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;

#[cfg(test)]
mod test_support;

use std::ops::Deref;
use std::time::Duration;

use error::DatabaseError;
use libsql::{Builder, TransactionBehavior};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Central database handle for all forum state.
///
/// Owns the libSQL database and one writer connection. Writers serialize
/// through `write_gate`; readers get a [`ReadConn`] from [`read`](Self::read).
pub struct ForumDb {
    db: libsql::Database,
    conn: libsql::Connection,
    write_gate: Mutex<()>,
    in_memory: bool,
}

impl ForumDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let in_memory = path.is_empty() || path == ":memory:";
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        if !in_memory {
            // The pragma answers with the resulting mode, so it is a query.
            let mut rows = conn
                .query("PRAGMA journal_mode = WAL", ())
                .await
                .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;
            let mode = match rows.next().await? {
                Some(row) => row.get::<String>(0)?,
                None => String::new(),
            };
            if !mode.eq_ignore_ascii_case("wal") {
                warn!(path, mode = %mode, "database is not in WAL mode");
            }
        }

        let forum_db = Self {
            db,
            conn,
            write_gate: Mutex::new(()),
            in_memory,
        };
        forum_db.run_migrations().await?;
        debug!(path, in_memory, "database opened");
        Ok(forum_db)
    }

    /// Get a connection for reading committed state.
    ///
    /// File databases get a fresh connection per call. An in-memory database
    /// waits for any in-flight write to finish and reads on the shared
    /// connection, so hold the returned value only as long as the read.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if a connection cannot be opened.
    pub async fn read(&self) -> Result<ReadConn<'_>, DatabaseError> {
        if self.in_memory {
            let gate = self.write_gate.lock().await;
            return Ok(ReadConn {
                inner: ReadInner::Shared {
                    conn: &self.conn,
                    _gate: gate,
                },
            });
        }
        let conn = self.db.connect()?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(ReadConn {
            inner: ReadInner::Dedicated(conn),
        })
    }

    /// Start a write transaction.
    ///
    /// Waits for any other writer in this process, then opens an `IMMEDIATE`
    /// transaction so the store's write lock is held from the first read.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the transaction cannot be started.
    pub async fn begin_write(&self) -> Result<WriteTx<'_>, DatabaseError> {
        let gate = self.write_gate.lock().await;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        Ok(WriteTx { tx, _gate: gate })
    }
}

/// A connection that only observes committed rows.
///
/// Derefs to the connection. Open a deferred transaction on it
/// (`read.transaction()`) when several statements must agree with each other.
pub struct ReadConn<'a> {
    inner: ReadInner<'a>,
}

enum ReadInner<'a> {
    Shared {
        conn: &'a libsql::Connection,
        _gate: MutexGuard<'a, ()>,
    },
    Dedicated(libsql::Connection),
}

impl Deref for ReadConn<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        match &self.inner {
            ReadInner::Shared { conn, .. } => *conn,
            ReadInner::Dedicated(conn) => conn,
        }
    }
}

/// An open write transaction holding the process-wide write gate.
///
/// Derefs to the connection so repo code issues statements on it directly.
/// Consume it with [`finish`](Self::finish), [`commit`](Self::commit), or
/// [`rollback`](Self::rollback).
pub struct WriteTx<'a> {
    // Field order matters: the transaction is dropped (and so rolled back
    // if unfinished) before the gate opens.
    tx: libsql::Transaction,
    _gate: MutexGuard<'a, ()>,
}

impl WriteTx<'_> {
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if `COMMIT` fails.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if `ROLLBACK` fails.
    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }

    /// Commit if `result` is `Ok`, roll back otherwise, and hand `result` on.
    ///
    /// A failed rollback is logged; the original error is what the caller sees.
    ///
    /// # Errors
    ///
    /// Returns the error in `result`, or the commit error.
    pub async fn finish<T>(self, result: Result<T, DatabaseError>) -> Result<T, DatabaseError> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "rollback failed after {e}");
                }
                Err(e)
            }
        }
    }
}

impl Deref for WriteTx<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to create an in-memory database for testing.
    async fn test_db() -> ForumDb {
        ForumDb::open_local(":memory:").await.unwrap()
    }

    async fn count(db: &ForumDb, sql: &str) -> i64 {
        let read = db.read().await.unwrap();
        let mut rows = read.query(sql, ()).await.unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "users",
            "sessions",
            "questions",
            "answers",
            "comments",
            "votes",
        ];
        for table in &tables {
            let mut rows = db
                .conn
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        // Running them again is a no-op
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forum.db");
        let path = path.to_str().unwrap();

        {
            let db = ForumDb::open_local(path).await.unwrap();
            db.conn
                .execute(
                    "INSERT INTO users (username, password_hash) VALUES ('alice', 'x')",
                    (),
                )
                .await
                .unwrap();
        }

        let db = ForumDb::open_local(path).await.unwrap();
        assert_eq!(count(&db, "SELECT COUNT(*) FROM users").await, 1);
    }

    #[tokio::test]
    async fn votes_unique_per_user_and_target() {
        let db = test_db().await;
        db.conn
            .execute(
                "INSERT INTO users (id, username, password_hash) VALUES (1, 'alice', 'x')",
                (),
            )
            .await
            .unwrap();

        db.conn
            .execute(
                "INSERT INTO votes (target_type, target_id, user_id, direction) VALUES ('answer', 1, 1, 1)",
                (),
            )
            .await
            .unwrap();

        // Duplicate should fail due to UNIQUE constraint
        let result = db
            .conn
            .execute(
                "INSERT INTO votes (target_type, target_id, user_id, direction) VALUES ('answer', 1, 1, -1)",
                (),
            )
            .await;
        assert!(result.is_err(), "second vote row should be rejected");
    }

    #[tokio::test]
    async fn vote_direction_is_checked() {
        let db = test_db().await;
        db.conn
            .execute(
                "INSERT INTO users (id, username, password_hash) VALUES (1, 'alice', 'x')",
                (),
            )
            .await
            .unwrap();

        let result = db
            .conn
            .execute(
                "INSERT INTO votes (target_type, target_id, user_id, direction) VALUES ('answer', 1, 1, 2)",
                (),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn comment_requires_existing_answer() {
        let db = test_db().await;
        db.conn
            .execute(
                "INSERT INTO users (id, username, password_hash) VALUES (1, 'alice', 'x')",
                (),
            )
            .await
            .unwrap();

        let result = db
            .conn
            .execute(
                "INSERT INTO comments (answer_id, body, author_id) VALUES (99, 'orphan', 1)",
                (),
            )
            .await;
        assert!(result.is_err(), "foreign key should reject orphan comment");
    }

    #[tokio::test]
    async fn write_tx_commit_and_rollback() {
        let db = test_db().await;

        let tx = db.begin_write().await.unwrap();
        tx.execute(
            "INSERT INTO users (username, password_hash) VALUES ('kept', 'x')",
            (),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let tx = db.begin_write().await.unwrap();
        tx.execute(
            "INSERT INTO users (username, password_hash) VALUES ('dropped', 'x')",
            (),
        )
        .await
        .unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(count(&db, "SELECT COUNT(*) FROM users").await, 1);
        assert!(db.conn.is_autocommit());
    }

    #[tokio::test]
    async fn finish_rolls_back_on_error() {
        let db = test_db().await;

        let tx = db.begin_write().await.unwrap();
        tx.execute(
            "INSERT INTO users (username, password_hash) VALUES ('ghost', 'x')",
            (),
        )
        .await
        .unwrap();
        let result: Result<(), _> = tx.finish(Err(DatabaseError::NoResult)).await;

        assert!(matches!(result, Err(DatabaseError::NoResult)));
        assert_eq!(count(&db, "SELECT COUNT(*) FROM users").await, 0);
    }

    #[tokio::test]
    async fn dropped_write_is_rolled_back() {
        let db = test_db().await;

        {
            let tx = db.begin_write().await.unwrap();
            tx.execute(
                "INSERT INTO users (username, password_hash) VALUES ('half', 'x')",
                (),
            )
            .await
            .unwrap();
        }

        assert!(db.conn.is_autocommit());
        let tx = db.begin_write().await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(count(&db, "SELECT COUNT(*) FROM users").await, 0);
    }

    #[tokio::test]
    async fn file_database_uses_wal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forum.db");
        let db = ForumDb::open_local(path.to_str().unwrap()).await.unwrap();

        let read = db.read().await.unwrap();
        let mut rows = read.query("PRAGMA journal_mode", ()).await.unwrap();
        let mode = rows.next().await.unwrap().unwrap().get::<String>(0).unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn reads_do_not_see_an_open_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forum.db");
        let db = ForumDb::open_local(path.to_str().unwrap()).await.unwrap();

        let tx = db.begin_write().await.unwrap();
        tx.execute(
            "INSERT INTO users (username, password_hash) VALUES ('pending', 'x')",
            (),
        )
        .await
        .unwrap();
        assert_eq!(count(&db, "SELECT COUNT(*) FROM users").await, 0);

        tx.commit().await.unwrap();
        assert_eq!(count(&db, "SELECT COUNT(*) FROM users").await, 1);
    }

    #[tokio::test]
    async fn in_memory_read_waits_for_the_writer() {
        let db = std::sync::Arc::new(test_db().await);

        let tx = db.begin_write().await.unwrap();
        tx.execute(
            "INSERT INTO users (username, password_hash) VALUES ('pending', 'x')",
            (),
        )
        .await
        .unwrap();

        let reader = {
            let db = std::sync::Arc::clone(&db);
            tokio::spawn(async move { count(&db, "SELECT COUNT(*) FROM users").await })
        };
        tokio::task::yield_now().await;
        assert!(!reader.is_finished());

        tx.rollback().await.unwrap();
        assert_eq!(reader.await.unwrap(), 0);
    }

    #[tokio::test]
    async fn voted_user_cannot_be_deleted() {
        let db = test_db().await;
        db.conn
            .execute(
                "INSERT INTO users (id, username, password_hash) VALUES (1, 'alice', 'x')",
                (),
            )
            .await
            .unwrap();
        db.conn
            .execute(
                "INSERT INTO votes (target_type, target_id, user_id, direction) VALUES ('question', 7, 1, 1)",
                (),
            )
            .await
            .unwrap();

        let result = db.conn.execute("DELETE FROM users WHERE id = 1", ()).await;
        assert!(result.is_err(), "a vote must not vanish with its voter");
        assert_eq!(count(&db, "SELECT COUNT(*) FROM votes").await, 1);
    }

    #[tokio::test]
    async fn answered_question_cannot_be_deleted() {
        let db = test_db().await;
        db.conn
            .execute_batch(
                "INSERT INTO users (id, username, password_hash) VALUES (1, 'alice', 'x');
                 INSERT INTO questions (id, title, body, author_id) VALUES (1, 't', 'b', 1);
                 INSERT INTO answers (id, question_id, body, author_id) VALUES (1, 1, 'a', 1);
                 INSERT INTO comments (answer_id, body, author_id) VALUES (1, 'c', 1);",
            )
            .await
            .unwrap();

        let result = db.conn.execute("DELETE FROM questions WHERE id = 1", ()).await;
        assert!(result.is_err());
        let result = db.conn.execute("DELETE FROM answers WHERE id = 1", ()).await;
        assert!(result.is_err());
        assert_eq!(count(&db, "SELECT COUNT(*) FROM comments").await, 1);
    }
}

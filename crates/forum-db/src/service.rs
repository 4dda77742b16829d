//! Service layer holding the forum's business rules.
//!
//! `ForumService` wraps `ForumDb` (raw database access) and the session
//! lifetime. All repo methods are implemented as `impl ForumService` blocks
//! in [`crate::repos`].
//!
//! Every mutation follows this protocol:
//! 1. Acquire the write gate and begin an `IMMEDIATE` transaction
//! 2. Check that referenced rows exist (`NotFound` otherwise)
//! 3. Execute SQL on the transaction
//! 4. Commit on success, roll back on any error
//!
//! Callers always pass the acting user's id explicitly.

use chrono::Duration;

use crate::ForumDb;
use crate::error::DatabaseError;

/// Default login session lifetime.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 14;

/// Orchestrates all reads and transactional writes against the store.
pub struct ForumService {
    db: ForumDb,
    session_ttl: Duration,
}

impl ForumService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path`: Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = ForumDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Create from an existing `ForumDb`.
    #[must_use]
    pub fn from_db(db: ForumDb) -> Self {
        Self {
            db,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    /// Override how long login sessions stay valid.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ForumDb {
        &self.db
    }

    #[must_use]
    pub const fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}

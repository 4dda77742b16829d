//! Reply repository: the content save service for answers and comments.
//!
//! A reply is either an answer under a question or a comment under an answer.
//! [`ReplyParent`] fixes which one at the type level, so there is no string
//! dispatch below the HTTP layer.

use chrono::Utc;
use tracing::info;

use forum_core::entities::{Answer, Comment};
use forum_core::enums::ReplyParent;
use forum_core::input::PostText;
use forum_core::responses::Reply;

use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::service::ForumService;

pub(crate) const ANSWER_COLUMNS: &str =
    "a.id, a.question_id, a.body, a.author_id, u.username, a.vote_score, a.created_at";

pub(crate) const COMMENT_COLUMNS: &str =
    "c.id, c.answer_id, c.body, c.author_id, u.username, c.created_at";

pub(crate) fn row_to_answer(row: &libsql::Row) -> Result<Answer, DatabaseError> {
    Ok(Answer {
        id: row.get::<i64>(0)?,
        question_id: row.get::<i64>(1)?,
        body: row.get::<String>(2)?,
        author_id: row.get::<i64>(3)?,
        author: row.get::<String>(4)?,
        vote_score: row.get::<i64>(5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

pub(crate) fn row_to_comment(row: &libsql::Row) -> Result<Comment, DatabaseError> {
    Ok(Comment {
        id: row.get::<i64>(0)?,
        answer_id: row.get::<i64>(1)?,
        body: row.get::<String>(2)?,
        author_id: row.get::<i64>(3)?,
        author: row.get::<String>(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

async fn find_answer(conn: &libsql::Connection, id: i64) -> Result<Option<Answer>, DatabaseError> {
    let sql = format!(
        "SELECT {ANSWER_COLUMNS} FROM answers a JOIN users u ON u.id = a.author_id WHERE a.id = ?1"
    );
    let mut rows = conn.query(&sql, [id]).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_answer(&row)?)),
        None => Ok(None),
    }
}

async fn find_comment(
    conn: &libsql::Connection,
    id: i64,
) -> Result<Option<Comment>, DatabaseError> {
    let sql = format!(
        "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id WHERE c.id = ?1"
    );
    let mut rows = conn.query(&sql, [id]).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_comment(&row)?)),
        None => Ok(None),
    }
}

async fn row_exists(conn: &libsql::Connection, table: &str, id: i64) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT 1 FROM {table} WHERE id = ?1"), [id])
        .await?;
    Ok(rows.next().await?.is_some())
}

/// Insert `sql` (which must end in `RETURNING id`) and return the new row id.
async fn insert_returning_id(
    conn: &libsql::Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<i64, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<i64>(0)?)
}

async fn insert_answer(
    conn: &libsql::Connection,
    question_id: i64,
    text: &PostText,
    author_id: i64,
) -> Result<Answer, DatabaseError> {
    if !row_exists(conn, "questions", question_id).await? {
        return Err(DatabaseError::not_found("question", question_id));
    }
    if !row_exists(conn, "users", author_id).await? {
        return Err(DatabaseError::not_found("user", author_id));
    }
    let id = insert_returning_id(
        conn,
        "INSERT INTO answers (question_id, body, author_id, vote_score, created_at)
         VALUES (?1, ?2, ?3, 0, ?4) RETURNING id",
        libsql::params![question_id, text.as_str(), author_id, Utc::now().to_rfc3339()],
    )
    .await?;
    find_answer(conn, id).await?.ok_or(DatabaseError::NoResult)
}

async fn insert_comment(
    conn: &libsql::Connection,
    answer_id: i64,
    text: &PostText,
    author_id: i64,
) -> Result<Comment, DatabaseError> {
    if !row_exists(conn, "answers", answer_id).await? {
        return Err(DatabaseError::not_found("answer", answer_id));
    }
    if !row_exists(conn, "users", author_id).await? {
        return Err(DatabaseError::not_found("user", author_id));
    }
    let id = insert_returning_id(
        conn,
        "INSERT INTO comments (answer_id, body, author_id, created_at)
         VALUES (?1, ?2, ?3, ?4) RETURNING id",
        libsql::params![answer_id, text.as_str(), author_id, Utc::now().to_rfc3339()],
    )
    .await?;
    find_comment(conn, id).await?.ok_or(DatabaseError::NoResult)
}

async fn insert_reply(
    conn: &libsql::Connection,
    text: &PostText,
    parent: ReplyParent,
    author_id: i64,
) -> Result<Reply, DatabaseError> {
    match parent {
        ReplyParent::Answer(answer_id) => insert_comment(conn, answer_id, text, author_id)
            .await
            .map(Reply::Comment),
        ReplyParent::Question(question_id) => insert_answer(conn, question_id, text, author_id)
            .await
            .map(Reply::Answer),
    }
}

impl ForumService {
    /// Save a reply under `parent`: a comment under an answer, or an answer
    /// under a question. Returns the stored row for single-item rendering.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the parent (or author) does not
    /// exist; no row is written in that case.
    pub async fn save_text_help(
        &self,
        text: &PostText,
        parent: ReplyParent,
        author_id: i64,
    ) -> Result<Reply, DatabaseError> {
        let tx = self.db().begin_write().await?;
        let result = insert_reply(&tx, text, parent, author_id).await;
        let reply = tx.finish(result).await?;
        info!(
            kind = %parent.kind(),
            parent_id = parent.id(),
            reply_id = reply.id(),
            author_id,
            "reply saved"
        );
        Ok(reply)
    }

    /// Answer a question. Same rules as [`save_text_help`](Self::save_text_help)
    /// with a question parent.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the question does not exist.
    pub async fn create_answer(
        &self,
        question_id: i64,
        author_id: i64,
        text: &PostText,
    ) -> Result<Answer, DatabaseError> {
        let tx = self.db().begin_write().await?;
        let result = insert_answer(&tx, question_id, text, author_id).await;
        let answer = tx.finish(result).await?;
        info!(question_id, answer_id = answer.id, author_id, "answer created");
        Ok(answer)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no answer has this id.
    pub async fn get_answer(&self, id: i64) -> Result<Answer, DatabaseError> {
        let read = self.db().read().await?;
        find_answer(&read, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("answer", id))
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no comment has this id.
    pub async fn get_comment(&self, id: i64) -> Result<Comment, DatabaseError> {
        let read = self.db().read().await?;
        find_comment(&read, id)
            .await?
            .ok_or_else(|| DatabaseError::not_found("comment", id))
    }
}

//! Question repository: ask, list with search and pagination, detail view.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};

use forum_core::entities::{Comment, Question};
use forum_core::input::NewQuestion;
use forum_core::responses::{AnswerThread, Page, QuestionDetail, QuestionSummary};

use crate::error::DatabaseError;
use crate::helpers::{count_from_row, parse_datetime, query_count};
use crate::repos::reply::{ANSWER_COLUMNS, COMMENT_COLUMNS, row_to_answer, row_to_comment};
use crate::repos::user::find_user;
use crate::service::ForumService;

pub(crate) const QUESTION_COLUMNS: &str =
    "q.id, q.title, q.body, q.tags, q.author_id, u.username, q.vote_score, q.created_at";

/// Correlated subquery annotating each question row with its answer count.
const ANSWER_COUNT: &str = "(SELECT COUNT(*) FROM answers a WHERE a.question_id = q.id)";

/// Matches every title when `?1` is NULL, otherwise a case-insensitive substring.
const TITLE_FILTER: &str = "(?1 IS NULL OR instr(lower(q.title), lower(?1)) > 0)";

pub(crate) fn row_to_question(row: &libsql::Row) -> Result<Question, DatabaseError> {
    Ok(Question {
        id: row.get::<i64>(0)?,
        title: row.get::<String>(1)?,
        body: row.get::<String>(2)?,
        tags: row.get::<String>(3)?,
        author_id: row.get::<i64>(4)?,
        author: row.get::<String>(5)?,
        vote_score: row.get::<i64>(6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn row_to_summary(row: &libsql::Row) -> Result<QuestionSummary, DatabaseError> {
    Ok(QuestionSummary {
        question: row_to_question(row)?,
        answer_count: count_from_row(row, 8)?,
    })
}

pub(crate) async fn find_question(
    conn: &libsql::Connection,
    id: i64,
) -> Result<Option<QuestionSummary>, DatabaseError> {
    let sql = format!(
        "SELECT {QUESTION_COLUMNS}, {ANSWER_COUNT}
         FROM questions q JOIN users u ON u.id = q.author_id
         WHERE q.id = ?1"
    );
    let mut rows = conn.query(&sql, [id]).await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_summary(&row)?)),
        None => Ok(None),
    }
}

async fn insert_question(
    conn: &libsql::Connection,
    author_id: i64,
    new: &NewQuestion,
) -> Result<QuestionSummary, DatabaseError> {
    if find_user(conn, author_id).await?.is_none() {
        return Err(DatabaseError::not_found("user", author_id));
    }
    let mut rows = conn
        .query(
            "INSERT INTO questions (title, body, tags, author_id, vote_score, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5) RETURNING id",
            libsql::params![
                new.title.as_str(),
                new.body.as_str(),
                new.tags.as_str(),
                author_id,
                Utc::now().to_rfc3339()
            ],
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    let id = row.get::<i64>(0)?;
    find_question(conn, id).await?.ok_or(DatabaseError::NoResult)
}

/// Empty and whitespace-only search text means "no filter".
fn normalize_search(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

async fn load_page(
    conn: &libsql::Connection,
    search: Option<&str>,
    page: u32,
    page_size: u32,
) -> Result<Page<QuestionSummary>, DatabaseError> {
    let total = query_count(
        conn,
        &format!("SELECT COUNT(*) FROM questions q WHERE {TITLE_FILTER}"),
        libsql::params![search],
    )
    .await?;
    let num_pages = Page::<QuestionSummary>::count_pages(total, page_size);
    if page == 0 || page > num_pages {
        return Err(DatabaseError::not_found("page", page));
    }

    let offset = i64::from(page - 1) * i64::from(page_size);
    let sql = format!(
        "SELECT {QUESTION_COLUMNS}, {ANSWER_COUNT}
         FROM questions q JOIN users u ON u.id = q.author_id
         WHERE {TITLE_FILTER}
         ORDER BY q.id DESC
         LIMIT ?2 OFFSET ?3"
    );
    let mut rows = conn
        .query(&sql, libsql::params![search, i64::from(page_size), offset])
        .await?;

    let mut items = Vec::new();
    while let Some(row) = rows.next().await? {
        items.push(row_to_summary(&row)?);
    }
    Ok(Page::new(items, page, page_size, total))
}

async fn load_detail(conn: &libsql::Connection, id: i64) -> Result<QuestionDetail, DatabaseError> {
    let summary = find_question(conn, id)
        .await?
        .ok_or_else(|| DatabaseError::not_found("question", id))?;

    let sql = format!(
        "SELECT {ANSWER_COLUMNS}
         FROM answers a JOIN users u ON u.id = a.author_id
         WHERE a.question_id = ?1
         ORDER BY a.vote_score DESC, a.id ASC"
    );
    let mut rows = conn.query(&sql, [id]).await?;
    let mut answers = Vec::new();
    while let Some(row) = rows.next().await? {
        answers.push(row_to_answer(&row)?);
    }

    let sql = format!(
        "SELECT {COMMENT_COLUMNS}
         FROM comments c
         JOIN answers a ON a.id = c.answer_id
         JOIN users u ON u.id = c.author_id
         WHERE a.question_id = ?1
         ORDER BY c.id ASC"
    );
    let mut rows = conn.query(&sql, [id]).await?;
    let mut comments: HashMap<i64, Vec<Comment>> = HashMap::new();
    while let Some(row) = rows.next().await? {
        let comment = row_to_comment(&row)?;
        comments.entry(comment.answer_id).or_default().push(comment);
    }

    let answers = answers
        .into_iter()
        .map(|answer| AnswerThread {
            comments: comments.remove(&answer.id).unwrap_or_default(),
            answer,
        })
        .collect();

    Ok(QuestionDetail {
        tags: summary.question.tag_list(),
        answer_count: summary.answer_count,
        question: summary.question,
        answers,
    })
}

impl ForumService {
    /// Post a question from a validated ask form.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the author does not exist.
    pub async fn create_question(
        &self,
        author_id: i64,
        new: &NewQuestion,
    ) -> Result<Question, DatabaseError> {
        let tx = self.db().begin_write().await?;
        let result = insert_question(&tx, author_id, new).await;
        let summary = tx.finish(result).await?;
        info!(question_id = summary.question.id, author_id, "question created");
        Ok(summary.question)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no question has this id.
    pub async fn get_question(&self, id: i64) -> Result<Question, DatabaseError> {
        let read = self.db().read().await?;
        find_question(&read, id)
            .await?
            .map(|s| s.question)
            .ok_or_else(|| DatabaseError::not_found("question", id))
    }

    /// One page of questions, newest first, each with its answer count.
    ///
    /// `search` filters by case-insensitive title substring. Page 1 always
    /// exists, even when empty. The count and the page are read from one
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for a page outside `1..=num_pages`.
    pub async fn list_questions(
        &self,
        search: Option<&str>,
        page: u32,
        page_size: u32,
    ) -> Result<Page<QuestionSummary>, DatabaseError> {
        let search = normalize_search(search);
        let read = self.db().read().await?;
        let snapshot = read.transaction().await?;
        let listed = load_page(&snapshot, search, page, page_size.max(1)).await?;
        snapshot.commit().await?;
        debug!(?search, page, total = listed.total, "listed questions");
        Ok(listed)
    }

    /// The question page: question, answer count, tags, and answers by
    /// descending score, each with its comments in posting order.
    ///
    /// All parts come from one read snapshot, so `answer_count` always equals
    /// the number of answers listed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no question has this id.
    pub async fn question_detail(&self, id: i64) -> Result<QuestionDetail, DatabaseError> {
        let read = self.db().read().await?;
        let snapshot = read.transaction().await?;
        let detail = load_detail(&snapshot, id).await?;
        snapshot.commit().await?;
        Ok(detail)
    }

    /// Every question asked by one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn questions_by_author(
        &self,
        author_id: i64,
    ) -> Result<Vec<QuestionSummary>, DatabaseError> {
        let sql = format!(
            "SELECT {QUESTION_COLUMNS}, {ANSWER_COUNT}
             FROM questions q JOIN users u ON u.id = q.author_id
             WHERE q.author_id = ?1
             ORDER BY q.id DESC"
        );
        let read = self.db().read().await?;
        let mut rows = read.query(&sql, [author_id]).await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_summary(&row)?);
        }
        Ok(items)
    }
}

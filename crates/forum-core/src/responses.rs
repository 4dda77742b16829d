//! Response shapes returned by list, detail, and reply operations.
//!
//! These are what the HTTP layer serializes as JSON.

use serde::{Deserialize, Serialize};

use crate::entities::{Answer, Comment, Question, User};

/// One page of a paginated listing. Pages are 1-based.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub num_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` items; an empty listing still has one page.
    #[must_use]
    pub fn count_pages(total: u64, page_size: u32) -> u32 {
        if total == 0 || page_size == 0 {
            return 1;
        }
        u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total: u64) -> Self {
        let num_pages = Self::count_pages(total, page_size);
        Self {
            items,
            page,
            page_size,
            total,
            num_pages,
            has_next: page < num_pages,
            has_previous: page > 1,
        }
    }
}

/// A question annotated with how many answers it has.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionSummary {
    #[serde(flatten)]
    pub question: Question,
    pub answer_count: u64,
}

/// An answer with its comments, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerThread {
    pub answer: Answer,
    pub comments: Vec<Comment>,
}

/// Everything the question page shows. Answers are highest score first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionDetail {
    pub question: Question,
    pub answer_count: u64,
    pub tags: Vec<String>,
    pub answers: Vec<AnswerThread>,
}

/// A freshly saved reply, ready to render as a single-item fragment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Comment(Comment),
    Answer(Answer),
}

impl Reply {
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::Comment(c) => c.id,
            Self::Answer(a) => a.id,
        }
    }
}

/// The caller and the questions they have asked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dashboard {
    pub user: User,
    pub questions: Vec<QuestionSummary>,
}

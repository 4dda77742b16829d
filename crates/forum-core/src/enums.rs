//! Vote targets, vote directions, and reply kinds.
//!
//! All enums use lowercase serialization. The same strings are used in SQL
//! storage and in HTTP form fields, so `as_str()` and `FromStr` are inverses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// VoteTarget
// ---------------------------------------------------------------------------

/// The kind of record a vote is cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteTarget {
    Question,
    Answer,
}

impl VoteTarget {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }

    /// Table holding the target rows and their cached `vote_score`.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Question => "questions",
            Self::Answer => "answers",
        }
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteTarget {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "question" => Ok(Self::Question),
            "answer" => Ok(Self::Answer),
            other => Err(CoreError::validation(
                "vote_type",
                format!("unknown vote target '{other}'"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// VoteDirection
// ---------------------------------------------------------------------------

/// Direction of a vote. Stored as its signed unit (`+1` / `-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Signed contribution of one vote in this direction to a score.
    #[must_use]
    pub const fn unit(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    /// Inverse of [`unit`](Self::unit). Any other value is not a direction.
    #[must_use]
    pub const fn from_unit(unit: i64) -> Option<Self> {
        match unit {
            1 => Some(Self::Up),
            -1 => Some(Self::Down),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(CoreError::validation(
                "vote_to",
                format!("unknown vote direction '{other}'"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// VoteAction
// ---------------------------------------------------------------------------

/// What a single cast did to the caller's vote row.
///
/// ```text
/// none ──cast d──▶ Created(d)
/// d    ──cast d──▶ Removed        (toggle-off)
/// d    ──cast d'─▶ Switched(d')   (score moves by 2 × unit(d'))
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteAction {
    Created,
    Removed,
    Switched,
}

impl VoteAction {
    /// Decide the action and the score delta for casting `cast` when the
    /// caller's current vote is `existing`.
    #[must_use]
    pub const fn resolve(existing: Option<VoteDirection>, cast: VoteDirection) -> (Self, i64) {
        match existing {
            None => (Self::Created, cast.unit()),
            Some(prior) if prior.unit() == cast.unit() => (Self::Removed, -prior.unit()),
            Some(_) => (Self::Switched, 2 * cast.unit()),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Removed => "removed",
            Self::Switched => "switched",
        }
    }
}

impl fmt::Display for VoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReplyKind / ReplyParent
// ---------------------------------------------------------------------------

/// The two kinds of text reply a user can post under existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// A comment under an answer.
    Comment,
    /// An answer under a question.
    Answer,
}

impl ReplyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Answer => "answer",
        }
    }
}

impl fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplyKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(Self::Comment),
            "answer" => Ok(Self::Answer),
            other => Err(CoreError::validation(
                "type",
                format!("unknown reply type '{other}'"),
            )),
        }
    }
}

/// Where a reply is attached. The variant fixes which table the id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyParent {
    /// Answer id; the reply is a comment.
    Answer(i64),
    /// Question id; the reply is an answer.
    Question(i64),
}

impl ReplyParent {
    #[must_use]
    pub const fn new(kind: ReplyKind, parent_id: i64) -> Self {
        match kind {
            ReplyKind::Comment => Self::Answer(parent_id),
            ReplyKind::Answer => Self::Question(parent_id),
        }
    }

    /// Kind of reply created under this parent.
    #[must_use]
    pub const fn kind(self) -> ReplyKind {
        match self {
            Self::Answer(_) => ReplyKind::Comment,
            Self::Question(_) => ReplyKind::Answer,
        }
    }

    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::Answer(id) | Self::Question(id) => id,
        }
    }
}

//! Validated user input.
//!
//! Every free-text field is trimmed and checked here, so services only ever
//! receive values that already satisfy their constraints. Each failure is a
//! `CoreError::Validation` naming the form field it came from.

use std::fmt;

use serde::Serialize;

use crate::errors::CoreError;

pub const MAX_BODY_CHARS: usize = 10_000;
pub const MAX_TITLE_CHARS: usize = 255;
pub const MAX_TAGS_CHARS: usize = 255;
pub const MAX_USERNAME_CHARS: usize = 150;
pub const MIN_PASSWORD_CHARS: usize = 8;

fn trimmed_bounded(field: &str, raw: &str, max: usize) -> Result<String, CoreError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(CoreError::validation(field, "This field is required."));
    }
    if text.chars().count() > max {
        return Err(CoreError::validation(
            field,
            format!("Ensure this value has at most {max} characters."),
        ));
    }
    Ok(text.to_string())
}

/// Body text of a question, answer, or comment: trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PostText(String);

impl PostText {
    /// Validate `raw` as the content of form field `field`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the trimmed text is empty or longer
    /// than [`MAX_BODY_CHARS`].
    pub fn parse(field: &str, raw: &str) -> Result<Self, CoreError> {
        trimmed_bounded(field, raw, MAX_BODY_CHARS).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalise comma-separated tags: each tag trimmed, empties dropped.
fn normalize_tags(raw: &str) -> Result<String, CoreError> {
    let tags = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    if tags.chars().count() > MAX_TAGS_CHARS {
        return Err(CoreError::validation(
            "tags",
            format!("Ensure this value has at most {MAX_TAGS_CHARS} characters."),
        ));
    }
    Ok(tags)
}

/// A question submitted through the ask form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub title: String,
    pub body: PostText,
    pub tags: String,
}

impl NewQuestion {
    /// # Errors
    ///
    /// Returns the first `CoreError::Validation` among title, body, and tags.
    pub fn parse(title: &str, body: &str, tags: &str) -> Result<Self, CoreError> {
        Ok(Self {
            title: trimmed_bounded("title", title, MAX_TITLE_CHARS)?,
            body: PostText::parse("body", body)?,
            tags: normalize_tags(tags)?,
        })
    }
}

/// A registration form: username plus password typed twice.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

impl Registration {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a malformed username, a short
    /// password, or a confirmation that does not match.
    pub fn parse(username: &str, password1: &str, password2: &str) -> Result<Self, CoreError> {
        let username = trimmed_bounded("username", username, MAX_USERNAME_CHARS)?;
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@.+-_".contains(c))
        {
            return Err(CoreError::validation(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            ));
        }
        if password1.chars().count() < MIN_PASSWORD_CHARS {
            return Err(CoreError::validation(
                "password1",
                format!("This password is too short. It must contain at least {MIN_PASSWORD_CHARS} characters."),
            ));
        }
        if password1 != password2 {
            return Err(CoreError::validation(
                "password2",
                "The two password fields didn't match.",
            ));
        }
        Ok(Self {
            username,
            password: password1.to_string(),
        })
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

use axum::{Form, Json, extract::State, http::StatusCode};
use forum_core::enums::{ReplyKind, ReplyParent};
use forum_core::input::PostText;
use forum_core::responses::Reply;
use serde::Deserialize;

use super::form_id;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// `type` is `comment` (the `id` is an answer) or `answer` (the `id` is a
/// question).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReplyForm {
    text: String,
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

impl ReplyForm {
    fn parse(&self) -> Result<(PostText, ReplyParent), AppError> {
        let text = PostText::parse("text", &self.text)?;
        let kind: ReplyKind = self.kind.trim().parse()?;
        let parent_id = form_id("id", &self.id)?;
        Ok((text, ReplyParent::new(kind, parent_id)))
    }
}

pub async fn answer_or_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ReplyForm>,
) -> Result<(StatusCode, Json<Reply>), AppError> {
    let (text, parent) = form.parse()?;
    let reply = state.forum.save_text_help(&text, parent, user.id).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

use axum::{Form, Json, extract::State};
use forum_core::enums::{VoteDirection, VoteTarget};
use serde::{Deserialize, Serialize};

use super::form_id;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// `vote_to` is the direction (`up`/`down`), `vote_type` the target kind
/// (`question`/`answer`).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VoteForm {
    id: String,
    vote_to: String,
    vote_type: String,
}

/// The target's score after the vote, under the key existing clients read.
#[derive(Debug, Serialize)]
pub struct VoteResult {
    #[serde(rename = "bool")]
    score: i64,
}

pub async fn vote(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<VoteForm>,
) -> Result<Json<VoteResult>, AppError> {
    let target_id = form_id("id", &form.id)?;
    let direction: VoteDirection = form.vote_to.trim().parse()?;
    let target: VoteTarget = form.vote_type.trim().parse()?;

    let score = state
        .forum
        .cast_vote(target, target_id, user.id, direction)
        .await?;
    Ok(Json(VoteResult { score }))
}

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use forum_core::entities::{Answer, Question};
use forum_core::input::{NewQuestion, PostText};
use forum_core::responses::{Page, QuestionDetail, QuestionSummary};
use serde::Deserialize;

use super::path_id;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    q: Option<String>,
    page: Option<String>,
}

/// Requested page: a number, `last`, or absent for the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageRequest {
    Number(u32),
    Last,
}

impl PageRequest {
    fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::Number(1)),
            Some("last") => Ok(Self::Last),
            Some(n) => n
                .parse()
                .map(Self::Number)
                .map_err(|_| AppError::NotFound(format!("page {n}"))),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<QuestionSummary>>, AppError> {
    let search = params.q.as_deref();
    let page_size = state.page_size();

    let page = match PageRequest::parse(params.page.as_deref())? {
        PageRequest::Number(n) => state.forum.list_questions(search, n, page_size).await?,
        PageRequest::Last => {
            let first = state.forum.list_questions(search, 1, page_size).await?;
            if first.num_pages == 1 {
                first
            } else {
                state
                    .forum
                    .list_questions(search, first.num_pages, page_size)
                    .await?
            }
        }
    };
    Ok(Json(page))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QuestionDetail>, AppError> {
    let id = path_id(&id)?;
    Ok(Json(state.forum.question_detail(id).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AskForm {
    title: String,
    body: String,
    tags: String,
}

pub async fn ask(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<AskForm>,
) -> Result<(StatusCode, Json<Question>), AppError> {
    let new = NewQuestion::parse(&form.title, &form.body, &form.tags)?;
    let question = state.forum.create_question(user.id, &new).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnswerForm {
    body: String,
}

pub async fn answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<AnswerForm>,
) -> Result<(StatusCode, Json<Answer>), AppError> {
    let question_id = path_id(&id)?;
    let body = PostText::parse("body", &form.body)?;
    let answer = state.forum.create_answer(question_id, user.id, &body).await?;
    Ok((StatusCode::CREATED, Json(answer)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, PageRequest::Number(1))]
    #[case(Some(""), PageRequest::Number(1))]
    #[case(Some("3"), PageRequest::Number(3))]
    #[case(Some("last"), PageRequest::Last)]
    fn page_requests(#[case] raw: Option<&str>, #[case] expected: PageRequest) {
        assert_eq!(PageRequest::parse(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("two")]
    #[case("-1")]
    fn bad_page_is_not_found(#[case] raw: &str) {
        assert!(matches!(PageRequest::parse(Some(raw)), Err(AppError::NotFound(_))));
    }
}

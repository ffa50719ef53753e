use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUserId;
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::core::state::AppState;
use crate::db::models::QuizResult;
use crate::repositories::results::PageRequest;
use crate::schemas::result::{
    QuestionStatistics, QuizAttemptRequest, QuizStatistics, ResultSummary, ResultView,
    UserStatistics,
};


pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit_attempt))
        .route("/me", get(list_my_results))
        .route("/:result_id", get(get_result))
        .route("/user/:user_id", get(list_user_results))
        .route("/user/:user_id/stats", get(user_statistics))
        .route("/quiz/:quiz_id", get(list_quiz_results))
        .route("/quiz/:quiz_id/stats", get(quiz_statistics))
        .route("/questions/:question_id/stats", get(question_statistics))
}

async fn submit_attempt(
    CurrentUserId(user_id): CurrentUserId,
    State(state): State<AppState>,
    Json(payload): Json<QuizAttemptRequest>,
) -> Result<(StatusCode, Json<ResultView>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let submission = payload.into_submission(user_id)?;
    let view = state.results().submit(submission).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_result(
    State(state): State<AppState>,
    Path(result_id): Path<i64>,
) -> Result<Json<ResultView>, ApiError> {
    Ok(Json(state.results().get_result(result_id).await?))
}

async fn list_my_results(
    CurrentUserId(user_id): CurrentUserId,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<ResultSummary>>, ApiError> {
    let page = query.page();
    let (items, total) = state.results().user_results(user_id, page).await?;
    Ok(Json(summaries(items, total, page)))
}

async fn list_user_results(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<ResultSummary>>, ApiError> {
    let page = query.page();
    let (items, total) = state.results().user_results(user_id, page).await?;
    Ok(Json(summaries(items, total, page)))
}

async fn list_quiz_results(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<ResultSummary>>, ApiError> {
    let page = query.page();
    let (items, total) = state.results().quiz_results(quiz_id, page).await?;
    Ok(Json(summaries(items, total, page)))
}

async fn quiz_statistics(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
) -> Result<Json<QuizStatistics>, ApiError> {
    Ok(Json(state.results().quiz_statistics(quiz_id).await?))
}

async fn user_statistics(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserStatistics>, ApiError> {
    Ok(Json(state.results().user_statistics(user_id).await?))
}

async fn question_statistics(
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<Json<QuestionStatistics>, ApiError> {
    Ok(Json(state.results().question_statistics(question_id).await?))
}

fn summaries(
    items: Vec<QuizResult>,
    total: i64,
    page: PageRequest,
) -> PaginatedResponse<ResultSummary> {
    PaginatedResponse::new(items.into_iter().map(ResultSummary::from).collect(), total, page)
}

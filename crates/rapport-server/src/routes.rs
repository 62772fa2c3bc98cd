use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};

use rapport_core::model::RaterStats;
use rapport_core::EvaluationError;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::wire::{
    CriterionDto, ReceiptDto, SubjectQuery, SubmissionBody, SubmitQuery, SummaryDto,
    SummaryItemDto, TaskPageDto, TasksQuery,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Routes under `/evaluations`.
pub fn evaluation_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks/", get(tasks_handler))
        .route("/evaluations/", post(submit_handler))
        .route("/summary/", get(legacy_summary_handler))
        .route("/summary-v2/", get(summary_handler))
        .route("/criteria/", get(criteria_handler))
        .route("/rater-stats/", get(rater_stats_handler))
}

pub async fn tasks_handler(
    State(state): State<AppState>,
    CurrentUser(rater): CurrentUser,
    query: Result<Query<TasksQuery>, QueryRejection>,
) -> ApiResult<TaskPageDto> {
    let Query(query) = query?;
    let page = state.service.tasks(rater, query.offset).await?;
    Ok(Json(page.into()))
}

pub async fn submit_handler(
    State(state): State<AppState>,
    CurrentUser(rater): CurrentUser,
    query: Result<Query<SubmitQuery>, QueryRejection>,
    body: Result<Json<SubmissionBody>, JsonRejection>,
) -> ApiResult<ReceiptDto> {
    let Query(query) = query?;
    let Json(body) = body?;
    let submission = body.into_submission(query)?;
    let receipt = state.service.submit(rater, submission).await?;
    Ok(Json(receipt.into()))
}

pub async fn legacy_summary_handler(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
    query: Result<Query<SubjectQuery>, QueryRejection>,
) -> ApiResult<Vec<SummaryItemDto>> {
    let Query(query) = query?;
    let items = state.service.legacy_summary(query.subject_id).await?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

pub async fn summary_handler(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    query: Result<Query<SubjectQuery>, QueryRejection>,
) -> ApiResult<SummaryDto> {
    let Query(query) = query?;
    let summary = state.service.summary(viewer, query.subject_id).await?;
    Ok(Json(summary.into()))
}

pub async fn criteria_handler(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> ApiResult<Vec<CriterionDto>> {
    let criteria = state.service.criteria().await?;
    Ok(Json(criteria.into_iter().map(Into::into).collect()))
}

pub async fn rater_stats_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<RaterStats> {
    let stats = state
        .service
        .rater_stats(user)
        .await?
        .ok_or(EvaluationError::NotFound {
            kind: "rater stats",
            id: user,
        })?;
    Ok(Json(stats))
}

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    LeaderboardService,
    dto::score::{MessageResponse, RankedScore, SubmitScoreRequest},
};

use crate::error::WebResult;

#[utoipa::path(
    get,
    path = "/api/scores",
    responses(
        (status = 200, description = "Best score per nickname, highest first, at most 10 entries", body = Vec<RankedScore>),
        (status = 500, description = "Failed to fetch scores")
    ),
    tag = "scores"
)]
pub async fn list_scores(State(service): State<LeaderboardService>) -> WebResult<Response> {
    let scores = service.list_top_scores().await?;

    Ok(Json(scores).into_response())
}

#[utoipa::path(
    post,
    path = "/api/score",
    request_body = SubmitScoreRequest,
    responses(
        (status = 201, description = "Score saved", body = MessageResponse),
        (status = 400, description = "Invalid data format"),
        (status = 500, description = "Failed to save score")
    ),
    tag = "scores"
)]
pub async fn submit_score(
    State(service): State<LeaderboardService>,
    payload: Result<Json<SubmitScoreRequest>, JsonRejection>,
) -> WebResult<Response> {
    let Json(req) = payload?;

    let entry = service.submit_score(&req).await?;
    tracing::info!(
        id = entry.id,
        nickname = %entry.nickname,
        score = entry.score,
        "Saved score"
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Score saved successfully.")),
    )
        .into_response())
}

#[utoipa::path(
    delete,
    path = "/api/score/{nickname}",
    params(
        ("nickname" = String, Path, description = "Exact, case-sensitive nickname")
    ),
    responses(
        (status = 200, description = "Every score of the nickname deleted", body = MessageResponse),
        (status = 404, description = "No scores found for the nickname"),
        (status = 500, description = "Failed to delete scores")
    ),
    tag = "scores"
)]
pub async fn delete_scores(
    State(service): State<LeaderboardService>,
    Path(nickname): Path<String>,
) -> WebResult<Response> {
    let result = service.delete_scores_by_nickname(&nickname).await?;
    tracing::info!(nickname = %nickname, deleted = result.deleted, "Deleted scores");

    Ok(Json(MessageResponse::new(format!(
        "Scores for nickname '{nickname}' deleted successfully."
    )))
    .into_response())
}

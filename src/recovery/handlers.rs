use axum::{
    extract::State,
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        MessageResponse, ResetRequest, SetQuestionsRequest, StartRequest, StartResponse,
        VerifyRequest, VerifyResponse,
    },
    services,
};
use crate::{auth::extractors::AuthUser, error::ApiResult, state::AppState};

pub fn recovery_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile/security-questions", put(set_questions))
        .route("/api/recover/start", post(start))
        .route("/api/recover/verify", post(verify))
        .route("/api/recover/reset", post(reset))
}

#[instrument(skip(state, payload))]
pub async fn set_questions(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
    Json(payload): Json<SetQuestionsRequest>,
) -> ApiResult<StatusCode> {
    services::set_questions(&state, customer_id, &payload.answers).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn start(
    State(state): State<AppState>,
    Json(payload): Json<StartRequest>,
) -> ApiResult<Json<StartResponse>> {
    Ok(Json(services::start(&state, &payload.id).await?))
}

#[instrument(skip(state, payload))]
pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> ApiResult<Json<VerifyResponse>> {
    let recovery_token = services::verify(&state, &payload).await?;
    Ok(Json(VerifyResponse { recovery_token }))
}

#[instrument(skip(state, payload))]
pub async fn reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> ApiResult<Json<MessageResponse>> {
    services::reset(&state, &payload).await?;
    Ok(Json(MessageResponse {
        message: "password changed",
    }))
}

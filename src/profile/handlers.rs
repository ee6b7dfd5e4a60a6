use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        AccountView, BodyRecordView, BodySetupRequest, ChangePasswordRequest, GoalView,
        MessageResponse, ProfileView, UpdateAccountRequest, UpdateProfileRequest,
    },
    repo_types::RankingRow,
    services,
};
use crate::{auth::extractors::AuthUser, error::ApiResult, state::AppState};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/body", get(get_profile).post(setup_body))
        .route("/api/body/history", get(body_history))
        .route("/api/goal", get(current_goal))
        .route("/api/account/v2/me", get(get_account).put(update_account))
        .route("/api/account/v2/password", put(change_password))
        .route("/ranking", get(ranking))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
) -> ApiResult<Json<ProfileView>> {
    Ok(Json(services::profile(&state, customer_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<StatusCode> {
    services::update_profile(&state, customer_id, &payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn setup_body(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
    Json(payload): Json<BodySetupRequest>,
) -> ApiResult<Json<MessageResponse>> {
    services::setup_body(&state, customer_id, &payload).await?;
    Ok(Json(MessageResponse {
        message: "goal and profile saved",
    }))
}

#[instrument(skip(state))]
pub async fn body_history(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
) -> ApiResult<Json<Vec<BodyRecordView>>> {
    Ok(Json(services::body_history(&state, customer_id).await?))
}

#[instrument(skip(state))]
pub async fn current_goal(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
) -> ApiResult<Json<GoalView>> {
    Ok(Json(services::current_goal(&state, customer_id).await?))
}

#[instrument(skip(state))]
pub async fn get_account(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
) -> ApiResult<Json<AccountView>> {
    Ok(Json(services::account(&state, customer_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_account(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
    Json(payload): Json<UpdateAccountRequest>,
) -> ApiResult<Json<AccountView>> {
    Ok(Json(services::update_account(&state, customer_id, &payload).await?))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    services::change_password(&state, customer_id, &payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn ranking(State(state): State<AppState>) -> ApiResult<Json<Vec<RankingRow>>> {
    Ok(Json(services::ranking(&state).await?))
}

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::instrument;

use super::{
    dto::{RecordRequest, RecordView},
    services,
};
use crate::{auth::extractors::AuthUser, error::ApiResult, state::AppState};

pub fn records_routes() -> Router<AppState> {
    Router::new().route("/api/records", get(history).post(create))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
    Json(payload): Json<RecordRequest>,
) -> ApiResult<(StatusCode, Json<RecordView>)> {
    let record = services::create(&state, customer_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
) -> ApiResult<Json<Vec<RecordView>>> {
    Ok(Json(services::history(&state, customer_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn records_require_a_token() {
        let app = records_routes().with_state(AppState::fake());
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/records")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"caloriesM":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

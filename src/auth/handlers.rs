use axum::{
    extract::{FromRef, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, SignupRequest, SignupResponse},
        extractors::BearerSession,
        jwt::JwtKeys,
        services,
    },
    error::ApiResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<(StatusCode, HeaderMap, Json<SignupResponse>)> {
    let (customer, access_token) = services::signup(&state, payload).await?;
    let expires_in = JwtKeys::from_ref(&state).access_ttl.as_secs();

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/users/{}", customer.login_id)) {
        headers.insert(header::LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(SignupResponse {
            gender: customer.gender(),
            id: customer.login_id,
            weight: customer.weight,
            age: customer.age,
            height: customer.height,
            access_token,
            token_type: "Bearer",
            expires_in,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (customer, token) = services::login(&state, payload).await?;
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        id: customer.login_id,
    }))
}

#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: BearerSession) -> ApiResult<StatusCode> {
    services::logout(&state, &session).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn logout_without_token_is_401() {
        let app = auth_routes().with_state(AppState::fake());
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["error"]["code"], "MISSING_TOKEN");
    }

    #[tokio::test]
    async fn signup_rejects_short_password_before_db() {
        let app = auth_routes().with_state(AppState::fake());
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"id":"runner@example.com","password":"short"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_with_blank_fields_is_401() {
        let app = auth_routes().with_state(AppState::fake());
        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"id":"  ","password":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn signup_response_uses_camel_case() {
        let r = SignupResponse {
            id: "runner".into(),
            weight: Some(70.0),
            age: None,
            gender: None,
            height: None,
            access_token: "t".into(),
            token_type: "Bearer",
            expires_in: 60,
        };
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"accessToken\":\"t\""));
        assert!(json.contains("\"tokenType\":\"Bearer\""));
        assert!(json.contains("\"expiresIn\":60"));
    }
}

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use time::{macros::format_description, Date};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        CalendarResponse, CheckInRequest, FirstLoginResponse, HistoryResponse, MonthQuery,
        StatusResponse,
    },
    engine::{self, YearMonth},
    repo,
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/attendance/status", get(status))
        .route("/api/attendance/checkin", post(check_in))
        .route("/api/attendance/first-login", get(first_login))
        .route("/api/attendance/history", get(history))
        .route("/api/attendance/calendar", get(calendar))
}

pub(crate) fn parse_day(s: &str) -> Option<Date> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]")).ok()
}

fn parse_month(s: &str) -> ApiResult<YearMonth> {
    YearMonth::parse(s).ok_or_else(|| ApiError::validation("month must be YYYY-MM"))
}

async fn load_status(state: &AppState, customer_id: Uuid) -> ApiResult<StatusResponse> {
    let today = state.today();
    let days = repo::load_dates(&state.db, customer_id).await?;
    let fallback = repo::first_body_record(&state.db, customer_id)
        .await?
        .unwrap_or(today);
    Ok(engine::summarize(&days, today, fallback).into())
}

#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
) -> ApiResult<Json<StatusResponse>> {
    Ok(Json(load_status(&state, customer_id).await?))
}

/// Idempotent: checking in twice for the same day changes nothing.
#[instrument(skip(state, body))]
pub async fn check_in(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
    body: Option<Json<CheckInRequest>>,
) -> ApiResult<Json<StatusResponse>> {
    let today = state.today();
    let requested = body.and_then(|Json(b)| b.date).filter(|s| !s.trim().is_empty());
    let day = match requested {
        Some(raw) => parse_day(&raw).ok_or_else(|| ApiError::validation("date must be YYYY-MM-DD"))?,
        None => today,
    };
    if day > today {
        return Err(ApiError::validation("cannot check in for a future date"));
    }

    let inserted = repo::check_in(&state.db, customer_id, day).await?;
    info!(%customer_id, %day, inserted, "attendance check-in");

    Ok(Json(load_status(&state, customer_id).await?))
}

#[instrument(skip(state))]
pub async fn first_login(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
) -> ApiResult<Json<FirstLoginResponse>> {
    let first = match repo::first_checkin(&state.db, customer_id).await? {
        Some(d) => d,
        None => repo::first_body_record(&state.db, customer_id)
            .await?
            .unwrap_or_else(|| state.today()),
    };
    Ok(Json(FirstLoginResponse {
        first_date: first.to_string(),
    }))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
    Query(q): Query<MonthQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let month = parse_month(&q.month)?;
    let dates = repo::dates_between(&state.db, customer_id, month.first_day(), month.last_day()).await?;
    Ok(Json(HistoryResponse {
        dates: dates.iter().map(Date::to_string).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn calendar(
    State(state): State<AppState>,
    AuthUser(customer_id): AuthUser,
    Query(q): Query<MonthQuery>,
) -> ApiResult<Json<CalendarResponse>> {
    let month = parse_month(&q.month)?;
    let dates = repo::dates_between(&state.db, customer_id, month.first_day(), month.last_day()).await?;
    let mut days: Vec<u8> = dates.iter().map(|d| d.day()).collect();
    days.sort_unstable();
    Ok(Json(CalendarResponse { days }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use time::macros::date;
    use tower::ServiceExt;

    #[test]
    fn parse_day_accepts_iso_dates_only() {
        assert_eq!(parse_day("2024-05-10"), Some(date!(2024 - 05 - 10)));
        assert_eq!(parse_day(" 2024-05-10 "), Some(date!(2024 - 05 - 10)));
        assert_eq!(parse_day("2024-02-30"), None);
        assert_eq!(parse_day("10/05/2024"), None);
    }

    #[test]
    fn parse_month_rejects_garbage() {
        assert!(parse_month("2024-05").is_ok());
        assert!(parse_month("May").is_err());
    }

    #[tokio::test]
    async fn status_requires_token() {
        let app = attendance_routes().with_state(AppState::fake());
        let res = app
            .oneshot(Request::builder().uri("/api/attendance/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}

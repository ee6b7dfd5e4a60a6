use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{FoodItem, SearchQuery},
    services,
};
use crate::{error::ApiResult, state::AppState};

pub fn food_routes() -> Router<AppState> {
    Router::new().route("/api/food/public/search", get(search))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Json<Vec<FoodItem>>> {
    let found = services::search(state.food.as_ref(), &q.name, q.page, q.per_page).await?;
    info!(query = %q.name, results = found.len(), "food search");
    Ok(Json(found.into_iter().map(FoodItem::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::food::client::stub::StubFoodSource;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn returns_ranked_items_in_upstream_field_names() {
        let stub = Arc::new(StubFoodSource::new(
            r#"{"response":{"header":{"resultCode":"00"},"body":{"items":{"item":[{"foodNm":"라면","enerc":"500"}]}}}}"#,
        ));
        let app = food_routes().with_state(AppState::fake_with_food(stub));
        let (status, v) = get_json(app, "/api/food/public/search?name=%EB%9D%BC%EB%A9%B4&perPage=5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v, serde_json::json!([{"foodNm": "라면", "enerc": 500.0}]));
    }

    #[tokio::test]
    async fn missing_name_is_an_empty_list() {
        let stub = Arc::new(StubFoodSource::new("{}"));
        let app = food_routes().with_state(AppState::fake_with_food(stub.clone()));
        let (status, v) = get_json(app, "/api/food/public/search").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v, serde_json::json!([]));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn upstream_failure_is_502() {
        let stub = Arc::new(StubFoodSource::new(
            r#"{"response":{"header":{"resultCode":"99","resultMsg":"LIMITED"}}}"#,
        ));
        let app = food_routes().with_state(AppState::fake_with_food(stub));
        let (status, v) = get_json(app, "/api/food/public/search?name=rice").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(v["error"]["code"], "UPSTREAM_ERROR");
    }
}

use tracing::info;
use uuid::Uuid;

use super::{
    dto::{RecordRequest, RecordView},
    repo_types::{DailyRecord, MealCalories},
};
use crate::{
    error::{ApiError, ApiResult},
    profile::repo_types::Goal,
    state::AppState,
};

/// Missing meals count as zero; negative values are rejected.
pub(crate) fn meal_calories(req: &RecordRequest) -> ApiResult<MealCalories> {
    let check = |name: &str, v: Option<i64>| -> ApiResult<i64> {
        let v = v.unwrap_or(0);
        if v < 0 {
            return Err(ApiError::validation(format!("{name} must not be negative")));
        }
        Ok(v)
    };
    Ok(MealCalories {
        morning: check("caloriesM", req.calories_m)?,
        lunch: check("caloriesL", req.calories_l)?,
        dinner: check("caloriesD", req.calories_d)?,
    })
}

pub async fn create(state: &AppState, customer_id: Uuid, req: &RecordRequest) -> ApiResult<RecordView> {
    let meals = meal_calories(req)?;
    let goal = Goal::latest(&state.db, customer_id).await?;
    let record = DailyRecord::insert(&state.db, customer_id, state.today(), meals, goal.as_ref()).await?;
    info!(%customer_id, record_id = record.id, "daily record saved");
    Ok(record.into())
}

pub async fn history(state: &AppState, customer_id: Uuid) -> ApiResult<Vec<RecordView>> {
    let rows = DailyRecord::list_for(&state.db, customer_id).await?;
    Ok(rows.into_iter().map(RecordView::from).collect())
}

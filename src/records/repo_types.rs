use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Calories eaten per meal on one day, with the targets in force at the time.
#[derive(Debug, Clone, FromRow)]
pub struct DailyRecord {
    pub id: i64,
    pub customer_id: Uuid,
    pub record_date: Date,
    pub calories_m: i64,
    pub calories_l: i64,
    pub calories_d: i64,
    pub target_weight: Option<f64>,
    pub target_calories: Option<i32>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct MealCalories {
    pub morning: i64,
    pub lunch: i64,
    pub dinner: i64,
}

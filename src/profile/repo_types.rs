use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Append-only; the newest row is the customer's current goal.
#[derive(Debug, Clone, FromRow)]
pub struct Goal {
    pub id: i64,
    pub customer_id: Uuid,
    pub target_weight: f64,
    pub target_calories: i32,
    pub record_date: Date,
    pub created_at: OffsetDateTime,
}

/// Point-in-time copy of body attributes and targets.
#[derive(Debug, Clone, FromRow)]
pub struct BodyRecord {
    pub id: i64,
    pub customer_id: Uuid,
    pub target_weight: Option<f64>,
    pub target_calories: Option<i32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub inbody: Option<f64>,
    pub record_date: Date,
}

#[derive(Debug, Clone, Copy)]
pub struct Targets {
    pub weight: f64,
    pub calories: i32,
}

/// Customer joined with the targets of their latest body snapshot.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    #[serde(rename = "id")]
    pub login_id: String,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub target_weight: Option<f64>,
    pub target_calories: Option<i32>,
}

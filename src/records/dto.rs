use serde::{Deserialize, Serialize};

use super::repo_types::DailyRecord;

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    #[serde(rename = "caloriesM")]
    pub calories_m: Option<i64>,
    #[serde(rename = "caloriesL")]
    pub calories_l: Option<i64>,
    #[serde(rename = "caloriesD")]
    pub calories_d: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecordView {
    pub id: i64,
    #[serde(rename = "recordDate")]
    pub record_date: String,
    #[serde(rename = "caloriesM")]
    pub calories_m: i64,
    #[serde(rename = "caloriesL")]
    pub calories_l: i64,
    #[serde(rename = "caloriesD")]
    pub calories_d: i64,
    #[serde(rename = "targetWeight")]
    pub target_weight: Option<f64>,
    #[serde(rename = "targetCalories")]
    pub target_calories: Option<i32>,
}

impl From<DailyRecord> for RecordView {
    fn from(r: DailyRecord) -> Self {
        Self {
            id: r.id,
            record_date: r.record_date.to_string(),
            calories_m: r.calories_m,
            calories_l: r.calories_l,
            calories_d: r.calories_d,
            target_weight: r.target_weight,
            target_calories: r.target_calories,
        }
    }
}

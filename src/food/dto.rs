use serde::{Deserialize, Serialize};

use super::parse::FoodCandidate;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Field names follow the upstream API so clients can share parsing code.
#[derive(Debug, Serialize)]
pub struct FoodItem {
    #[serde(rename = "foodNm")]
    pub food_nm: String,
    pub enerc: Option<f64>,
}

impl From<FoodCandidate> for FoodItem {
    fn from(c: FoodCandidate) -> Self {
        Self {
            food_nm: c.name,
            enerc: c.kcal,
        }
    }
}

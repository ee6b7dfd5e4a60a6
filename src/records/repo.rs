use anyhow::Context;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::repo_types::{DailyRecord, MealCalories};
use crate::profile::repo_types::Goal;

const RECORD_COLUMNS: &str = "id, customer_id, record_date, calories_m, calories_l, calories_d, \
                              target_weight, target_calories, created_at";

impl DailyRecord {
    pub async fn insert(
        db: &PgPool,
        customer_id: Uuid,
        day: Date,
        meals: MealCalories,
        goal: Option<&Goal>,
    ) -> anyhow::Result<DailyRecord> {
        let row = sqlx::query_as::<_, DailyRecord>(&format!(
            r#"
            INSERT INTO daily_records
                (customer_id, record_date, calories_m, calories_l, calories_d, target_weight, target_calories)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(day)
        .bind(meals.morning)
        .bind(meals.lunch)
        .bind(meals.dinner)
        .bind(goal.map(|g| g.target_weight))
        .bind(goal.map(|g| g.target_calories))
        .fetch_one(db)
        .await
        .context("insert daily record")?;
        Ok(row)
    }

    pub async fn list_for(db: &PgPool, customer_id: Uuid) -> anyhow::Result<Vec<DailyRecord>> {
        let rows = sqlx::query_as::<_, DailyRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM daily_records WHERE customer_id = $1 \
             ORDER BY record_date DESC, id DESC"
        ))
        .bind(customer_id)
        .fetch_all(db)
        .await
        .context("list daily records")?;
        Ok(rows)
    }
}

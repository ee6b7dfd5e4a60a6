use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use super::repo_types::{BodyRecord, Goal, RankingRow, Targets};
use crate::auth::repo_types::BodyAttrs;

/// Newest goal by insertion order.
const LATEST_GOAL_SQL: &str = r#"
    SELECT id, customer_id, target_weight, target_calories, record_date, created_at
      FROM goals
     WHERE customer_id = $1
     ORDER BY id DESC
     LIMIT 1
"#;

impl Goal {
    pub async fn latest(db: &PgPool, customer_id: Uuid) -> anyhow::Result<Option<Goal>> {
        let goal = sqlx::query_as::<_, Goal>(LATEST_GOAL_SQL)
            .bind(customer_id)
            .fetch_optional(db)
            .await
            .context("latest goal")?;
        Ok(goal)
    }

    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        customer_id: Uuid,
        targets: Targets,
        day: Date,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO goals (customer_id, target_weight, target_calories, record_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(customer_id)
        .bind(targets.weight)
        .bind(targets.calories)
        .bind(day)
        .execute(&mut **tx)
        .await
        .context("insert goal")?;
        Ok(())
    }
}

impl BodyRecord {
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        customer_id: Uuid,
        attrs: BodyAttrs,
        targets: Targets,
        inbody: Option<f64>,
        day: Date,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO body_records
                (customer_id, target_weight, target_calories, weight, height, age, gender, inbody, record_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(customer_id)
        .bind(targets.weight)
        .bind(targets.calories)
        .bind(attrs.weight)
        .bind(attrs.height)
        .bind(attrs.age)
        .bind(attrs.gender.map(|g| g.as_str()))
        .bind(inbody)
        .bind(day)
        .execute(&mut **tx)
        .await
        .context("insert body record")?;
        Ok(())
    }

    pub async fn history(db: &PgPool, customer_id: Uuid) -> anyhow::Result<Vec<BodyRecord>> {
        let rows = sqlx::query_as::<_, BodyRecord>(
            r#"
            SELECT id, customer_id, target_weight, target_calories, weight, height,
                   age, gender, inbody, record_date
              FROM body_records
             WHERE customer_id = $1
             ORDER BY record_date DESC, id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(db)
        .await
        .context("body history")?;
        Ok(rows)
    }
}

pub async fn ranking(db: &PgPool) -> anyhow::Result<Vec<RankingRow>> {
    let rows = sqlx::query_as::<_, RankingRow>(
        r#"
        SELECT c.login_id, c.weight, c.age, c.gender, c.height,
               b.target_weight, b.target_calories
          FROM customers c
          LEFT JOIN LATERAL (
                SELECT target_weight, target_calories
                  FROM body_records
                 WHERE customer_id = c.id
                 ORDER BY record_date DESC, id DESC
                 LIMIT 1
          ) b ON TRUE
         ORDER BY c.created_at ASC
        "#,
    )
    .fetch_all(db)
    .await
    .context("ranking")?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_goal_orders_by_id_only() {
        let order = LATEST_GOAL_SQL
            .split("ORDER BY")
            .nth(1)
            .map(|rest| rest.split_whitespace().take(2).collect::<Vec<_>>());
        assert_eq!(order, Some(vec!["id", "DESC"]));
        assert!(!LATEST_GOAL_SQL.contains("created_at DESC"));
    }
}

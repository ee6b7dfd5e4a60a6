use anyhow::Context;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::engine::CheckIns;

pub async fn load_dates(db: &PgPool, customer_id: Uuid) -> anyhow::Result<CheckIns> {
    let rows: Vec<(Date,)> =
        sqlx::query_as("SELECT record_date FROM attendance_log WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_all(db)
            .await
            .context("load attendance dates")?;
    Ok(rows.into_iter().map(|(d,)| d).collect())
}

pub async fn dates_between(
    db: &PgPool,
    customer_id: Uuid,
    from: Date,
    to: Date,
) -> anyhow::Result<Vec<Date>> {
    let rows: Vec<(Date,)> = sqlx::query_as(
        r#"
        SELECT record_date
          FROM attendance_log
         WHERE customer_id = $1
           AND record_date BETWEEN $2 AND $3
         ORDER BY record_date
        "#,
    )
    .bind(customer_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await
    .context("load attendance history")?;
    Ok(rows.into_iter().map(|(d,)| d).collect())
}

pub async fn first_checkin(db: &PgPool, customer_id: Uuid) -> anyhow::Result<Option<Date>> {
    let (first,): (Option<Date>,) =
        sqlx::query_as("SELECT MIN(record_date) FROM attendance_log WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(db)
            .await
            .context("first attendance date")?;
    Ok(first)
}

/// Earliest body snapshot, used as the account's start date before any check-in.
pub async fn first_body_record(db: &PgPool, customer_id: Uuid) -> anyhow::Result<Option<Date>> {
    let (first,): (Option<Date>,) =
        sqlx::query_as("SELECT MIN(record_date) FROM body_records WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(db)
            .await
            .context("first body record date")?;
    Ok(first)
}

/// Returns false when the day was already checked in.
pub async fn check_in(db: &PgPool, customer_id: Uuid, day: Date) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        INSERT INTO attendance_log (customer_id, record_date)
        VALUES ($1, $2)
        ON CONFLICT (customer_id, record_date) DO NOTHING
        "#,
    )
    .bind(customer_id)
    .bind(day)
    .execute(db)
    .await
    .context("insert attendance")?;
    Ok(res.rows_affected() == 1)
}

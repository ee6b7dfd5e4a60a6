use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{QuestionCode, SecurityAnswer};

pub async fn upsert_answer_tx(
    tx: &mut Transaction<'_, Postgres>,
    customer_id: Uuid,
    code: QuestionCode,
    answer_hash: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recovery_answers (customer_id, code, answer_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (customer_id, code)
        DO UPDATE SET answer_hash = EXCLUDED.answer_hash, updated_at = now()
        "#,
    )
    .bind(customer_id)
    .bind(code.as_str())
    .bind(answer_hash)
    .execute(&mut **tx)
    .await
    .context("upsert recovery answer")?;
    Ok(())
}

pub async fn list_answers(db: &PgPool, customer_id: Uuid) -> anyhow::Result<Vec<SecurityAnswer>> {
    let rows = sqlx::query_as::<_, SecurityAnswer>(
        r#"
        SELECT customer_id, code, answer_hash, updated_at
          FROM recovery_answers
         WHERE customer_id = $1
         ORDER BY code
        "#,
    )
    .bind(customer_id)
    .fetch_all(db)
    .await
    .context("list recovery answers")?;
    Ok(rows)
}

use anyhow::Context;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

pub async fn is_blacklisted(db: &PgPool, token: &str) -> anyhow::Result<bool> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM blacklisted_tokens WHERE token = $1)")
            .bind(token)
            .fetch_one(db)
            .await
            .context("check token blacklist")?;
    Ok(exists)
}

/// Record a revoked token. Blacklisting the same token twice is a no-op.
pub async fn blacklist(
    db: &PgPool,
    token: &str,
    customer_id: Uuid,
    expires_at: OffsetDateTime,
    reason: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO blacklisted_tokens (token, customer_id, expires_at, reason)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (token) DO NOTHING
        "#,
    )
    .bind(token)
    .bind(customer_id)
    .bind(expires_at)
    .bind(reason)
    .execute(db)
    .await
    .context("insert blacklisted token")?;
    Ok(())
}

/// Delete entries whose token would be rejected on expiry anyway.
pub async fn purge_expired(db: &PgPool) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM blacklisted_tokens WHERE expires_at < now()")
        .execute(db)
        .await
        .context("purge expired blacklisted tokens")?;
    Ok(res.rows_affected())
}

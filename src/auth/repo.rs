use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::auth::repo_types::{BodyAttrs, Customer};

const CUSTOMER_COLUMNS: &str =
    "id, login_id, email, password_hash, weight, age, gender, height, created_at";

impl Customer {
    /// Find a customer by login ID (case-insensitive).
    pub async fn find_by_login_id(db: &PgPool, login_id: &str) -> anyhow::Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE lower(login_id) = lower($1)"
        ))
        .bind(login_id)
        .fetch_optional(db)
        .await
        .context("find customer by login id")?;
        Ok(customer)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find customer by id")?;
        Ok(customer)
    }

    /// Create a new customer with hashed password.
    pub async fn create(
        db: &PgPool,
        login_id: &str,
        password_hash: &str,
        attrs: BodyAttrs,
    ) -> Result<Customer, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (login_id, password_hash, weight, age, gender, height)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(login_id)
        .bind(password_hash)
        .bind(attrs.weight)
        .bind(attrs.age)
        .bind(attrs.gender.map(|g| g.as_str()))
        .bind(attrs.height)
        .fetch_one(db)
        .await
    }

    pub async fn update_core_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        attrs: BodyAttrs,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE customers
               SET weight = $2, age = $3, gender = $4, height = $5
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(attrs.weight)
        .bind(attrs.age)
        .bind(attrs.gender.map(|g| g.as_str()))
        .bind(attrs.height)
        .execute(&mut **tx)
        .await
        .context("update customer core")?;
        Ok(())
    }

    pub async fn update_email_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        email: &str,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE customers SET email = $2 WHERE id = $1")
            .bind(id)
            .bind(email)
            .execute(&mut **tx)
            .await
            .context("update customer email")?;
        Ok(())
    }

    pub async fn update_password(db: &PgPool, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE customers SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await
            .context("update customer password")?;
        Ok(res.rows_affected() == 1)
    }

    pub async fn update_password_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE customers SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&mut **tx)
            .await
            .context("update customer password")?;
        Ok(())
    }

    /// True when another customer already uses this email.
    pub async fn email_in_use_by_other(db: &PgPool, id: Uuid, email: &str) -> anyhow::Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(1)
              FROM customers
             WHERE lower(email) = lower($1)
               AND id <> $2
            "#,
        )
        .bind(email)
        .bind(id)
        .fetch_one(db)
        .await
        .context("count email usage")?;
        Ok(count > 0)
    }
}

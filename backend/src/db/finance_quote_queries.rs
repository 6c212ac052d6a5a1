use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{FinanceQuote, NewFinanceQuote};

const QUOTE_COLUMNS: &str = "id, purchase_price, down_payment, credit_score, financed_amount,
                             monthly_payment, max_approval, created_at";

/// Inserts a quote. Returns `None` when `idempotency_key` already exists.
pub async fn insert(
    pool: &PgPool,
    input: NewFinanceQuote,
    idempotency_key: Option<Uuid>,
) -> Result<Option<FinanceQuote>, sqlx::Error> {
    let sql = format!(
        "INSERT INTO finance_quotes (purchase_price, down_payment, credit_score, financed_amount,
                                     monthly_payment, max_approval, idempotency_key)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (idempotency_key) DO NOTHING
         RETURNING {}",
        QUOTE_COLUMNS
    );
    sqlx::query_as::<_, FinanceQuote>(&sql)
        .bind(input.purchase_price)
        .bind(input.down_payment)
        .bind(input.credit_score.as_str())
        .bind(input.financed_amount)
        .bind(input.monthly_payment)
        .bind(input.max_approval)
        .bind(idempotency_key)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_by_idempotency_key(pool: &PgPool, key: Uuid) -> Result<Option<FinanceQuote>, sqlx::Error> {
    let sql = format!("SELECT {} FROM finance_quotes WHERE idempotency_key = $1", QUOTE_COLUMNS);
    sqlx::query_as::<_, FinanceQuote>(&sql)
        .bind(key)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_one(pool: &PgPool, id: i32) -> Result<Option<FinanceQuote>, sqlx::Error> {
    let sql = format!("SELECT {} FROM finance_quotes WHERE id = $1", QUOTE_COLUMNS);
    sqlx::query_as::<_, FinanceQuote>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

// LIMIT NULL is LIMIT ALL in Postgres.
pub async fn fetch_all(pool: &PgPool, limit: Option<i64>, offset: i64) -> Result<Vec<FinanceQuote>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM finance_quotes
         ORDER BY id ASC
         LIMIT $1 OFFSET $2",
        QUOTE_COLUMNS
    );
    sqlx::query_as::<_, FinanceQuote>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

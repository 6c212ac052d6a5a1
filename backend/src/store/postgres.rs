use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::finance_quote_queries;
use crate::models::{FinanceQuote, NewFinanceQuote};
use crate::store::{Page, QuoteStore, StoreError};

/// PostgreSQL-backed store. Ids come from the `finance_quotes.id` sequence,
/// so concurrent inserts never share one.
#[derive(Clone)]
pub struct PgQuoteStore {
    pool: PgPool,
}

impl PgQuoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        info!("Running finance_quotes migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl QuoteStore for PgQuoteStore {
    async fn create(
        &self,
        quote: NewFinanceQuote,
        idempotency_key: Option<Uuid>,
    ) -> Result<FinanceQuote, StoreError> {
        if let Some(created) = finance_quote_queries::insert(&self.pool, quote, idempotency_key).await? {
            return Ok(created);
        }

        // Only an idempotency conflict makes the insert return no row.
        let key = idempotency_key.ok_or(sqlx::Error::RowNotFound)?;
        debug!("Idempotency key {} already used, returning stored quote", key);
        let existing = finance_quote_queries::fetch_by_idempotency_key(&self.pool, key)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok(existing)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<FinanceQuote>, StoreError> {
        Ok(finance_quote_queries::fetch_one(&self.pool, id).await?)
    }

    async fn list_all(&self, page: Page) -> Result<Vec<FinanceQuote>, StoreError> {
        Ok(finance_quote_queries::fetch_all(&self.pool, page.limit, page.offset).await?)
    }
}

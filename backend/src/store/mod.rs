//! Persistence boundary for finance quotes.
//!
//! Quotes are append-only: the store assigns `id` and `created_at` on
//! creation and offers no update or delete.

mod memory;
mod postgres;

pub use memory::InMemoryQuoteStore;
pub use postgres::PgQuoteStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{FinanceQuote, NewFinanceQuote};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Window over the insertion-ordered quote list. `limit: None` means all rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Page {
    pub const MAX_LIMIT: i64 = 1000;

    pub fn all() -> Self {
        Self::default()
    }
}

#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Persists a quote. A repeated `idempotency_key` returns the quote stored
    /// under that key instead of inserting a second row.
    async fn create(
        &self,
        quote: NewFinanceQuote,
        idempotency_key: Option<Uuid>,
    ) -> Result<FinanceQuote, StoreError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<FinanceQuote>, StoreError>;

    async fn list_all(&self, page: Page) -> Result<Vec<FinanceQuote>, StoreError>;
}

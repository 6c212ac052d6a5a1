use std::collections::HashMap;

use async_trait::async_trait;
use chrono::SubsecRound;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::{FinanceQuote, NewFinanceQuote};
use crate::services::quote_validation::to_money;
use crate::store::{Page, QuoteStore, StoreError};

/// Process-local store with the same contract as [`super::PgQuoteStore`].
///
/// Nothing survives a restart. Used by tests and by `QUOTE_STORE=memory`.
#[derive(Default)]
pub struct InMemoryQuoteStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i32,
    quotes: Vec<FinanceQuote>,
    by_idempotency_key: HashMap<Uuid, i32>,
}

impl InMemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Inner {
    fn find(&self, id: i32) -> Option<&FinanceQuote> {
        // ids are assigned in order, so the vector is sorted by id
        self.quotes
            .binary_search_by_key(&id, |q| q.id)
            .ok()
            .map(|idx| &self.quotes[idx])
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn create(
        &self,
        quote: NewFinanceQuote,
        idempotency_key: Option<Uuid>,
    ) -> Result<FinanceQuote, StoreError> {
        let mut inner = self.inner.lock();

        if let Some(key) = idempotency_key {
            if let Some(existing) = inner.by_idempotency_key.get(&key).and_then(|id| inner.find(*id)) {
                return Ok(existing.clone());
            }
        }

        inner.last_id += 1;
        let id = inner.last_id;

        // Mirror NUMERIC(10,2) and TIMESTAMPTZ precision.
        let quote = NewFinanceQuote {
            purchase_price: to_money(&quote.purchase_price),
            down_payment: to_money(&quote.down_payment),
            financed_amount: to_money(&quote.financed_amount),
            monthly_payment: to_money(&quote.monthly_payment),
            max_approval: to_money(&quote.max_approval),
            ..quote
        };
        let created = FinanceQuote::new(id, quote, chrono::Utc::now().trunc_subsecs(6));

        inner.quotes.push(created.clone());
        if let Some(key) = idempotency_key {
            inner.by_idempotency_key.insert(key, id);
        }
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<FinanceQuote>, StoreError> {
        Ok(self.inner.lock().find(id).cloned())
    }

    async fn list_all(&self, page: Page) -> Result<Vec<FinanceQuote>, StoreError> {
        let inner = self.inner.lock();
        let offset = usize::try_from(page.offset).unwrap_or(0);
        let limit = page
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        Ok(inner.quotes.iter().skip(offset).take(limit).cloned().collect())
    }
}

use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{FinanceQuote, PaginationParams, QuoteInput};
use crate::services::quote_validation;
use crate::store::{Page, QuoteStore};

#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions {
    pub verify_derived_fields: bool,
    pub idempotency_key: Option<Uuid>,
}

pub async fn create(
    store: &dyn QuoteStore,
    input: QuoteInput,
    options: CreateOptions,
) -> Result<FinanceQuote, AppError> {
    let quote = quote_validation::validate_quote_input(input)?;
    if options.verify_derived_fields {
        quote_validation::verify_derived_fields(&quote)?;
    }
    let created = store.create(quote, options.idempotency_key).await?;
    debug!("Stored finance quote {}", created.id);
    Ok(created)
}

pub async fn fetch_one(store: &dyn QuoteStore, id: i32) -> Result<FinanceQuote, AppError> {
    store
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Finance quote not found".to_string()))
}

pub async fn fetch_all(store: &dyn QuoteStore, params: PaginationParams) -> Result<Vec<FinanceQuote>, AppError> {
    let page = to_page(params)?;
    Ok(store.list_all(page).await?)
}

fn to_page(params: PaginationParams) -> Result<Page, AppError> {
    if let Some(limit) = params.limit {
        if !(1..=Page::MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                Page::MAX_LIMIT
            )));
        }
    }
    let offset = params.offset.unwrap_or(0);
    if offset < 0 {
        return Err(AppError::Validation("offset cannot be negative".into()));
    }
    Ok(Page { limit: params.limit, offset })
}

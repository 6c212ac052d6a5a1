use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Credit band the applicant self-reports on the calculator form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CreditTier {
    pub const ALL: [CreditTier; 4] = [
        CreditTier::Excellent,
        CreditTier::Good,
        CreditTier::Fair,
        CreditTier::Poor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CreditTier::Excellent => "excellent",
            CreditTier::Good => "good",
            CreditTier::Fair => "fair",
            CreditTier::Poor => "poor",
        }
    }

    /// Score range shown next to the tier on the form.
    pub fn score_range(&self) -> &'static str {
        match self {
            CreditTier::Excellent => "750+",
            CreditTier::Good => "700-749",
            CreditTier::Fair => "650-699",
            CreditTier::Poor => "Below 650",
        }
    }
}

impl fmt::Display for CreditTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excellent" => Ok(CreditTier::Excellent),
            "good" => Ok(CreditTier::Good),
            "fair" => Ok(CreditTier::Fair),
            "poor" => Ok(CreditTier::Poor),
            other => Err(format!("Unknown credit tier: {}", other)),
        }
    }
}

// A saved financing quote. Monetary columns are NUMERIC(10,2) and go over the
// wire as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinanceQuote {
    pub id: i32,
    pub purchase_price: BigDecimal,
    pub down_payment: BigDecimal,
    pub credit_score: String,
    pub financed_amount: BigDecimal,
    pub monthly_payment: BigDecimal,
    pub max_approval: BigDecimal,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Request body for `POST /api/finance-quotes`, before schema validation.
///
/// Every field is optional here so that a missing field is reported by name
/// instead of as a generic deserialization failure. `id` and `createdAt` are
/// captured only so they can be rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInput {
    pub purchase_price: Option<String>,
    pub down_payment: Option<String>,
    pub credit_score: Option<String>,
    pub financed_amount: Option<String>,
    pub monthly_payment: Option<String>,
    pub max_approval: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<serde_json::Value>,
}

// `Some` whenever the key appears in the body, including an explicit null.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

/// A quote that passed schema validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFinanceQuote {
    pub purchase_price: BigDecimal,
    pub down_payment: BigDecimal,
    pub credit_score: CreditTier,
    pub financed_amount: BigDecimal,
    pub monthly_payment: BigDecimal,
    pub max_approval: BigDecimal,
}

impl FinanceQuote {
    pub(crate) fn new(id: i32, quote: NewFinanceQuote, created_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            id,
            purchase_price: quote.purchase_price,
            down_payment: quote.down_payment,
            credit_score: quote.credit_score.to_string(),
            financed_amount: quote.financed_amount,
            monthly_payment: quote.monthly_payment,
            max_approval: quote.max_approval,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

use serde::{Deserialize, Serialize};

use crate::models::CreditTier;

/// APR and approval multiplier attached to a credit tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTerms {
    pub apr: f64,
    pub approval_multiplier: f64,
}

// Output of the quote calculator. Plain numbers; rounding for display is left
// to whoever renders them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCalculation {
    pub financed_amount: f64,
    pub monthly_payment: f64,
    pub max_approval: f64,
    pub apr: f64,
    pub down_payment_percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorRequest {
    pub purchase_price: f64,
    pub down_payment: f64,
    pub credit_score: String,
    /// Clamp the down payment into `[0, 50%]` of the price instead of rejecting it.
    #[serde(default)]
    pub clamp_down_payment: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorResponse {
    pub credit_score: CreditTier,
    pub purchase_price: f64,
    pub down_payment: f64,
    pub term_months: u32,
    #[serde(flatten)]
    pub calculation: QuoteCalculation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTableEntry {
    pub credit_score: CreditTier,
    pub score_range: &'static str,
    #[serde(flatten)]
    pub terms: CreditTerms,
}

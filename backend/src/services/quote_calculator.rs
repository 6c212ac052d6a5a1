use thiserror::Error;
use tracing::warn;

use crate::models::{CreditTerms, CreditTier, QuoteCalculation, QuoteInput, RateTableEntry};

/// Every quote is amortized over a fixed five-year term.
pub const TERM_MONTHS: u32 = 60;

/// Down payment may not exceed half of the purchase price.
pub const MAX_DOWN_PAYMENT_RATIO: f64 = 0.5;

/// Tier used when a credit score label is not recognized.
pub const FALLBACK_TIER: CreditTier = CreditTier::Fair;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculatorError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub fn credit_terms(tier: CreditTier) -> CreditTerms {
    let (apr, approval_multiplier) = match tier {
        CreditTier::Excellent => (6.5, 1.5),
        CreditTier::Good => (8.5, 1.3),
        CreditTier::Fair => (12.0, 1.1),
        CreditTier::Poor => (16.5, 0.9),
    };
    CreditTerms { apr, approval_multiplier }
}

pub fn rate_table() -> Vec<RateTableEntry> {
    CreditTier::ALL
        .iter()
        .map(|tier| RateTableEntry {
            credit_score: *tier,
            score_range: tier.score_range(),
            terms: credit_terms(*tier),
        })
        .collect()
}

/// Resolves a free-form credit score label, falling back to the fair tier.
pub fn resolve_tier(label: &str) -> CreditTier {
    match label.parse::<CreditTier>() {
        Ok(tier) => tier,
        Err(_) => {
            warn!("Unrecognized credit score '{}', using {} terms", label, FALLBACK_TIER);
            FALLBACK_TIER
        }
    }
}

pub fn max_down_payment(purchase_price: f64) -> f64 {
    (purchase_price * MAX_DOWN_PAYMENT_RATIO).max(0.0)
}

/// Clamps a down payment into `[0, max_down_payment(purchase_price)]`.
pub fn clamp_down_payment(purchase_price: f64, down_payment: f64) -> f64 {
    down_payment.min(max_down_payment(purchase_price)).max(0.0)
}

/// Level payment that amortizes `financed_amount` over `months` at `apr` percent.
///
/// A zero rate degenerates to straight-line repayment.
pub fn monthly_payment(financed_amount: f64, apr: f64, months: u32) -> f64 {
    let monthly_rate = apr / 12.0 / 100.0;
    if monthly_rate > 0.0 {
        let growth = (1.0 + monthly_rate).powi(months as i32);
        financed_amount * (monthly_rate * growth) / (growth - 1.0)
    } else {
        financed_amount / months as f64
    }
}

pub fn calculate(
    purchase_price: f64,
    down_payment: f64,
    tier: CreditTier,
) -> Result<QuoteCalculation, CalculatorError> {
    if !purchase_price.is_finite() || !down_payment.is_finite() {
        return Err(CalculatorError::InvalidInput(
            "Purchase price and down payment must be finite numbers".into(),
        ));
    }
    if purchase_price <= 0.0 {
        return Err(CalculatorError::InvalidInput(
            "Purchase price must be greater than zero".into(),
        ));
    }
    if down_payment < 0.0 {
        return Err(CalculatorError::InvalidInput(
            "Down payment cannot be negative".into(),
        ));
    }
    if down_payment > max_down_payment(purchase_price) {
        return Err(CalculatorError::InvalidInput(format!(
            "Down payment cannot exceed {}% of the purchase price",
            MAX_DOWN_PAYMENT_RATIO * 100.0
        )));
    }

    let terms = credit_terms(tier);
    let financed_amount = purchase_price - down_payment;

    Ok(QuoteCalculation {
        financed_amount,
        monthly_payment: monthly_payment(financed_amount, terms.apr, TERM_MONTHS),
        max_approval: financed_amount * terms.approval_multiplier,
        apr: terms.apr,
        down_payment_percent: down_payment / purchase_price * 100.0,
    })
}

impl QuoteCalculation {
    /// Builds the body submitted to the quote store, rounded to cents.
    pub fn to_quote_input(&self, purchase_price: f64, down_payment: f64, tier: CreditTier) -> QuoteInput {
        QuoteInput {
            purchase_price: Some(format!("{:.2}", purchase_price)),
            down_payment: Some(format!("{:.2}", down_payment)),
            credit_score: Some(tier.to_string()),
            financed_amount: Some(format!("{:.2}", self.financed_amount)),
            monthly_payment: Some(format!("{:.2}", self.monthly_payment)),
            max_approval: Some(format!("{:.2}", self.max_approval)),
            id: None,
            created_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_excellent_tier_reference_quote() {
        let quote = calculate(50_000.0, 5_000.0, CreditTier::Excellent).unwrap();

        assert_eq!(quote.financed_amount, 45_000.0);
        assert_eq!(quote.apr, 6.5);
        assert!(approx(quote.monthly_payment, 880.48, 0.01), "got {}", quote.monthly_payment);
        assert!(approx(quote.max_approval, 67_500.0, 1e-9));
        assert!(approx(quote.down_payment_percent, 10.0, 1e-9));
    }

    #[test]
    fn test_payments_increase_as_credit_worsens() {
        let payments: Vec<f64> = CreditTier::ALL
            .iter()
            .map(|tier| calculate(50_000.0, 5_000.0, *tier).unwrap().monthly_payment)
            .collect();

        assert!(payments.windows(2).all(|w| w[0] < w[1]));
        assert!(approx(payments[1], 923.24, 0.01));
        assert!(approx(payments[2], 1001.00, 0.01));
        assert!(approx(payments[3], 1106.30, 0.01));
    }

    #[test]
    fn test_max_approval_uses_tier_multiplier() {
        let poor = calculate(20_000.0, 0.0, CreditTier::Poor).unwrap();
        let good = calculate(20_000.0, 0.0, CreditTier::Good).unwrap();
        assert!(approx(poor.max_approval, 18_000.0, 1e-9));
        assert!(approx(good.max_approval, 26_000.0, 1e-9));
    }

    #[test]
    fn test_financed_amount_is_exact_difference() {
        for (price, down) in [(1.0, 0.5), (12_345.0, 6_000.0), (99_999.0, 0.0), (10_000.0, 5_000.0)] {
            let quote = calculate(price, down, CreditTier::Good).unwrap();
            assert_eq!(quote.financed_amount, price - down);
        }
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        assert_eq!(monthly_payment(45_000.0, 0.0, TERM_MONTHS), 750.0);
        assert_eq!(monthly_payment(1_000.0, 0.0, 10), 100.0);
    }

    #[test]
    fn test_down_payment_percent_is_linear() {
        let a = calculate(40_000.0, 4_000.0, CreditTier::Fair).unwrap();
        let b = calculate(40_000.0, 8_000.0, CreditTier::Fair).unwrap();
        assert!(approx(a.down_payment_percent, 10.0, 1e-9));
        assert!(approx(b.down_payment_percent, 2.0 * a.down_payment_percent, 1e-9));
    }

    #[test]
    fn test_unknown_label_falls_back_to_fair() {
        assert_eq!(resolve_tier("platinum"), CreditTier::Fair);
        assert_eq!(resolve_tier("Excellent"), CreditTier::Fair);
        assert_eq!(resolve_tier("good"), CreditTier::Good);

        let unknown = calculate(30_000.0, 3_000.0, resolve_tier("platinum")).unwrap();
        let fair = calculate(30_000.0, 3_000.0, CreditTier::Fair).unwrap();
        assert_eq!(unknown, fair);
        assert_eq!(unknown.apr, 12.0);
        assert!(approx(unknown.max_approval, 27_000.0 * 1.1, 1e-9));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        assert!(matches!(
            calculate(0.0, 0.0, CreditTier::Good),
            Err(CalculatorError::InvalidInput(_))
        ));
        assert!(matches!(
            calculate(-100.0, 0.0, CreditTier::Good),
            Err(CalculatorError::InvalidInput(_))
        ));
        assert!(calculate(f64::NAN, 0.0, CreditTier::Good).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_down_payment() {
        assert!(calculate(10_000.0, -1.0, CreditTier::Good).is_err());
        assert!(calculate(10_000.0, 5_000.01, CreditTier::Good).is_err());
        assert!(calculate(10_000.0, 5_000.0, CreditTier::Good).is_ok());
    }

    #[test]
    fn test_clamp_down_payment() {
        assert_eq!(clamp_down_payment(10_000.0, 7_500.0), 5_000.0);
        assert_eq!(clamp_down_payment(10_000.0, 2_000.0), 2_000.0);
        assert_eq!(clamp_down_payment(10_000.0, -50.0), 0.0);
        assert_eq!(clamp_down_payment(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_to_quote_input_rounds_to_cents() {
        let quote = calculate(50_000.0, 5_000.0, CreditTier::Excellent).unwrap();
        let input = quote.to_quote_input(50_000.0, 5_000.0, CreditTier::Excellent);

        assert_eq!(input.purchase_price.as_deref(), Some("50000.00"));
        assert_eq!(input.financed_amount.as_deref(), Some("45000.00"));
        assert_eq!(input.monthly_payment.as_deref(), Some("880.48"));
        assert_eq!(input.max_approval.as_deref(), Some("67500.00"));
        assert_eq!(input.credit_score.as_deref(), Some("excellent"));
        assert!(input.id.is_none());
    }

    #[test]
    fn test_rate_table_covers_every_tier() {
        let table = rate_table();
        assert_eq!(table.len(), 4);
        assert_eq!(table[0].terms.apr, 6.5);
        assert_eq!(table[3].terms.approval_multiplier, 0.9);
    }
}

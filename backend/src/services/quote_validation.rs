use std::str::FromStr;
use std::sync::OnceLock;

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use regex::Regex;

use crate::errors::AppError;
use crate::models::{CreditTier, NewFinanceQuote, QuoteInput};
use crate::services::quote_calculator;

/// Scale of the NUMERIC(10,2) money columns.
pub const MONEY_SCALE: i64 = 2;

/// Largest magnitude a NUMERIC(10,2) column accepts is just below 10^8.
const MONEY_LIMIT: i64 = 100_000_000;
const MONEY_INTEGER_DIGITS: usize = 8;

/// Normalizes a money value to the column scale (half-up, two places).
pub fn to_money(value: &BigDecimal) -> BigDecimal {
    value.round(MONEY_SCALE).with_scale(MONEY_SCALE)
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

fn money_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(-)?(\d+)(?:\.(\d+))?$").unwrap())
}

// Plain decimal notation only. Exponent forms like "1e9" would make the
// rounding below allocate arbitrarily large integers.
fn parse_money(value: &Option<String>, field: &str) -> Result<BigDecimal, AppError> {
    let raw = required(value, field)?.trim();
    let caps = money_pattern()
        .captures(raw)
        .ok_or_else(|| AppError::Validation(format!("{} must be a decimal string", field)))?;

    if caps.get(1).is_some() {
        return Err(AppError::Validation(format!("{} cannot be negative", field)));
    }

    let too_large = || AppError::Validation(format!("{} must be less than {}", field, MONEY_LIMIT));
    let integer = caps[2].trim_start_matches('0');
    if integer.len() > MONEY_INTEGER_DIGITS {
        return Err(too_large());
    }

    // Half-up rounding to cents only looks at the third fractional digit.
    let fraction = caps.get(3).map_or("", |m| m.as_str());
    let fraction = &fraction[..fraction.len().min(MONEY_SCALE as usize + 1)];
    let normalized = if fraction.is_empty() {
        format!("0{}", integer)
    } else {
        format!("0{}.{}", integer, fraction)
    };

    let amount = BigDecimal::from_str(&normalized)
        .map_err(|_| AppError::Validation(format!("{} must be a decimal string", field)))?;
    let amount = to_money(&amount);
    if amount >= BigDecimal::from(MONEY_LIMIT) {
        return Err(too_large());
    }
    Ok(amount)
}

/// Schema check applied to every submitted quote before it reaches the store.
pub fn validate_quote_input(input: QuoteInput) -> Result<NewFinanceQuote, AppError> {
    if input.id.is_some() {
        return Err(AppError::Validation("id is assigned by the server".into()));
    }
    if input.created_at.is_some() {
        return Err(AppError::Validation("createdAt is assigned by the server".into()));
    }

    let credit_score = required(&input.credit_score, "creditScore")?
        .parse::<CreditTier>()
        .map_err(|_| {
            AppError::Validation("creditScore must be one of excellent, good, fair, poor".into())
        })?;

    Ok(NewFinanceQuote {
        purchase_price: parse_money(&input.purchase_price, "purchasePrice")?,
        down_payment: parse_money(&input.down_payment, "downPayment")?,
        credit_score,
        financed_amount: parse_money(&input.financed_amount, "financedAmount")?,
        monthly_payment: parse_money(&input.monthly_payment, "monthlyPayment")?,
        max_approval: parse_money(&input.max_approval, "maxApproval")?,
    })
}

/// Recomputes the derived fields and rejects the quote if any of them is off
/// by more than one cent.
pub fn verify_derived_fields(quote: &NewFinanceQuote) -> Result<(), AppError> {
    let as_f64 = |value: &BigDecimal, field: &str| {
        value
            .to_f64()
            .ok_or_else(|| AppError::Validation(format!("{} is out of range", field)))
    };

    let expected = quote_calculator::calculate(
        as_f64(&quote.purchase_price, "purchasePrice")?,
        as_f64(&quote.down_payment, "downPayment")?,
        quote.credit_score,
    )
    .map_err(|e| AppError::Validation(e.to_string()))?;

    let tolerance = BigDecimal::new(1.into(), MONEY_SCALE);
    let checks = [
        ("financedAmount", &quote.financed_amount, expected.financed_amount),
        ("monthlyPayment", &quote.monthly_payment, expected.monthly_payment),
        ("maxApproval", &quote.max_approval, expected.max_approval),
    ];

    for (field, supplied, expected) in checks {
        let expected = BigDecimal::from_f64(expected)
            .map(|v| to_money(&v))
            .ok_or_else(|| AppError::Validation(format!("{} could not be recomputed", field)))?;
        if (supplied - &expected).abs() > tolerance {
            return Err(AppError::Validation(format!(
                "{} does not match the calculated value {}",
                field, expected
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_input() -> QuoteInput {
        QuoteInput {
            purchase_price: Some("50000".into()),
            down_payment: Some("5000".into()),
            credit_score: Some("excellent".into()),
            financed_amount: Some("45000".into()),
            monthly_payment: Some("880.4766698427899".into()),
            max_approval: Some("67500".into()),
            id: None,
            created_at: None,
        }
    }

    fn money(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_valid_input_is_rounded_to_cents() {
        let quote = validate_quote_input(reference_input()).unwrap();
        assert_eq!(quote.credit_score, CreditTier::Excellent);
        assert_eq!(quote.monthly_payment.to_string(), "880.48");
        assert_eq!(quote.purchase_price.to_string(), "50000.00");
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut input = reference_input();
        input.max_approval = None;
        match validate_quote_input(input) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("maxApproval")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_decimal_and_negative_values() {
        let mut input = reference_input();
        input.down_payment = Some("five thousand".into());
        assert!(validate_quote_input(input).is_err());

        let mut input = reference_input();
        input.down_payment = Some("-1".into());
        assert!(validate_quote_input(input).is_err());
    }

    #[test]
    fn test_rejects_values_beyond_column_precision() {
        let mut input = reference_input();
        input.purchase_price = Some("100000000".into());
        assert!(validate_quote_input(input).is_err());

        let mut input = reference_input();
        input.purchase_price = Some("99999999.99".into());
        assert!(validate_quote_input(input).is_ok());
    }

    #[test]
    fn test_rejects_exponent_notation() {
        for raw in ["1e7", "1E2", "1e12000000", "1e1000000000", "5.0e-3"] {
            let mut input = reference_input();
            input.purchase_price = Some(raw.into());
            match validate_quote_input(input) {
                Err(AppError::Validation(msg)) => assert!(msg.contains("decimal string"), "{}: {}", raw, msg),
                other => panic!("expected validation error for {}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_huge_inputs_are_rejected_without_expansion() {
        let started = std::time::Instant::now();

        let mut input = reference_input();
        input.purchase_price = Some(format!("1{}", "0".repeat(2_000_000)));
        assert!(validate_quote_input(input).is_err());

        let mut input = reference_input();
        input.down_payment = Some(format!("1.{}", "9".repeat(2_000_000)));
        let quote = validate_quote_input(input).unwrap();
        assert_eq!(quote.down_payment.to_string(), "2.00");

        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_leading_zeros_and_long_fractions() {
        let mut input = reference_input();
        input.purchase_price = Some("00000000012.345".into());
        input.max_approval = Some(".5".into());
        assert!(validate_quote_input(input).is_err());

        let mut input = reference_input();
        input.purchase_price = Some("00000000012.345".into());
        let quote = validate_quote_input(input).unwrap();
        assert_eq!(quote.purchase_price.to_string(), "12.35");
    }

    #[test]
    fn test_rejects_unknown_credit_tier() {
        let mut input = reference_input();
        input.credit_score = Some("platinum".into());
        assert!(validate_quote_input(input).is_err());
    }

    #[test]
    fn test_rejects_server_assigned_fields() {
        let mut input = reference_input();
        input.id = Some(serde_json::json!(42));
        assert!(validate_quote_input(input).is_err());

        let mut input = reference_input();
        input.created_at = Some(serde_json::json!("2024-01-01T00:00:00Z"));
        assert!(validate_quote_input(input).is_err());
    }

    #[test]
    fn test_to_money_rounds_half_up() {
        assert_eq!(to_money(&money("1.005")).to_string(), "1.01");
        assert_eq!(to_money(&money("1.004")).to_string(), "1.00");
        assert_eq!(to_money(&money("7")).to_string(), "7.00");
    }

    #[test]
    fn test_verify_accepts_calculator_output() {
        let quote = validate_quote_input(reference_input()).unwrap();
        assert!(verify_derived_fields(&quote).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_payment() {
        let mut input = reference_input();
        input.monthly_payment = Some("500.00".into());
        let quote = validate_quote_input(input).unwrap();
        match verify_derived_fields(&quote) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("monthlyPayment")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_rejects_inconsistent_financed_amount() {
        let mut input = reference_input();
        input.financed_amount = Some("40000".into());
        let quote = validate_quote_input(input).unwrap();
        assert!(verify_derived_fields(&quote).is_err());
    }
}

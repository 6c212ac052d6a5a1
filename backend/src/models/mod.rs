mod calculator;
mod finance_quote;

pub use calculator::{CalculatorRequest, CalculatorResponse, CreditTerms, QuoteCalculation, RateTableEntry};
pub use finance_quote::{CreditTier, FinanceQuote, NewFinanceQuote, PaginationParams, QuoteInput};

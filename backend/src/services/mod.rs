pub mod finance_quote_service;
pub mod quote_calculator;
pub mod quote_validation;

pub(crate) mod calculator;
pub(crate) mod finance_quotes;
pub(crate) mod health;

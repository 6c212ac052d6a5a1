pub mod finance_quote_queries;

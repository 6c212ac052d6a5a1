//! Equipment-financing quote service: the lease payment calculator and the
//! REST API that saves and serves finance quotes.

pub mod app;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

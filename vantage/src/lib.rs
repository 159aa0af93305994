pub mod client;
pub mod config;
pub mod error;
pub mod orderbook;
pub mod rest;
pub mod types;

// ---- Top-level re-exports for ergonomic usage ----

// Client
pub use client::{BookSource, Vantage};
pub use config::VantageConfig;
pub use error::{Result, VantageError};

// REST client
pub use rest::VantageHttpClient;

// Order book model
pub use orderbook::{BookUpdate, Order, OrderBook};

// Provider responses
pub use types::{DailyEntry, DailySeries, ExchangeRate, ExchangeRateResponse, OrderbookResponse};

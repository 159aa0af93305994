mod daily;
mod exchange_rate;
mod orderbook;

pub use daily::{DailyEntry, DailySeries};
pub use exchange_rate::{ExchangeRate, ExchangeRateResponse};
pub use orderbook::{OrderbookEntry, OrderbookResponse};

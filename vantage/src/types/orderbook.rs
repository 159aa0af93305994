use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `CRYPTO_ORDERBOOK` response: raw ask and bid levels as sent by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderbookResponse {
    pub asks: Vec<OrderbookEntry>,
    pub bids: Vec<OrderbookEntry>,
}

/// A single provider level. Price and quantity may arrive as strings or numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderbookEntry {
    pub price: Decimal,
    pub quantity: Decimal,
}

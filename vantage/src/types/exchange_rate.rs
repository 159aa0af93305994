use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `CURRENCY_EXCHANGE_RATE` response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateResponse {
    #[serde(rename = "Realtime Currency Exchange Rate")]
    pub rate: ExchangeRate,
}

/// Realtime exchange rate between two currencies.
///
/// Only the currency codes and the rate itself are required; the provider
/// sends `"-"` for bid/ask on some pairs, so those stay as raw strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    #[serde(rename = "1. From_Currency Code")]
    pub from_code: String,
    #[serde(rename = "2. From_Currency Name", default)]
    pub from_name: String,
    #[serde(rename = "3. To_Currency Code")]
    pub to_code: String,
    #[serde(rename = "4. To_Currency Name", default)]
    pub to_name: String,
    #[serde(rename = "5. Exchange Rate", with = "rust_decimal::serde::str")]
    pub exchange_rate: Decimal,
    #[serde(rename = "6. Last Refreshed", default)]
    pub last_refreshed: String,
    #[serde(rename = "7. Time Zone", default)]
    pub time_zone: String,
    #[serde(rename = "8. Bid Price", default)]
    pub bid_price: Option<String>,
    #[serde(rename = "9. Ask Price", default)]
    pub ask_price: Option<String>,
}

use crate::error::Result;
use crate::rest::VantageHttpClient;
use crate::types::*;

impl VantageHttpClient {
    /// CRYPTO_ORDERBOOK - Current ask/bid levels for a symbol.
    pub async fn get_crypto_orderbook(
        &self,
        symbol: &str,
        market: &str,
    ) -> Result<OrderbookResponse> {
        self.query(
            "CRYPTO_ORDERBOOK",
            &[("symbol", symbol), ("market", market)],
        )
        .await
    }

    /// CURRENCY_EXCHANGE_RATE - Realtime rate from one currency to another.
    pub async fn get_exchange_rate(&self, from: &str, to: &str) -> Result<ExchangeRateResponse> {
        self.query(
            "CURRENCY_EXCHANGE_RATE",
            &[("from_currency", from), ("to_currency", to)],
        )
        .await
    }

    /// DIGITAL_CURRENCY_DAILY - Daily OHLCV series for a symbol in a market.
    pub async fn get_digital_currency_daily(
        &self,
        symbol: &str,
        market: &str,
    ) -> Result<DailySeries> {
        self.query(
            "DIGITAL_CURRENCY_DAILY",
            &[("symbol", symbol), ("market", market)],
        )
        .await
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use tracing::info;

use crate::config::VantageConfig;
use crate::error::{Result, VantageError};
use crate::orderbook::{BookUpdate, OrderBook};
use crate::rest::VantageHttpClient;

/// Where an order book snapshot comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookSource {
    /// `CRYPTO_ORDERBOOK` levels, reshaped.
    Direct,
    /// Levels derived from the daily series around the current exchange rate.
    #[default]
    Synthetic,
    /// Hardcoded sample data; no network access.
    Sample,
}

impl fmt::Display for BookSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookSource::Direct => "direct",
            BookSource::Synthetic => "synthetic",
            BookSource::Sample => "sample",
        };
        f.write_str(s)
    }
}

impl FromStr for BookSource {
    type Err = VantageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(BookSource::Direct),
            "synthetic" => Ok(BookSource::Synthetic),
            "sample" => Ok(BookSource::Sample),
            other => Err(VantageError::Validation(format!(
                "unknown book source '{other}' (expected direct, synthetic or sample)"
            ))),
        }
    }
}

/// Main client: turns a symbol into a displayable order book.
#[derive(Debug, Clone)]
pub struct Vantage {
    /// HTTP client.
    pub http_client: VantageHttpClient,
}

impl Vantage {
    pub fn new(config: VantageConfig) -> Self {
        Self {
            http_client: VantageHttpClient::new(&config),
        }
    }

    /// Fetch a fresh snapshot for `symbol` quoted in `market`.
    ///
    /// Symbol and market are trimmed and upper-cased before use.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::Validation`] for an empty symbol or market
    /// (no request is made), [`VantageError::RateLimited`] when the provider
    /// reports its limit, and transport/shape errors otherwise.
    pub async fn fetch_book(
        &self,
        symbol: &str,
        market: &str,
        source: BookSource,
    ) -> Result<BookUpdate> {
        let symbol = normalize(symbol, "symbol")?;
        let market = normalize(market, "market")?;

        let update = match source {
            BookSource::Direct => self.fetch_direct(&symbol, &market).await?,
            BookSource::Synthetic => self.fetch_synthetic(&symbol, &market).await?,
            BookSource::Sample => BookUpdate {
                book: OrderBook::sample(Utc::now()),
                spot_price: None,
            },
        };

        info!(
            symbol = %symbol,
            market = %market,
            source = %source,
            asks = update.book.asks.len(),
            bids = update.book.bids.len(),
            "order book fetched"
        );
        Ok(update)
    }

    async fn fetch_direct(&self, symbol: &str, market: &str) -> Result<BookUpdate> {
        let resp = self.http_client.get_crypto_orderbook(symbol, market).await?;
        Ok(BookUpdate {
            book: OrderBook::from_response(resp, Utc::now())?,
            spot_price: None,
        })
    }

    /// Daily series first, then the spot rate; both must succeed.
    async fn fetch_synthetic(&self, symbol: &str, market: &str) -> Result<BookUpdate> {
        let series = self
            .http_client
            .get_digital_currency_daily(symbol, market)
            .await?;
        let rate = self.http_client.get_exchange_rate(symbol, market).await?;
        let spot = rate.rate.exchange_rate;

        Ok(BookUpdate {
            book: OrderBook::synthesize(&series, spot)?,
            spot_price: Some(spot),
        })
    }
}

fn normalize(value: &str, what: &str) -> Result<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(VantageError::Validation(format!("{what} is empty")));
    }
    Ok(v.to_uppercase())
}

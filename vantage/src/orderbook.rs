//! Order book snapshot model and the reshaping of provider data into it.
//!
//! A snapshot is replaced wholesale on every fetch; there are no delta or
//! merge semantics. Asks are kept ascending by price and bids descending, so
//! index 0 of each side is the best level.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::error::{Result, VantageError};
use crate::types::{DailySeries, OrderbookResponse};

/// Number of daily entries turned into synthetic levels per side.
pub const SYNTHETIC_DEPTH: usize = 10;

/// Price step between synthetic levels, as a fraction of the spot price.
pub const SYNTHETIC_STEP: Decimal = dec!(0.001);

/// A single price level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub price: Decimal,
    pub size: Decimal,
    /// Always `price * size`; consumers display it as-is.
    pub total: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Order {
    /// # Errors
    ///
    /// Returns [`VantageError::Overflow`] when `price * size` does not fit in a
    /// `Decimal`.
    pub fn new(price: Decimal, size: Decimal, timestamp: DateTime<Utc>) -> Result<Self> {
        let total = price
            .checked_mul(size)
            .ok_or_else(|| VantageError::Overflow(format!("level total {price} * {size}")))?;
        Ok(Self {
            price,
            size,
            total,
            timestamp,
        })
    }
}

/// Asks (ascending) and bids (descending) at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderBook {
    pub asks: Vec<Order>,
    pub bids: Vec<Order>,
}

impl OrderBook {
    pub fn new(asks: Vec<Order>, bids: Vec<Order>) -> Self {
        Self { asks, bids }
    }

    pub fn best_ask(&self) -> Option<&Order> {
        self.asks.first()
    }

    pub fn best_bid(&self) -> Option<&Order> {
        self.bids.first()
    }

    /// `best_ask - best_bid`, or `None` if either side is empty.
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_ask(), self.best_bid()) {
            (Some(a), Some(b)) => Some(a.price - b.price),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.asks.is_empty() && self.bids.is_empty()
    }

    /// Reshape a `CRYPTO_ORDERBOOK` response, stamping every level with `now`.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::EmptyResponse`] when both sides are empty and
    /// [`VantageError::Overflow`] when a level's total is out of range.
    pub fn from_response(resp: OrderbookResponse, now: DateTime<Utc>) -> Result<Self> {
        if resp.asks.is_empty() && resp.bids.is_empty() {
            return Err(VantageError::EmptyResponse("order book has no levels".into()));
        }

        let mut asks = resp
            .asks
            .into_iter()
            .map(|e| Order::new(e.price, e.quantity, now))
            .collect::<Result<Vec<_>>>()?;
        let mut bids = resp
            .bids
            .into_iter()
            .map(|e| Order::new(e.price, e.quantity, now))
            .collect::<Result<Vec<_>>>()?;

        asks.sort_by(|a, b| a.price.cmp(&b.price));
        bids.sort_by(|a, b| b.price.cmp(&a.price));

        Ok(Self { asks, bids })
    }

    /// Derive a book around `spot` from the most recent daily entries.
    ///
    /// Level `i` (newest day first) gets `spot * (1 ± (i + 1) * 0.001)`, that
    /// day's volume as its size, and midnight UTC of that day as its time.
    ///
    /// # Errors
    ///
    /// Returns [`VantageError::EmptyResponse`] when the series has no entries
    /// and [`VantageError::Overflow`] when a derived price or total is out of
    /// range.
    pub fn synthesize(series: &DailySeries, spot: Decimal) -> Result<Self> {
        if series.series.is_empty() {
            return Err(VantageError::EmptyResponse("daily series has no entries".into()));
        }

        let mut asks = Vec::with_capacity(SYNTHETIC_DEPTH);
        let mut bids = Vec::with_capacity(SYNTHETIC_DEPTH);

        for (i, (date, entry)) in series.latest(SYNTHETIC_DEPTH).enumerate() {
            let offset = Decimal::from(i as u64 + 1) * SYNTHETIC_STEP;
            let timestamp = midnight_utc(*date);
            asks.push(Order::new(
                scale(spot, Decimal::ONE + offset)?,
                entry.volume,
                timestamp,
            )?);
            bids.push(Order::new(
                scale(spot, Decimal::ONE - offset)?,
                entry.volume,
                timestamp,
            )?);
        }

        Ok(Self { asks, bids })
    }

    /// A fixed ETH/USD-style book for offline use.
    pub fn sample(now: DateTime<Utc>) -> Self {
        let asks = [
            (dec!(3450.25), dec!(1.2500)),
            (dec!(3450.75), dec!(0.8000)),
            (dec!(3451.50), dec!(2.1000)),
            (dec!(3452.00), dec!(0.4500)),
            (dec!(3453.25), dec!(3.0000)),
        ];
        let bids = [
            (dec!(3449.75), dec!(0.9500)),
            (dec!(3449.25), dec!(1.7500)),
            (dec!(3448.50), dec!(0.3000)),
            (dec!(3447.75), dec!(2.6000)),
            (dec!(3446.00), dec!(5.0000)),
        ];
        let level = |&(price, size): &(Decimal, Decimal)| Order {
            price,
            size,
            total: price * size,
            timestamp: now,
        };
        Self {
            asks: asks.iter().map(level).collect(),
            bids: bids.iter().map(level).collect(),
        }
    }
}

/// A fetched snapshot together with the spot price used to build it, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookUpdate {
    pub book: OrderBook,
    pub spot_price: Option<Decimal>,
}

fn scale(spot: Decimal, factor: Decimal) -> Result<Decimal> {
    spot.checked_mul(factor)
        .ok_or_else(|| VantageError::Overflow(format!("synthetic price {spot} * {factor}")))
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DailyEntry, OrderbookEntry};
    use std::collections::BTreeMap;

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn entry(price: Decimal, quantity: Decimal) -> OrderbookEntry {
        OrderbookEntry { price, quantity }
    }

    fn series(days: u32) -> DailySeries {
        let mut map = BTreeMap::new();
        for d in 1..=days {
            map.insert(
                NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                DailyEntry {
                    open: None,
                    high: None,
                    low: None,
                    close: None,
                    volume: Decimal::from(d * 100),
                },
            );
        }
        DailySeries {
            meta: BTreeMap::new(),
            series: map,
        }
    }

    // -- Order ------------------------------------------------------------

    #[test]
    fn total_is_price_times_size() {
        let o = Order::new(dec!(100.5), dec!(2), ts()).unwrap();
        assert_eq!(o.total, dec!(201.0));
    }

    #[test]
    fn total_overflow_is_an_error() {
        assert!(matches!(
            Order::new(Decimal::MAX, dec!(2), ts()),
            Err(VantageError::Overflow(_))
        ));
    }

    // -- spread -----------------------------------------------------------

    #[test]
    fn spread_is_best_ask_minus_best_bid() {
        let book = OrderBook::new(
            vec![Order::new(dec!(101), dec!(1), ts()).unwrap()],
            vec![Order::new(dec!(99.5), dec!(1), ts()).unwrap()],
        );
        assert_eq!(book.spread(), Some(dec!(1.5)));
    }

    #[test]
    fn spread_none_when_a_side_is_empty() {
        let only_asks =
            OrderBook::new(vec![Order::new(dec!(101), dec!(1), ts()).unwrap()], vec![]);
        assert_eq!(only_asks.spread(), None);
        assert!(!only_asks.is_empty());
        assert_eq!(OrderBook::default().spread(), None);
        assert!(OrderBook::default().is_empty());
    }

    // -- from_response ----------------------------------------------------

    #[test]
    fn from_response_sorts_sides() {
        let resp = OrderbookResponse {
            asks: vec![entry(dec!(102), dec!(1)), entry(dec!(101), dec!(2))],
            bids: vec![entry(dec!(98), dec!(1)), entry(dec!(99), dec!(3))],
        };
        let book = OrderBook::from_response(resp, ts()).unwrap();
        assert_eq!(book.asks[0].price, dec!(101));
        assert_eq!(book.asks[0].total, dec!(202));
        assert_eq!(book.bids[0].price, dec!(99));
        assert_eq!(book.bids[0].timestamp, ts());
        assert_eq!(book.spread(), Some(dec!(2)));
    }

    #[test]
    fn from_response_rejects_empty_book() {
        let resp = OrderbookResponse {
            asks: vec![],
            bids: vec![],
        };
        assert!(matches!(
            OrderBook::from_response(resp, ts()),
            Err(VantageError::EmptyResponse(_))
        ));
    }

    #[test]
    fn from_response_rejects_overflowing_level() {
        let resp = OrderbookResponse {
            asks: vec![entry(dec!(101), dec!(1)), entry(Decimal::MAX, dec!(2))],
            bids: vec![entry(dec!(99), dec!(1))],
        };
        assert!(matches!(
            OrderBook::from_response(resp, ts()),
            Err(VantageError::Overflow(_))
        ));
    }

    // -- synthesize -------------------------------------------------------

    #[test]
    fn synthetic_levels_step_from_spot() {
        let spot = dec!(50000);
        let book = OrderBook::synthesize(&series(12), spot).unwrap();
        assert_eq!(book.asks.len(), SYNTHETIC_DEPTH);
        assert_eq!(book.bids.len(), SYNTHETIC_DEPTH);

        for i in 0..SYNTHETIC_DEPTH {
            let step = Decimal::from(i as u64 + 1) * dec!(0.001);
            assert_eq!(book.asks[i].price, spot * (Decimal::ONE + step));
            assert_eq!(book.bids[i].price, spot * (Decimal::ONE - step));
        }
        assert_eq!(book.asks[0].price, dec!(50050));
        assert_eq!(book.bids[0].price, dec!(49950));
        assert_eq!(book.spread(), Some(dec!(100)));
    }

    #[test]
    fn synthetic_uses_newest_days_first() {
        let book = OrderBook::synthesize(&series(12), dec!(10)).unwrap();
        // Day 12 is newest, its volume is 1200.
        assert_eq!(book.asks[0].size, dec!(1200));
        assert_eq!(book.asks[9].size, dec!(300));
        assert_eq!(
            book.bids[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 12)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc()
        );
    }

    #[test]
    fn synthetic_short_series_yields_fewer_levels() {
        let book = OrderBook::synthesize(&series(3), dec!(10)).unwrap();
        assert_eq!(book.asks.len(), 3);
        assert_eq!(book.bids.len(), 3);
    }

    #[test]
    fn synthetic_rejects_empty_series() {
        assert!(matches!(
            OrderBook::synthesize(&series(0), dec!(10)),
            Err(VantageError::EmptyResponse(_))
        ));
    }

    #[test]
    fn synthetic_rejects_overflowing_spot() {
        assert!(matches!(
            OrderBook::synthesize(&series(3), Decimal::MAX),
            Err(VantageError::Overflow(_))
        ));
    }

    // -- sample -----------------------------------------------------------

    #[test]
    fn sample_book_is_ordered() {
        let book = OrderBook::sample(ts());
        assert!(book.asks.windows(2).all(|w| w[0].price <= w[1].price));
        assert!(book.bids.windows(2).all(|w| w[0].price >= w[1].price));
        assert_eq!(book.spread(), Some(dec!(0.50)));
        assert_eq!(book.asks[0].total, dec!(3450.25) * dec!(1.25));
    }
}

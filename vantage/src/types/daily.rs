use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `DIGITAL_CURRENCY_DAILY` response: one entry per calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySeries {
    #[serde(rename = "Meta Data", default)]
    pub meta: BTreeMap<String, String>,
    #[serde(rename = "Time Series (Digital Currency Daily)")]
    pub series: BTreeMap<NaiveDate, DailyEntry>,
}

impl DailySeries {
    /// The `n` most recent days, newest first.
    pub fn latest(&self, n: usize) -> impl Iterator<Item = (&NaiveDate, &DailyEntry)> {
        self.series.iter().rev().take(n)
    }
}

/// OHLCV values for one day. Only the volume is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyEntry {
    #[serde(rename = "1. open", default, with = "rust_decimal::serde::str_option")]
    pub open: Option<Decimal>,
    #[serde(rename = "2. high", default, with = "rust_decimal::serde::str_option")]
    pub high: Option<Decimal>,
    #[serde(rename = "3. low", default, with = "rust_decimal::serde::str_option")]
    pub low: Option<Decimal>,
    #[serde(rename = "4. close", default, with = "rust_decimal::serde::str_option")]
    pub close: Option<Decimal>,
    #[serde(rename = "5. volume", with = "rust_decimal::serde::str")]
    pub volume: Decimal,
}

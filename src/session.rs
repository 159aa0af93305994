//! Search session: the state behind the viewer and its fetch lifecycle.
//!
//! The session decides *whether* a fetch should happen and applies results;
//! the caller performs the request and hands the outcome back via
//! [`SearchSession::apply`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use vantage::{BookSource, BookUpdate, OrderBook, VantageError};

/// Shown when the provider reports its request limit.
pub const RATE_LIMIT_MESSAGE: &str = "API rate limit reached. Please try again later.";

/// Shown for every other failure.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch orderbook data. Please try again.";

/// Symbol shown in the panel title before the first search.
pub const PLACEHOLDER_SYMBOL: &str = "BTC";

/// Why a fetch was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTrigger {
    Search,
    Refresh,
}

/// A fetch the caller should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub market: String,
    pub source: BookSource,
    pub trigger: FetchTrigger,
}

/// Map a fetch error to the short message shown to the user.
pub fn user_message(err: &VantageError) -> &'static str {
    if err.is_rate_limited() {
        RATE_LIMIT_MESSAGE
    } else {
        FETCH_FAILED_MESSAGE
    }
}

/// UI-session state. Nothing here outlives the process.
#[derive(Debug)]
pub struct SearchSession {
    pub market: String,
    pub source: BookSource,
    pub precision: u32,
    /// Symbol of the last accepted search, upper-cased.
    pub symbol: Option<String>,
    /// Raw text in the search box.
    pub input: String,
    pub loading: bool,
    pub error: Option<String>,
    pub spot_price: Option<Decimal>,
    pub book: OrderBook,
    pub last_update: Option<DateTime<Utc>>,
}

impl SearchSession {
    pub fn new(market: &str, source: BookSource, precision: u32) -> Self {
        Self {
            market: market.trim().to_uppercase(),
            source,
            precision,
            symbol: None,
            input: String::new(),
            loading: false,
            error: None,
            spot_price: None,
            book: OrderBook::default(),
            last_update: None,
        }
    }

    /// `"ETH/USD"`; [`PLACEHOLDER_SYMBOL`] stands in before the first search.
    pub fn label(&self) -> String {
        let symbol = self.symbol.as_deref().unwrap_or(PLACEHOLDER_SYMBOL);
        format!("{symbol}/{}", self.market)
    }

    // --- Input editing ---

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Drop the snapshot currently on screen.
    pub fn clear(&mut self) {
        self.book = OrderBook::default();
        self.spot_price = None;
        self.last_update = None;
    }

    // --- Fetch lifecycle ---

    /// Accept the search input.
    ///
    /// Returns `None` (no fetch) for blank input or while a request is
    /// outstanding.
    pub fn submit(&mut self) -> Option<FetchRequest> {
        let symbol = self.input.trim().to_uppercase();
        if symbol.is_empty() || self.loading {
            return None;
        }
        self.symbol = Some(symbol.clone());
        Some(self.begin(symbol, FetchTrigger::Search))
    }

    /// Re-issue the fetch for the current symbol.
    ///
    /// Returns `None` before the first search or while a request is outstanding.
    pub fn refresh(&mut self) -> Option<FetchRequest> {
        if self.loading {
            return None;
        }
        let symbol = self.symbol.clone()?;
        Some(self.begin(symbol, FetchTrigger::Refresh))
    }

    fn begin(&mut self, symbol: String, trigger: FetchTrigger) -> FetchRequest {
        self.loading = true;
        self.error = None;
        FetchRequest {
            symbol,
            market: self.market.clone(),
            source: self.source,
            trigger,
        }
    }

    /// Apply a finished fetch. Failures keep the previous snapshot.
    pub fn apply(&mut self, request: &FetchRequest, result: Result<BookUpdate, VantageError>) {
        self.loading = false;
        match result {
            Ok(update) => {
                info!(
                    symbol = %request.symbol,
                    trigger = ?request.trigger,
                    asks = update.book.asks.len(),
                    bids = update.book.bids.len(),
                    "snapshot applied"
                );
                self.book = update.book;
                if update.spot_price.is_some() {
                    self.spot_price = update.spot_price;
                }
                self.last_update = Some(Utc::now());
                self.error = None;
            }
            Err(e) => {
                warn!(symbol = %request.symbol, error = %e, "fetch failed");
                self.error = Some(user_message(&e).to_string());
            }
        }
    }
}

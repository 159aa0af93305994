use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;
use vantage::{BookUpdate, Order, Vantage};

use crate::cli::SnapshotArgs;
use crate::display::format_fixed;
use crate::error::AppError;

/// JSON shape of a printed snapshot.
#[derive(Serialize)]
struct SnapshotJson<'a> {
    symbol: &'a str,
    market: &'a str,
    spot_price: Option<Decimal>,
    spread: Option<Decimal>,
    asks: &'a [Order],
    bids: &'a [Order],
}

/// Fetch one book for `args` and write it to `writer`.
pub async fn run_snapshot<W: Write>(
    client: &Vantage,
    args: &SnapshotArgs,
    writer: &mut W,
) -> Result<(), AppError> {
    let update = client
        .fetch_book(&args.symbol, &args.book.market, args.book.source)
        .await?;
    let symbol = args.symbol.trim().to_uppercase();
    let market = args.book.market.trim().to_uppercase();
    write_snapshot(
        &symbol,
        &market,
        &update,
        args.book.precision,
        args.json,
        writer,
    )
}

/// Write a snapshot as TSV (one level per line) or a single JSON object.
///
/// TSV columns: side, price, size, total, RFC 3339 timestamp. Asks come
/// first in ascending price order, then bids descending.
pub fn write_snapshot<W: Write>(
    symbol: &str,
    market: &str,
    update: &BookUpdate,
    precision: u32,
    json_mode: bool,
    writer: &mut W,
) -> Result<(), AppError> {
    let book = &update.book;

    if json_mode {
        let out = SnapshotJson {
            symbol,
            market,
            spot_price: update.spot_price,
            spread: book.spread(),
            asks: &book.asks,
            bids: &book.bids,
        };
        serde_json::to_writer(&mut *writer, &out)?;
        writer.write_all(b"\n")?;
    } else {
        let mut buf = String::with_capacity(128);
        for (side, levels) in [("ask", &book.asks), ("bid", &book.bids)] {
            for o in levels.iter() {
                buf.clear();
                buf.push_str(side);
                buf.push('\t');
                buf.push_str(&format_fixed(o.price, precision));
                buf.push('\t');
                buf.push_str(&format_fixed(o.size, precision));
                buf.push('\t');
                buf.push_str(&format_fixed(o.total, precision));
                buf.push('\t');
                buf.push_str(&o.timestamp.to_rfc3339());
                buf.push('\n');
                writer.write_all(buf.as_bytes())?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

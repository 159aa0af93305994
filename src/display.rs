//! Order book panel: two price-level tables and the spread between them.
//!
//! Pure projection of the snapshot it is given. Nothing here mutates state
//! or reports errors.

use chrono::{DateTime, Local, Utc};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};
use rust_decimal::{Decimal, RoundingStrategy};
use vantage::{Order, OrderBook};

/// Shown when neither side has any level.
pub const EMPTY_PLACEHOLDER: &str = "Search for a cryptocurrency to view its orderbook";

const HEADER: [&str; 4] = ["Price", "Size", "Total", "Time"];

/// Everything the panel needs to draw one frame.
pub struct BookView<'a> {
    /// Label such as `"BTC/USD"`.
    pub symbol: &'a str,
    /// Fractional digits for prices, sizes and totals.
    pub precision: u32,
    pub book: &'a OrderBook,
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format with exactly `precision` fractional digits and `,` thousands groups.
///
/// `format_number(dec!(1234.5), 2)` → `"1,234.50"`.
pub fn format_number(value: Decimal, precision: u32) -> String {
    let fixed = format_fixed(value, precision);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3);
    out.push_str(sign);
    out.push_str(&group_thousands(int_part));
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Exactly `precision` fractional digits, no grouping. Rounds half away from zero.
pub fn format_fixed(value: Decimal, precision: u32) -> String {
    let mut rounded =
        value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(precision);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }

    // `rescale` stops at 28 digits; pad the rest.
    let mut out = rounded.to_string();
    let target = precision as usize;
    let digits = out.split_once('.').map_or(0, |(_, f)| f.len());
    if digits < target {
        if digits == 0 {
            out.push('.');
        }
        out.push_str(&"0".repeat(target - digits));
    }
    out
}

/// Insert `,` every three digits from the right.
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Local wall-clock time, `HH:MM:SS`.
pub fn format_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Table cells for one level: `$price`, size, `$total`, time.
pub fn level_cells(order: &Order, precision: u32) -> [String; 4] {
    [
        format!("${}", format_number(order.price, precision)),
        format_number(order.size, precision),
        format!("${}", format_number(order.total, precision)),
        format_time(order.timestamp),
    ]
}

/// `"Spread: $x"` when both sides have a level.
pub fn spread_text(book: &OrderBook, precision: u32) -> Option<String> {
    book.spread()
        .map(|s| format!("Spread: ${}", format_number(s, precision)))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the order book panel into `area`.
pub fn render_orderbook(frame: &mut Frame, area: Rect, view: &BookView<'_>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} Orderbook ", view.symbol));

    if view.book.is_empty() {
        let placeholder = Paragraph::new(vec![Line::from(""), Line::from(EMPTY_PLACEHOLDER)])
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let asks_height = side_height(view.book.asks.len());
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(asks_height), // asks
            Constraint::Length(1),           // spread
            Constraint::Min(2),              // bids
        ])
        .split(inner);

    render_side(frame, layout[0], "Asks", &view.book.asks, Color::Red, view.precision);

    if let Some(text) = spread_text(view.book, view.precision) {
        let spread = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(spread, layout[1]);
    }

    render_side(frame, layout[2], "Bids", &view.book.bids, Color::Green, view.precision);
}

/// Rows for `levels` plus title and header, clamped to the terminal range.
fn side_height(levels: usize) -> u16 {
    u16::try_from(levels).unwrap_or(u16::MAX).saturating_add(2)
}

/// One side as a titled table, price column colored by side.
fn render_side(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    levels: &[Order],
    color: Color,
    precision: u32,
) {
    let header = Row::new(HEADER).style(Style::default().fg(Color::DarkGray));
    let rows = levels.iter().map(|o| {
        let [price, size, total, time] = level_cells(o, precision);
        Row::new(vec![
            Line::styled(price, Style::default().fg(color).bold()),
            Line::from(size).alignment(Alignment::Right),
            Line::from(total).alignment(Alignment::Right),
            Line::styled(time, Style::default().fg(Color::DarkGray)).alignment(Alignment::Right),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(Line::styled(format!(" {title} "), Style::default().fg(color).bold())),
    );
    frame.render_widget(table, area);
}

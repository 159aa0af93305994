//! Interactive order book viewer using ratatui + crossterm.
//!
//! A search box, a status line, the order book panel and a log panel. Fetches
//! run on spawned tasks and report back over a channel; an optional interval
//! re-issues the current search until the viewer exits.

use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::sync::mpsc;
use tokio::time::{self, Interval};
use tokio_util::sync::CancellationToken;
use tracing::info;
use vantage::{BookUpdate, Vantage, VantageError};

use crate::display::{self, format_number, BookView};
use crate::error::AppError;
use crate::session::{FetchRequest, SearchSession};

/// Target render interval (10 FPS).
const RENDER_INTERVAL: Duration = Duration::from_millis(100);

/// Maximum log lines retained.
const MAX_LOG_LINES: usize = 200;

type FetchOutcome = (FetchRequest, Result<BookUpdate, VantageError>);

/// What a key press asks the loop to do.
#[derive(Debug, PartialEq, Eq)]
enum KeyAction {
    None,
    Submit,
    Quit,
}

/// Viewer options taken from the command line.
pub struct WatchOptions {
    pub initial_symbol: Option<String>,
    /// `Some(period)` enables the periodic refresh.
    pub refresh: Option<Duration>,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run the viewer until the user quits or `cancel` fires.
///
/// # Errors
///
/// Returns [`AppError::Terminal`] if the terminal cannot be set up. Fetch
/// failures never end the loop; they are shown in the status line.
pub async fn run_viewer(
    client: Vantage,
    mut session: SearchSession,
    options: WatchOptions,
    cancel: CancellationToken,
) -> Result<(), AppError> {
    let (result_tx, mut result_rx) = mpsc::channel::<FetchOutcome>(16);
    let mut log_lines: VecDeque<String> = VecDeque::with_capacity(MAX_LOG_LINES);

    push_log(
        &mut log_lines,
        format!(
            "Market: {}, source: {}. Type a symbol and press Enter; Esc quits.",
            session.market, session.source
        ),
    );

    if let Some(symbol) = options.initial_symbol {
        session.input = symbol;
        if let Some(req) = session.submit() {
            spawn_fetch(&client, req, &result_tx, &mut log_lines);
        }
    }

    let mut refresh_interval = options.refresh.map(|period| {
        push_log(
            &mut log_lines,
            format!("Auto-refresh every {}s", period.as_secs()),
        );
        refresh_timer(period)
    });

    // Set up terminal.
    enable_raw_mode().map_err(|e| AppError::Terminal(format!("enable raw mode: {e}")))?;
    io::stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| AppError::Terminal(format!("enter alternate screen: {e}")))?;
    let mut terminal = match Terminal::new(CrosstermBackend::new(io::stdout())) {
        Ok(t) => t,
        Err(e) => {
            let _ = disable_raw_mode();
            let _ = io::stdout().execute(LeaveAlternateScreen);
            return Err(AppError::Terminal(format!("create terminal: {e}")));
        }
    };

    let mut render_interval = time::interval(RENDER_INTERVAL);

    // Main event loop.
    let mut quit = false;
    while !quit {
        tokio::select! {
            // Finished fetch.
            Some((req, result)) = result_rx.recv() => {
                if let Err(e) = &result {
                    push_log(&mut log_lines, format!("{}: {e}", req.symbol));
                } else {
                    push_log(&mut log_lines, format!("{}: updated", req.symbol));
                }
                session.apply(&req, result);
            }

            // Periodic refresh.
            _ = tick(&mut refresh_interval) => {
                on_refresh_tick(&mut session, &client, &result_tx, &mut log_lines);
            }

            // Render tick; also polls keyboard input.
            _ = render_interval.tick() => {
                while event::poll(Duration::ZERO).unwrap_or(false) {
                    if let Ok(Event::Key(key)) = event::read() {
                        match handle_key(&mut session, key) {
                            KeyAction::Quit => quit = true,
                            KeyAction::Submit => {
                                if let Some(req) = session.submit() {
                                    spawn_fetch(&client, req, &result_tx, &mut log_lines);
                                }
                            }
                            KeyAction::None => {}
                        }
                    }
                }

                if !quit {
                    let _ = terminal.draw(|frame| render_ui(frame, &session, &log_lines));
                }
            }

            _ = cancel.cancelled() => {
                quit = true;
            }
        }
    }

    // Dropping the interval here releases the refresh timer.
    drop(refresh_interval);
    restore_terminal(&mut terminal);
    info!("viewer stopped");
    Ok(())
}

// ---------------------------------------------------------------------------
// Event helpers
// ---------------------------------------------------------------------------

/// Issue `req` on a background task; the outcome arrives on `tx`.
fn spawn_fetch(
    client: &Vantage,
    req: FetchRequest,
    tx: &mpsc::Sender<FetchOutcome>,
    log_lines: &mut VecDeque<String>,
) {
    push_log(log_lines, format!("{}: fetching ({})", req.symbol, req.source));
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.fetch_book(&req.symbol, &req.market, req.source).await;
        let _ = tx.send((req, result)).await;
    });
}

/// Refresh interval whose first tick is one full `period` away.
fn refresh_timer(period: Duration) -> Interval {
    let mut interval = time::interval_at(time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    interval
}

/// Re-issue the current search. Returns `false` when the session skipped it
/// (no symbol yet, or a request still outstanding).
fn on_refresh_tick(
    session: &mut SearchSession,
    client: &Vantage,
    tx: &mpsc::Sender<FetchOutcome>,
    log_lines: &mut VecDeque<String>,
) -> bool {
    match session.refresh() {
        Some(req) => {
            push_log(log_lines, format!("{}: refreshing", req.symbol));
            spawn_fetch(client, req, tx, log_lines);
            true
        }
        None => false,
    }
}

/// Next refresh tick, or pending forever when refresh is off.
async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(i) => {
            i.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Apply a key press to the search box.
fn handle_key(session: &mut SearchSession, key: KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('u') if ctrl => {
            session.clear_input();
            KeyAction::None
        }
        KeyCode::Char('l') if ctrl => {
            session.clear();
            KeyAction::None
        }
        KeyCode::Char(c) if !ctrl => {
            session.push_char(c);
            KeyAction::None
        }
        KeyCode::Backspace => {
            session.backspace();
            KeyAction::None
        }
        KeyCode::Enter => KeyAction::Submit,
        _ => KeyAction::None,
    }
}

fn push_log(log_lines: &mut VecDeque<String>, line: String) {
    let stamped = format!("{} {line}", Local::now().format("%H:%M:%S"));
    log_lines.push_back(stamped);
    while log_lines.len() > MAX_LOG_LINES {
        log_lines.pop_front();
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

/// Restore terminal to normal mode.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) {
    let _ = terminal.show_cursor();
    let _ = disable_raw_mode();
    let _ = io::stdout().execute(LeaveAlternateScreen);
}

// ---------------------------------------------------------------------------
// UI rendering
// ---------------------------------------------------------------------------

/// Render the full TUI frame.
fn render_ui(frame: &mut Frame, session: &SearchSession, log_lines: &VecDeque<String>) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),   // search
            Constraint::Length(1),   // status
            Constraint::Ratio(3, 4), // order book
            Constraint::Min(4),      // log
        ])
        .split(area);

    render_search(frame, main_layout[0], session);
    frame.render_widget(Paragraph::new(status_line(session)), main_layout[1]);

    let label = session.label();
    display::render_orderbook(
        frame,
        main_layout[2],
        &BookView {
            symbol: &label,
            precision: session.precision,
            book: &session.book,
        },
    );

    render_log(frame, main_layout[3], log_lines);
}

/// Render the search box; dimmed while a request is outstanding.
fn render_search(frame: &mut Frame, area: Rect, session: &SearchSession) {
    let (title, border) = if session.loading {
        (" Search (loading…) ", Color::DarkGray)
    } else {
        (" Search symbol, Enter to fetch ", Color::Cyan)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);
    let input = Paragraph::new(format!(" {}", session.input)).block(block);
    frame.render_widget(input, area);
}

/// Error, loading or last-update summary for the status row.
fn status_line(session: &SearchSession) -> Line<'static> {
    if let Some(err) = &session.error {
        return Line::styled(format!(" {err}"), Style::default().fg(Color::Red));
    }
    if session.loading {
        return Line::styled(" Loading…", Style::default().fg(Color::Yellow));
    }

    let mut spans = Vec::with_capacity(2);
    match session.last_update {
        Some(ts) => spans.push(Span::styled(
            format!(" Last update: {}", display::format_time(ts)),
            Style::default().fg(Color::DarkGray),
        )),
        None => spans.push(Span::styled(
            " No data yet",
            Style::default().fg(Color::DarkGray),
        )),
    }
    if let Some(spot) = session.spot_price {
        spans.push(Span::raw(format!(
            "  Spot ${}",
            format_number(spot, session.precision)
        )));
    }
    Line::from(spans)
}

/// Render the log panel.
fn render_log(frame: &mut Frame, area: Rect, log_lines: &VecDeque<String>) {
    // Show the newest lines that fit.
    let visible = area.height.saturating_sub(2) as usize;
    let skip = log_lines.len().saturating_sub(visible);
    let lines: Vec<Line> = log_lines
        .iter()
        .skip(skip)
        .map(|l| Line::from(l.as_str()))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Log ");
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

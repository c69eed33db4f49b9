use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
};
use tokio::runtime::Handle;
use tracing::{error, info, warn};

use super::app::{App, LedgerSource, LedgerState, LedgerView, PANE_COUNT, Screen};
use super::worker::{self, Update};
use crate::advisor::CompletionClient;
use crate::config::Settings;

struct Dispatcher {
    handle: Handle,
    client: Arc<CompletionClient>,
    tx: Sender<Update>,
}

pub fn run_tui(settings: Settings) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    if !settings.has_credentials() {
        warn!("CLOUDFLARE_AUTH_TOKEN / CLOUDFLARE_ACCOUNT_ID not set; completions will fail");
    }
    let (tx, rx) = mpsc::channel();
    let dispatcher = Dispatcher {
        handle: rt.handle().clone(),
        client: Arc::new(CompletionClient::new(&settings)),
        tx,
    };
    let mut app = App::new(settings.ledger_dir.clone());

    let ui_thread = std::thread::current().id();
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if std::thread::current().id() == ui_thread {
            restore_terminal();
        }
        hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &rx, &dispatcher);

    let _ = std::panic::take_hook();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    // in-flight workers are abandoned, not awaited
    rt.shutdown_background();

    result
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &Receiver<Update>,
    dispatcher: &Dispatcher,
) -> anyhow::Result<()> {
    loop {
        while let Ok(update) = rx.try_recv() {
            app.apply_update(update);
        }

        if app.needs_reload {
            app.needs_reload = false;
            app.reload_ledger();
        }

        terminal.draw(|f| ui(f, app))?;

        if app.should_quit {
            info!("quit requested");
            return Ok(());
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_key_event(app, key, dispatcher);
            }
        }
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent, dispatcher: &Dispatcher) {
    let Some(job) = app.handle_key(key) else {
        return;
    };
    let persona = job.persona;
    let spawned = worker::dispatch(
        dispatcher.handle.clone(),
        Arc::clone(&dispatcher.client),
        job,
        dispatcher.tx.clone(),
    );
    if let Err(e) = spawned {
        error!("can't start worker for {persona:?}: {e}");
        app.dispatch_failed(persona, &e);
    }
}

fn ui(f: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // main
            Constraint::Length(3), // footer
        ])
        .split(f.area());

    let screen_name = match app.current_screen {
        Screen::Chat => "Chat",
        Screen::Ledger => "Ledger",
    };
    let header_text = format!(
        "Ledger Desk - {screen_name}   |   Ledger dir: {}",
        app.ledger_dir.display()
    );
    let header = Paragraph::new(header_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    match app.current_screen {
        Screen::Chat => draw_chat(f, chunks[1], app),
        Screen::Ledger => draw_ledger(f, chunks[1], app),
    }

    let footer_text = if let Some(ref msg) = app.error_message {
        format!("ERROR: {msg}")
    } else if let Some(ref msg) = app.success_message {
        format!("SUCCESS: {msg}")
    } else {
        match app.current_screen {
            Screen::Chat => "F1-F3: ask agent  |  F4: clear all  |  Tab: next area  |  PgUp/PgDn: scroll  |  F5: reload ledger  |  F6: ledger  |  Esc: quit".to_string(),
            Screen::Ledger => "↑/↓: scroll  |  Tab/F7: switch table  |  F5: reload  |  F6: chat  |  Esc: quit".to_string(),
        }
    };
    let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[2]);

    if let Some(ref notice) = app.notice {
        draw_notice(f, notice);
    }
}

fn draw_chat(f: &mut Frame<'_>, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let panes = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, PANE_COUNT as u32); PANE_COUNT])
        .split(columns[0]);

    for (idx, text) in app.panes.iter().enumerate() {
        let focused = idx == app.focused_pane;
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title(format!("Text Area {}", idx + 1))
            .borders(Borders::ALL)
            .border_style(border);
        let p = Paragraph::new(text.as_str())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((app.pane_scroll[idx], 0));
        f.render_widget(p, panes[idx]);
    }

    let mut lines = Vec::new();
    for slot in &app.agents {
        let key = format!("F{}  ", slot.persona.index() + 1);
        let (label_style, status) = if slot.busy {
            (Style::default().fg(Color::DarkGray), "  [waiting]")
        } else {
            (Style::default(), "")
        };
        lines.push(Line::from(vec![
            Span::styled(key, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(slot.persona.label(), label_style),
            Span::raw(status),
        ]));
        lines.push(Line::raw(format!(
            "    Text Area {} -> Text Area {}",
            slot.persona.source_pane() + 1,
            slot.persona.target_pane() + 1
        )));
    }
    lines.push(Line::from(vec![
        Span::styled("F4  ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("Clear All"),
    ]));

    let agents = Paragraph::new(lines)
        .block(Block::default().title("Agents").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(agents, columns[1]);
}

fn draw_ledger(f: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(ref state) = app.ledger else {
        let p = Paragraph::new("No ledger loaded. Press F5 to load.")
            .block(Block::default().title("Ledger").borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    };

    let status_height = 4 + state.skipped.len().min(4) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(status_height), Constraint::Min(0)])
        .split(area);

    f.render_widget(ledger_status(state), chunks[0]);

    match app.ledger_view {
        LedgerView::Voucher => draw_voucher_table(f, chunks[1], state, app.ledger_scroll),
        LedgerView::Accounts => draw_account_table(f, chunks[1], state, app.ledger_scroll),
    }
}

fn ledger_status(state: &LedgerState) -> Paragraph<'static> {
    let totals = state.table.totals;
    let source = match state.source {
        LedgerSource::Files(n) => format!("{n} file(s)"),
        LedgerSource::Sample => "sample voucher".to_string(),
    };
    let mut text = format!(
        "Source: {source}, {} entries   |   Loaded at {}\n",
        state.batch.len(),
        state.loaded_at.format("%Y-%m-%d %H:%M:%S")
    );
    text.push_str(&format!(
        "Debit total: {}   Credit total: {}   Status: {}\n",
        totals.debit_total,
        totals.credit_total,
        if totals.is_balanced() {
            "Balanced ✅".to_string()
        } else {
            match totals.difference() {
                Some(diff) => format!("Imbalanced ❌ (diff {diff:+})"),
                None => "Imbalanced ❌".to_string(),
            }
        }
    ));
    for skipped in state.skipped.iter().take(4) {
        text.push_str(&format!("Skipped: {}\n", skipped.reason));
    }
    Paragraph::new(text).block(Block::default().title("Ledger").borders(Borders::ALL))
}

fn draw_voucher_table(f: &mut Frame<'_>, area: Rect, state: &LedgerState, scroll: usize) {
    let last = state.table.rows.len().saturating_sub(1);
    let rows = state
        .table
        .rows
        .iter()
        .enumerate()
        .skip(scroll)
        .map(|(idx, row)| {
            let mut r = Row::new(row.cells().map(String::from));
            if idx == last {
                r = r.style(Style::default().add_modifier(Modifier::BOLD));
            }
            r
        });

    let widths = [
        Constraint::Length(6),
        Constraint::Length(24),
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(14),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["编号", "科目", "摘要", "借方金额", "贷方金额"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title("Voucher").borders(Borders::ALL));

    f.render_widget(table, area);
}

fn draw_account_table(f: &mut Frame<'_>, area: Rect, state: &LedgerState, scroll: usize) {
    let last = state.accounts.len().saturating_sub(1);
    let rows = state
        .accounts
        .iter()
        .enumerate()
        .skip(scroll)
        .map(|(idx, acc)| {
            let cells = vec![
                acc.account.clone(),
                acc.debit_total.to_string(),
                acc.credit_total.to_string(),
                acc.entry_count.to_string(),
            ];
            let mut row = Row::new(cells);
            if idx == last {
                row = row.style(Style::default().add_modifier(Modifier::BOLD));
            }
            row
        });

    let widths = [
        Constraint::Min(24),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["科目", "借方金额", "贷方金额", "笔数"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title("Accounts").borders(Borders::ALL));

    f.render_widget(table, area);
}

fn draw_notice(f: &mut Frame<'_>, notice: &str) {
    let area = centered_rect(40, 5, f.area());
    let p = Paragraph::new(format!("{notice}\n\n(press any key)"))
        .block(
            Block::default()
                .title("Input Error")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

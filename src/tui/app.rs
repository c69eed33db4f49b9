use super::worker::{Job, Update};
use crate::advisor::Persona;
use crate::error::LedgerError;
use crate::stat::{AccountRow, LedgerBatch, LedgerTable, LoadOutcome, SkippedFile, sample_voucher};
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::path::PathBuf;

pub const PANE_COUNT: usize = 4;
pub const FETCHING: &str = "Fetching response...\n";
pub const EMPTY_INPUT_NOTICE: &str = "Please enter a question!";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Ledger,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LedgerView {
    Voucher,
    Accounts,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerSource {
    Files(usize),
    Sample,
}

#[derive(Clone, Debug)]
pub struct AgentSlot {
    pub persona: Persona,
    /// Set while a request of this agent is in flight; its trigger is
    /// disabled until the answer has been applied.
    pub busy: bool,
}

#[derive(Clone, Debug)]
pub struct LedgerState {
    pub batch: LedgerBatch,
    pub table: LedgerTable,
    pub accounts: Vec<AccountRow>,
    pub source: LedgerSource,
    pub skipped: Vec<SkippedFile>,
    pub loaded_at: DateTime<Local>,
}

impl LedgerState {
    fn build(
        batch: LedgerBatch,
        source: LedgerSource,
        skipped: Vec<SkippedFile>,
    ) -> Result<Self, LedgerError> {
        Ok(Self {
            table: batch.table()?,
            accounts: batch.account_summary()?,
            batch,
            source,
            skipped,
            loaded_at: Local::now(),
        })
    }
}

pub struct App {
    pub panes: [String; PANE_COUNT],
    pub pane_scroll: [u16; PANE_COUNT],
    pub focused_pane: usize,
    pub agents: [AgentSlot; 3],
    pub current_screen: Screen,
    pub ledger_view: LedgerView,
    pub ledger_dir: PathBuf,
    pub ledger: Option<LedgerState>,
    pub ledger_scroll: usize,
    /// Blocking notice; while set, the next key press only dismisses it.
    pub notice: Option<String>,
    pub error_message: Option<String>,
    pub success_message: Option<String>,
    pub needs_reload: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(ledger_dir: PathBuf) -> Self {
        Self {
            panes: Default::default(),
            pane_scroll: [0; PANE_COUNT],
            focused_pane: 0,
            agents: Persona::ALL.map(|persona| AgentSlot {
                persona,
                busy: false,
            }),
            current_screen: Screen::Chat,
            ledger_view: LedgerView::Voucher,
            ledger_dir,
            ledger: None,
            ledger_scroll: 0,
            notice: None,
            error_message: None,
            success_message: None,
            needs_reload: true,
            should_quit: false,
        }
    }

    pub fn next_pane(&mut self) {
        self.focused_pane = (self.focused_pane + 1) % PANE_COUNT;
    }
    pub fn prev_pane(&mut self) {
        self.focused_pane = (self.focused_pane + PANE_COUNT - 1) % PANE_COUNT;
    }
    pub fn type_char(&mut self, c: char) {
        self.panes[self.focused_pane].push(c);
    }
    pub fn backspace(&mut self) {
        self.panes[self.focused_pane].pop();
    }
    pub fn scroll_pane(&mut self, delta: i32) {
        let scroll = &mut self.pane_scroll[self.focused_pane];
        *scroll = if delta < 0 {
            scroll.saturating_sub(delta.unsigned_abs() as u16)
        } else {
            scroll.saturating_add(delta as u16)
        };
    }
    pub fn scroll_ledger(&mut self, delta: i32) {
        let rows = match (&self.ledger, self.ledger_view) {
            (Some(state), LedgerView::Voucher) => state.table.rows.len(),
            (Some(state), LedgerView::Accounts) => state.accounts.len(),
            (None, _) => 0,
        };
        let next = self.ledger_scroll as i64 + delta as i64;
        self.ledger_scroll = next.clamp(0, rows.saturating_sub(1) as i64) as usize;
    }

    pub fn toggle_screen(&mut self) {
        self.current_screen = match self.current_screen {
            Screen::Chat => Screen::Ledger,
            Screen::Ledger => Screen::Chat,
        };
    }
    pub fn toggle_ledger_view(&mut self) {
        self.ledger_view = match self.ledger_view {
            LedgerView::Voucher => LedgerView::Accounts,
            LedgerView::Accounts => LedgerView::Voucher,
        };
        self.ledger_scroll = 0;
    }

    pub fn is_busy(&self, persona: Persona) -> bool {
        self.agents[persona.index()].busy
    }

    /// Accept a request for `persona` if its source pane has text and no
    /// request of the same agent is pending. On acceptance the agent is
    /// marked busy and its target pane shows the fetching placeholder.
    pub fn begin_request(&mut self, persona: Persona) -> Option<Job> {
        if self.is_busy(persona) {
            self.error_message = Some(format!("{} is still waiting for an answer", persona.label()));
            return None;
        }
        let question = self.panes[persona.source_pane()].trim().to_string();
        if question.is_empty() {
            self.notice = Some(EMPTY_INPUT_NOTICE.to_string());
            return None;
        }
        self.agents[persona.index()].busy = true;
        self.panes[persona.target_pane()] = FETCHING.to_string();
        self.pane_scroll[persona.target_pane()] = 0;
        Some(Job { persona, question })
    }

    /// The only place worker results reach display state.
    pub fn apply_update(&mut self, update: Update) {
        self.panes[update.persona.target_pane()] = update.text;
        self.agents[update.persona.index()].busy = false;
    }

    pub fn clear_all(&mut self) {
        for pane in self.panes.iter_mut() {
            pane.clear();
        }
        self.pane_scroll = [0; PANE_COUNT];
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn reload_ledger(&mut self) {
        let result = crate::stat::load_batch(&self.ledger_dir);
        self.apply_load(result);
    }

    pub fn apply_load(&mut self, result: Result<LoadOutcome, LedgerError>) {
        self.ledger_scroll = 0;
        self.ledger = None;
        match result {
            Ok(outcome) => {
                let files = outcome.files.len();
                let entries = outcome.batch.len();
                let skipped = outcome.skipped.len();
                let state =
                    LedgerState::build(outcome.batch, LedgerSource::Files(files), outcome.skipped);
                match state {
                    Ok(state) => self.ledger = Some(state),
                    Err(e) => {
                        self.error_message = Some(format!("Ledger load failed: {e}"));
                        return;
                    }
                }
                if skipped > 0 {
                    self.error_message = Some(format!(
                        "Loaded {entries} entries from {files} file(s); {skipped} file(s) skipped"
                    ));
                } else {
                    self.error_message = None;
                    self.success_message =
                        Some(format!("Loaded {entries} entries from {files} file(s)"));
                }
            }
            Err(LedgerError::NoData { dir, skipped }) => {
                self.error_message = Some(format!(
                    "No ledger data in {}; showing sample voucher",
                    dir.display()
                ));
                self.ledger = LedgerState::build(sample_voucher(), LedgerSource::Sample, skipped).ok();
            }
            Err(e) => {
                self.error_message = Some(format!("Ledger load failed: {e}"));
            }
        }
    }

    /// Route one key press. Returns the accepted job when the key asked an
    /// agent; the caller runs it and reports a failed start through
    /// [`App::dispatch_failed`].
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Job> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if self.notice.is_some() {
            self.dismiss_notice();
            return None;
        }

        use KeyCode::*;

        match key.code {
            Esc => self.should_quit = true,
            Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.should_quit = true,
            F(n @ 1..=3) => {
                let persona = Persona::from_index(n as usize - 1)?;
                self.error_message = None;
                self.success_message = None;
                return self.begin_request(persona);
            }
            F(4) => {
                self.clear_all();
                self.success_message = Some("All text areas cleared".to_string());
            }
            F(5) => self.needs_reload = true,
            F(6) => self.toggle_screen(),
            F(7) => self.toggle_ledger_view(),
            _ => match self.current_screen {
                Screen::Chat => self.handle_key_chat(key),
                Screen::Ledger => self.handle_key_ledger(key),
            },
        }
        None
    }

    fn handle_key_chat(&mut self, key: KeyEvent) {
        use KeyCode::*;

        match key.code {
            Tab => self.next_pane(),
            BackTab => self.prev_pane(),
            PageUp => self.scroll_pane(-3),
            PageDown => self.scroll_pane(3),
            Enter => self.type_char('\n'),
            Backspace => self.backspace(),
            Char(c) => self.type_char(c),
            _ => {}
        }
    }

    fn handle_key_ledger(&mut self, key: KeyEvent) {
        use KeyCode::*;

        match key.code {
            Up => self.scroll_ledger(-1),
            Down => self.scroll_ledger(1),
            PageUp => self.scroll_ledger(-10),
            PageDown => self.scroll_ledger(10),
            Tab => self.toggle_ledger_view(),
            _ => {}
        }
    }

    /// The worker for `persona` never started; show why and free the agent.
    pub fn dispatch_failed(&mut self, persona: Persona, err: &io::Error) {
        self.apply_update(Update {
            persona,
            text: format!("Error: {err}"),
        });
    }
}

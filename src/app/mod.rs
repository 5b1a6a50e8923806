use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use time::{OffsetDateTime, Time};

use crate::config::AppConfig;
use crate::schedule::Schedule;
use crate::ui;

pub mod input;
pub mod state;

pub use input::TextField;
pub use state::{AppState, EditBuffer, ExitReason, Flow, FormField, Mode, ModeKind};

pub struct App {
    pub config: Arc<AppConfig>,
    state: AppState,
    exit: Option<ExitReason>,
    poll_interval: Duration,
    clock_refresh: Duration,
}

impl App {
    pub fn new(config: Arc<AppConfig>, schedule: Schedule) -> Self {
        let state = AppState::new(schedule, config.nudge_minutes);
        Self {
            poll_interval: config.poll_interval(),
            clock_refresh: config.clock_refresh(),
            config,
            state,
            exit: None,
        }
    }

    /// Takes over the terminal until the session ends and reports how it ended.
    pub fn run(&mut self) -> Result<ExitReason> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<ExitReason> {
        self.state.on_tick(wall_clock_now());
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| ui::draw_app(frame, &self.state, &self.config))
                .context("rendering frame")?;

            if let Some(reason) = self.exit {
                tracing::info!(?reason, "session ended");
                return Ok(reason);
            }

            let until_tick = self
                .clock_refresh
                .checked_sub(last_tick.elapsed())
                .unwrap_or(Duration::ZERO);
            let timeout = until_tick.min(self.poll_interval);

            if event::poll(timeout).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {
                        // next draw picks up the new width
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.clock_refresh {
                self.state.on_tick(wall_clock_now());
                last_tick = Instant::now();
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if let Flow::Exit(reason) = self.state.handle_key(key) {
            self.exit = Some(reason);
        }
    }
}

/// Local wall-clock time of day, falling back to UTC when the offset can't
/// be determined.
pub fn wall_clock_now() -> Time {
    OffsetDateTime::now_local()
        .unwrap_or_else(|err| {
            tracing::debug!(%err, "local offset unavailable, using UTC");
            OffsetDateTime::now_utc()
        })
        .time()
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("leaving alternate screen")?;
    terminal.show_cursor().context("showing cursor")?;
    Ok(())
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;
use time::Time;

use crate::app::input::TextField;
use crate::schedule::{active_index, Schedule, Timeblock};
use crate::timeofday::{format_time_of_day, parse_time_of_day, shift_time_of_day, TimeParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Start,
    End,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Name, FormField::Start, FormField::End];

    pub fn next(self) -> Self {
        match self {
            FormField::Name => FormField::Start,
            FormField::Start => FormField::End,
            FormField::End => FormField::Name,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormField::Name => FormField::End,
            FormField::Start => FormField::Name,
            FormField::End => FormField::Start,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("Task name cannot be empty")]
    EmptyName,
    #[error("Start time: {0}")]
    Start(TimeParseError),
    #[error("End time: {0}")]
    End(TimeParseError),
}

/// The three-field form shared by the add and edit flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    name: TextField,
    start: TextField,
    end: TextField,
    focused: FormField,
}

impl EditBuffer {
    pub fn empty() -> Self {
        Self {
            name: TextField::task_name(),
            start: TextField::start_time(),
            end: TextField::end_time(),
            focused: FormField::Name,
        }
    }

    pub fn from_block(block: &Timeblock) -> Self {
        let mut buffer = Self::empty();
        buffer.name.set_value(&block.task);
        buffer.start.set_value(&format_time_of_day(block.start));
        buffer.end.set_value(&format_time_of_day(block.end));
        buffer
    }

    pub fn focused(&self) -> FormField {
        self.focused
    }

    pub fn field(&self, field: FormField) -> &TextField {
        match field {
            FormField::Name => &self.name,
            FormField::Start => &self.start,
            FormField::End => &self.end,
        }
    }

    fn focused_field_mut(&mut self) -> &mut TextField {
        match self.focused {
            FormField::Name => &mut self.name,
            FormField::Start => &mut self.start,
            FormField::End => &mut self.end,
        }
    }

    /// Builds the block the form describes, or the first reason it can't.
    pub fn to_timeblock(&self) -> Result<Timeblock, CommitError> {
        if self.name.value().trim().is_empty() {
            return Err(CommitError::EmptyName);
        }
        let start = parse_time_of_day(self.start.value()).map_err(CommitError::Start)?;
        let end = parse_time_of_day(self.end.value()).map_err(CommitError::End)?;
        Ok(Timeblock::new(self.name.value(), start, end))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Browsing,
    Adding(EditBuffer),
    Editing { index: usize, buffer: EditBuffer },
    ConfirmingShutdown(TextField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Browsing,
    Adding,
    Editing,
    ConfirmingShutdown,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Browsing => ModeKind::Browsing,
            Mode::Adding(_) => ModeKind::Adding,
            Mode::Editing { .. } => ModeKind::Editing,
            Mode::ConfirmingShutdown(_) => ModeKind::ConfirmingShutdown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    Interrupted,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(ExitReason),
}

const DELETE_CHORD: char = 'd';

#[derive(Debug, Clone)]
pub struct AppState {
    schedule: Schedule,
    mode: Mode,
    cursor: usize,
    pending_chord: Option<char>,
    active: Option<usize>,
    clock: Option<Time>,
    status_message: Option<String>,
    nudge_minutes: i64,
}

impl AppState {
    pub fn new(schedule: Schedule, nudge_minutes: u32) -> Self {
        Self {
            schedule,
            mode: Mode::Browsing,
            cursor: 0,
            pending_chord: None,
            active: None,
            clock: None,
            status_message: None,
            nudge_minutes: i64::from(nudge_minutes),
        }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn pending_chord(&self) -> Option<char> {
        self.pending_chord
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Samples the wall clock. Only reads the schedule, so it is safe to call
    /// between any two keystrokes.
    pub fn on_tick(&mut self, now: Time) {
        self.clock = Some(now);
        let previous = self.active;
        self.refresh_active();
        if previous != self.active {
            tracing::debug!(?previous, active = ?self.active, "active timeblock changed");
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Flow::Exit(ExitReason::Interrupted);
        }

        self.status_message = None;
        let pending = self.pending_chord.take();
        let previous = self.mode.kind();
        let (next, flow) = match std::mem::take(&mut self.mode) {
            Mode::Browsing => self.handle_browsing_key(key, pending),
            Mode::Adding(buffer) => self.handle_adding_key(buffer, key),
            Mode::Editing { index, buffer } => self.handle_editing_key(index, buffer, key),
            Mode::ConfirmingShutdown(field) => handle_shutdown_key(field, key),
        };
        if next.kind() != previous {
            tracing::debug!(from = ?previous, to = ?next.kind(), "mode transition");
        }
        self.mode = next;
        flow
    }

    fn handle_browsing_key(&mut self, key: KeyEvent, pending: Option<char>) -> (Mode, Flow) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('a') => self.nudge_selected(self.nudge_minutes),
                KeyCode::Char('x') => self.nudge_selected(-self.nudge_minutes),
                _ => {}
            }
            return (Mode::Browsing, Flow::Continue);
        }

        let mode = match key.code {
            KeyCode::Char('q') if is_plain(&key) => {
                return (Mode::Browsing, Flow::Exit(ExitReason::Quit));
            }
            KeyCode::Char('a') if is_plain(&key) => Mode::Adding(EditBuffer::empty()),
            KeyCode::Char('e') if is_plain(&key) => match self.schedule.get(self.cursor) {
                Some(block) => Mode::Editing {
                    index: self.cursor,
                    buffer: EditBuffer::from_block(block),
                },
                None => Mode::Browsing,
            },
            KeyCode::Char('s') if is_plain(&key) => {
                Mode::ConfirmingShutdown(TextField::shutdown_phrase())
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                Mode::Browsing
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.schedule.len() {
                    self.cursor += 1;
                }
                Mode::Browsing
            }
            KeyCode::Char(DELETE_CHORD) if is_plain(&key) => {
                if pending == Some(DELETE_CHORD) {
                    self.delete_selected();
                } else {
                    self.pending_chord = Some(DELETE_CHORD);
                }
                Mode::Browsing
            }
            _ => Mode::Browsing,
        };
        (mode, Flow::Continue)
    }

    fn handle_adding_key(&mut self, mut buffer: EditBuffer, key: KeyEvent) -> (Mode, Flow) {
        let mode = match key.code {
            KeyCode::Esc => Mode::Browsing,
            KeyCode::Char('q') if is_plain(&key) => Mode::Browsing,
            KeyCode::Enter => match buffer.to_timeblock() {
                Ok(block) => {
                    tracing::info!(task = %block.task, range = %block.range_label(), "timeblock added");
                    self.schedule.append(block);
                    self.schedule.sort_by_start();
                    self.refresh_active();
                    Mode::Browsing
                }
                Err(err) => {
                    tracing::warn!(%err, "rejected new timeblock");
                    self.status_message = Some(err.to_string());
                    Mode::Adding(buffer)
                }
            },
            _ => {
                apply_form_key(&mut buffer, key);
                Mode::Adding(buffer)
            }
        };
        (mode, Flow::Continue)
    }

    fn handle_editing_key(
        &mut self,
        index: usize,
        mut buffer: EditBuffer,
        key: KeyEvent,
    ) -> (Mode, Flow) {
        let mode = match key.code {
            KeyCode::Esc => Mode::Browsing,
            KeyCode::Enter => match buffer.to_timeblock() {
                Ok(block) => {
                    self.commit_edit(index, block);
                    Mode::Browsing
                }
                Err(err) => {
                    tracing::warn!(%err, index, "rejected timeblock edit");
                    self.status_message = Some(err.to_string());
                    Mode::Editing { index, buffer }
                }
            },
            _ => {
                apply_form_key(&mut buffer, key);
                Mode::Editing { index, buffer }
            }
        };
        (mode, Flow::Continue)
    }

    fn commit_edit(&mut self, index: usize, block: Timeblock) {
        let range = block.range_label();
        let Some(previous) = self.schedule.replace_at(index, block) else {
            tracing::warn!(index, len = self.schedule.len(), "edit target vanished; dropping edit");
            return;
        };
        tracing::info!(index, was = %previous.task, %range, "timeblock edited");
        self.cursor = self.schedule.sort_tracking(index);
        self.refresh_active();
    }

    fn delete_selected(&mut self) {
        if self.cursor >= self.schedule.len() {
            return;
        }
        let removed = self.schedule.remove_at(self.cursor);
        tracing::info!(index = self.cursor, task = %removed.task, "timeblock deleted");
        self.schedule.sort_by_start();
        self.cursor = self.cursor.min(self.schedule.len().saturating_sub(1));
        self.refresh_active();
    }

    fn nudge_selected(&mut self, minutes: i64) {
        let Some(block) = self.schedule.get_mut(self.cursor) else {
            return;
        };
        block.start = shift_time_of_day(block.start, minutes);
        block.end = shift_time_of_day(block.end, minutes);
        tracing::debug!(minutes, range = %block.range_label(), "timeblock nudged");
        self.cursor = self.schedule.sort_tracking(self.cursor);
        self.refresh_active();
    }

    fn refresh_active(&mut self) {
        self.active = self
            .clock
            .and_then(|now| active_index(self.schedule.blocks(), now));
    }
}

fn handle_shutdown_key(mut field: TextField, key: KeyEvent) -> (Mode, Flow) {
    match key.code {
        KeyCode::Esc => (Mode::Browsing, Flow::Continue),
        KeyCode::Enter => {
            tracing::info!(phrase = field.value(), "shutdown confirmed");
            (
                Mode::ConfirmingShutdown(field),
                Flow::Exit(ExitReason::Shutdown),
            )
        }
        KeyCode::Backspace => {
            field.backspace();
            (Mode::ConfirmingShutdown(field), Flow::Continue)
        }
        KeyCode::Char(ch) if is_plain(&key) => {
            field.insert_char(ch);
            (Mode::ConfirmingShutdown(field), Flow::Continue)
        }
        _ => (Mode::ConfirmingShutdown(field), Flow::Continue),
    }
}

fn apply_form_key(buffer: &mut EditBuffer, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => buffer.focused = buffer.focused.next(),
        KeyCode::BackTab => buffer.focused = buffer.focused.previous(),
        KeyCode::Backspace => {
            buffer.focused_field_mut().backspace();
        }
        KeyCode::Char(ch) if is_plain(&key) => {
            buffer.focused_field_mut().insert_char(ch);
        }
        _ => {}
    }
}

fn is_plain(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

use std::ops::Range;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::state::{AppState, EditBuffer, FormField, Mode};
use crate::app::TextField;
use crate::config::Palette;
use crate::schedule::{Schedule, Timeblock};

const MIN_INNER_WIDTH: usize = 18;
/// Left border, two padding cells, right border.
const BLOCK_CHROME: usize = 4;
const CARET: char = '▌';
const NOW_MARKER: &str = " ◀ now";

pub const BROWSING_HINT: &str = " [ a: Add new time block | e: Edit time block | dd: Delete time block | j: Down | k: Up | s: shutdown | q: Quit ]";
pub const FORM_HINT: &str = " [ tab: Cycle Focus | enter: Save | esc: Cancel ]";
pub const SHUTDOWN_HINT: &str = " [ enter: SHUTDOWN | esc: Cancel ]";
pub const SHUTDOWN_PROMPT: &str = "Enter SHUTDOWN COMPLETE to end the day:";

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub palette: Palette,
    pub minutes_per_line: u32,
    /// Columns available for the block column.
    pub width: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockVisual {
    Selected,
    Active,
    Plain,
}

/// Cursor wins over the time highlight when both point at the same block.
pub fn block_visual(index: usize, cursor: Option<usize>, active: Option<usize>) -> BlockVisual {
    if cursor == Some(index) {
        BlockVisual::Selected
    } else if active == Some(index) {
        BlockVisual::Active
    } else {
        BlockVisual::Plain
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPosition {
    Only,
    First,
    Middle,
    Last,
}

impl BlockPosition {
    pub fn from_edges(is_first: bool, is_last: bool) -> Self {
        match (is_first, is_last) {
            (true, true) => BlockPosition::Only,
            (true, false) => BlockPosition::First,
            (false, false) => BlockPosition::Middle,
            (false, true) => BlockPosition::Last,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub left: &'static str,
    pub fill: &'static str,
    pub right: &'static str,
}

const SIDE: &str = "│";

/// Horizontal edges for one block. Only the top edge of a following block
/// separates two neighbours, so a block never draws a bottom edge unless it
/// closes the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeamlessBorder {
    pub top: Edge,
    pub bottom: Option<Edge>,
}

impl SeamlessBorder {
    pub fn for_position(position: BlockPosition) -> Self {
        let open = Edge {
            left: "┌",
            fill: "─",
            right: "┐",
        };
        let seam = Edge {
            left: "├",
            fill: "─",
            right: "┤",
        };
        let close = Edge {
            left: "└",
            fill: "─",
            right: "┘",
        };
        match position {
            BlockPosition::Only => Self {
                top: open,
                bottom: Some(close),
            },
            BlockPosition::First => Self {
                top: open,
                bottom: None,
            },
            BlockPosition::Middle => Self {
                top: seam,
                bottom: None,
            },
            BlockPosition::Last => Self {
                top: seam,
                bottom: Some(close),
            },
        }
    }
}

/// Body rows for a block: one per `minutes_per_line` minutes, never fewer
/// than one, inverted blocks included.
pub fn block_height(duration_minutes: i64, minutes_per_line: u32) -> usize {
    let per_line = i64::from(minutes_per_line.max(1));
    usize::try_from(duration_minutes / per_line)
        .unwrap_or(0)
        .max(1)
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleFrame {
    pub blocks: Vec<Line<'static>>,
    pub footer: Vec<Line<'static>>,
    /// Rows of `blocks` covered by the cursor-selected block.
    pub cursor_rows: Option<Range<usize>>,
}

/// Builds the block column and footer for one frame. Pure: the `ui` module
/// only decides where the lines land.
pub fn render(state: &AppState, options: &RenderOptions) -> ScheduleFrame {
    let (blocks, cursor_rows) = render_blocks(
        state.schedule(),
        Some(state.cursor()),
        state.active_index(),
        options,
    );
    let mut footer = render_footer(state.mode(), &options.palette);
    if let Some(message) = state.status_message() {
        footer.push(Line::from(Span::styled(
            format!(" {message}"),
            options.palette.error,
        )));
    }
    ScheduleFrame {
        blocks,
        footer,
        cursor_rows,
    }
}

pub fn render_blocks(
    schedule: &Schedule,
    cursor: Option<usize>,
    active: Option<usize>,
    options: &RenderOptions,
) -> (Vec<Line<'static>>, Option<Range<usize>>) {
    let palette = &options.palette;
    if schedule.is_empty() {
        return (
            vec![Line::from(Span::styled(
                "No timeblocks yet. Press `a` to add one.",
                palette.hint,
            ))],
            None,
        );
    }

    let bodies: Vec<Vec<String>> = schedule
        .iter()
        .map(|block| block_rows(block, options.minutes_per_line))
        .collect();
    let inner = inner_width(&bodies, options.width);

    let mut lines = Vec::new();
    let mut cursor_rows = None;
    let last = schedule.len() - 1;
    for (index, rows) in bodies.into_iter().enumerate() {
        let border = SeamlessBorder::for_position(BlockPosition::from_edges(index == 0, index == last));
        let visual = block_visual(index, cursor, active);
        let style = match visual {
            BlockVisual::Selected => palette.selected,
            BlockVisual::Active => palette.active,
            BlockVisual::Plain => palette.plain,
        };
        let first_row = lines.len();

        lines.push(edge_line(border.top, inner, palette.border));
        for (row, content) in rows.into_iter().enumerate() {
            let mut spans = vec![
                Span::styled(SIDE, palette.border),
                Span::styled(format!(" {} ", fit(&content, inner)), style),
                Span::styled(SIDE, palette.border),
            ];
            if row == 0 && active == Some(index) {
                spans.push(Span::styled(NOW_MARKER, palette.active));
            }
            lines.push(Line::from(spans));
        }
        if let Some(bottom) = border.bottom {
            lines.push(edge_line(bottom, inner, palette.border));
        }

        if visual == BlockVisual::Selected {
            cursor_rows = Some(first_row..lines.len());
        }
    }
    (lines, cursor_rows)
}

fn block_rows(block: &Timeblock, minutes_per_line: u32) -> Vec<String> {
    let height = block_height(block.duration_minutes(), minutes_per_line);
    let range = block.range_label();
    if height == 1 {
        return vec![format!("{range}  {}", block.task)];
    }
    let mut rows = Vec::with_capacity(height);
    rows.push(range);
    rows.push(block.task.clone());
    rows.resize(height, String::new());
    rows
}

fn inner_width(bodies: &[Vec<String>], available: u16) -> usize {
    let widest = bodies
        .iter()
        .flatten()
        .map(|row| row.width())
        .max()
        .unwrap_or(0)
        .max(MIN_INNER_WIDTH);
    let ceiling = usize::from(available).saturating_sub(BLOCK_CHROME).max(1);
    widest.min(ceiling)
}

fn edge_line(edge: Edge, inner: usize, style: Style) -> Line<'static> {
    Line::from(Span::styled(
        format!("{}{}{}", edge.left, edge.fill.repeat(inner + 2), edge.right),
        style,
    ))
}

/// Pads or truncates `text` to exactly `width` terminal cells.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        let mut out = text.to_owned();
        out.push_str(&" ".repeat(width - text.width()));
        return out;
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn render_footer(mode: &Mode, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    match mode {
        Mode::Browsing => {
            lines.push(Line::from(Span::styled(BROWSING_HINT, palette.hint)));
        }
        Mode::Adding(buffer) => {
            lines.extend(form_lines("Add a time block:", buffer, palette));
        }
        Mode::Editing { buffer, .. } => {
            lines.extend(form_lines("Edit a time block:", buffer, palette));
        }
        Mode::ConfirmingShutdown(field) => {
            lines.push(Line::from(SHUTDOWN_PROMPT));
            lines.push(Line::from(field_spans("  ", field, true, palette)));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(SHUTDOWN_HINT, palette.hint)));
        }
    }
    lines
}

fn form_lines(title: &'static str, buffer: &EditBuffer, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(title)];
    for field in FormField::ALL {
        let focused = buffer.focused() == field;
        let indicator = if focused { "  > " } else { "    " };
        lines.push(Line::from(field_spans(
            indicator,
            buffer.field(field),
            focused,
            palette,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(FORM_HINT, palette.hint)));
    lines
}

fn field_spans(
    indicator: &'static str,
    field: &TextField,
    focused: bool,
    palette: &Palette,
) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw(indicator)];
    if field.is_empty() {
        if focused {
            spans.push(Span::raw(CARET.to_string()));
        }
        spans.push(Span::styled(field.placeholder(), palette.placeholder));
    } else {
        let mut value = field.value().to_owned();
        if focused {
            value.push(CARET);
        }
        spans.push(Span::raw(value));
    }
    spans
}

/// Flattens styled lines to text, one line per row, trailing spaces trimmed.
pub fn to_plain_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
            text.trim_end().to_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use time::macros::time;

    fn options() -> RenderOptions {
        RenderOptions {
            palette: Palette::default(),
            minutes_per_line: 30,
            width: 80,
        }
    }

    fn body_rows(lines: &[Line<'_>]) -> usize {
        lines
            .iter()
            .filter(|line| line.spans.first().is_some_and(|span| span.content == SIDE))
            .count()
    }

    fn single(block: Timeblock) -> Vec<Line<'static>> {
        render_blocks(&Schedule::new(vec![block]), None, None, &options()).0
    }

    #[test]
    fn height_follows_thirty_minute_scale_with_floor_of_one() {
        assert_eq!(block_height(90, 30), 3);
        assert_eq!(block_height(10, 30), 1);
        assert_eq!(block_height(59, 30), 1);
        assert_eq!(block_height(0, 30), 1);
        assert_eq!(block_height(-60, 30), 1);
        assert_eq!(block_height(180, 0), 180);
    }

    #[test]
    fn ninety_minute_block_renders_three_rows() {
        let lines = single(Timeblock::new("Deep Work", time!(7:00), time!(8:30)));
        assert_eq!(body_rows(&lines), 3);
        let text = to_plain_text(&lines);
        assert!(text.contains("07:00-08:30"));
        assert!(text.contains("Deep Work"));
    }

    #[test]
    fn ten_minute_block_renders_one_row_with_range_and_task() {
        let lines = single(Timeblock::new("Stretch", time!(9:00), time!(9:10)));
        assert_eq!(body_rows(&lines), 1);
        assert!(to_plain_text(&lines).contains("09:00-09:10  Stretch"));
    }

    #[test]
    fn adjacent_blocks_share_a_single_seam() {
        let schedule = Schedule::new(vec![
            Timeblock::new("A", time!(7:00), time!(8:30)),
            Timeblock::new("B", time!(8:30), time!(8:40)),
            Timeblock::new("C", time!(8:40), time!(9:40)),
        ]);
        let (lines, _) = render_blocks(&schedule, None, None, &options());
        let text = to_plain_text(&lines);
        let rows: Vec<&str> = text.lines().collect();
        let bar = "─".repeat(MIN_INNER_WIDTH + 2);
        assert_eq!(rows[0], format!("┌{bar}┐"));
        assert_eq!(rows[1], format!("│ {:<18} │", "07:00-08:30"));
        assert_eq!(rows[4], format!("├{bar}┤"));
        assert_eq!(rows[5], format!("│ {:<18} │", "08:30-08:40  B"));
        assert_eq!(rows[6], format!("├{bar}┤"));
        assert_eq!(rows.last().copied(), Some(format!("└{bar}┘").as_str()));
        assert_eq!(rows.len(), 1 + 3 + 1 + 1 + 1 + 2 + 1);
    }

    #[test]
    fn border_choice_depends_only_on_position() {
        assert_eq!(BlockPosition::from_edges(true, true), BlockPosition::Only);
        assert_eq!(BlockPosition::from_edges(true, false), BlockPosition::First);
        assert_eq!(BlockPosition::from_edges(false, false), BlockPosition::Middle);
        assert_eq!(BlockPosition::from_edges(false, true), BlockPosition::Last);
        assert!(SeamlessBorder::for_position(BlockPosition::First).bottom.is_none());
        assert!(SeamlessBorder::for_position(BlockPosition::Middle).bottom.is_none());
        assert_eq!(
            SeamlessBorder::for_position(BlockPosition::Middle).top,
            SeamlessBorder::for_position(BlockPosition::Last).top
        );
        assert!(SeamlessBorder::for_position(BlockPosition::Only).bottom.is_some());
    }

    #[test]
    fn cursor_takes_precedence_over_active_highlight() {
        assert_eq!(block_visual(1, Some(1), Some(1)), BlockVisual::Selected);
        assert_eq!(block_visual(1, Some(0), Some(1)), BlockVisual::Active);
        assert_eq!(block_visual(2, Some(0), Some(1)), BlockVisual::Plain);
        assert_eq!(block_visual(0, None, None), BlockVisual::Plain);
    }

    #[test]
    fn styles_follow_visual_state() {
        let palette = Palette::default();
        let schedule = Schedule::new(vec![
            Timeblock::new("A", time!(7:00), time!(7:30)),
            Timeblock::new("B", time!(7:30), time!(8:00)),
            Timeblock::new("C", time!(8:00), time!(8:30)),
        ]);
        let (lines, cursor_rows) = render_blocks(&schedule, Some(0), Some(1), &options());
        let body_style = |row: usize| lines[row].spans[1].style;
        assert_eq!(body_style(1), palette.selected);
        assert_eq!(body_style(3), palette.active);
        assert_eq!(body_style(5), palette.plain);
        assert_eq!(cursor_rows, Some(0..2));
        assert!(to_plain_text(&lines[3..4]).ends_with("◀ now"));
    }

    #[test]
    fn long_task_is_truncated_to_available_width() {
        let schedule = Schedule::new(vec![Timeblock::new(
            "An extremely long task name that cannot fit",
            time!(7:00),
            time!(8:00),
        )]);
        let narrow = RenderOptions {
            width: 24,
            ..options()
        };
        let (lines, _) = render_blocks(&schedule, None, None, &narrow);
        for row in to_plain_text(&lines).lines() {
            assert!(row.width() <= 24, "{row:?}");
        }
        assert!(to_plain_text(&lines).contains('…'));
    }

    #[test]
    fn empty_schedule_renders_a_hint() {
        let (lines, cursor_rows) = render_blocks(&Schedule::default(), Some(0), None, &options());
        assert_eq!(lines.len(), 1);
        assert!(cursor_rows.is_none());
    }

    #[test]
    fn footer_matches_mode() {
        let mut state = AppState::new(crate::schedule::default_schedule(), 15);
        let footer = |state: &AppState| to_plain_text(&render(state, &options()).footer);
        assert!(footer(&state).contains("dd: Delete time block"));

        state.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        let add = footer(&state);
        assert!(add.contains("Add a time block:"));
        assert!(add.contains("  > ▌Task Name"));
        assert!(add.contains("    Start Time (HH:mm)"));

        state.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        state.handle_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE));
        let edit = footer(&state);
        assert!(edit.contains("Edit a time block:"));
        assert!(edit.contains("  > Deep Work▌"));
        assert!(edit.contains("    07:00"));

        state.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        state.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE));
        let shutdown = footer(&state);
        assert!(shutdown.contains(SHUTDOWN_PROMPT));
        assert!(shutdown.contains("enter: SHUTDOWN"));
    }

    #[test]
    fn rejected_commit_shows_status_line() {
        let mut state = AppState::new(Schedule::default(), 15);
        state.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        state.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        let footer = to_plain_text(&render(&state, &options()).footer);
        assert!(footer.ends_with("Task name cannot be empty"));
    }
}

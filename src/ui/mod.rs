use std::ops::Range;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::config::AppConfig;
use crate::render::{render, RenderOptions};

pub fn draw_app(frame: &mut Frame, state: &AppState, config: &AppConfig) {
    let area = frame.size();
    let options = RenderOptions {
        palette: config.palette(),
        minutes_per_line: config.minutes_per_line,
        width: area.width,
    };
    let rendered = render(state, &options);

    let footer_height = u16::try_from(rendered.footer.len())
        .unwrap_or(u16::MAX)
        .min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(footer_height)])
        .split(area);

    let offset = scroll_offset(rendered.cursor_rows.as_ref(), vertical[0]);
    let blocks = Paragraph::new(rendered.blocks).scroll((offset, 0));
    frame.render_widget(blocks, vertical[0]);
    frame.render_widget(Paragraph::new(rendered.footer), vertical[1]);
}

/// Smallest vertical scroll that keeps the selected block on screen, top
/// edge first when the block is taller than the viewport.
fn scroll_offset(cursor_rows: Option<&Range<usize>>, area: Rect) -> u16 {
    let Some(rows) = cursor_rows else {
        return 0;
    };
    let height = usize::from(area.height);
    let offset = rows.end.saturating_sub(height).min(rows.start);
    u16::try_from(offset).unwrap_or(u16::MAX)
}

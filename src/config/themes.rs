use ratatui::style::{Color, Modifier, Style};

use super::ThemeName;

/// Styles for the three block states plus the chrome around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub plain: Style,
    pub active: Style,
    pub selected: Style,
    pub border: Style,
    pub hint: Style,
    pub placeholder: Style,
    pub error: Style,
}

impl Palette {
    pub fn for_theme(theme: &ThemeName) -> Self {
        match theme {
            ThemeName::Dark => Self {
                plain: Style::default().fg(Color::Indexed(241)),
                active: Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                selected: Style::default()
                    .fg(Color::Indexed(15))
                    .add_modifier(Modifier::BOLD),
                border: Style::default().fg(Color::Rgb(0xAA, 0xAA, 0xAA)),
                hint: Style::default().fg(Color::Gray),
                placeholder: Style::default().fg(Color::DarkGray),
                error: Style::default().fg(Color::Red),
            },
            ThemeName::Light => Self {
                plain: Style::default().fg(Color::Indexed(245)),
                active: Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
                selected: Style::default()
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
                border: Style::default().fg(Color::Rgb(0x66, 0x66, 0x66)),
                hint: Style::default().fg(Color::DarkGray),
                placeholder: Style::default().fg(Color::Gray),
                error: Style::default().fg(Color::Red),
            },
            ThemeName::HighContrast => Self {
                plain: Style::default().fg(Color::White),
                active: Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                selected: Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD),
                border: Style::default().fg(Color::White),
                hint: Style::default().fg(Color::White),
                placeholder: Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::ITALIC),
                error: Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            },
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::for_theme(&ThemeName::default())
    }
}

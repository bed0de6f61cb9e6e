//! Style tokens — neon accents on the terminal's dark background.

use ratatui::style::{Color, Modifier, Style};

pub fn accent() -> Style {
    Style::default().fg(Color::Cyan)
}

pub fn positive() -> Style {
    Style::default().fg(Color::Green)
}

pub fn negative() -> Style {
    Style::default().fg(Color::Red)
}

pub fn warning() -> Style {
    Style::default().fg(Color::Yellow)
}

pub fn muted() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent().add_modifier(Modifier::BOLD)
    } else {
        muted()
    }
}

pub fn table_header() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn cursor_line() -> Style {
    accent().add_modifier(Modifier::REVERSED)
}

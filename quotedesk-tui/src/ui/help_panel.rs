//! Help panel — keyboard reference.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::AppState;
use crate::theme;

const HELP: &[(&str, &str)] = &[
    ("Tab / Shift-Tab", "cycle panels"),
    ("1-4", "jump to panel (outside the query form)"),
    ("q / Ctrl-C", "quit"),
    ("", ""),
    ("Query panel", ""),
    ("Up/Down", "switch field"),
    ("Enter", "fetch all sections for the symbol"),
    ("", ""),
    ("Sections panel", ""),
    ("j/k", "move cursor"),
    ("Enter", "open the table view"),
    ("s", "export the section as CSV"),
    ("", ""),
    ("Table panel", ""),
    ("j/k/h/l", "scroll rows and columns"),
    ("PgUp/PgDn, g/G", "page / jump"),
    ("[ / ]", "previous / next option expiry"),
    ("s", "export as CSV"),
    ("Esc", "back to sections"),
];

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(key, what)| {
            if what.is_empty() && !key.is_empty() {
                Line::from(Span::styled(*key, theme::table_header()))
            } else {
                Line::from(vec![
                    Span::styled(format!("{key:<18}"), theme::accent()),
                    Span::styled(*what, theme::muted()),
                ])
            }
        })
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}

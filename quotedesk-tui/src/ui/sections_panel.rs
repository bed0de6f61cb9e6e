//! Section browser: every named section with its classification marker.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use quotedesk_core::{Outcome, Section};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        "[j/k] move  [Enter] view  [s] export CSV",
        theme::muted(),
    )));
    lines.push(Line::from(""));

    for (i, &section) in Section::all().iter().enumerate() {
        let is_cursor = i == app.cursor;
        let outcome = app.outcome_for(section);

        let (marker, marker_style) = match outcome {
            Some(Outcome::Present(t)) => (format!("● {:>5} rows", t.row_count()), theme::positive()),
            Some(Outcome::Empty) => ("○ empty".to_string(), theme::warning()),
            Some(Outcome::Missing) => ("○ n/a".to_string(), theme::muted()),
            Some(Outcome::Unconvertible(_)) => ("! shape".to_string(), theme::warning()),
            Some(Outcome::Error(_)) => ("! error".to_string(), theme::negative()),
            None => ("·".to_string(), theme::muted()),
        };

        let label_style = if is_cursor {
            theme::cursor_line()
        } else if matches!(outcome, Some(Outcome::Present(_))) {
            theme::accent()
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{:<28}", section.label()), label_style),
            Span::styled(marker, marker_style),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}

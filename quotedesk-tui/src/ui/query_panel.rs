//! Query form: symbol, start date, end date, fetch hint.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, Panel, QueryField};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let editing = app.active_panel == Panel::Query;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        "Input Parameters",
        theme::table_header(),
    )));
    lines.push(Line::from(""));

    field(&mut lines, "Symbol", &app.query.symbol, editing && app.query.focus == QueryField::Symbol);
    lines.push(Line::from(Span::styled(
        "  .NS = NSE, .BO = BSE",
        theme::muted(),
    )));
    field(
        &mut lines,
        "Start ",
        &app.query.start_input,
        editing && app.query.focus == QueryField::Start,
    );
    field(
        &mut lines,
        "End   ",
        &app.query.end_input,
        editing && app.query.focus == QueryField::End,
    );

    lines.push(Line::from(""));
    if app.fetch_in_progress {
        lines.push(Line::from(Span::styled(
            "Fetching...",
            theme::warning(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "[Enter] fetch  [Up/Down] field",
            theme::muted(),
        )));
    }

    if let Some(symbol) = app.fetched_symbol() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Loaded: ", theme::muted()),
            Span::styled(symbol, theme::accent()),
        ]));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn field(lines: &mut Vec<Line>, label: &str, value: &str, focused: bool) {
    let value_style = if focused {
        theme::cursor_line()
    } else {
        theme::accent()
    };
    let marker = if focused { "> " } else { "  " };
    lines.push(Line::from(vec![
        Span::styled(format!("{marker}{label} "), theme::muted()),
        Span::styled(value.to_string(), value_style),
        Span::styled(if focused { "_" } else { "" }, theme::accent()),
    ]));
}

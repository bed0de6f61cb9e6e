//! Table viewer: the selected section rendered in full, or its single
//! warning line when there is nothing tabular to show.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell as UiCell, Paragraph, Row, Table as UiTable};
use ratatui::Frame;

use quotedesk_core::{Outcome, Section, Table};

use crate::app::{AppState, TableScroll};
use crate::theme;

const MAX_COL_WIDTH: usize = 24;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let section = app.selected_section();

    if section == Section::OptionChain {
        render_options(f, area, app);
        return;
    }

    match app.outcome_for(section) {
        None => {
            let hint = if app.fetch_in_progress {
                "Fetching..."
            } else {
                "No data yet. Press [Enter] in the Query panel to fetch."
            };
            f.render_widget(
                Paragraph::new(Span::styled(hint, theme::muted())),
                area,
            );
        }
        Some(Outcome::Present(table)) => render_table(f, area, table, app.scroll, section.label()),
        Some(outcome) => render_message(f, area, outcome, section.label()),
    }
}

fn render_message(f: &mut Frame, area: Rect, outcome: &Outcome, label: &str) {
    let style = match outcome {
        Outcome::Error(_) => theme::negative(),
        _ => theme::warning(),
    };
    let msg = outcome
        .message(label)
        .unwrap_or_else(|| "Nothing to display.".into());
    f.render_widget(Paragraph::new(Span::styled(msg, style)), area);
}

fn render_options(f: &mut Frame, area: Rect, app: &AppState) {
    // Pass-level warning/error (no expiries, retrieval failure).
    if app.options.chain.is_none() {
        if let Some(outcome) = app.outcome_for(Section::OptionChain) {
            render_message(f, area, outcome, Section::OptionChain.label());
        } else {
            let hint = if app.options.chain_loading || app.fetch_in_progress {
                "Loading option chain..."
            } else {
                "No data yet. Press [Enter] in the Query panel to fetch."
            };
            f.render_widget(Paragraph::new(Span::styled(hint, theme::muted())), area);
        }
        return;
    }

    let (expiry, calls, puts) = app.options.chain.as_ref().unwrap();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(area);

    // Expiry selector line — only shown because the expiry list is non-empty.
    let selector = Line::from(vec![
        Span::styled("Expiry: ", theme::muted()),
        Span::styled(format!("< {expiry} >"), theme::accent()),
        Span::styled(
            format!(
                "  [{}/{}]  ([ and ] to change)",
                app.options.selected + 1,
                app.options.expiries.len()
            ),
            theme::muted(),
        ),
    ]);
    f.render_widget(Paragraph::new(selector), chunks[0]);

    render_side(f, chunks[1], calls, "Calls", app.scroll);
    render_side(f, chunks[2], puts, "Puts", app.scroll);
}

fn render_side(f: &mut Frame, area: Rect, outcome: &Outcome, label: &str, scroll: TableScroll) {
    match outcome {
        Outcome::Present(table) => render_table(f, area, table, scroll, label),
        other => render_message(f, area, other, label),
    }
}

/// Render a window of the table at the given scroll position. All rows and
/// columns stay reachable by scrolling — nothing is silently truncated.
fn render_table(f: &mut Frame, area: Rect, table: &Table, scroll: TableScroll, title: &str) {
    let visible_rows = area.height.saturating_sub(2) as usize;
    let row_from = scroll.row.min(table.row_count().saturating_sub(1));

    // Header: index column first, then data columns from the column offset.
    let mut header_cells = vec![table.index_name().to_string()];
    header_cells.extend(
        table
            .columns()
            .iter()
            .skip(scroll.col)
            .map(|c| c.to_string()),
    );

    let mut rows: Vec<Row> = Vec::with_capacity(visible_rows);
    let mut widths: Vec<usize> = header_cells.iter().map(|h| h.len()).collect();

    for (idx, cells) in table.rows().skip(row_from).take(visible_rows) {
        let mut fields = vec![idx.to_string()];
        fields.extend(cells.iter().skip(scroll.col).map(|c| c.render()));
        for (w, field) in widths.iter_mut().zip(fields.iter()) {
            *w = (*w).max(field.len()).min(MAX_COL_WIDTH);
        }
        rows.push(Row::new(
            fields.into_iter().map(UiCell::from).collect::<Vec<_>>(),
        ));
    }

    let constraints: Vec<Constraint> = widths
        .iter()
        .map(|w| Constraint::Length(*w as u16 + 1))
        .collect();

    let header = Row::new(
        header_cells
            .into_iter()
            .map(|h| UiCell::from(Span::styled(h, theme::table_header())))
            .collect::<Vec<_>>(),
    );

    let widget = UiTable::new(rows, constraints).header(header).block(
        ratatui::widgets::Block::default().title(Span::styled(
            format!(
                "{title} — {} rows x {} cols (row {}/{})",
                table.row_count(),
                table.column_count(),
                row_from + 1,
                table.row_count()
            ),
            theme::muted(),
        )),
    );

    f.render_widget(widget, area);
}

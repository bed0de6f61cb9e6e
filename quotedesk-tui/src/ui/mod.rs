//! Top-level UI layout — query sidebar, content area, status bar.

pub mod help_panel;
pub mod query_panel;
pub mod sections_panel;
pub mod status_bar;
pub mod table_panel;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    // Query sidebar on the left, content on the right.
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(main_area);

    draw_bordered(f, columns[0], app, Panel::Query, query_panel::render);

    match app.active_panel {
        Panel::Table => draw_bordered(f, columns[1], app, Panel::Table, table_panel::render),
        Panel::Help => draw_bordered(f, columns[1], app, Panel::Help, help_panel::render),
        // With the query or section list focused, the content area shows
        // the section browser.
        _ => draw_bordered(f, columns[1], app, Panel::Sections, sections_panel::render),
    }

    status_bar::render(f, status_area, app);
}

fn draw_bordered(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    panel: Panel,
    render: fn(&mut Frame, Rect, &AppState),
) {
    let is_active = app.active_panel == panel;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(is_active))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(is_active));

    let inner = block.inner(area);
    f.render_widget(block, area);
    render(f, inner, app);
}

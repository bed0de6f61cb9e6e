//! Keyboard input dispatch — global keys first, then the active panel.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use quotedesk_core::Section;

use crate::app::{AppState, Panel, QueryField};
use crate::save;

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Global keys. Quit and panel numbers stay out of the query form so
    // they remain typable in the symbol field.
    match key.code {
        KeyCode::Tab => {
            app.active_panel = app.active_panel.next();
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        _ => {}
    }

    if app.active_panel != Panel::Query {
        match key.code {
            KeyCode::Char('q') => {
                app.running = false;
                return;
            }
            KeyCode::Char('1') => {
                app.active_panel = Panel::Query;
                return;
            }
            KeyCode::Char('2') => {
                app.active_panel = Panel::Sections;
                return;
            }
            KeyCode::Char('3') => {
                app.active_panel = Panel::Table;
                return;
            }
            KeyCode::Char('4') => {
                app.active_panel = Panel::Help;
                return;
            }
            _ => {}
        }
    }

    match app.active_panel {
        Panel::Query => handle_query_key(app, key),
        Panel::Sections => handle_sections_key(app, key),
        Panel::Table => handle_table_key(app, key),
        Panel::Help => {}
    }
}

fn handle_query_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.query.focus = app.query.focus.prev(),
        KeyCode::Down => app.query.focus = app.query.focus.next(),
        KeyCode::Enter => app.start_fetch(),
        KeyCode::Esc => app.active_panel = Panel::Sections,
        KeyCode::Backspace => {
            app.query.focused_input_mut().pop();
        }
        KeyCode::Char(c) => {
            // Dates only take date characters; the symbol field takes
            // anything printable (exchange suffixes need the dot).
            let ok = match app.query.focus {
                QueryField::Symbol => !c.is_whitespace(),
                _ => c.is_ascii_digit() || c == '-',
            };
            if ok {
                app.query.focused_input_mut().push(c);
            }
        }
        _ => {}
    }
}

fn handle_sections_key(app: &mut AppState, key: KeyEvent) {
    let last = Section::all().len() - 1;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.cursor < last {
                app.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.cursor = last,
        KeyCode::Enter | KeyCode::Char('l') => {
            app.scroll = Default::default();
            app.active_panel = Panel::Table;
        }
        KeyCode::Char('s') => save_selected(app),
        _ => {}
    }
}

fn handle_table_key(app: &mut AppState, key: KeyEvent) {
    let section = app.selected_section();
    let (rows, cols) = current_table_extent(app);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.scroll.row + 1 < rows {
                app.scroll.row += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll.row = app.scroll.row.saturating_sub(1);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.scroll.col = app.scroll.col.saturating_sub(1);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if app.scroll.col + 1 < cols {
                app.scroll.col += 1;
            }
        }
        KeyCode::PageDown => {
            app.scroll.row = (app.scroll.row + 10).min(rows.saturating_sub(1));
        }
        KeyCode::PageUp => {
            app.scroll.row = app.scroll.row.saturating_sub(10);
        }
        KeyCode::Char('g') | KeyCode::Home => app.scroll.row = 0,
        KeyCode::Char('G') | KeyCode::End => app.scroll.row = rows.saturating_sub(1),
        KeyCode::Char('[') if section == Section::OptionChain => app.cycle_expiry(false),
        KeyCode::Char(']') if section == Section::OptionChain => app.cycle_expiry(true),
        KeyCode::Char('s') => save_selected(app),
        KeyCode::Esc => app.active_panel = Panel::Sections,
        _ => {}
    }
}

fn save_selected(app: &mut AppState) {
    match save::save_selected(app, &save::export_dir()) {
        Ok(msg) => app.set_status(msg),
        Err(msg) => app.set_warning(msg),
    }
}

/// Row/column extent of the table currently in view, for scroll clamping.
fn current_table_extent(app: &AppState) -> (usize, usize) {
    let section = app.selected_section();
    if section == Section::OptionChain {
        if let Some((_, calls, puts)) = &app.options.chain {
            let rows = [calls, puts]
                .iter()
                .filter_map(|o| o.table())
                .map(|t| t.row_count())
                .max()
                .unwrap_or(0);
            let cols = [calls, puts]
                .iter()
                .filter_map(|o| o.table())
                .map(|t| t.column_count() + 1)
                .max()
                .unwrap_or(0);
            return (rows, cols);
        }
        return (0, 0);
    }
    match app.outcome_for(section).and_then(|o| o.table()) {
        Some(t) => (t.row_count(), t.column_count() + 1),
        None => (0, 0),
    }
}

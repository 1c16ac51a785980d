use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane, FormField, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::ReportFinished { ticket, result } => app.finish_report(ticket, result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),

        // Report actions
        KeyCode::Char('g') => app.request_report(),
        KeyCode::Char('p') => app.print_report(Local::now().date_naive()),

        // Focus
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.prev(),

        _ => match app.focus {
            FocusPane::Form => handle_form_normal(app, key),
            FocusPane::Table => handle_table_normal(app, key),
            FocusPane::Report => handle_report_normal(app, key),
        },
    }
}

fn handle_form_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let next = app.form.field.next();
            app.form.focus(next);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let prev = app.form.field.prev();
            app.form.focus(prev);
        }
        KeyCode::Char('l') | KeyCode::Right => app.form.cycle_choice(true),
        KeyCode::Char('h') | KeyCode::Left => app.form.cycle_choice(false),

        // Edit the focused text field
        KeyCode::Enter | KeyCode::Char('i') => {
            if !app.form.field.is_choice() {
                let field = app.form.field;
                app.form.focus(field);
                app.input_mode = InputMode::Editing;
            }
        }

        KeyCode::Char('s') => app.submit_form(),
        _ => {}
    }
}

fn handle_table_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.table_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.table_nav_up(),
        KeyCode::Home => app.table_first(),
        KeyCode::End | KeyCode::Char('G') => app.table_last(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        _ => {}
    }
}

fn handle_report_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_report_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_report_up(),
        KeyCode::Home => app.report_scroll = 0,
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.submit_form();
        }
        KeyCode::Tab | KeyCode::Down => {
            let next = app.form.field.next();
            move_editing_focus(app, next);
        }
        KeyCode::BackTab | KeyCode::Up => {
            let prev = app.form.field.prev();
            move_editing_focus(app, prev);
        }
        KeyCode::Backspace => app.form.backspace(),
        KeyCode::Delete => app.form.delete(),
        KeyCode::Left => app.form.cursor_left(),
        KeyCode::Right => app.form.cursor_right(),
        KeyCode::Home => app.form.cursor_home(),
        KeyCode::End => app.form.cursor_end(),
        KeyCode::Char(c) => app.form.insert_char(c),
        _ => {}
    }
}

/// Choice fields are not typed into, so landing on one leaves editing mode
fn move_editing_focus(app: &mut App, field: FormField) {
    app.form.focus(field);
    if field.is_choice() {
        app.input_mode = InputMode::Normal;
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_table = app.table_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_report = app.report_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_table {
                app.table_nav_down();
            } else if in_report {
                app.scroll_report_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_table {
                app.table_nav_up();
            } else if in_report {
                app.scroll_report_up();
            }
        }
        _ => {}
    }
}

use appliance_core::WizardStep;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::SearchFinished(completion) => {
            app.finish_search(completion);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work on every step
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('n') => app.new_search(),
            KeyCode::Char('u') => app.scroll_up(app.chat_height / 2),
            KeyCode::Char('d') => app.scroll_down(app.chat_height / 2),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::PageUp => {
            app.scroll_up(app.chat_height.max(1));
            return;
        }
        KeyCode::PageDown => {
            app.scroll_down(app.chat_height.max(1));
            return;
        }
        KeyCode::Esc => {
            app.go_back();
            return;
        }
        _ => {}
    }

    match app.step() {
        WizardStep::ApplianceType => handle_list_step(app, key),
        WizardStep::Brand => match key.code {
            KeyCode::Up => app.select_prev(),
            KeyCode::Down => app.select_next(),
            _ => handle_text_step(app, key),
        },
        WizardStep::Model => handle_text_step(app, key),
        WizardStep::BrandForBrand => handle_brand_for_brand(app, key),
        WizardStep::DollarLimit => match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | ',' | '$') => {
                app.insert_char(c)
            }
            KeyCode::Char(_) => {}
            _ => handle_text_step(app, key),
        },
        WizardStep::Results => handle_results(app, key),
    }
}

fn handle_list_step(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => {
            app.submit();
        }
        _ => {}
    }
}

fn handle_brand_for_brand(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Tab
        | KeyCode::Char(' ') | KeyCode::Char('j') | KeyCode::Char('k') => app.select_next(),
        KeyCode::Char('y') | KeyCode::Char('Y') => app.brand_for_brand = true,
        KeyCode::Char('n') | KeyCode::Char('N') => app.brand_for_brand = false,
        KeyCode::Enter => {
            app.submit();
        }
        _ => {}
    }
}

fn handle_text_step(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.submit();
        }
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_results(app: &mut App, key: KeyEvent) {
    // Nothing to do until the search lands
    if app.is_loading() {
        return;
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char('n') => app.new_search(),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, PAGE_SCROLL, WHEEL_SCROLL};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => insert_text(app, &text),
        AppEvent::Resize(_, _) => {
            if app.follow_tail {
                app.scroll_chat_to_bottom();
            }
        }
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any state
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,

        // Chat scrolling works while a request is in flight
        KeyCode::PageUp => app.scroll_chat_up(PAGE_SCROLL),
        KeyCode::PageDown => app.scroll_chat_down(PAGE_SCROLL),
        KeyCode::Up if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_chat_up(1),
        KeyCode::Down if key.modifiers.contains(KeyModifiers::CONTROL) => app.scroll_chat_down(1),

        // The input box is disabled while waiting for an answer
        _ if app.store.is_busy() => {}

        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => {
            if app.query_cursor > 0 {
                app.query_cursor -= 1;
                let mut draft = app.store.draft().to_string();
                let byte_pos = char_to_byte_index(&draft, app.query_cursor);
                draft.remove(byte_pos);
                app.store.set_draft(draft);
            }
        }
        KeyCode::Delete => {
            let char_count = app.store.draft().chars().count();
            if app.query_cursor < char_count {
                let mut draft = app.store.draft().to_string();
                let byte_pos = char_to_byte_index(&draft, app.query_cursor);
                draft.remove(byte_pos);
                app.store.set_draft(draft);
            }
        }
        KeyCode::Left => {
            app.query_cursor = app.query_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.store.draft().chars().count();
            app.query_cursor = (app.query_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.query_cursor = 0;
        }
        KeyCode::End => {
            app.query_cursor = app.store.draft().chars().count();
        }
        KeyCode::Char(c) => {
            let mut buf = [0u8; 4];
            insert_text(app, c.encode_utf8(&mut buf));
        }
        _ => {}
    }
}

/// Insert text at the cursor. Newlines are flattened since the input is a single line.
fn insert_text(app: &mut App, text: &str) {
    if app.store.is_busy() {
        return;
    }

    let text: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let mut draft = app.store.draft().to_string();
    let byte_pos = char_to_byte_index(&draft, app.query_cursor);
    draft.insert_str(byte_pos, &text);
    app.query_cursor += text.chars().count();
    app.store.set_draft(draft);
}

/// Check if a point is within a rectangle
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
        MouseEventKind::ScrollDown => app.scroll_chat_down(WHEEL_SCROLL),
        MouseEventKind::ScrollUp => app.scroll_chat_up(WHEEL_SCROLL),
        _ => {}
    }
}

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    let now = Instant::now();
    match event {
        AppEvent::Key(key) => handle_key(app, key, now),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse, now),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(now),
        AppEvent::Probed(state) => app.apply_probe(state),
        AppEvent::Replied(reply) => app.on_reply(reply),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    // Global keys that work in any focus
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    if key.code == KeyCode::Tab {
        app.focus_next();
        return;
    }

    match app.focus {
        FocusPane::Navbar => handle_navbar(app, key, now),
        FocusPane::Page => handle_page(app, key, now),
        FocusPane::Input => handle_input(app, key),
    }
}

/// Keys shared by the navbar and the page body
fn handle_page_common(app: &mut App, key: KeyEvent, now: Instant) {
    let half_page = (app.page.viewport() / 2).max(1) as i32;
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.page.scroll_by(1, now),
        KeyCode::Char('k') | KeyCode::Up => app.page.scroll_by(-1, now),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.page.scroll_by(half_page, now)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.page.scroll_by(-half_page, now)
        }
        KeyCode::PageDown => app.page.scroll_by(half_page, now),
        KeyCode::PageUp => app.page.scroll_by(-half_page, now),
        KeyCode::Char('g') | KeyCode::Home => app.page.scroll_to(0, now),
        KeyCode::Char('G') | KeyCode::End => {
            let bottom = app.page.max_scroll();
            app.page.scroll_to(bottom, now)
        }
        // Number keys jump straight to a navbar link
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            app.activate_link(index, now);
        }
        // Start typing a question
        KeyCode::Char('i') | KeyCode::Char('/') => app.set_focus(FocusPane::Input),
        _ => {}
    }
}

fn handle_navbar(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.link_prev(),
        KeyCode::Char('l') | KeyCode::Right => app.link_next(),
        KeyCode::Enter => {
            app.activate_link(app.selected_link, now);
        }
        _ => handle_page_common(app, key, now),
    }
}

fn handle_page(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => app.set_focus(FocusPane::Navbar),
        _ => handle_page_common(app, key, now),
    }
}

fn handle_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.set_focus(FocusPane::Page),
        KeyCode::Enter => app.submit(),
        KeyCode::Backspace => app.chat.backspace(),
        KeyCode::Delete => app.chat.delete(),
        KeyCode::Left => app.chat.cursor_left(),
        KeyCode::Right => app.chat.cursor_right(),
        KeyCode::Home => app.chat.cursor_home(),
        KeyCode::End => app.chat.cursor_end(),
        // Transcript scrolling while typing
        KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::PageUp => app.scroll_chat_up(app.chat_height.max(1) / 2),
        KeyCode::PageDown => app.scroll_chat_down(app.chat_height.max(1) / 2),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.chat.insert_char(c)
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, now: Instant) {
    let x = mouse.column;
    let y = mouse.row;

    let in_page = app.page_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_input = app.input_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_send = app.send_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_page {
                app.page.scroll_by(3, now);
            } else if in_chat {
                app.scroll_chat_down(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_page {
                app.page.scroll_by(-3, now);
            } else if in_chat {
                app.scroll_chat_up(3);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(index) = app.link_areas.iter().position(|r| point_in_rect(x, y, *r)) {
                app.set_focus(FocusPane::Navbar);
                app.activate_link(index, now);
            } else if in_send {
                // Same path as pressing Enter in the input
                app.set_focus(FocusPane::Input);
                app.submit();
            } else if in_input {
                app.set_focus(FocusPane::Input);
            } else if in_page {
                app.set_focus(FocusPane::Page);
            }
        }
        _ => {}
    }
}

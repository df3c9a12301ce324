use std::time::Instant;

use ragpage_core::page::{NavLink, Navigation};
use ragpage_core::{ChatSession, Config, ConnectionState, Page, RagClient, Reply};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::content;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Navbar,
    Page,
    Input,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::Navbar => FocusPane::Page,
            FocusPane::Page => FocusPane::Input,
            FocusPane::Input => FocusPane::Navbar,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: FocusPane,

    // Landing page
    pub page: Page,
    pub nav_links: Vec<NavLink>,
    pub selected_link: usize,

    // Chat panel
    pub chat: ChatSession,
    /// Set once the startup probe has answered
    pub probed: bool,
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the transcript, for scroll calculations
    pub chat_width: u16,  // inner width of the transcript, for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing indicator

    // Panel areas for mouse hit-testing (updated during render)
    pub link_areas: Vec<Rect>,
    pub page_area: Option<Rect>,
    pub chat_area: Option<Rect>,
    pub input_area: Option<Rect>,
    pub send_area: Option<Rect>,

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: &Config, client: RagClient, events: UnboundedSender<AppEvent>) -> Self {
        let page = Page::new(content::sections(), config.page_metrics());

        Self {
            should_quit: false,
            focus: FocusPane::Navbar,

            page,
            nav_links: content::nav_links(),
            selected_link: 0,

            chat: ChatSession::new(client, ConnectionState::Demo),
            probed: false,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            link_areas: Vec::new(),
            page_area: None,
            chat_area: None,
            input_area: None,
            send_area: None,

            events,
        }
    }

    pub fn set_focus(&mut self, focus: FocusPane) {
        self.focus = focus;
        self.chat.set_input_focused(focus == FocusPane::Input);
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next());
    }

    /// Startup probe finished
    pub fn apply_probe(&mut self, state: ConnectionState) {
        self.probed = true;
        self.chat.set_connection(state);
    }

    // Navbar

    pub fn link_next(&mut self) {
        if !self.nav_links.is_empty() {
            self.selected_link = (self.selected_link + 1) % self.nav_links.len();
        }
    }

    pub fn link_prev(&mut self) {
        if !self.nav_links.is_empty() {
            self.selected_link = self
                .selected_link
                .checked_sub(1)
                .unwrap_or(self.nav_links.len() - 1);
        }
    }

    /// Follow the navbar link at `index`
    pub fn activate_link(&mut self, index: usize, now: Instant) -> Option<Navigation> {
        let link = self.nav_links.get(index)?;
        self.selected_link = index;
        let href = link.href.clone();
        let nav = self.page.navigate(&href, now);
        if nav == Navigation::NotFragment {
            tracing::debug!(href = %href, "Ignoring external link");
        }
        Some(nav)
    }

    // Chat

    /// Send the current input. The reply arrives later as `AppEvent::Replied`.
    pub fn submit(&mut self) {
        let Some(pending) = self.chat.begin_submit() else {
            return;
        };

        tracing::debug!(live = self.chat.connection().is_live(), "Submitting question");
        self.animation_frame = 0;
        self.scroll_chat_to_bottom();

        let events = self.events.clone();
        tokio::spawn(async move {
            let reply = pending.resolve().await;
            let _ = events.send(AppEvent::Replied(reply));
        });
    }

    pub fn on_reply(&mut self, reply: Reply) {
        self.chat.complete(reply);
        self.set_focus(FocusPane::Input);
        self.scroll_chat_to_bottom();
    }

    /// Tick animation state (called by Tick event)
    pub fn tick(&mut self, now: Instant) {
        self.page.tick(now);
        if self.chat.is_typing() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_up(&mut self, rows: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(rows);
    }

    pub fn scroll_chat_down(&mut self, rows: u16) {
        let max = self.chat_line_count().saturating_sub(self.chat_height.max(1));
        self.chat_scroll = self.chat_scroll.saturating_add(rows).min(max);
    }

    /// Scroll chat to bottom so the newest entry is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.chat_line_count();

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    /// Rendered transcript height, mirroring the layout in `ui.rs`
    pub fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 40 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            40
        };

        let wrapped = |text: &str| -> usize {
            // Use character count, not byte length, for proper UTF-8 handling
            text.chars().count().div_ceil(wrap_width).max(1)
        };

        let mut total_lines: usize = 0;

        for msg in self.chat.messages() {
            total_lines += 1; // Role line ("You:" or "Assistant:")
            for line in msg.content.lines() {
                total_lines += wrapped(line);
            }
            if let Some(sources) = msg.visible_sources() {
                total_lines += 1; // "Sources:"
                for source in sources {
                    total_lines += wrapped(&format!("  • {}", ragpage_core::markdown::format_source(source)));
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.chat.is_typing() {
            total_lines += 2; // role line + "●●●"
        }

        u16::try_from(total_lines).unwrap_or(u16::MAX)
    }
}

//! Scrollable landing page model
//!
//! Geometry is in rows. The page is a vertical stack of sections, each with
//! a heading, intro text and a column of cards. The front end owns the
//! clock: every mutation takes `now` so animations stay deterministic.

use std::time::{Duration, Instant};

mod navbar;
mod navigator;
mod reveal;

pub use navbar::{shadow_for, Shadow};
pub use navigator::{NavLink, Navigation, SmoothScroll};
pub use reveal::{ease, visible_ratio, Reveal, RevealStyle};

/// Tunables for scrolling and reveal behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    /// Navbar shadow turns pronounced strictly above this offset
    pub shadow_threshold: u16,
    /// How far a hidden card sits below its resting place
    pub reveal_offset: u16,
    /// Rows trimmed off the bottom of the viewport when checking visibility
    pub reveal_margin: u16,
    /// Fraction of a card that must be visible before it reveals
    pub reveal_threshold: f32,
    pub reveal_duration: Duration,
    pub scroll_duration: Duration,
}

impl Default for PageMetrics {
    fn default() -> Self {
        Self {
            shadow_threshold: 5,
            reveal_offset: 2,
            reveal_margin: 3,
            reveal_threshold: 0.1,
            reveal_duration: Duration::from_millis(600),
            scroll_duration: Duration::from_millis(300),
        }
    }
}

/// The content-card kinds that take part in reveal animations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Card,
    FlowStep,
    MetricCard,
    FindingItem,
}

impl CardKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            CardKind::Card => "card",
            CardKind::FlowStep => "flow-step",
            CardKind::MetricCard => "metric-card",
            CardKind::FindingItem => "finding-item",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardSpec {
    pub kind: CardKind,
    pub title: String,
    pub lines: Vec<String>,
}

impl CardSpec {
    pub fn new(kind: CardKind, title: &str, lines: &[&str]) -> Self {
        Self {
            kind,
            title: title.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionSpec {
    pub id: String,
    pub title: String,
    pub intro: Vec<String>,
    pub cards: Vec<CardSpec>,
}

impl SectionSpec {
    pub fn new(id: &str, title: &str, intro: &[&str], cards: Vec<CardSpec>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            intro: intro.iter().map(|l| l.to_string()).collect(),
            cards,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Card {
    pub kind: CardKind,
    pub title: String,
    pub lines: Vec<String>,
    pub top: u16,
    pub height: u16,
    pub reveal: Reveal,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub intro: Vec<String>,
    pub top: u16,
    pub height: u16,
    pub cards: Vec<Card>,
}

pub struct Page {
    sections: Vec<Section>,
    content_height: u16,
    scroll: u16,
    viewport: u16,
    metrics: PageMetrics,
    smooth: Option<SmoothScroll>,
}

impl Page {
    pub fn new(specs: Vec<SectionSpec>, metrics: PageMetrics) -> Self {
        let mut sections = Vec::with_capacity(specs.len());
        let mut y: u16 = 0;

        for spec in specs {
            let top = y;
            // title, blank, intro, blank
            y = y.saturating_add(2 + spec.intro.len() as u16 + 1);

            let mut cards = Vec::with_capacity(spec.cards.len());
            for card in spec.cards {
                let height = card.lines.len() as u16 + 2;
                cards.push(Card {
                    kind: card.kind,
                    title: card.title,
                    lines: card.lines,
                    top: y,
                    height,
                    reveal: Reveal::default(),
                });
                y = y.saturating_add(height + 1);
            }
            y = y.saturating_add(1);

            sections.push(Section {
                id: spec.id,
                title: spec.title,
                intro: spec.intro,
                top,
                height: y - top,
                cards,
            });
        }

        Self {
            sections,
            content_height: y,
            scroll: 0,
            viewport: 0,
            metrics,
            smooth: None,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn metrics(&self) -> &PageMetrics {
        &self.metrics
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn viewport(&self) -> u16 {
        self.viewport
    }

    pub fn content_height(&self) -> u16 {
        self.content_height
    }

    pub fn max_scroll(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport)
    }

    pub fn is_smooth_scrolling(&self) -> bool {
        self.smooth.is_some()
    }

    /// Called whenever the visible area changes size
    pub fn set_viewport(&mut self, height: u16, now: Instant) {
        if self.viewport == height {
            return;
        }
        self.viewport = height;
        self.scroll = self.scroll.min(self.max_scroll());
        self.observe(now);
    }

    /// Manual scrolling. Cancels any smooth scroll in flight.
    pub fn scroll_by(&mut self, delta: i32, now: Instant) {
        let target = (self.scroll as i32 + delta).max(0) as u16;
        self.scroll_to(target, now);
    }

    pub fn scroll_to(&mut self, offset: u16, now: Instant) {
        self.smooth = None;
        self.scroll = offset.min(self.max_scroll());
        self.observe(now);
    }

    /// Advance animations to `now`
    pub fn tick(&mut self, now: Instant) {
        if let Some(smooth) = &self.smooth {
            self.scroll = smooth.position(now).min(self.max_scroll());
            if smooth.is_finished(now) {
                self.smooth = None;
            }
        }
        self.observe(now);
    }

    /// Whether anything on the page is still moving
    pub fn is_animating(&self, now: Instant) -> bool {
        self.smooth.is_some()
            || self.cards().any(|c| c.reveal.is_transitioning(&self.metrics, now))
    }

    pub fn navbar_shadow(&self) -> Shadow {
        shadow_for(self.scroll, self.metrics.shadow_threshold)
    }

    pub fn card_style(&self, card: &Card, now: Instant) -> RevealStyle {
        card.reveal.style(&self.metrics, now)
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.sections.iter().flat_map(|s| s.cards.iter())
    }

    /// Rows that count as "in view" for reveal purposes
    fn observed_window(&self) -> (u16, u16) {
        let bottom = self
            .scroll
            .saturating_add(self.viewport)
            .saturating_sub(self.metrics.reveal_margin);
        (self.scroll, bottom.max(self.scroll))
    }

    fn observe(&mut self, now: Instant) {
        let (view_top, view_bottom) = self.observed_window();
        let metrics = self.metrics;
        for section in &mut self.sections {
            for card in &mut section.cards {
                if card
                    .reveal
                    .observe(card.top, card.height, view_top, view_bottom, &metrics, now)
                {
                    tracing::trace!(card = %card.title, kind = card.kind.class_name(), "Card revealed");
                }
            }
        }
    }
}

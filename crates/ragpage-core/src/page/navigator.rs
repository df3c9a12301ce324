use std::time::{Duration, Instant};

use super::{ease, Page};

/// A navbar link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl NavLink {
    pub fn new(label: &str, href: &str) -> Self {
        Self {
            label: label.to_string(),
            href: href.to_string(),
        }
    }

    /// Same-page links are the ones the navigator takes over
    pub fn is_fragment(&self) -> bool {
        self.href.starts_with('#')
    }
}

/// What activating a link did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Smooth scroll started towards this offset
    Scrolling { target: u16 },
    /// Fragment link with no matching section. Swallowed silently.
    Absorbed,
    /// Not a same-page link; left to the caller
    NotFragment,
}

/// An in-flight eased scroll between two offsets
#[derive(Debug, Clone, Copy)]
pub struct SmoothScroll {
    from: u16,
    to: u16,
    started: Instant,
    duration: Duration,
}

impl SmoothScroll {
    pub fn new(from: u16, to: u16, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    pub fn target(&self) -> u16 {
        self.to
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }

    pub fn position(&self, now: Instant) -> u16 {
        if self.is_finished(now) {
            return self.to;
        }
        let t = now.saturating_duration_since(self.started).as_secs_f32()
            / self.duration.as_secs_f32();
        let from = self.from as f32;
        let to = self.to as f32;
        (from + (to - from) * ease(t)).round() as u16
    }
}

impl Page {
    /// Top row of the section with this anchor id
    pub fn section_top(&self, id: &str) -> Option<u16> {
        self.sections.iter().find(|s| s.id == id).map(|s| s.top)
    }

    /// Follow a link. Fragment links scroll their section's top edge to the
    /// top of the viewport; unknown fragments are absorbed.
    pub fn navigate(&mut self, href: &str, now: Instant) -> Navigation {
        let Some(fragment) = href.strip_prefix('#') else {
            return Navigation::NotFragment;
        };

        let Some(top) = self.section_top(fragment) else {
            tracing::debug!(href, "No section matches link target");
            return Navigation::Absorbed;
        };

        let target = top.min(self.max_scroll());
        self.smooth = Some(SmoothScroll::new(
            self.scroll,
            target,
            now,
            self.metrics.scroll_duration,
        ));
        tracing::debug!(href, from = self.scroll, target, "Smooth scroll started");
        Navigation::Scrolling { target }
    }
}

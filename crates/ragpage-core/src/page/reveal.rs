use std::time::Instant;

use super::PageMetrics;

/// Fraction of `[top, top + height)` that lies inside `[view_top, view_bottom)`
pub fn visible_ratio(top: u16, height: u16, view_top: u16, view_bottom: u16) -> f32 {
    if height == 0 {
        return 0.0;
    }
    let bottom = top.saturating_add(height);
    let start = top.max(view_top);
    let end = bottom.min(view_bottom);
    if end <= start {
        return 0.0;
    }
    (end - start) as f32 / height as f32
}

/// Smoothstep easing over `t` in `[0, 1]`
pub fn ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// How a card should be drawn right now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealStyle {
    /// 0.0 is invisible, 1.0 fully drawn
    pub opacity: f32,
    /// Rows below the resting position
    pub offset: u16,
}

/// Per-card reveal state. Once revealed it stays revealed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reveal {
    revealed_at: Option<Instant>,
}

impl Reveal {
    pub fn is_revealed(&self) -> bool {
        self.revealed_at.is_some()
    }

    /// Check the card against the observed window. Returns true the first
    /// time the card crosses the visibility threshold.
    pub fn observe(
        &mut self,
        top: u16,
        height: u16,
        view_top: u16,
        view_bottom: u16,
        metrics: &PageMetrics,
        now: Instant,
    ) -> bool {
        if self.is_revealed() {
            return false;
        }
        // A hidden card is measured where it is drawn, offset included.
        let drawn_top = top.saturating_add(metrics.reveal_offset);
        let ratio = visible_ratio(drawn_top, height, view_top, view_bottom);
        if ratio > 0.0 && ratio >= metrics.reveal_threshold {
            self.revealed_at = Some(now);
            return true;
        }
        false
    }

    pub fn style(&self, metrics: &PageMetrics, now: Instant) -> RevealStyle {
        let Some(at) = self.revealed_at else {
            return RevealStyle {
                opacity: 0.0,
                offset: metrics.reveal_offset,
            };
        };

        let total = metrics.reveal_duration.as_secs_f32();
        let progress = if total <= 0.0 {
            1.0
        } else {
            now.saturating_duration_since(at).as_secs_f32() / total
        };
        let eased = ease(progress);

        RevealStyle {
            opacity: eased,
            offset: (metrics.reveal_offset as f32 * (1.0 - eased)).round() as u16,
        }
    }

    pub fn is_transitioning(&self, metrics: &PageMetrics, now: Instant) -> bool {
        self.revealed_at
            .map(|at| now.saturating_duration_since(at) < metrics.reveal_duration)
            .unwrap_or(false)
    }
}

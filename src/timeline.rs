//! The scroll choreography: one pinned-scroll position driving every
//! animation channel of the tunnel section.
//!
//! While the section is pinned, scroll delta maps linearly onto a timeline
//! position `u ∈ [0, 8]`. The timeline is partitioned into ordered phases
//! (open, drift bulk, drift tail, close), each driving its channels with
//! its own easing. The phase boundaries and relative durations are part of the
//! visual rhythm and are fixed, not derived.
//!
//! No two phases write the same channel over the same span; the portfolio
//! channel deliberately overlaps the two drift phases on its own track.

use crate::carousel::PortfolioProgress;

/// Total timeline length in phase units.
pub const TIMELINE_LENGTH: f32 = 8.0;
/// The section stays pinned for this many viewport heights of scroll.
pub const PINNED_VIEWPORT_HEIGHTS: f32 = 9.0;

/// Phase boundaries, in timeline units.
pub const OPEN_END: f32 = 1.0;
pub const DRIFT_BULK_END: f32 = 5.5;
pub const DRIFT_TAIL_END: f32 = 7.0;
pub const CLOSE_START: f32 = 7.0;

/// Fraction of the scroll channel covered by the constant-velocity bulk.
const DRIFT_BULK_TARGET: f32 = 0.8;
/// Letter scale at full spread.
const LETTER_SCALE_OPEN: f32 = 1.9;
/// Expanded mask side as a multiple of the larger viewport dimension.
const MASK_EXPANDED_FACTOR: f32 = 2.5;

/// Easing curves used by the timeline phases.
pub mod ease {
    /// Cubic ease-in-out.
    pub fn in_out_cubic(t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t < 0.5 {
            4.0 * t * t * t
        } else {
            1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
        }
    }

    /// Quartic ease-out; decelerates hard at the very end.
    pub fn out_quart(t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        1.0 - (1.0 - t).powi(4)
    }
}

/// The named animation channels, all driven exclusively by
/// [`Timeline::sample`] and read-only everywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channels {
    /// Horizontal drift of the tunnel rows, 0..1.
    pub scroll: f32,
    /// How far glyph instances are pushed out from center, 0..1.
    pub spread: f32,
    /// Glyph scale, 1.0 closed to 1.9 fully open.
    pub letter_scale: f32,
    /// Card carousel progress, 0..1.
    pub portfolio_progress: PortfolioProgress,
}

impl Channels {
    pub const INITIAL: Channels = Channels {
        scroll: 0.0,
        spread: 0.0,
        letter_scale: 1.0,
        portfolio_progress: PortfolioProgress(0.0),
    };
}

/// Attribute set of one rounded mask rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectAttr {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
}

impl RectAttr {
    fn lerp(a: &RectAttr, b: &RectAttr, t: f32) -> RectAttr {
        let mix = |from: f32, to: f32| from + (to - from) * t;
        RectAttr {
            x: mix(a.x, b.x),
            y: mix(a.y, b.y),
            width: mix(a.width, b.width),
            height: mix(a.height, b.height),
            corner_radius: mix(a.corner_radius, b.corner_radius),
        }
    }
}

/// Aperture mask geometry for one frame: the inner pill hole, the outlined
/// border capsule, and the hole cut into the background grid pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskGeometry {
    pub pill: RectAttr,
    pub border: RectAttr,
    pub border_opacity: f32,
    pub grid_hole: RectAttr,
    /// Background grid cell size, for the host's pattern fill.
    pub cell: (f32, f32),
}

/// Everything the renderers and the host read for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineFrame {
    pub channels: Channels,
    pub mask: MaskGeometry,
}

/// Number of cells in the background grid, horizontally and vertically.
const GRID_COLS: f32 = 12.0;
const GRID_ROWS: f32 = 10.0;
/// Mask stroke width, matching the grid line thickness.
const MASK_STROKE: f32 = 2.0;

fn centered(viewport: (f32, f32), width: f32, height: f32, corner_radius: f32) -> RectAttr {
    RectAttr {
        x: viewport.0 / 2.0 - width / 2.0,
        y: viewport.1 / 2.0 - height / 2.0,
        width,
        height,
        corner_radius,
    }
}

/// Mask geometry in the fully-closed state, derived from the viewport grid:
/// the border capsule spans 1.5 × 8 cells, the pill sits inside it behind a
/// 0.1-cell gap on each side.
pub fn closed_mask(viewport: (f32, f32)) -> MaskGeometry {
    let cell_w = viewport.0 / GRID_COLS;
    let cell_h = viewport.1 / GRID_ROWS;
    let gap_w = cell_w * 0.1;
    let gap_h = cell_h * 0.1;

    let border_w = cell_w * 1.5 - MASK_STROKE;
    let border_h = cell_h * 8.0 - MASK_STROKE;
    let pill_w = border_w - MASK_STROKE - gap_w * 2.0;
    let pill_h = border_h - MASK_STROKE - gap_h * 2.0;
    let hole_w = border_w + MASK_STROKE;
    let hole_h = border_h + MASK_STROKE;

    MaskGeometry {
        pill: centered(viewport, pill_w, pill_h, pill_w / 2.0),
        border: centered(viewport, border_w, border_h, border_w / 2.0),
        border_opacity: 1.0,
        grid_hole: centered(viewport, hole_w, hole_h, hole_w / 2.0),
        cell: (cell_w, cell_h),
    }
}

fn expanded_rect(viewport: (f32, f32)) -> RectAttr {
    let side = viewport.0.max(viewport.1) * MASK_EXPANDED_FACTOR;
    centered(viewport, side, side, side / 2.0)
}

/// Maps pinned-scroll progress to the animation channels and mask geometry.
///
/// Event callbacks feed it the raw scroll offset; the frame loop calls
/// [`Timeline::sample`] once per tick. Resizing rebuilds the mask endpoints
/// atomically before the next sample.
#[derive(Debug, Clone)]
pub struct Timeline {
    viewport: (f32, f32),
    closed: MaskGeometry,
    expanded: RectAttr,
}

impl Timeline {
    pub fn new(viewport: (f32, f32)) -> Self {
        Self {
            viewport,
            closed: closed_mask(viewport),
            expanded: expanded_rect(viewport),
        }
    }

    /// Recomputes the mask endpoints for a new viewport.
    pub fn resize(&mut self, viewport: (f32, f32)) {
        self.viewport = viewport;
        self.closed = closed_mask(viewport);
        self.expanded = expanded_rect(viewport);
    }

    /// Converts a raw scroll offset (px past the pin start) into a timeline
    /// position.
    pub fn position_for_scroll(&self, scroll_offset: f32) -> f32 {
        let pinned_distance = self.viewport.1 * PINNED_VIEWPORT_HEIGHTS;
        if pinned_distance <= 0.0 {
            return 0.0;
        }
        (scroll_offset / pinned_distance).clamp(0.0, 1.0) * TIMELINE_LENGTH
    }

    /// Samples every channel at timeline position `u`.
    ///
    /// Positions at or beyond either end of the pinned range yield the
    /// initial values, so a full traversal is a round trip.
    pub fn sample(&self, u: f32) -> TimelineFrame {
        if u <= 0.0 || u >= TIMELINE_LENGTH {
            return TimelineFrame {
                channels: Channels::INITIAL,
                mask: self.closed,
            };
        }

        // Shared open/close profile: ramps 0→1 across the open phase, holds,
        // and mirrors back down across the close phase.
        let openness = if u < OPEN_END {
            ease::in_out_cubic(u / OPEN_END)
        } else if u < CLOSE_START {
            1.0
        } else {
            1.0 - ease::in_out_cubic((u - CLOSE_START) / (TIMELINE_LENGTH - CLOSE_START))
        };

        let scroll = if u < OPEN_END {
            0.0
        } else if u < DRIFT_BULK_END {
            DRIFT_BULK_TARGET * (u - OPEN_END) / (DRIFT_BULK_END - OPEN_END)
        } else if u < DRIFT_TAIL_END {
            DRIFT_BULK_TARGET
                + (1.0 - DRIFT_BULK_TARGET)
                    * ease::out_quart((u - DRIFT_BULK_END) / (DRIFT_TAIL_END - DRIFT_BULK_END))
        } else {
            // The close phase winds the drift back to zero alongside the mask.
            1.0 - ease::in_out_cubic((u - CLOSE_START) / (TIMELINE_LENGTH - CLOSE_START))
        };

        let portfolio = if u < OPEN_END {
            0.0
        } else if u < DRIFT_TAIL_END {
            (u - OPEN_END) / (DRIFT_TAIL_END - OPEN_END)
        } else {
            1.0
        };

        let mask = MaskGeometry {
            pill: RectAttr::lerp(&self.closed.pill, &self.expanded, openness),
            border: RectAttr::lerp(&self.closed.border, &self.expanded, openness),
            border_opacity: 1.0 - openness,
            grid_hole: RectAttr::lerp(&self.closed.grid_hole, &self.expanded, openness),
            cell: self.closed.cell,
        };

        TimelineFrame {
            channels: Channels {
                scroll,
                spread: openness,
                letter_scale: 1.0 + (LETTER_SCALE_OPEN - 1.0) * openness,
                portfolio_progress: PortfolioProgress(portfolio),
            },
            mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> Timeline {
        Timeline::new((1920.0, 1080.0))
    }

    #[test]
    fn endpoints_are_initial_values() {
        let timeline = timeline();
        for u in [0.0, -1.0, TIMELINE_LENGTH, TIMELINE_LENGTH + 3.0] {
            let frame = timeline.sample(u);
            assert_eq!(frame.channels, Channels::INITIAL);
            assert_eq!(frame.mask.border_opacity, 1.0);
            assert_eq!(frame.mask.pill, timeline.closed.pill);
        }
    }

    #[test]
    fn open_phase_ramps_spread_and_scale() {
        let timeline = timeline();
        let frame = timeline.sample(OPEN_END);
        assert!((frame.channels.spread - 1.0).abs() < 1e-6);
        assert!((frame.channels.letter_scale - 1.9).abs() < 1e-6);
        assert_eq!(frame.channels.scroll, 0.0);
        assert!(frame.mask.border_opacity.abs() < 1e-6);

        // Monotonic within the phase.
        let mut prev = 0.0;
        for step in 1..=10 {
            let u = OPEN_END * step as f32 / 10.0 * 0.999;
            let spread = timeline.sample(u).channels.spread;
            assert!(spread >= prev);
            prev = spread;
        }
    }

    #[test]
    fn drift_bulk_is_linear_to_settle_target() {
        let timeline = timeline();
        assert!((timeline.sample(DRIFT_BULK_END).channels.scroll - 0.8).abs() < 1e-6);
        // Constant velocity: halfway through the bulk is half the target.
        let mid = (OPEN_END + DRIFT_BULK_END) / 2.0;
        assert!((timeline.sample(mid).channels.scroll - 0.4).abs() < 1e-6);
    }

    #[test]
    fn drift_tail_decelerates_into_one() {
        let timeline = timeline();
        let scroll_near_end = timeline.sample(DRIFT_TAIL_END - 1e-3).channels.scroll;
        assert!((scroll_near_end - 1.0).abs() < 1e-3);

        // Velocity in the tail falls off: the first half of the tail covers
        // more ground than the second half.
        let tail_mid = (DRIFT_BULK_END + DRIFT_TAIL_END) / 2.0;
        let first_half = timeline.sample(tail_mid).channels.scroll - 0.8;
        let second_half = scroll_near_end - timeline.sample(tail_mid).channels.scroll;
        assert!(first_half > second_half);
    }

    #[test]
    fn portfolio_advances_linearly_across_both_drift_phases() {
        let timeline = timeline();
        assert_eq!(timeline.sample(OPEN_END).channels.portfolio_progress.0, 0.0);
        assert!(
            (timeline.sample(DRIFT_BULK_END).channels.portfolio_progress.0 - 0.75).abs() < 1e-6
        );
        assert!(
            (timeline.sample(DRIFT_TAIL_END - 1e-4).channels.portfolio_progress.0 - 1.0).abs()
                < 1e-3
        );
    }

    #[test]
    fn scroll_is_monotonic_within_each_phase() {
        let timeline = timeline();
        let phases = [
            (OPEN_END, DRIFT_BULK_END),
            (DRIFT_BULK_END, DRIFT_TAIL_END),
        ];
        for (start, end) in phases {
            let mut prev = timeline.sample(start).channels.scroll;
            for step in 1..=20 {
                let u = start + (end - start) * step as f32 / 20.0 - 1e-4;
                let scroll = timeline.sample(u).channels.scroll;
                assert!(scroll >= prev - 1e-6);
                prev = scroll;
            }
        }
        // Close phase: monotonically back down.
        let mut prev = timeline.sample(CLOSE_START + 1e-4).channels.scroll;
        for step in 1..=20 {
            let u = CLOSE_START + (TIMELINE_LENGTH - CLOSE_START) * step as f32 / 20.0 - 1e-4;
            let scroll = timeline.sample(u).channels.scroll;
            assert!(scroll <= prev + 1e-6);
            prev = scroll;
        }
    }

    #[test]
    fn closed_mask_matches_grid_arithmetic() {
        let viewport = (1920.0, 1080.0);
        let mask = closed_mask(viewport);
        let cell_w = 1920.0 / 12.0;
        let cell_h = 1080.0 / 10.0;
        assert!((mask.border.width - (cell_w * 1.5 - 2.0)).abs() < 1e-4);
        assert!((mask.border.height - (cell_h * 8.0 - 2.0)).abs() < 1e-4);
        assert!((mask.grid_hole.width - (mask.border.width + 2.0)).abs() < 1e-4);
        // Pill is inset from the border by stroke plus the 0.1-cell gaps.
        assert!(
            (mask.pill.width - (mask.border.width - 2.0 - 2.0 * cell_w * 0.1)).abs() < 1e-4
        );
        // Everything is centered.
        assert!((mask.pill.x + mask.pill.width / 2.0 - 960.0).abs() < 1e-4);
        assert!((mask.pill.y + mask.pill.height / 2.0 - 540.0).abs() < 1e-4);
    }

    #[test]
    fn mask_expands_to_cover_viewport() {
        let timeline = timeline();
        let frame = timeline.sample(OPEN_END + 0.5);
        let side = 1920.0f32.max(1080.0) * 2.5;
        assert!((frame.mask.pill.width - side).abs() < 1e-3);
        assert!((frame.mask.pill.corner_radius - side / 2.0).abs() < 1e-3);
    }

    #[test]
    fn position_for_scroll_spans_the_pinned_distance() {
        let timeline = timeline();
        assert_eq!(timeline.position_for_scroll(0.0), 0.0);
        let full = 1080.0 * PINNED_VIEWPORT_HEIGHTS;
        assert!((timeline.position_for_scroll(full) - TIMELINE_LENGTH).abs() < 1e-4);
        assert!((timeline.position_for_scroll(full / 2.0) - TIMELINE_LENGTH / 2.0).abs() < 1e-4);
        // Over-scroll clamps.
        assert_eq!(timeline.position_for_scroll(full * 2.0), TIMELINE_LENGTH);
    }
}

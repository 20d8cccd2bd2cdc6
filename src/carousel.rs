//! The card carousel: each display card slides right-to-left across the
//! screen inside its own window of the shared portfolio progress channel.
//!
//! Motion within a window is a sinusoidally-warped linear ramp, fast near
//! the screen edges and slow around the center, chosen so the card crosses
//! the exact screen center at the window midpoint regardless of the warp
//! strength. Card content is opaque to the engine: it only scales the
//! declared card width and reports a translation and a fisheye scale for
//! the host layout layer to apply.

use crate::config::REFERENCE_VIEWPORT_WIDTH;

/// Warp strength of the position ramp. 0 is linear; values toward 1 make
/// the center dwell longer.
const WARP: f32 = 0.72;
/// Extra off-screen margin so card shadows never bleed into view.
const OFFSCREEN_MARGIN: f32 = 400.0;
/// Fisheye scale gain at the screen edge.
const FISHEYE_GAIN: f32 = 0.35;
/// Declared card width when a spec does not override it, reference px.
pub const DEFAULT_CARD_WIDTH: f32 = 480.0;

/// Global carousel progress, 0..1, produced by the scroll timeline.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PortfolioProgress(pub f32);

/// Media kind of a display card. The engine treats this as opaque metadata
/// for the host; it does not affect motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
    Gif,
}

/// One display card: declared width at reference resolution plus the
/// intrinsic pixel size used by the host to preserve aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSpec {
    pub kind: MediaKind,
    pub intrinsic: (u32, u32),
    pub width: f32,
}

impl CardSpec {
    pub fn new(kind: MediaKind, intrinsic: (u32, u32)) -> Self {
        Self {
            kind,
            intrinsic,
            width: DEFAULT_CARD_WIDTH,
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }
}

/// Entry/exit window of one card within the global progress range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTiming {
    pub enter_start: f32,
    pub enter_duration: f32,
    pub exit_duration: f32,
}

impl CardTiming {
    pub fn window_end(&self) -> f32 {
        self.enter_start + self.enter_duration + self.exit_duration
    }
}

/// Per-frame output for one card, applied by the host layout layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    /// Horizontal translation of the card's left edge, px.
    pub translate_x: f32,
    /// Fisheye scale from the card's instantaneous screen position.
    pub scale: f32,
    /// Scaled display width, px.
    pub width: f32,
}

/// Positions every card from the shared portfolio progress.
#[derive(Debug, Clone)]
pub struct Carousel {
    specs: Vec<CardSpec>,
    viewport_width: f32,
    card_scale: f32,
    spacing: f32,
}

impl Carousel {
    pub fn new(specs: Vec<CardSpec>, viewport_width: f32) -> Self {
        // Window spacing auto-fits every card into [0, 1]: (n-1) starts plus
        // one enter and one exit. The next card starts when the current one
        // reaches center, so at most two are ever mid-transit.
        let spacing = 1.0 / (specs.len() as f32 + 1.0);
        let mut carousel = Self {
            specs,
            viewport_width,
            card_scale: 1.0,
            spacing,
        };
        carousel.resize(viewport_width);
        carousel
    }

    /// Updates the responsive card scale for a new viewport width.
    pub fn resize(&mut self, viewport_width: f32) {
        self.viewport_width = viewport_width;
        self.card_scale = (viewport_width / REFERENCE_VIEWPORT_WIDTH).min(1.0);
    }

    pub fn card_count(&self) -> usize {
        self.specs.len()
    }

    /// Deterministic timing window for card `index`. Out-of-range indices
    /// clamp to the last card.
    pub fn timing(&self, index: usize) -> CardTiming {
        let index = index.min(self.specs.len().saturating_sub(1));
        CardTiming {
            enter_start: index as f32 * self.spacing,
            enter_duration: self.spacing,
            exit_duration: self.spacing,
        }
    }

    /// The transform for card `index` at `progress`. Out-of-range indices
    /// clamp to the last card.
    pub fn transform(&self, index: usize, progress: PortfolioProgress) -> CardTransform {
        if self.specs.is_empty() {
            return CardTransform {
                translate_x: self.viewport_width + OFFSCREEN_MARGIN,
                scale: 1.0,
                width: 0.0,
            };
        }
        let index = index.min(self.specs.len() - 1);
        let spec = &self.specs[index];
        let timing = self.timing(index);

        let width = (spec.width * self.card_scale).round();
        let start_x = self.viewport_width + OFFSCREEN_MARGIN;
        let end_x = -(width + OFFSCREEN_MARGIN);

        let pp = progress.0;
        let translate_x = if pp <= timing.enter_start {
            start_x
        } else if pp < timing.window_end() {
            let t = (pp - timing.enter_start) / (timing.enter_duration + timing.exit_duration);
            // velocity(t) = 1 + WARP·cos(2πt) → position(t) = t + WARP·sin(2πt)/(2π).
            // The sine term vanishes at t = 0.5, so the midpoint lands on the
            // exact screen center for any warp strength.
            let eased = t + WARP * (2.0 * std::f32::consts::PI * t).sin()
                / (2.0 * std::f32::consts::PI);
            start_x + (end_x - start_x) * eased
        } else {
            end_x
        };

        let card_mid = translate_x + width / 2.0;
        let center_offset = (card_mid - self.viewport_width / 2.0).abs()
            / (self.viewport_width * 0.5);
        let scale = 1.0 + center_offset.min(1.0) * FISHEYE_GAIN;

        CardTransform {
            translate_x,
            scale,
            width,
        }
    }

    /// Transforms for every card at `progress`, in card order.
    pub fn transforms(&self, progress: PortfolioProgress) -> Vec<CardTransform> {
        (0..self.specs.len())
            .map(|index| self.transform(index, progress))
            .collect()
    }

    /// How many cards are mid-transit at `progress`.
    pub fn in_transit(&self, progress: PortfolioProgress) -> usize {
        (0..self.specs.len())
            .filter(|&index| {
                let timing = self.timing(index);
                progress.0 >= timing.enter_start && progress.0 < timing.window_end()
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(n: usize) -> Vec<CardSpec> {
        (0..n)
            .map(|i| {
                CardSpec::new(
                    if i % 2 == 0 {
                        MediaKind::Video
                    } else {
                        MediaKind::Gif
                    },
                    (720, 1280),
                )
            })
            .collect()
    }

    #[test]
    fn card_is_centered_at_window_midpoint() {
        let carousel = Carousel::new(cards(19), 1920.0);
        for index in [0, 7, 18] {
            let timing = carousel.timing(index);
            let midpoint = timing.enter_start
                + (timing.enter_duration + timing.exit_duration) / 2.0;
            let transform = carousel.transform(index, PortfolioProgress(midpoint));
            let card_mid = transform.translate_x + transform.width / 2.0;
            assert!(
                (card_mid - 960.0).abs() < 1e-2,
                "card {index} mid {card_mid}"
            );
            // Centered card has no fisheye.
            assert!((transform.scale - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn cards_rest_offscreen_outside_their_window() {
        let carousel = Carousel::new(cards(5), 1920.0);
        let timing = carousel.timing(2);
        let before = carousel.transform(2, PortfolioProgress(timing.enter_start - 0.01));
        assert_eq!(before.translate_x, 1920.0 + 400.0);
        let after = carousel.transform(2, PortfolioProgress(timing.window_end() + 0.01));
        assert_eq!(after.translate_x, -(before.width + 400.0));
    }

    #[test]
    fn at_most_two_cards_in_transit() {
        let carousel = Carousel::new(cards(19), 1920.0);
        for step in 0..=1000 {
            let pp = PortfolioProgress(step as f32 / 1000.0);
            assert!(carousel.in_transit(pp) <= 2, "at pp {}", pp.0);
        }
    }

    #[test]
    fn motion_is_monotonically_leftward() {
        let carousel = Carousel::new(cards(7), 1920.0);
        let timing = carousel.timing(3);
        let mut prev = f32::MAX;
        for step in 0..=200 {
            let pp = timing.enter_start
                + (timing.enter_duration + timing.exit_duration) * step as f32 / 200.0;
            let x = carousel.transform(3, PortfolioProgress(pp)).translate_x;
            assert!(x <= prev + 1e-3);
            prev = x;
        }
    }

    #[test]
    fn fisheye_grows_toward_screen_edge() {
        let carousel = Carousel::new(cards(3), 1920.0);
        let timing = carousel.timing(0);
        let midpoint =
            timing.enter_start + (timing.enter_duration + timing.exit_duration) / 2.0;
        let centered = carousel.transform(0, PortfolioProgress(midpoint));
        let entering = carousel.transform(0, PortfolioProgress(midpoint / 4.0));
        assert!(entering.scale > centered.scale);
        assert!(entering.scale <= 1.0 + FISHEYE_GAIN + 1e-6);
    }

    #[test]
    fn card_scale_shrinks_below_reference_width() {
        let mut carousel = Carousel::new(vec![CardSpec::new(MediaKind::Image, (1600, 900))
            .with_width(960.0)], 2560.0);
        let timing = carousel.timing(0);
        let mid = timing.enter_start + (timing.enter_duration + timing.exit_duration) / 2.0;
        assert_eq!(carousel.transform(0, PortfolioProgress(mid)).width, 960.0);
        carousel.resize(1280.0);
        assert_eq!(carousel.transform(0, PortfolioProgress(mid)).width, 480.0);
    }

    #[test]
    fn out_of_range_index_clamps() {
        let carousel = Carousel::new(cards(3), 1920.0);
        let clamped = carousel.transform(99, PortfolioProgress(0.5));
        let last = carousel.transform(2, PortfolioProgress(0.5));
        assert_eq!(clamped, last);
    }
}

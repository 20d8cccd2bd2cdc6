//! Reference-resolution configuration for the particle field zones.
//!
//! All pixel-valued constants are authored against a reference viewport
//! width (a 4K display at 150% zoom, 2560 effective px) and multiplied by a
//! clamped responsive scale factor at resize time. Scaling happens in one
//! step: [`BandConfig::scaled`] returns a fully derived value set, so a
//! half-scaled configuration is never observable by the simulation.

use crate::color::{Color, Gradient};

/// Reference viewport width the band constants are authored against.
pub const REFERENCE_VIEWPORT_WIDTH: f32 = 2560.0;

/// Responsive scale factor for a viewport width, clamped to [0.55, 1.0].
///
/// The clamp bounds are part of the tuned look and are kept as-is rather
/// than derived.
pub fn viewport_scale(viewport_width: f32) -> f32 {
    (viewport_width / REFERENCE_VIEWPORT_WIDTH).clamp(0.55, 1.0)
}

/// Pointer-repulsion physics constants shared by both zone shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    /// Fraction of the anchor offset recovered per frame.
    pub return_speed: f32,
    /// Pointer influence radius in px.
    pub mouse_radius: f32,
    /// Peak displacement per frame at zero distance, in px.
    pub push_force: f32,
    /// Pointer speed (px/frame) below which repulsion is ignored.
    pub speed_threshold: f32,
    /// Offsets below this snap straight to the anchor.
    pub snap_distance: f32,
}

impl PhysicsConfig {
    pub const fn new(return_speed: f32, mouse_radius: f32, push_force: f32) -> Self {
        Self {
            return_speed,
            mouse_radius,
            push_force,
            speed_threshold: 0.5,
            snap_distance: 0.5,
        }
    }
}

/// Configuration for the banded (navbar-to-divider) particle zone.
///
/// Pixel values are at reference resolution; call [`BandConfig::scaled`]
/// with the current viewport width before generating a lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandConfig {
    /// Lattice spacing, px at reference viewport.
    pub gap: f32,
    /// Height of the navigation bar pinning the zone's top edge.
    pub nav_height: f32,
    pub max_radius: f32,
    pub anchor_radius: f32,
    pub line_width: f32,
    /// Radius falloff strength outside the ellipse.
    pub edge_shrink: f32,
    /// Dead radius around the zone center before the falloff starts.
    pub max_zone_radius: f32,
    /// Horizontal stretch applied to the falloff distance metric.
    pub h_stretch: f32,
    /// Ellipse semi-major axis as a fraction of viewport width.
    pub ellipse_a: f32,
    /// Ellipse semi-minor axis, px at reference viewport.
    pub ellipse_b: f32,
    /// Ellipse center as a fraction of zone height.
    pub ellipse_cy: f32,
    pub gradient: Gradient,
    pub physics: PhysicsConfig,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            gap: 47.0,
            nav_height: 88.0,
            max_radius: 25.0,
            anchor_radius: 5.0,
            line_width: 4.0,
            edge_shrink: 0.28,
            max_zone_radius: 0.0,
            h_stretch: 2.0,
            ellipse_a: 0.37,
            ellipse_b: 141.0,
            ellipse_cy: 0.333,
            gradient: Gradient::new(
                Color::rgb(106, 188, 255),
                Color::rgb(26, 121, 197),
                Color::rgb(39, 39, 39),
                0.45,
            ),
            physics: PhysicsConfig::new(0.012, 180.0, 5.0),
        }
    }
}

impl BandConfig {
    /// Applies the responsive viewport scale, returning a fully derived
    /// value set. Line width and anchor radius are floored so they stay
    /// visible at the smallest scale.
    pub fn scaled(&self, viewport_width: f32) -> ScaledBandConfig {
        let scale = viewport_scale(viewport_width);
        ScaledBandConfig {
            gap: (self.gap * scale).round(),
            nav_height: self.nav_height,
            max_radius: (self.max_radius * scale).round(),
            anchor_radius: (self.anchor_radius * scale).max(2.0),
            line_width: (self.line_width * scale).max(1.5),
            edge_shrink: self.edge_shrink,
            max_zone_radius: self.max_zone_radius,
            h_stretch: self.h_stretch,
            ellipse_a: self.ellipse_a,
            ellipse_b: (self.ellipse_b * scale).round(),
            ellipse_cy: self.ellipse_cy,
            gradient: self.gradient,
            physics: self.physics,
        }
    }
}

/// A [`BandConfig`] with the viewport scale already applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledBandConfig {
    pub gap: f32,
    pub nav_height: f32,
    pub max_radius: f32,
    pub anchor_radius: f32,
    pub line_width: f32,
    pub edge_shrink: f32,
    pub max_zone_radius: f32,
    pub h_stretch: f32,
    pub ellipse_a: f32,
    pub ellipse_b: f32,
    pub ellipse_cy: f32,
    pub gradient: Gradient,
    pub physics: PhysicsConfig,
}

/// Configuration for the circular "sphere" particle zone.
///
/// The sphere lives in its own square canvas with a fixed overhang on each
/// side so pushed particles never clip at the container edge. Its constants
/// are absolute (the zone scales with its container, not the viewport).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereConfig {
    pub gap: f32,
    pub max_radius: f32,
    /// Extra canvas px on each side of the logical container.
    pub overhang: f32,
    pub anchor_radius: f32,
    pub line_width: f32,
    /// Sphere radius as a multiple of the container half-size.
    pub radius_factor: f32,
    /// Radius falloff strength toward the sphere edge.
    pub edge_shrink: f32,
    /// Secondary focal point offset, as fractions of the container size.
    pub focus_offset: (f32, f32),
    pub gradient: Gradient,
    pub physics: PhysicsConfig,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            gap: 30.0,
            max_radius: 15.0,
            overhang: 200.0,
            anchor_radius: 2.0,
            line_width: 1.5,
            radius_factor: 1.2,
            edge_shrink: 0.80,
            focus_offset: (-0.05, -0.15),
            gradient: Gradient::new(
                Color::rgb(106, 188, 255),
                Color::rgb(26, 121, 197),
                Color::rgb(39, 39, 39),
                0.45,
            ),
            physics: PhysicsConfig::new(0.012, 75.0, 4.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_scale_clamps_to_bounds() {
        assert_eq!(viewport_scale(2560.0), 1.0);
        assert_eq!(viewport_scale(5000.0), 1.0);
        assert_eq!(viewport_scale(1280.0), 0.55);
        let mid = viewport_scale(1920.0);
        assert!(mid > 0.55 && mid < 1.0);
        assert!((mid - 0.75).abs() < 1e-6);
    }

    #[test]
    fn scaled_band_floors_line_width_and_anchor_radius() {
        let scaled = BandConfig::default().scaled(100.0);
        assert_eq!(scaled.line_width, 4.0 * 0.55);
        assert_eq!(scaled.anchor_radius, 5.0 * 0.55);

        // A hairline reference width hits the floors.
        let thin = BandConfig {
            line_width: 1.0,
            anchor_radius: 1.0,
            ..BandConfig::default()
        }
        .scaled(100.0);
        assert_eq!(thin.line_width, 1.5);
        assert_eq!(thin.anchor_radius, 2.0);
    }

    #[test]
    fn scaled_band_rounds_pixel_constants() {
        let scaled = BandConfig::default().scaled(1920.0);
        assert_eq!(scaled.gap, (47.0f32 * 0.75).round());
        assert_eq!(scaled.max_radius, (25.0f32 * 0.75).round());
        assert_eq!(scaled.ellipse_b, (141.0f32 * 0.75).round());
    }

    #[test]
    fn full_scale_is_identity_for_pixel_constants() {
        let config = BandConfig::default();
        let scaled = config.scaled(2560.0);
        assert_eq!(scaled.gap, config.gap);
        assert_eq!(scaled.max_radius, config.max_radius);
        assert_eq!(scaled.line_width, config.line_width);
    }
}

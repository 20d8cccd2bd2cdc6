//! Lattice generation for the particle field.
//!
//! A lattice is a rectangular grid of candidate cells clipped to a zone
//! shape. Each surviving cell becomes a [`Particle`] with an immutable
//! anchor, a color sampled from the zone gradient along its long axis, and
//! a radius shrunk toward the zone edge. The whole particle list is rebuilt
//! on every resize; callers must never observe a partially regenerated
//! lattice.

use crate::color::Color;
use crate::config::{ScaledBandConfig, SphereConfig};

/// A single spring-anchored particle.
///
/// `(target_x, target_y)` is the lattice anchor assigned at layout time and
/// never moves; `(x, y)` is the live simulated position. Radius and color
/// are derived from the anchor position once and stay fixed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub target_x: f32,
    pub target_y: f32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Color,
}

impl Particle {
    fn at_anchor(x: f32, y: f32, radius: f32, color: Color) -> Self {
        Self {
            target_x: x,
            target_y: y,
            x,
            y,
            radius,
            color,
        }
    }
}

/// A circular region whose cells are omitted from the lattice, used to keep
/// overlaid text legible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exclusion {
    pub center: (f32, f32),
    pub radius: f32,
}

impl Exclusion {
    fn contains(&self, x: f32, y: f32) -> bool {
        (x - self.center.0).hypot(y - self.center.1) < self.radius
    }
}

/// Vertical extent of the banded zone, derived from the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandZone {
    pub zone_top: f32,
    pub zone_height: f32,
}

/// Computes the band between the navigation bar and the divider headline,
/// fitting a whole number of rows and splitting the remainder as equal
/// top/bottom margin. The row count is always an integer so the zone is
/// recentered rather than stretched.
pub fn band_zone(viewport: (f32, f32), config: &ScaledBandConfig) -> BandZone {
    let (w, h) = viewport;

    // Divider headline height: text block at clamp(96px, 17vw, 300px) with
    // 0.88 line height, plus paddings and two double-rules.
    let font_size = (w * 0.17).clamp(96.0, 300.0);
    let divider_height = font_size * 0.88 + w * (0.01 + 0.003) + 2.0 * (24.0 + 2.0);

    let available = (h - config.nav_height - divider_height).max(config.gap * 2.0);
    let rows_fit = ((available / config.gap).floor()).max(2.0);
    let zone_height = rows_fit * config.gap;
    let margin = (available - zone_height) / 2.0;

    BandZone {
        zone_top: config.nav_height + margin,
        zone_height,
    }
}

/// Generates the banded (navbar-to-divider) particle lattice.
///
/// Returns an empty list for a non-positive viewport.
pub fn generate_band(
    viewport: (f32, f32),
    config: &ScaledBandConfig,
    exclusion: Option<Exclusion>,
) -> Vec<Particle> {
    let (w, h) = viewport;
    if w <= 0.0 || h <= 0.0 || config.gap <= 0.0 {
        return Vec::new();
    }

    let zone = band_zone(viewport, config);
    let gap = config.gap;

    let cols = (w / gap).ceil() as i32 + 2;
    let rows = (zone.zone_height / gap).ceil() as i32 + 2;
    let start_x = (w - (cols - 1) as f32 * gap) / 2.0;
    let start_y = zone.zone_top + (zone.zone_height - (rows - 1) as f32 * gap) / 2.0;

    let ellipse_a = w * config.ellipse_a;
    let ellipse_b = config.ellipse_b;
    let ellipse_cx = w / 2.0;
    let ellipse_cy = zone.zone_top + zone.zone_height * config.ellipse_cy;

    let zone_center_y = zone.zone_top + zone.zone_height / 2.0;
    let reference_radius = w.min(zone.zone_height) * 0.55;

    let mut particles = Vec::with_capacity((cols * rows) as usize);
    for c in 0..cols {
        for r in 0..rows {
            let px = start_x + c as f32 * gap;
            let py = start_y + r as f32 * gap;
            if px < -gap || px > w + gap {
                continue;
            }
            if py < zone.zone_top - 2.0 || py > zone.zone_top + zone.zone_height + 2.0 {
                continue;
            }
            if let Some(exclusion) = exclusion {
                if exclusion.contains(px, py) {
                    continue;
                }
            }

            let t = (py - zone.zone_top) / zone.zone_height;
            let color = config.gradient.sample(t);

            let edx = px - ellipse_cx;
            let edy = py - ellipse_cy;
            let ellipse_norm =
                ((edx * edx) / (ellipse_a * ellipse_a) + (edy * edy) / (ellipse_b * ellipse_b))
                    .sqrt();
            let inside_ellipse = ellipse_norm <= 1.0;

            let dx = px - w / 2.0;
            let dy = py - zone_center_y;
            let dist = (dx / config.h_stretch).hypot(dy);
            let falloff_dist = if config.max_zone_radius > 0.0 {
                (dist - config.max_zone_radius).max(0.0)
            } else {
                dist
            };
            let norm_dist = (falloff_dist / reference_radius).min(1.0);
            let radius = if inside_ellipse {
                config.max_radius * (1.0 - 0.14 * ellipse_norm)
            } else {
                config.max_radius * (1.0 - norm_dist * config.edge_shrink)
            };

            particles.push(Particle::at_anchor(px, py, radius.max(0.0), color));
        }
    }
    tracing::debug!(
        count = particles.len(),
        width = w,
        height = h,
        "regenerated band lattice"
    );
    particles
}

/// Generates the circular "sphere" particle lattice inside a square canvas
/// of `container_size + 2 · overhang` px. The sphere boundary is centered;
/// the radius-shrink uses both the boundary distance and a secondary focal
/// point offset up-left of center, taking the smaller of the two curves.
pub fn generate_sphere(
    container_size: f32,
    config: &SphereConfig,
    exclusion: Option<Exclusion>,
) -> Vec<Particle> {
    if container_size <= 0.0 || config.gap <= 0.0 {
        return Vec::new();
    }

    let center = config.overhang + container_size / 2.0;
    let (cx, cy) = (center, center);
    let radius = (container_size / 2.0) * config.radius_factor;
    let focus_x = cx + container_size * config.focus_offset.0;
    let focus_y = cy + container_size * config.focus_offset.1;

    let cells = ((radius * 2.0) / config.gap).ceil() as i32 + 4;
    let start_x = cx - ((cells - 1) as f32 * config.gap) / 2.0;
    let start_y = cy - ((cells - 1) as f32 * config.gap) / 2.0;

    let mut particles = Vec::new();
    for c in 0..cells {
        for r in 0..cells {
            let px = start_x + c as f32 * config.gap;
            let py = start_y + r as f32 * config.gap;
            let dist = (px - cx).hypot(py - cy);
            if dist > radius {
                continue;
            }
            if let Some(exclusion) = exclusion {
                if exclusion.contains(px, py) {
                    continue;
                }
            }

            let t = (py - (cy - radius)) / (radius * 2.0);
            let color = config.gradient.sample(t);

            let focus_dist = (px - focus_x).hypot(py - focus_y);
            let focus_radius =
                config.max_radius * (1.0 - config.edge_shrink * (focus_dist / radius)).max(0.0);
            let edge_radius = config.max_radius * (1.0 - config.edge_shrink * (dist / radius));
            let radius_px = focus_radius.min(edge_radius).max(0.0);

            particles.push(Particle::at_anchor(px, py, radius_px, color));
        }
    }
    tracing::debug!(
        count = particles.len(),
        container_size,
        "regenerated sphere lattice"
    );
    particles
}

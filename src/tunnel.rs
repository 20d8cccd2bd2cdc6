//! The instanced glyph tunnel: rows of letter instances spread out from the
//! screen center and recede into depth with a fisheye curve as the scroll
//! channels drive them.
//!
//! The per-instance placement is a pure function of (slot index, channels,
//! row parameters) and nothing else. The WGSL vertex shader evaluates the
//! same formula on the GPU; [`instance_placement`] exists so the math can
//! be exercised on the CPU. Keep the two in lockstep.

use smallvec::SmallVec;

use crate::timeline::Channels;

/// One row of the tunnel: a glyph repeated `instance_count` times, split
/// evenly left/right of center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowConfig {
    pub glyph: char,
    pub instance_count: u32,
    /// Multiplier on the horizontal drift speed.
    pub row_speed: f32,
    /// Extrusion depth of the dark back layer.
    pub extrusion_depth: f32,
}

/// Backdrop lattice of small white dots behind the rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotGridConfig {
    pub cols: u32,
    pub rows: u32,
    pub spacing: f32,
    pub dot_size: f32,
    pub z: f32,
}

impl Default for DotGridConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 50,
            spacing: 0.6,
            dot_size: 0.04,
            z: -5.0,
        }
    }
}

/// Perspective camera for both tunnel scenes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub z: f32,
    /// Amplitude of the gentle vertical float.
    pub float_amplitude: f32,
    /// Angular rate of the float, rad/s.
    pub float_rate: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 50.0,
            z: 15.0,
            float_amplitude: 0.2,
            float_rate: 0.5,
        }
    }
}

impl CameraConfig {
    /// Camera height at time `t`, seconds.
    pub fn float_y(&self, t: f32) -> f32 {
        (t * self.float_rate).sin() * self.float_amplitude
    }
}

/// Full tunnel configuration. The defaults carry the tuned look: the word
/// rows, their instance counts, drift speeds and extrusion depths.
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelConfig {
    pub rows: Vec<RowConfig>,
    /// Glyph quad size in world units.
    pub glyph_width: f32,
    pub glyph_height: f32,
    /// Slot-to-slot spacing at letter scale 1.
    pub spacing: f32,
    /// Extra vertical gap between rows; negative values overlap them.
    pub row_gap: f32,
    /// Depth gained at the far edge of the fisheye curve.
    pub depth_gain: f32,
    /// Distance fraction where the edge fade starts.
    pub edge_fade_start: f32,
    pub camera: CameraConfig,
    pub dot_grid: DotGridConfig,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            rows: vec![
                RowConfig {
                    glyph: 'L',
                    instance_count: 20,
                    row_speed: 1.0,
                    extrusion_depth: 0.12,
                },
                RowConfig {
                    glyph: 'A',
                    instance_count: 24,
                    row_speed: 1.6,
                    extrusion_depth: 0.18,
                },
                RowConfig {
                    glyph: 'B',
                    instance_count: 22,
                    row_speed: 1.45,
                    extrusion_depth: 0.08,
                },
                RowConfig {
                    glyph: 'S',
                    instance_count: 22,
                    row_speed: 1.0,
                    extrusion_depth: 0.15,
                },
            ],
            glyph_width: 1.2,
            glyph_height: 2.18,
            spacing: 1.8,
            row_gap: -0.60,
            depth_gain: 9.0,
            edge_fade_start: 0.65,
            camera: CameraConfig::default(),
            dot_grid: DotGridConfig::default(),
        }
    }
}

/// Tint of the extruded back layer behind each white glyph face.
pub const BACK_LAYER_TINT: [f32; 3] = [0.15, 0.15, 0.15];
pub const FRONT_LAYER_TINT: [f32; 3] = [1.0, 1.0, 1.0];

/// Per-row parameters the placement function needs, all as floats so the
/// uniform buffer and the CPU path share one representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowParams {
    pub row_index: f32,
    pub row_count: f32,
    pub instance_count: f32,
    pub row_speed: f32,
    pub depth_offset: f32,
}

/// Placement of one glyph instance, before camera projection.
///
/// The vertex pipeline composes it as: scale the quad by `letter_scale`,
/// add `offset`, then multiply the composed y by `y_stretch`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstancePlacement {
    pub offset: [f32; 3],
    pub y_stretch: f32,
    pub opacity: f32,
}

/// `smoothstep` with WGSL semantics; the edges may be descending.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// The instance transform, CPU side. Mirrors `tunnel.wgsl` exactly.
pub fn instance_placement(
    slot: f32,
    channels: &Channels,
    row: &RowParams,
    config: &TunnelConfig,
) -> InstancePlacement {
    let spacing = config.spacing * channels.letter_scale;
    let half = row.instance_count * 0.5;

    // Lower half of the slots goes left, upper half goes right.
    let is_right = if slot >= half { 1.0 } else { 0.0 };
    let direction = is_right * 2.0 - 1.0;
    let local = slot - is_right * half;

    let base_x = direction * (local + 0.5) * spacing * channels.spread;
    // Drift is scaled by spread so it vanishes in the closed state.
    let drift =
        -channels.scroll * 2.0 * row.row_speed * channels.letter_scale * channels.spread;
    let x = base_x + drift;

    let max_dist = half * spacing;
    let dist = x.abs();
    let normalized = if max_dist > 0.0 {
        (dist / max_dist).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let z = normalized * normalized * config.depth_gain + row.depth_offset;

    let center_to_center = (config.glyph_height + config.row_gap) * channels.letter_scale;
    let row_y = (row.row_index - (row.row_count - 1.0) * 0.5) * -center_to_center;

    InstancePlacement {
        offset: [x, row_y, z],
        y_stretch: 0.85 + normalized * 0.8,
        opacity: smoothstep(max_dist, max_dist * config.edge_fade_start, dist),
    }
}

/// One draw layer: a glyph texture plus row parameters and a tint. Every
/// row renders as two layers, the extruded dark back then the white front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayer {
    pub glyph: char,
    pub row: RowParams,
    pub tint: [f32; 3],
}

/// A hand-picked instance for the overlay scene, addressed by row and slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPick {
    pub row_index: usize,
    pub slot: u32,
}

/// Overlay instances that pop through the card carousel: three slots of the
/// first row and one of the last.
pub fn default_overlay_picks() -> SmallVec<[OverlayPick; 8]> {
    SmallVec::from_slice(&[
        OverlayPick {
            row_index: 0,
            slot: 0,
        },
        OverlayPick {
            row_index: 0,
            slot: 9,
        },
        OverlayPick {
            row_index: 0,
            slot: 12,
        },
        OverlayPick {
            row_index: 3,
            slot: 12,
        },
    ])
}

/// CPU-side description of the two tunnel scenes. The renderer turns this
/// into GPU resources once and then only updates uniforms per frame.
#[derive(Debug, Clone)]
pub struct TunnelScene {
    config: TunnelConfig,
    layers: SmallVec<[RowLayer; 8]>,
}

impl TunnelScene {
    pub fn new(config: TunnelConfig) -> Self {
        let row_count = config.rows.len() as f32;
        let mut layers = SmallVec::new();
        for (index, row) in config.rows.iter().enumerate() {
            let params = |depth_offset: f32| RowParams {
                row_index: index as f32,
                row_count,
                instance_count: row.instance_count as f32,
                row_speed: row.row_speed,
                depth_offset,
            };
            layers.push(RowLayer {
                glyph: row.glyph,
                row: params(-row.extrusion_depth),
                tint: BACK_LAYER_TINT,
            });
            layers.push(RowLayer {
                glyph: row.glyph,
                row: params(0.0),
                tint: FRONT_LAYER_TINT,
            });
        }
        Self { config, layers }
    }

    pub fn config(&self) -> &TunnelConfig {
        &self.config
    }

    /// Full-scene layers, back before front per row.
    pub fn layers(&self) -> &[RowLayer] {
        &self.layers
    }

    /// Layers for the overlay scene: for each pick, the back and front
    /// layer of its row restricted to the picked slot. Picks addressing
    /// rows or slots that do not exist are clamped.
    pub fn overlay_layers(
        &self,
        picks: &[OverlayPick],
    ) -> SmallVec<[(RowLayer, u32); 8]> {
        let mut layers = SmallVec::new();
        if self.config.rows.is_empty() {
            return layers;
        }
        for pick in picks {
            let row_index = pick.row_index.min(self.config.rows.len() - 1);
            let row = &self.config.rows[row_index];
            let slot = pick.slot.min(row.instance_count.saturating_sub(1));
            layers.push((self.layers[row_index * 2], slot));
            layers.push((self.layers[row_index * 2 + 1], slot));
        }
        layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::PortfolioProgress;

    fn open_channels() -> Channels {
        Channels {
            scroll: 0.0,
            spread: 1.0,
            letter_scale: 1.9,
            portfolio_progress: PortfolioProgress(0.0),
        }
    }

    fn first_row_params() -> RowParams {
        RowParams {
            row_index: 0.0,
            row_count: 4.0,
            instance_count: 20.0,
            row_speed: 1.0,
            depth_offset: 0.0,
        }
    }

    #[test]
    fn instances_split_symmetrically_around_center() {
        let config = TunnelConfig::default();
        let row = first_row_params();
        let channels = open_channels();
        // Slot 0 is the innermost left instance, slot 10 the innermost
        // right; slots 9 and 19 are the outermost pair.
        let inner_left = instance_placement(0.0, &channels, &row, &config);
        let inner_right = instance_placement(10.0, &channels, &row, &config);
        assert!((inner_left.offset[0] + inner_right.offset[0]).abs() < 1e-4);
        assert!(inner_right.offset[0] > 0.0);

        let outer_left = instance_placement(9.0, &channels, &row, &config);
        let outer_right = instance_placement(19.0, &channels, &row, &config);
        assert!((outer_left.offset[0] + outer_right.offset[0]).abs() < 1e-4);
        assert!(outer_right.offset[0] > inner_right.offset[0]);
    }

    #[test]
    fn drift_vanishes_when_closed() {
        let config = TunnelConfig::default();
        let row = first_row_params();
        let closed = Channels {
            scroll: 0.7,
            spread: 0.0,
            letter_scale: 1.0,
            portfolio_progress: PortfolioProgress(0.0),
        };
        for slot in 0..20 {
            let placement = instance_placement(slot as f32, &closed, &row, &config);
            assert_eq!(placement.offset[0], 0.0);
        }
    }

    #[test]
    fn depth_grows_quadratically_toward_the_edges() {
        let config = TunnelConfig::default();
        let row = first_row_params();
        let channels = open_channels();
        let inner = instance_placement(10.0, &channels, &row, &config);
        let outer = instance_placement(19.0, &channels, &row, &config);
        assert!(inner.offset[2] < outer.offset[2]);
        // Outermost instance: normalized distance 9.5/10, squared, times gain.
        let expected = config.depth_gain * (9.5f32 / 10.0) * (9.5 / 10.0);
        assert!((outer.offset[2] - expected).abs() < 1e-4);
        assert!(outer.offset[2] <= config.depth_gain + 1e-4);
    }

    #[test]
    fn edge_instances_fade_and_stretch() {
        let config = TunnelConfig::default();
        let row = first_row_params();
        let channels = open_channels();
        let inner = instance_placement(10.0, &channels, &row, &config);
        let outer = instance_placement(19.0, &channels, &row, &config);
        assert!(inner.opacity > 0.99);
        assert!(outer.opacity < inner.opacity);
        assert!(outer.y_stretch > inner.y_stretch);
        assert!((0.0..=1.0).contains(&outer.opacity));
    }

    #[test]
    fn rows_are_centered_vertically() {
        let config = TunnelConfig::default();
        let channels = open_channels();
        let mut row_ys = Vec::new();
        for index in 0..4 {
            let row = RowParams {
                row_index: index as f32,
                row_count: 4.0,
                instance_count: 20.0,
                row_speed: 1.0,
                depth_offset: 0.0,
            };
            row_ys.push(instance_placement(10.0, &channels, &row, &config).offset[1]);
        }
        let sum: f32 = row_ys.iter().sum();
        assert!(sum.abs() < 1e-4);
        // Evenly spaced.
        let step = row_ys[1] - row_ys[0];
        for pair in row_ys.windows(2) {
            assert!((pair[1] - pair[0] - step).abs() < 1e-4);
        }
    }

    #[test]
    fn scene_builds_two_layers_per_row() {
        let scene = TunnelScene::new(TunnelConfig::default());
        assert_eq!(scene.layers().len(), 8);
        assert_eq!(scene.layers()[0].tint, BACK_LAYER_TINT);
        assert_eq!(scene.layers()[1].tint, FRONT_LAYER_TINT);
        assert!(scene.layers()[0].row.depth_offset < 0.0);
        assert_eq!(scene.layers()[1].row.depth_offset, 0.0);
    }

    #[test]
    fn overlay_picks_expand_to_layer_pairs_and_clamp() {
        let scene = TunnelScene::new(TunnelConfig::default());
        let picks = default_overlay_picks();
        let layers = scene.overlay_layers(&picks);
        assert_eq!(layers.len(), picks.len() * 2);
        assert_eq!(layers[0].1, 0);
        assert_eq!(layers[2].1, 9);

        let wild = [OverlayPick {
            row_index: 99,
            slot: 999,
        }];
        let clamped = scene.overlay_layers(&wild);
        assert_eq!(clamped.len(), 2);
        assert_eq!(clamped[0].1, 21);
        assert_eq!(clamped[0].0.row.row_index, 3.0);
    }

    #[test]
    fn smoothstep_handles_descending_edges() {
        assert_eq!(smoothstep(1.0, 0.5, 1.2), 0.0);
        assert_eq!(smoothstep(1.0, 0.5, 0.4), 1.0);
        let mid = smoothstep(1.0, 0.5, 0.75);
        assert!(mid > 0.4 && mid < 0.6);
    }
}

//! Deterministic scene builders shared by vitrine's integration tests,
//! benches and demo binaries. Everything here is reproducible: fixed
//! viewports, scripted pointer paths, and a font-free glyph rasterizer.

use vitrine::{
    BandConfig, CardSpec, Carousel, FieldEngine, GlyphImage, GlyphRasterizer, GlyphStyle,
    MediaKind, SphereConfig, TunnelConfig, TunnelScene,
};

pub const VIEWPORT: (f32, f32) = (1920.0, 1080.0);

/// A band field laid out for the reference test viewport.
pub fn band_field() -> FieldEngine {
    let mut engine = FieldEngine::band(BandConfig::default());
    engine.resize(VIEWPORT);
    engine
}

/// A sphere field in a 600 px container.
pub fn sphere_field() -> FieldEngine {
    let mut engine = FieldEngine::sphere(SphereConfig::default());
    engine.resize((600.0, 600.0));
    engine
}

/// The default tunnel scene.
pub fn tunnel_scene() -> TunnelScene {
    TunnelScene::new(TunnelConfig::default())
}

/// A card list shaped like a real works gallery: portrait and landscape
/// entries of each media kind.
pub fn demo_cards() -> Vec<CardSpec> {
    vec![
        CardSpec::new(MediaKind::Video, (1500, 1500)).with_width(960.0),
        CardSpec::new(MediaKind::Video, (720, 1280)),
        CardSpec::new(MediaKind::Video, (720, 1280)),
        CardSpec::new(MediaKind::Video, (1080, 1080)).with_width(960.0),
        CardSpec::new(MediaKind::Gif, (1600, 900)).with_width(960.0),
        CardSpec::new(MediaKind::Video, (828, 1106)).with_width(720.0),
        CardSpec::new(MediaKind::Video, (1920, 1080)).with_width(960.0),
        CardSpec::new(MediaKind::Gif, (1080, 1350)).with_width(768.0),
        CardSpec::new(MediaKind::Video, (720, 900)).with_width(768.0),
        CardSpec::new(MediaKind::Image, (1494, 1080)).with_width(960.0),
        CardSpec::new(MediaKind::Video, (1500, 1500)).with_width(768.0),
        CardSpec::new(MediaKind::Video, (1300, 1300)).with_width(768.0),
    ]
}

/// A carousel over [`demo_cards`] at the test viewport.
pub fn demo_carousel() -> Carousel {
    Carousel::new(demo_cards(), VIEWPORT.0)
}

/// A pointer sweeping a full circle through the field, `steps` samples.
pub fn circular_pointer_trace(center: (f32, f32), radius: f32, steps: usize) -> Vec<(f32, f32)> {
    (0..steps)
        .map(|step| {
            let angle = step as f32 / steps as f32 * std::f32::consts::TAU;
            (
                center.0 + angle.cos() * radius,
                center.1 + angle.sin() * radius,
            )
        })
        .collect()
}

/// Timeline positions covering every phase boundary and interior point.
pub fn scroll_script() -> Vec<f32> {
    let mut script = Vec::new();
    let mut u = 0.0;
    while u <= vitrine::TIMELINE_LENGTH {
        script.push(u);
        u += 0.05;
    }
    script
}

// ── Font-free glyph rasterizer ───────────────────────────────────────────────

/// 3×5 block patterns for the letters the default scene uses. Anything else
/// rasterizes as a filled box, which is enough to exercise the pipelines.
fn block_pattern(character: char) -> [u8; 15] {
    match character.to_ascii_uppercase() {
        'L' => [
            1, 0, 0, //
            1, 0, 0, //
            1, 0, 0, //
            1, 0, 0, //
            1, 1, 1,
        ],
        'A' => [
            0, 1, 0, //
            1, 0, 1, //
            1, 1, 1, //
            1, 0, 1, //
            1, 0, 1,
        ],
        'B' => [
            1, 1, 0, //
            1, 0, 1, //
            1, 1, 0, //
            1, 0, 1, //
            1, 1, 0,
        ],
        'S' => [
            0, 1, 1, //
            1, 0, 0, //
            0, 1, 0, //
            0, 0, 1, //
            1, 1, 0,
        ],
        _ => [1; 15],
    }
}

/// Rasterizes characters as chunky block glyphs: white fill, transparent
/// background, horizontally condensed per the style descriptor.
pub struct BlockGlyphRasterizer {
    pub side: u32,
}

impl Default for BlockGlyphRasterizer {
    fn default() -> Self {
        Self { side: 256 }
    }
}

impl GlyphRasterizer for BlockGlyphRasterizer {
    fn rasterize(&self, character: char, style: &GlyphStyle) -> GlyphImage {
        let side = self.side;
        let pattern = block_pattern(character);
        let mut rgba = vec![0u8; (side as usize) * (side as usize) * 4];

        let glyph_height = side as f32 * style.font_scale;
        let glyph_width = glyph_height * (3.0 / 5.0) * style.condensed_scale;
        let cell_w = glyph_width / 3.0;
        let cell_h = glyph_height / 5.0;
        let origin_x = (side as f32 - glyph_width) / 2.0;
        let origin_y = (side as f32 - glyph_height) / 2.0;

        for y in 0..side {
            for x in 0..side {
                let col = ((x as f32 - origin_x) / cell_w).floor();
                let row = ((y as f32 - origin_y) / cell_h).floor();
                if !(0.0..3.0).contains(&col) || !(0.0..5.0).contains(&row) {
                    continue;
                }
                if pattern[row as usize * 3 + col as usize] == 1 {
                    let offset = ((y * side + x) * 4) as usize;
                    rgba[offset..offset + 4].copy_from_slice(&[255, 255, 255, 255]);
                }
            }
        }

        GlyphImage::new(side, rgba).expect("block glyph dimensions are consistent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_rasterizer_produces_square_alpha_keyed_images() {
        let rasterizer = BlockGlyphRasterizer::default();
        let image = rasterizer.rasterize('L', &GlyphStyle::default());
        assert_eq!(image.rgba.len(), 256 * 256 * 4);
        let opaque = image.rgba.chunks(4).filter(|px| px[3] == 255).count();
        let transparent = image.rgba.chunks(4).filter(|px| px[3] == 0).count();
        assert!(opaque > 0);
        assert!(transparent > opaque);
    }

    #[test]
    fn pointer_trace_is_deterministic() {
        let a = circular_pointer_trace((100.0, 100.0), 50.0, 16);
        let b = circular_pointer_trace((100.0, 100.0), 50.0, 16);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }
}

pub use wgpu;

mod cache;
mod carousel;
mod color;
mod config;
mod field;
mod glyph;
mod lattice;
mod pipeline;
mod pointer;
mod renderer;
mod shape;
mod stroke;
mod texture_manager;
mod timeline;
mod tunnel;
mod util;
mod vertex;

pub use carousel::{
    CardSpec, CardTiming, CardTransform, Carousel, MediaKind, PortfolioProgress,
    DEFAULT_CARD_WIDTH,
};
pub use color::{Color, Gradient};
pub use config::{
    viewport_scale, BandConfig, PhysicsConfig, ScaledBandConfig, SphereConfig,
    REFERENCE_VIEWPORT_WIDTH,
};
pub use field::{repulsion_force, FieldEngine};
pub use glyph::{GlyphImage, GlyphRasterizer, GlyphStyle};
pub use lattice::{band_zone, generate_band, generate_sphere, BandZone, Exclusion, Particle};
pub use pointer::{PointerSample, PointerTracker, POINTER_IDLE_DEBOUNCE};
pub use renderer::{Renderer, RendererError};
pub use shape::Shape;
pub use stroke::Stroke;
pub use texture_manager::{TextureManager, TextureManagerError};
pub use timeline::{
    closed_mask, ease, Channels, MaskGeometry, RectAttr, Timeline, TimelineFrame,
    DRIFT_BULK_END, DRIFT_TAIL_END, OPEN_END, PINNED_VIEWPORT_HEIGHTS, TIMELINE_LENGTH,
};
pub use tunnel::{
    default_overlay_picks, instance_placement, smoothstep, CameraConfig, DotGridConfig,
    InstancePlacement, OverlayPick, RowConfig, RowParams, TunnelConfig, TunnelScene,
};

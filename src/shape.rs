//! The `shape` module provides the 2D geometry the particle field is drawn
//! with: filled discs and anchor-to-particle connecting lines. Shapes are
//! tessellated with lyon's fill tessellator; disc tessellations are cached
//! by radius since a field reuses a handful of radii across thousands of
//! particles.
//!
//! # Examples
//!
//! ```rust
//! use vitrine::{Color, Shape, Stroke};
//!
//! // A particle disc
//! let disc = Shape::circle((120.0, 80.0), 12.5, Color::rgb(26, 121, 197));
//!
//! // The line connecting its anchor to its displaced position
//! let tether = Shape::line((120.0, 80.0), (131.0, 86.0), Stroke::new(4.0, Color::WHITE));
//! ```

use crate::util::PoolManager;
use crate::vertex::ShapeVertex;
use crate::{Color, Stroke};
use ahash::AHasher;
use lyon::lyon_tessellation::{
    BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers,
};
use lyon::math::point;
use lyon::path::Winding;
use lyon::tessellation::FillVertexConstructor;
use std::hash::{Hash, Hasher};

/// A filled disc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleShape {
    pub center: (f32, f32),
    pub radius: f32,
    pub fill: Color,
}

/// A straight segment drawn as a filled quad of the given width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineShape {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub stroke: Stroke,
}

/// A 2D shape the field renderer can draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle(CircleShape),
    Line(LineShape),
}

impl Shape {
    pub fn circle(center: (f32, f32), radius: f32, fill: Color) -> Shape {
        Shape::Circle(CircleShape {
            center,
            radius,
            fill,
        })
    }

    pub fn line(from: (f32, f32), to: (f32, f32), stroke: Stroke) -> Shape {
        Shape::Line(LineShape { from, to, stroke })
    }

    /// Cache key for tessellations that are position-independent. Discs are
    /// tessellated at the origin and translated on emit; lines change every
    /// frame and are not cached.
    pub(crate) fn tessellation_cache_key(&self) -> Option<u64> {
        match self {
            Shape::Circle(circle) => {
                let mut hasher = AHasher::default();
                0u8.hash(&mut hasher);
                circle.radius.to_bits().hash(&mut hasher);
                Some(hasher.finish())
            }
            Shape::Line(_) => None,
        }
    }

    pub(crate) fn tessellate(
        &self,
        order: f32,
        tessellator: &mut FillTessellator,
        pools: &mut PoolManager,
    ) -> VertexBuffers<ShapeVertex, u16> {
        match self {
            Shape::Circle(circle) => {
                let cache_key = self
                    .tessellation_cache_key()
                    .expect("circles always have a cache key");
                let mut buffers = match pools.tessellation_cache.get_vertex_buffers(&cache_key) {
                    Some(cached) => cached,
                    None => {
                        let unit = tessellate_circle_at_origin(circle.radius, tessellator, pools);
                        pools
                            .tessellation_cache
                            .insert_vertex_buffers(cache_key, unit.clone());
                        unit
                    }
                };
                let color = circle.fill.normalize();
                for vertex in buffers.vertices.iter_mut() {
                    vertex.position[0] += circle.center.0;
                    vertex.position[1] += circle.center.1;
                    vertex.order = order;
                    vertex.color = color;
                }
                buffers
            }
            Shape::Line(line) => tessellate_line(line, order, tessellator, pools),
        }
    }
}

struct ShapeVertexCtor {
    order: f32,
    color: [f32; 4],
}

impl FillVertexConstructor<ShapeVertex> for ShapeVertexCtor {
    fn new_vertex(&mut self, vertex: FillVertex) -> ShapeVertex {
        let position = vertex.position();
        ShapeVertex {
            position: [position.x, position.y],
            order: self.order,
            color: self.color,
        }
    }
}

const CIRCLE_TOLERANCE: f32 = 0.1;

fn tessellate_circle_at_origin(
    radius: f32,
    tessellator: &mut FillTessellator,
    pools: &mut PoolManager,
) -> VertexBuffers<ShapeVertex, u16> {
    let mut builder = lyon::path::Path::builder();
    builder.add_circle(point(0.0, 0.0), radius.max(0.0), Winding::Positive);
    let path = builder.build();

    let mut buffers = pools.lyon_vertex_buffers_pool.get_vertex_buffers();
    let ctor = ShapeVertexCtor {
        order: 0.0,
        color: [1.0, 1.0, 1.0, 1.0],
    };
    let result = tessellator.tessellate_path(
        &path,
        &FillOptions::tolerance(CIRCLE_TOLERANCE),
        &mut BuffersBuilder::new(&mut buffers, ctor),
    );
    if let Err(error) = result {
        tracing::warn!(?error, radius, "circle tessellation failed");
        buffers.vertices.clear();
        buffers.indices.clear();
    }
    buffers
}

fn tessellate_line(
    line: &LineShape,
    order: f32,
    tessellator: &mut FillTessellator,
    pools: &mut PoolManager,
) -> VertexBuffers<ShapeVertex, u16> {
    let (x0, y0) = line.from;
    let (x1, y1) = line.to;
    let dx = x1 - x0;
    let dy = y1 - y0;
    let length = dx.hypot(dy);

    let mut buffers = pools.lyon_vertex_buffers_pool.get_vertex_buffers();
    if length <= f32::EPSILON || line.stroke.is_empty() {
        return buffers;
    }

    // Perpendicular half-width offset for the quad corners.
    let half = line.stroke.width * 0.5;
    let nx = -dy / length * half;
    let ny = dx / length * half;

    let mut builder = lyon::path::Path::builder();
    builder.begin(point(x0 + nx, y0 + ny));
    builder.line_to(point(x1 + nx, y1 + ny));
    builder.line_to(point(x1 - nx, y1 - ny));
    builder.line_to(point(x0 - nx, y0 - ny));
    builder.close();
    let path = builder.build();

    let ctor = ShapeVertexCtor {
        order,
        color: line.stroke.color.normalize(),
    };
    let result = tessellator.tessellate_path(
        &path,
        &FillOptions::DEFAULT,
        &mut BuffersBuilder::new(&mut buffers, ctor),
    );
    if let Err(error) = result {
        tracing::warn!(?error, "line tessellation failed");
        buffers.vertices.clear();
        buffers.indices.clear();
    }
    buffers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_cache_key_depends_on_radius_only() {
        let a = Shape::circle((0.0, 0.0), 12.0, Color::WHITE);
        let b = Shape::circle((500.0, 300.0), 12.0, Color::BLACK);
        let c = Shape::circle((0.0, 0.0), 12.5, Color::WHITE);
        assert_eq!(a.tessellation_cache_key(), b.tessellation_cache_key());
        assert_ne!(a.tessellation_cache_key(), c.tessellation_cache_key());
    }

    #[test]
    fn lines_are_not_cached() {
        let line = Shape::line((0.0, 0.0), (10.0, 0.0), Stroke::new(2.0, Color::WHITE));
        assert_eq!(line.tessellation_cache_key(), None);
    }

    #[test]
    fn circle_tessellation_is_translated_to_center() {
        let mut tessellator = FillTessellator::new();
        let mut pools = PoolManager::new();
        let shape = Shape::circle((100.0, 50.0), 10.0, Color::rgb(10, 20, 30));
        let buffers = shape.tessellate(0.5, &mut tessellator, &mut pools);
        assert!(!buffers.vertices.is_empty());
        for vertex in &buffers.vertices {
            assert!(vertex.position[0] >= 100.0 - 10.0 - 1.0);
            assert!(vertex.position[0] <= 100.0 + 10.0 + 1.0);
            assert!(vertex.position[1] >= 50.0 - 10.0 - 1.0);
            assert!(vertex.position[1] <= 50.0 + 10.0 + 1.0);
            assert_eq!(vertex.order, 0.5);
        }
    }

    #[test]
    fn degenerate_line_tessellates_to_nothing() {
        let mut tessellator = FillTessellator::new();
        let mut pools = PoolManager::new();
        let shape = Shape::line((5.0, 5.0), (5.0, 5.0), Stroke::new(2.0, Color::WHITE));
        let buffers = shape.tessellate(0.0, &mut tessellator, &mut pools);
        assert!(buffers.vertices.is_empty());
    }
}

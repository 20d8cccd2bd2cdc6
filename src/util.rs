use crate::cache::Cache;
use crate::vertex::ShapeVertex;
use lyon::tessellation::VertexBuffers;
use std::num::NonZeroUsize;

pub fn normalize_rgba_color(color: &[u8; 4]) -> [f32; 4] {
    [
        color[0] as f32 / 255.0,
        color[1] as f32 / 255.0,
        color[2] as f32 / 255.0,
        color[3] as f32 / 255.0,
    ]
}

#[inline(always)]
pub fn to_logical(physical_size: (u32, u32), scale_factor: f64) -> (f32, f32) {
    let (physical_width, physical_height) = physical_size;
    let logical_width = physical_width as f64 / scale_factor;
    let logical_height = physical_height as f64 / scale_factor;
    (logical_width as f32, logical_height as f32)
}

pub struct LyonVertexBuffersPool {
    vertex_buffers: Vec<VertexBuffers<ShapeVertex, u16>>,
}

impl Default for LyonVertexBuffersPool {
    fn default() -> Self {
        Self::new()
    }
}

impl LyonVertexBuffersPool {
    pub fn new() -> Self {
        Self {
            vertex_buffers: Vec::new(),
        }
    }

    pub fn get_vertex_buffers(&mut self) -> VertexBuffers<ShapeVertex, u16> {
        if let Some(mut vertex_buffers) = self.vertex_buffers.pop() {
            vertex_buffers.vertices.clear();
            vertex_buffers.indices.clear();
            vertex_buffers
        } else {
            VertexBuffers::new()
        }
    }

    pub fn return_vertex_buffers(&mut self, buffers: VertexBuffers<ShapeVertex, u16>) {
        self.vertex_buffers.push(buffers);
    }
}

/// Tessellations of the particle discs repeat heavily (a field reuses a
/// handful of radii across thousands of particles), so the cache can stay
/// small.
const TESSELLATION_CACHE_SIZE: usize = 512;

pub struct PoolManager {
    pub lyon_vertex_buffers_pool: LyonVertexBuffersPool,
    pub tessellation_cache: Cache,
}

impl Default for PoolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolManager {
    pub fn new() -> Self {
        Self {
            lyon_vertex_buffers_pool: LyonVertexBuffersPool::new(),
            tessellation_cache: Cache::new(
                NonZeroUsize::new(TESSELLATION_CACHE_SIZE).expect("nonzero cache size"),
            ),
        }
    }
}

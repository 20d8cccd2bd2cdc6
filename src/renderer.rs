//! The surface-owning renderer. One `Renderer` drives one drawing surface,
//! mirroring the page layout: the particle field and the main tunnel each
//! render to an opaque surface, and the overlay glyphs render to a
//! transparent one composited above the card carousel by the host.
//!
//! All GPU resources are owned here and released when the renderer drops;
//! no frame can fire afterwards. A surface that cannot produce frames
//! degrades to a per-frame no-op rather than an error.

use std::sync::Arc;

use bytemuck::Zeroable;
use lyon::tessellation::FillTessellator;
use wgpu::util::DeviceExt;
use wgpu::{CompositeAlphaMode, InstanceDescriptor, SurfaceTarget};

use crate::glyph::{GlyphRasterizer, GlyphStyle};
use crate::pipeline::{
    create_depth_texture, create_depth_texture_view, create_dot_pipeline, create_glyph_pipeline,
    create_shape_pipeline, view_projection, CameraUniforms, DotPipeline, GlyphPipeline,
    ShapePipeline, ShapeUniforms, TunnelUniforms,
};
use crate::shape::Shape;
use crate::texture_manager::TextureManager;
use crate::timeline::Channels;
use crate::tunnel::{OverlayPick, RowParams, TunnelScene};
use crate::util::{to_logical, PoolManager};
use crate::vertex::{DotVertex, GlyphInstance, GlyphVertex};

/// Construction-time failures. Everything after construction degrades
/// silently at frame granularity instead of erroring.
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("failed to create rendering surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible graphics adapter: {0}")]
    AdapterNotFound(#[from] wgpu::RequestAdapterError),
    #[error("failed to acquire graphics device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("the surface has no supported configuration")]
    SurfaceConfiguration,
}

/// Painter's depth for 2D draw commands: earlier commands sit deeper.
#[inline(always)]
pub fn depth(draw_command_id: usize, draw_commands_total: usize) -> f32 {
    (1.0 - (draw_command_id as f32 / draw_commands_total as f32)).clamp(0.0000000001, 0.9999999999)
}

struct LayerDrawData {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture_id: u64,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    row: RowParams,
    tint: [f32; 3],
}

struct TunnelDrawData {
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
    layers: Vec<LayerDrawData>,
    dots_vertex_buffer: Option<wgpu::Buffer>,
    dots_vertex_count: u32,
    camera: crate::tunnel::CameraConfig,
    spacing: f32,
    row_gap: f32,
    glyph_height: f32,
    depth_gain: f32,
    edge_fade_start: f32,
}

pub struct Renderer<'a> {
    /// Size of the surface in physical px.
    pub(crate) physical_size: (u32, u32),
    scale_factor: f64,

    surface: wgpu::Surface<'a>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    transparent: bool,

    depth_texture_view: wgpu::TextureView,

    shape_pipeline: ShapePipeline,
    glyph_pipeline: GlyphPipeline,
    dot_pipeline: DotPipeline,

    texture_manager: TextureManager,
    tessellator: FillTessellator,
    pools: PoolManager,

    /// 2D shapes queued for the next frame, in paint order.
    shape_queue: Vec<Shape>,

    tunnel: Option<TunnelDrawData>,

    /// Set after the first unrecoverable surface error so the warning is
    /// logged once and subsequent frames no-op quietly.
    surface_degraded: bool,
}

impl Renderer<'_> {
    /// Creates a renderer for the given surface target. `transparent`
    /// selects a transparent clear for overlay compositing.
    pub async fn new(
        window: impl Into<SurfaceTarget<'static>>,
        physical_size: (u32, u32),
        scale_factor: f64,
        transparent: bool,
    ) -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(&InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("vitrine device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let mut config = surface
            .get_default_config(&adapter, physical_size.0.max(1), physical_size.1.max(1))
            .ok_or(RendererError::SurfaceConfiguration)?;
        if transparent {
            let supported = surface.get_capabilities(&adapter).alpha_modes;
            if supported.contains(&CompositeAlphaMode::PreMultiplied) {
                config.alpha_mode = CompositeAlphaMode::PreMultiplied;
            } else if supported.contains(&CompositeAlphaMode::PostMultiplied) {
                config.alpha_mode = CompositeAlphaMode::PostMultiplied;
            }
        }
        surface.configure(&device, &config);

        let canvas_logical_size = to_logical(physical_size, scale_factor);
        let shape_pipeline = create_shape_pipeline(&device, config.format, canvas_logical_size);

        let texture_manager = TextureManager::new(device.clone(), queue.clone());
        let glyph_pipeline =
            create_glyph_pipeline(&device, config.format, texture_manager.bind_group_layout());
        let dot_pipeline = create_dot_pipeline(&device, config.format);

        let depth_texture = create_depth_texture(&device, physical_size);
        let depth_texture_view = create_depth_texture_view(&depth_texture);

        tracing::debug!(?physical_size, scale_factor, transparent, "renderer created");

        Ok(Self {
            physical_size,
            scale_factor,
            surface,
            device,
            queue,
            config,
            transparent,
            depth_texture_view,
            shape_pipeline,
            glyph_pipeline,
            dot_pipeline,
            texture_manager,
            tessellator: FillTessellator::new(),
            pools: PoolManager::new(),
            shape_queue: Vec::new(),
            tunnel: None,
            surface_degraded: false,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.physical_size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Reconfigures the surface and every size-derived resource for a new
    /// physical size. A zero-sized surface leaves the old configuration in
    /// place; frames are skipped until a valid size arrives.
    pub fn resize(&mut self, physical_size: (u32, u32)) {
        self.physical_size = physical_size;
        if physical_size.0 == 0 || physical_size.1 == 0 {
            return;
        }
        self.config.width = physical_size.0;
        self.config.height = physical_size.1;
        self.surface.configure(&self.device, &self.config);

        let depth_texture = create_depth_texture(&self.device, physical_size);
        self.depth_texture_view = create_depth_texture_view(&depth_texture);

        let logical = to_logical(physical_size, self.scale_factor);
        self.queue.write_buffer(
            &self.shape_pipeline.uniform_buffer,
            0,
            bytemuck::cast_slice(&[ShapeUniforms::new(logical.0, logical.1)]),
        );
        self.surface_degraded = false;
    }

    /// Queues 2D shapes for the next frame, in paint order.
    pub fn add_shapes(&mut self, shapes: impl IntoIterator<Item = Shape>) {
        self.shape_queue.extend(shapes);
    }

    pub fn clear_draw_queue(&mut self) {
        self.shape_queue.clear();
    }

    /// Builds GPU resources for the full tunnel scene: every row as a
    /// back/front layer pair, plus the backdrop dot lattice.
    pub fn set_tunnel_scene(&mut self, scene: &TunnelScene, rasterizer: &dyn GlyphRasterizer) {
        let layers: Vec<_> = scene
            .layers()
            .iter()
            .map(|layer| (*layer, None::<u32>))
            .collect();
        self.build_tunnel(scene, &layers, rasterizer, true);
    }

    /// Builds GPU resources for the overlay scene: only the picked
    /// instances, no backdrop, meant for a transparent surface.
    pub fn set_overlay_scene(
        &mut self,
        scene: &TunnelScene,
        picks: &[OverlayPick],
        rasterizer: &dyn GlyphRasterizer,
    ) {
        let layers: Vec<_> = scene
            .overlay_layers(picks)
            .into_iter()
            .map(|(layer, slot)| (layer, Some(slot)))
            .collect();
        self.build_tunnel(scene, &layers, rasterizer, false);
    }

    fn build_tunnel(
        &mut self,
        scene: &TunnelScene,
        layers: &[(crate::tunnel::RowLayer, Option<u32>)],
        rasterizer: &dyn GlyphRasterizer,
        include_dots: bool,
    ) {
        let config = scene.config();
        let style = GlyphStyle::default();

        let half_w = config.glyph_width / 2.0;
        let half_h = config.glyph_height / 2.0;
        let quad = [
            GlyphVertex {
                position: [-half_w, -half_h],
                uv: [0.0, 1.0],
            },
            GlyphVertex {
                position: [half_w, -half_h],
                uv: [1.0, 1.0],
            },
            GlyphVertex {
                position: [half_w, half_h],
                uv: [1.0, 0.0],
            },
            GlyphVertex {
                position: [-half_w, half_h],
                uv: [0.0, 0.0],
            },
        ];
        let quad_indices: [u16; 6] = [0, 1, 2, 2, 3, 0];
        let quad_vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Glyph Quad Vertex Buffer"),
                contents: bytemuck::cast_slice(&quad),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let quad_index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Glyph Quad Index Buffer"),
                contents: bytemuck::cast_slice(&quad_indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let mut layer_data = Vec::with_capacity(layers.len());
        for (layer, pick) in layers {
            let texture_id = layer.glyph as u32 as u64;
            if !self.texture_manager.is_texture_loaded(texture_id) {
                let image = rasterizer.rasterize(layer.glyph, &style);
                self.texture_manager.upload_glyph(texture_id, &image);
            }

            let instances: Vec<GlyphInstance> = match pick {
                Some(slot) => vec![GlyphInstance {
                    slot_index: *slot as f32,
                }],
                None => (0..layer.row.instance_count as u32)
                    .map(|slot| GlyphInstance {
                        slot_index: slot as f32,
                    })
                    .collect(),
            };
            let instance_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Glyph Instance Buffer"),
                    contents: bytemuck::cast_slice(&instances),
                    usage: wgpu::BufferUsages::VERTEX,
                });

            let uniform_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Tunnel Uniform Buffer"),
                    contents: bytemuck::cast_slice(&[TunnelUniforms::zeroed()]),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Tunnel Uniform Bind Group"),
                layout: &self.glyph_pipeline.uniform_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

            layer_data.push(LayerDrawData {
                uniform_buffer,
                bind_group,
                texture_id,
                instance_count: instances.len() as u32,
                instance_buffer,
                row: layer.row,
                tint: layer.tint,
            });
        }

        let (dots_vertex_buffer, dots_vertex_count) = if include_dots {
            let dots = build_dot_mesh(&config.dot_grid);
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Dot Vertex Buffer"),
                    contents: bytemuck::cast_slice(&dots),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            (Some(buffer), dots.len() as u32)
        } else {
            (None, 0)
        };

        self.tunnel = Some(TunnelDrawData {
            quad_vertex_buffer,
            quad_index_buffer,
            layers: layer_data,
            dots_vertex_buffer,
            dots_vertex_count,
            camera: config.camera,
            spacing: config.spacing,
            row_gap: config.row_gap,
            glyph_height: config.glyph_height,
            depth_gain: config.depth_gain,
            edge_fade_start: config.edge_fade_start,
        });
    }

    fn clear_color(&self) -> wgpu::Color {
        if self.transparent {
            wgpu::Color::TRANSPARENT
        } else {
            wgpu::Color::BLACK
        }
    }

    fn acquire_frame(&mut self) -> Option<wgpu::SurfaceTexture> {
        if self.physical_size.0 == 0 || self.physical_size.1 == 0 {
            return None;
        }
        match self.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                None
            }
            Err(error) => {
                if !self.surface_degraded {
                    tracing::warn!(?error, "surface unavailable, skipping frames");
                    self.surface_degraded = true;
                }
                None
            }
        }
    }

    /// Renders the queued 2D shapes and presents. The queue drains whether
    /// or not a frame could be acquired, so a dormant surface does not
    /// accumulate stale shapes.
    pub fn render_shapes(&mut self) {
        let shapes = std::mem::take(&mut self.shape_queue);
        let Some(frame) = self.acquire_frame() else {
            return;
        };

        // Aggregate every tessellation into one vertex/index pair. Indices
        // widen to u32: a full field is far larger than one shape.
        let total = shapes.len();
        let mut vertices = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        for (command_id, shape) in shapes.iter().enumerate() {
            let order = depth(command_id, total);
            let buffers = shape.tessellate(order, &mut self.tessellator, &mut self.pools);
            let base = vertices.len() as u32;
            vertices.extend_from_slice(&buffers.vertices);
            indices.extend(buffers.indices.iter().map(|&index| base + index as u32));
            self.pools.lyon_vertex_buffers_pool.return_vertex_buffers(buffers);
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Shape Encoder"),
            });

        if indices.is_empty() {
            self.begin_pass(&mut encoder, &view);
        } else {
            let vertex_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Aggregated Shape Vertex Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Aggregated Shape Index Buffer"),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

            let mut pass = self.begin_pass(&mut encoder, &view);
            pass.set_pipeline(&self.shape_pipeline.pipeline);
            pass.set_bind_group(0, &self.shape_pipeline.bind_group, &[]);
            pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..indices.len() as u32, 0, 0..1);
            drop(pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }

    /// Renders the configured tunnel scene for the given channel values and
    /// clock, then presents.
    pub fn render_tunnel(&mut self, channels: &Channels, time_seconds: f32) {
        let Some(frame) = self.acquire_frame() else {
            return;
        };
        let Some(tunnel) = &self.tunnel else {
            // No scene configured; present the clear color.
            let view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Tunnel Encoder"),
                });
            self.begin_pass(&mut encoder, &view);
            self.queue.submit(std::iter::once(encoder.finish()));
            frame.present();
            return;
        };

        let aspect = self.physical_size.0 as f32 / self.physical_size.1 as f32;
        let view_proj = view_projection(&tunnel.camera, aspect, time_seconds);

        self.queue.write_buffer(
            &self.dot_pipeline.uniform_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniforms { view_proj }]),
        );
        for layer in &tunnel.layers {
            let uniforms = TunnelUniforms {
                view_proj,
                tint: [layer.tint[0], layer.tint[1], layer.tint[2], 1.0],
                scroll: channels.scroll,
                spread: channels.spread,
                letter_scale: channels.letter_scale,
                row_speed: layer.row.row_speed,
                row_index: layer.row.row_index,
                row_gap: tunnel.row_gap,
                instance_count: layer.row.instance_count,
                depth_offset: layer.row.depth_offset,
                row_count: layer.row.row_count,
                spacing: tunnel.spacing,
                glyph_height: tunnel.glyph_height,
                depth_gain: tunnel.depth_gain,
                edge_fade_start: tunnel.edge_fade_start,
                _padding: [0.0; 3],
            };
            self.queue
                .write_buffer(&layer.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }

        let mut texture_bind_groups = Vec::with_capacity(tunnel.layers.len());
        for layer in &tunnel.layers {
            match self.texture_manager.bind_group(layer.texture_id) {
                Ok(bind_group) => texture_bind_groups.push(Some(bind_group)),
                Err(error) => {
                    tracing::warn!(%error, "skipping tunnel layer");
                    texture_bind_groups.push(None);
                }
            }
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Tunnel Encoder"),
            });
        {
            let mut pass = self.begin_pass(&mut encoder, &view);

            if let Some(dots) = &tunnel.dots_vertex_buffer {
                pass.set_pipeline(&self.dot_pipeline.pipeline);
                pass.set_bind_group(0, &self.dot_pipeline.bind_group, &[]);
                pass.set_vertex_buffer(0, dots.slice(..));
                pass.draw(0..tunnel.dots_vertex_count, 0..1);
            }

            pass.set_pipeline(&self.glyph_pipeline.pipeline);
            pass.set_vertex_buffer(0, tunnel.quad_vertex_buffer.slice(..));
            pass.set_index_buffer(
                tunnel.quad_index_buffer.slice(..),
                wgpu::IndexFormat::Uint16,
            );
            for (layer, texture_bind_group) in
                tunnel.layers.iter().zip(texture_bind_groups.iter())
            {
                let Some(texture_bind_group) = texture_bind_group else {
                    continue;
                };
                pass.set_bind_group(0, &layer.bind_group, &[]);
                pass.set_bind_group(1, texture_bind_group.as_ref(), &[]);
                pass.set_vertex_buffer(1, layer.instance_buffer.slice(..));
                pass.draw_indexed(0..6, 0, 0..layer.instance_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }

    fn begin_pass<'pass>(
        &self,
        encoder: &'pass mut wgpu::CommandEncoder,
        view: &'pass wgpu::TextureView,
    ) -> wgpu::RenderPass<'pass> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}

fn build_dot_mesh(grid: &crate::tunnel::DotGridConfig) -> Vec<DotVertex> {
    let half = grid.dot_size / 2.0;
    let mut vertices = Vec::with_capacity((grid.cols * grid.rows * 6) as usize);
    for ix in 0..grid.cols {
        for iy in 0..grid.rows {
            let x = (ix as f32 - grid.cols as f32 / 2.0) * grid.spacing;
            let y = (iy as f32 - grid.rows as f32 / 2.0) * grid.spacing;
            let corners = [
                [x - half, y - half],
                [x + half, y - half],
                [x + half, y + half],
                [x - half, y + half],
            ];
            for &corner in &[0usize, 1, 2, 2, 3, 0] {
                vertices.push(DotVertex {
                    position: [corners[corner][0], corners[corner][1], grid.z],
                });
            }
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_orders_later_commands_on_top() {
        let first = depth(0, 10);
        let last = depth(9, 10);
        assert!(first > last);
        assert!((0.0..=1.0).contains(&first));
        assert!((0.0..=1.0).contains(&last));
    }

    #[test]
    fn depth_clamps_degenerate_input() {
        assert!(depth(0, 1) <= 0.9999999999);
        assert!(depth(1, 1) >= 0.0000000001);
    }

    #[test]
    fn dot_mesh_covers_the_whole_grid() {
        let grid = crate::tunnel::DotGridConfig::default();
        let mesh = build_dot_mesh(&grid);
        assert_eq!(mesh.len(), (grid.cols * grid.rows * 6) as usize);
        assert!(mesh.iter().all(|vertex| vertex.position[2] == grid.z));
    }
}

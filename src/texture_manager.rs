//! GPU-side storage for glyph textures.
//!
//! The manager owns the sampler and bind group layout shared by the tunnel
//! pipelines, uploads [`GlyphImage`]s into `wgpu` textures keyed by id, and
//! hands out cached bind groups for drawing.

use ahash::{HashMap, HashMapExt};
use std::sync::Arc;

use crate::glyph::GlyphImage;

#[derive(Debug, thiserror::Error)]
pub enum TextureManagerError {
    #[error("texture {0} has not been uploaded")]
    TextureNotFound(u64),
}

/// A manager for the glyph textures used by the tunnel scenes.
///
/// Textures are raw image data without any placement information; the
/// instance pipeline decides where they appear.
pub struct TextureManager {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
    textures: HashMap<u64, wgpu::Texture>,
    bind_groups: HashMap<u64, Arc<wgpu::BindGroup>>,
}

impl TextureManager {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glyph sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("glyph_texture_bind_group_layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });
        Self {
            device,
            queue,
            sampler,
            bind_group_layout,
            textures: HashMap::new(),
            bind_groups: HashMap::new(),
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Uploads a glyph image under `texture_id`, replacing any previous
    /// texture with that id.
    pub fn upload_glyph(&mut self, texture_id: u64, image: &GlyphImage) {
        let size = wgpu::Extent3d {
            width: image.side,
            height: image.side,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.side * 4),
                rows_per_image: Some(image.side),
            },
            size,
        );
        tracing::debug!(texture_id, side = image.side, "uploaded glyph texture");
        self.textures.insert(texture_id, texture);
        self.bind_groups.remove(&texture_id);
    }

    pub fn is_texture_loaded(&self, texture_id: u64) -> bool {
        self.textures.contains_key(&texture_id)
    }

    /// Cached bind group for a previously uploaded texture.
    pub fn bind_group(
        &mut self,
        texture_id: u64,
    ) -> Result<Arc<wgpu::BindGroup>, TextureManagerError> {
        if let Some(bind_group) = self.bind_groups.get(&texture_id) {
            return Ok(bind_group.clone());
        }
        let texture = self
            .textures
            .get(&texture_id)
            .ok_or(TextureManagerError::TextureNotFound(texture_id))?;
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = Arc::new(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glyph_texture_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }));
        self.bind_groups.insert(texture_id, bind_group.clone());
        Ok(bind_group)
    }
}

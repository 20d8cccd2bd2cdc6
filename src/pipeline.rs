//! wgpu pipeline construction for the three draw paths: tessellated 2D
//! shapes (the particle field), instanced glyph quads (the tunnel scenes),
//! and the static backdrop dot lattice. Also hosts the camera math shared
//! by the 3D pipelines.

use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, Texture, TextureView};

use crate::tunnel::CameraConfig;
use crate::vertex::{DotVertex, GlyphInstance, GlyphVertex, ShapeVertex};

/// A structure for coordinate normalization on the GPU. We pass pixel
/// coordinates to the GPU, but the GPU needs them normalized between -1
/// and 1.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShapeUniforms {
    pub canvas_size: [f32; 2],
    pub _padding: [f32; 2],
}

impl ShapeUniforms {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            canvas_size: [width, height],
            _padding: [0.0, 0.0],
        }
    }
}

/// Per-layer uniforms of the tunnel pipelines. Field order must match the
/// struct in `tunnel.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TunnelUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub tint: [f32; 4],
    pub scroll: f32,
    pub spread: f32,
    pub letter_scale: f32,
    pub row_speed: f32,
    pub row_index: f32,
    pub row_gap: f32,
    pub instance_count: f32,
    pub depth_offset: f32,
    pub row_count: f32,
    pub spacing: f32,
    pub glyph_height: f32,
    pub depth_gain: f32,
    pub edge_fade_start: f32,
    pub _padding: [f32; 3],
}

/// View-projection uniform of the backdrop dot pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// Column-major 4x4 multiply: `a * b`.
pub fn mat_mul(a: [[f32; 4]; 4], b: [[f32; 4]; 4]) -> [[f32; 4]; 4] {
    let mut out = [[0.0; 4]; 4];
    for (col, out_col) in out.iter_mut().enumerate() {
        for (row, value) in out_col.iter_mut().enumerate() {
            *value = (0..4).map(|k| a[k][row] * b[col][k]).sum();
        }
    }
    out
}

/// Right-handed perspective projection with wgpu's 0..1 clip depth,
/// column-major.
pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> [[f32; 4]; 4] {
    let f = 1.0 / (fov_y_degrees.to_radians() / 2.0).tan();
    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, far / (near - far), -1.0],
        [0.0, 0.0, near * far / (near - far), 0.0],
    ]
}

/// View matrix for a camera at `(0, y, z)` looking down -z.
pub fn camera_view(y: f32, z: f32) -> [[f32; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, -y, -z, 1.0],
    ]
}

/// Combined view-projection for the tunnel camera at time `t`.
pub fn view_projection(camera: &CameraConfig, aspect: f32, t: f32) -> [[f32; 4]; 4] {
    let projection = perspective(camera.fov_y_degrees, aspect, 0.1, 100.0);
    let view = camera_view(camera.float_y(t), camera.z);
    mat_mul(projection, view)
}

fn alpha_blend_target(format: wgpu::TextureFormat) -> Option<wgpu::ColorTargetState> {
    Some(wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
        }),
        write_mask: wgpu::ColorWrites::ALL,
    })
}

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

fn depth_state(depth_compare: wgpu::CompareFunction, write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn uniform_bind_group_layout(device: &Device, visibility: wgpu::ShaderStages) -> BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("uniform_bind_group_layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn uniform_bind_group(device: &Device, layout: &BindGroupLayout, buffer: &Buffer) -> BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("uniform_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

/// The 2D shape pipeline with its canvas-size uniform buffer and bind
/// group. Draw order is carried in the vertex `order` attribute; the depth
/// test always passes so later draws paint over earlier ones.
pub struct ShapePipeline {
    pub pipeline: RenderPipeline,
    pub uniform_buffer: Buffer,
    pub bind_group: BindGroup,
}

pub fn create_shape_pipeline(
    device: &Device,
    format: wgpu::TextureFormat,
    canvas_logical_size: (f32, f32),
) -> ShapePipeline {
    let uniforms = ShapeUniforms::new(canvas_logical_size.0, canvas_logical_size.1);
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Shape Uniform Buffer"),
        contents: bytemuck::cast_slice(&[uniforms]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group_layout = uniform_bind_group_layout(device, wgpu::ShaderStages::VERTEX);
    let bind_group = uniform_bind_group(device, &bind_group_layout, &uniform_buffer);

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Shape Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("./shape.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Shape Pipeline Layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Shape Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[ShapeVertex::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[alpha_blend_target(format)],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(depth_state(wgpu::CompareFunction::Always, true)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    ShapePipeline {
        pipeline,
        uniform_buffer,
        bind_group,
    }
}

/// The instanced glyph pipeline shared by the full and overlay tunnel
/// scenes. Group 0 is the per-layer uniform buffer, group 1 the glyph
/// texture.
pub struct GlyphPipeline {
    pub pipeline: RenderPipeline,
    pub uniform_bind_group_layout: BindGroupLayout,
}

pub fn create_glyph_pipeline(
    device: &Device,
    format: wgpu::TextureFormat,
    texture_bind_group_layout: &BindGroupLayout,
) -> GlyphPipeline {
    let uniform_layout = uniform_bind_group_layout(
        device,
        wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
    );
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Tunnel Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("./tunnel.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Tunnel Pipeline Layout"),
        bind_group_layouts: &[&uniform_layout, texture_bind_group_layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Tunnel Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[GlyphVertex::desc(), GlyphInstance::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[alpha_blend_target(format)],
        }),
        // Glyph quads stay visible from both sides while the fisheye bends
        // them around the viewer.
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(depth_state(wgpu::CompareFunction::LessEqual, true)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    GlyphPipeline {
        pipeline,
        uniform_bind_group_layout: uniform_layout,
    }
}

/// The backdrop dot pipeline: a static mesh of tiny quads, one uniform.
pub struct DotPipeline {
    pub pipeline: RenderPipeline,
    pub uniform_buffer: Buffer,
    pub bind_group: BindGroup,
}

pub fn create_dot_pipeline(device: &Device, format: wgpu::TextureFormat) -> DotPipeline {
    let uniforms = CameraUniforms {
        view_proj: perspective(50.0, 1.0, 0.1, 100.0),
    };
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Dot Uniform Buffer"),
        contents: bytemuck::cast_slice(&[uniforms]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group_layout = uniform_bind_group_layout(device, wgpu::ShaderStages::VERTEX);
    let bind_group = uniform_bind_group(device, &bind_group_layout, &uniform_buffer);

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Dot Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("./dots.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Dot Pipeline Layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Dot Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[DotVertex::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[alpha_blend_target(format)],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(depth_state(wgpu::CompareFunction::LessEqual, true)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    DotPipeline {
        pipeline,
        uniform_buffer,
        bind_group,
    }
}

pub fn create_depth_texture(device: &Device, size: (u32, u32)) -> Texture {
    let size = wgpu::Extent3d {
        width: size.0.max(1),
        height: size.1.max(1),
        depth_or_array_layers: 1,
    };
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}

pub fn create_depth_texture_view(depth_texture: &Texture) -> TextureView {
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

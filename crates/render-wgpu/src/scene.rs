use crate::error::RenderError;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use cubewall_common::{SurfaceSize, WallConfig};
use cubewall_field::{FieldFrame, Grid};
use glam::Vec3;
use wgpu::util::DeviceExt;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color_a: [f32; 4],
    color_b: [f32; 4],
    pointer: [f32; 2],
    time: f32,
    radius: f32,
    depth: f32,
    cube_size: f32,
    exposure: f32,
    _pad: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct InstanceData {
    origin: [f32; 3],
    seed: f32,
}

/// Unit cube, one quad per face so every face has a flat normal.
pub fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

pub fn instances(grid: &Grid) -> Vec<InstanceData> {
    grid.cells()
        .iter()
        .map(|cell| InstanceData {
            origin: cell.origin.to_array(),
            seed: cell.seed,
        })
        .collect()
}

/// Constant inputs of the cube shader, read once from the config.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    pub color_a: Vec3,
    pub color_b: Vec3,
    pub background: wgpu::Color,
    pub depth: f32,
    pub cube_size: f32,
    pub exposure: f32,
}

impl Material {
    pub fn from_config(config: &WallConfig) -> Self {
        let [r, g, b] = config.background.to_linear();
        Self {
            color_a: Vec3::from(config.color_a.to_linear()),
            color_b: Vec3::from(config.color_b.to_linear()),
            background: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            depth: config.wall_depth,
            cube_size: config.cube_size,
            exposure: config.exposure,
        }
    }

    pub fn uniforms(&self, frame: &FieldFrame) -> SceneUniforms {
        SceneUniforms {
            view_proj: frame.view_proj.to_cols_array_2d(),
            model: frame.model.to_cols_array_2d(),
            color_a: self.color_a.extend(1.0).to_array(),
            color_b: self.color_b.extend(1.0).to_array(),
            pointer: frame.pointer.to_array(),
            time: frame.time,
            radius: frame.radius,
            depth: self.depth,
            cube_size: self.cube_size,
            exposure: self.exposure,
            _pad: 0.0,
        }
    }
}

/// GPU resources for the instanced cube draw.
pub struct ScenePass {
    material: Material,
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    direct_pipeline: wgpu::RenderPipeline,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl ScenePass {
    /// Build the cube pass inside a validation error scope.
    ///
    /// A grid whose instance data exceeds `max_buffer_size` is refused before
    /// anything is allocated.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        size: SurfaceSize,
        grid: &Grid,
        material: Material,
    ) -> Result<Self, RenderError> {
        check_instance_budget(grid.len(), device.limits().max_buffer_size)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pass = Self::build(device, surface_format, size, grid, material);
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            pass.destroy();
            return Err(RenderError::Scene(err.to_string()));
        }
        Ok(pass)
    }

    fn build(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        size: SurfaceSize,
        grid: &Grid,
        material: Material,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CUBE_SHADER.into()),
        });

        let (cube_verts, cube_indices) = cube_mesh();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_data = instances(grid);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_instance_buffer"),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let direct_pipeline =
            cube_pipeline(device, &pipeline_layout, &shader, surface_format, "fs_direct");
        let (depth_texture, depth_view) = create_depth_texture(device, size);

        Self {
            material,
            shader,
            pipeline_layout,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            index_buffer,
            index_count: cube_indices.len() as u32,
            instance_buffer,
            instance_count: instance_data.len() as u32,
            direct_pipeline,
            depth_texture,
            depth_view,
        }
    }

    /// Cube pipeline writing through `entry_point` into `format`.
    pub fn pipeline(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        entry_point: &str,
    ) -> wgpu::RenderPipeline {
        cube_pipeline(device, &self.pipeline_layout, &self.shader, format, entry_point)
    }

    pub fn direct_pipeline(&self) -> &wgpu::RenderPipeline {
        &self.direct_pipeline
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: SurfaceSize) {
        self.depth_texture.destroy();
        let (texture, view) = create_depth_texture(device, size);
        self.depth_texture = texture;
        self.depth_view = view;
    }

    pub fn upload(&self, queue: &wgpu::Queue, frame: &FieldFrame) {
        let uniforms = self.material.uniforms(frame);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Record the cube draw into `view`, cleared to the background colour.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.material.background),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        if self.instance_count == 0 {
            return;
        }
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }

    pub fn destroy(&self) {
        self.uniform_buffer.destroy();
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.instance_buffer.destroy();
        self.depth_texture.destroy();
    }
}

/// Bytes of instance data a grid of `cells` cubes uploads.
fn instance_bytes(cells: usize) -> u64 {
    cells as u64 * std::mem::size_of::<InstanceData>() as u64
}

fn check_instance_budget(cells: usize, max_buffer_size: u64) -> Result<(), RenderError> {
    let bytes = instance_bytes(cells);
    if bytes > max_buffer_size {
        return Err(RenderError::Scene(format!(
            "{cells} instances need {bytes} bytes, device allows {max_buffer_size}"
        )));
    }
    Ok(())
}

fn cube_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    entry_point: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(entry_point),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![
                        2 => Float32x3,
                        3 => Float32,
                    ],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    size: SurfaceSize,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&Default::default());
    (texture, view)
}

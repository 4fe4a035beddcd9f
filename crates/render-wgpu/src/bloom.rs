use crate::error::RenderError;
use crate::scene::ScenePass;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use cubewall_common::{SurfaceSize, WallConfig};
use wgpu::util::DeviceExt;

pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct PostUniforms {
    direction: [f32; 2],
    strength: f32,
    threshold: f32,
    radius: f32,
    exposure: f32,
    _pad: [f32; 2],
}

impl PostUniforms {
    fn new(config: &WallConfig, direction: [f32; 2]) -> Self {
        Self {
            direction,
            strength: config.bloom_strength,
            threshold: config.bloom_threshold,
            radius: config.bloom_radius,
            exposure: config.exposure,
            _pad: [0.0; 2],
        }
    }
}

/// Bloom works at half the surface resolution.
pub fn bloom_extent(size: SurfaceSize) -> (u32, u32) {
    ((size.width.max(1) / 2).max(1), (size.height.max(1) / 2).max(1))
}

struct Targets {
    hdr: wgpu::Texture,
    hdr_view: wgpu::TextureView,
    bloom_a: wgpu::Texture,
    bloom_a_view: wgpu::TextureView,
    bloom_b: wgpu::Texture,
    bloom_b_view: wgpu::TextureView,
}

impl Targets {
    fn new(device: &wgpu::Device, size: SurfaceSize) -> Self {
        let (bw, bh) = bloom_extent(size);
        let hdr = offscreen(device, "hdr_target", size.width.max(1), size.height.max(1));
        let bloom_a = offscreen(device, "bloom_a", bw, bh);
        let bloom_b = offscreen(device, "bloom_b", bw, bh);
        Self {
            hdr_view: hdr.create_view(&Default::default()),
            bloom_a_view: bloom_a.create_view(&Default::default()),
            bloom_b_view: bloom_b.create_view(&Default::default()),
            hdr,
            bloom_a,
            bloom_b,
        }
    }

    fn destroy(&self) {
        self.hdr.destroy();
        self.bloom_a.destroy();
        self.bloom_b.destroy();
    }
}

struct BindGroups {
    bright: wgpu::BindGroup,
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    composite: wgpu::BindGroup,
    composite_bloom: wgpu::BindGroup,
}

/// Offscreen HDR scene plus bright pass, two-pass blur and composite.
///
/// The scene is drawn into `hdr`; the bright pass fills `bloom_a`, the
/// horizontal blur goes `bloom_a -> bloom_b`, the vertical blur
/// `bloom_b -> bloom_a`, and the composite tone maps `hdr + bloom_a` into
/// the surface.
pub struct BloomChain {
    scene_pipeline: wgpu::RenderPipeline,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    post_layout: wgpu::BindGroupLayout,
    bloom_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    // One buffer per pass: queue writes land before the whole encoder runs.
    post_still: wgpu::Buffer,
    post_h: wgpu::Buffer,
    post_v: wgpu::Buffer,
    targets: Targets,
    groups: BindGroups,
}

impl BloomChain {
    /// Build the chain inside a validation error scope so an unsupported
    /// format or shader surfaces as an error instead of a device panic.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        size: SurfaceSize,
        scene: &ScenePass,
        config: &WallConfig,
    ) -> Result<Self, RenderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let chain = Self::build(device, surface_format, size, scene, config);
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            chain.destroy();
            return Err(RenderError::PostProcess(err.to_string()));
        }
        Ok(chain)
    }

    fn build(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        size: SurfaceSize,
        scene: &ScenePass,
        config: &WallConfig,
    ) -> Self {
        let scene_pipeline = scene.pipeline(device, HDR_FORMAT, "fs_hdr");

        let texture_entries = |stages: wgpu::ShaderStages| {
            [
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: stages,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: stages,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ]
        };
        let [src_tex, src_sampler] = texture_entries(wgpu::ShaderStages::FRAGMENT);
        let post_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bind_group_layout"),
            entries: &[
                src_tex,
                src_sampler,
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let bloom_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bloom_bind_group_layout"),
            entries: &texture_entries(wgpu::ShaderStages::FRAGMENT),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("post_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let post_buffer = |label: &str, direction: [f32; 2]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&PostUniforms::new(config, direction)),
                usage: wgpu::BufferUsages::UNIFORM,
            })
        };
        let post_still = post_buffer("post_still", [0.0, 0.0]);
        let post_h = post_buffer("post_blur_h", [1.0, 0.0]);
        let post_v = post_buffer("post_blur_v", [0.0, 1.0]);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bloom_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLOOM_SHADER.into()),
        });
        let single = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("post_pipeline_layout"),
            bind_group_layouts: &[&post_layout],
            push_constant_ranges: &[],
        });
        let double = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("composite_pipeline_layout"),
            bind_group_layouts: &[&post_layout, &bloom_layout],
            push_constant_ranges: &[],
        });
        let bright_pipeline =
            fullscreen_pipeline(device, &single, &shader, "fs_bright", HDR_FORMAT);
        let blur_pipeline = fullscreen_pipeline(device, &single, &shader, "fs_blur", HDR_FORMAT);
        let composite_pipeline =
            fullscreen_pipeline(device, &double, &shader, "fs_composite", surface_format);

        let targets = Targets::new(device, size);
        let groups = bind_groups(
            device,
            &post_layout,
            &bloom_layout,
            &sampler,
            &targets,
            [&post_still, &post_h, &post_v],
        );

        Self {
            scene_pipeline,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            post_layout,
            bloom_layout,
            sampler,
            post_still,
            post_h,
            post_v,
            targets,
            groups,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: SurfaceSize) {
        self.targets.destroy();
        self.targets = Targets::new(device, size);
        self.groups = bind_groups(
            device,
            &self.post_layout,
            &self.bloom_layout,
            &self.sampler,
            &self.targets,
            [&self.post_still, &self.post_h, &self.post_v],
        );
    }

    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &ScenePass,
        surface_view: &wgpu::TextureView,
    ) {
        let t = &self.targets;
        scene.encode(encoder, &t.hdr_view, &self.scene_pipeline);
        fullscreen(
            encoder,
            "bright_pass",
            &t.bloom_a_view,
            &self.bright_pipeline,
            &[&self.groups.bright],
        );
        fullscreen(
            encoder,
            "blur_h",
            &t.bloom_b_view,
            &self.blur_pipeline,
            &[&self.groups.blur_h],
        );
        fullscreen(
            encoder,
            "blur_v",
            &t.bloom_a_view,
            &self.blur_pipeline,
            &[&self.groups.blur_v],
        );
        fullscreen(
            encoder,
            "composite",
            surface_view,
            &self.composite_pipeline,
            &[&self.groups.composite, &self.groups.composite_bloom],
        );
    }

    pub fn destroy(&self) {
        self.targets.destroy();
        self.post_still.destroy();
        self.post_h.destroy();
        self.post_v.destroy();
    }
}

fn offscreen(device: &wgpu::Device, label: &str, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

fn bind_groups(
    device: &wgpu::Device,
    post_layout: &wgpu::BindGroupLayout,
    bloom_layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    targets: &Targets,
    [still, h, v]: [&wgpu::Buffer; 3],
) -> BindGroups {
    let post = |label: &str, view: &wgpu::TextureView, uniforms: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: post_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        })
    };
    BindGroups {
        bright: post("bright_bind_group", &targets.hdr_view, still),
        blur_h: post("blur_h_bind_group", &targets.bloom_a_view, h),
        blur_v: post("blur_v_bind_group", &targets.bloom_b_view, v),
        composite: post("composite_bind_group", &targets.hdr_view, still),
        composite_bloom: device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("composite_bloom_bind_group"),
            layout: bloom_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.bloom_a_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }),
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    entry_point: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(entry_point),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_fullscreen"),
            compilation_options: Default::default(),
            buffers: &[],
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
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn fullscreen(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    groups: &[&wgpu::BindGroup],
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        ..Default::default()
    });
    pass.set_pipeline(pipeline);
    for (index, group) in groups.iter().enumerate() {
        pass.set_bind_group(index as u32, *group, &[]);
    }
    pass.draw(0..3, 0..1);
}

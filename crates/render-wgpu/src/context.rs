use crate::error::RenderError;
use cubewall_common::SurfaceSize;

/// Device, queue and configured surface for one mounting surface.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub backend: wgpu::Backend,
    configured: bool,
}

impl GpuContext {
    /// Acquire a surface for `target` plus an adapter and device that can
    /// drive it. Every failure is returned, nothing panics.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: SurfaceSize,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("cubewall_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            backend = info.backend.to_str(),
            ?format,
            "GPU initialized"
        );

        let mut ctx = Self {
            surface,
            device,
            queue,
            config,
            backend: info.backend,
            configured: false,
        };
        ctx.resize(size);
        Ok(ctx)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.config.width, self.config.height)
    }

    /// Reconfigure the surface. An empty size is remembered as unconfigured
    /// rather than passed to wgpu, which rejects zero-sized surfaces.
    pub fn resize(&mut self, size: SurfaceSize) {
        if size.is_empty() {
            self.configured = false;
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.configured = true;
    }

    /// Next texture to draw into. Lost or outdated surfaces are reconfigured
    /// and reported so the caller skips this frame.
    pub fn acquire(&self) -> Result<wgpu::SurfaceTexture, RenderError> {
        if !self.configured {
            return Err(RenderError::Surface(wgpu::SurfaceError::Outdated));
        }
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(texture),
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(&self.device, &self.config);
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

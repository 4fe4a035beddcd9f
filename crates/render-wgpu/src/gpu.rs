use crate::bloom::BloomChain;
use crate::context::GpuContext;
use crate::error::RenderError;
use crate::scene::{Material, ScenePass};
use cubewall_common::{SurfaceSize, WallConfig};
use cubewall_field::{Field, FieldFrame};
use cubewall_render::Renderer;

/// Acquired surface texture with the frame already submitted.
///
/// Callers may encode more passes into `view` (an overlay, say) before
/// calling [`FrameTarget::present`].
pub struct FrameTarget {
    texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl FrameTarget {
    pub fn present(self) {
        self.texture.present();
    }
}

struct Gpu {
    ctx: GpuContext,
    scene: ScenePass,
    bloom: Option<BloomChain>,
}

/// wgpu cube wall renderer.
pub struct WgpuRenderer {
    gpu: Option<Gpu>,
    bloom_error: Option<String>,
}

impl WgpuRenderer {
    /// Build the scene pass, and the bloom chain when `config.bloom` is set.
    ///
    /// A scene pass failure is returned. Losing the bloom chain is not fatal:
    /// the reason is kept in [`WgpuRenderer::bloom_error`] and frames go
    /// straight to the surface.
    pub fn new(ctx: GpuContext, field: &Field, config: &WallConfig) -> Result<Self, RenderError> {
        let size = ctx.size();
        let scene = ScenePass::new(
            &ctx.device,
            ctx.format(),
            size,
            field.grid(),
            Material::from_config(config),
        )?;

        let (bloom, bloom_error) = if config.bloom {
            match BloomChain::new(&ctx.device, ctx.format(), size, &scene, config) {
                Ok(chain) => (Some(chain), None),
                Err(e) => {
                    tracing::warn!("bloom disabled: {e}");
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        tracing::debug!(
            instances = field.grid().len(),
            bloom = bloom.is_some(),
            "wgpu renderer ready"
        );

        Ok(Self {
            gpu: Some(Gpu { ctx, scene, bloom }),
            bloom_error,
        })
    }

    /// Why bloom was requested but is not running, if it isn't.
    pub fn bloom_error(&self) -> Option<&str> {
        self.bloom_error.as_deref()
    }

    pub fn context(&self) -> Option<&GpuContext> {
        self.gpu.as_ref().map(|gpu| &gpu.ctx)
    }

    /// Upload this frame's uniforms, draw the wall and submit, without
    /// presenting.
    pub fn begin_frame(&mut self, frame: &FieldFrame) -> Result<FrameTarget, RenderError> {
        let gpu = self.gpu.as_ref().ok_or(RenderError::Released)?;
        let texture = gpu.ctx.acquire()?;
        let view = texture.texture.create_view(&Default::default());

        gpu.scene.upload(&gpu.ctx.queue, frame);
        let mut encoder = gpu
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        match &gpu.bloom {
            Some(bloom) => bloom.encode(&mut encoder, &gpu.scene, &view),
            None => gpu
                .scene
                .encode(&mut encoder, &view, gpu.scene.direct_pipeline()),
        }
        gpu.ctx.queue.submit(std::iter::once(encoder.finish()));

        Ok(FrameTarget { texture, view })
    }
}

impl Renderer for WgpuRenderer {
    type Error = RenderError;

    fn resize(&mut self, size: SurfaceSize) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        gpu.ctx.resize(size);
        gpu.scene.resize(&gpu.ctx.device, size);
        if let Some(bloom) = &mut gpu.bloom {
            bloom.resize(&gpu.ctx.device, size);
        }
    }

    fn render(&mut self, _field: &Field, frame: &FieldFrame) -> Result<(), RenderError> {
        self.begin_frame(frame)?.present();
        Ok(())
    }

    fn bloom_enabled(&self) -> bool {
        self.gpu.as_ref().is_some_and(|gpu| gpu.bloom.is_some())
    }

    fn release(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            if let Some(bloom) = &gpu.bloom {
                bloom.destroy();
            }
            gpu.scene.destroy();
            tracing::debug!("wgpu resources released");
        }
    }
}

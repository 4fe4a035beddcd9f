use cubewall_common::SurfaceSize;
use cubewall_field::{Field, FieldFrame};
use cubewall_render::Renderer;
use cubewall_render_wgpu::{GpuContext, RenderError, WgpuRenderer};
use std::sync::Arc;
use winit::event::WindowEvent;
use winit::window::Window;

/// egui layer drawing the status text over the wall.
struct Overlay {
    ctx: egui::Context,
    winit: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Overlay {
    fn new(window: &Window, gpu: &GpuContext) -> Self {
        let ctx = egui::Context::default();
        let winit = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.format(), None, 1, false);
        Self {
            ctx,
            winit,
            renderer,
        }
    }

    fn paint(&mut self, window: &Window, gpu: &GpuContext, view: &wgpu::TextureView, text: &str) {
        let raw_input = self.winit.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Area::new(egui::Id::new("wall_status"))
                .fixed_pos(egui::pos2(8.0, 8.0))
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.monospace(text);
                    });
                });
        });
        self.winit
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let size = gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("overlay_encoder"),
            });
        self.renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

/// The wgpu wall plus the diagnostic overlay, presented together.
pub struct DesktopRenderer {
    gpu: WgpuRenderer,
    overlay: Option<Overlay>,
    window: Arc<Window>,
    text: Option<String>,
}

impl DesktopRenderer {
    pub fn new(gpu: WgpuRenderer, window: Arc<Window>) -> Self {
        let overlay = gpu.context().map(|ctx| Overlay::new(&window, ctx));
        Self {
            gpu,
            overlay,
            window,
            text: None,
        }
    }

    pub fn bloom_error(&self) -> Option<&str> {
        self.gpu.bloom_error()
    }

    /// Text for the next frame's overlay; `None` hides it.
    pub fn set_overlay_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    pub fn on_window_event(&mut self, event: &WindowEvent) {
        if let Some(overlay) = &mut self.overlay {
            // Read-only overlay: egui never claims input from the wall.
            let _ = overlay.winit.on_window_event(&self.window, event);
        }
    }
}

impl Renderer for DesktopRenderer {
    type Error = RenderError;

    fn resize(&mut self, size: SurfaceSize) {
        self.gpu.resize(size);
    }

    fn render(&mut self, _field: &Field, frame: &FieldFrame) -> Result<(), RenderError> {
        let target = self.gpu.begin_frame(frame)?;
        if let (Some(text), Some(overlay), Some(ctx)) =
            (&self.text, &mut self.overlay, self.gpu.context())
        {
            overlay.paint(&self.window, ctx, &target.view, text);
        }
        target.present();
        Ok(())
    }

    fn bloom_enabled(&self) -> bool {
        self.gpu.bloom_enabled()
    }

    fn release(&mut self) {
        self.overlay = None;
        self.text = None;
        self.gpu.release();
    }
}

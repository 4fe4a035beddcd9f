mod overlay;

use anyhow::Result;
use clap::Parser;
use cubewall_common::{SurfaceSize, WallConfig};
use cubewall_input::Action;
use cubewall_render::{CubeWall, WallState};
use cubewall_render_wgpu::{GpuContext, RenderError, WgpuRenderer};
use glam::Vec2;
use overlay::DesktopRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const TITLE: &str = "Cube Wall";

/// Longest step fed to the scene, so a stalled window doesn't jump.
const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "cubewall-desktop", about = "Pointer-reactive cube wall")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; missing keys use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the grid size (cells per side)
    #[arg(long)]
    grid: Option<u32>,

    /// Disable the bloom chain
    #[arg(long)]
    no_bloom: bool,
}

impl Cli {
    fn wall_config(&self) -> Result<WallConfig> {
        let mut config = match &self.config {
            Some(path) => WallConfig::load(path)?,
            None => WallConfig::default(),
        };
        if let Some(grid) = self.grid {
            config.grid_size = grid;
        }
        if self.no_bloom {
            config.bloom = false;
        }
        config.validate()?;
        Ok(config)
    }
}

struct App {
    config: WallConfig,
    window: Option<Arc<Window>>,
    wall: Option<CubeWall<DesktopRenderer>>,
    cursor: Vec2,
    last_frame: Instant,
}

impl App {
    fn new(config: WallConfig) -> Self {
        Self {
            config,
            window: None,
            wall: None,
            cursor: Vec2::ZERO,
            last_frame: Instant::now(),
        }
    }

    fn mount(&mut self, window: Arc<Window>) {
        let inner = window.inner_size();
        let size = SurfaceSize::new(inner.width, inner.height);
        let config = &self.config;
        let target = window.clone();
        let mut wall = CubeWall::mount(config, size, |field| -> Result<_, RenderError> {
            let ctx = GpuContext::new(target.clone(), size)?;
            let gpu = WgpuRenderer::new(ctx, field, config)?;
            Ok(DesktopRenderer::new(gpu, target))
        });

        if let Some(reason) = wall.renderer().and_then(|r| r.bloom_error()) {
            let msg = format!("Bloom disabled: {reason}");
            wall.set_diagnostic(msg);
        }

        match wall.state() {
            WallState::Running => {
                self.last_frame = Instant::now();
                window.request_redraw();
            }
            _ => {
                let diagnostic = wall.diagnostic().unwrap_or("graphics unavailable");
                window.set_title(&format!("{TITLE} - {diagnostic}"));
            }
        }
        self.wall = Some(wall);
    }

    fn apply(&mut self, action: Action) {
        if let Some(position) = action.pointer_position() {
            self.cursor = position;
        }
        if let Some(wall) = &mut self.wall {
            wall.apply(action);
        }
    }

    fn redraw(&mut self) {
        let (Some(wall), Some(window)) = (&mut self.wall, &self.window) else {
            return;
        };
        let now = Instant::now();
        let dt = (now - self.last_frame).min(MAX_FRAME_STEP);
        self.last_frame = now;

        let text = wall.overlay_visible().then(|| wall.status().to_string());
        if let Some(renderer) = wall.renderer_mut() {
            renderer.set_overlay_text(text);
        }

        if wall.frame(dt).reschedule() {
            window.request_redraw();
        }
    }

    fn teardown(&mut self) {
        if let Some(wall) = &mut self.wall {
            wall.teardown();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        self.mount(window.clone());
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(renderer) = self.wall.as_mut().and_then(|w| w.renderer_mut()) {
            renderer.on_window_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.apply(Action::Resized(SurfaceSize::new(
                    new_size.width,
                    new_size.height,
                )));
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                self.apply(Action::PointerMoved(position));
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let action = match state {
                    ElementState::Pressed => Action::PointerPressed(self.cursor),
                    ElementState::Released => Action::PointerReleased(self.cursor),
                };
                self.apply(action);
            }
            WindowEvent::Touch(touch) => {
                let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                let action = match touch.phase {
                    TouchPhase::Started => Action::PointerPressed(position),
                    TouchPhase::Moved => Action::PointerMoved(position),
                    TouchPhase::Ended | TouchPhase::Cancelled => Action::PointerReleased(position),
                };
                self.apply(action);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::F1),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.apply(Action::ToggleOverlay);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.wall_config()?;
    tracing::info!(
        grid = config.grid_size,
        bloom = config.bloom,
        "cubewall-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}

use crate::renderer::Renderer;
use crate::timer::FrameTimer;
use cubewall_common::{SurfaceSize, WallConfig};
use cubewall_field::Field;
use cubewall_input::Action;
use glam::Vec2;
use std::fmt;
use std::time::Duration;

/// Lifecycle state of a mounted wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallState {
    /// Frames are being produced.
    Running,
    /// The renderer could not be built. No frame will ever be drawn.
    Failed,
    /// Torn down. Actions are ignored and nothing is scheduled.
    Stopped,
}

/// What happened in one call to [`CubeWall::frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// Nothing drawn this time (empty surface or transient backend error).
    Skipped,
    /// The wall is not running; do not schedule another frame.
    Stopped,
}

impl FrameOutcome {
    /// Whether the caller should request the next frame.
    pub fn reschedule(self) -> bool {
        !matches!(self, FrameOutcome::Stopped)
    }
}

/// Snapshot of the wall for the diagnostics overlay and logs.
#[derive(Debug, Clone)]
pub struct WallStatus {
    pub state: WallState,
    pub surface: SurfaceSize,
    pub cells: usize,
    pub frames: u64,
    pub fps: f32,
    pub radius: f32,
    /// A pointer button is held and the radius is contracted.
    pub pressed: bool,
    pub pointer: Vec2,
    pub bloom: bool,
    pub diagnostic: Option<String>,
}

impl fmt::Display for WallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wall: {:?} {}x{} cells={} frames={} fps={:.1}",
            self.state,
            self.surface.width,
            self.surface.height,
            self.cells,
            self.frames,
            self.fps
        )?;
        write!(
            f,
            " radius={:.2}{} pointer=({:.2}, {:.2}) bloom={}",
            self.radius,
            if self.pressed { " (pressed)" } else { "" },
            self.pointer.x,
            self.pointer.y,
            if self.bloom { "on" } else { "off" }
        )?;
        if let Some(msg) = &self.diagnostic {
            write!(f, " diagnostic=\"{msg}\"")?;
        }
        Ok(())
    }
}

/// One mounted cube wall: scene state, renderer and lifecycle.
///
/// Acquisition happens in [`CubeWall::mount`]; [`CubeWall::teardown`]
/// releases everything and is safe to call any number of times, at any
/// point, including after a failed mount. Dropping the wall tears it down.
pub struct CubeWall<R: Renderer> {
    field: Field,
    renderer: Option<R>,
    state: WallState,
    diagnostic: Option<String>,
    overlay_visible: bool,
    timer: FrameTimer,
    frames: u64,
}

impl<R: Renderer> CubeWall<R> {
    /// Build the scene and hand it to `create` to acquire a renderer.
    ///
    /// A failing `create` leaves the wall in [`WallState::Failed`] with a
    /// diagnostic message instead of returning an error: the host keeps
    /// running, the wall just never draws.
    pub fn mount<E, F>(config: &WallConfig, size: SurfaceSize, create: F) -> Self
    where
        E: fmt::Display,
        F: FnOnce(&Field) -> Result<R, E>,
    {
        let field = Field::new(config, size);
        let (renderer, state, diagnostic) = match create(&field) {
            Ok(renderer) => {
                tracing::info!(
                    cells = field.grid().len(),
                    width = size.width,
                    height = size.height,
                    bloom = renderer.bloom_enabled(),
                    "cube wall mounted"
                );
                (Some(renderer), WallState::Running, None)
            }
            Err(e) => {
                let msg = format!("Graphics unavailable: {e}");
                tracing::error!("{msg}");
                (None, WallState::Failed, Some(msg))
            }
        };
        Self {
            field,
            renderer,
            state,
            diagnostic,
            overlay_visible: false,
            timer: FrameTimer::new(120),
            frames: 0,
        }
    }

    pub fn state(&self) -> WallState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == WallState::Running
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    /// Message to show the user, if something went wrong.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Attach a non-fatal message (e.g. bloom fallback) to the overlay.
    pub fn set_diagnostic(&mut self, msg: impl Into<String>) {
        if self.state != WallState::Stopped {
            self.diagnostic = Some(msg.into());
        }
    }

    /// The overlay shows when toggled on or when there is a diagnostic.
    pub fn overlay_visible(&self) -> bool {
        self.state != WallState::Stopped && (self.overlay_visible || self.diagnostic.is_some())
    }

    pub fn status(&self) -> WallStatus {
        WallStatus {
            state: self.state,
            surface: self.field.surface(),
            cells: self.field.grid().len(),
            frames: self.frames,
            fps: self.timer.fps(),
            radius: self.field.radius().value(),
            pressed: self.field.radius().is_pressed(),
            pointer: self.field.pointer().current(),
            bloom: self.renderer.as_ref().is_some_and(|r| r.bloom_enabled()),
            diagnostic: self.diagnostic.clone(),
        }
    }

    /// Feed one input action. Ignored once stopped.
    pub fn apply(&mut self, action: Action) {
        if self.state == WallState::Stopped {
            return;
        }
        match action {
            Action::PointerMoved(p) => self.field.pointer_moved(p),
            Action::PointerPressed(p) => self.field.pointer_pressed(p),
            Action::PointerReleased(p) => self.field.pointer_released(p),
            Action::Resized(size) => self.resize(size),
            Action::ToggleOverlay => self.overlay_visible = !self.overlay_visible,
        }
    }

    /// Update camera aspect and renderer resolution together.
    pub fn resize(&mut self, size: SurfaceSize) {
        if self.state == WallState::Stopped || size == self.field.surface() {
            return;
        }
        self.field.resize(size);
        if size.is_empty() {
            tracing::debug!(?size, "surface empty, drawing suspended");
            return;
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(size);
        }
        tracing::debug!(width = size.width, height = size.height, "cube wall resized");
    }

    /// Advance the scene by `dt` and draw it.
    ///
    /// Returns [`FrameOutcome::Stopped`] when the caller should stop
    /// scheduling frames.
    pub fn frame(&mut self, dt: Duration) -> FrameOutcome {
        if self.state != WallState::Running {
            return FrameOutcome::Stopped;
        }
        let Some(renderer) = &mut self.renderer else {
            return FrameOutcome::Stopped;
        };
        let _span = tracing::trace_span!("wall_frame", frame = self.frames).entered();

        let frame = self.field.step(dt.as_secs_f32());
        if self.field.surface().is_empty() {
            return FrameOutcome::Skipped;
        }
        match renderer.render(&self.field, &frame) {
            Ok(()) => {
                self.frames += 1;
                self.timer.record(dt);
                FrameOutcome::Rendered
            }
            Err(e) => {
                tracing::warn!("frame skipped: {e}");
                FrameOutcome::Skipped
            }
        }
    }

    /// Stop the loop, release the renderer and detach the overlay.
    ///
    /// Returns `true` if this call did the work, `false` if the wall was
    /// already stopped.
    pub fn teardown(&mut self) -> bool {
        if self.state == WallState::Stopped {
            return false;
        }
        if let Some(mut renderer) = self.renderer.take() {
            renderer.release();
        }
        self.state = WallState::Stopped;
        self.diagnostic = None;
        self.overlay_visible = false;
        tracing::info!(frames = self.frames, "cube wall torn down");
        true
    }
}

impl<R: Renderer> Drop for CubeWall<R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::CpuRenderer;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Resize(SurfaceSize),
        Render { aspect: f32, size: SurfaceSize },
        Release,
    }

    /// Renderer that records every call into a shared log.
    struct Recording {
        log: Rc<RefCell<Vec<Event>>>,
        size: SurfaceSize,
        fail_frames: bool,
    }

    impl Renderer for Recording {
        type Error = String;

        fn resize(&mut self, size: SurfaceSize) {
            self.size = size;
            self.log.borrow_mut().push(Event::Resize(size));
        }

        fn render(
            &mut self,
            field: &Field,
            _frame: &cubewall_field::FieldFrame,
        ) -> Result<(), String> {
            if self.fail_frames {
                return Err("surface lost".into());
            }
            self.log.borrow_mut().push(Event::Render {
                aspect: field.camera().aspect,
                size: self.size,
            });
            Ok(())
        }

        fn bloom_enabled(&self) -> bool {
            true
        }

        fn release(&mut self) {
            self.log.borrow_mut().push(Event::Release);
        }
    }

    fn mount(size: SurfaceSize) -> (CubeWall<Recording>, Rc<RefCell<Vec<Event>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let shared = log.clone();
        let wall = CubeWall::mount(&WallConfig::default(), size, move |_| {
            Ok::<_, String>(Recording {
                log: shared,
                size,
                fail_frames: false,
            })
        });
        (wall, log)
    }

    fn releases(log: &Rc<RefCell<Vec<Event>>>) -> usize {
        log.borrow().iter().filter(|e| **e == Event::Release).count()
    }

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn mount_starts_running() {
        let (wall, _) = mount(SurfaceSize::new(800, 600));
        assert!(wall.is_running());
        assert_eq!(wall.status().cells, 1600);
        assert!(wall.status().bloom);
    }

    #[test]
    fn resize_reaches_camera_and_renderer_before_next_frame() {
        let (mut wall, log) = mount(SurfaceSize::new(800, 600));
        assert_eq!(wall.frame(FRAME), FrameOutcome::Rendered);
        wall.apply(Action::Resized(SurfaceSize::new(1024, 512)));
        assert_eq!(wall.frame(FRAME), FrameOutcome::Rendered);

        let log = log.borrow();
        assert_eq!(log[1], Event::Resize(SurfaceSize::new(1024, 512)));
        assert_eq!(
            log[2],
            Event::Render {
                aspect: 2.0,
                size: SurfaceSize::new(1024, 512)
            }
        );
    }

    #[test]
    fn zero_size_at_mount_suspends_until_resized() {
        let (mut wall, log) = mount(SurfaceSize::new(0, 0));
        assert_eq!(wall.frame(FRAME), FrameOutcome::Skipped);
        assert!(log.borrow().is_empty());

        wall.apply(Action::Resized(SurfaceSize::new(300, 150)));
        assert_eq!(wall.frame(FRAME), FrameOutcome::Rendered);
        assert_eq!(
            log.borrow().last(),
            Some(&Event::Render {
                aspect: 2.0,
                size: SurfaceSize::new(300, 150)
            })
        );
    }

    #[test]
    fn shrinking_to_zero_does_not_reach_renderer() {
        let (mut wall, log) = mount(SurfaceSize::new(800, 600));
        wall.resize(SurfaceSize::new(800, 0));
        assert_eq!(wall.frame(FRAME), FrameOutcome::Skipped);
        assert!(log.borrow().iter().all(|e| !matches!(e, Event::Resize(_))));
    }

    #[test]
    fn teardown_right_after_mount_releases_once() {
        let (mut wall, log) = mount(SurfaceSize::new(800, 600));
        assert!(wall.teardown());
        assert!(!wall.teardown());
        drop(wall);
        assert_eq!(releases(&log), 1);
        assert!(log.borrow().iter().all(|e| !matches!(e, Event::Render { .. })));
    }

    #[test]
    fn drop_tears_down() {
        let (mut wall, log) = mount(SurfaceSize::new(800, 600));
        wall.frame(FRAME);
        drop(wall);
        assert_eq!(releases(&log), 1);
    }

    #[test]
    fn stopped_wall_ignores_input_and_frames() {
        let (mut wall, log) = mount(SurfaceSize::new(800, 600));
        wall.teardown();
        wall.apply(Action::PointerPressed(Vec2::new(1.0, 1.0)));
        wall.apply(Action::Resized(SurfaceSize::new(10, 10)));
        assert_eq!(wall.field().radius().value(), 3.0);
        assert_eq!(wall.frame(FRAME), FrameOutcome::Stopped);
        assert!(!FrameOutcome::Stopped.reschedule());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn failed_mount_reports_diagnostic_and_never_draws() {
        let mut wall: CubeWall<Recording> =
            CubeWall::mount(&WallConfig::default(), SurfaceSize::new(800, 600), |_| {
                Err("no adapter")
            });
        assert_eq!(wall.state(), WallState::Failed);
        assert!(wall.diagnostic().unwrap().contains("no adapter"));
        assert!(wall.overlay_visible());
        assert_eq!(wall.frame(FRAME), FrameOutcome::Stopped);

        assert!(wall.teardown());
        assert_eq!(wall.diagnostic(), None);
        assert!(!wall.overlay_visible());
    }

    #[test]
    fn render_errors_skip_the_frame_but_keep_running() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let shared = log.clone();
        let mut wall = CubeWall::mount(&WallConfig::default(), SurfaceSize::new(64, 64), |_| {
            Ok::<_, String>(Recording {
                log: shared,
                size: SurfaceSize::new(64, 64),
                fail_frames: true,
            })
        });
        assert_eq!(wall.frame(FRAME), FrameOutcome::Skipped);
        assert!(wall.is_running());
        assert_eq!(wall.status().frames, 0);
    }

    #[test]
    fn press_release_through_actions_restores_radius() {
        let (mut wall, _) = mount(SurfaceSize::new(800, 600));
        let p = Vec2::new(400.0, 300.0);
        for _ in 0..5 {
            wall.apply(Action::PointerPressed(p));
            wall.apply(Action::PointerReleased(p));
        }
        assert_eq!(wall.field().radius().value(), 3.0);
    }

    #[test]
    fn status_reports_held_pointer() {
        let (mut wall, _) = mount(SurfaceSize::new(800, 600));
        let p = Vec2::new(400.0, 300.0);
        assert!(!wall.status().pressed);

        wall.apply(Action::PointerPressed(p));
        let status = wall.status();
        assert!(status.pressed);
        assert!(status.radius < 3.0);
        assert!(status.to_string().contains("(pressed)"));

        wall.apply(Action::PointerReleased(p));
        assert!(!wall.status().pressed);
        assert!(!wall.status().to_string().contains("(pressed)"));
    }

    #[test]
    fn overlay_toggles() {
        let (mut wall, _) = mount(SurfaceSize::new(800, 600));
        assert!(!wall.overlay_visible());
        wall.apply(Action::ToggleOverlay);
        assert!(wall.overlay_visible());
        wall.apply(Action::ToggleOverlay);
        assert!(!wall.overlay_visible());
    }

    #[test]
    fn status_line_mentions_state() {
        let mut wall = CubeWall::mount(&WallConfig::default(), SurfaceSize::new(640, 480), |f| {
            Ok::<_, std::convert::Infallible>(CpuRenderer::new(&WallConfig::default(), f.surface()))
        });
        wall.frame(FRAME);
        let line = wall.status().to_string();
        assert!(line.contains("Running"));
        assert!(line.contains("cells=1600"));
        assert!(line.contains("bloom=off"));
    }
}

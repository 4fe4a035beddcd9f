use cubewall_common::SurfaceSize;
use glam::Vec2;

/// A high-level action the cube wall reacts to.
///
/// The desktop shell translates window events into these; tests and
/// headless drivers can feed them directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Pointer moved to a pixel position.
    PointerMoved(Vec2),
    /// A pointer button went down at a pixel position.
    PointerPressed(Vec2),
    /// A pointer button came up at a pixel position.
    PointerReleased(Vec2),
    /// The mounting surface changed size.
    Resized(SurfaceSize),
    /// Show or hide the diagnostics overlay.
    ToggleOverlay,
}

impl Action {
    /// Pixel position carried by pointer actions.
    pub fn pointer_position(&self) -> Option<Vec2> {
        match *self {
            Action::PointerMoved(p) | Action::PointerPressed(p) | Action::PointerReleased(p) => {
                Some(p)
            }
            Action::Resized(_) | Action::ToggleOverlay => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_actions_carry_position() {
        let p = Vec2::new(12.0, 34.0);
        assert_eq!(Action::PointerMoved(p).pointer_position(), Some(p));
        assert_eq!(Action::PointerPressed(p).pointer_position(), Some(p));
        assert_eq!(Action::PointerReleased(p).pointer_position(), Some(p));
    }

    #[test]
    fn other_actions_have_no_position() {
        let resize = Action::Resized(SurfaceSize::new(800, 600));
        assert!(matches!(resize, Action::Resized(_)));
        assert_eq!(resize.pointer_position(), None);
        assert_eq!(Action::ToggleOverlay.pointer_position(), None);
    }
}

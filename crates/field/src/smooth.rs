use glam::{Vec2, Vec3};

/// Exponential approach toward a target, one step at a time.
pub trait Approach: Copy {
    /// Move `factor` of the remaining distance toward `target`.
    /// Never steps past the target.
    fn approach(self, target: Self, factor: f32) -> Self;
}

impl Approach for f32 {
    fn approach(self, target: Self, factor: f32) -> Self {
        let next = self + (target - self) * factor;
        // rounding may land on the far side; snap instead
        if (target - self) * (target - next) < 0.0 {
            target
        } else {
            next
        }
    }
}

impl Approach for Vec2 {
    fn approach(self, target: Self, factor: f32) -> Self {
        Vec2::new(
            self.x.approach(target.x, factor),
            self.y.approach(target.y, factor),
        )
    }
}

impl Approach for Vec3 {
    fn approach(self, target: Self, factor: f32) -> Self {
        Vec3::new(
            self.x.approach(target.x, factor),
            self.y.approach(target.y, factor),
            self.z.approach(target.z, factor),
        )
    }
}

/// A value that eases toward a raw target once per frame.
///
/// Input handlers write the target; the frame step reads the current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothed<V> {
    current: V,
    target: V,
}

impl<V: Approach> Smoothed<V> {
    /// Start at rest: current equals target.
    pub fn new(value: V) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    pub fn current(&self) -> V {
        self.current
    }

    pub fn target(&self) -> V {
        self.target
    }

    pub fn set_target(&mut self, target: V) {
        self.target = target;
    }

    /// Advance one frame and return the new current value.
    pub fn step(&mut self, factor: f32) -> V {
        self.current = self.current.approach(self.target, factor);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_monotonically_without_overshoot() {
        for factor in [0.01, 0.05, 0.08, 0.5, 0.99] {
            for start in [-1000.0f32, -3.5, 0.0, 2.25, 1000.0] {
                let target = 1.75f32;
                let mut s = Smoothed::new(start);
                s.set_target(target);
                let mut prev_gap = (target - start).abs();
                for _ in 0..2000 {
                    let v = s.step(factor);
                    let gap = (target - v).abs();
                    assert!(gap <= prev_gap, "gap grew: {gap} > {prev_gap}");
                    // never crosses to the other side of the target
                    assert!((target - v) * (target - start) >= 0.0);
                    prev_gap = gap;
                }
                assert!(prev_gap < 1e-3, "factor {factor} start {start} gap {prev_gap}");
            }
        }
    }

    #[test]
    fn vector_components_ease_independently() {
        let mut s = Smoothed::new(Vec2::new(1000.0, 1000.0));
        s.set_target(Vec2::new(0.0, -2.0));
        let v = s.step(0.08);
        assert!((v.x - 920.0).abs() < 1e-3);
        assert!((v.y - (1000.0 - 1002.0 * 0.08)).abs() < 1e-3);
        assert_eq!(s.target(), Vec2::new(0.0, -2.0));
    }

    #[test]
    fn full_factor_snaps_to_target() {
        let mut s = Smoothed::new(Vec3::ZERO);
        s.set_target(Vec3::new(0.3, -0.2, 9.0));
        assert_eq!(s.step(1.0), Vec3::new(0.3, -0.2, 9.0));
    }

    #[test]
    fn at_rest_stays_put() {
        let mut s = Smoothed::new(4.0f32);
        assert_eq!(s.step(0.5), 4.0);
        assert_eq!(s.current(), 4.0);
    }
}

/// Window of accepted ray parameters, open at both ends.
///
/// Intersection routines only accept `t` values strictly inside the window,
/// and narrow `max` to the closest hit found so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Accepts every finite `t`.
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Everything past `t_min`, the usual window for a bounce that must
    /// not re-hit the surface it left.
    pub fn beyond(t_min: f32) -> Self {
        Self::new(t_min, f32::INFINITY)
    }

    /// True if no `t` can satisfy the window.
    pub fn is_empty(&self) -> bool {
        self.min.is_nan() || self.max.is_nan() || self.min >= self.max
    }

    /// Strict containment. NaN is never surrounded, so degenerate roots
    /// fall out here.
    pub fn surrounds(&self, t: f32) -> bool {
        self.min < t && t < self.max
    }

    /// The same window cut off at `max`.
    pub fn with_max(&self, max: f32) -> Interval {
        Interval::new(self.min, max)
    }
}

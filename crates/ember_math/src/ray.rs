use crate::Vec3;

/// Half-line `origin + t * direction`.
///
/// Directions are stored as given. Scattered rays are often not unit length,
/// and the sphere test is written for arbitrary `|direction|`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Normalized direction. NaN for a zero-length direction.
    #[inline]
    pub fn unit_direction(&self) -> Vec3 {
        self.direction.normalize()
    }

    /// Point at parameter `t`.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}

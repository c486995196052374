//! Thin-lens camera for ray generation.

use crate::random::random_in_unit_disk;
use crate::{Ray, RenderError, Result};
use ember_math::Vec3;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// User-facing camera placement and lens settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f32,
    /// Lens diameter; 0 disables depth of field
    pub aperture: f32,
    /// Distance from the camera to the plane of perfect focus
    pub focus_dist: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aperture: 0.0,
            focus_dist: 1.0,
        }
    }
}

impl CameraConfig {
    /// Place the eye at `look_from`, aimed at `look_at`.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Field of view in degrees, lens diameter and focus distance.
    pub fn with_lens(mut self, vfov: f32, aperture: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Reject placements and lenses that cannot form a view basis.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(RenderError::InvalidConfig(msg));

        if !(self.look_from.is_finite() && self.look_at.is_finite() && self.vup.is_finite()) {
            return invalid("camera position vectors must be finite".into());
        }
        let view = self.look_from - self.look_at;
        if view.length_squared() < 1e-12 {
            return invalid(format!("look_from and look_at coincide at {}", self.look_from));
        }
        if self.vup.cross(view.normalize()).length_squared() < 1e-12 {
            return invalid(format!("vup {} is parallel to the view direction", self.vup));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return invalid(format!("vfov {} must lie in (0, 180) degrees", self.vfov));
        }
        if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            return invalid(format!("focus_dist {} must be positive", self.focus_dist));
        }
        if !(self.aperture.is_finite() && self.aperture >= 0.0) {
            return invalid(format!("aperture {} must be non-negative", self.aperture));
        }
        Ok(())
    }
}

/// Ray generator for a fixed image aspect.
///
/// Built once per render and shared read-only by all workers.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Build the view basis and focus-plane rectangle for `aspect` (width / height).
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let theta = config.vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = aspect * half_height;

        // Orthonormal view basis; w points away from the scene
        let w = (config.look_from - config.look_at).normalize();
        let u = config.vup.cross(w).normalize();
        let v = w.cross(u);

        let focus = config.focus_dist;
        let origin = config.look_from;
        let lower_left_corner =
            origin - half_width * focus * u - half_height * focus * v - focus * w;

        Self {
            origin,
            lower_left_corner,
            horizontal: 2.0 * half_width * focus * u,
            vertical: 2.0 * half_height * focus * v,
            u,
            v,
            w,
            lens_radius: config.aperture / 2.0,
        }
    }

    /// Generate a ray through the image plane at normalized `(s, t)`.
    ///
    /// `(0, 0)` is the lower-left corner and `(1, 1)` the upper-right. The
    /// origin is jittered across the lens only when the aperture is open.
    pub fn get_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new(self.origin + offset, target - self.origin - offset)
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Viewing direction basis vector (points away from the scene).
    pub fn w(&self) -> Vec3 {
        self.w
    }

    pub fn lens_radius(&self) -> f32 {
        self.lens_radius
    }
}

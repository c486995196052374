//! Path integrator.
//!
//! Traces a camera ray through the scene, bouncing off surfaces until it is
//! absorbed, escapes to the background, or runs out of depth.

use crate::config::{Background, DepthPolicy};
use crate::stats::TileStats;
use crate::{Color, Hittable, Ray};
use ember_math::Interval;
use rand::RngCore;

/// Settings the integrator needs for one path.
#[derive(Debug, Clone, Copy)]
pub struct TraceSettings {
    pub max_depth: u32,
    pub depth_policy: DepthPolicy,
    pub background: Background,
    pub t_min: f32,
}

/// Compute the linear radiance arriving along `ray`.
///
/// Equivalent to the recursive formulation
/// `color(ray, d) = attenuation * damping(d) * color(scattered, d + 1)` with
/// black at `max_depth`, but carried as a running throughput product.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    settings: &TraceSettings,
    rng: &mut dyn RngCore,
    stats: &mut TileStats,
) -> Color {
    let window = Interval::beyond(settings.t_min);
    let primitives = world.primitive_count() as u64;

    let mut ray = *ray;
    let mut throughput = Color::ONE;

    for depth in 0..settings.max_depth {
        stats.rays_traced += 1;
        stats.intersection_tests += primitives;

        let Some(rec) = world.hit(&ray, window) else {
            return throughput * background_color(&ray, &settings.background);
        };

        stats.material_evaluations += 1;
        match rec.material.scatter(&ray, &rec, rng) {
            Some(result) => {
                throughput *= result.attenuation * settings.depth_policy.damping(depth);
                ray = result.scattered;
            }
            // Absorbed
            None => return Color::ZERO,
        }
    }

    Color::ZERO
}

fn background_color(ray: &Ray, background: &Background) -> Color {
    match background {
        Background::Sky => sky_gradient(ray),
        Background::Solid(color) => *color,
    }
}

/// White at the nadir blending to light blue at the zenith.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.unit_direction();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Gamma 2 encoding. Non-positive input maps to 0.
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Gamma-encode and clamp an averaged linear color for the pixel buffer.
#[inline]
pub fn encode_pixel(linear: Color) -> Color {
    Color::new(
        clamp_01(linear_to_gamma(linear.x)),
        clamp_01(linear_to_gamma(linear.y)),
        clamp_01(linear_to_gamma(linear.z)),
    )
}

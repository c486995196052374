//! Surface response: each material either absorbs a ray or scatters it
//! into one new ray with a color attenuation.

use crate::random::{gen_f32, random_in_unit_sphere};
use crate::{hittable::HitRecord, Ray};
use ember_math::{reflect, refract, Vec3};
use rand::RngCore;

/// Linear RGB.
pub type Color = Vec3;

/// Outcome of a scatter event that did not absorb the ray.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel throughput multiplier
    pub attenuation: Color,
    /// The outgoing ray, starting at the hit point
    pub scattered: Ray,
}

/// Materials hold no mutable state and are shared read-only across workers.
pub trait Material: Send + Sync {
    /// `None` means the ray was absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;
}

/// Diffuse surface. Never absorbs.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_in_unit_sphere(rng);

        // Sample cancelled the normal
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Mirror with optional roughness.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// `fuzz` is clamped to `[0, 1]`; 0 is a perfect mirror.
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f32 {
        self.fuzz
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected = reflect(ray_in.unit_direction(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Fuzz pushed the ray below the surface
        if scattered_dir.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scattered_dir),
        })
    }
}

/// Clear glass-like medium. Attenuation is always white.
#[derive(Debug, Clone)]
pub struct Dielectric {
    ior: f32,
}

impl Dielectric {
    /// `ior` relative to the surrounding medium, 1.5 for glass.
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick reflectance at `cosine` for relative index `ior`.
    pub fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let direction = ray_in.direction();
        let reflected = reflect(direction, rec.normal);
        let cos_in = direction.dot(rec.normal) / direction.length();

        // Leaving the medium when the ray travels along the normal
        let exiting = cos_in > 0.0;
        let (outward_normal, ni_over_nt) = if exiting {
            (-rec.normal, self.ior)
        } else {
            (rec.normal, 1.0 / self.ior)
        };

        let scattered_dir = match refract(direction, outward_normal, ni_over_nt) {
            // Total internal reflection
            None => reflected,
            Some(refracted) => {
                let cosine = if exiting {
                    (1.0 - self.ior * self.ior * (1.0 - cos_in * cos_in)).sqrt()
                } else {
                    -cos_in
                };
                if gen_f32(rng) < Self::reflectance(cosine, self.ior) {
                    reflected
                } else {
                    refracted
                }
            }
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, scattered_dir),
        })
    }
}

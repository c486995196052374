//! Scene geometry queries: the `Hittable` trait and the closest-hit list.

use crate::{Material, Ray};
use ember_math::{Interval, Vec3};

/// Nearest surface found by a query, borrowing the surface's material.
#[derive(Clone, Copy)]
pub struct HitRecord<'a> {
    pub t: f32,
    /// `ray.at(t)`
    pub p: Vec3,
    /// Surface normal, `(p - center) / radius` for spheres. Not flipped
    /// toward the ray; materials decide inside/outside themselves.
    pub normal: Vec3,
    pub material: &'a dyn Material,
}

impl std::fmt::Debug for HitRecord<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRecord")
            .field("t", &self.t)
            .field("p", &self.p)
            .field("normal", &self.normal)
            .finish_non_exhaustive()
    }
}

/// Anything a ray can be tested against. Shared read-only by all workers.
pub trait Hittable: Send + Sync {
    /// Find the nearest intersection strictly inside `ray_t`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;

    /// Number of primitives a single `hit` call tests.
    fn primitive_count(&self) -> usize {
        1
    }
}

/// Flat list of objects, searched front to back for the closest hit.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    pub fn new() -> Self {
        Self { objects: Vec::new() }
    }

    pub fn add(&mut self, object: impl Hittable + 'static) {
        self.objects.push(Box::new(object));
    }

    /// Same as `add` for objects that are already trait objects.
    pub fn add_boxed(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Top-level entries, not primitives.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for entry in &self.objects {
            let window = closest.map_or(ray_t, |rec| ray_t.with_max(rec.t));
            if let Some(rec) = entry.hit(ray, window) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn primitive_count(&self) -> usize {
        self.objects.iter().map(|o| o.primitive_count()).sum()
    }
}

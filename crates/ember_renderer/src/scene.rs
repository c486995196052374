//! Programmatic scene construction.
//!
//! A scene is the root hittable plus where the camera stands. Materials are
//! shared between spheres through `Arc`, and the scene owns everything for
//! the lifetime of the render.

use crate::random::gen_f32;
use crate::{
    CameraConfig, Color, Dielectric, HittableList, Lambertian, Material, Metal, Sphere, Vec3,
};
use rand::RngCore;
use std::sync::Arc;

/// Geometry and camera placement for one render.
pub struct Scene {
    pub world: HittableList,
    pub camera: CameraConfig,
}

impl Scene {
    pub fn new(world: HittableList, camera: CameraConfig) -> Self {
        Self { world, camera }
    }

    /// A small diffuse sphere resting on a large diffuse ground sphere,
    /// seen from the origin looking down -z.
    pub fn two_spheres() -> Self {
        let gray: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));

        let mut world = HittableList::new();
        world.add(Sphere::new(Vec3::new(0.0, -100.5, -1.0), 100.0, Arc::clone(&gray)));
        world.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, gray));

        Self::new(world, CameraConfig::default())
    }

    /// Diffuse, metal and hollow glass spheres side by side.
    ///
    /// The hollow shell is a glass sphere with a slightly smaller
    /// negative-radius sphere inside it, whose normals point inward.
    pub fn hollow_glass() -> Self {
        let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));

        let mut world = HittableList::new();
        world.add(Sphere::new(
            Vec3::new(0.0, -100.5, -1.0),
            100.0,
            Arc::new(Lambertian::new(Color::new(0.8, 0.8, 0.0))),
        ));
        world.add(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::new(Color::new(0.1, 0.2, 0.5))),
        ));
        world.add(Sphere::new(
            Vec3::new(1.0, 0.0, -1.0),
            0.5,
            Arc::new(Metal::new(Color::new(0.8, 0.6, 0.2), 0.2)),
        ));
        world.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, Arc::clone(&glass)));
        world.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), -0.45, glass));

        let camera = CameraConfig::default()
            .with_position(Vec3::new(-2.0, 2.0, 1.0), Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(40.0, 0.0, 1.0);
        Self::new(world, camera)
    }

    /// The classic showcase: a field of small random spheres around three
    /// large ones, at most `max_objects` spheres in total.
    pub fn random_spheres(rng: &mut dyn RngCore, max_objects: usize) -> Self {
        let mut world = HittableList::new();
        world.add(Sphere::new(
            Vec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Arc::new(Lambertian::new(Color::splat(0.5))),
        ));

        // Room for the ground and the three feature spheres
        let budget = max_objects.saturating_sub(4);
        let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
        let mut small = 0;

        'grid: for a in -5..5 {
            for b in -5..5 {
                if small >= budget {
                    break 'grid;
                }

                let choose_mat = gen_f32(rng);
                let center = Vec3::new(
                    a as f32 + 0.9 * gen_f32(rng),
                    0.2,
                    b as f32 + 0.9 * gen_f32(rng),
                );
                if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                    continue;
                }

                let material: Arc<dyn Material> = if choose_mat < 0.8 {
                    let albedo = Color::new(
                        gen_f32(rng) * gen_f32(rng),
                        gen_f32(rng) * gen_f32(rng),
                        gen_f32(rng) * gen_f32(rng),
                    );
                    Arc::new(Lambertian::new(albedo))
                } else if choose_mat < 0.95 {
                    let albedo = Color::new(
                        0.5 * (1.0 + gen_f32(rng)),
                        0.5 * (1.0 + gen_f32(rng)),
                        0.5 * (1.0 + gen_f32(rng)),
                    );
                    Arc::new(Metal::new(albedo, 0.5 * gen_f32(rng)))
                } else {
                    Arc::clone(&glass)
                };

                world.add(Sphere::new(center, 0.2, material));
                small += 1;
            }
        }

        world.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, glass));
        world.add(Sphere::new(
            Vec3::new(-4.0, 1.0, 0.0),
            1.0,
            Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
        ));
        world.add(Sphere::new(
            Vec3::new(4.0, 1.0, 0.0),
            1.0,
            Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
        ));

        let camera = CameraConfig::default()
            .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
            .with_lens(20.0, 0.0, 10.0);
        Self::new(world, camera)
    }
}

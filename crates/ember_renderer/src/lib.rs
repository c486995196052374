//! Ember - tile-based parallel CPU path tracer.
//!
//! Renders a scene of spheres by Monte Carlo path tracing. The image is cut
//! into tiles that a fixed pool of workers renders concurrently into a shared
//! pixel buffer, while an observer can watch progress and pause, resume or
//! cancel the render.
//!
//! # Example
//!
//! ```no_run
//! use ember_renderer::{RenderConfig, RenderOutcome, Renderer, Scene};
//!
//! let config = RenderConfig::default().with_resolution(320, 240).with_quality(16, 8);
//! let renderer = Renderer::new(Scene::two_spheres(), config)?;
//! let handle = renderer.start(renderer.tiles()?)?;
//! println!("{:?}", handle.progress());
//! let report = handle.wait()?;
//! assert_eq!(report.outcome, RenderOutcome::Completed);
//! # Ok::<(), ember_renderer::RenderError>(())
//! ```

mod buffer;
mod camera;
mod config;
mod control;
mod error;
mod hittable;
mod integrator;
mod material;
mod pool;
mod random;
mod scene;
mod session;
mod sphere;
mod stats;
mod tile;

pub use buffer::{color_to_rgba, ImageBuffer, PixelBuffer};
pub use camera::{Camera, CameraConfig};
pub use config::{
    Background, DepthPolicy, RenderConfig, TileOrder, DEFAULT_MAX_THREADS, DEFAULT_TILE_SIZE,
};
pub use control::{Progress, RenderControl, RenderProgress, RenderState};
pub use error::{RenderError, Result};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use integrator::{
    clamp_01, encode_pixel, linear_to_gamma, ray_color, sky_gradient, TraceSettings,
};
pub use material::{Color, Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use pool::{resolve_thread_count, WorkerPool};
pub use random::{entropy_rng, gen_f32, random_in_unit_disk, random_in_unit_sphere, tile_rng};
pub use scene::Scene;
pub use session::{RenderHandle, RenderOutcome, RenderReport, Renderer};
pub use sphere::Sphere;
pub use stats::{RenderStats, TileStats};
pub use tile::{
    generate_tiles, render_pixel, render_tile, validate_tiles, Tile, TileContext, TileReport,
};

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Interval, Ray, Vec3};

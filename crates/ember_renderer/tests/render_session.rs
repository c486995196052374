//! End-to-end tests for the tile renderer and its control surface.

use ember_renderer::{
    encode_pixel, gen_f32, ray_color, sky_gradient, tile_rng, Background, CameraConfig, Color,
    DepthPolicy, Hittable, HittableList, Interval, RenderConfig, RenderError, RenderOutcome,
    RenderState, Renderer, Scene, Tile, TileOrder, TileStats, TraceSettings, Vec3,
};
use std::thread;
use std::time::{Duration, Instant};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Sky-only scene with enough samples that a render takes seconds.
fn slow_renderer(threads: usize) -> Renderer {
    let scene = Scene::new(HittableList::new(), CameraConfig::default());
    let config = RenderConfig::default()
        .with_resolution(400, 400)
        .with_quality(2000, 4)
        .with_tiles(16, TileOrder::RowMajor)
        .with_threads(threads);
    Renderer::new(scene, config).unwrap()
}

/// Sky seen by the default camera (eye at the origin, looking down -z,
/// 90 degree vertical FOV) at image-plane coordinates `(s, t)` for a 4:3
/// image, gamma-encoded.
fn default_camera_sky(s: f32, t: f32) -> Color {
    let direction = Vec3::new(-4.0 / 3.0 + s * 8.0 / 3.0, -1.0 + 2.0 * t, -1.0);
    let a = 0.5 * (direction.normalize().y + 1.0);
    let linear = Color::new(1.0 - 0.5 * a, 1.0 - 0.3 * a, 1.0);
    Color::new(linear.x.sqrt(), linear.y.sqrt(), linear.z.sqrt())
}

fn lit_pixels(image: &ember_renderer::ImageBuffer) -> u64 {
    image.pixels.iter().filter(|c| **c != Color::ZERO).count() as u64
}

#[test]
fn tiny_render_matches_reference() {
    init_logging();

    let config = RenderConfig::default()
        .with_resolution(4, 3)
        .with_quality(1, 1)
        .with_tiles(8, TileOrder::RowMajor)
        .with_threads(2)
        .with_seed(1234);
    let renderer = Renderer::new(Scene::two_spheres(), config.clone()).unwrap();
    let tiles = renderer.tiles().unwrap();
    assert_eq!(tiles.len(), 1);

    let report = renderer.start(tiles).unwrap().wait().unwrap();
    assert_eq!(report.outcome, RenderOutcome::Completed);

    // Replay the single tile's sample stream by hand
    let settings = TraceSettings {
        max_depth: config.max_depth,
        depth_policy: config.depth_policy,
        background: config.background,
        t_min: config.t_min,
    };
    let world = &renderer.scene().world;
    let mut rng = tile_rng(1234, 0);
    let mut stats = TileStats::default();
    let mut sky_pixels = 0;
    let mut hit_pixels = 0;

    for y in 0..3u32 {
        for x in 0..4u32 {
            let s = (x as f32 + gen_f32(&mut rng)) / 4.0;
            let t = ((2 - y) as f32 + gen_f32(&mut rng)) / 3.0;
            let ray = renderer.camera().get_ray(s, t, &mut rng);
            let expected = encode_pixel(ray_color(&ray, world, &settings, &mut rng, &mut stats));

            let actual = report.image.get(x, y);
            assert!((actual - expected).length() < 1e-6, "pixel ({x}, {y})");

            if world.hit(&ray, Interval::beyond(config.t_min)).is_none() {
                assert_eq!(actual, encode_pixel(sky_gradient(&ray)));
                let by_hand = default_camera_sky(s, t);
                assert!((actual - by_hand).length() < 1e-5, "sky at ({x}, {y})");
                sky_pixels += 1;
            } else {
                // One segment only: every hit runs out of depth
                assert_eq!(actual, Color::ZERO);
                hit_pixels += 1;
            }
        }
    }

    assert!(sky_pixels > 0 && hit_pixels > 0);
    assert_ne!(report.image.get(0, 0), Color::ZERO);
    // Top row looks above the horizon, bluer than white
    assert!(report.image.get(0, 0).x < report.image.get(0, 0).z);
    assert_eq!(report.image.get(0, 2), Color::ZERO);
    assert_eq!(report.stats.rays_traced, stats.rays_traced);
    assert_eq!(report.stats.pixels_written, 12);
}

#[test]
fn seeded_render_is_independent_of_worker_count() {
    let render = |threads: usize, order: TileOrder| {
        let config = RenderConfig::default()
            .with_resolution(32, 24)
            .with_quality(4, 8)
            .with_tiles(8, order)
            .with_threads(threads)
            .with_seed(42);
        Renderer::new(Scene::two_spheres(), config).unwrap().render().unwrap()
    };

    let single = render(1, TileOrder::RowMajor);
    let many = render(4, TileOrder::RowMajor);
    let again = render(4, TileOrder::RowMajor);

    assert_eq!(single.image, many.image);
    assert_eq!(many.image, again.image);
    assert_eq!(single.stats.rays_traced, many.stats.rays_traced);
}

#[test]
fn unseeded_renders_converge_to_the_same_mean() {
    let render = |threads: usize| {
        let config = RenderConfig::default()
            .with_resolution(32, 24)
            .with_quality(64, 8)
            .with_tiles(8, TileOrder::Spiral)
            .with_threads(threads);
        Renderer::new(Scene::two_spheres(), config).unwrap().render().unwrap()
    };

    let single = render(1);
    let many = render(4);

    assert_ne!(single.image, many.image);
    assert!((single.image.mean() - many.image.mean()).abs() < 0.02);
}

#[test]
fn empty_scene_shows_solid_background() {
    let background = Color::new(0.04, 0.25, 0.81);
    let config = RenderConfig::default()
        .with_resolution(12, 9)
        .with_quality(3, 4)
        .with_tiles(5, TileOrder::RowMajor)
        .with_background(Background::Solid(background));
    let scene = Scene::new(HittableList::new(), CameraConfig::default());
    let report = Renderer::new(scene, config).unwrap().render().unwrap();

    let expected = encode_pixel(background);
    assert!(report.image.pixels.iter().all(|c| (*c - expected).length() < 1e-6));
    assert_eq!(report.stats.rays_traced, 12 * 9 * 3);
    assert_eq!(report.stats.intersection_tests, 0);
    assert_eq!(report.stats.material_evaluations, 0);
}

#[test]
fn completed_render_reports_full_progress() {
    init_logging();

    let config = RenderConfig::default()
        .with_resolution(40, 30)
        .with_quality(2, 6)
        .with_tiles(16, TileOrder::Spiral)
        .with_depth_policy(DepthPolicy::Falloff { factor: 0.9 })
        .with_threads(3);
    let renderer = Renderer::new(Scene::hollow_glass(), config).unwrap();
    let tiles = renderer.tiles().unwrap();
    let tile_count = tiles.len();

    let handle = renderer.start(tiles).unwrap();
    let deadline = Instant::now() + Duration::from_secs(30);
    while !handle.is_finished() {
        assert!(Instant::now() < deadline, "render did not finish");
        thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(handle.state(), RenderState::Completed);
    let progress = handle.progress();
    assert_eq!(progress.completed_pixels, 1200);
    assert_eq!(progress.total_pixels, 1200);
    assert_eq!(progress.completed_tiles, tile_count);
    assert_eq!(progress.fraction(), 1.0);

    let frozen = handle.elapsed();
    thread::sleep(Duration::from_millis(5));
    assert_eq!(handle.elapsed(), frozen);

    let report = handle.wait().unwrap();
    assert_eq!(report.outcome, RenderOutcome::Completed);
    assert_eq!(report.stats.tiles_completed, tile_count);
    assert_eq!(report.stats.pixels_written, 1200);
    assert!(report.stats.rays_traced >= 1200 * 2);
    assert!(report.stats.intersection_tests >= report.stats.rays_traced * 5);
    assert!(report.stats.material_evaluations > 0);
    assert!(report
        .image
        .pixels
        .iter()
        .all(|c| c.cmpge(Color::ZERO).all() && c.cmple(Color::ONE).all()));
}

#[test]
fn cancel_stops_quickly_and_leaves_unreached_pixels_black() {
    init_logging();

    let renderer = slow_renderer(2);
    let handle = renderer.start(renderer.tiles().unwrap()).unwrap();
    let pixels = handle.pixels();

    thread::sleep(Duration::from_millis(20));
    let cancelled_at = Instant::now();
    handle.cancel();
    assert!(handle.is_cancelled());

    let progress_before_wait = handle.progress();
    let report = handle.wait().unwrap();
    assert!(cancelled_at.elapsed() < Duration::from_secs(5));

    assert_eq!(report.outcome, RenderOutcome::Cancelled);
    assert!(report.stats.pixels_written < 400 * 400);
    assert!(report.stats.pixels_written >= progress_before_wait.completed_pixels);
    assert!(report.stats.tiles_completed < 625);

    // Exactly the written pixels are lit; everything else is untouched
    assert_eq!(lit_pixels(&report.image), report.stats.pixels_written);
    assert_eq!(pixels.snapshot(), report.image);
}

#[test]
fn pause_holds_progress_until_resume() {
    let renderer = slow_renderer(2);
    let handle = renderer.start(renderer.tiles().unwrap()).unwrap();

    thread::sleep(Duration::from_millis(20));
    handle.pause();
    assert!(handle.is_paused());
    assert_eq!(handle.state(), RenderState::Paused);

    // Let in-flight pixels drain
    thread::sleep(Duration::from_millis(100));
    let held = handle.progress();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(handle.progress(), held);

    handle.resume();
    assert_eq!(handle.state(), RenderState::Running);
    thread::sleep(Duration::from_millis(100));
    assert!(handle.progress().completed_pixels > held.completed_pixels);

    handle.cancel();
    assert_eq!(handle.wait().unwrap().outcome, RenderOutcome::Cancelled);
}

#[test]
fn cancel_releases_paused_workers() {
    let renderer = slow_renderer(2);
    let handle = renderer.start(renderer.tiles().unwrap()).unwrap();

    handle.pause();
    thread::sleep(Duration::from_millis(20));
    handle.cancel();

    let report = handle.wait().unwrap();
    assert_eq!(report.outcome, RenderOutcome::Cancelled);
}

#[test]
fn waiting_on_a_paused_render_resumes_it() {
    let config = RenderConfig::default()
        .with_resolution(16, 12)
        .with_quality(2, 4)
        .with_tiles(4, TileOrder::RowMajor)
        .with_threads(2);
    let renderer = Renderer::new(Scene::two_spheres(), config).unwrap();
    let handle = renderer.start(renderer.tiles().unwrap()).unwrap();
    handle.pause();

    let report = handle.wait().unwrap();
    assert_eq!(report.outcome, RenderOutcome::Completed);
    assert_eq!(report.stats.pixels_written, 16 * 12);
}

#[test]
fn dropping_a_running_handle_cancels_it() {
    let renderer = slow_renderer(2);
    let started = Instant::now();
    {
        let handle = renderer.start(renderer.tiles().unwrap()).unwrap();
        thread::sleep(Duration::from_millis(10));
        drop(handle);
    }
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn partial_tile_list_renders_only_its_pixels() {
    let config = RenderConfig::default()
        .with_resolution(8, 8)
        .with_quality(2, 4)
        .with_threads(2);
    let renderer = Renderer::new(Scene::two_spheres(), config).unwrap();

    let tiles = vec![Tile::new(0, 0, 4, 4, 2, 0), Tile::new(4, 4, 4, 4, 1, 1)];
    let handle = renderer.start(tiles).unwrap();
    assert_eq!(handle.progress().total_pixels, 32);
    assert_eq!(handle.progress().total_tiles, 2);

    let report = handle.wait().unwrap();
    assert_eq!(report.outcome, RenderOutcome::Completed);
    assert_eq!(report.stats.pixels_written, 32);
    for y in 0..8 {
        for x in 0..8 {
            let inside = (x < 4 && y < 4) || (x >= 4 && y >= 4);
            let color = report.image.get(x, y);
            if !inside {
                assert_eq!(color, Color::ZERO, "pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn start_rejects_bad_tiles() {
    let config = RenderConfig::default().with_resolution(8, 8).with_quality(1, 2);
    let renderer = Renderer::new(Scene::two_spheres(), config).unwrap();

    let overlapping = vec![Tile::new(0, 0, 5, 5, 1, 0), Tile::new(4, 4, 4, 4, 1, 1)];
    assert!(matches!(renderer.start(overlapping), Err(RenderError::InvalidTiles(_))));

    let outside = vec![Tile::new(0, 0, 9, 1, 1, 0)];
    assert!(matches!(renderer.start(outside), Err(RenderError::InvalidTiles(_))));

    let same_index = vec![Tile::new(0, 0, 4, 4, 1, 0), Tile::new(4, 4, 4, 4, 1, 0)];
    assert!(matches!(renderer.start(same_index), Err(RenderError::InvalidTiles(_))));
}

#[test]
fn renderer_rejects_invalid_config() {
    let config = RenderConfig::default().with_resolution(0, 8);
    assert!(matches!(
        Renderer::new(Scene::two_spheres(), config),
        Err(RenderError::InvalidConfig(_))
    ));
}

#[test]
fn renderer_rejects_degenerate_camera() {
    let config = RenderConfig::default().with_resolution(4, 3).with_quality(1, 1);
    let cameras = [
        CameraConfig::default().with_position(Vec3::ZERO, Vec3::ZERO, Vec3::Y),
        CameraConfig::default().with_position(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0), Vec3::Y),
        CameraConfig::default().with_lens(180.0, 0.0, 1.0),
        CameraConfig::default().with_lens(90.0, 0.0, 0.0),
        CameraConfig::default().with_lens(90.0, -1.0, 1.0),
    ];
    for camera in cameras {
        let scene = Scene::new(HittableList::new(), camera);
        assert!(
            matches!(
                Renderer::new(scene, config.clone()),
                Err(RenderError::InvalidConfig(_))
            ),
            "{camera:?}"
        );
    }
}

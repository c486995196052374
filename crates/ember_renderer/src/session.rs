//! Render sessions: start a render in the background, steer it, collect it.

use crate::buffer::{ImageBuffer, PixelBuffer};
use crate::control::{Progress, RenderControl, RenderProgress, RenderState};
use crate::integrator::TraceSettings;
use crate::pool::{resolve_thread_count, WorkerPool};
use crate::stats::RenderStats;
use crate::tile::{generate_tiles, validate_tiles, Tile, TileContext, TileReport};
use crate::{Camera, RenderConfig, RenderError, Result, Scene};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How a render ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Every tile was rendered.
    Completed,
    /// Stopped on request; the image is only partially filled.
    Cancelled,
}

/// Everything a finished render produced.
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub outcome: RenderOutcome,
    pub stats: RenderStats,
    /// Gamma-encoded pixels, rows top to bottom
    pub image: ImageBuffer,
}

/// A scene and configuration ready to be rendered.
pub struct Renderer {
    scene: Arc<Scene>,
    camera: Camera,
    config: RenderConfig,
}

impl Renderer {
    pub fn new(scene: Scene, config: RenderConfig) -> Result<Self> {
        config.validate()?;
        scene.camera.validate()?;
        let camera = Camera::new(&scene.camera, config.aspect_ratio());
        Ok(Self {
            scene: Arc::new(scene),
            camera,
            config,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Tiles for the whole image using the configured size and order.
    pub fn tiles(&self) -> Result<Vec<Tile>> {
        generate_tiles(
            self.config.width,
            self.config.height,
            self.config.tile_size,
            self.config.samples_per_pixel,
            self.config.tile_order,
        )
    }

    /// Start rendering `tiles` in the background and return immediately.
    ///
    /// Fails fast if the tiles overlap or leave the image, or if the worker
    /// pool cannot be created with the resolved thread count.
    pub fn start(&self, tiles: Vec<Tile>) -> Result<RenderHandle> {
        validate_tiles(self.config.width, self.config.height, &tiles)?;

        let threads = resolve_thread_count(self.config.threads, self.config.max_threads);
        let pool = WorkerPool::new(threads)?;

        let total_pixels = tiles.iter().map(Tile::pixel_count).sum();
        let shared = Arc::new(RenderShared {
            scene: Arc::clone(&self.scene),
            camera: self.camera.clone(),
            settings: TraceSettings {
                max_depth: self.config.max_depth,
                depth_policy: self.config.depth_policy,
                background: self.config.background,
                t_min: self.config.t_min,
            },
            pixels: Arc::new(PixelBuffer::new(self.config.width, self.config.height)),
            control: RenderControl::new(),
            progress: RenderProgress::new(total_pixels, tiles.len()),
        });

        log::info!(
            "Rendering {}x{} @ {} spp: {} tiles on {} workers",
            self.config.width,
            self.config.height,
            self.config.samples_per_pixel,
            tiles.len(),
            pool.thread_count()
        );

        shared.progress.set_state(RenderState::Running);
        let seed = self.config.seed;
        let thread = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("render-dispatch".into())
                .spawn(move || dispatch(&shared, &pool, &tiles, seed))?
        };

        Ok(RenderHandle {
            shared,
            thread: Some(thread),
        })
    }

    /// Render the whole image and block until it is done.
    pub fn render(&self) -> Result<RenderReport> {
        self.start(self.tiles()?)?.wait()
    }
}

/// State shared between the handle, the dispatch thread and the workers.
struct RenderShared {
    scene: Arc<Scene>,
    camera: Camera,
    settings: TraceSettings,
    pixels: Arc<PixelBuffer>,
    control: RenderControl,
    progress: RenderProgress,
}

fn dispatch(
    shared: &RenderShared,
    pool: &WorkerPool,
    tiles: &[Tile],
    seed: Option<u64>,
) -> Vec<TileReport> {
    let ctx = TileContext {
        camera: &shared.camera,
        world: &shared.scene.world,
        settings: shared.settings,
        pixels: &shared.pixels,
        control: &shared.control,
        progress: &shared.progress,
    };

    let reports = pool.render(tiles, &ctx, seed);

    let state = if reports.iter().all(|r| r.finished) {
        RenderState::Completed
    } else {
        RenderState::Cancelled
    };
    shared.progress.finish(state);
    log::info!("Render {:?} after {:?}", state, shared.progress.elapsed());

    reports
}

/// Control surface for an in-flight render.
///
/// Dropping the handle of an unfinished render cancels it and waits for the
/// workers to return.
pub struct RenderHandle {
    shared: Arc<RenderShared>,
    thread: Option<JoinHandle<Vec<TileReport>>>,
}

impl RenderHandle {
    /// Suspend all workers after the pixel each is working on.
    pub fn pause(&self) {
        log::debug!("Pausing render");
        self.shared.control.pause();
    }

    pub fn resume(&self) {
        log::debug!("Resuming render");
        self.shared.control.resume();
    }

    /// Request a stop. Workers abandon their tiles at the next pixel.
    pub fn cancel(&self) {
        log::debug!("Cancelling render");
        self.shared.control.cancel();
    }

    pub fn is_paused(&self) -> bool {
        self.shared.control.is_paused()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.control.is_cancelled()
    }

    pub fn state(&self) -> RenderState {
        match self.shared.progress.state() {
            RenderState::Running if self.shared.control.is_paused() => RenderState::Paused,
            state => state,
        }
    }

    /// True once every worker has returned.
    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    pub fn progress(&self) -> Progress {
        self.shared.progress.snapshot()
    }

    pub fn elapsed(&self) -> Duration {
        self.shared.progress.elapsed()
    }

    /// The live pixel buffer, for progressive display while workers run.
    pub fn pixels(&self) -> Arc<PixelBuffer> {
        Arc::clone(&self.shared.pixels)
    }

    /// Block until the render finishes and fold the per-tile statistics.
    ///
    /// A paused render is resumed first, since parked workers would never
    /// return. Cancel before waiting to stop early instead.
    pub fn wait(mut self) -> Result<RenderReport> {
        let Some(thread) = self.thread.take() else {
            return Err(RenderError::WorkerPanicked);
        };

        if self.shared.control.is_paused() {
            log::debug!("Resuming paused render before waiting");
            self.shared.control.resume();
        }

        let reports = match thread.join() {
            Ok(reports) => reports,
            Err(_) => {
                self.shared.progress.finish(RenderState::Cancelled);
                return Err(RenderError::WorkerPanicked);
            }
        };

        let completed = reports.iter().filter(|r| r.finished).count();
        let stats = RenderStats::from_tiles(
            reports.iter().map(|r| &r.stats),
            completed,
            self.shared.progress.elapsed(),
        );
        stats.log_summary();

        let outcome = match self.shared.progress.state() {
            RenderState::Completed => RenderOutcome::Completed,
            _ => RenderOutcome::Cancelled,
        };

        Ok(RenderReport {
            outcome,
            stats,
            image: self.shared.pixels.snapshot(),
        })
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.shared.control.cancel();
            let _ = thread.join();
        }
    }
}

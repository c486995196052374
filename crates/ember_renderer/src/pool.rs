//! Fixed-size worker pool that renders tiles with dynamic load balancing.
//!
//! Backed by a dedicated rayon pool. Tiles are split into units of one, so
//! idle workers steal the next tile as soon as they finish their current one.

use crate::random::{entropy_rng, tile_rng};
use crate::tile::{render_tile, Tile, TileContext, TileReport};
use crate::Result;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Resolve the worker count: 0 means hardware concurrency, and the result
/// never exceeds `max_threads`.
pub fn resolve_thread_count(requested: usize, max_threads: usize) -> usize {
    let wanted = if requested == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        requested
    };

    let cap = max_threads.max(1);
    if wanted > cap {
        log::warn!("Requested {wanted} worker threads, capping at {cap}");
    }
    wanted.clamp(1, cap)
}

/// A pool of render workers.
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Spin up exactly `threads` workers or fail.
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("render-worker-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Render every tile and return one report per tile, in tile order.
    ///
    /// Blocks until all workers are done with their tiles. With a seed, each
    /// tile draws from its own generator so the image does not depend on
    /// which worker renders which tile. Otherwise generators are seeded from
    /// entropy and never shared between workers.
    pub fn render(
        &self,
        tiles: &[Tile],
        ctx: &TileContext<'_>,
        seed: Option<u64>,
    ) -> Vec<TileReport> {
        self.pool.install(|| {
            tiles
                .par_iter()
                .with_max_len(1)
                .map_init(entropy_rng, |rng, tile| {
                    if !ctx.control.checkpoint() {
                        return TileReport {
                            tile: *tile,
                            stats: Default::default(),
                            finished: false,
                        };
                    }

                    if let Some(seed) = seed {
                        *rng = tile_rng(seed, tile.index);
                    }

                    let report = render_tile(tile, ctx, rng);
                    if report.finished {
                        ctx.progress.record_tile();
                        log::debug!(
                            "Tile {} ({}x{} at {},{}) done in {:?}",
                            tile.index,
                            tile.width,
                            tile.height,
                            tile.x,
                            tile.y,
                            report.stats.render_time
                        );
                    }
                    report
                })
                .collect()
        })
    }
}

//! Tile-based partitioning and per-tile rendering.
//!
//! Divides the image into tiles that can be rendered independently and in
//! parallel. Tiles never overlap and together cover every pixel exactly once,
//! which is what lets workers write the shared buffer without locks.

use crate::buffer::PixelBuffer;
use crate::config::TileOrder;
use crate::control::{RenderControl, RenderProgress};
use crate::integrator::{encode_pixel, ray_color, TraceSettings};
use crate::random::gen_f32;
use crate::stats::TileStats;
use crate::{Camera, Color, Hittable, RenderError, Result};
use rand::RngCore;
use std::collections::HashSet;
use std::time::Instant;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// X coordinate of the tile's top-left corner
    pub x: u32,
    /// Y coordinate of the tile's top-left corner (row 0 is the top)
    pub y: u32,
    /// Width of the tile in pixels
    pub width: u32,
    /// Height of the tile in pixels
    pub height: u32,
    /// Samples taken for every pixel of this tile
    pub samples_per_pixel: u32,
    /// Index of this tile in the render order. Seeded renders key each
    /// tile's sample stream on it, so indices must be unique.
    pub index: usize,
}

impl Tile {
    /// Create a new tile.
    pub fn new(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        samples_per_pixel: u32,
        index: usize,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            samples_per_pixel,
            index,
        }
    }

    /// Get the total number of pixels in this tile.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Partition an image into tiles of at most `tile_size` x `tile_size`.
///
/// The last tile in each row and column is clipped to the image bounds.
/// Both orders are deterministic.
pub fn generate_tiles(
    width: u32,
    height: u32,
    tile_size: u32,
    samples_per_pixel: u32,
    order: TileOrder,
) -> Result<Vec<Tile>> {
    if tile_size == 0 {
        return Err(RenderError::InvalidConfig("tile_size must be at least 1".into()));
    }

    let mut tiles = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let tw = tile_size.min(width - x);
            let th = tile_size.min(height - y);
            tiles.push(Tile::new(x, y, tw, th, samples_per_pixel, tiles.len()));
            x = x.saturating_add(tile_size);
        }
        y = y.saturating_add(tile_size);
    }

    if order == TileOrder::Spiral {
        sort_spiral(&mut tiles, width, height);
        for (i, tile) in tiles.iter_mut().enumerate() {
            tile.index = i;
        }
    }

    Ok(tiles)
}

/// Sort tiles by distance from image center, closest first.
///
/// The sort is stable, so ties keep their row-major order.
fn sort_spiral(tiles: &mut [Tile], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |t: &Tile| {
        let cx = t.x as f32 + t.width as f32 / 2.0;
        let cy = t.y as f32 + t.height as f32 / 2.0;
        (cx - center_x).powi(2) + (cy - center_y).powi(2)
    };

    tiles.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Check that `tiles` lie inside the image, carry samples, have distinct
/// indices and never overlap.
///
/// Gaps are allowed; uncovered pixels simply stay black.
pub fn validate_tiles(width: u32, height: u32, tiles: &[Tile]) -> Result<()> {
    let mut covered = vec![false; width as usize * height as usize];
    let mut indices = HashSet::with_capacity(tiles.len());

    for tile in tiles {
        if !indices.insert(tile.index) {
            return Err(RenderError::InvalidTiles(format!(
                "tile index {} is used more than once",
                tile.index
            )));
        }
        let in_bounds = tile.width > 0
            && tile.height > 0
            && tile.x.checked_add(tile.width).is_some_and(|right| right <= width)
            && tile.y.checked_add(tile.height).is_some_and(|bottom| bottom <= height);
        if !in_bounds {
            return Err(RenderError::InvalidTiles(format!(
                "tile {} at ({}, {}) size {}x{} is outside the {}x{} image",
                tile.index, tile.x, tile.y, tile.width, tile.height, width, height
            )));
        }
        if tile.samples_per_pixel == 0 {
            return Err(RenderError::InvalidTiles(format!(
                "tile {} has no samples per pixel",
                tile.index
            )));
        }

        for y in tile.y..tile.y + tile.height {
            for x in tile.x..tile.x + tile.width {
                let slot = &mut covered[y as usize * width as usize + x as usize];
                if *slot {
                    return Err(RenderError::InvalidTiles(format!(
                        "tile {} overlaps another tile at pixel ({x}, {y})",
                        tile.index
                    )));
                }
                *slot = true;
            }
        }
    }

    Ok(())
}

/// Everything a worker needs to render a tile, all shared read-only.
pub struct TileContext<'a> {
    pub camera: &'a Camera,
    pub world: &'a dyn Hittable,
    pub settings: TraceSettings,
    pub pixels: &'a PixelBuffer,
    pub control: &'a RenderControl,
    pub progress: &'a RenderProgress,
}

/// Result of rendering a tile.
#[derive(Debug, Clone, Copy)]
pub struct TileReport {
    /// The tile that was rendered
    pub tile: Tile,
    pub stats: TileStats,
    /// False if the tile was abandoned because of cancellation
    pub finished: bool,
}

/// Render a tile row-major into the shared pixel buffer.
///
/// Pause and cancellation are checked before every pixel. A cancelled tile
/// returns immediately and leaves its remaining pixels untouched.
pub fn render_tile(tile: &Tile, ctx: &TileContext<'_>, rng: &mut dyn RngCore) -> TileReport {
    let start = Instant::now();
    let mut stats = TileStats::default();
    let mut finished = true;

    'rows: for local_y in 0..tile.height {
        for local_x in 0..tile.width {
            if !ctx.control.checkpoint() {
                finished = false;
                break 'rows;
            }

            let x = tile.x + local_x;
            let y = tile.y + local_y;
            let color = render_pixel(ctx, x, y, tile.samples_per_pixel, rng, &mut stats);
            ctx.pixels.set(x, y, color);
            stats.pixels_written += 1;
            ctx.progress.record_pixel();
        }
    }

    stats.render_time = start.elapsed();
    TileReport {
        tile: *tile,
        stats,
        finished,
    }
}

/// Average `samples` jittered paths through pixel (x, y) and gamma-encode.
pub fn render_pixel(
    ctx: &TileContext<'_>,
    x: u32,
    y: u32,
    samples: u32,
    rng: &mut dyn RngCore,
    stats: &mut TileStats,
) -> Color {
    let width = ctx.pixels.width() as f32;
    let height = ctx.pixels.height() as f32;
    // Image rows run top to bottom, the image plane's t runs bottom to top
    let row = (ctx.pixels.height() - 1 - y) as f32;

    let mut pixel_color = Color::ZERO;
    for _ in 0..samples {
        let s = (x as f32 + gen_f32(rng)) / width;
        let t = (row + gen_f32(rng)) / height;
        let ray = ctx.camera.get_ray(s, t, rng);
        pixel_color += ray_color(&ray, ctx.world, &ctx.settings, rng, stats);
    }

    encode_pixel(pixel_color / samples as f32)
}

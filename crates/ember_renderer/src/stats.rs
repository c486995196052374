//! Render statistics.
//!
//! Workers count into a plain [`TileStats`] they own; the per-tile values
//! are folded into [`RenderStats`] only after every worker has joined.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::time::Duration;

/// Counters gathered while rendering one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileStats {
    /// Path segments traced, camera rays included
    pub rays_traced: u64,
    /// Ray-primitive tests performed
    pub intersection_tests: u64,
    /// Scatter calls
    pub material_evaluations: u64,
    /// Pixels written to the shared buffer
    pub pixels_written: u64,
    /// Wall time spent inside the tile
    pub render_time: Duration,
}

impl AddAssign for TileStats {
    fn add_assign(&mut self, other: Self) {
        self.rays_traced += other.rays_traced;
        self.intersection_tests += other.intersection_tests;
        self.material_evaluations += other.material_evaluations;
        self.pixels_written += other.pixels_written;
        self.render_time += other.render_time;
    }
}

impl Add for TileStats {
    type Output = TileStats;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Sum for TileStats {
    fn sum<I: Iterator<Item = TileStats>>(iter: I) -> Self {
        iter.fold(TileStats::default(), Add::add)
    }
}

/// Render-wide totals, available once a render has finished.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    pub rays_traced: u64,
    pub intersection_tests: u64,
    pub material_evaluations: u64,
    pub pixels_written: u64,
    /// Tiles that ran to completion
    pub tiles_completed: usize,
    /// Sum of per-tile times across all workers
    pub tile_time: Duration,
    /// Wall time of the whole render
    pub total_time: Duration,
}

impl RenderStats {
    /// Fold per-tile counters into a render-wide total.
    pub fn from_tiles<'a>(
        tiles: impl IntoIterator<Item = &'a TileStats>,
        tiles_completed: usize,
        total_time: Duration,
    ) -> Self {
        let sum: TileStats = tiles.into_iter().copied().sum();
        Self {
            rays_traced: sum.rays_traced,
            intersection_tests: sum.intersection_tests,
            material_evaluations: sum.material_evaluations,
            pixels_written: sum.pixels_written,
            tiles_completed,
            tile_time: sum.render_time,
            total_time,
        }
    }

    pub fn rays_per_second(&self) -> f64 {
        let secs = self.total_time.as_secs_f64();
        if secs > 0.0 {
            self.rays_traced as f64 / secs
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        for line in self.to_string().lines() {
            log::info!("{line}");
        }
    }
}

impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Render Statistics ===")?;
        writeln!(
            f,
            "Total time: {:.2} ms ({:.2} seconds)",
            self.total_time.as_secs_f64() * 1000.0,
            self.total_time.as_secs_f64()
        )?;
        writeln!(f, "Rays traced: {}", self.rays_traced)?;
        writeln!(f, "Intersection tests: {}", self.intersection_tests)?;
        writeln!(f, "Material evaluations: {}", self.material_evaluations)?;
        writeln!(f, "Pixels written: {}", self.pixels_written)?;
        write!(f, "Rays per second: {:.0}", self.rays_per_second())
    }
}

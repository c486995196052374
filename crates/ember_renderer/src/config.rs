//! Render configuration.

use crate::{Color, RenderError, Result};
use serde::{Deserialize, Serialize};

/// Default tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 32;

/// Default application cap on worker threads.
pub const DEFAULT_MAX_THREADS: usize = 8;

/// How path contributions die off with bounce depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthPolicy {
    /// Full contribution until `max_depth`, then black.
    HardCutoff,
    /// Each bounce at depth `d` is also scaled by `factor^d`.
    Falloff { factor: f32 },
}

impl DepthPolicy {
    /// Extra throughput multiplier for a scatter at `depth` (0 = camera ray).
    #[inline]
    pub fn damping(&self, depth: u32) -> f32 {
        match *self {
            DepthPolicy::HardCutoff => 1.0,
            DepthPolicy::Falloff { factor } => factor.powi(depth as i32),
        }
    }
}

/// Order in which tiles are queued for the workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileOrder {
    /// Left to right, top to bottom.
    RowMajor,
    /// Center of the image outward.
    Spiral,
}

/// What a ray that escapes the scene sees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// White at the horizon blending to light blue at the zenith.
    Sky,
    Solid(Color),
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum number of path segments per sample
    pub max_depth: u32,
    pub depth_policy: DepthPolicy,
    /// Tile edge in pixels; edge tiles are clipped to the image
    pub tile_size: u32,
    pub tile_order: TileOrder,
    /// Requested worker threads, 0 = available hardware concurrency
    pub threads: usize,
    /// Application cap on worker threads
    pub max_threads: usize,
    pub background: Background,
    /// Fixed seed for reproducible images, `None` seeds from entropy
    pub seed: Option<u64>,
    /// Lower bound of the hit window, avoids self-intersection
    pub t_min: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            samples_per_pixel: 4,
            max_depth: 8,
            depth_policy: DepthPolicy::HardCutoff,
            tile_size: DEFAULT_TILE_SIZE,
            tile_order: TileOrder::RowMajor,
            threads: 0,
            max_threads: DEFAULT_MAX_THREADS,
            background: Background::Sky,
            seed: None,
            t_min: 0.001,
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    pub fn with_depth_policy(mut self, policy: DepthPolicy) -> Self {
        self.depth_policy = policy;
        self
    }

    pub fn with_tiles(mut self, tile_size: u32, order: TileOrder) -> Self {
        self.tile_size = tile_size;
        self.tile_order = order;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(RenderError::InvalidConfig(msg));

        if self.width == 0 || self.height == 0 {
            return invalid(format!("image size {}x{} is empty", self.width, self.height));
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples_per_pixel must be at least 1".into());
        }
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1".into());
        }
        if self.tile_size == 0 {
            return invalid("tile_size must be at least 1".into());
        }
        if self.max_threads == 0 {
            return invalid("max_threads must be at least 1".into());
        }
        if let DepthPolicy::Falloff { factor } = self.depth_policy {
            if !factor.is_finite() || factor < 0.0 {
                return invalid(format!("falloff factor {factor} must be finite and non-negative"));
            }
        }
        if !self.t_min.is_finite() || self.t_min < 0.0 {
            return invalid(format!("t_min {} must be finite and non-negative", self.t_min));
        }
        Ok(())
    }
}

//! Keyboard commands and their configurable parameters

use meshkit_algorithms::CacheInvalidation;
use serde::{Deserialize, Serialize};

/// Parameters bound to the editor keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Smoothing alpha for keys `1`, `2` and `3`. `L` uses the third.
    pub smooth_alphas: [f32; 3],
    pub use_cotangent: bool,
    /// Grid cells per axis for `S`
    pub grid_resolution: usize,
    /// Octree leaf capacity for `D`
    pub leaf_capacity: usize,
    pub octree_max_depth: usize,
    pub cache_invalidation: CacheInvalidation,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            smooth_alphas: [0.1, 0.5, 1.0],
            use_cotangent: true,
            grid_resolution: 16,
            leaf_capacity: 10,
            octree_max_depth: meshkit_simplification::DEFAULT_MAX_DEPTH,
            cache_invalidation: CacheInvalidation::default(),
        }
    }
}

/// One editor operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Smooth { alpha: f32, use_cotangent: bool },
    DecimateUniform { resolution: usize },
    DecimateAdaptive { leaf_capacity: usize },
    Subdivide,
    Reset,
}

impl Command {
    /// Map a key to its command, case-insensitively. Unbound keys give `None`.
    pub fn from_key(key: char, config: &EditorConfig) -> Option<Self> {
        let smooth = |alpha: f32| Command::Smooth {
            alpha,
            use_cotangent: config.use_cotangent,
        };
        let command = match key.to_ascii_lowercase() {
            '1' => smooth(config.smooth_alphas[0]),
            '2' => smooth(config.smooth_alphas[1]),
            '3' | 'l' => smooth(config.smooth_alphas[2]),
            's' => Command::DecimateUniform {
                resolution: config.grid_resolution,
            },
            'd' => Command::DecimateAdaptive {
                leaf_capacity: config.leaf_capacity,
            },
            'b' => Command::Subdivide,
            'r' => Command::Reset,
            _ => return None,
        };
        Some(command)
    }
}

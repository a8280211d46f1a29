use serde::{Deserialize, Serialize};

use crate::error::{LuxError, Result};
use crate::source::SourceMask;

/// How the light volumes are refreshed over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateMode {
    /// Run the full clear, inject and propagate cycle every frame on a
    /// single buffer. Highest cost, no latency.
    Synchronous,
    /// Spread one cycle over `propagation_steps` frames across a
    /// front/back buffer pair. One propagation step per frame; freshly
    /// injected light becomes visible at the next buffer flip.
    Amortized,
}

impl Default for UpdateMode {
    fn default() -> Self {
        UpdateMode::Amortized
    }
}

/// Configuration builder for the light propagation volumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpvConfig {
    /// Cells per axis, shared by every cascade.
    pub dimension: u32,
    /// World-space half-extent of each cascade cube, strictly increasing.
    /// One cascade is created per entry.
    pub boundaries: Vec<f32>,
    /// Propagation steps per update cycle.
    pub propagation_steps: u32,
    /// Brightness multiplier applied when compositing indirect light.
    pub indirect_intensity: f32,
    pub mode: UpdateMode,
    /// Source kinds the injection stage consumes.
    pub sources: SourceMask,
}

impl Default for LpvConfig {
    fn default() -> Self {
        Self {
            dimension: 32,
            boundaries: vec![50.0, 100.0, 200.0],
            propagation_steps: 14,
            indirect_intensity: 1.0,
            mode: UpdateMode::Amortized,
            sources: SourceMask::RSM,
        }
    }
}

impl LpvConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate settings from a RON file.
    pub fn from_ron_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: Self = ron::from_str(&std::fs::read_to_string(path)?)?;
        config.validate()?;
        log::debug!("loaded LPV config from {}", path.display());
        Ok(config)
    }

    /// Set the per-axis cell count.
    pub fn with_dimension(mut self, dimension: u32) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the cascade half-extents, one cascade per entry.
    pub fn with_boundaries(mut self, boundaries: Vec<f32>) -> Self {
        self.boundaries = boundaries;
        self
    }

    /// Set the number of propagation steps per cycle.
    pub fn with_propagation_steps(mut self, steps: u32) -> Self {
        self.propagation_steps = steps;
        self
    }

    /// Set the indirect light intensity multiplier.
    pub fn with_indirect_intensity(mut self, intensity: f32) -> Self {
        self.indirect_intensity = intensity.max(0.0);
        self
    }

    /// Set the temporal update mode.
    pub fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the enabled source kinds.
    pub fn with_sources(mut self, sources: SourceMask) -> Self {
        self.sources = sources;
        self
    }

    pub fn cascade_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Reject invalid settings up front. Per-frame code assumes a
    /// validated configuration and has no error paths of its own.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(LuxError::InvalidConfiguration(
                "grid dimension must be non-zero".into(),
            ));
        }
        if self.propagation_steps == 0 {
            return Err(LuxError::InvalidConfiguration(
                "at least one propagation step is required".into(),
            ));
        }
        if self.boundaries.is_empty() {
            return Err(LuxError::InvalidConfiguration(
                "at least one cascade boundary is required".into(),
            ));
        }
        let mut prev = 0.0f32;
        for (i, &b) in self.boundaries.iter().enumerate() {
            if !b.is_finite() || b <= prev {
                return Err(LuxError::InvalidConfiguration(format!(
                    "cascade boundaries must be positive and strictly increasing, got {b} at index {i}"
                )));
            }
            prev = b;
        }
        if !self.indirect_intensity.is_finite() || self.indirect_intensity < 0.0 {
            return Err(LuxError::InvalidConfiguration(format!(
                "indirect intensity must be finite and non-negative, got {}",
                self.indirect_intensity
            )));
        }
        Ok(())
    }
}

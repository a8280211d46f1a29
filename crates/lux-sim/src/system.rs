//! The assembled light propagation volume system.

use std::sync::Arc;

use glam::Vec3;
use log::info;
use lux_core::{LightVolume, LpvConfig, Result, VplProvider, VplSnapshot};
use parking_lot::RwLock;

use crate::cascade::BufferSide;
use crate::compositor::Compositor;
use crate::manager::CascadeSet;
use crate::scheduler::FrameScheduler;

/// Sources stay owned by the host so it can keep writing texels between
/// frames; the system holds a shared read handle.
pub type SharedSource = Arc<RwLock<dyn VplProvider + Send + Sync>>;

pub struct LpvSystem {
    config: LpvConfig,
    cascades: CascadeSet,
    scheduler: FrameScheduler,
    compositor: Compositor,
    sources: Vec<SharedSource>,
    frame: u64,
}

impl LpvSystem {
    pub fn new(config: LpvConfig) -> Result<Self> {
        config.validate()?;
        info!(
            "lux: {} cascades of {}^3 cells, {} steps per cycle, {:?} updates",
            config.cascade_count(),
            config.dimension,
            config.propagation_steps,
            config.mode
        );
        Ok(Self {
            cascades: CascadeSet::new(&config),
            scheduler: FrameScheduler::new(config.mode, config.propagation_steps),
            compositor: Compositor::new(config.indirect_intensity),
            sources: Vec::new(),
            frame: 0,
            config,
        })
    }

    pub fn config(&self) -> &LpvConfig {
        &self.config
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Register a virtual point light source. Only sources whose kind is
    /// enabled in the configuration are consumed at injection time.
    pub fn register_source<S>(&mut self, source: Arc<RwLock<S>>)
    where
        S: VplProvider + Send + Sync + 'static,
    {
        self.sources.push(source);
    }

    /// Advance the pipeline by one frame, anchored on the viewer position.
    /// Runs the stages the scheduler plans for this tick; all per-frame
    /// work is infallible once the system is built.
    pub fn advance_frame(&mut self, viewer: Vec3) {
        self.frame += 1;
        let plan = self.scheduler.tick();
        if plan.begin_cycle {
            let guards: Vec<_> = self.sources.iter().map(|s| s.read()).collect();
            let snapshots: Vec<VplSnapshot> = guards
                .iter()
                .filter(|g| self.config.sources.contains(g.kind().mask()))
                .map(|g| g.snapshot())
                .filter(|s| !s.is_empty())
                .collect();
            self.cascades.begin_cycle(plan.target, viewer, &snapshots);
        }
        for _ in 0..plan.steps {
            self.cascades.propagate_once(plan.target);
        }
    }

    /// Side currently safe to sample or mirror to the GPU.
    pub fn live_side(&self) -> BufferSide {
        self.scheduler.live()
    }

    pub fn live_volume(&self, cascade: usize) -> &LightVolume {
        self.cascades.cascade(cascade).volume(self.live_side())
    }

    pub fn cascades(&self) -> &CascadeSet {
        &self.cascades
    }

    /// Indirect RGB irradiance at a shaded point.
    pub fn indirect_light(&self, position: Vec3, normal: Vec3) -> Vec3 {
        self.compositor
            .indirect_light(&self.cascades, self.live_side(), position, normal)
    }

    /// Direct lighting plus the indirect contribution.
    pub fn apply(&self, direct: Vec3, position: Vec3, normal: Vec3) -> Vec3 {
        self.compositor
            .apply(direct, &self.cascades, self.live_side(), position, normal)
    }
}

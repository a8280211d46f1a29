//! Lockstep dispatch across the cascade hierarchy.
//!
//! Every stage runs on all cascades together. A cycle clears and recenters
//! the write-side volumes on the viewer, runs the injection pass, then the
//! configured number of propagation steps follow one per call or all at
//! once depending on the scheduler.

use glam::Vec3;
use log::{debug, trace};
use lux_core::{LpvConfig, UpdateMode, VplSnapshot};

use crate::cascade::{BufferSide, Cascade};
use crate::propagate::Propagator;

pub struct CascadeSet {
    cascades: Vec<Cascade>,
    boundaries: Vec<f32>,
    propagator: Propagator,
}

impl CascadeSet {
    /// Build one cascade per configured boundary. Assumes a validated
    /// configuration.
    pub fn new(config: &LpvConfig) -> Self {
        let double_buffered = config.mode == UpdateMode::Amortized;
        let cascades = config
            .boundaries
            .iter()
            .map(|&boundary| Cascade::new(config.dimension, boundary, double_buffered))
            .collect();
        Self {
            cascades,
            boundaries: config.boundaries.clone(),
            propagator: Propagator::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cascades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cascades.is_empty()
    }

    pub fn cascade(&self, index: usize) -> &Cascade {
        &self.cascades[index]
    }

    pub fn cascades(&self) -> &[Cascade] {
        &self.cascades
    }

    /// Cascade half-extents, innermost first.
    pub fn boundaries(&self) -> &[f32] {
        &self.boundaries
    }

    /// Start a cycle on the addressed side: clear and recenter every
    /// cascade volume, then run the injection pass over every cascade.
    pub fn begin_cycle(&mut self, side: BufferSide, viewer: Vec3, snapshots: &[VplSnapshot]) {
        let mut injected = 0;
        for cascade in &mut self.cascades {
            cascade.clear(side, viewer);
            injected += cascade.inject(side, snapshots);
        }
        debug!(
            "cycle start: side {side:?}, viewer {viewer}, {injected} texels into {} cascades",
            self.cascades.len()
        );
    }

    /// One propagation step on every cascade.
    pub fn propagate_once(&mut self, side: BufferSide) {
        let propagator = &self.propagator;
        for cascade in &mut self.cascades {
            cascade.propagate_once(side, propagator);
        }
        trace!("propagation step on side {side:?}");
    }

    /// Full cycle: clear, inject and run every propagation step at once.
    pub fn run_cycle(
        &mut self,
        side: BufferSide,
        viewer: Vec3,
        snapshots: &[VplSnapshot],
        steps: u32,
    ) {
        self.begin_cycle(side, viewer, snapshots);
        for _ in 0..steps {
            self.propagate_once(side);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;
    use lux_core::{BufferedVpl, SourceKind, VplProvider};

    fn test_set() -> CascadeSet {
        CascadeSet::new(
            &LpvConfig::new()
                .with_dimension(8)
                .with_boundaries(vec![10.0, 20.0, 40.0]),
        )
    }

    fn vpl_at(pos: Vec3) -> BufferedVpl {
        let mut vpl = BufferedVpl::new(SourceKind::Rsm, UVec2::new(1, 1));
        vpl.write_texel(0, 0, Vec3::ONE, pos, Vec3::Y);
        vpl
    }

    #[test]
    fn one_cascade_per_boundary_in_order() {
        let set = test_set();
        assert_eq!(set.len(), 3);
        assert_eq!(set.boundaries(), &[10.0, 20.0, 40.0]);
        for (cascade, boundary) in set.cascades().iter().zip([10.0, 20.0, 40.0]) {
            assert_eq!(cascade.boundary(), boundary);
        }
    }

    #[test]
    fn a_texel_inside_all_boundaries_lands_in_every_cascade() {
        let mut set = test_set();
        let vpl = vpl_at(Vec3::new(3.0, 0.0, 0.0));
        set.begin_cycle(BufferSide::Front, Vec3::ZERO, &[vpl.snapshot()]);
        for cascade in set.cascades() {
            assert_eq!(cascade.volume(BufferSide::Front).occupied_cells(), 1);
        }
    }

    #[test]
    fn a_distant_texel_only_reaches_the_outer_cascades() {
        let mut set = test_set();
        let vpl = vpl_at(Vec3::new(15.0, 0.0, 0.0));
        set.begin_cycle(BufferSide::Front, Vec3::ZERO, &[vpl.snapshot()]);
        let counts: Vec<usize> = set
            .cascades()
            .iter()
            .map(|c| c.volume(BufferSide::Front).occupied_cells())
            .collect();
        assert_eq!(counts, vec![0, 1, 1]);
    }

    #[test]
    fn cascades_march_in_lockstep() {
        let mut set = test_set();
        let vpl = vpl_at(Vec3::ZERO);
        set.run_cycle(BufferSide::Front, Vec3::ZERO, &[vpl.snapshot()], 4);
        for cascade in set.cascades() {
            let counters = cascade.counters(BufferSide::Front);
            assert_eq!(counters.cleanups, 1);
            assert_eq!(counters.injections, 1);
            assert_eq!(counters.propagation_steps, 4);
        }
    }
}

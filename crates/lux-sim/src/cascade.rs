//! One cascade: a light volume pair plus propagation scratch.
//!
//! In amortized mode a cascade keeps two volumes. One side is live for
//! sampling while the other is cleared, injected and stepped; the scheduler
//! flips the roles at cycle boundaries. In synchronous mode only the front
//! volume exists and every side designation resolves to it.

use glam::Vec3;
use lux_core::{LightVolume, VplSnapshot};

use crate::inject::inject_snapshot;
use crate::propagate::{CellDelta, Propagator};

/// Which volume of a cascade pair is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSide {
    Front,
    Back,
}

impl BufferSide {
    pub fn other(self) -> BufferSide {
        match self {
            BufferSide::Front => BufferSide::Back,
            BufferSide::Back => BufferSide::Front,
        }
    }
}

/// Stage dispatch counts per volume, used to observe the update cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchCounters {
    pub cleanups: u64,
    pub injections: u64,
    pub propagation_steps: u64,
}

pub struct Cascade {
    front: LightVolume,
    back: Option<LightVolume>,
    scratch: Vec<CellDelta>,
    counters: [DispatchCounters; 2],
}

impl Cascade {
    pub fn new(dimension: u32, boundary: f32, double_buffered: bool) -> Self {
        let front = LightVolume::new(dimension, boundary);
        let back = double_buffered.then(|| front.clone());
        let scratch = vec![CellDelta::ZERO; front.cells().len()];
        Self {
            front,
            back,
            scratch,
            counters: [DispatchCounters::default(); 2],
        }
    }

    pub fn boundary(&self) -> f32 {
        self.front.boundary()
    }

    fn slot(&self, side: BufferSide) -> usize {
        match side {
            BufferSide::Front => 0,
            BufferSide::Back if self.back.is_some() => 1,
            BufferSide::Back => 0,
        }
    }

    pub fn volume(&self, side: BufferSide) -> &LightVolume {
        match side {
            BufferSide::Front => &self.front,
            BufferSide::Back => self.back.as_ref().unwrap_or(&self.front),
        }
    }

    pub fn volume_mut(&mut self, side: BufferSide) -> &mut LightVolume {
        match side {
            BufferSide::Front => &mut self.front,
            BufferSide::Back => self.back.as_mut().unwrap_or(&mut self.front),
        }
    }

    pub fn counters(&self, side: BufferSide) -> DispatchCounters {
        self.counters[self.slot(side)]
    }

    /// Zero every cell of the addressed volume and recenter it for the
    /// cycle that is about to fill it.
    pub fn clear(&mut self, side: BufferSide, center: Vec3) {
        let slot = self.slot(side);
        let volume = self.volume_mut(side);
        volume.clear();
        volume.set_center(center);
        self.counters[slot].cleanups += 1;
    }

    /// Run the injection pass over the addressed volume. Counts as one
    /// dispatch regardless of how many snapshots contribute.
    pub fn inject(&mut self, side: BufferSide, snapshots: &[VplSnapshot]) -> usize {
        let slot = self.slot(side);
        let volume = self.volume_mut(side);
        let mut injected = 0;
        for snapshot in snapshots {
            injected += inject_snapshot(volume, snapshot);
        }
        self.counters[slot].injections += 1;
        injected
    }

    /// Run one propagation step on the addressed volume.
    pub fn propagate_once(&mut self, side: BufferSide, propagator: &Propagator) {
        let slot = self.slot(side);
        let volume = match side {
            BufferSide::Front => &mut self.front,
            BufferSide::Back => self.back.as_mut().unwrap_or(&mut self.front),
        };
        propagator.step(volume, &mut self.scratch);
        self.counters[slot].propagation_steps += 1;
    }
}

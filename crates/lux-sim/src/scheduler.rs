//! Temporal update scheduling.
//!
//! Synchronous mode runs an entire cycle every frame on a single volume.
//! Amortized mode spends one propagation step per frame: at the start of
//! each cycle the live side flips, the newly hidden side is cleared and
//! reinjected, and the following frames step it until the next flip makes
//! it visible. The schedule is purely time driven, there is no convergence
//! check.

use lux_core::UpdateMode;

use crate::cascade::BufferSide;

/// What the pipeline must run this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPlan {
    /// Side the stages write into.
    pub target: BufferSide,
    /// Clear and inject before stepping.
    pub begin_cycle: bool,
    /// Propagation steps to run this frame.
    pub steps: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameScheduler {
    mode: UpdateMode,
    steps_per_cycle: u32,
    step: u32,
    live: BufferSide,
}

impl FrameScheduler {
    /// `steps_per_cycle` comes from a validated configuration and is
    /// non-zero.
    pub fn new(mode: UpdateMode, steps_per_cycle: u32) -> Self {
        Self {
            mode,
            steps_per_cycle,
            step: 0,
            live: BufferSide::Front,
        }
    }

    pub fn mode(&self) -> UpdateMode {
        self.mode
    }

    /// Side the compositor and any GPU mirror should read this frame.
    pub fn live(&self) -> BufferSide {
        match self.mode {
            UpdateMode::Synchronous => BufferSide::Front,
            UpdateMode::Amortized => self.live,
        }
    }

    /// Advance one frame and return the work it requires.
    pub fn tick(&mut self) -> TickPlan {
        match self.mode {
            UpdateMode::Synchronous => TickPlan {
                target: BufferSide::Front,
                begin_cycle: true,
                steps: self.steps_per_cycle,
            },
            UpdateMode::Amortized => {
                let begin_cycle = self.step == 0;
                if begin_cycle {
                    self.live = self.live.other();
                }
                self.step = (self.step + 1) % self.steps_per_cycle;
                TickPlan {
                    target: self.live.other(),
                    begin_cycle,
                    steps: 1,
                }
            }
        }
    }
}

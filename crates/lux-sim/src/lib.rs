//! CPU simulation of light propagation volumes: cleanup, virtual point
//! light injection, iterative SH flux propagation across a cascade
//! hierarchy, temporal scheduling and the indirect-light compositor.
//!
//! The pipeline is driven by [`LpvSystem::advance_frame`] once per host
//! frame. Stages run strictly in order within a frame; inside the
//! propagation stage cells are processed in parallel.

pub use cascade::{BufferSide, Cascade, DispatchCounters};
pub use compositor::{select_cascade, Compositor};
pub use inject::inject_snapshot;
pub use manager::CascadeSet;
pub use propagate::{CellDelta, Propagator};
pub use scheduler::{FrameScheduler, TickPlan};
pub use system::{LpvSystem, SharedSource};

pub mod cascade;
pub mod compositor;
pub mod inject;
pub mod manager;
pub mod propagate;
pub mod scheduler;
pub mod system;

//! Core types for the lux light propagation volume system: first-order SH
//! radiance cells, the volumetric lattices that store them, the virtual
//! point light source contracts, and configuration.

pub use cell::Cell;
pub use config::{LpvConfig, UpdateMode};
pub use error::{LuxError, Result};
pub use source::{BufferedVpl, RsmCamera, SourceKind, SourceMask, VplProvider, VplSnapshot};
pub use volume::LightVolume;

pub mod cell;
pub mod config;
pub mod error;
pub mod sh;
pub mod source;
pub mod volume;

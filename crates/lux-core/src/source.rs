//! Virtual point light sources consumed by the injection stage.
//!
//! Hosts register providers explicitly at setup. Each provider exposes a
//! snapshot of three same-length texel buffers (reflected flux, world
//! position, world normal) captured from a reflective shadow map or a
//! screen-space geometry pass.

use bitflags::bitflags;
use glam::{Mat4, UVec2, Vec3};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which registered source kinds the injection stage consumes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SourceMask: u32 {
        const RSM = 1 << 0;
        const SCREEN_SPACE = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Rsm,
    ScreenSpace,
}

impl SourceKind {
    pub fn mask(self) -> SourceMask {
        match self {
            SourceKind::Rsm => SourceMask::RSM,
            SourceKind::ScreenSpace => SourceMask::SCREEN_SPACE,
        }
    }
}

/// Borrowed view of one frame of virtual point lights.
#[derive(Debug, Clone, Copy)]
pub struct VplSnapshot<'a> {
    pub resolution: UVec2,
    pub flux: &'a [Vec3],
    pub position: &'a [Vec3],
    pub normal: &'a [Vec3],
}

impl VplSnapshot<'_> {
    /// An unrendered or zero-sized source contributes nothing and is
    /// skipped without raising an error.
    pub fn is_empty(&self) -> bool {
        self.resolution.x == 0 || self.resolution.y == 0 || self.flux.is_empty()
    }

    pub fn texel_count(&self) -> usize {
        self.flux.len().min(self.position.len()).min(self.normal.len())
    }
}

/// Hands the injection stage one frame of virtual point lights.
pub trait VplProvider {
    fn kind(&self) -> SourceKind;
    fn snapshot(&self) -> VplSnapshot<'_>;
}

/// Owned VPL buffers for hosts that fill texel data directly, e.g. a
/// screen-space flux/position/normal trio blitted from the G-buffer.
pub struct BufferedVpl {
    kind: SourceKind,
    resolution: UVec2,
    flux: Vec<Vec3>,
    position: Vec<Vec3>,
    normal: Vec<Vec3>,
}

impl BufferedVpl {
    pub fn new(kind: SourceKind, resolution: UVec2) -> Self {
        let len = (resolution.x * resolution.y) as usize;
        Self {
            kind,
            resolution,
            flux: vec![Vec3::ZERO; len],
            position: vec![Vec3::ZERO; len],
            normal: vec![Vec3::ZERO; len],
        }
    }

    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    /// Reallocate for a new resolution. Previous texels are discarded.
    pub fn resize(&mut self, resolution: UVec2) {
        let len = (resolution.x * resolution.y) as usize;
        self.resolution = resolution;
        self.flux = vec![Vec3::ZERO; len];
        self.position = vec![Vec3::ZERO; len];
        self.normal = vec![Vec3::ZERO; len];
    }

    /// Zero the flux plane so the source goes dark without resizing.
    pub fn clear(&mut self) {
        self.flux.fill(Vec3::ZERO);
    }

    pub fn write_texel(&mut self, x: u32, y: u32, flux: Vec3, position: Vec3, normal: Vec3) {
        if x >= self.resolution.x || y >= self.resolution.y {
            return;
        }
        let idx = (x + y * self.resolution.x) as usize;
        self.flux[idx] = flux;
        self.position[idx] = position;
        self.normal[idx] = normal;
    }
}

impl VplProvider for BufferedVpl {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn snapshot(&self) -> VplSnapshot<'_> {
        VplSnapshot {
            resolution: self.resolution,
            flux: &self.flux,
            position: &self.position,
            normal: &self.normal,
        }
    }
}

/// Reflective shadow map camera. Rides along with the viewer at a fixed
/// offset so the map keeps covering the region around the player while
/// looking down the light direction.
pub struct RsmCamera {
    light_direction: Vec3,
    anchor_offset: Vec3,
    position: Vec3,
    buffers: BufferedVpl,
}

impl RsmCamera {
    pub fn new(resolution: u32, light_direction: Vec3, anchor_offset: Vec3) -> Self {
        Self {
            light_direction: light_direction.normalize_or_zero(),
            anchor_offset,
            position: anchor_offset,
            buffers: BufferedVpl::new(SourceKind::Rsm, UVec2::splat(resolution)),
        }
    }

    /// Re-anchor on the viewer, keeping the configured offset.
    pub fn follow(&mut self, viewer: Vec3) {
        self.position = viewer + self.anchor_offset;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn light_direction(&self) -> Vec3 {
        self.light_direction
    }

    /// View transform the host renders the shadow map with.
    pub fn light_view(&self) -> Mat4 {
        let up = if self.light_direction.y.abs() > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_to_rh(self.position, self.light_direction, up)
    }

    pub fn buffers(&self) -> &BufferedVpl {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut BufferedVpl {
        &mut self.buffers
    }
}

impl VplProvider for RsmCamera {
    fn kind(&self) -> SourceKind {
        SourceKind::Rsm
    }

    fn snapshot(&self) -> VplSnapshot<'_> {
        self.buffers.snapshot()
    }
}

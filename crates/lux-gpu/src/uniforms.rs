use bytemuck::{Pod, Zeroable};
use lux_core::LightVolume;

/// Texture slots the sampling shader declares. Configurations with more
/// cascades are rejected when the GPU mirror is built.
pub const MAX_CASCADES: usize = 4;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct GpuVolume {
    pub center_and_boundary: [f32; 4], // xyz=center, w=half extent
}

impl Default for GpuVolume {
    fn default() -> Self {
        Self { center_and_boundary: [0.0; 4] }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct LpvUniforms {
    pub params: [f32; 4], // x=cascade count, y=grid dimension, z=indirect intensity, w=unused
    pub volumes: [GpuVolume; MAX_CASCADES],
}

impl LpvUniforms {
    /// Snapshot the live volumes for the sampling shader. `volumes` is
    /// ordered innermost first and capped at [`MAX_CASCADES`].
    pub fn from_volumes(volumes: &[&LightVolume], intensity: f32) -> Self {
        let mut packed = [GpuVolume::default(); MAX_CASCADES];
        for (slot, volume) in packed.iter_mut().zip(volumes.iter()) {
            let c = volume.center();
            slot.center_and_boundary = [c.x, c.y, c.z, volume.boundary()];
        }
        let dimension = volumes.first().map(|v| v.dimension()).unwrap_or(0);
        Self {
            params: [
                volumes.len().min(MAX_CASCADES) as f32,
                dimension as f32,
                intensity,
                0.0,
            ],
            volumes: packed,
        }
    }
}

impl Default for LpvUniforms {
    fn default() -> Self {
        Self {
            params: [0.0; 4],
            volumes: [GpuVolume::default(); MAX_CASCADES],
        }
    }
}

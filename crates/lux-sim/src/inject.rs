//! Injection of virtual point lights into a volume.

use glam::Vec3;
use lux_core::{LightVolume, VplSnapshot};

/// Scatter one snapshot into a volume. Every texel whose world position
/// falls inside the cube deposits a clamped cosine lobe around its normal
/// into the enclosing cell; texels outside the cube and texels carrying no
/// flux are dropped. Returns the number of texels injected.
///
/// Accumulation is plain addition per cell, so the result is independent of
/// texel and snapshot order.
pub fn inject_snapshot(volume: &mut LightVolume, snapshot: &VplSnapshot) -> usize {
    if snapshot.is_empty() {
        return 0;
    }
    let mut injected = 0;
    for i in 0..snapshot.texel_count() {
        let flux = snapshot.flux[i];
        if flux == Vec3::ZERO {
            continue;
        }
        let Some(cell) = volume.world_to_cell(snapshot.position[i]) else {
            continue;
        };
        volume.cell_mut(cell).add_flux(flux, snapshot.normal[i]);
        injected += 1;
    }
    injected
}

//! Indirect light lookup for shading.

use glam::Vec3;

use crate::cascade::BufferSide;
use crate::manager::CascadeSet;

/// Innermost cascade whose half-extent covers the distance. Past the last
/// boundary the outermost cascade is reused, so far samples read coarse
/// data instead of none.
pub fn select_cascade(boundaries: &[f32], distance: f32) -> usize {
    boundaries
        .iter()
        .position(|&b| distance <= b)
        .unwrap_or(boundaries.len().saturating_sub(1))
}

/// Samples the live volumes and folds indirect light into shading.
#[derive(Debug, Clone, Copy)]
pub struct Compositor {
    pub intensity: f32,
}

impl Compositor {
    pub fn new(intensity: f32) -> Self {
        Self { intensity }
    }

    /// Indirect RGB irradiance arriving at a surface point. The cascade is
    /// chosen by Euclidean distance from the live volumes' anchor, then its
    /// live volume is sampled trilinearly and decoded toward the normal.
    pub fn indirect_light(
        &self,
        set: &CascadeSet,
        live: BufferSide,
        position: Vec3,
        normal: Vec3,
    ) -> Vec3 {
        let anchor = set.cascade(0).volume(live).center();
        let index = select_cascade(set.boundaries(), position.distance(anchor));
        set.cascade(index)
            .volume(live)
            .sample_irradiance(position, normal)
            * self.intensity
    }

    /// Direct lighting plus the indirect contribution.
    pub fn apply(
        &self,
        direct: Vec3,
        set: &CascadeSet,
        live: BufferSide,
        position: Vec3,
        normal: Vec3,
    ) -> Vec3 {
        direct + self.indirect_light(set, live, position, normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;
    use lux_core::{BufferedVpl, LpvConfig, SourceKind, VplProvider};

    #[test]
    fn selection_is_monotonic_over_the_default_boundaries() {
        let boundaries = [50.0, 100.0, 200.0];
        let picks: Vec<usize> = [10.0, 75.0, 150.0, 500.0]
            .iter()
            .map(|&d| select_cascade(&boundaries, d))
            .collect();
        assert_eq!(picks, vec![0, 1, 2, 2]);
    }

    #[test]
    fn selection_boundary_is_inclusive() {
        let boundaries = [50.0, 100.0];
        assert_eq!(select_cascade(&boundaries, 50.0), 0);
        assert_eq!(select_cascade(&boundaries, 50.1), 1);
        assert_eq!(select_cascade(&boundaries, 0.0), 0);
    }

    #[test]
    fn indirect_light_scales_with_intensity_and_clamps_below_zero() {
        let config = LpvConfig::new()
            .with_dimension(8)
            .with_boundaries(vec![10.0]);
        let mut set = CascadeSet::new(&config);

        // Inject at an exact cell center so the trilinear lookup reads one
        // cell with full weight.
        let spot = set
            .cascade(0)
            .volume(BufferSide::Front)
            .cell_center(glam::UVec3::splat(4));
        let mut vpl = BufferedVpl::new(SourceKind::Rsm, UVec2::new(1, 1));
        vpl.write_texel(0, 0, Vec3::new(1.0, 0.0, 0.0), spot, Vec3::Y);
        set.begin_cycle(BufferSide::Front, Vec3::ZERO, &[vpl.snapshot()]);

        let toward = Compositor::new(2.0).indirect_light(&set, BufferSide::Front, spot, Vec3::Y);
        assert!((toward.x - 2.0 * 0.75).abs() < 1e-3);
        assert_eq!(toward.y, 0.0);

        let away = Compositor::new(2.0).indirect_light(&set, BufferSide::Front, spot, Vec3::NEG_Y);
        assert_eq!(away, Vec3::ZERO);
    }

    #[test]
    fn distance_is_measured_from_the_live_anchor() {
        let config = LpvConfig::new()
            .with_dimension(4)
            .with_boundaries(vec![10.0, 100.0]);
        let mut set = CascadeSet::new(&config);
        let anchor = Vec3::new(500.0, 0.0, 0.0);
        set.begin_cycle(BufferSide::Front, anchor, &[]);

        // 20 units from the anchor sits past the inner boundary.
        let here = anchor + Vec3::new(20.0, 0.0, 0.0);
        assert_eq!(
            select_cascade(set.boundaries(), here.distance(anchor)),
            1
        );
    }

    #[test]
    fn apply_adds_on_top_of_direct_light() {
        let config = LpvConfig::new().with_dimension(4).with_boundaries(vec![10.0]);
        let mut set = CascadeSet::new(&config);
        set.begin_cycle(BufferSide::Front, Vec3::ZERO, &[]);

        let direct = Vec3::new(0.3, 0.2, 0.1);
        let lit = Compositor::new(1.0).apply(direct, &set, BufferSide::Front, Vec3::ZERO, Vec3::Y);
        assert_eq!(lit, direct);
    }
}

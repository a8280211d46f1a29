//! A cubic lattice of radiance cells covering one cascade region.
//!
//! Storage is a flat `Vec<Cell>` in `x + y*d + z*d*d` order. The volume is
//! recentered on the viewer at the start of each update cycle and keeps that
//! center for its lifetime, so a buffer that is displayed while its partner
//! is rewritten still samples in its own frame of reference.

use glam::{UVec3, Vec3};

use crate::cell::Cell;

#[derive(Debug, Clone)]
pub struct LightVolume {
    dimension: u32,
    boundary: f32,
    center: Vec3,
    cells: Vec<Cell>,
}

impl LightVolume {
    pub fn new(dimension: u32, boundary: f32) -> Self {
        let len = (dimension as usize).pow(3);
        Self {
            dimension,
            boundary,
            center: Vec3::ZERO,
            cells: vec![Cell::ZERO; len],
        }
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Half-extent of the covered cube in world units.
    pub fn boundary(&self) -> f32 {
        self.boundary
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// World-space edge length of one cell.
    pub fn cell_size(&self) -> f32 {
        self.boundary * 2.0 / self.dimension as f32
    }

    /// Reset every cell to the additive identity.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::ZERO);
    }

    #[inline]
    pub fn cell_index(&self, c: UVec3) -> usize {
        let d = self.dimension as usize;
        c.x as usize + c.y as usize * d + c.z as usize * d * d
    }

    #[inline]
    pub fn cell_coords(&self, index: usize) -> UVec3 {
        let d = self.dimension as usize;
        UVec3::new(
            (index % d) as u32,
            (index / d % d) as u32,
            (index / (d * d)) as u32,
        )
    }

    /// Cell enclosing a world position, or `None` outside the cube.
    /// Texels past the boundary are dropped, never wrapped or clamped.
    pub fn world_to_cell(&self, world: Vec3) -> Option<UVec3> {
        let local = (world - self.center + Vec3::splat(self.boundary)) / self.cell_size();
        if local.min_element() < 0.0 {
            return None;
        }
        let c = local.floor().as_uvec3();
        if c.max_element() >= self.dimension {
            return None;
        }
        Some(c)
    }

    /// World-space center of a cell.
    pub fn cell_center(&self, c: UVec3) -> Vec3 {
        self.center - Vec3::splat(self.boundary)
            + (c.as_vec3() + Vec3::splat(0.5)) * self.cell_size()
    }

    pub fn cell(&self, c: UVec3) -> &Cell {
        &self.cells[self.cell_index(c)]
    }

    pub fn cell_mut(&mut self, c: UVec3) -> &mut Cell {
        let idx = self.cell_index(c);
        &mut self.cells[idx]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Trilinear blend of the eight cells around a world position, clamped
    /// at the volume edges.
    pub fn sample(&self, world: Vec3) -> Cell {
        let max = (self.dimension - 1) as f32;
        let gp = (world - self.center + Vec3::splat(self.boundary)) / self.cell_size()
            - Vec3::splat(0.5);
        let gp = gp.clamp(Vec3::ZERO, Vec3::splat(max));
        let base = gp.floor();
        let t = gp - base;
        let b = base.as_uvec3();
        let hi = (b + UVec3::ONE).min(UVec3::splat(self.dimension - 1));

        let corner = |x, y, z| self.cell(UVec3::new(x, y, z));
        let x00 = Cell::lerp(corner(b.x, b.y, b.z), corner(hi.x, b.y, b.z), t.x);
        let x10 = Cell::lerp(corner(b.x, hi.y, b.z), corner(hi.x, hi.y, b.z), t.x);
        let x01 = Cell::lerp(corner(b.x, b.y, hi.z), corner(hi.x, b.y, hi.z), t.x);
        let x11 = Cell::lerp(corner(b.x, hi.y, hi.z), corner(hi.x, hi.y, hi.z), t.x);
        let y0 = Cell::lerp(&x00, &x10, t.y);
        let y1 = Cell::lerp(&x01, &x11, t.y);
        Cell::lerp(&y0, &y1, t.z)
    }

    /// RGB radiance toward `normal` at a world position.
    pub fn sample_irradiance(&self, world: Vec3, normal: Vec3) -> Vec3 {
        self.sample(world).irradiance(normal)
    }

    /// Sum of the DC coefficient per channel over the whole lattice, the
    /// energy measure conserved by interior propagation transfers.
    pub fn total_flux(&self) -> Vec3 {
        self.cells.iter().fold(Vec3::ZERO, |acc, c| {
            acc + Vec3::new(c.red.x, c.green.x, c.blue.x)
        })
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.occupied).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_volume() -> LightVolume {
        LightVolume::new(4, 10.0)
    }

    #[test]
    fn world_to_cell_maps_center_and_corners() {
        let vol = test_volume();
        assert_eq!(vol.world_to_cell(Vec3::ZERO), Some(UVec3::new(2, 2, 2)));
        assert_eq!(
            vol.world_to_cell(Vec3::splat(-10.0)),
            Some(UVec3::new(0, 0, 0))
        );
        // The max corner is exclusive.
        assert_eq!(vol.world_to_cell(Vec3::splat(10.0)), None);
        assert_eq!(vol.world_to_cell(Vec3::new(10.1, 0.0, 0.0)), None);
        assert_eq!(vol.world_to_cell(Vec3::new(0.0, -11.0, 0.0)), None);
    }

    #[test]
    fn world_to_cell_follows_the_center() {
        let mut vol = test_volume();
        vol.set_center(Vec3::new(100.0, 0.0, 0.0));
        assert_eq!(vol.world_to_cell(Vec3::ZERO), None);
        assert_eq!(
            vol.world_to_cell(Vec3::new(100.0, 0.0, 0.0)),
            Some(UVec3::new(2, 2, 2))
        );
    }

    #[test]
    fn cell_center_round_trips() {
        let vol = test_volume();
        for c in [UVec3::ZERO, UVec3::new(3, 1, 2), UVec3::splat(3)] {
            assert_eq!(vol.world_to_cell(vol.cell_center(c)), Some(c));
        }
        assert_eq!(vol.cell_center(UVec3::ZERO), Vec3::splat(-7.5));
    }

    #[test]
    fn flat_index_round_trips() {
        let vol = test_volume();
        for idx in 0..64 {
            assert_eq!(vol.cell_index(vol.cell_coords(idx)), idx);
        }
    }

    #[test]
    fn sample_at_cell_center_returns_that_cell() {
        let mut vol = test_volume();
        let c = UVec3::new(1, 2, 1);
        vol.cell_mut(c).add_flux(Vec3::new(1.0, 0.5, 0.25), Vec3::Y);
        let sampled = vol.sample(vol.cell_center(c));
        assert!((sampled.red - vol.cell(c).red).abs().max_element() < 1e-5);
        assert!((sampled.luminance - vol.cell(c).luminance).abs() < 1e-5);
    }

    #[test]
    fn sample_midway_between_cells_blends_half() {
        let mut vol = test_volume();
        let a = UVec3::new(1, 1, 1);
        vol.cell_mut(a).add_flux(Vec3::ONE, Vec3::Y);
        let mid = (vol.cell_center(a) + vol.cell_center(UVec3::new(2, 1, 1))) * 0.5;
        let sampled = vol.sample(mid);
        assert!((sampled.red - vol.cell(a).red * 0.5).abs().max_element() < 1e-5);
    }

    #[test]
    fn clear_resets_every_cell() {
        let mut vol = test_volume();
        for idx in 0..vol.cells().len() {
            let c = vol.cell_coords(idx);
            vol.cell_mut(c).add_flux(Vec3::ONE, Vec3::X);
        }
        vol.clear();
        assert!(vol.cells().iter().all(Cell::is_zero));
        assert_eq!(vol.total_flux(), Vec3::ZERO);
        assert_eq!(vol.occupied_cells(), 0);
    }

    #[test]
    fn total_flux_sums_dc_terms() {
        let mut vol = test_volume();
        vol.cell_mut(UVec3::ZERO).add_flux(Vec3::new(1.0, 2.0, 4.0), Vec3::Z);
        vol.cell_mut(UVec3::splat(3)).add_flux(Vec3::new(1.0, 0.0, 0.0), Vec3::X);
        let expected = Vec3::new(2.0, 2.0, 4.0) * crate::sh::COS_C0;
        assert!((vol.total_flux() - expected).abs().max_element() < 1e-5);
    }
}

//! Per-cell radiance record: one SH coefficient vector per color channel,
//! a luminance accumulator, and a directional occupancy flag.

use glam::{Vec3, Vec4};

use crate::sh;

/// Rec. 709 luma weights applied to injected flux.
const LUMA: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub red: Vec4,
    pub green: Vec4,
    pub blue: Vec4,
    /// Scalar luma of the flux injected here. Written by injection only,
    /// never redistributed by propagation.
    pub luminance: f32,
    /// Set when a surface deposited light in this cell. Unoccupied cells
    /// are skipped as propagation sources.
    pub occupied: bool,
}

impl Cell {
    pub const ZERO: Cell = Cell {
        red: Vec4::ZERO,
        green: Vec4::ZERO,
        blue: Vec4::ZERO,
        luminance: 0.0,
        occupied: false,
    };

    /// Accumulate a virtual point light: clamped cosine lobe around the
    /// surface normal, scaled per channel by the reflected flux.
    pub fn add_flux(&mut self, flux: Vec3, normal: Vec3) {
        let lobe = sh::clamped_cosine_lobe(normal);
        self.red += lobe * flux.x;
        self.green += lobe * flux.y;
        self.blue += lobe * flux.z;
        self.luminance += flux.dot(LUMA);
        self.occupied = true;
    }

    /// RGB radiance toward `normal`, clamped at zero per channel.
    pub fn irradiance(&self, normal: Vec3) -> Vec3 {
        Vec3::new(
            sh::evaluate(self.red, normal).max(0.0),
            sh::evaluate(self.green, normal).max(0.0),
            sh::evaluate(self.blue, normal).max(0.0),
        )
    }

    /// Componentwise blend used by trilinear volume sampling.
    pub fn lerp(a: &Cell, b: &Cell, t: f32) -> Cell {
        Cell {
            red: a.red.lerp(b.red, t),
            green: a.green.lerp(b.green, t),
            blue: a.blue.lerp(b.blue, t),
            luminance: a.luminance + (b.luminance - a.luminance) * t,
            occupied: a.occupied || b.occupied,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.red == Vec4::ZERO
            && self.green == Vec4::ZERO
            && self.blue == Vec4::ZERO
            && self.luminance == 0.0
            && !self.occupied
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::ZERO
    }
}

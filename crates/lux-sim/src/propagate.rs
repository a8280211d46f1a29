//! Flux propagation across a light volume.
//!
//! Each step moves radiance from every occupied cell to its six face
//! neighbors through the 30-face stencil: per neighbor, one direct face and
//! four side faces, each subtending a fixed fraction of the sphere around
//! the source. The scalar flux through a face is the source distribution
//! evaluated toward that face times the face's solid angle, and it re-enters
//! the neighbor as a clamped cosine lobe around the face direction. The same
//! lobe is debited from the source cell, so interior transfers keep the
//! lattice totals unchanged while flux pushed across the outer boundary is
//! lost.

use std::ops::{AddAssign, SubAssign};

use glam::{IVec3, Vec3, Vec4};
use lux_core::{sh, Cell, LightVolume};
use rayon::prelude::*;

/// Fraction of the sphere subtended by the directly faced side of a
/// neighbor cell.
const DIRECT_FACE_SOLID_ANGLE: f32 = 0.400_669_68 / (4.0 * std::f32::consts::PI);
/// Fraction subtended by each of the four remaining visible faces.
const SIDE_FACE_SOLID_ANGLE: f32 = 0.423_441_35 / (4.0 * std::f32::consts::PI);

/// Signed SH transfer accumulated for one cell during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellDelta {
    pub red: Vec4,
    pub green: Vec4,
    pub blue: Vec4,
}

impl CellDelta {
    pub const ZERO: CellDelta = CellDelta {
        red: Vec4::ZERO,
        green: Vec4::ZERO,
        blue: Vec4::ZERO,
    };

    pub fn is_zero(&self) -> bool {
        self.red == Vec4::ZERO && self.green == Vec4::ZERO && self.blue == Vec4::ZERO
    }
}

impl AddAssign for CellDelta {
    fn add_assign(&mut self, rhs: CellDelta) {
        self.red += rhs.red;
        self.green += rhs.green;
        self.blue += rhs.blue;
    }
}

impl SubAssign for CellDelta {
    fn sub_assign(&mut self, rhs: CellDelta) {
        self.red -= rhs.red;
        self.green -= rhs.green;
        self.blue -= rhs.blue;
    }
}

struct FaceStencil {
    /// SH basis of the direction the source radiance is evaluated in.
    eval_basis: Vec4,
    /// Cosine lobe the flux through this face is reprojected onto.
    transfer_lobe: Vec4,
    solid_angle: f32,
}

struct DirectionStencil {
    offset: IVec3,
    faces: [FaceStencil; 5],
}

/// Precomputed propagation stencil, shared by every cascade and step.
pub struct Propagator {
    stencil: [DirectionStencil; 6],
}

impl Propagator {
    pub fn new() -> Self {
        let directions = [
            IVec3::X,
            IVec3::NEG_X,
            IVec3::Y,
            IVec3::NEG_Y,
            IVec3::Z,
            IVec3::NEG_Z,
        ];
        let stencil = directions.map(|offset| {
            let dir = offset.as_vec3();
            let sides = side_normals(dir);
            let face = |eval_dir: Vec3, reproj_dir: Vec3, solid_angle: f32| FaceStencil {
                eval_basis: sh::basis(eval_dir),
                transfer_lobe: sh::clamped_cosine_lobe(reproj_dir),
                solid_angle,
            };
            DirectionStencil {
                offset,
                faces: [
                    face(dir, dir, DIRECT_FACE_SOLID_ANGLE),
                    face(
                        (sides[0] + dir * 2.0).normalize(),
                        sides[0],
                        SIDE_FACE_SOLID_ANGLE,
                    ),
                    face(
                        (sides[1] + dir * 2.0).normalize(),
                        sides[1],
                        SIDE_FACE_SOLID_ANGLE,
                    ),
                    face(
                        (sides[2] + dir * 2.0).normalize(),
                        sides[2],
                        SIDE_FACE_SOLID_ANGLE,
                    ),
                    face(
                        (sides[3] + dir * 2.0).normalize(),
                        sides[3],
                        SIDE_FACE_SOLID_ANGLE,
                    ),
                ],
            }
        });
        Self { stencil }
    }

    /// Run one propagation step on a volume: gather the signed transfer for
    /// every cell into `scratch` in parallel, then composite the deltas back
    /// into the lattice. `scratch` must hold one delta per cell.
    pub fn step(&self, volume: &mut LightVolume, scratch: &mut [CellDelta]) {
        debug_assert_eq!(scratch.len(), volume.cells().len());
        let dim = volume.dimension() as usize;
        let cells = volume.cells();

        scratch
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, delta)| *delta = self.gather_delta(cells, dim, idx));

        volume
            .cells_mut()
            .par_iter_mut()
            .zip(scratch.par_iter_mut())
            .for_each(|(cell, delta)| {
                if !delta.is_zero() {
                    cell.red += delta.red;
                    cell.green += delta.green;
                    cell.blue += delta.blue;
                    cell.occupied = true;
                }
                *delta = CellDelta::ZERO;
            });
    }

    /// Inflow from the six neighbors minus outflow toward them. Outflow is
    /// debited even when it crosses the volume boundary.
    fn gather_delta(&self, cells: &[Cell], dim: usize, idx: usize) -> CellDelta {
        let d = dim as i32;
        let c = IVec3::new(
            (idx % dim) as i32,
            (idx / dim % dim) as i32,
            (idx / (dim * dim)) as i32,
        );
        let me = &cells[idx];
        let mut delta = CellDelta::ZERO;

        for dir in &self.stencil {
            let n = c - dir.offset;
            if n.min_element() >= 0 && n.max_element() < d {
                let src = &cells[(n.x + n.y * d + n.z * d * d) as usize];
                if src.occupied {
                    delta += transfer(src, dir);
                }
            }
            if me.occupied {
                delta -= transfer(me, dir);
            }
        }
        delta
    }
}

impl Default for Propagator {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one cell hands to the neighbor in `dir` during a step.
fn transfer(cell: &Cell, dir: &DirectionStencil) -> CellDelta {
    let mut out = CellDelta::ZERO;
    for face in &dir.faces {
        let r = cell.red.dot(face.eval_basis).max(0.0) * face.solid_angle;
        let g = cell.green.dot(face.eval_basis).max(0.0) * face.solid_angle;
        let b = cell.blue.dot(face.eval_basis).max(0.0) * face.solid_angle;
        out.red += face.transfer_lobe * r;
        out.green += face.transfer_lobe * g;
        out.blue += face.transfer_lobe * b;
    }
    out
}

/// The four unit normals perpendicular to a propagation axis.
fn side_normals(dir: Vec3) -> [Vec3; 4] {
    let mut out = [Vec3::ZERO; 4];
    let mut n = 0;
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        if axis.dot(dir).abs() > 0.5 {
            continue;
        }
        out[n] = axis;
        out[n + 1] = -axis;
        n += 2;
    }
    out
}

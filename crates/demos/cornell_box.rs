//! Cornell-style box, run headless.
//!
//! An RSM camera above the box feeds the volumes with virtual point
//! lights on the floor and the red wall. After the grid settles the demo
//! logs indirect light probes around the scene, including the color
//! bleed off the red wall.
//!
//! Pass a RON file to override the default configuration:
//!   cargo run --bin cornell_box -- configs/cornell.ron

use std::sync::Arc;

use glam::Vec3;
use lux_core::{LpvConfig, RsmCamera, UpdateMode};
use lux_sim::LpvSystem;
use parking_lot::RwLock;

const RSM_RESOLUTION: u32 = 48;
/// Half extent of the box. Walls sit at +-BOX_HALF on x and z, the floor
/// at y = 0, the open ceiling at y = 2 * BOX_HALF.
const BOX_HALF: f32 = 8.0;

fn main() {
    env_logger::init();

    let config = load_config();
    log::info!("Cornell box with {config:?}");
    let frames = match config.mode {
        // Enough frames for two full buffer flips.
        UpdateMode::Amortized => config.propagation_steps * 3,
        UpdateMode::Synchronous => 4,
    };

    // Tilted toward negative x so the red wall catches direct light.
    let light_direction = Vec3::new(-0.35, -1.0, -0.15);
    let camera = Arc::new(RwLock::new(RsmCamera::new(
        RSM_RESOLUTION,
        light_direction,
        Vec3::new(0.0, 3.0 * BOX_HALF, 0.0),
    )));
    fill_box_surfaces(&mut camera.write());

    let mut system = LpvSystem::new(config).expect("configuration rejected");
    system.register_source(camera.clone());

    let viewer = Vec3::new(0.0, 2.0, 0.0);
    for _ in 0..frames {
        camera.write().follow(viewer);
        system.advance_frame(viewer);
    }

    let side = system.live_side();
    for (i, cascade) in system.cascades().cascades().iter().enumerate() {
        let volume = cascade.volume(side);
        log::info!(
            "cascade {i}: boundary {:>5.1}, {:>5} occupied cells, flux {:.3}",
            cascade.boundary(),
            volume.occupied_cells(),
            volume.total_flux()
        );
    }

    let probes = [
        ("above the floor", Vec3::new(0.0, 0.5, 0.0), Vec3::Y),
        ("facing the red wall", Vec3::new(-6.5, 4.0, 0.0), Vec3::NEG_X),
        ("on the unlit wall", Vec3::new(7.5, 4.0, 0.0), Vec3::NEG_X),
        ("high in the box", Vec3::new(0.0, 14.0, 0.0), Vec3::NEG_Y),
    ];
    for (label, position, normal) in probes {
        let rgb = system.indirect_light(position, normal);
        log::info!("{label:<20} {rgb:.4}");
    }
}

fn load_config() -> LpvConfig {
    match std::env::args().nth(1) {
        Some(path) => LpvConfig::from_ron_file(path).expect("bad configuration file"),
        None => LpvConfig::new()
            .with_dimension(32)
            .with_boundaries(vec![1.5 * BOX_HALF, 4.0 * BOX_HALF])
            .with_propagation_steps(12)
            .with_indirect_intensity(1.5),
    }
}

/// Write the lit box surfaces into the RSM buffers: white floor, red
/// left wall. The right wall faces away from the light and stays dark,
/// so it only shows up through bounced light.
fn fill_box_surfaces(camera: &mut RsmCamera) {
    let towards_light = -camera.light_direction();
    let buffers = camera.buffers_mut();
    let res = buffers.resolution();

    let floor_rows = res.y * 3 / 4;
    let floor_albedo = Vec3::splat(0.75);
    let floor_cos = Vec3::Y.dot(towards_light).max(0.0);
    for y in 0..floor_rows {
        for x in 0..res.x {
            let u = (x as f32 + 0.5) / res.x as f32;
            let v = (y as f32 + 0.5) / floor_rows as f32;
            let world = Vec3::new(
                (u * 2.0 - 1.0) * BOX_HALF,
                0.0,
                (v * 2.0 - 1.0) * BOX_HALF,
            );
            buffers.write_texel(x, y, floor_albedo * floor_cos, world, Vec3::Y);
        }
    }

    let wall_albedo = Vec3::new(0.7, 0.06, 0.06);
    let wall_cos = Vec3::X.dot(towards_light).max(0.0);
    for y in floor_rows..res.y {
        for x in 0..res.x {
            let u = (x as f32 + 0.5) / res.x as f32;
            let v = ((y - floor_rows) as f32 + 0.5) / (res.y - floor_rows) as f32;
            let world = Vec3::new(
                -BOX_HALF,
                v * 2.0 * BOX_HALF,
                (u * 2.0 - 1.0) * BOX_HALF,
            );
            buffers.write_texel(x, y, wall_albedo * wall_cos, world, Vec3::X);
        }
    }
}

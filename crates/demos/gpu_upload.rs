//! Pushes one simulated frame into the GPU volume textures on whatever
//! adapter is available, with no window. Exercises the full CPU to GPU
//! path: simulate, repack to half floats, upload, compile the sampling
//! shader against the bind group layout.

use std::sync::Arc;

use glam::Vec3;
use lux_core::{LightVolume, LpvConfig, RsmCamera, UpdateMode};
use lux_gpu::GpuVolumes;
use lux_sim::LpvSystem;
use parking_lot::RwLock;

fn main() {
    env_logger::init();

    let config = LpvConfig::new()
        .with_dimension(16)
        .with_boundaries(vec![12.0, 30.0])
        .with_propagation_steps(8)
        .with_mode(UpdateMode::Synchronous);

    let camera = Arc::new(RwLock::new(RsmCamera::new(
        16,
        Vec3::new(-0.2, -1.0, -0.1),
        Vec3::new(0.0, 15.0, 0.0),
    )));
    {
        let mut cam = camera.write();
        let buffers = cam.buffers_mut();
        let res = buffers.resolution();
        for y in 0..res.y {
            for x in 0..res.x {
                let world = Vec3::new(x as f32 - 8.0, 0.0, y as f32 - 8.0);
                buffers.write_texel(x, y, Vec3::splat(0.6), world, Vec3::Y);
            }
        }
    }

    let mut system = LpvSystem::new(config.clone()).expect("configuration rejected");
    system.register_source(camera);
    system.advance_frame(Vec3::ZERO);

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .expect("no compatible adapter");
    log::info!("adapter: {}", adapter.get_info().name);
    let (device, queue) = pollster::block_on(adapter.request_device(
        &wgpu::DeviceDescriptor {
            label: Some("lpv_upload"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
        },
        None,
    ))
    .expect("device request failed");

    let gpu = GpuVolumes::new(&device, &config).expect("GPU volumes rejected the config");
    let volumes: Vec<&LightVolume> = (0..system.cascades().len())
        .map(|i| system.live_volume(i))
        .collect();
    gpu.upload_frame(&queue, &volumes, config.indirect_intensity)
        .expect("upload failed");
    device.poll(wgpu::Maintain::Wait);
    log::info!(
        "uploaded {} cascades of {}^3 texels",
        gpu.cascade_count(),
        config.dimension
    );

    // Compiling the library proves the WGSL matches this wgpu version.
    let _module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("lpv_sample"),
        source: wgpu::ShaderSource::Wgsl(lux_gpu::LPV_SAMPLE_SHADER.into()),
    });
    log::info!("sampling shader compiled");
}

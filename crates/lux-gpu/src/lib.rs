//! GPU presentation of the simulated light volumes.
//!
//! [`GpuVolumes`] owns one set of 3D textures per cascade plus the sampler,
//! uniform buffer, and bind group a renderer needs to composite indirect
//! light in a fragment shader. The matching WGSL functions live in
//! `shaders/lpv_sample.wgsl`, exported as [`LPV_SAMPLE_SHADER`].

use lux_core::{LightVolume, LpvConfig, LuxError, Result};

pub use uniforms::{GpuVolume, LpvUniforms, MAX_CASCADES};
pub use volume_textures::VolumeTextures;

pub mod uniforms;
pub mod volume_textures;

/// WGSL library with the cascade selection and SH decode functions.
/// Concatenate it into a fragment shader and bind [`GpuVolumes`] at
/// `@group(LPV_BIND_GROUP)`; `lpv_indirect_light(world_pos, normal)`
/// then returns the composited indirect radiance.
pub const LPV_SAMPLE_SHADER: &str = include_str!("../shaders/lpv_sample.wgsl");

/// Bind group index the shader library expects.
pub const LPV_BIND_GROUP: u32 = 2;

const SAMPLER_BINDING: u32 = (MAX_CASCADES * 4) as u32;
const UNIFORMS_BINDING: u32 = SAMPLER_BINDING + 1;

// ======================== GPU Volumes ========================

/// Texture-side mirror of a cascade set.
///
/// Bindings 0..16 carry four planes per cascade slot (red SH, green SH,
/// blue SH, luminance); slots past the configured cascade count bind a
/// 1^3 placeholder so the layout is the same for every configuration.
/// Binding 16 is the trilinear sampler, 17 the uniforms.
pub struct GpuVolumes {
    cascades: Vec<VolumeTextures>,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl GpuVolumes {
    pub fn new(device: &wgpu::Device, config: &LpvConfig) -> Result<Self> {
        config.validate()?;
        let cascade_count = config.cascade_count();
        if cascade_count > MAX_CASCADES {
            return Err(LuxError::InvalidConfiguration(format!(
                "{cascade_count} cascades configured but the shader binds at most {MAX_CASCADES}"
            )));
        }
        log::info!(
            "Creating LPV GPU volumes: {} cascades, {}^3 texels each",
            cascade_count,
            config.dimension
        );

        let cascades: Vec<VolumeTextures> = (0..cascade_count)
            .map(|i| VolumeTextures::new(device, &format!("lpv_cascade_{i}"), config.dimension))
            .collect();
        let filler = VolumeTextures::new(device, "lpv_filler", 1);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lpv_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lpv_uniforms"),
            size: std::mem::size_of::<LpvUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut layout_entries = Vec::with_capacity(MAX_CASCADES * 4 + 2);
        for binding in 0..SAMPLER_BINDING {
            layout_entries.push(bgl_tex3d(binding, wgpu::ShaderStages::FRAGMENT));
        }
        layout_entries.push(bgl_sampler(SAMPLER_BINDING, wgpu::ShaderStages::FRAGMENT));
        layout_entries.push(bgl_uniform(UNIFORMS_BINDING, wgpu::ShaderStages::FRAGMENT));
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lpv_bgl"),
            entries: &layout_entries,
        });

        let mut bind_entries = Vec::with_capacity(MAX_CASCADES * 4 + 2);
        for slot in 0..MAX_CASCADES {
            let textures = cascades.get(slot).unwrap_or(&filler);
            let planes = [
                &textures.red_view,
                &textures.green_view,
                &textures.blue_view,
                &textures.luminance_view,
            ];
            for (plane, view) in planes.into_iter().enumerate() {
                bind_entries.push(wgpu::BindGroupEntry {
                    binding: (slot * 4 + plane) as u32,
                    resource: wgpu::BindingResource::TextureView(view),
                });
            }
        }
        bind_entries.push(wgpu::BindGroupEntry {
            binding: SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(&sampler),
        });
        bind_entries.push(wgpu::BindGroupEntry {
            binding: UNIFORMS_BINDING,
            resource: uniform_buffer.as_entire_binding(),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lpv_bg"),
            layout: &bind_group_layout,
            entries: &bind_entries,
        });

        Ok(Self {
            cascades,
            uniform_buffer,
            bind_group_layout,
            bind_group,
        })
    }

    /// Push one simulated frame: the live volume of every cascade,
    /// innermost first, plus the composition intensity.
    pub fn upload_frame(
        &self,
        queue: &wgpu::Queue,
        volumes: &[&LightVolume],
        intensity: f32,
    ) -> Result<()> {
        if volumes.len() != self.cascades.len() {
            return Err(LuxError::VolumeMismatch(format!(
                "{} volumes pushed for {} cascade textures",
                volumes.len(),
                self.cascades.len()
            )));
        }
        for (textures, volume) in self.cascades.iter().zip(volumes) {
            textures.upload(queue, volume)?;
        }
        let uniforms = LpvUniforms::from_volumes(volumes, intensity);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
        Ok(())
    }

    pub fn cascade_count(&self) -> usize {
        self.cascades.len()
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

// ======================== Helpers ========================

fn bgl_tex3d(binding: u32, vis: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry { binding, visibility: vis,
        ty: wgpu::BindingType::Texture { sample_type: wgpu::TextureSampleType::Float { filterable: true }, view_dimension: wgpu::TextureViewDimension::D3, multisampled: false },
        count: None }
}
fn bgl_sampler(binding: u32, vis: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry { binding, visibility: vis,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering), count: None }
}
fn bgl_uniform(binding: u32, vis: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry { binding, visibility: vis,
        ty: wgpu::BindingType::Buffer { ty: wgpu::BufferBindingType::Uniform, has_dynamic_offset: false, min_binding_size: None },
        count: None }
}

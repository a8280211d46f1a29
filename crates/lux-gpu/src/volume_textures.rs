//! GPU mirrors of the CPU light volumes.
//!
//! Each cascade keeps four 3D textures: one `Rgba16Float` per color channel
//! holding the SH coefficient vectors, and one `R16Float` for the injected
//! luminance. The CPU lattice is repacked to half floats and written in a
//! single `write_texture` per plane after every simulation frame.

use half::f16;
use lux_core::{Cell, LightVolume, LuxError, Result};

pub struct VolumeTextures {
    dimension: u32,
    pub red: wgpu::Texture,
    pub red_view: wgpu::TextureView,
    pub green: wgpu::Texture,
    pub green_view: wgpu::TextureView,
    pub blue: wgpu::Texture,
    pub blue_view: wgpu::TextureView,
    pub luminance: wgpu::Texture,
    pub luminance_view: wgpu::TextureView,
}

impl VolumeTextures {
    pub fn new(device: &wgpu::Device, name: &str, dimension: u32) -> Self {
        let plane = |suffix: &str, format: wgpu::TextureFormat| {
            create_volume_texture(device, &format!("{name}_{suffix}"), dimension, format)
        };
        let (red, red_view) = plane("red", wgpu::TextureFormat::Rgba16Float);
        let (green, green_view) = plane("green", wgpu::TextureFormat::Rgba16Float);
        let (blue, blue_view) = plane("blue", wgpu::TextureFormat::Rgba16Float);
        let (luminance, luminance_view) = plane("luminance", wgpu::TextureFormat::R16Float);
        Self {
            dimension,
            red,
            red_view,
            green,
            green_view,
            blue,
            blue_view,
            luminance,
            luminance_view,
        }
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Repack the volume to half floats and push all four planes.
    pub fn upload(&self, queue: &wgpu::Queue, volume: &LightVolume) -> Result<()> {
        if volume.dimension() != self.dimension {
            return Err(LuxError::VolumeMismatch(format!(
                "texture is {}^3 but volume is {}^3",
                self.dimension,
                volume.dimension()
            )));
        }
        let cells = volume.cells();
        let d = self.dimension;

        let red = pack_sh_texels(cells, |c| c.red.to_array());
        let green = pack_sh_texels(cells, |c| c.green.to_array());
        let blue = pack_sh_texels(cells, |c| c.blue.to_array());
        let luma = pack_luma_texels(cells);

        write_volume(queue, &self.red, d, bytemuck::cast_slice(&red), 8);
        write_volume(queue, &self.green, d, bytemuck::cast_slice(&green), 8);
        write_volume(queue, &self.blue, d, bytemuck::cast_slice(&blue), 8);
        write_volume(queue, &self.luminance, d, bytemuck::cast_slice(&luma), 2);
        Ok(())
    }
}

fn create_volume_texture(
    device: &wgpu::Device,
    name: &str,
    dimension: u32,
    format: wgpu::TextureFormat,
) -> (wgpu::Texture, wgpu::TextureView) {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(name),
        size: wgpu::Extent3d {
            width: dimension,
            height: dimension,
            depth_or_array_layers: dimension,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D3,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = tex.create_view(&wgpu::TextureViewDescriptor {
        dimension: Some(wgpu::TextureViewDimension::D3),
        ..Default::default()
    });
    (tex, view)
}

fn write_volume(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    dimension: u32,
    data: &[u8],
    bytes_per_texel: u32,
) {
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_texel * dimension),
            rows_per_image: Some(dimension),
        },
        wgpu::Extent3d {
            width: dimension,
            height: dimension,
            depth_or_array_layers: dimension,
        },
    );
}

fn pack_sh_texels(cells: &[Cell], select: impl Fn(&Cell) -> [f32; 4]) -> Vec<f16> {
    let mut out = Vec::with_capacity(cells.len() * 4);
    for cell in cells {
        out.extend(select(cell).map(f16::from_f32));
    }
    out
}

fn pack_luma_texels(cells: &[Cell]) -> Vec<f16> {
    cells.iter().map(|c| f16::from_f32(c.luminance)).collect()
}

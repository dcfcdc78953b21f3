use wgpu::{
    Device, Extent3d, ImageCopyTexture, ImageDataLayout, Origin3d, Queue, Texture, TextureAspect,
    TextureDescriptor, TextureDimension, TextureFormat, TextureUsages, TextureView,
    TextureViewDescriptor,
};

/// Read-only lookup data uploaded once at startup. The shader indexes it
/// with `textureLoad`, so no sampler is attached and the float formats
/// never need to be filterable.
pub struct LookupTexture {
    pub texture: Texture,
    pub view: TextureView,
}

impl LookupTexture {
    fn new(device: &Device, width: u32, height: u32, format: TextureFormat, label: &str) -> Self {
        let texture = device.create_texture(&TextureDescriptor {
            label: Some(label),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&TextureViewDescriptor {
            label: Some(&format!("{label} view")),
            ..Default::default()
        });

        Self { texture, view }
    }

    /// N×N stratified jitter offsets as an Rg32Float texture.
    pub fn jitter_table(
        device: &Device,
        queue: &Queue,
        entries: &[[f32; 2]],
        size: u32,
    ) -> Self {
        let table = Self::new(device, size, size, TextureFormat::Rg32Float, "Jitter Table");
        table.upload(queue, bytemuck::cast_slice(entries), size * 8, size);
        table
    }

    /// The 1D random pool as a single-row R32Float texture.
    pub fn random_pool(device: &Device, queue: &Queue, entries: &[f32]) -> Self {
        let width = entries.len() as u32;
        let pool = Self::new(device, width, 1, TextureFormat::R32Float, "Random Pool");
        pool.upload(queue, bytemuck::cast_slice(entries), width * 4, 1);
        pool
    }

    fn upload(&self, queue: &Queue, data: &[u8], bytes_per_row: u32, rows: u32) {
        queue.write_texture(
            ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            data,
            ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(rows),
            },
            self.texture.size(),
        )
    }
}

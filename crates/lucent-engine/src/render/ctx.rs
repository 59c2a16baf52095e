use crate::scene::Scene;

use super::lighting::LightingResources;

/// Strategy-facing context: device, queue and the shared read-only inputs.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub lighting: &'a LightingResources,
    pub scene: &'a Scene,
}

/// Where a strategy records its passes: the frame's encoder and color target.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    /// Physical pixels, never zero.
    pub size: [u32; 2],
}

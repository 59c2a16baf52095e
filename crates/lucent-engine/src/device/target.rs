/// Color target acquired for one frame.
///
/// Holding a surface texture blocks acquisition of the next one, so the
/// target must be presented (or dropped) promptly.
pub struct FrameTarget {
    pub view: wgpu::TextureView,
    pub size: [u32; 2],
    pub format: wgpu::TextureFormat,
    surface_texture: Option<wgpu::SurfaceTexture>,
}

impl FrameTarget {
    pub fn from_surface(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let size = [surface_texture.texture.width(), surface_texture.texture.height()];
        let format = surface_texture.texture.format();
        Self {
            view,
            size,
            format,
            surface_texture: Some(surface_texture),
        }
    }

    pub fn from_texture(texture: &wgpu::Texture) -> Self {
        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            size: [texture.width(), texture.height()],
            format: texture.format(),
            surface_texture: None,
        }
    }

    /// Presents a surface target. Offscreen targets have nothing to present.
    ///
    /// Must be called after the frame's commands were submitted.
    pub fn present(self) {
        let Self {
            view,
            surface_texture,
            ..
        } = self;
        drop(view);
        if let Some(st) = surface_texture {
            st.present();
        }
    }
}

/// Anything that can hand out a device, a queue and one color target per frame.
///
/// Implemented by the windowed [`Gpu`](super::Gpu) and by
/// [`HeadlessGpu`](super::HeadlessGpu) for offscreen rendering.
pub trait FrameSource {
    fn device(&self) -> &wgpu::Device;

    fn queue(&self) -> &wgpu::Queue;

    fn target_format(&self) -> wgpu::TextureFormat;

    /// Current target size in physical pixels. May be zero while minimized.
    fn target_size(&self) -> [u32; 2];

    /// Acquires the color target for this frame. May block on vsync.
    fn acquire(&self) -> Result<FrameTarget, wgpu::SurfaceError>;
}

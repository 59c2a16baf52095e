//! Size-dependent attachments, recreated when the frame target changes size.

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

pub const GBUFFER_POSITION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const GBUFFER_ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;
pub const GBUFFER_NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

fn attachment(
    device: &wgpu::Device,
    label: &str,
    size: [u32; 2],
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size[0],
                height: size[1],
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

/// Depth buffer matching the frame target.
#[derive(Default)]
pub struct DepthTarget {
    size: [u32; 2],
    view: Option<wgpu::TextureView>,
}

impl DepthTarget {
    /// Returns the depth view for `size`, recreating it on change.
    pub fn ensure(&mut self, device: &wgpu::Device, size: [u32; 2]) -> &wgpu::TextureView {
        if self.size != size {
            self.view = None;
            self.size = size;
        }
        if self.view.is_none() {
            log::debug!("depth target {}x{}", size[0], size[1]);
        }
        self.view.get_or_insert_with(|| {
            attachment(
                device,
                "lucent depth",
                size,
                DEPTH_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            )
        })
    }
}

/// Position, albedo and normal surfaces of the deferred strategy.
pub struct GBuffer {
    pub size: [u32; 2],
    pub position: wgpu::TextureView,
    pub albedo: wgpu::TextureView,
    pub normal: wgpu::TextureView,
    /// Group 1 of the fullscreen lighting pass.
    pub bind_group: wgpu::BindGroup,
}

impl GBuffer {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, size: [u32; 2]) -> Self {
        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        let position = attachment(device, "lucent gbuffer position", size, GBUFFER_POSITION_FORMAT, usage);
        let albedo = attachment(device, "lucent gbuffer albedo", size, GBUFFER_ALBEDO_FORMAT, usage);
        let normal = attachment(device, "lucent gbuffer normal", size, GBUFFER_NORMAL_FORMAT, usage);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lucent gbuffer bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&position),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&albedo),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&normal),
                },
            ],
        });

        log::debug!("gbuffer {}x{}", size[0], size[1]);
        Self {
            size,
            position,
            albedo,
            normal,
            bind_group,
        }
    }

    /// Layout for the three G-buffer textures, read with `textureLoad`.
    pub fn layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        let texture = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lucent gbuffer bgl"),
            entries: &[texture(0), texture(1), texture(2)],
        })
    }
}

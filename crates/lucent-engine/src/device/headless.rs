use anyhow::{Context, Result};

use super::init::GpuInit;
use super::target::{FrameSource, FrameTarget};

/// Device plus an offscreen color texture, for rendering without a window.
///
/// Used by integration tests and GPU readback tooling. Acquisition never fails.
pub struct HeadlessGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_info: wgpu::AdapterInfo,
    target: wgpu::Texture,
}

impl HeadlessGpu {
    pub const DEFAULT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Requests any adapter (software fallback allowed) and a `size` target.
    pub async fn new(size: [u32; 2], init: GpuInit) -> Result<Self> {
        anyhow::ensure!(size[0] > 0 && size[1] > 0, "offscreen target has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter available")?;

        let adapter_info = adapter.get_info();
        log::info!(
            "headless adapter: {} ({:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&init.device_descriptor("lucent headless device"))
            .await
            .context("failed to create wgpu device/queue")?;

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lucent offscreen target"),
            size: wgpu::Extent3d {
                width: size[0],
                height: size[1],
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEFAULT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        Ok(Self {
            device,
            queue,
            adapter_info,
            target,
        })
    }

    /// Blocking form of [`HeadlessGpu::new`].
    pub fn new_blocking(size: [u32; 2], init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new(size, init))
    }

    pub fn adapter_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }
}

impl FrameSource for HeadlessGpu {
    fn device(&self) -> &wgpu::Device {
        &self.device
    }

    fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    fn target_format(&self) -> wgpu::TextureFormat {
        self.target.format()
    }

    fn target_size(&self) -> [u32; 2] {
        [self.target.width(), self.target.height()]
    }

    fn acquire(&self) -> Result<FrameTarget, wgpu::SurfaceError> {
        Ok(FrameTarget::from_texture(&self.target))
    }
}

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;

use crate::camera::{CameraUniforms, CAMERA_UNIFORMS_BYTES};
use crate::cluster::ClusterGrid;
use crate::config::LightingConfig;
use crate::error::LightCountError;
use crate::lights::{workgroup_count, LightSet, LightSetHeader, LIGHT_SET_HEADER_BYTES};

use super::shaders::{ShaderLibrary, CLUSTERING_CS, MOVE_LIGHTS_CS};

/// Time uniform: one `f32`, padded to a 16-byte uniform block.
const TIME_UNIFORM_BYTES: u64 = 16;

/// GPU residency of the light set and cluster grid, shared by every strategy.
///
/// Owns the light, cluster, camera and time buffers plus the two compute
/// kernels. Buffer sizes are fixed at creation; only the contents change.
pub struct LightingResources {
    config: LightingConfig,
    grid: ClusterGrid,
    shaders: ShaderLibrary,
    lights: LightSet,

    light_buffer: wgpu::Buffer,
    time_buffer: wgpu::Buffer,
    cluster_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,

    move_pipeline: wgpu::ComputePipeline,
    move_bind_group: wgpu::BindGroup,
    cluster_pipeline: wgpu::ComputePipeline,
    cluster_bind_group: wgpu::BindGroup,

    scene_layout: wgpu::BindGroupLayout,
    scene_bind_group: wgpu::BindGroup,
}

fn storage_entry(binding: u32, visibility: wgpu::ShaderStages, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages, size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    }
}

fn compute_pipeline(
    device: &wgpu::Device,
    label: &str,
    module: &wgpu::ShaderModule,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::ComputePipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        immediate_size: 0,
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        module,
        entry_point: Some("cs_main"),
        compilation_options: Default::default(),
        cache: None,
    })
}

impl LightingResources {
    /// Allocates every buffer and builds both kernels.
    ///
    /// Fails if `config` is inconsistent or exceeds the device limits.
    pub fn new(device: &wgpu::Device, config: LightingConfig) -> Result<Self> {
        config
            .validate_for_device(&device.limits())
            .context("lighting configuration rejected")?;

        let grid = config.grid();
        let shaders = ShaderLibrary::new(&config);
        let lights = LightSet::from_config(&config);

        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lucent light set"),
            contents: &lights.to_bytes(),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });
        let time_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lucent time ubo"),
            size: TIME_UNIFORM_BYTES,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Only the dimension header needs initial contents; every count is
        // written by the clustering kernel before anything reads it.
        let cluster_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lucent cluster set"),
            size: grid.buffer_size_bytes(),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: true,
        });
        {
            let mut view = cluster_buffer.slice(..).get_mapped_range_mut();
            view[..12].copy_from_slice(bytemuck::cast_slice(&grid.dims()));
        }
        cluster_buffer.unmap();

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lucent camera ubo"),
            contents: bytemuck::bytes_of(&CameraUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        log::info!(
            "lighting: {} lights (capacity {}), light set {} bytes, grid {:?} x {} slots, cluster set {} bytes",
            lights.num_lights(),
            lights.capacity(),
            lights.size_bytes(),
            grid.dims(),
            grid.max_lights_per_cluster(),
            grid.buffer_size_bytes()
        );

        // Motion kernel.
        let move_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lucent move lights bgl"),
            entries: &[
                storage_entry(0, wgpu::ShaderStages::COMPUTE, false),
                uniform_entry(1, wgpu::ShaderStages::COMPUTE, 4),
            ],
        });
        let move_module = shaders.module(device, "lucent move lights shader", MOVE_LIGHTS_CS);
        let move_pipeline =
            compute_pipeline(device, "lucent move lights pipeline", &move_module, &move_layout);
        let move_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lucent move lights bind group"),
            layout: &move_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: time_buffer.as_entire_binding(),
                },
            ],
        });

        // Clustering kernel.
        let cluster_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lucent clustering bgl"),
            entries: &[
                storage_entry(0, wgpu::ShaderStages::COMPUTE, true),
                uniform_entry(1, wgpu::ShaderStages::COMPUTE, CAMERA_UNIFORMS_BYTES as u64),
                storage_entry(2, wgpu::ShaderStages::COMPUTE, false),
            ],
        });
        let cluster_module = shaders.module(device, "lucent clustering shader", CLUSTERING_CS);
        let cluster_pipeline =
            compute_pipeline(device, "lucent clustering pipeline", &cluster_module, &cluster_layout);
        let cluster_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lucent clustering bind group"),
            layout: &cluster_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: cluster_buffer.as_entire_binding(),
                },
            ],
        });

        // Scene group 0, shared by every shading pipeline.
        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lucent scene bgl"),
            entries: &[
                uniform_entry(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    CAMERA_UNIFORMS_BYTES as u64,
                ),
                storage_entry(1, wgpu::ShaderStages::FRAGMENT, true),
                storage_entry(2, wgpu::ShaderStages::FRAGMENT, true),
            ],
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lucent scene bind group"),
            layout: &scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: cluster_buffer.as_entire_binding(),
                },
            ],
        });

        Ok(Self {
            config,
            grid,
            shaders,
            lights,
            light_buffer,
            time_buffer,
            cluster_buffer,
            camera_buffer,
            move_pipeline,
            move_bind_group,
            cluster_pipeline,
            cluster_bind_group,
            scene_layout,
            scene_bind_group,
        })
    }

    pub fn config(&self) -> &LightingConfig {
        &self.config
    }

    pub fn grid(&self) -> &ClusterGrid {
        &self.grid
    }

    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    /// Host copy of the light set. Positions are only current after a readback.
    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    pub(crate) fn lights_mut(&mut self) -> &mut LightSet {
        &mut self.lights
    }

    pub fn num_lights(&self) -> usize {
        self.lights.num_lights()
    }

    pub fn light_buffer(&self) -> &wgpu::Buffer {
        &self.light_buffer
    }

    pub fn cluster_buffer(&self) -> &wgpu::Buffer {
        &self.cluster_buffer
    }

    /// Layout of scene group 0 (camera, lights, clusters).
    pub fn scene_layout(&self) -> &wgpu::BindGroupLayout {
        &self.scene_layout
    }

    pub fn scene_bind_group(&self) -> &wgpu::BindGroup {
        &self.scene_bind_group
    }

    /// Changes the active light count. The header reaches the GPU with the
    /// next motion step; on error nothing changes.
    pub fn set_active_count(&mut self, n: usize) -> Result<(), LightCountError> {
        let before = self.lights.num_lights();
        self.lights.set_active_count(n)?;
        if before != n {
            log::info!("active lights: {before} -> {n}");
        }
        Ok(())
    }

    /// Uploads the camera for this frame's clustering and shading.
    pub fn write_camera(&self, queue: &wgpu::Queue, camera: &CameraUniforms) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
    }

    /// Flushes a pending header write, then submits the motion kernel on its
    /// own command buffer so the queue orders it before the render submission.
    pub fn submit_motion(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, time: f32) {
        if self.lights.take_header_dirty() {
            let header = LightSetHeader::new(self.lights.num_lights() as u32);
            queue.write_buffer(&self.light_buffer, 0, bytemuck::bytes_of(&header));
            log::trace!("light set header flushed ({} bytes)", LIGHT_SET_HEADER_BYTES);
        }

        let mut time_block = [0f32; 4];
        time_block[0] = time;
        queue.write_buffer(&self.time_buffer, 0, bytemuck::cast_slice(&time_block));

        let groups = workgroup_count(self.lights.num_lights(), self.config.move_lights_workgroup_size);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("lucent motion encoder"),
        });
        if groups > 0 {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("lucent move lights pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.move_pipeline);
            pass.set_bind_group(0, &self.move_bind_group, &[]);
            pass.dispatch_workgroups(groups, 1, 1);
        }
        // Submitted even when empty so the queued header and time writes land
        // ahead of the render submission.
        queue.submit(Some(encoder.finish()));
    }

    /// Records the clustering kernel into the frame's render command stream.
    pub fn record_clustering(&self, encoder: &mut wgpu::CommandEncoder) {
        let [gx, gy, gz] = self.grid.workgroup_counts(self.config.cluster_workgroup_size);
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("lucent clustering pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.cluster_pipeline);
        pass.set_bind_group(0, &self.cluster_bind_group, &[]);
        pass.dispatch_workgroups(gx, gy, gz);
    }
}

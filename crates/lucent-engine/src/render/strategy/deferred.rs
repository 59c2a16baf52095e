use crate::render::ctx::{RenderCtx, RenderTarget};
use crate::render::shaders::{FULLSCREEN_FS, FULLSCREEN_VS, GBUFFER_FS};
use crate::render::targets::{
    DepthTarget, GBuffer, GBUFFER_ALBEDO_FORMAT, GBUFFER_NORMAL_FORMAT, GBUFFER_POSITION_FORMAT,
};

use super::{clear_attachment, depth_attachment, geometry_pipeline, RenderStrategy, StrategyKind, CLEAR_COLOR};

/// G-buffer pass followed by a fullscreen lighting pass that walks each
/// pixel's cluster list.
#[derive(Default)]
pub struct ClusteredDeferred {
    gbuffer_pipeline: Option<wgpu::RenderPipeline>,
    gbuffer_layout: Option<wgpu::BindGroupLayout>,
    fullscreen: Option<(wgpu::TextureFormat, wgpu::RenderPipeline)>,
    gbuffer: Option<GBuffer>,
    depth: DepthTarget,
}

impl ClusteredDeferred {
    fn ensure_gbuffer_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.gbuffer_pipeline.is_some() {
            return;
        }
        let target = |format| {
            Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        };
        self.gbuffer_pipeline = Some(geometry_pipeline(
            ctx,
            "lucent gbuffer pipeline",
            GBUFFER_FS,
            &[
                target(GBUFFER_POSITION_FORMAT),
                target(GBUFFER_ALBEDO_FORMAT),
                target(GBUFFER_NORMAL_FORMAT),
            ],
        ));
    }

    fn ensure_fullscreen_pipeline(&mut self, ctx: &RenderCtx<'_>, format: wgpu::TextureFormat) {
        if matches!(&self.fullscreen, Some((f, _)) if *f == format) {
            return;
        }
        let device = ctx.device;
        let gbuffer_layout: &wgpu::BindGroupLayout = self
            .gbuffer_layout
            .get_or_insert_with(|| GBuffer::layout(device));

        let shaders = ctx.lighting.shaders();
        let vs = shaders.module(device, "lucent fullscreen vs", FULLSCREEN_VS);
        let fs = shaders.module(device, "lucent fullscreen fs", FULLSCREEN_FS);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lucent fullscreen pipeline layout"),
            bind_group_layouts: &[ctx.lighting.scene_layout(), gbuffer_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lucent fullscreen pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        self.fullscreen = Some((format, pipeline));
    }

    fn ensure_gbuffer(&mut self, device: &wgpu::Device, size: [u32; 2]) {
        if matches!(&self.gbuffer, Some(g) if g.size == size) {
            return;
        }
        let layout = self
            .gbuffer_layout
            .get_or_insert_with(|| GBuffer::layout(device));
        self.gbuffer = Some(GBuffer::new(device, layout, size));
    }
}

impl RenderStrategy for ClusteredDeferred {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ClusteredDeferred
    }

    fn record(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.ensure_gbuffer_pipeline(ctx);
        self.ensure_fullscreen_pipeline(ctx, target.format);
        self.ensure_gbuffer(ctx.device, target.size);
        let depth = self.depth.ensure(ctx.device, target.size);

        let (Some(gbuffer_pipeline), Some((_, fullscreen)), Some(gbuffer)) = (
            self.gbuffer_pipeline.as_ref(),
            self.fullscreen.as_ref(),
            self.gbuffer.as_ref(),
        ) else {
            return;
        };

        {
            // Position w == 0 marks pixels no geometry covered.
            let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lucent gbuffer pass"),
                color_attachments: &[
                    clear_attachment(&gbuffer.position, wgpu::Color::TRANSPARENT),
                    clear_attachment(&gbuffer.albedo, wgpu::Color::TRANSPARENT),
                    clear_attachment(&gbuffer.normal, wgpu::Color::TRANSPARENT),
                ],
                depth_stencil_attachment: Some(depth_attachment(depth)),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(gbuffer_pipeline);
            pass.set_bind_group(0, ctx.lighting.scene_bind_group(), &[]);
            ctx.scene.draw(&mut pass);
        }

        let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lucent deferred lighting pass"),
            color_attachments: &[clear_attachment(target.color_view, CLEAR_COLOR)],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        pass.set_pipeline(fullscreen);
        pass.set_bind_group(0, ctx.lighting.scene_bind_group(), &[]);
        pass.set_bind_group(1, &gbuffer.bind_group, &[]);
        pass.draw(0..4, 0..1);
    }
}

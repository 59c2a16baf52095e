use crate::render::ctx::{RenderCtx, RenderTarget};
use crate::render::shaders::NAIVE_FS;
use crate::render::targets::DepthTarget;

use super::{forward_pass, geometry_pipeline, RenderStrategy, StrategyKind};

/// Baseline forward shading over every active light. Ignores the cluster
/// buffer, though clustering still runs each frame.
#[derive(Default)]
pub struct Naive {
    pipeline: Option<(wgpu::TextureFormat, wgpu::RenderPipeline)>,
    depth: DepthTarget,
}

impl Naive {
    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, format: wgpu::TextureFormat) {
        if matches!(&self.pipeline, Some((f, _)) if *f == format) {
            return;
        }
        let pipeline = geometry_pipeline(
            ctx,
            "lucent naive pipeline",
            NAIVE_FS,
            &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        );
        self.pipeline = Some((format, pipeline));
    }
}

impl RenderStrategy for Naive {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Naive
    }

    fn record(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.ensure_pipeline(ctx, target.format);
        let depth = self.depth.ensure(ctx.device, target.size);
        let Some((_, pipeline)) = self.pipeline.as_ref() else { return };
        forward_pass(ctx, target, pipeline, depth, "lucent naive pass");
    }
}

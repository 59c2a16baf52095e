use crate::render::ctx::{RenderCtx, RenderTarget};
use crate::render::shaders::FORWARD_PLUS_FS;
use crate::render::targets::DepthTarget;

use super::{forward_pass, geometry_pipeline, RenderStrategy, StrategyKind};

/// Single forward pass; each fragment shades with the lights listed in its
/// cluster cell.
#[derive(Default)]
pub struct ForwardPlus {
    pipeline: Option<(wgpu::TextureFormat, wgpu::RenderPipeline)>,
    depth: DepthTarget,
}

impl ForwardPlus {
    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>, format: wgpu::TextureFormat) {
        if matches!(&self.pipeline, Some((f, _)) if *f == format) {
            return;
        }
        let pipeline = geometry_pipeline(
            ctx,
            "lucent forward+ pipeline",
            FORWARD_PLUS_FS,
            &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        );
        self.pipeline = Some((format, pipeline));
    }
}

impl RenderStrategy for ForwardPlus {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ForwardPlus
    }

    fn record(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        self.ensure_pipeline(ctx, target.format);
        let depth = self.depth.ensure(ctx.device, target.size);
        let Some((_, pipeline)) = self.pipeline.as_ref() else { return };
        forward_pass(ctx, target, pipeline, depth, "lucent forward+ pass");
    }
}

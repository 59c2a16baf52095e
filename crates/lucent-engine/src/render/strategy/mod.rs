//! Render strategies.
//!
//! Every strategy runs after motion and clustering were recorded, and only
//! decides how the geometry and lighting passes read the shared buffers.

mod deferred;
mod forward_plus;
mod naive;

use std::fmt;

pub use deferred::ClusteredDeferred;
pub use forward_plus::ForwardPlus;
pub use naive::Naive;

use crate::scene::Vertex;

use super::ctx::{RenderCtx, RenderTarget};
use super::shaders::GEOMETRY_VS;
use super::targets::DEPTH_FORMAT;

/// Selects one of the built-in strategies.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum StrategyKind {
    /// Every fragment loops over every active light.
    Naive,
    /// One pass, lights looked up through the fragment's cluster.
    #[default]
    ForwardPlus,
    /// G-buffer pass, then a fullscreen pass using the cluster lists.
    ClusteredDeferred,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Naive,
        StrategyKind::ForwardPlus,
        StrategyKind::ClusteredDeferred,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Naive => "Naive",
            StrategyKind::ForwardPlus => "Forward+",
            StrategyKind::ClusteredDeferred => "Clustered Deferred",
        }
    }

    /// Fresh strategy of this kind. Pipelines are built on first use.
    pub fn create(self) -> Box<dyn RenderStrategy> {
        match self {
            StrategyKind::Naive => Box::new(Naive::default()),
            StrategyKind::ForwardPlus => Box::new(ForwardPlus::default()),
            StrategyKind::ClusteredDeferred => Box::new(ClusteredDeferred::default()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometry and lighting passes of one frame.
pub trait RenderStrategy {
    fn kind(&self) -> StrategyKind;

    /// Records this strategy's passes into `target.encoder`. The light set and
    /// cluster buffers are already current in command order.
    fn record(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>);
}

pub(crate) const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Scene geometry pipeline: groups 0 (scene), 1 (model), 2 (material), the
/// shared vertex stage, depth testing and back-face culling.
pub(crate) fn geometry_pipeline(
    ctx: &RenderCtx<'_>,
    label: &str,
    fragment_body: &str,
    targets: &[Option<wgpu::ColorTargetState>],
) -> wgpu::RenderPipeline {
    let device = ctx.device;
    let shaders = ctx.lighting.shaders();
    let vs = shaders.module(device, &format!("{label} vs"), GEOMETRY_VS);
    let fs = shaders.module(device, &format!("{label} fs"), fragment_body);

    let layouts = ctx.scene.layouts();
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[ctx.lighting.scene_layout(), &layouts.model, &layouts.material],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &vs,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &fs,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets,
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Depth attachment cleared to the far plane and kept for the pass.
pub(crate) fn depth_attachment(view: &wgpu::TextureView) -> wgpu::RenderPassDepthStencilAttachment<'_> {
    wgpu::RenderPassDepthStencilAttachment {
        view,
        depth_ops: Some(wgpu::Operations {
            load: wgpu::LoadOp::Clear(1.0),
            store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
    }
}

/// Color attachment cleared to `clear`.
pub(crate) fn clear_attachment(
    view: &wgpu::TextureView,
    clear: wgpu::Color,
) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(clear),
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    })
}

/// Forward shading into the frame target: one pass, scene group 0 bound, every
/// node drawn in traversal order.
pub(crate) fn forward_pass(
    ctx: &RenderCtx<'_>,
    target: &mut RenderTarget<'_>,
    pipeline: &wgpu::RenderPipeline,
    depth: &wgpu::TextureView,
    label: &str,
) {
    let mut pass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[clear_attachment(target.color_view, CLEAR_COLOR)],
        depth_stencil_attachment: Some(depth_attachment(depth)),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, ctx.lighting.scene_bind_group(), &[]);
    ctx.scene.draw(&mut pass);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_strategy_reports_its_kind() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.create().kind(), kind);
        }
    }

    #[test]
    fn names_are_distinct() {
        assert_eq!(StrategyKind::ClusteredDeferred.to_string(), "Clustered Deferred");
        assert_ne!(StrategyKind::Naive.name(), StrategyKind::ForwardPlus.name());
        assert_eq!(StrategyKind::default(), StrategyKind::ForwardPlus);
    }
}

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Camera block shared by the clustering kernel and every shading pass (208 bytes).
///
/// Matches `struct CameraUniforms` in `common.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: Mat4,
    pub view: Mat4,
    pub inv_proj: Mat4,
    /// Target size in physical pixels.
    pub viewport: [f32; 2],
    pub near: f32,
    pub far: f32,
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inv_proj: Mat4::IDENTITY,
            viewport: [1.0, 1.0],
            near: 0.1,
            far: 1000.0,
        }
    }
}

pub const CAMERA_UNIFORMS_BYTES: usize = 208;

const _: () = assert!(std::mem::size_of::<CameraUniforms>() == CAMERA_UNIFORMS_BYTES);

use glam::{Mat4, Vec3};

use super::uniforms::CameraUniforms;

/// Perspective camera described by position and yaw/pitch angles.
///
/// Right-handed, +Y up, looking down -Z at zero yaw and pitch. Depth maps to
/// `[0, 1]` as wgpu expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation about +Y in radians.
    pub yaw: f32,
    /// Rotation above the horizon in radians, clamped short of straight up/down.
    pub pitch: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 6.0, 18.0),
            yaw: 0.0,
            pitch: -0.15,
            fov_y: 45f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub const PITCH_LIMIT: f32 = 1.55;

    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch: pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT),
            ..Default::default()
        }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    /// Unit right vector in the horizontal plane.
    pub fn right(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(cy, 0.0, -sy)
    }

    /// Adds to yaw and pitch; pitch stays inside the limit.
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw = (self.yaw + d_yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + d_pitch).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Updates the aspect ratio from a target size. Zero sizes are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Uniform block for a target of `viewport` physical pixels.
    pub fn uniforms(&self, viewport: [u32; 2]) -> CameraUniforms {
        let view = self.view();
        let proj = self.projection();
        CameraUniforms {
            view_proj: proj * view,
            view,
            inv_proj: proj.inverse(),
            viewport: [viewport[0].max(1) as f32, viewport[1].max(1) as f32],
            near: self.near,
            far: self.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let cam = Camera::new(Vec3::ZERO, 0.0, 0.0);
        assert!(close(cam.forward(), Vec3::NEG_Z));
        assert!(close(cam.right(), Vec3::X));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = Camera::new(Vec3::ZERO, 0.0, 0.0);
        cam.rotate(0.0, 10.0);
        assert_eq!(cam.pitch, Camera::PITCH_LIMIT);
        cam.rotate(0.0, -20.0);
        assert_eq!(cam.pitch, -Camera::PITCH_LIMIT);
    }

    #[test]
    fn near_plane_maps_to_depth_zero() {
        let cam = Camera::new(Vec3::ZERO, 0.0, 0.0);
        let clip = cam.projection() * Vec4::new(0.0, 0.0, -cam.near, 1.0);
        assert!((clip.z / clip.w).abs() < 1e-5);
        let clip = cam.projection() * Vec4::new(0.0, 0.0, -cam.far, 1.0);
        assert!((clip.z / clip.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn uniforms_carry_inverse_projection() {
        let cam = Camera::default();
        let u = cam.uniforms([1280, 720]);
        let p = u.inv_proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let p = p.truncate() / p.w;
        assert!(close(p, Vec3::new(0.0, 0.0, -cam.near)));
        assert_eq!(u.viewport, [1280.0, 720.0]);
        assert_eq!(u.view_proj, cam.projection() * cam.view());
    }

    #[test]
    fn zero_viewport_keeps_aspect() {
        let mut cam = Camera::default();
        let before = cam.aspect;
        cam.set_viewport(0, 100);
        assert_eq!(cam.aspect, before);
        cam.set_viewport(200, 100);
        assert_eq!(cam.aspect, 2.0);
    }
}

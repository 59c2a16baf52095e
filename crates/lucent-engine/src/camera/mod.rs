//! Camera provider.
//!
//! The lighting core only sees [`CameraUniforms`]; it never mutates the camera.

mod controller;
mod perspective;
mod uniforms;

pub use controller::FlyController;
pub use perspective::Camera;
pub use uniforms::{CameraUniforms, CAMERA_UNIFORMS_BYTES};

use glam::Vec3;

use crate::input::{InputFrame, InputState, Key, MouseButton};

use super::perspective::Camera;

/// Fly-camera controller: WASD moves in the view plane, Q/E move down/up,
/// dragging with the right mouse button looks around, the wheel scales speed.
#[derive(Debug, Clone)]
pub struct FlyController {
    /// Units per second.
    pub speed: f32,
    /// Radians per pixel of pointer motion.
    pub sensitivity: f32,
    /// Speed multiplier while Shift is held.
    pub boost: f32,
}

impl Default for FlyController {
    fn default() -> Self {
        Self {
            speed: 6.0,
            sensitivity: 0.004,
            boost: 4.0,
        }
    }
}

impl FlyController {
    /// Applies this frame's input to `camera`. Returns whether the camera changed.
    pub fn update(
        &mut self,
        camera: &mut Camera,
        input: &InputState,
        frame: &InputFrame,
        dt: f32,
    ) -> bool {
        let mut changed = false;

        if frame.wheel_lines != 0.0 {
            self.speed = (self.speed * 1.1f32.powf(frame.wheel_lines)).clamp(0.5, 200.0);
        }

        if input.button_down(MouseButton::Right) {
            let (dx, dy) = frame.pointer_delta;
            if dx != 0.0 || dy != 0.0 {
                camera.rotate(-dx * self.sensitivity, -dy * self.sensitivity);
                changed = true;
            }
        }

        let axis = |pos: Key, neg: Key| -> f32 {
            f32::from(u8::from(input.key_down(pos))) - f32::from(u8::from(input.key_down(neg)))
        };

        let forward = camera.forward();
        let right = camera.right();
        let dir = forward * axis(Key::W, Key::S) + right * axis(Key::D, Key::A)
            + Vec3::Y * axis(Key::E, Key::Q);

        if dir != Vec3::ZERO {
            let boost = if input.modifiers.shift { self.boost } else { 1.0 };
            camera.position += dir.normalize() * self.speed * boost * dt;
            changed = true;
        }

        changed
    }
}

use winit::window::Window;

use crate::device::{Gpu, SurfaceErrorAction};
use crate::error::FrameError;
use crate::input::{InputFrame, InputState};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Window handle for the current frame.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Drawable size in physical pixels. Zero while minimized.
    pub fn physical_size(&self) -> [u32; 2] {
        let size = self.window.inner_size();
        [size.width, size.height]
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl FrameCtx<'_, '_> {
    /// Maps an aborted frame to a loop decision.
    ///
    /// Surface errors go through the surface policy (reconfigure, skip or
    /// exit); a zero-sized target just waits for the next resize.
    pub fn handle_frame_error(&mut self, err: &FrameError) -> AppControl {
        match err {
            FrameError::ResourceAcquisition(surface_err) => {
                match self.gpu.handle_surface_error(surface_err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        AppControl::Continue
                    }
                }
            }
            FrameError::ZeroSizedTarget => {
                log::trace!("frame skipped: zero-sized target");
                AppControl::Continue
            }
        }
    }
}

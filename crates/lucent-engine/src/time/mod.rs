//! Time subsystem.
//!
//! Frame timing independent of the runtime:
//! - one `FrameClock` per render loop
//! - call `tick()` once per frame to obtain `FrameTime`

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};

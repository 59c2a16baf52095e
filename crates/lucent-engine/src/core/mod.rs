//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! applications such as the viewer. It keeps winit and surface handling out of
//! application code and provides a consistent per-frame context.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};

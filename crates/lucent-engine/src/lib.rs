//! Lucent engine crate.
//!
//! Clustered light shading on wgpu: a GPU light set, a view-space cluster grid
//! filled by a compute kernel every frame, and three render strategies (naive,
//! Forward+, clustered deferred) sequenced by one frame orchestrator. The
//! platform and GPU runtime pieces used by the viewer live here too.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod error;
pub mod config;

pub mod lights;
pub mod cluster;
pub mod camera;
pub mod scene;
pub mod render;

pub use config::LightingConfig;
pub use error::{FrameError, LightCountError};

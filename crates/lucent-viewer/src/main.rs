//! Interactive clustered lighting viewer.
//!
//! Keys: `1`/`2`/`3` switch strategy, `Up`/`Down` change the light count
//! (hold `Shift` for bigger steps), `V` validates the GPU cluster buffer,
//! `Escape` quits. Fly with WASD + QE and right-mouse look.

mod viewer;

use lucent_engine::device::GpuInit;
use lucent_engine::logging::{init_logging, LoggingConfig};
use lucent_engine::window::{Runtime, RuntimeConfig};
use lucent_engine::LightingConfig;
use winit::dpi::LogicalSize;

use viewer::Viewer;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Lucent".to_string(),
        initial_size: LogicalSize::new(1280.0, 720.0),
    };

    Runtime::run(config, GpuInit::default(), Viewer::new(LightingConfig::default()))
}

use std::sync::Once;

use log::LevelFilter;

/// Modules quieted to `warn` unless a filter says otherwise. The wgpu stack
/// logs every pipeline and buffer creation at info.
const GPU_STACK_MODULES: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

/// Logger configuration.
///
/// Precedence: `env_filter`, then `RUST_LOG`, then `level` with the
/// `module_levels` overrides.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter syntax, e.g. "lucent_engine=debug,wgpu_core=warn".
    pub env_filter: Option<String>,
    pub level: LevelFilter,
    pub module_levels: Vec<(String, LevelFilter)>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            level: LevelFilter::Info,
            module_levels: GPU_STACK_MODULES
                .iter()
                .map(|m| (m.to_string(), LevelFilter::Warn))
                .collect(),
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// The fallback policy as an `env_logger` filter string.
    pub fn default_filter(&self) -> String {
        let mut filter = self.level.to_string().to_lowercase();
        for (module, level) in &self.module_levels {
            filter.push_str(&format!(",{module}={}", level.to_string().to_lowercase()));
        }
        filter
    }

    fn effective_filter(&self) -> String {
        self.env_filter
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.default_filter())
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.effective_filter();
        env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .init();

        log::debug!("logging initialized with filter {filter:?}");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_quiets_the_gpu_stack() {
        let filter = LoggingConfig::default().default_filter();
        assert_eq!(filter, "info,wgpu_core=warn,wgpu_hal=warn,naga=warn");
    }

    #[test]
    fn module_levels_follow_the_base_level() {
        let mut config = LoggingConfig {
            level: LevelFilter::Warn,
            ..Default::default()
        };
        config
            .module_levels
            .push(("lucent_engine".into(), LevelFilter::Debug));
        let filter = config.default_filter();
        assert!(filter.starts_with("warn,wgpu_core=warn"));
        assert!(filter.ends_with(",lucent_engine=debug"));
    }

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig {
            env_filter: Some("trace".into()),
            ..Default::default()
        };
        assert_eq!(config.effective_filter(), "trace");
    }
}

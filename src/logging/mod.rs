use slog::{o, Drain, Logger};
use slog_async::Async;
use slog_term::{FullFormat, TermDecorator};

/// Knobs for the service-layer logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub async_buffer_size: usize,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            async_buffer_size: 1024,
            use_color: true,
        }
    }
}

/// Builds the root slog logger used by the service layer. HTTP-level
/// telemetry goes through `tracing` instead; this logger carries the
/// per-service business log lines.
pub fn setup_logger(config: LoggerConfig) -> Logger {
    let decorator = if config.use_color {
        TermDecorator::new().force_color().build()
    } else {
        TermDecorator::new().build()
    };

    let drain = FullFormat::new(decorator).build().fuse();
    let drain = Async::new(drain)
        .chan_size(config.async_buffer_size)
        .build()
        .fuse();

    Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// Derives a child logger tagged with a component name
pub fn component_logger(base: &Logger, component: &'static str) -> Logger {
    base.new(o!("component" => component))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_logger_accepts_discard_root() {
        let base = Logger::root(slog::Discard, o!());
        let child = component_logger(&base, "scheduling_service");
        slog::info!(child, "test message"; "key" => 1);
    }
}

//! The `log` facade backend.

use std::sync::Arc;

use log::{Log, Metadata, Record};

use crate::config::LoggerConfig;
use crate::error::ConfigError;
use crate::event::LogEvent;
use crate::renderer::LineRenderer;
use crate::sink::{open_target, LineSink};
use crate::terminal::ConsoleProbe;

/// Renders records from the `log` macros and writes them to a sink.
pub struct TtyLogger {
    renderer: LineRenderer,
    sink: Box<dyn LineSink>,
}

impl TtyLogger {
    pub fn new(renderer: LineRenderer, sink: Box<dyn LineSink>) -> Self {
        Self { renderer, sink }
    }

    pub fn renderer(&self) -> &LineRenderer {
        &self.renderer
    }

    /// Renders and writes an event built by hand, which can carry arguments,
    /// markers and an error that the `log` macros have no room for.
    ///
    /// Events below the configured level are dropped.
    pub fn log_event(&self, event: &LogEvent<'_>) {
        if event.level > self.renderer.config().level() {
            return;
        }
        if let Some(line) = self.renderer.render_line(event) {
            // Nowhere left to report a failing sink.
            let _ = self.sink.write_line(&line);
        }
    }
}

impl Log for TtyLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.renderer.config().level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Already formatted by the macro; braces in it are literal.
        let message = record.args().to_string();
        let pattern = message.replace("{}", "\\{}");
        self.log_event(&LogEvent::new(record.level(), record.target(), &pattern));
    }

    fn flush(&self) {}
}

/// Installs a [`TtyLogger`] for `config` as the global logger.
///
/// The sink is opened from the configured target and the terminal is probed
/// through the console.
///
/// ```rust,no_run
/// let config = ttyline_render::LoggerConfig::from_file("logging.yaml").unwrap();
/// ttyline_render::init(config).unwrap();
/// log::info!("ready");
/// ```
pub fn init(config: LoggerConfig) -> Result<(), ConfigError> {
    let level = config.level();
    let sink = open_target(&config)?;
    let renderer = LineRenderer::new(Arc::new(config), Arc::new(ConsoleProbe));
    log::set_boxed_logger(Box::new(TtyLogger::new(renderer, sink)))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use crate::output::OutputMode;
    use crate::sink::MemorySink;
    use crate::terminal::FixedProbe;
    use log::{Level, LevelFilter};

    fn logger(level: LevelFilter) -> (TtyLogger, MemorySink) {
        let config = LoggerConfig::builder()
            .mode(OutputMode::Plain)
            .level(level)
            .field(FieldSpec::new("level").width(5))
            .field(FieldSpec::new("name").width(8))
            .build()
            .unwrap();
        let renderer = LineRenderer::new(Arc::new(config), Arc::new(FixedProbe::new(30)));
        let sink = MemorySink::new();
        (TtyLogger::new(renderer, Box::new(sink.clone())), sink)
    }

    #[test]
    fn records_are_rendered() {
        let (logger, sink) = logger(LevelFilter::Info);
        logger.log(
            &Record::builder()
                .args(format_args!("loaded {} rows", 12))
                .level(Level::Info)
                .target("app::db")
                .build(),
        );
        assert_eq!(sink.lines(), ["INFO  app::db  loaded 12 rows "]);
    }

    #[test]
    fn braces_in_messages_are_literal() {
        let (logger, sink) = logger(LevelFilter::Info);
        logger.log(
            &Record::builder()
                .args(format_args!("map {{}} and {}", "@{x}"))
                .level(Level::Warn)
                .target("app")
                .build(),
        );
        assert_eq!(sink.lines(), ["WARN  app      map {} and @{x}"]);
    }

    #[test]
    fn level_filter_applies() {
        let (logger, sink) = logger(LevelFilter::Warn);
        let metadata = Metadata::builder().level(Level::Info).build();
        assert!(!logger.enabled(&metadata));

        logger.log(
            &Record::builder()
                .args(format_args!("quiet"))
                .level(Level::Debug)
                .target("app")
                .build(),
        );
        logger.log_event(&LogEvent::new(Level::Info, "app", "quiet"));
        assert!(sink.contents().is_empty());
    }

    #[test]
    fn events_carry_errors() {
        let (logger, sink) = logger(LevelFilter::Trace);
        let error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        logger.log_event(&LogEvent::new(Level::Error, "app", "save failed").error(&error));
        assert_eq!(
            sink.contents(),
            "ERROR app      save failed    \nError: disk full\n"
        );
    }
}

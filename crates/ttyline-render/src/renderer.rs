//! Rendering one log event into one line.

use std::error::Error;
use std::sync::Arc;

use console::Style;
use serde::ser::{Serialize, SerializeMap, Serializer};
use ttyline_markup::{escape, evaluate, StyledText};

use crate::clock::{Clock, SystemClock};
use crate::compositor::FieldCompositor;
use crate::config::{LineFormat, LoggerConfig};
use crate::event::{thread_id, thread_name, LogEvent};
use crate::field::FieldKind;
use crate::format::{BraceFormatter, MessageFormatter};
use crate::guard::ReentrancyGuard;
use crate::layout::LayoutCache;
use crate::terminal::{effective_width, TerminalProbe};

/// A finished line and the optional error report printed after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// The line, without a trailing newline.
    pub line: String,
    /// Newline-terminated report lines.
    pub trailer: Option<String>,
}

/// Renders events according to one configuration.
///
/// ```rust
/// use std::sync::Arc;
/// use log::Level;
/// use ttyline_render::{FieldSpec, FixedProbe, LineRenderer, LogEvent, LoggerConfig, OutputMode};
///
/// let config = LoggerConfig::builder()
///     .mode(OutputMode::Plain)
///     .field(FieldSpec::new("level").width(5))
///     .field(FieldSpec::new("name").width(6))
///     .build()
///     .unwrap();
/// let renderer = LineRenderer::new(Arc::new(config), Arc::new(FixedProbe::new(24)));
///
/// let line = renderer
///     .render_line(&LogEvent::new(Level::Info, "db", "up in {}s").args(&[&3]))
///     .unwrap();
/// assert_eq!(line.line, "INFO  db     up in 3s   ");
/// ```
pub struct LineRenderer {
    config: Arc<LoggerConfig>,
    probe: Arc<dyn TerminalProbe>,
    clock: Arc<dyn Clock>,
    formatter: Arc<dyn MessageFormatter>,
    compositor: FieldCompositor,
    cache: LayoutCache,
}

impl LineRenderer {
    pub fn new(config: Arc<LoggerConfig>, probe: Arc<dyn TerminalProbe>) -> Self {
        let compositor = FieldCompositor::new(config.expression(), config.gap());
        Self {
            config,
            probe,
            clock: Arc::new(SystemClock::new()),
            formatter: Arc::new(BraceFormatter),
            compositor,
            cache: LayoutCache::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn MessageFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn layout_cache(&self) -> &LayoutCache {
        &self.cache
    }

    /// Renders `event`, or returns `None` when called from inside another
    /// render on the same thread.
    pub fn render_line(&self, event: &LogEvent<'_>) -> Option<RenderedLine> {
        let _guard = ReentrancyGuard::enter()?;
        Some(match self.config.format() {
            LineFormat::Tty => self.render_tty(event),
            LineFormat::Json => self.render_json(event),
        })
    }

    fn render_tty(&self, event: &LogEvent<'_>) -> RenderedLine {
        let config = &self.config;
        let width = effective_width(config.width(), &*self.probe, config.fallback_width());
        let plan = self.cache.get_or_plan(config.layout(), width, config.gap());
        let ansi = config.mode().use_ansi(&*self.probe);

        let level_style = config.level_style(event.level);
        let default_style = config.style_as_level().then_some(level_style);

        let mut line = StyledText::new();
        for (i, field) in config.layout().iter().enumerate() {
            let kind = field.kind();
            let allocated = plan.get(&field.name).unwrap_or(1);
            let value = self.markup_value(kind, event);
            let style = match kind {
                FieldKind::Level => Some(level_style),
                _ => default_style,
            };
            self.compositor
                .render(field, &value, allocated, style, i == 0, &mut line);
        }

        RenderedLine {
            line: line.render(ansi),
            trailer: event.error.map(|error| error_trailer(error, ansi)),
        }
    }

    fn render_json(&self, event: &LogEvent<'_>) -> RenderedLine {
        let mut entries: Vec<(String, String)> = self
            .config
            .layout()
            .iter()
            .map(|field| (field.name.clone(), self.plain_value(field.kind(), event)))
            .collect();
        entries.push(("pattern".to_string(), event.pattern.to_string()));
        for (i, arg) in event.args.iter().enumerate() {
            entries.push((format!("arg{}", i), arg.to_string()));
        }

        let line = serde_json::to_string(&JsonLine(&entries)).unwrap_or_else(|err| {
            format!("{{\"error\":{:?}}}", err.to_string())
        });
        RenderedLine {
            line,
            trailer: None,
        }
    }

    /// The field value as markup, ready for the field's templates.
    fn markup_value(&self, kind: FieldKind, event: &LogEvent<'_>) -> String {
        match kind {
            FieldKind::Level => self.config.level_text(event.level).to_string(),
            FieldKind::Message => self.formatter.format(
                event.pattern,
                event.args,
                self.config.parameter_style(),
            ),
            FieldKind::ThreadId => thread_id().to_string(),
            _ => escape(&self.plain_value(kind, event)),
        }
    }

    /// The field value as plain text.
    fn plain_value(&self, kind: FieldKind, event: &LogEvent<'_>) -> String {
        match kind {
            FieldKind::DateTime => self.config.date_format().render(&*self.clock),
            FieldKind::ThreadName => thread_name(),
            FieldKind::ThreadId => thread_id().to_string(),
            FieldKind::Level => event.level.as_str().to_string(),
            FieldKind::ShortName => event.short_name().to_string(),
            FieldKind::Name => event.logger.to_string(),
            FieldKind::Message => {
                evaluate(&self.formatter.format(event.pattern, event.args, None)).plain()
            }
            FieldKind::Markers => event.markers.join(","),
            FieldKind::Custom => String::new(),
        }
    }
}

/// Ordered JSON object.
struct JsonLine<'a>(&'a [(String, String)]);

impl Serialize for JsonLine<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Reports `error` and its chain of sources, one per line.
///
/// ```text
/// Error: request failed
///         Caused by: connection reset
///           Caused by: broken pipe
/// ```
pub fn error_trailer(error: &(dyn Error + 'static), ansi: bool) -> String {
    let style = Style::new().red().bold().force_styling(true);
    let paint = |text: String| {
        if ansi {
            style.apply_to(text).to_string()
        } else {
            text
        }
    };

    let mut out = paint(format!("Error: {}", error));
    out.push('\n');

    let mut depth = 1;
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(&" ".repeat(8 + 2 * (depth - 1)));
        out.push_str(&paint(format!("Caused by: {}", cause)));
        out.push('\n');
        depth += 1;
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use crate::output::OutputMode;
    use crate::terminal::FixedProbe;
    use log::Level;
    use std::fmt;
    use std::time::Duration;

    #[derive(Debug)]
    struct Chained(&'static str, Option<Box<Chained>>);

    impl fmt::Display for Chained {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl Error for Chained {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.1.as_deref().map(|e| e as &(dyn Error + 'static))
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> chrono::DateTime<chrono::Local> {
            chrono::Local::now()
        }

        fn elapsed(&self) -> Duration {
            Duration::from_millis(42)
        }
    }

    fn plain_config() -> crate::config::LoggerConfigBuilder {
        LoggerConfig::builder()
            .mode(OutputMode::Plain)
            .field(FieldSpec::new("level").width(8))
            .field(FieldSpec::new("name").width(10))
    }

    fn renderer(config: LoggerConfig, width: usize) -> LineRenderer {
        LineRenderer::new(Arc::new(config), Arc::new(FixedProbe::new(width)))
            .with_clock(Arc::new(FixedClock))
    }

    #[test]
    fn plain_line_fills_width() {
        let r = renderer(plain_config().build().unwrap(), 40);
        let line = r.render_line(&LogEvent::new(Level::Info, "app", "hi")).unwrap();
        assert_eq!(line.line, format!("INFO     app        hi{}", " ".repeat(18)));
        assert_eq!(line.line.len(), 40);
        assert_eq!(line.trailer, None);
    }

    #[test]
    fn long_message_is_truncated() {
        let r = renderer(plain_config().build().unwrap(), 30);
        let line = r
            .render_line(&LogEvent::new(Level::Warn, "app", "this message is far too long"))
            .unwrap();
        assert_eq!(line.line, "WARN     app        this mess…");
    }

    #[test]
    fn ansi_mode_styles_level() {
        let config = plain_config().mode(OutputMode::Ansi).build().unwrap();
        let r = renderer(config, 40);
        let line = r.render_line(&LogEvent::new(Level::Error, "app", "x")).unwrap();
        assert!(line.line.starts_with("\x1b[31m\x1b[1mERROR"));
        assert!(line.line.contains("app"));
    }

    #[test]
    fn auto_mode_follows_probe() {
        let config = Arc::new(plain_config().mode(OutputMode::Auto).build().unwrap());
        let tty = LineRenderer::new(Arc::clone(&config), Arc::new(FixedProbe::new(40).ansi(true)));
        let pipe = LineRenderer::new(config, Arc::new(FixedProbe::new(40)));
        let event = LogEvent::new(Level::Info, "app", "x");
        assert!(tty.render_line(&event).unwrap().line.contains('\x1b'));
        assert!(!pipe.render_line(&event).unwrap().line.contains('\x1b'));
    }

    #[test]
    fn parameter_style_applies_in_ansi() {
        let config = plain_config().mode(OutputMode::Ansi).build().unwrap();
        let r = renderer(config, 40);
        let line = r
            .render_line(&LogEvent::new(Level::Info, "app", "n={}").args(&[&7]))
            .unwrap();
        assert!(line.line.contains("n=\x1b[1m7\x1b[0m"));
    }

    #[test]
    fn style_as_level_wraps_every_field() {
        let config = plain_config()
            .mode(OutputMode::Ansi)
            .style_as_level(true)
            .parameter_style(None)
            .build()
            .unwrap();
        let r = renderer(config, 40);
        let line = r.render_line(&LogEvent::new(Level::Info, "app", "hi")).unwrap();
        assert!(line.line.contains("\x1b[34mapp"));
        assert!(line.line.contains("\x1b[34mhi"));
    }

    #[test]
    fn values_are_not_markup() {
        let r = renderer(plain_config().build().unwrap(), 40);
        let line = r
            .render_line(&LogEvent::new(Level::Info, "a@{b}", "x {}").args(&[&"@{bold y}"]))
            .unwrap();
        assert!(line.line.contains("a@{b}"));
        assert!(line.line.contains("x @{bold y}"));
    }

    #[test]
    fn all_field_kinds() {
        let config = LoggerConfig::builder()
            .mode(OutputMode::Plain)
            .gap(1)
            .field(FieldSpec::new("date-time").width(4).right())
            .field(FieldSpec::new("short-name").width(4))
            .field(FieldSpec::new("markers").width(7))
            .field(FieldSpec::new("spacer").width(2).decoration("|${spacer}"))
            .field(FieldSpec::new("message"))
            .layout(["date-time", "short-name", "markers", "spacer", "message"])
            .build()
            .unwrap();
        let r = renderer(config, 30);
        let line = r
            .render_line(&LogEvent::new(Level::Info, "app::db", "ok").markers(&["A", "B"]))
            .unwrap();
        assert_eq!(line.line, "  42 db   A,B     |  ok       ");
    }

    #[test]
    fn unformattable_date_pattern_renders_elapsed() {
        let config = LoggerConfig::builder()
            .mode(OutputMode::Plain)
            .date_format(crate::clock::DateTimeFormat::Pattern("%Q".into()))
            .field(FieldSpec::new("date-time").width(4).right())
            .layout(["date-time", "message"])
            .build()
            .unwrap();
        let r = renderer(config, 10);
        let line = r.render_line(&LogEvent::new(Level::Info, "app", "hi")).unwrap();
        assert_eq!(line.line, "  42 hi   ");
    }

    #[test]
    fn empty_first_field_keeps_gap() {
        let config = LoggerConfig::builder()
            .mode(OutputMode::Plain)
            .field(FieldSpec::new("markers").width(1).center())
            .layout(["markers", "message"])
            .build()
            .unwrap();
        let r = renderer(config, 6);
        let line = r.render_line(&LogEvent::new(Level::Info, "app", "hi")).unwrap();
        assert_eq!(line.line, " hi  ");
    }

    #[test]
    fn width_falls_back_when_probe_fails() {
        let config = plain_config().fallback_width(30).build().unwrap();
        let r = LineRenderer::new(Arc::new(config), Arc::new(FixedProbe::unknown()));
        let line = r.render_line(&LogEvent::new(Level::Info, "app", "hi")).unwrap();
        assert_eq!(line.line.len(), 30);
    }

    #[test]
    fn layout_is_cached_per_width() {
        let r = renderer(plain_config().build().unwrap(), 40);
        let event = LogEvent::new(Level::Info, "app", "hi");
        r.render_line(&event);
        r.render_line(&event);
        assert_eq!(r.layout_cache().rebuilds(), 1);
    }

    #[test]
    fn reentrant_render_is_dropped() {
        let r = renderer(plain_config().build().unwrap(), 40);
        let _outer = ReentrancyGuard::enter();
        assert_eq!(r.render_line(&LogEvent::new(Level::Info, "app", "hi")), None);
    }

    #[test]
    fn error_chain_trailer() {
        let error = Chained(
            "request failed",
            Some(Box::new(Chained(
                "connection reset",
                Some(Box::new(Chained("broken pipe", None))),
            ))),
        );
        assert_eq!(
            error_trailer(&error, false),
            "Error: request failed\n        Caused by: connection reset\n          Caused by: broken pipe\n"
        );
        assert_eq!(
            error_trailer(&Chained("x", None), true),
            "\x1b[31m\x1b[1mError: x\x1b[0m\n"
        );

        let r = renderer(plain_config().build().unwrap(), 40);
        let line = r
            .render_line(&LogEvent::new(Level::Error, "app", "oops").error(&error))
            .unwrap();
        assert!(line.trailer.unwrap().starts_with("Error: request failed\n"));
    }

    #[test]
    fn json_line() {
        let config = plain_config()
            .format(LineFormat::Json)
            .layout(["level", "name", "message", "date-time"])
            .build()
            .unwrap();
        let r = renderer(config, 40);
        let error = Chained("ignored", None);
        let line = r
            .render_line(
                &LogEvent::new(Level::Warn, "app::db", "took {} ms \"{}\"")
                    .args(&[&12, &"q"])
                    .error(&error),
            )
            .unwrap();
        assert_eq!(
            line.line,
            r#"{"level":"WARN","name":"app::db","message":"took 12 ms \"q\"","date-time":"42","pattern":"took {} ms \"{}\"","arg0":"12","arg1":"q"}"#
        );
        assert_eq!(line.trailer, None);
    }
}

//! Logger configuration.
//!
//! A [`LoggerConfig`] is built once, validated, and then shared read-only by
//! every log call. It can be loaded from YAML or assembled with
//! [`LoggerConfig::builder`]:
//!
//! ```yaml
//! output:
//!   mode: auto              # auto | ansi | plain
//!   format: tty             # tty | json
//!   level: info             # trace | debug | info | warn | error | off
//!   style-as-level: false
//!   gap: 1
//!   width: 0                # 0 probes the terminal
//!   fallback-width: 80
//!   ellipsis: "…"
//!   parameter-style: "@{bold ${arg}}"
//!   target: stderr          # stderr | stdout | file
//!   log-file: ~/logs/app.log
//!   layout: [date-time, level, short-name, message]
//! levels:
//!   WARN: { text: "WARN", style: "@{fg:yellow,bold ${text}}" }
//! fields:
//!   level: { width: 7, align: center, decoration: "[${level}]" }
//!   date-time: { width: 8, format: "%H:%M:%S" }
//! styles:
//!   accent: "fg:magenta,bold"
//! ```
//!
//! Every section and key is optional.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use log::{Level, LevelFilter};
use serde::Deserialize;
use ttyline_markup::{SpecResolver, StyleExpression, StyleResolver};

use crate::clock::{DateTimeFormat, DateTimeKind};
use crate::error::ConfigError;
use crate::field::{Align, FieldKind, FieldSpec};
use crate::output::OutputMode;

/// How each event is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineFormat {
    /// A fixed-width terminal line.
    #[default]
    Tty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LineFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tty" | "text" => Ok(LineFormat::Tty),
            "json" => Ok(LineFormat::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Where lines are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    Stderr,
    Stdout,
    File(PathBuf),
}

/// Text and style template for one level. The style template receives the
/// field template at `${text}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelStyle {
    pub text: String,
    pub style: String,
}

impl LevelStyle {
    pub fn new(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: style.into(),
        }
    }
}

/// Parses a level threshold name.
pub fn parse_level_filter(s: &str) -> Result<LevelFilter, ConfigError> {
    LevelFilter::from_str(s.trim()).map_err(|_| ConfigError::UnknownLevel(s.to_string()))
}

fn parse_level(s: &str) -> Result<Level, ConfigError> {
    Level::from_str(s.trim()).map_err(|_| ConfigError::UnknownLevel(s.to_string()))
}

fn default_level_style(level: Level) -> LevelStyle {
    match level {
        Level::Error => LevelStyle::new("ERROR", "@{fg:red,bold ${text}}"),
        Level::Warn => LevelStyle::new("WARN", "@{fg:yellow,bold ${text}}"),
        Level::Info => LevelStyle::new("INFO", "@{fg:blue ${text}}"),
        Level::Debug => LevelStyle::new("DEBUG", "@{fg:cyan ${text}}"),
        Level::Trace => LevelStyle::new("TRACE", "@{faint ${text}}"),
    }
}

fn default_fields() -> BTreeMap<String, FieldSpec> {
    [
        FieldSpec::new("date-time").width(10).right(),
        FieldSpec::new("thread-name").width(12),
        FieldSpec::new("thread-id").width(4).right(),
        FieldSpec::new("level").width(5),
        FieldSpec::new("short-name").width(12),
        FieldSpec::new("name").width(24),
        FieldSpec::new("message"),
        FieldSpec::new("markers").width(10),
    ]
    .into_iter()
    .map(|field| (field.name.clone(), field))
    .collect()
}

/// Validated, immutable logger configuration.
pub struct LoggerConfig {
    mode: OutputMode,
    format: LineFormat,
    level: LevelFilter,
    style_as_level: bool,
    gap: usize,
    width: usize,
    fallback_width: usize,
    ellipsis: String,
    parameter_style: Option<String>,
    target: Target,
    layout: Vec<FieldSpec>,
    levels: HashMap<Level, LevelStyle>,
    date_format: DateTimeFormat,
    resolver: Arc<dyn StyleResolver>,
}

impl std::fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("mode", &self.mode)
            .field("format", &self.format)
            .field("level", &self.level)
            .field("gap", &self.gap)
            .field("width", &self.width)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfigBuilder::default().assemble()
    }
}

impl LoggerConfig {
    pub fn builder() -> LoggerConfigBuilder {
        LoggerConfigBuilder::default()
    }

    /// Loads a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, and any other
    /// [`ConfigError`] if it does not parse or validate.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parses and validates a YAML configuration document.
    ///
    /// ```rust
    /// use ttyline_render::{LoggerConfig, OutputMode};
    ///
    /// let config = LoggerConfig::from_yaml("output: { mode: plain, gap: 2 }").unwrap();
    /// assert_eq!(config.mode(), OutputMode::Plain);
    /// assert_eq!(config.gap(), 2);
    ///
    /// assert!(LoggerConfig::from_yaml("output: { mode: sparkly }").is_err());
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = if yaml.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        raw.into_builder()?.build()
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn format(&self) -> LineFormat {
        self.format
    }

    /// Threshold handed to the `log` facade.
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Whether every field is wrapped in its level's style.
    pub fn style_as_level(&self) -> bool {
        self.style_as_level
    }

    pub fn gap(&self) -> usize {
        self.gap
    }

    /// Configured width; `0` means the terminal is probed.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn fallback_width(&self) -> usize {
        self.fallback_width
    }

    pub fn ellipsis(&self) -> &str {
        &self.ellipsis
    }

    pub fn parameter_style(&self) -> Option<&str> {
        self.parameter_style.as_deref()
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Field specifications in layout order.
    pub fn layout(&self) -> &[FieldSpec] {
        &self.layout
    }

    pub fn level_style(&self, level: Level) -> &str {
        self.levels
            .get(&level)
            .map(|l| l.style.as_str())
            .unwrap_or("${text}")
    }

    pub fn level_text(&self, level: Level) -> &str {
        self.levels
            .get(&level)
            .map(|l| l.text.as_str())
            .unwrap_or_else(|| level.as_str())
    }

    pub fn date_format(&self) -> &DateTimeFormat {
        &self.date_format
    }

    pub fn resolver(&self) -> &Arc<dyn StyleResolver> {
        &self.resolver
    }

    /// An evaluator using this configuration's resolver and ellipsis.
    pub fn expression(&self) -> StyleExpression {
        StyleExpression::new(Arc::clone(&self.resolver)).ellipsis(self.ellipsis.clone())
    }
}

/// Builder for [`LoggerConfig`].
///
/// ```rust
/// use ttyline_render::{FieldSpec, LoggerConfig, OutputMode};
///
/// let config = LoggerConfig::builder()
///     .mode(OutputMode::Plain)
///     .width(40)
///     .field(FieldSpec::new("level").width(8))
///     .field(FieldSpec::new("name").width(10))
///     .layout(["level", "name", "message"])
///     .build()
///     .unwrap();
/// assert_eq!(config.layout().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct LoggerConfigBuilder {
    mode: OutputMode,
    format: LineFormat,
    level: LevelFilter,
    style_as_level: bool,
    gap: usize,
    width: usize,
    fallback_width: usize,
    ellipsis: String,
    parameter_style: Option<String>,
    target: Target,
    layout: Vec<String>,
    fields: BTreeMap<String, FieldSpec>,
    levels: HashMap<Level, LevelStyle>,
    date_format: DateTimeFormat,
    resolver: SpecResolver,
}

impl Default for LoggerConfigBuilder {
    fn default() -> Self {
        Self {
            mode: OutputMode::Auto,
            format: LineFormat::Tty,
            level: LevelFilter::Info,
            style_as_level: false,
            gap: 1,
            width: 0,
            fallback_width: 80,
            ellipsis: "…".to_string(),
            parameter_style: Some("@{bold ${arg}}".to_string()),
            target: Target::Stderr,
            layout: vec!["level".into(), "name".into(), "message".into()],
            fields: default_fields(),
            levels: log::Level::iter()
                .map(|level| (level, default_level_style(level)))
                .collect(),
            date_format: DateTimeFormat::Timestamp,
            resolver: SpecResolver::new(),
        }
    }
}

impl LoggerConfigBuilder {
    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn format(mut self, format: LineFormat) -> Self {
        self.format = format;
        self
    }

    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn style_as_level(mut self, enabled: bool) -> Self {
        self.style_as_level = enabled;
        self
    }

    pub fn gap(mut self, gap: usize) -> Self {
        self.gap = gap;
        self
    }

    /// Fixed line width; `0` probes the terminal.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn fallback_width(mut self, width: usize) -> Self {
        self.fallback_width = width;
        self
    }

    pub fn ellipsis(mut self, ellipsis: impl Into<String>) -> Self {
        self.ellipsis = ellipsis.into();
        self
    }

    /// Template wrapping each substituted message argument; `None` leaves
    /// arguments unstyled.
    pub fn parameter_style(mut self, style: Option<String>) -> Self {
        self.parameter_style = style;
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn layout<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layout = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Adds or replaces a field specification.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn level_style(mut self, level: Level, style: LevelStyle) -> Self {
        self.levels.insert(level, style);
        self
    }

    pub fn date_format(mut self, format: DateTimeFormat) -> Self {
        self.date_format = format;
        self
    }

    /// Registers a named style usable in any template.
    pub fn style(mut self, name: impl Into<String>, spec: impl Into<String>) -> Self {
        self.resolver = self.resolver.with_style(name, spec);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingField`] if the layout names an unknown field
    /// - [`ConfigError::DuplicateField`] if the layout repeats a field
    /// - [`ConfigError::MissingLogFile`] for a file target with an empty path
    pub fn build(self) -> Result<LoggerConfig, ConfigError> {
        let mut seen = HashSet::new();
        for name in &self.layout {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateField(name.clone()));
            }
            if !self.fields.contains_key(name) {
                return Err(ConfigError::MissingField(name.clone()));
            }
        }
        if let Target::File(path) = &self.target {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::MissingLogFile);
            }
        }
        Ok(self.assemble())
    }

    fn assemble(mut self) -> LoggerConfig {
        let layout = self
            .layout
            .iter()
            .filter_map(|name| self.fields.remove(name))
            .collect();
        LoggerConfig {
            mode: self.mode,
            format: self.format,
            level: self.level,
            style_as_level: self.style_as_level,
            gap: self.gap,
            width: self.width,
            fallback_width: self.fallback_width,
            ellipsis: self.ellipsis,
            parameter_style: self.parameter_style,
            target: self.target,
            layout,
            levels: self.levels,
            date_format: self.date_format,
            resolver: Arc::new(self.resolver),
        }
    }
}

// ============================================================================
// YAML document
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    output: RawOutput,
    levels: BTreeMap<String, RawLevel>,
    fields: BTreeMap<String, RawField>,
    styles: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
struct RawOutput {
    mode: Option<String>,
    format: Option<String>,
    level: Option<String>,
    style_as_level: Option<bool>,
    gap: Option<usize>,
    width: Option<usize>,
    fallback_width: Option<usize>,
    ellipsis: Option<String>,
    parameter_style: Option<String>,
    target: Option<String>,
    log_file: Option<String>,
    layout: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawLevel {
    text: Option<String>,
    style: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawField {
    width: Option<usize>,
    align: Option<Align>,
    style: Option<String>,
    decoration: Option<String>,
    format: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl RawConfig {
    fn into_builder(self) -> Result<LoggerConfigBuilder, ConfigError> {
        let mut builder = LoggerConfigBuilder::default();
        let output = self.output;

        if let Some(mode) = output.mode {
            builder = builder.mode(mode.parse()?);
        }
        if let Some(format) = output.format {
            builder = builder.format(format.parse()?);
        }
        if let Some(level) = output.level {
            builder = builder.level(parse_level_filter(&level)?);
        }
        if let Some(enabled) = output.style_as_level {
            builder = builder.style_as_level(enabled);
        }
        if let Some(gap) = output.gap {
            builder = builder.gap(gap);
        }
        if let Some(width) = output.width {
            builder = builder.width(width);
        }
        if let Some(width) = output.fallback_width {
            builder = builder.fallback_width(width);
        }
        if let Some(ellipsis) = output.ellipsis {
            builder = builder.ellipsis(ellipsis);
        }
        if let Some(style) = output.parameter_style {
            builder = builder.parameter_style(Some(style).filter(|s| !s.is_empty()));
        }
        if let Some(layout) = output.layout {
            builder = builder.layout(layout);
        }
        builder = builder.target(parse_target(
            output.target.as_deref(),
            output.log_file.as_deref(),
        )?);

        for (name, raw) in self.levels {
            let level = parse_level(&name)?;
            let default = default_level_style(level);
            builder = builder.level_style(
                level,
                LevelStyle {
                    text: raw.text.unwrap_or(default.text),
                    style: raw.style.unwrap_or(default.style),
                },
            );
        }

        for (name, raw) in self.fields {
            if FieldKind::from_name(&name) == FieldKind::DateTime {
                if let Some(format) = &raw.format {
                    let kind = match &raw.kind {
                        Some(kind) => kind.parse::<DateTimeKind>().unwrap_or_else(|e| {
                            log::warn!("{}; using date and time", e);
                            DateTimeKind::DateTime
                        }),
                        None => DateTimeKind::DateTime,
                    };
                    builder = builder.date_format(DateTimeFormat::parse(format, kind));
                }
            }

            let mut field = builder
                .fields
                .get(&name)
                .cloned()
                .unwrap_or_else(|| FieldSpec::new(name.clone()));
            if let Some(width) = raw.width {
                field = field.width(width);
            }
            if let Some(align) = raw.align {
                field = field.align(align);
            }
            if let Some(style) = raw.style {
                field = field.style(style);
            }
            if let Some(decoration) = raw.decoration {
                field = field.decoration(decoration);
            }
            builder = builder.field(field);
        }

        for (name, spec) in self.styles {
            builder = builder.style(name, spec);
        }

        Ok(builder)
    }
}

fn parse_target(target: Option<&str>, log_file: Option<&str>) -> Result<Target, ConfigError> {
    let log_file = log_file.map(str::trim).filter(|f| !f.is_empty());
    match target.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
        None | Some("stderr") => Ok(Target::Stderr),
        Some("stdout") => Ok(Target::Stdout),
        Some("file") => log_file
            .map(|f| Target::File(PathBuf::from(f)))
            .ok_or(ConfigError::MissingLogFile),
        Some(_) => Err(ConfigError::UnknownTarget(target.unwrap_or_default().to_string())),
    }
}

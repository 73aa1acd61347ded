//! # Ttyline Render - Fixed-Width Log Lines for the Terminal
//!
//! `ttyline-render` turns one log event into one line that exactly fills the
//! terminal: every field gets a column, values are padded or truncated to
//! it, and styles written as `@{style text}` markup become ANSI escapes when
//! the terminal understands them.
//!
//! ## Core Concepts
//!
//! - [`FieldSpec`]: one column, with a width, an alignment, a style template
//!   and a decoration template
//! - [`layout::plan`]: splits the terminal width between the columns
//! - [`FieldCompositor`]: fills one column from a value
//! - [`LineRenderer`]: renders a whole [`LogEvent`]
//! - [`LoggerConfig`]: everything above, loadable from YAML
//! - [`TtyLogger`] and [`init`]: the backend for the `log` macros
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use log::Level;
//! use ttyline_render::{FieldSpec, FixedProbe, LineRenderer, LogEvent, LoggerConfig, OutputMode};
//!
//! let config = LoggerConfig::builder()
//!     .mode(OutputMode::Plain)
//!     .field(FieldSpec::new("level").width(8))
//!     .field(FieldSpec::new("name").width(10))
//!     .layout(["level", "name", "message"])
//!     .build()
//!     .unwrap();
//!
//! let renderer = LineRenderer::new(Arc::new(config), Arc::new(FixedProbe::new(40)));
//! let line = renderer.render_line(&LogEvent::new(Level::Info, "app", "hi")).unwrap();
//! assert_eq!(line.line, format!("INFO     app        hi{}", " ".repeat(18)));
//! ```
//!
//! ## Layout
//!
//! Fixed-width columns keep their width. The remaining space, after one gap
//! between neighbouring columns, is shared among the auto columns (width
//! `0`). When the columns do not fit, they give up one column each in turn
//! until they do, but none goes below one.
//!
//! ```rust
//! use ttyline_render::{layout::plan, FieldSpec};
//!
//! let fields = [FieldSpec::new("level").width(5), FieldSpec::new("message")];
//! let plan = plan(&fields, 30, 1);
//! assert_eq!(plan.get("message"), Some(24));
//! ```
//!
//! ## Output Modes
//!
//! [`OutputMode::Auto`] asks the terminal whether it supports colors.
//! `Ansi` and `Plain` force the decision either way. Plain output has the same
//! layout as styled output, only without escapes.
//!
//! ## Configuration Files
//!
//! ```yaml
//! output:
//!   mode: auto
//!   level: debug
//!   layout: [date-time, level, short-name, message]
//! fields:
//!   level:
//!     width: 7
//!     decoration: "[${level}]"
//!   date-time:
//!     width: 12
//!     format: "%H:%M:%S%.3f"
//! levels:
//!   warn:
//!     text: WARNING
//! styles:
//!   accent: fg:magenta,bold
//! ```
//!
//! [`LoggerConfig::from_file`] and [`LoggerConfig::from_yaml`] load this document.

pub mod clock;
pub mod compositor;
pub mod config;
pub mod error;
pub mod event;
pub mod field;
pub mod format;
pub mod guard;
pub mod layout;
pub mod logger;
pub mod output;
pub mod renderer;
pub mod sink;
pub mod terminal;

pub use clock::{Clock, DateTimeFormat, DateTimeKind, FormatLength, SystemClock};
pub use compositor::FieldCompositor;
pub use config::{LevelStyle, LineFormat, LoggerConfig, LoggerConfigBuilder, Target};
pub use error::ConfigError;
pub use event::LogEvent;
pub use field::{Align, FieldKind, FieldSpec};
pub use format::{BraceFormatter, MessageFormatter};
pub use guard::ReentrancyGuard;
pub use layout::{LayoutCache, LayoutPlan};
pub use logger::{init, TtyLogger};
pub use output::OutputMode;
pub use renderer::{error_trailer, LineRenderer, RenderedLine};
pub use sink::{open_target, LineSink, MemorySink, StreamSink};
pub use terminal::{effective_width, ConsoleProbe, FixedProbe, TerminalProbe};

// Markup layer
pub use ttyline_markup::{StyleExpression, StyleResolver, SpecResolver, StyledText};

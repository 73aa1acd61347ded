//! Nested style markup and display-width measurement for terminal text.
//!
//! This crate provides an evaluator for `@{style text}` markup, where scopes
//! nest and compose like a CSS cascade, together with the `wcwidth` oracle
//! used to measure the result in terminal columns.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ttyline_markup::{evaluate, SpecResolver, StyleExpression};
//!
//! // Strip styling (plain text)
//! let text = evaluate("@{bold hello} world");
//! assert_eq!(text.plain(), "hello world");
//!
//! // Resolve style names to ANSI attributes
//! let expr = StyleExpression::new(Arc::new(SpecResolver::new()));
//! let text = expr.evaluate("@{fg:red error}: disk full");
//! assert_eq!(text.render(true), "\x1b[31merror\x1b[0m: disk full");
//!
//! // Limit the output length
//! let expr = StyleExpression::plain().max_length(8).ellipsis("…");
//! assert_eq!(expr.evaluate("connection refused").plain(), "connect…");
//! ```
//!
//! # Modules
//!
//! - [`width`]: per-character display width (`0`, `1`, `2` or uncomputable)
//! - [`resolver`]: the [`StyleResolver`] seam mapping style names to [`console::Style`]
//! - [`styled`]: the [`StyledText`] run sequence produced by evaluation
//! - [`expr`]: the [`StyleExpression`] evaluator

pub mod expr;
pub mod resolver;
pub mod styled;
mod tables;
pub mod width;

pub use expr::{evaluate, StyleExpression, DEFAULT_ELLIPSIS};
pub use resolver::{NopResolver, SpecResolver, StyleResolver};
pub use styled::{escape, StyledRun, StyledText};
pub use width::{str_width, str_width_cjk, width, width_cjk};

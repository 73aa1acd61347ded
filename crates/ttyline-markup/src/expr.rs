//! Evaluator for nested `@{style text}` markup.
//!
//! # Syntax
//!
//! | Input | Meaning |
//! |-------|---------|
//! | `@{name text}` | `text` is styled with `name`, nested inside any enclosing scopes |
//! | `@{}` or `@{name}` | empty scope, nothing is pushed |
//! | `\X` | the character `X` literally (`\@`, `\{`, `\}`, `\\`) |
//! | `}` outside any scope | ignored |
//!
//! A scope's style is composed from every enclosing scope name joined with
//! commas (outermost first), so closing an inner scope restores the exact
//! composed style of its parent:
//!
//! ```rust
//! use std::sync::Arc;
//! use ttyline_markup::{SpecResolver, StyleExpression};
//!
//! let expr = StyleExpression::new(Arc::new(SpecResolver::new()));
//! let text = expr.evaluate("@{underline foo @{fg:cyan bar} and underline}");
//!
//! let specs: Vec<_> = text.runs().iter().map(|r| r.spec.as_str()).collect();
//! assert_eq!(specs, ["underline", "underline,fg:cyan", "underline"]);
//! assert_eq!(text.plain(), "foo bar and underline");
//! ```
//!
//! # Truncation
//!
//! With a maximum length `L`, every literal character advances an index by
//! one, whatever its display width. Characters at or past `L - ellipsis
//! width` are held back. If an `L + 1`th character arrives the held-back
//! characters are replaced by the ellipsis, styled like the text it
//! replaces, and evaluation stops. Otherwise they are emitted unchanged.
//!
//! ```rust
//! use ttyline_markup::StyleExpression;
//!
//! let expr = StyleExpression::plain().max_length(6).ellipsis("..");
//! assert_eq!(expr.evaluate("abcdef").plain(), "abcdef");
//! assert_eq!(expr.evaluate("abcdefg").plain(), "abcd..");
//! ```

use std::sync::Arc;

use console::Style;

use crate::resolver::{NopResolver, StyleResolver};
use crate::styled::StyledText;
use crate::width::str_width;

/// The ellipsis used when none is configured.
pub const DEFAULT_ELLIPSIS: &str = "..";

/// Evaluates markup with the no-op resolver and no length limit.
pub fn evaluate(markup: &str) -> StyledText {
    StyleExpression::plain().evaluate(markup)
}

/// A configured markup evaluator.
///
/// Holds no state between calls and can be shared across threads.
#[derive(Clone)]
pub struct StyleExpression {
    resolver: Arc<dyn StyleResolver>,
    max_length: usize,
    ellipsis: String,
}

impl std::fmt::Debug for StyleExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleExpression")
            .field("max_length", &self.max_length)
            .field("ellipsis", &self.ellipsis)
            .finish_non_exhaustive()
    }
}

impl Default for StyleExpression {
    fn default() -> Self {
        Self::plain()
    }
}

impl StyleExpression {
    pub fn new(resolver: Arc<dyn StyleResolver>) -> Self {
        Self {
            resolver,
            max_length: 0,
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
        }
    }

    /// An evaluator whose styles all resolve to the default.
    pub fn plain() -> Self {
        Self::new(Arc::new(NopResolver))
    }

    /// Sets the maximum number of characters emitted. `0` means unlimited.
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn ellipsis(mut self, ellipsis: impl Into<String>) -> Self {
        self.ellipsis = ellipsis.into();
        self
    }

    pub fn resolver(&self) -> &Arc<dyn StyleResolver> {
        &self.resolver
    }

    pub fn evaluate(&self, markup: &str) -> StyledText {
        let mut out = StyledText::new();
        self.evaluate_into(&mut out, markup);
        out
    }

    /// Evaluates `markup`, appending the runs to `out`.
    ///
    /// The length limit applies to the characters produced by this call.
    pub fn evaluate_into(&self, out: &mut StyledText, markup: &str) {
        let mut eval = Evaluation::new(self, out);
        let mut chars = markup.chars().peekable();
        let mut name: Option<String> = None;

        while eval.go {
            let Some(c) = chars.next() else { break };

            if let Some(buf) = name.as_mut() {
                match c {
                    ' ' if buf.is_empty() => {}
                    ' ' => {
                        let scope = std::mem::take(buf);
                        name = None;
                        eval.push_scope(scope);
                    }
                    '}' => name = None,
                    _ => buf.push(c),
                }
                continue;
            }

            match c {
                '\\' => eval.append(chars.next().unwrap_or('\\')),
                '@' if chars.peek() == Some(&'{') => {
                    chars.next();
                    name = Some(String::new());
                }
                '}' => eval.pop_scope(),
                _ => eval.append(c),
            }
        }

        eval.finish();
    }
}

/// Per-call evaluation state.
struct Evaluation<'a> {
    expr: &'a StyleExpression,
    out: &'a mut StyledText,
    stack: Vec<String>,
    spec: String,
    style: Style,
    /// Characters emitted so far, counted before truncation.
    index: usize,
    /// Index from which characters are held back in `tail`.
    threshold: Option<usize>,
    tail: StyledText,
    go: bool,
}

impl<'a> Evaluation<'a> {
    fn new(expr: &'a StyleExpression, out: &'a mut StyledText) -> Self {
        let threshold = match (expr.max_length, expr.ellipsis.is_empty()) {
            (0, _) | (_, true) => None,
            (max, false) => Some(max.saturating_sub(str_width(&expr.ellipsis))),
        };
        Self {
            expr,
            out,
            stack: Vec::new(),
            spec: String::new(),
            style: Style::new(),
            index: 0,
            threshold,
            tail: StyledText::new(),
            go: true,
        }
    }

    fn push_scope(&mut self, name: String) {
        self.stack.push(name);
        self.refresh_style();
    }

    fn pop_scope(&mut self) {
        if self.stack.pop().is_some() {
            self.refresh_style();
        }
    }

    fn refresh_style(&mut self) {
        if self.stack.is_empty() {
            self.reset_style();
        } else {
            self.spec = self.stack.join(",");
            self.style = self.expr.resolver.resolve(&self.spec);
        }
    }

    fn reset_style(&mut self) {
        self.spec.clear();
        self.style = Style::new();
    }

    fn append(&mut self, c: char) {
        let max = self.expr.max_length;
        if max == 0 {
            self.out.push_char(c, &self.spec, &self.style);
            return;
        }

        if self.index == max {
            self.tail = StyledText::new();
            self.out
                .push_str(&self.expr.ellipsis, &self.spec, &self.style);
            self.reset_style();
            self.go = false;
            return;
        }

        match self.threshold {
            Some(threshold) if self.index >= threshold => {
                self.tail.push_char(c, &self.spec, &self.style)
            }
            _ => self.out.push_char(c, &self.spec, &self.style),
        }
        self.index += 1;
    }

    fn finish(self) {
        if self.go {
            self.out.append(&self.tail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::SpecResolver;

    fn styled() -> StyleExpression {
        StyleExpression::new(Arc::new(SpecResolver::new()))
    }

    fn specs(text: &StyledText) -> Vec<(&str, &str)> {
        text.runs()
            .iter()
            .map(|r| (r.text.as_str(), r.spec.as_str()))
            .collect()
    }

    // ==================== Scope Tests ====================

    mod scopes {
        use super::*;

        #[test]
        fn plain_text_passes_through() {
            let text = evaluate("hello world");
            assert_eq!(specs(&text), [("hello world", "")]);
        }

        #[test]
        fn single_scope() {
            let text = styled().evaluate("a @{bold b} c");
            assert_eq!(specs(&text), [("a ", ""), ("b", "bold"), (" c", "")]);
            assert_eq!(text.runs()[1].style, Style::new().bold());
        }

        #[test]
        fn nested_scope_restores_parent() {
            let text = styled().evaluate("@{underline foo @{fg:cyan bar} and underline}");
            assert_eq!(
                specs(&text),
                [
                    ("foo ", "underline"),
                    ("bar", "underline,fg:cyan"),
                    (" and underline", "underline"),
                ]
            );
            assert_eq!(text.runs()[0].style, Style::new().underlined());
            assert_eq!(text.runs()[1].style, Style::new().underlined().cyan());
            assert_eq!(text.runs()[2].style, Style::new().underlined());
        }

        #[test]
        fn deep_nesting_restores_each_level() {
            let text = styled().evaluate("@{bold a@{italic b@{fg:red c}d}e}f");
            assert_eq!(
                specs(&text),
                [
                    ("a", "bold"),
                    ("b", "bold,italic"),
                    ("c", "bold,italic,fg:red"),
                    ("d", "bold,italic"),
                    ("e", "bold"),
                    ("f", ""),
                ]
            );
        }

        #[test]
        fn empty_scopes_push_nothing() {
            assert_eq!(specs(&evaluate("a@{}b")), [("ab", "")]);
            assert_eq!(specs(&evaluate("a@{bold}b")), [("ab", "")]);
        }

        #[test]
        fn leading_spaces_before_name_are_skipped() {
            let text = styled().evaluate("@{  bold x}");
            assert_eq!(specs(&text), [("x", "bold")]);
        }

        #[test]
        fn stray_close_is_ignored() {
            assert_eq!(evaluate("a}b}").plain(), "ab");
        }

        #[test]
        fn unterminated_name_is_discarded() {
            assert_eq!(evaluate("abc@{bold").plain(), "abc");
        }

        #[test]
        fn unterminated_scope_keeps_text() {
            let text = styled().evaluate("@{bold abc");
            assert_eq!(specs(&text), [("abc", "bold")]);
        }

        #[test]
        fn lone_at_is_literal() {
            assert_eq!(evaluate("user@host @").plain(), "user@host @");
        }

        #[test]
        fn nop_resolver_keeps_specs() {
            let text = evaluate("@{bold x}");
            assert_eq!(specs(&text), [("x", "bold")]);
            assert_eq!(text.runs()[0].style, Style::new());
        }
    }

    // ==================== Escape Tests ====================

    mod escapes {
        use super::*;

        #[test]
        fn escaped_markup_characters_are_literal() {
            let text = styled().evaluate(r"\@\{bold x\} \\");
            assert_eq!(specs(&text), [(r"@{bold x} \", "")]);
        }

        #[test]
        fn escapes_inside_scope_keep_style() {
            let text = styled().evaluate(r"@{bold a\}b}");
            assert_eq!(specs(&text), [("a}b", "bold")]);
        }

        #[test]
        fn trailing_backslash_is_literal() {
            assert_eq!(evaluate("a\\").plain(), "a\\");
        }

        #[test]
        fn markup_reevaluates_to_same_runs() {
            let expr = styled();
            let original = expr.evaluate(r"x @{bold a\@b @{fg:red c}} y");
            let again = expr.evaluate(&original.to_markup());
            assert_eq!(again, original);
        }
    }

    // ==================== Truncation Tests ====================

    mod truncation {
        use super::*;

        #[test]
        fn unlimited_by_default() {
            let long = "x".repeat(500);
            assert_eq!(evaluate(&long).plain(), long);
        }

        #[test]
        fn exact_fit_is_untouched() {
            let expr = StyleExpression::plain().max_length(5);
            assert_eq!(expr.evaluate("hello").plain(), "hello");
        }

        #[test]
        fn overflow_ends_with_ellipsis() {
            let expr = StyleExpression::plain().max_length(5);
            assert_eq!(expr.evaluate("hello world").plain(), "hel..");
        }

        #[test]
        fn ellipsis_takes_current_style() {
            let expr = styled().max_length(6).ellipsis("~");
            let text = expr.evaluate("ab@{bold cdefgh}");
            assert_eq!(specs(&text), [("ab", ""), ("cde~", "bold")]);
        }

        #[test]
        fn held_back_characters_keep_their_style() {
            let expr = styled().max_length(4);
            let text = expr.evaluate("ab@{bold c}d");
            assert_eq!(specs(&text), [("ab", ""), ("c", "bold"), ("d", "")]);
        }

        #[test]
        fn markup_does_not_count() {
            let expr = styled().max_length(3);
            assert_eq!(expr.evaluate("@{bold a@{italic b}c}").plain(), "abc");
        }

        #[test]
        fn counts_characters_not_columns() {
            let expr = StyleExpression::plain().max_length(3).ellipsis("…");
            assert_eq!(expr.evaluate("日本語").plain(), "日本語");
            assert_eq!(expr.evaluate("日本語x").plain(), "日本…");
        }

        #[test]
        fn empty_ellipsis_cuts_hard() {
            let expr = StyleExpression::plain().max_length(3).ellipsis("");
            assert_eq!(expr.evaluate("abcdef").plain(), "abc");
        }

        #[test]
        fn ellipsis_wider_than_limit() {
            let expr = StyleExpression::plain().max_length(1).ellipsis("..");
            assert_eq!(expr.evaluate("a").plain(), "a");
            assert_eq!(expr.evaluate("ab").plain(), "..");
        }

        #[test]
        fn limit_applies_per_call() {
            let expr = StyleExpression::plain().max_length(2);
            let mut out = StyledText::new();
            expr.evaluate_into(&mut out, "ab");
            expr.evaluate_into(&mut out, "cd");
            assert_eq!(out.plain(), "abcd");
        }
    }
}

//! Message pattern interpolation.

use std::fmt;

use ttyline_markup::escape;

/// Turns a message pattern and its arguments into markup.
///
/// The result is evaluated as markup, so literal text from the pattern and
/// the arguments must come out escaped.
pub trait MessageFormatter: Send + Sync {
    /// `parameter_style` is a markup template whose `${arg}` placeholder
    /// receives each substituted argument.
    fn format(
        &self,
        pattern: &str,
        args: &[&dyn fmt::Display],
        parameter_style: Option<&str>,
    ) -> String;
}

/// `{}` placeholders filled left to right.
///
/// `\{}` produces a literal `{}`, while `\\{}` produces a literal `\`
/// followed by the argument. Placeholders without a matching argument are
/// kept as written and surplus arguments are dropped.
///
/// ```rust
/// use ttyline_render::{BraceFormatter, MessageFormatter};
///
/// let markup = BraceFormatter.format("{} of {} done", &[&3, &5], Some("@{bold ${arg}}"));
/// assert_eq!(markup, "@{bold 3} of @{bold 5} done");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceFormatter;

impl MessageFormatter for BraceFormatter {
    fn format(
        &self,
        pattern: &str,
        args: &[&dyn fmt::Display],
        parameter_style: Option<&str>,
    ) -> String {
        let mut out = String::with_capacity(pattern.len());
        let mut args = args.iter();
        let mut rest = pattern;

        while let Some(pos) = rest.find("{}") {
            let (before, after) = rest.split_at(pos);
            rest = &after[2..];

            if let Some(literal) = before.strip_suffix("\\\\") {
                out.push_str(&escape(literal));
                out.push_str(&escape("\\"));
            } else if let Some(literal) = before.strip_suffix('\\') {
                out.push_str(&escape(literal));
                out.push_str(&escape("{}"));
                continue;
            } else {
                out.push_str(&escape(before));
            }
            match args.next() {
                Some(arg) => {
                    let value = escape(&arg.to_string());
                    match parameter_style {
                        Some(style) => out.push_str(&style.replace("${arg}", &value)),
                        None => out.push_str(&value),
                    }
                }
                None => out.push_str(&escape("{}")),
            }
        }
        out.push_str(&escape(rest));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttyline_markup::evaluate;

    fn plain(pattern: &str, args: &[&dyn fmt::Display]) -> String {
        evaluate(&BraceFormatter.format(pattern, args, None)).plain()
    }

    #[test]
    fn substitutes_in_order() {
        assert_eq!(plain("{} + {} = {}", &[&1, &2, &3]), "1 + 2 = 3");
    }

    #[test]
    fn missing_args_keep_placeholder() {
        assert_eq!(plain("a={} b={}", &[&"x"]), "a=x b={}");
    }

    #[test]
    fn surplus_args_dropped() {
        assert_eq!(plain("only {}", &[&1, &2]), "only 1");
    }

    #[test]
    fn escaped_placeholder_is_literal() {
        assert_eq!(plain(r"set \{} to {}", &[&"v"]), "set {} to v");
    }

    #[test]
    fn doubled_backslash_keeps_placeholder() {
        assert_eq!(plain(r"C:\\{}", &[&"dir"]), r"C:\dir");
        assert_eq!(plain(r"a\\{} b {}", &[&1, &2]), r"a\1 b 2");
    }

    #[test]
    fn markup_in_text_is_escaped() {
        assert_eq!(plain("mail @{user} {}", &[&"@{bold x}"]), "mail @{user} @{bold x}");
    }

    #[test]
    fn parameter_style_wraps_arguments() {
        let markup = BraceFormatter.format("id={}", &[&42], Some("@{fg:cyan ${arg}}"));
        assert_eq!(markup, "id=@{fg:cyan 42}");
    }
}

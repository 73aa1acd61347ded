//! Style resolution: mapping style names to terminal attributes.
//!
//! The evaluator never interprets style names itself. Whenever the active
//! scope stack changes it joins the names with commas (outermost first) and
//! asks a [`StyleResolver`] for the composed [`Style`].
//!
//! [`SpecResolver`] understands a small attribute vocabulary:
//!
//! | Item | Effect |
//! |------|--------|
//! | `bold`, `faint`/`dim`, `italic`, `underline`, `blink` | text attributes |
//! | `inverse`, `conceal`/`hidden`, `crossed-out`/`strikethrough` | text attributes |
//! | `fg:<color>`, `bg:<color>` | foreground / background |
//! | `default`, `none` | reset everything set so far |
//! | `.name` or `name` | a style registered with [`SpecResolver::with_style`] |
//!
//! Colors are the eight ANSI names (`red`, `cyan`, ...), their `bright-`
//! variants, a palette index `0`-`255`, or a hex code `#rgb` / `#rrggbb`.
//! Unknown items are ignored.
//!
//! ```rust
//! use ttyline_markup::{SpecResolver, StyleResolver};
//!
//! let resolver = SpecResolver::new().with_style("warn", "bold,fg:yellow");
//! let style = resolver.resolve("underline,warn");
//! assert_eq!(
//!     style.force_styling(true).apply_to("x").to_string(),
//!     console::Style::new().underlined().bold().yellow().force_styling(true).apply_to("x").to_string(),
//! );
//! ```

use std::collections::HashMap;

use console::{Color, Style};

/// Named styles can refer to other named styles up to this depth.
const MAX_ALIAS_DEPTH: usize = 8;

/// Resolves a comma-joined style specification into terminal attributes.
pub trait StyleResolver: Send + Sync {
    fn resolve(&self, spec: &str) -> Style;
}

/// A resolver that knows no styles; everything resolves to the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopResolver;

impl StyleResolver for NopResolver {
    fn resolve(&self, _spec: &str) -> Style {
        Style::new()
    }
}

/// Attribute-vocabulary resolver with optional named styles.
#[derive(Debug, Clone, Default)]
pub struct SpecResolver {
    named: HashMap<String, String>,
}

impl SpecResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named style. `spec` uses the same item syntax as markup.
    pub fn with_style(mut self, name: impl Into<String>, spec: impl Into<String>) -> Self {
        self.named.insert(name.into(), spec.into());
        self
    }

    /// Returns true if a named style is registered under `name`.
    pub fn has_style(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    fn apply(&self, mut style: Style, spec: &str, depth: usize) -> Style {
        for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            style = self.apply_item(style, item, depth);
        }
        style
    }

    fn apply_item(&self, style: Style, item: &str, depth: usize) -> Style {
        if let Some(color) = item.strip_prefix("fg:") {
            return match parse_color(color) {
                Some(c) => style.fg(c),
                None => style,
            };
        }
        if let Some(color) = item.strip_prefix("bg:") {
            return match parse_color(color) {
                Some(c) => style.bg(c),
                None => style,
            };
        }

        match item.to_ascii_lowercase().as_str() {
            "bold" => style.bold(),
            "faint" | "dim" => style.dim(),
            "italic" => style.italic(),
            "underline" => style.underlined(),
            "blink" => style.blink(),
            "inverse" | "reverse" => style.reverse(),
            "conceal" | "hidden" => style.hidden(),
            "crossed-out" | "strikethrough" => style.strikethrough(),
            "default" | "none" => Style::new(),
            _ => {
                let name = item.strip_prefix('.').unwrap_or(item);
                match self.named.get(name) {
                    Some(spec) if depth < MAX_ALIAS_DEPTH => self.apply(style, spec, depth + 1),
                    _ => style,
                }
            }
        }
    }
}

impl StyleResolver for SpecResolver {
    fn resolve(&self, spec: &str) -> Style {
        self.apply(Style::new(), spec, 0)
    }
}

/// Parses a color item value.
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).map(|rgb| Color::Color256(rgb_to_ansi256(rgb)));
    }
    if let Ok(index) = s.parse::<u8>() {
        return Some(Color::Color256(index));
    }

    let lower = s.to_ascii_lowercase();
    if let Some(base) = lower
        .strip_prefix("bright-")
        .or_else(|| lower.strip_prefix("bright_"))
    {
        return ansi_index(base).map(|i| Color::Color256(i + 8));
    }
    match lower.as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" | "gray" | "grey" => Some(Color::White),
        _ => None,
    }
}

fn ansi_index(name: &str) -> Option<u8> {
    let index = match name {
        "black" => 0,
        "red" => 1,
        "green" => 2,
        "yellow" => 3,
        "blue" => 4,
        "magenta" => 5,
        "cyan" => 6,
        "white" => 7,
        _ => return None,
    };
    Some(index)
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| d * 17);
            Some((digit(0)?, digit(1)?, digit(2)?))
        }
        6 => {
            let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some((pair(0)?, pair(2)?, pair(4)?))
        }
        _ => None,
    }
}

/// Converts an RGB triplet to the nearest ANSI 256-color palette index.
///
/// ```rust
/// use ttyline_markup::resolver::rgb_to_ansi256;
///
/// assert_eq!(rgb_to_ansi256((255, 0, 0)), 196);
/// assert_eq!(rgb_to_ansi256((0, 255, 0)), 46);
/// ```
pub fn rgb_to_ansi256((r, g, b): (u8, u8, u8)) -> u8 {
    if r == g && g == b {
        if r < 8 {
            16
        } else if r > 248 {
            231
        } else {
            232 + ((r as u16 - 8) * 24 / 247) as u8
        }
    } else {
        let red = (r as u16 * 5 / 255) as u8;
        let green = (g as u16 * 5 / 255) as u8;
        let blue = (b as u16 * 5 / 255) as u8;
        16 + 36 * red + 6 * green + blue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ansi(style: Style) -> String {
        style.force_styling(true).apply_to("x").to_string()
    }

    #[test]
    fn nop_resolver_is_plain() {
        assert_eq!(ansi(NopResolver.resolve("bold,fg:red")), "x");
    }

    #[test]
    fn attributes_compose() {
        let r = SpecResolver::new();
        assert_eq!(
            ansi(r.resolve("bold,underline")),
            ansi(Style::new().bold().underlined())
        );
        assert_eq!(ansi(r.resolve("dim")), ansi(Style::new().dim()));
        assert_eq!(
            ansi(r.resolve("crossed-out")),
            ansi(Style::new().strikethrough())
        );
    }

    #[test]
    fn colors() {
        let r = SpecResolver::new();
        assert_eq!(ansi(r.resolve("fg:cyan")), ansi(Style::new().cyan()));
        assert_eq!(ansi(r.resolve("bg:red")), ansi(Style::new().on_red()));
        assert_eq!(ansi(r.resolve("fg:208")), ansi(Style::new().color256(208)));
        assert_eq!(
            ansi(r.resolve("fg:bright-red")),
            ansi(Style::new().color256(9))
        );
        assert_eq!(
            ansi(r.resolve("fg:#ff0000")),
            ansi(Style::new().color256(196))
        );
        assert_eq!(ansi(r.resolve("fg:#f00")), ansi(Style::new().color256(196)));
    }

    #[test]
    fn later_items_override() {
        let r = SpecResolver::new();
        assert_eq!(
            ansi(r.resolve("fg:red,fg:blue")),
            ansi(Style::new().blue())
        );
        assert_eq!(ansi(r.resolve("bold,none,italic")), ansi(Style::new().italic()));
    }

    #[test]
    fn unknown_items_ignored() {
        let r = SpecResolver::new();
        assert_eq!(ansi(r.resolve("sparkly")), "x");
        assert_eq!(ansi(r.resolve("fg:chartreuse,bold")), ansi(Style::new().bold()));
        assert_eq!(ansi(r.resolve("fg:#12")), "x");
        assert_eq!(ansi(r.resolve("")), "x");
    }

    #[test]
    fn named_styles() {
        let r = SpecResolver::new()
            .with_style("error", "bold,fg:red")
            .with_style("fatal", ".error,inverse");
        assert!(r.has_style("error"));
        assert_eq!(ansi(r.resolve(".error")), ansi(Style::new().bold().red()));
        assert_eq!(ansi(r.resolve("error")), ansi(Style::new().bold().red()));
        assert_eq!(
            ansi(r.resolve("fatal")),
            ansi(Style::new().bold().red().reverse())
        );
    }

    #[test]
    fn cyclic_named_styles_terminate() {
        let r = SpecResolver::new()
            .with_style("a", "bold,b")
            .with_style("b", "a");
        assert_eq!(ansi(r.resolve("a")), ansi(Style::new().bold()));
    }

    #[test]
    fn rgb_greys_use_ramp() {
        assert_eq!(rgb_to_ansi256((0, 0, 0)), 16);
        assert_eq!(rgb_to_ansi256((255, 255, 255)), 231);
        assert_eq!(rgb_to_ansi256((128, 128, 128)), 243);
    }
}

//! Terminal capability probing.

use console::Term;

/// Reports the capabilities of the terminal lines are written to.
pub trait TerminalProbe: Send + Sync {
    /// Current width in columns, if it can be determined.
    fn current_width(&self) -> Option<usize>;

    /// Whether the terminal understands ANSI escape codes.
    fn supports_ansi(&self) -> bool;
}

/// Probes the attached terminal: width via `terminal_size`, color support
/// via `console` on standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProbe;

impl TerminalProbe for ConsoleProbe {
    fn current_width(&self) -> Option<usize> {
        terminal_size::terminal_size().map(|(terminal_size::Width(w), _)| w as usize)
    }

    fn supports_ansi(&self) -> bool {
        Term::stderr().features().colors_supported()
    }
}

/// A probe with fixed answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedProbe {
    pub width: Option<usize>,
    pub ansi: bool,
}

impl FixedProbe {
    /// A terminal `width` columns wide without ANSI support.
    pub fn new(width: usize) -> Self {
        Self {
            width: Some(width),
            ansi: false,
        }
    }

    /// A probe that cannot determine the width.
    pub fn unknown() -> Self {
        Self {
            width: None,
            ansi: false,
        }
    }

    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }
}

impl TerminalProbe for FixedProbe {
    fn current_width(&self) -> Option<usize> {
        self.width
    }

    fn supports_ansi(&self) -> bool {
        self.ansi
    }
}

/// Width to lay lines out for.
///
/// A configured width above zero wins. Otherwise the probed width is used
/// when it is at least one column, and `fallback` when it is not.
pub fn effective_width(configured: usize, probe: &dyn TerminalProbe, fallback: usize) -> usize {
    if configured > 0 {
        return configured;
    }
    match probe.current_width() {
        Some(width) if width >= 1 => width,
        _ => fallback,
    }
}

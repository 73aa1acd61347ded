//! Display-width oracle for terminal cells.
//!
//! This is the xterm `wcwidth()` classification: every code point maps to
//! the number of fixed-width cells it advances the cursor by. The result is
//! `Option<usize>`, where `None` means the width cannot be computed (control
//! characters, format characters and unassigned code points). Such characters
//! do not advance the cursor, and [`str_width`] counts them as zero.
//!
//! | Code point class | Width |
//! |------------------|-------|
//! | `U+0000` | `Some(0)` |
//! | C0/C1 controls, `DEL` | `None` |
//! | `SOFT HYPHEN` | `Some(1)` (Latin-1 mode) or `Some(0)` |
//! | Format characters (Cf) | `None` |
//! | Combining marks | `Some(0)` |
//! | East Asian Wide / Fullwidth | `Some(2)` |
//! | Unassigned | `None` |
//! | Everything else | `Some(1)` |
//!
//! [`width_cjk`] additionally treats East Asian Ambiguous characters as
//! double width, for terminals running with CJK legacy conventions.
//!
//! # Example
//!
//! ```rust
//! use ttyline_markup::width::{str_width, width};
//!
//! assert_eq!(width('a'), Some(1));
//! assert_eq!(width('日'), Some(2));
//! assert_eq!(width('\u{0301}'), Some(0)); // combining acute accent
//! assert_eq!(width('\x07'), None);
//! assert_eq!(str_width("日本 go"), 7);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use crate::tables::{Interval, AMBIGUOUS, COMBINING, DOUBLE_WIDTH, FORMATTING, UNASSIGNED};

const SOFT_HYPHEN: u32 = 0x00AD;

/// How `SOFT HYPHEN` (U+00AD) is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SoftHyphen {
    /// ISO 8859-1 behavior: the hyphen is always visible (width 1).
    #[default]
    Latin1,
    /// Unicode behavior: the hyphen is invisible unless a line breaks (width 0).
    Unicode,
}

static LATIN1_SOFT_HYPHEN: AtomicBool = AtomicBool::new(true);

/// Sets the process-wide soft hyphen mode.
///
/// Intended to be called once at startup, before any width is computed.
pub fn set_soft_hyphen_mode(mode: SoftHyphen) {
    LATIN1_SOFT_HYPHEN.store(mode == SoftHyphen::Latin1, Ordering::Relaxed);
}

/// Returns the current soft hyphen mode.
pub fn soft_hyphen_mode() -> SoftHyphen {
    if LATIN1_SOFT_HYPHEN.load(Ordering::Relaxed) {
        SoftHyphen::Latin1
    } else {
        SoftHyphen::Unicode
    }
}

/// Binary search for `ucs` in a sorted interval table.
pub fn in_table(ucs: u32, table: &[Interval]) -> bool {
    match (table.first(), table.last()) {
        (Some(first), Some(last)) if ucs >= first.0 && ucs <= last.1 => table
            .binary_search_by(|&(lo, hi)| {
                if hi < ucs {
                    std::cmp::Ordering::Less
                } else if lo > ucs {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok(),
        _ => false,
    }
}

/// Returns the display width of a raw code point.
///
/// Values that are not Unicode scalar values (surrogates, anything above
/// `U+10FFFF`) are uncomputable.
pub fn width_of_codepoint(ucs: u32) -> Option<usize> {
    match char::from_u32(ucs) {
        Some(c) => width(c),
        None => None,
    }
}

/// Returns the display width of a character.
pub fn width(c: char) -> Option<usize> {
    let ucs = c as u32;

    if ucs == 0 {
        return Some(0);
    }
    if ucs < 0x20 || (0x7F..0xA0).contains(&ucs) {
        return None;
    }
    if ucs == SOFT_HYPHEN {
        return match soft_hyphen_mode() {
            SoftHyphen::Latin1 => Some(1),
            SoftHyphen::Unicode => Some(0),
        };
    }
    if in_table(ucs, FORMATTING) {
        return None;
    }
    if in_table(ucs, COMBINING) {
        return Some(0);
    }
    if in_table(ucs, DOUBLE_WIDTH) {
        return Some(2);
    }
    if in_table(ucs, UNASSIGNED) {
        return None;
    }
    Some(1)
}

/// Returns the display width of a character, counting East Asian Ambiguous
/// characters as two cells.
pub fn width_cjk(c: char) -> Option<usize> {
    if in_table(c as u32, AMBIGUOUS) {
        return Some(2);
    }
    width(c)
}

/// Returns the display width of a string.
///
/// Uncomputable characters contribute nothing, so the result is never
/// smaller than zero and never larger than the sum of the printable parts.
pub fn str_width(s: &str) -> usize {
    s.chars().map(|c| width(c).unwrap_or(0)).sum()
}

/// CJK variant of [`str_width`].
pub fn str_width_cjk(s: &str) -> usize {
    s.chars().map(|c| width_cjk(c).unwrap_or(0)).sum()
}

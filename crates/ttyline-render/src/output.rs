//! Output mode control for rendering.
//!
//! The [`OutputMode`] enum determines whether a rendered line carries ANSI
//! escape codes. It is fixed by configuration, not negotiated per line.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::terminal::TerminalProbe;

/// Controls whether ANSI escape codes are emitted.
///
/// # Variants
///
/// - `Auto` - Use ANSI codes when the terminal supports them (default)
/// - `Ansi` - Always include ANSI escape codes
/// - `Plain` - Never include ANSI escape codes
///
/// ```rust
/// use ttyline_render::OutputMode;
///
/// assert_eq!("force-ansi".parse::<OutputMode>().unwrap(), OutputMode::Ansi);
/// assert_eq!("TEXT".parse::<OutputMode>().unwrap(), OutputMode::Plain);
/// assert!("colour".parse::<OutputMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Auto-detect terminal capabilities
    #[default]
    Auto,
    /// Always use ANSI escape codes
    Ansi,
    /// Never use ANSI escape codes
    Plain,
}

impl OutputMode {
    /// Resolves the output mode to a concrete decision about whether to use color.
    ///
    /// - `Auto` asks the probe
    /// - `Ansi` always returns `true`
    /// - `Plain` always returns `false`
    pub fn use_ansi(self, probe: &dyn TerminalProbe) -> bool {
        match self {
            OutputMode::Auto => probe.supports_ansi(),
            OutputMode::Ansi => true,
            OutputMode::Plain => false,
        }
    }
}

impl FromStr for OutputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(OutputMode::Auto),
            "ansi" | "force-ansi" => Ok(OutputMode::Ansi),
            "plain" | "text" => Ok(OutputMode::Plain),
            _ => Err(ConfigError::UnknownOutputMode(s.to_string())),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputMode::Auto => "auto",
            OutputMode::Ansi => "ansi",
            OutputMode::Plain => "plain",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::FixedProbe;

    #[test]
    fn parses_aliases() {
        assert_eq!("auto".parse::<OutputMode>().unwrap(), OutputMode::Auto);
        assert_eq!("Ansi".parse::<OutputMode>().unwrap(), OutputMode::Ansi);
        assert_eq!(" plain ".parse::<OutputMode>().unwrap(), OutputMode::Plain);
    }

    #[test]
    fn unknown_mode_is_config_error() {
        let err = "fancy".parse::<OutputMode>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOutputMode(ref m) if m == "fancy"));
    }

    #[test]
    fn ansi_decision() {
        let tty = FixedProbe::new(80).ansi(true);
        let pipe = FixedProbe::new(80);
        assert!(OutputMode::Auto.use_ansi(&tty));
        assert!(!OutputMode::Auto.use_ansi(&pipe));
        assert!(OutputMode::Ansi.use_ansi(&pipe));
        assert!(!OutputMode::Plain.use_ansi(&tty));
    }

    #[test]
    fn display_round_trips() {
        for mode in [OutputMode::Auto, OutputMode::Ansi, OutputMode::Plain] {
            assert_eq!(mode.to_string().parse::<OutputMode>().unwrap(), mode);
        }
    }
}

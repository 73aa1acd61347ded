//! Time sources and date/time field formats.

use std::fmt::Write;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;

static START: Lazy<Instant> = Lazy::new(Instant::now);

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Time since the logging system started.
    fn elapsed(&self) -> Duration;
}

/// The system clock. Elapsed time counts from the first use of any
/// `SystemClock`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Lazy::force(&START);
        SystemClock
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn elapsed(&self) -> Duration {
        START.elapsed()
    }
}

/// Which parts of a timestamp a preset shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateTimeKind {
    Date,
    Time,
    #[default]
    DateTime,
}

impl FromStr for DateTimeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "DATE" => Ok(DateTimeKind::Date),
            "TIME" => Ok(DateTimeKind::Time),
            "DATE_TIME" | "DATETIME" => Ok(DateTimeKind::DateTime),
            _ => Err(format!("unknown date/time type '{}'", s)),
        }
    }
}

/// Verbosity of a preset format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatLength {
    Short,
    Medium,
    Long,
    Full,
}

/// How the `date-time` field is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateTimeFormat {
    /// Milliseconds since start.
    #[default]
    Timestamp,
    /// A `strftime` pattern, e.g. `%H:%M:%S%.3f`.
    Pattern(String),
    Preset {
        kind: DateTimeKind,
        length: FormatLength,
    },
}

impl DateTimeFormat {
    /// Interprets a configured format name.
    ///
    /// `TIMESTAMP` and the presets `SHORT`, `MEDIUM`, `LONG` and `FULL` are
    /// recognized; anything else is a `strftime` pattern. A pattern chrono
    /// cannot parse falls back to the timestamp.
    pub fn parse(format: &str, kind: DateTimeKind) -> Self {
        let length = match format {
            "TIMESTAMP" => return DateTimeFormat::Timestamp,
            "SHORT" => FormatLength::Short,
            "MEDIUM" => FormatLength::Medium,
            "LONG" => FormatLength::Long,
            "FULL" => FormatLength::Full,
            pattern => {
                if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                    log::warn!("bad date format '{}'; using elapsed time", pattern);
                    return DateTimeFormat::Timestamp;
                }
                return DateTimeFormat::Pattern(pattern.to_string());
            }
        };
        DateTimeFormat::Preset { kind, length }
    }

    /// The `strftime` pattern used, or `None` for the timestamp.
    pub fn pattern(&self) -> Option<String> {
        match self {
            DateTimeFormat::Timestamp => None,
            DateTimeFormat::Pattern(pattern) => Some(pattern.clone()),
            DateTimeFormat::Preset { kind, length } => Some(match kind {
                DateTimeKind::Date => date_pattern(*length).to_string(),
                DateTimeKind::Time => time_pattern(*length).to_string(),
                DateTimeKind::DateTime => {
                    format!("{}, {}", date_pattern(*length), time_pattern(*length))
                }
            }),
        }
    }

    /// Formats the current time. A pattern chrono rejects while formatting
    /// renders the elapsed time instead.
    pub fn render(&self, clock: &dyn Clock) -> String {
        let elapsed = || clock.elapsed().as_millis().to_string();
        match self.pattern() {
            None => elapsed(),
            Some(pattern) => {
                let mut out = String::new();
                match write!(out, "{}", clock.now().format(&pattern)) {
                    Ok(()) => out,
                    Err(_) => elapsed(),
                }
            }
        }
    }
}

fn date_pattern(length: FormatLength) -> &'static str {
    match length {
        FormatLength::Short => "%-m/%-d/%y",
        FormatLength::Medium => "%b %-d, %Y",
        FormatLength::Long => "%B %-d, %Y",
        FormatLength::Full => "%A, %B %-d, %Y",
    }
}

fn time_pattern(length: FormatLength) -> &'static str {
    match length {
        FormatLength::Short => "%-I:%M %p",
        FormatLength::Medium => "%-I:%M:%S %p",
        FormatLength::Long | FormatLength::Full => "%-I:%M:%S %p %:z",
    }
}

//! The log event handed to the renderer.

use std::cell::Cell;
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::Level;

/// A borrowed view of one log call, after level filtering.
#[derive(Clone, Copy)]
pub struct LogEvent<'a> {
    pub level: Level,
    /// Full logger name, e.g. `app::db::pool`.
    pub logger: &'a str,
    pub markers: &'a [&'a str],
    /// Message pattern with `{}` placeholders.
    pub pattern: &'a str,
    pub args: &'a [&'a dyn fmt::Display],
    pub error: Option<&'a (dyn Error + 'static)>,
}

impl<'a> LogEvent<'a> {
    pub fn new(level: Level, logger: &'a str, pattern: &'a str) -> Self {
        Self {
            level,
            logger,
            markers: &[],
            pattern,
            args: &[],
            error: None,
        }
    }

    pub fn args(mut self, args: &'a [&'a dyn fmt::Display]) -> Self {
        self.args = args;
        self
    }

    pub fn markers(mut self, markers: &'a [&'a str]) -> Self {
        self.markers = markers;
        self
    }

    pub fn error(mut self, error: &'a (dyn Error + 'static)) -> Self {
        self.error = Some(error);
        self
    }

    /// The last segment of the logger name.
    pub fn short_name(&self) -> &'a str {
        short_name(self.logger)
    }
}

impl fmt::Debug for LogEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEvent")
            .field("level", &self.level)
            .field("logger", &self.logger)
            .field("markers", &self.markers)
            .field("pattern", &self.pattern)
            .field("args", &self.args.len())
            .field("error", &self.error.map(|e| e.to_string()))
            .finish()
    }
}

/// The part of a logger name after the last `::` or `.`.
pub fn short_name(logger: &str) -> &str {
    let start = match (logger.rfind("::"), logger.rfind('.')) {
        (Some(colons), Some(dot)) => (colons + 2).max(dot + 1),
        (Some(colons), None) => colons + 2,
        (None, Some(dot)) => dot + 1,
        (None, None) => 0,
    };
    &logger[start..]
}

/// Name of the calling thread, `unnamed` if it has none.
pub fn thread_name() -> String {
    std::thread::current()
        .name()
        .unwrap_or("unnamed")
        .to_string()
}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: Cell<u64> = const { Cell::new(0) };
}

/// A small number identifying the calling thread.
///
/// Numbers are handed out in the order threads first ask for one.
pub fn thread_id() -> u64 {
    THREAD_ID.with(|id| {
        if id.get() == 0 {
            id.set(NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed));
        }
        id.get()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names() {
        assert_eq!(short_name("app::db::pool"), "pool");
        assert_eq!(short_name("com.example.Service"), "Service");
        assert_eq!(short_name("app::v1.api"), "api");
        assert_eq!(short_name("main"), "main");
        assert_eq!(short_name("trailing::"), "");
    }

    #[test]
    fn builder() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let event = LogEvent::new(Level::Warn, "app::net", "retry {}")
            .args(&[&3])
            .markers(&["NET"])
            .error(&err);
        assert_eq!(event.short_name(), "net");
        assert_eq!(event.args.len(), 1);
        assert_eq!(event.markers, ["NET"]);
        assert!(event.error.is_some());
    }

    #[test]
    fn thread_ids_are_stable_and_distinct() {
        let here = thread_id();
        assert_eq!(thread_id(), here);
        let there = std::thread::spawn(thread_id).join().unwrap();
        assert_ne!(here, there);
    }

    #[test]
    fn named_threads() {
        let name = std::thread::Builder::new()
            .name("worker-1".into())
            .spawn(thread_name)
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(name, "worker-1");
    }
}

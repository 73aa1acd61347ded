//! Configuration errors.
//!
//! Every error is raised while a [`LoggerConfig`](crate::LoggerConfig) is
//! built or installed. Rendering a line never fails.

use std::io;
use std::path::PathBuf;

/// Errors detected while loading or validating a logger configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `output.mode` is not one of `auto`, `ansi` or `plain`.
    #[error("unknown output mode '{0}' (expected auto, ansi or plain)")]
    UnknownOutputMode(String),

    /// `output.format` is not one of `tty` or `json`.
    #[error("unknown line format '{0}' (expected tty or json)")]
    UnknownFormat(String),

    /// `output.target` is not one of `stderr`, `stdout` or `file`.
    #[error("unknown output target '{0}' (expected stderr, stdout or file)")]
    UnknownTarget(String),

    /// `output.target` is `file` but no `log-file` was given.
    #[error("output target is 'file' but no log-file is configured")]
    MissingLogFile,

    /// A level name that is not `trace`, `debug`, `info`, `warn`, `error` or `off`.
    #[error("unknown level '{0}'")]
    UnknownLevel(String),

    /// The layout names a field with no field specification.
    #[error("layout field '{0}' has no field specification")]
    MissingField(String),

    /// The layout names the same field twice.
    #[error("layout field '{0}' appears more than once")]
    DuplicateField(String),

    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("a global logger is already installed")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            ConfigError::UnknownOutputMode("fancy".into()).to_string(),
            "unknown output mode 'fancy' (expected auto, ansi or plain)"
        );
        assert_eq!(
            ConfigError::MissingField("thread".into()).to_string(),
            "layout field 'thread' has no field specification"
        );
    }

    #[test]
    fn io_error_has_source() {
        use std::error::Error;

        let err = ConfigError::Io {
            path: PathBuf::from("/nope.yaml"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to read /nope.yaml: gone");
        assert!(err.source().is_some());
    }
}

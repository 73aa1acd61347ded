//! Destinations for rendered lines.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{LoggerConfig, Target};
use crate::error::ConfigError;
use crate::renderer::RenderedLine;

/// Accepts finished lines.
pub trait LineSink: Send + Sync {
    fn write_line(&self, line: &RenderedLine) -> io::Result<()>;
}

/// A writer shared by every thread that logs.
///
/// A line and its trailer are written and flushed under one lock, so lines
/// from different threads never interleave.
#[derive(Debug)]
pub struct StreamSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl StreamSink<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl StreamSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl StreamSink<File> {
    /// Appends to `path`, creating it and its parent directories if needed.
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Send> LineSink for StreamSink<W> {
    fn write_line(&self, line: &RenderedLine) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(line.line.as_bytes())?;
        writer.write_all(b"\n")?;
        if let Some(trailer) = &line.trailer {
            writer.write_all(trailer.as_bytes())?;
        }
        writer.flush()
    }
}

/// Collects lines in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Written lines, without trailers.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl LineSink for MemorySink {
    fn write_line(&self, line: &RenderedLine) -> io::Result<()> {
        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        buf.push_str(&line.line);
        buf.push('\n');
        if let Some(trailer) = &line.trailer {
            buf.push_str(trailer);
        }
        Ok(())
    }
}

/// Opens the sink chosen by the configured target.
pub fn open_target(config: &LoggerConfig) -> Result<Box<dyn LineSink>, ConfigError> {
    match config.target() {
        Target::Stderr => Ok(Box::new(StreamSink::stderr())),
        Target::Stdout => Ok(Box::new(StreamSink::stdout())),
        Target::File(path) => {
            let path = expand_home(path);
            let sink = StreamSink::file(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(Box::new(sink))
        }
    }
}

/// Replaces a leading `~/` with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

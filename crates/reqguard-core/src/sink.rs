//! Sink - the destination log lines are appended to
//!
//! A `Sink` is a cheap clone-able handle. All clones share one destination,
//! so redirecting through any handle moves every channel at once.

use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::LogError;

/// Where lines currently go
struct Destination {
    writer: Box<dyn Write + Send>,
    label: String,
}

/// Shared, append-only line destination.
///
/// Appends are serialized by an internal mutex, so concurrent callers never
/// interleave within a line.
#[derive(Clone)]
pub struct Sink {
    inner: Arc<Mutex<Destination>>,
}

impl Sink {
    /// Sink writing to the process stdout
    pub fn stdout() -> Self {
        Self::from_writer("stdout", std::io::stdout())
    }

    /// Sink over an arbitrary writer
    pub fn from_writer(label: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Destination {
                writer: Box::new(writer),
                label: label.into(),
            })),
        }
    }

    /// In-memory sink, returning the buffer lines can be read back from
    pub fn memory() -> (Self, MemoryBuffer) {
        let buffer = MemoryBuffer::default();
        (Self::from_writer("memory", buffer.clone()), buffer)
    }

    /// Label of the current destination ("stdout", a file path, ...)
    pub fn label(&self) -> String {
        self.inner.lock().label.clone()
    }

    /// Append one line. A trailing newline is added when missing.
    pub fn write_line(&self, line: &str) -> Result<(), LogError> {
        let mut dest = self.inner.lock();
        dest.writer.write_all(line.as_bytes())?;
        if !line.ends_with('\n') {
            dest.writer.write_all(b"\n")?;
        }
        dest.writer.flush()?;
        Ok(())
    }

    /// Point this sink (and every clone of it) at `path`.
    ///
    /// The file is opened in create+append mode, so existing content is
    /// never truncated, including when the same path is redirected to twice.
    pub fn redirect_to_file(&self, path: impl AsRef<Path>) -> Result<(), LogError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LogError::OpenLogFile {
                path: path.to_path_buf(),
                source,
            })?;

        let mut dest = self.inner.lock();
        // Flush whatever the old destination still buffers before dropping it
        let _ = dest.writer.flush();
        dest.writer = Box::new(file);
        dest.label = path.display().to_string();
        debug!("Log sink redirected to {}", dest.label);
        Ok(())
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink").field("label", &self.label()).finish()
    }
}

/// Growable byte buffer usable as a sink destination
#[derive(Clone, Default)]
pub struct MemoryBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryBuffer {
    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Written content split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.lock().is_empty()
    }
}

impl Write for MemoryBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

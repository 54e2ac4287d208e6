//! Action Log
//!
//! Append-only, globally ordered record of everything the actors do.
//! Numbering and appending happen under one lock, so the sink sees lines
//! in sequence order and no two events ever share a number.

use crate::error::{Result, SimulationError};
use crate::events::{Event, LogEvent};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// First sequence number handed out
pub const FIRST_SEQUENCE: u64 = 1;

/// Destination for numbered log lines
pub trait EventSink: Send + Debug {
    /// Append one line; called with events in strictly increasing order
    fn append(&mut self, event: &LogEvent) -> io::Result<()>;

    /// Flush anything buffered
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes one line per event to a file, flushing after every line
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create (or truncate) the log file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|source| SimulationError::SinkSetup {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for FileSink {
    fn append(&mut self, event: &LogEvent) -> io::Result<()> {
        writeln!(self.writer, "{}", event)?;
        self.writer.flush()
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Keeps events in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event appended so far
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Rendered log lines
    pub fn lines(&self) -> Vec<String> {
        self.events.lock().iter().map(ToString::to_string).collect()
    }
}

impl EventSink for MemorySink {
    fn append(&mut self, event: &LogEvent) -> io::Result<()> {
        self.events.lock().push(*event);
        Ok(())
    }
}

#[derive(Debug)]
struct LogInner {
    next_sequence: u64,
    sink: Box<dyn EventSink>,
}

/// The shared action log
#[derive(Debug)]
pub struct ActionLog {
    inner: Mutex<LogInner>,
}

impl ActionLog {
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        Self {
            inner: Mutex::new(LogInner {
                next_sequence: FIRST_SEQUENCE,
                sink,
            }),
        }
    }

    /// Number the event and append it; returns the assigned sequence number
    pub fn record(&self, event: Event) -> Result<u64> {
        let mut inner = self.inner.lock();
        let sequence = inner.next_sequence;
        let line = LogEvent { sequence, event };

        inner.sink.append(&line).map_err(SimulationError::LogWrite)?;
        inner.next_sequence += 1;

        trace!(sequence, %event, "Action recorded");
        Ok(sequence)
    }

    /// Events recorded so far
    pub fn recorded(&self) -> u64 {
        self.inner.lock().next_sequence - FIRST_SEQUENCE
    }

    pub fn flush(&self) -> Result<()> {
        self.inner.lock().sink.flush().map_err(SimulationError::LogWrite)
    }
}

use std::sync::{Mutex, PoisonError};

use log::LevelFilter;

use super::{Entry, LogCore};

/// Keeps encoded lines in memory.
pub struct BufferCore {
    lines: Mutex<Vec<String>>,
    filter: LevelFilter,
}

impl BufferCore {
    pub fn new() -> Self {
        Self::with_filter(LevelFilter::Trace)
    }

    pub fn with_filter(filter: LevelFilter) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            filter,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for BufferCore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogCore for BufferCore {
    fn enabled(&self, level: log::Level) -> bool {
        level <= self.filter
    }

    fn write_entry(&self, _entry: &Entry<'_>, line: &str) -> eyre::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }

    fn flush(&self) {}
}

pub struct NullCore {}

impl NullCore {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for NullCore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogCore for NullCore {
    fn enabled(&self, _level: log::Level) -> bool {
        false
    }

    fn write_entry(&self, _entry: &Entry<'_>, _line: &str) -> eyre::Result<()> {
        Ok(())
    }

    fn flush(&self) {}
}

use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use eyre::Context;
use log::{Level, LevelFilter};

/// A severity threshold that can be read and changed at runtime.
///
/// Clones share the same underlying value, so every consumer holding a clone
/// sees threshold changes without being rebuilt. Use [`AtomicLevel::detached`]
/// to get a handle that is independent of this one.
#[derive(Debug, Clone)]
pub struct AtomicLevel {
    inner: Arc<AtomicUsize>,
}

impl AtomicLevel {
    pub fn new(level: LevelFilter) -> Self {
        Self {
            inner: Arc::new(AtomicUsize::new(level as usize)),
        }
    }

    pub fn level(&self) -> LevelFilter {
        filter_from_usize(self.inner.load(Ordering::Acquire))
    }

    pub fn set_level(&self, level: LevelFilter) {
        self.inner.store(level as usize, Ordering::Release);
    }

    /// Parses a level name such as `"debug"` or `"WARN"` and applies it.
    pub fn set_level_str(&self, level: &str) -> eyre::Result<()> {
        let filter = LevelFilter::from_str(level)
            .with_context(|| format!("Unknown log level '{}'", level))?;
        self.set_level(filter);
        Ok(())
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level()
    }

    /// New handle starting at the current threshold, sharing nothing with `self`.
    pub fn detached(&self) -> Self {
        Self::new(self.level())
    }

    pub fn shares_state_with(&self, other: &AtomicLevel) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(LevelFilter::Info)
    }
}

fn filter_from_usize(value: usize) -> LevelFilter {
    match value {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

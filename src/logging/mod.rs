mod cores;
mod encoders;
mod logger;

use chrono::{DateTime, Utc};
use log::Level;

pub use cores::{BufferCore, NullCore};
pub use encoders::{ConsoleEncoder, JsonEncoder};
pub use logger::{Builder, Logger};

/// A single record, ready to be encoded.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub logger_name: &'a str,
    pub caller: Option<String>,
    pub message: String,
}

pub trait LogEncoder: Sync + Send {
    fn encode(&self, entry: &Entry<'_>) -> String;
}

/// A log destination. Cores are registered by name and combined into a [`Logger`].
pub trait LogCore: Sync + Send {
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    /// `line` is `entry` already encoded, including the line ending.
    fn write_entry(&self, entry: &Entry<'_>, line: &str) -> eyre::Result<()>;

    fn flush(&self);
}

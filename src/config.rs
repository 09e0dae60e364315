use std::{borrow::Cow, fmt::Display};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{Level, LevelFilter};
use serde_json::Value;
use yansi::Paint;

use crate::{
    level::AtomicLevel,
    logging::{ConsoleEncoder, JsonEncoder, LogEncoder},
};

pub const ENV_KEY_LOG_FORMAT: &str = "FLOGO_LOG_FORMAT";

pub const TRACE_LEVEL_MARKER: &str = "[TRACE]";

/// Threshold the trace stream starts at, the most verbose level trace loggers emit at.
pub const TRACE_STREAM_LEVEL: LevelFilter = LevelFilter::Debug;

pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Default, Clone, Debug)]
pub struct ProcessEnv {}

impl ProcessEnv {
    pub fn new() -> Self {
        Self {}
    }
}

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl<F> EnvSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, key: &str) -> Option<String> {
        self(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Console,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(value) if value.to_uppercase() == "JSON" => LogFormat::Json,
            _ => LogFormat::Console,
        }
    }

    pub fn from_env(env: &impl EnvSource) -> Self {
        Self::from_env_value(env.var(ENV_KEY_LOG_FORMAT).as_deref())
    }

    pub fn encoding(&self) -> &'static str {
        match self {
            LogFormat::Console => "console",
            LogFormat::Json => "json",
        }
    }
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encoding())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeEncoder {
    /// Floating point seconds since the unix epoch.
    EpochSeconds,
    EpochNanos,
    Iso8601,
}

impl TimeEncoder {
    pub fn encode(&self, time: DateTime<Utc>) -> Value {
        match self {
            TimeEncoder::EpochSeconds => {
                let secs = time.timestamp() as f64
                    + f64::from(time.timestamp_subsec_nanos()) / 1_000_000_000.0;
                serde_json::Number::from_f64(secs)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            TimeEncoder::EpochNanos => {
                // Out of range for i64 nanos past the year 2262.
                let nanos = time
                    .timestamp_nanos_opt()
                    .unwrap_or_else(|| time.timestamp_micros().saturating_mul(1000));
                Value::from(nanos)
            }
            TimeEncoder::Iso8601 => {
                Value::String(time.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelEncoder {
    Lowercase,
    Capital,
    CapitalColor,
    /// Renders the same text whatever the level is.
    Marker(Cow<'static, str>),
}

impl LevelEncoder {
    pub fn trace_marker() -> Self {
        LevelEncoder::Marker(Cow::Borrowed(TRACE_LEVEL_MARKER))
    }

    pub fn encode(&self, level: Level) -> String {
        match self {
            LevelEncoder::Lowercase => level.as_str().to_lowercase(),
            LevelEncoder::Capital => level.as_str().to_string(),
            LevelEncoder::CapitalColor => {
                let name = level.as_str();
                match level {
                    Level::Error => name.red().to_string(),
                    Level::Warn => name.yellow().to_string(),
                    Level::Info => name.blue().to_string(),
                    Level::Debug => name.magenta().to_string(),
                    Level::Trace => name.bright_black().to_string(),
                }
            }
            LevelEncoder::Marker(marker) => marker.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameEncoder {
    Full,
    /// `foo` is rendered as `[foo] -`.
    Bracketed,
}

impl NameEncoder {
    pub fn encode(&self, name: &str) -> String {
        match self {
            NameEncoder::Full => name.to_string(),
            NameEncoder::Bracketed => format!("[{}] -", name),
        }
    }
}

/// Field names and rendering rules used by the encoders.
///
/// An empty key leaves that field out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub message_key: String,
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub line_ending: String,
    pub encode_time: TimeEncoder,
    pub encode_level: LevelEncoder,
    pub encode_name: NameEncoder,
}

impl EncoderConfig {
    pub fn production() -> Self {
        Self {
            message_key: "msg".to_string(),
            level_key: "level".to_string(),
            time_key: "ts".to_string(),
            name_key: "logger".to_string(),
            caller_key: "caller".to_string(),
            line_ending: "\n".to_string(),
            encode_time: TimeEncoder::EpochSeconds,
            encode_level: LevelEncoder::Lowercase,
            encode_name: NameEncoder::Full,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::production()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub level: AtomicLevel,
    pub disable_caller: bool,
    pub format: LogFormat,
    pub encoder: EncoderConfig,
}

impl Config {
    pub fn production() -> Self {
        Self {
            level: AtomicLevel::new(LevelFilter::Info),
            disable_caller: false,
            format: LogFormat::Json,
            encoder: EncoderConfig::production(),
        }
    }

    /// Derives the trace stream configuration.
    ///
    /// The result renders like `self` apart from the level, which is the
    /// constant [`TRACE_LEVEL_MARKER`] in console mode. Its level handle is
    /// detached from `self` and starts at [`TRACE_STREAM_LEVEL`].
    pub fn trace(&self) -> Config {
        let mut trace = self.clone();

        if trace.format == LogFormat::Console {
            trace.encoder.encode_level = LevelEncoder::trace_marker();
        }

        trace.level = self.level.detached();
        trace.level.set_level(TRACE_STREAM_LEVEL);

        trace
    }

    pub fn build_encoder(&self) -> Box<dyn LogEncoder> {
        match self.format {
            LogFormat::Console => Box::new(ConsoleEncoder::new(self.encoder.clone())),
            LogFormat::Json => Box::new(JsonEncoder::new(self.encoder.clone())),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::production()
    }
}

/// The default log and trace configurations of a process.
#[derive(Debug, Clone)]
pub struct DefConfig {
    log_config: Config,
    trace_log_config: Config,
}

impl DefConfig {
    pub fn from_env(env: &impl EnvSource) -> Self {
        Self::from_format(LogFormat::from_env(env))
    }

    pub fn from_format(format: LogFormat) -> Self {
        let mut config = Config::production();
        config.disable_caller = true;

        config.encoder.time_key = "timestamp".to_string();
        config.encoder.encode_time = TimeEncoder::EpochNanos;

        if format == LogFormat::Console {
            config.format = LogFormat::Console;
            config.encoder.encode_level = LevelEncoder::Capital;
            config.encoder.encode_name = NameEncoder::Bracketed;
        }

        let trace_log_config = config.trace();

        Self {
            log_config: config,
            trace_log_config,
        }
    }

    pub fn format(&self) -> LogFormat {
        self.log_config.format
    }

    pub fn log_config(&self) -> &Config {
        &self.log_config
    }

    pub fn log_level(&self) -> &AtomicLevel {
        &self.log_config.level
    }

    pub fn trace_log_config(&self) -> &Config {
        &self.trace_log_config
    }

    pub fn trace_log_level(&self) -> &AtomicLevel {
        &self.trace_log_config.level
    }
}

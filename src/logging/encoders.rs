use serde_json::{Map, Value};

use crate::config::EncoderConfig;

use super::{Entry, LogEncoder};

/// Tab separated output: time, level, name, caller, message.
pub struct ConsoleEncoder {
    config: EncoderConfig,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl LogEncoder for ConsoleEncoder {
    fn encode(&self, entry: &Entry<'_>) -> String {
        let config = &self.config;
        let mut parts: Vec<String> = Vec::with_capacity(5);

        if !config.time_key.is_empty() {
            match config.encode_time.encode(entry.time) {
                Value::String(time) => parts.push(time),
                time => parts.push(time.to_string()),
            }
        }

        if !config.level_key.is_empty() {
            parts.push(config.encode_level.encode(entry.level));
        }

        if !config.name_key.is_empty() && !entry.logger_name.is_empty() {
            parts.push(config.encode_name.encode(entry.logger_name));
        }

        if let Some(caller) = &entry.caller {
            if !config.caller_key.is_empty() {
                parts.push(caller.clone());
            }
        }

        if !config.message_key.is_empty() {
            parts.push(entry.message.clone());
        }

        let mut line = parts.join("\t");
        line.push_str(&config.line_ending);
        line
    }
}

/// One JSON object per line, fields in encoder order.
pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl LogEncoder for JsonEncoder {
    fn encode(&self, entry: &Entry<'_>) -> String {
        let config = &self.config;
        let mut object = Map::new();

        if !config.level_key.is_empty() {
            object.insert(
                config.level_key.clone(),
                Value::String(config.encode_level.encode(entry.level)),
            );
        }

        if !config.time_key.is_empty() {
            object.insert(config.time_key.clone(), config.encode_time.encode(entry.time));
        }

        if !config.name_key.is_empty() && !entry.logger_name.is_empty() {
            object.insert(
                config.name_key.clone(),
                Value::String(config.encode_name.encode(entry.logger_name)),
            );
        }

        if let Some(caller) = &entry.caller {
            if !config.caller_key.is_empty() {
                object.insert(config.caller_key.clone(), Value::String(caller.clone()));
            }
        }

        if !config.message_key.is_empty() {
            object.insert(
                config.message_key.clone(),
                Value::String(entry.message.clone()),
            );
        }

        let mut line = Value::Object(object).to_string();
        line.push_str(&config.line_ending);
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DefConfig, LogFormat};
    use chrono::{TimeZone, Utc};
    use log::Level;

    fn entry<'a>(name: &'a str, level: Level) -> Entry<'a> {
        Entry {
            level,
            time: Utc.timestamp_opt(1_700_000_000, 5).unwrap(),
            logger_name: name,
            caller: None,
            message: "flow started".to_string(),
        }
    }

    #[test]
    fn test_console_line() {
        let def = DefConfig::from_format(LogFormat::Console);
        let encoder = ConsoleEncoder::new(def.log_config().encoder.clone());

        assert_eq!(
            encoder.encode(&entry("engine", Level::Info)),
            "1700000000000000005\tINFO\t[engine] -\tflow started\n"
        );
    }

    #[test]
    fn test_console_trace_line() {
        let def = DefConfig::from_format(LogFormat::Console);
        let encoder = ConsoleEncoder::new(def.trace_log_config().encoder.clone());

        assert_eq!(
            encoder.encode(&entry("engine", Level::Error)),
            "1700000000000000005\t[TRACE]\t[engine] -\tflow started\n"
        );
    }

    #[test]
    fn test_console_without_name() {
        let def = DefConfig::from_format(LogFormat::Console);
        let encoder = ConsoleEncoder::new(def.log_config().encoder.clone());

        assert_eq!(
            encoder.encode(&entry("", Level::Warn)),
            "1700000000000000005\tWARN\tflow started\n"
        );
    }

    #[test]
    fn test_console_caller_and_empty_keys() {
        let mut config = EncoderConfig::production();
        config.time_key = String::new();
        config.level_key = String::new();
        config.name_key = String::new();

        let encoder = ConsoleEncoder::new(config);
        let mut entry = entry("engine", Level::Info);
        entry.caller = Some("src/main.rs:12".to_string());

        assert_eq!(encoder.encode(&entry), "src/main.rs:12\tflow started\n");

        let mut config = EncoderConfig::production();
        config.time_key = String::new();
        config.caller_key = String::new();
        config.message_key = String::new();

        let encoder = ConsoleEncoder::new(config);
        assert_eq!(encoder.encode(&entry), "info\tengine\n");
    }

    #[test]
    fn test_json_line() {
        let def = DefConfig::from_format(LogFormat::Json);
        let encoder = JsonEncoder::new(def.log_config().encoder.clone());

        assert_eq!(
            encoder.encode(&entry("engine", Level::Debug)),
            "{\"level\":\"debug\",\"timestamp\":1700000000000000005,\"logger\":\"engine\",\"msg\":\"flow started\"}\n"
        );
    }

    #[test]
    fn test_json_caller_and_empty_keys() {
        let mut config = EncoderConfig::production();
        config.time_key = String::new();
        config.level_key = String::new();

        let encoder = JsonEncoder::new(config);
        let mut entry = entry("", Level::Info);
        entry.caller = Some("src/main.rs:12".to_string());

        assert_eq!(
            encoder.encode(&entry),
            "{\"caller\":\"src/main.rs:12\",\"msg\":\"flow started\"}\n"
        );
    }
}

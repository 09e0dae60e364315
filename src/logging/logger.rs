use std::{collections::HashMap, fmt, sync::Arc};

use chrono::Utc;
use eyre::Context;
use log::{Level, LevelFilter, Log};

use crate::{config::Config, level::AtomicLevel};

use super::{Entry, LogCore, LogEncoder};

/// Fans every enabled record out to a set of named cores.
pub struct Logger {
    level: AtomicLevel,
    encoder: Box<dyn LogEncoder>,
    cores: Vec<(String, Arc<dyn LogCore>)>,
    disable_caller: bool,
}

impl Logger {
    pub fn new(
        level: AtomicLevel,
        encoder: Box<dyn LogEncoder>,
        cores: Vec<(String, Arc<dyn LogCore>)>,
        disable_caller: bool,
    ) -> Self {
        Self {
            level,
            encoder,
            cores,
            disable_caller,
        }
    }

    /// Installs this logger as the `log` facade's global logger.
    pub fn init(self) -> eyre::Result<()> {
        log::set_boxed_logger(Box::new(self)).context("Failed registering boxed logger")?;
        // the level handle does the gating, keep the facade wide open
        log::set_max_level(LevelFilter::Trace);

        Ok(())
    }

    pub fn level(&self) -> &AtomicLevel {
        &self.level
    }

    pub fn core_names(&self) -> impl Iterator<Item = &str> {
        self.cores.iter().map(|(name, _)| name.as_str())
    }

    /// Logs a message without going through the global facade.
    pub fn emit(&self, level: Level, target: &str, args: fmt::Arguments<'_>) {
        self.log(
            &log::Record::builder()
                .level(level)
                .target(target)
                .args(args)
                .build(),
        );
    }

    fn caller(&self, record: &log::Record) -> Option<String> {
        if self.disable_caller {
            return None;
        }

        let file = record.file()?;
        let short = match file.rmatch_indices(['/', '\\']).nth(1) {
            Some((idx, _)) => &file[idx + 1..],
            None => file,
        };

        match record.line() {
            Some(line) => Some(format!("{}:{}", short, line)),
            None => Some(short.to_string()),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.level.enabled(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = record.level();
        if !self.cores.iter().any(|(_, core)| core.enabled(level)) {
            return;
        }

        let entry = Entry {
            level,
            time: Utc::now(),
            logger_name: record.target(),
            caller: self.caller(record),
            message: record.args().to_string(),
        };
        let line = self.encoder.encode(&entry);

        for (name, core) in &self.cores {
            if !core.enabled(level) {
                continue;
            }

            if let Err(err) = core.write_entry(&entry, &line) {
                tracing::error!(core = %name, error = %err, "failed writing log entry");
            }
        }
    }

    fn flush(&self) {
        for (_, core) in &self.cores {
            core.flush();
        }
    }
}

pub struct Builder {
    config: Config,
    cores: Vec<(String, Arc<dyn LogCore>)>,
}

impl Builder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cores: Vec::new(),
        }
    }

    /// Adds a core, replacing any earlier core with the same name.
    pub fn with_core(mut self, name: impl Into<String>, core: Arc<dyn LogCore>) -> Self {
        let name = name.into();
        self.cores.retain(|(existing, _)| *existing != name);
        self.cores.push((name, core));
        self
    }

    pub fn with_cores(self, cores: HashMap<String, Arc<dyn LogCore>>) -> Self {
        let mut cores: Vec<_> = cores.into_iter().collect();
        cores.sort_by(|(a, _), (b, _)| a.cmp(b));

        cores
            .into_iter()
            .fold(self, |builder, (name, core)| builder.with_core(name, core))
    }

    pub fn build(&self) -> Logger {
        Logger::new(
            self.config.level.clone(),
            self.config.build_encoder(),
            self.cores.clone(),
            self.config.disable_caller,
        )
    }
}
